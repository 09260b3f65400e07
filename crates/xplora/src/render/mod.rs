// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Rendering engine seam.
//!
//! The server never looks inside a component. It builds an [`Element`]
//! (component + props + optional child) and hands it to a [`RenderEngine`],
//! which answers with either a complete string or a byte stream.
//!
//! [`TemplateEngine`] is the built-in engine used by the CLI.

mod template;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use std::sync::Arc;

use crate::error::RenderError;

pub use template::{Component, TemplateEngine};

/// Props passed to a component.
pub type Props = serde_json::Map<String, serde_json::Value>;

/// A stream of rendered HTML chunks.
pub type HtmlStream = BoxStream<'static, Result<Bytes, RenderError>>;

/// A component instantiated with props and an optional child element.
#[derive(Debug, Clone)]
pub struct Element {
    /// Component to render.
    pub component: Arc<Component>,
    /// Props visible to the component.
    pub props: Props,
    /// Element rendered at the component's children slot.
    pub children: Option<Box<Element>>,
}

impl Element {
    /// Creates an element without children.
    pub fn new(component: Arc<Component>, props: Props) -> Self {
        Self {
            component,
            props,
            children: None,
        }
    }

    /// Sets the element rendered in the children slot.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children = Some(Box::new(child));
        self
    }
}

/// What an engine produced for an element.
pub enum RenderOutput {
    /// The whole document at once (engines without streaming support).
    Html(String),
    /// Incremental chunks.
    Stream(HtmlStream),
}

impl std::fmt::Debug for RenderOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderOutput::Html(html) => f.debug_tuple("Html").field(&html.len()).finish(),
            RenderOutput::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Turns elements into HTML.
pub trait RenderEngine: Send + Sync {
    /// Renders an element to a complete string.
    fn render_to_string(&self, element: &Element) -> Result<String, RenderError>;

    /// Renders an element incrementally.
    ///
    /// Engines without streaming support can rely on the default, which
    /// returns [`RenderOutput::Html`].
    fn render_to_stream(&self, element: Element) -> Result<RenderOutput, RenderError> {
        self.render_to_string(&element).map(RenderOutput::Html)
    }
}
