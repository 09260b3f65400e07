// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Full document assembly: layout or fallback shell, injection, doctype.

use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;

use crate::error::RenderError;
use crate::inject::{inject_stream, inject_str, InjectOptions};
use crate::loader::PageModule;
use crate::render::{Component, Element, HtmlStream, Props, RenderEngine, RenderOutput};

/// Prefix of every document.
pub const DOCTYPE: &str = "<!DOCTYPE html>";

const FALLBACK_FOOT: &str = "</div></body></html>";

/// Shell used when the project has no layout.
fn fallback_head(options: &InjectOptions) -> String {
    format!(
        concat!(
            "<html><head>",
            r#"<meta charset="utf-8"/>"#,
            r#"<meta name="viewport" content="width=device-width, initial-scale=1"/>"#,
            "{}",
            r#"</head><body><div id="root">"#,
        ),
        options.stylesheet_link()
    )
}

/// Element tree for a page. The layout sees the same props as the page.
fn compose(page: &PageModule, layout: Option<Arc<Component>>, props: Props) -> Element {
    let page_element = Element::new(page.component.clone(), props.clone());
    match layout {
        Some(layout) => Element::new(layout, props).with_child(page_element),
        None => page_element,
    }
}

fn output_stream(output: RenderOutput) -> HtmlStream {
    match output {
        RenderOutput::Stream(stream) => stream,
        RenderOutput::Html(html) => stream::once(async move { Ok(Bytes::from(html)) }).boxed(),
    }
}

/// Renders a page document as a stream.
///
/// The engine is invoked before this returns, so a failure to start
/// rendering surfaces as `Err` rather than as a broken stream.
pub fn render_document(
    engine: &dyn RenderEngine,
    page: &PageModule,
    layout: Option<Arc<Component>>,
    props: Props,
    options: &InjectOptions,
) -> Result<HtmlStream, RenderError> {
    let has_layout = layout.is_some();
    let body = output_stream(engine.render_to_stream(compose(page, layout, props))?);

    let body: HtmlStream = if has_layout {
        body
    } else {
        let head = Bytes::from(fallback_head(options));
        let foot = Bytes::from_static(FALLBACK_FOOT.as_bytes());
        stream::once(async move { Ok(head) })
            .chain(body)
            .chain(stream::once(async move { Ok(foot) }))
            .boxed()
    };

    Ok(stream::once(async { Ok(Bytes::from_static(DOCTYPE.as_bytes())) })
        .chain(inject_stream(body, options.clone()))
        .boxed())
}

/// Renders a page document to a string. Same bytes as [`render_document`].
pub fn render_document_string(
    engine: &dyn RenderEngine,
    page: &PageModule,
    layout: Option<Arc<Component>>,
    props: Props,
    options: &InjectOptions,
) -> Result<String, RenderError> {
    let has_layout = layout.is_some();
    let body = engine.render_to_string(&compose(page, layout, props))?;
    let html = if has_layout {
        body
    } else {
        format!("{}{}{}", fallback_head(options), body, FALLBACK_FOOT)
    };
    Ok(format!("{}{}", DOCTYPE, inject_str(&html, options)))
}
