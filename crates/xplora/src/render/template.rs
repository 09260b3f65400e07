// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Built-in template components.
//!
//! Syntax:
//!
//! - `{{ title }}` inserts the `title` prop, HTML-escaped
//! - `{{ post.author.name }}` walks nested objects (and array indices)
//! - `{{ children }}` inserts the rendered child element as-is

use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use serde_json::Value;

use super::{Element, Props, RenderEngine, RenderOutput};
use crate::error::{LoadError, RenderError};

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Prop(Vec<String>),
    Children,
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    name: String,
    segments: Vec<Segment>,
}

impl Component {
    /// Parses template source.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Template`] for an unclosed `{{` or an expression
    /// that is neither `children` nor a dotted prop path.
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, LoadError> {
        let name = name.into();
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Text(rest[..open].to_string()));
            }

            let line = line_at(source, offset + open);
            let after = &rest[open + 2..];
            let close = after.find("}}").ok_or_else(|| LoadError::Template {
                name: name.clone(),
                line,
                message: "unclosed `{{`".to_string(),
            })?;

            segments.push(parse_expression(&name, after[..close].trim(), line)?);

            let consumed = open + 2 + close + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { name, segments })
    }

    /// Name the component was parsed under (usually its file path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the template has a `{{ children }}` slot.
    pub fn has_children_slot(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Children))
    }
}

fn line_at(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

fn parse_expression(name: &str, expr: &str, line: usize) -> Result<Segment, LoadError> {
    if expr == "children" {
        return Ok(Segment::Children);
    }

    let valid = !expr.is_empty()
        && expr.split('.').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        });

    if !valid {
        return Err(LoadError::Template {
            name: name.to_string(),
            line,
            message: format!("invalid expression `{}`", expr),
        });
    }

    Ok(Segment::Prop(expr.split('.').map(str::to_string).collect()))
}

fn lookup<'a>(props: &'a Props, path: &[String]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = props.get(first)?;
    for key in rest {
        current = match current {
            Value::Object(map) => map.get(key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => html_escape(s),
        Some(other) => html_escape(&other.to_string()),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// The built-in engine for [`Component`] templates.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateEngine;

impl TemplateEngine {
    /// Creates the engine.
    pub fn new() -> Self {
        Self
    }

    fn collect_chunks(element: &Element, chunks: &mut Vec<String>) {
        for segment in &element.component.segments {
            match segment {
                Segment::Text(text) => chunks.push(text.clone()),
                Segment::Prop(path) => {
                    let value = format_value(lookup(&element.props, path));
                    if !value.is_empty() {
                        chunks.push(value);
                    }
                }
                Segment::Children => {
                    if let Some(child) = &element.children {
                        Self::collect_chunks(child, chunks);
                    }
                }
            }
        }
    }
}

impl RenderEngine for TemplateEngine {
    fn render_to_string(&self, element: &Element) -> Result<String, RenderError> {
        let mut chunks = Vec::new();
        Self::collect_chunks(element, &mut chunks);
        Ok(chunks.concat())
    }

    fn render_to_stream(&self, element: Element) -> Result<RenderOutput, RenderError> {
        let mut chunks = Vec::new();
        Self::collect_chunks(&element, &mut chunks);
        Ok(RenderOutput::Stream(
            stream::iter(chunks.into_iter().map(|chunk| Ok(Bytes::from(chunk)))).boxed(),
        ))
    }
}
