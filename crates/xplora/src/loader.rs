// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Page and layout module loading.
//!
//! A module is one source file: a template body plus optional TOML front
//! matter holding the page's static props.
//!
//! ```text
//! +++
//! title = "About"
//! +++
//! <h1>{{ title }}</h1>
//! ```
//!
//! Loaders never cache. Every call reads the file again so that edits are
//! picked up on the next reload.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LoadError;
use crate::render::{Component, Props};

const FRONT_MATTER_FENCE: &str = "+++";

/// A loaded page or layout module.
#[derive(Debug, Clone)]
pub struct PageModule {
    /// File the module was loaded from.
    pub file: PathBuf,
    /// The module's component.
    pub component: Arc<Component>,
    /// Build-time props declared by the module, if any.
    pub static_props: Option<Props>,
}

/// Loads modules from source files.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Loads the module at `path`, bypassing any previously loaded copy.
    async fn load(&self, path: &Path) -> Result<PageModule, LoadError>;
}

/// Loader for template files with optional front matter.
#[derive(Debug, Default, Clone)]
pub struct TemplateLoader {
    root: Option<PathBuf>,
}

impl TemplateLoader {
    /// Creates a loader that names components by their full path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names components relative to `root` in error messages.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    fn display_name(&self, path: &Path) -> String {
        self.root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

#[async_trait]
impl ModuleLoader for TemplateLoader {
    async fn load(&self, path: &Path) -> Result<PageModule, LoadError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let name = self.display_name(path);
        parse_module(path, &name, &source)
    }
}

/// Parses module source into a [`PageModule`].
pub fn parse_module(path: &Path, name: &str, source: &str) -> Result<PageModule, LoadError> {
    let (static_props, body) = split_front_matter(name, source)?;
    let component = Component::parse(name, body)?;

    Ok(PageModule {
        file: path.to_path_buf(),
        component: Arc::new(component),
        static_props,
    })
}

fn split_front_matter<'a>(name: &str, source: &'a str) -> Result<(Option<Props>, &'a str), LoadError> {
    let Some(after_open) = source
        .strip_prefix(FRONT_MATTER_FENCE)
        .and_then(|rest| rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")))
    else {
        return Ok((None, source));
    };

    let close = find_closing_fence(after_open).ok_or_else(|| LoadError::FrontMatter {
        name: name.to_string(),
        message: "missing closing `+++`".to_string(),
    })?;

    let table: toml::Table =
        toml::from_str(&after_open[..close]).map_err(|e| LoadError::FrontMatter {
            name: name.to_string(),
            message: e.to_string(),
        })?;
    let props = match serde_json::to_value(table) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(_) => Props::new(),
        Err(e) => {
            return Err(LoadError::FrontMatter {
                name: name.to_string(),
                message: e.to_string(),
            })
        }
    };

    let body = &after_open[close + FRONT_MATTER_FENCE.len()..];
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);

    Ok((Some(props), body))
}

/// Byte offset of a line consisting of the fence, if any.
fn find_closing_fence(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end() == FRONT_MATTER_FENCE {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_module_without_front_matter() {
        let module = parse_module(Path::new("p.html"), "p.html", "<h1>Hi</h1>").unwrap();
        assert!(module.static_props.is_none());
        assert_eq!(module.component.name(), "p.html");
    }

    #[test]
    fn test_front_matter_becomes_static_props() {
        let source = "+++\ntitle = \"About\"\ncount = 2\n+++\n<h1>{{ title }}</h1>";
        let module = parse_module(Path::new("p.html"), "p.html", source).unwrap();
        let props = module.static_props.unwrap();
        assert_eq!(props.get("title"), Some(&json!("About")));
        assert_eq!(props.get("count"), Some(&json!(2)));
    }

    #[test]
    fn test_unterminated_front_matter() {
        let err = parse_module(Path::new("p.html"), "p.html", "+++\ntitle = 1\n<h1/>").unwrap_err();
        assert!(matches!(err, LoadError::FrontMatter { .. }));
    }

    #[test]
    fn test_invalid_front_matter() {
        let err = parse_module(Path::new("p.html"), "p.html", "+++\ntitle = \n+++\n").unwrap_err();
        assert!(matches!(err, LoadError::FrontMatter { .. }));
    }

    #[tokio::test]
    async fn test_loader_reads_fresh_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.html");
        let loader = TemplateLoader::new().with_root(dir.path());

        std::fs::write(&path, "<p>one</p>").unwrap();
        let first = loader.load(&path).await.unwrap();

        std::fs::write(&path, "<p>two</p>").unwrap();
        let second = loader.load(&path).await.unwrap();

        assert_eq!(first.component.name(), "page.html");
        assert_ne!(first.component, second.component);
    }

    #[tokio::test]
    async fn test_loader_missing_file() {
        let dir = tempdir().unwrap();
        let err = TemplateLoader::new()
            .load(&dir.path().join("nope.html"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
