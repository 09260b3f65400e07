// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! File-system based routing.
//!
//! Every `page.<ext>` file under `src/app/` is a route. The directory path
//! becomes the URL path, and bracketed directories become parameters:
//!
//! | file | path |
//! |---|---|
//! | `src/app/page.html` | `/` |
//! | `src/app/about/page.html` | `/about` |
//! | `src/app/blog/[slug]/page.html` | `/blog/:slug` |
//!
//! The discovered list is persisted to `.xplora/routes.json` so tooling can
//! read it without scanning the tree again.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Directory holding page, layout and style sources.
pub const SOURCE_ROOT: &str = "src/app";

/// File stem marking a directory as a page.
pub const PAGE_MARKER: &str = "page";

/// Extensions the built-in loader accepts for page files.
pub const PAGE_EXTENSIONS: &[&str] = &["html", "htm"];

/// Project-relative location of the persisted route manifest.
pub const MANIFEST_PATH: &str = ".xplora/routes.json";

lazy_static! {
    static ref PARAM_SEGMENT: Regex = Regex::new(r"\[([^\]]+)\]").expect("valid param regex");
}

/// A URL path derived from a page file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// URL path, always starting with `/` (e.g. `/blog/:slug`).
    pub path: String,
    /// Project-relative source file (e.g. `src/app/blog/[slug]/page.html`).
    pub file: String,
    /// True when the path carries at least one parameter.
    pub is_dynamic: bool,
    /// Parameter names in the order they appear in the file path.
    pub params: Vec<String>,
}

impl Route {
    /// Converts `:name` segments into the `{name}` form used by matchit.
    pub fn matcher_pattern(&self) -> String {
        self.path
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => format!("{{{}}}", name),
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Snapshot of the route list as written to `.xplora/routes.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteManifest {
    /// Routes in discovery order.
    pub routes: Vec<Route>,
    /// ISO-8601 UTC timestamp of generation.
    pub generated_at: String,
}

/// Derives a [`Route`] from a project-relative page file path.
///
/// Never fails; paths outside the source root are treated as if they were
/// already relative to it.
pub fn derive_route(file_path: &str) -> Route {
    let normalized = file_path.replace('\\', "/");
    let relative = normalized
        .strip_prefix(SOURCE_ROOT)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(&normalized);

    let stem = strip_extension(relative);
    let without_marker = stem
        .strip_suffix(PAGE_MARKER)
        .and_then(|rest| rest.strip_suffix('/'))
        .unwrap_or(stem);

    let params: Vec<String> = PARAM_SEGMENT
        .captures_iter(relative)
        .map(|caps| caps[1].to_string())
        .collect();
    let replaced = PARAM_SEGMENT.replace_all(without_marker, ":$1");

    let path = if replaced == PAGE_MARKER || replaced.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", replaced)
    };

    Route {
        path,
        file: normalized.clone(),
        is_dynamic: !params.is_empty(),
        params,
    }
}

/// Removes the extension of the last path segment only.
fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

/// Finds every page file under the source root and derives its route.
///
/// Results are sorted by file path so the order is stable across platforms.
pub fn discover_routes(root: &Path) -> Result<Vec<Route>> {
    let pattern = format!(
        "{}/{}/**/{}.*",
        glob::Pattern::escape(&root.to_string_lossy()),
        SOURCE_ROOT,
        PAGE_MARKER
    );

    let mut files: Vec<String> = Vec::new();
    for path in glob::glob(&pattern)?.flatten() {
        if !is_page_file(&path) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(&path);
        files.push(relative_string(relative));
    }
    files.sort();

    Ok(files.iter().map(|file| derive_route(file)).collect())
}

fn is_page_file(path: &Path) -> bool {
    if path.components().any(|c| c.as_os_str() == "node_modules") {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| PAGE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

fn relative_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Discovers routes and persists them to the manifest.
pub fn rebuild_routes(root: &Path) -> Result<Vec<Route>> {
    let routes = discover_routes(root)?;
    write_manifest(root, &routes)?;
    Ok(routes)
}

/// Absolute path of the manifest for a project root.
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_PATH)
}

/// Writes `.xplora/routes.json` with the current timestamp.
pub fn write_manifest(root: &Path, routes: &[Route]) -> Result<RouteManifest> {
    let manifest = RouteManifest {
        routes: routes.to_vec(),
        generated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    };

    let path = manifest_path(root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(&manifest)?)?;
    tracing::debug!(routes = routes.len(), path = %path.display(), "route manifest written");

    Ok(manifest)
}

/// Reads the persisted manifest.
pub fn read_manifest(root: &Path) -> Result<RouteManifest> {
    let content = std::fs::read_to_string(manifest_path(root))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<p>page</p>").unwrap();
    }

    #[test]
    fn test_root_page() {
        let route = derive_route("src/app/page.tsx");
        assert_eq!(route.path, "/");
        assert!(!route.is_dynamic);
        assert!(route.params.is_empty());
        assert_eq!(route.file, "src/app/page.tsx");
    }

    #[test]
    fn test_static_page() {
        let route = derive_route("src/app/about/page.html");
        assert_eq!(route.path, "/about");
        assert!(!route.is_dynamic);
    }

    #[test]
    fn test_single_param() {
        let route = derive_route("src/app/blog/[slug]/page.tsx");
        assert_eq!(route.path, "/blog/:slug");
        assert!(route.is_dynamic);
        assert_eq!(route.params, vec!["slug"]);
    }

    #[test]
    fn test_params_in_textual_order() {
        let route = derive_route("src/app/[category]/[id]/page.tsx");
        assert_eq!(route.path, "/:category/:id");
        assert!(route.is_dynamic);
        assert_eq!(route.params, vec!["category", "id"]);
    }

    #[test]
    fn test_windows_separators() {
        let route = derive_route("src\\app\\docs\\[page]\\page.html");
        assert_eq!(route.path, "/docs/:page");
        assert_eq!(route.params, vec!["page"]);
    }

    #[test]
    fn test_paths_always_rooted() {
        for file in [
            "src/app/page.html",
            "src/app/a/page.html",
            "src/app/a/b/c/page.htm",
            "src/app/[x]/page.html",
            "src/app/shop/[cat]/items/[id]/page.html",
        ] {
            let route = derive_route(file);
            assert!(route.path.starts_with('/'), "{} -> {}", file, route.path);
            assert_eq!(route.is_dynamic, !route.params.is_empty());
        }
    }

    #[test]
    fn test_matcher_pattern() {
        let route = derive_route("src/app/shop/[cat]/items/[id]/page.html");
        assert_eq!(route.matcher_pattern(), "/shop/{cat}/items/{id}");
        assert_eq!(derive_route("src/app/page.html").matcher_pattern(), "/");
    }

    #[test]
    fn test_discover_routes_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "src/app/page.html");
        touch(dir.path(), "src/app/about/page.html");
        touch(dir.path(), "src/app/blog/[slug]/page.html");
        touch(dir.path(), "src/app/layout.html");
        touch(dir.path(), "src/app/notes/page.txt");
        touch(dir.path(), "src/app/node_modules/pkg/page.html");

        let routes = discover_routes(dir.path()).unwrap();
        let paths: Vec<&str> = routes.iter().map(|r| r.path.as_str()).collect();

        assert_eq!(paths, vec!["/about", "/blog/:slug", "/"]);
        assert_eq!(routes[1].file, "src/app/blog/[slug]/page.html");
    }

    #[test]
    fn test_rebuild_routes_writes_manifest() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "src/app/page.html");
        touch(dir.path(), "src/app/blog/[slug]/page.html");

        let routes = rebuild_routes(dir.path()).unwrap();
        let manifest = read_manifest(dir.path()).unwrap();
        assert_eq!(manifest.routes, routes);
        assert!(manifest.generated_at.ends_with('Z'));

        let raw = fs::read_to_string(manifest_path(dir.path())).unwrap();
        assert!(raw.contains("\"isDynamic\": true"));
        assert!(raw.contains("\"generatedAt\""));
    }

    #[test]
    fn test_discover_without_source_root() {
        let dir = tempdir().unwrap();
        assert!(discover_routes(dir.path()).unwrap().is_empty());
    }
}
