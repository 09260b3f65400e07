// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Static site generation.
//!
//! Every static route is rendered once with its build-time props and written
//! to `<output_dir>/<route path>/index.html`. Dynamic routes have no props to
//! build from and are skipped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ResolvedConfig;
use crate::document::render_document_string;
use crate::error::Result;
use crate::inject::InjectOptions;
use crate::loader::ModuleLoader;
use crate::pages::load_layout;
use crate::render::{Component, RenderEngine};
use crate::routes::{discover_routes, write_manifest, Route};

/// Outcome of a build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Every route discovered.
    pub routes: Vec<Route>,
    /// Files written, in route order.
    pub written: Vec<PathBuf>,
    /// Routes that failed, with the reason.
    pub failed: Vec<(Route, String)>,
    /// Dynamic routes that were not generated.
    pub skipped: Vec<Route>,
}

impl BuildReport {
    /// True when no page failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Output file for a URL path.
pub fn output_file(out_dir: &Path, route_path: &str) -> PathBuf {
    let relative = route_path.trim_start_matches('/');
    if relative.is_empty() {
        out_dir.join("index.html")
    } else {
        out_dir.join(relative).join("index.html")
    }
}

/// Builds every static page of the project at `root`.
///
/// Failures of individual pages are logged and collected in the report; only
/// route discovery or manifest errors abort the build. The route manifest is
/// written once every page has been processed.
pub async fn build_site(
    root: &Path,
    config: &ResolvedConfig,
    loader: &dyn ModuleLoader,
    engine: &dyn RenderEngine,
) -> Result<BuildReport> {
    let out_dir = config.output_dir(root);
    let routes = discover_routes(root)?;
    let layout = load_layout(root, loader).await;
    let options = InjectOptions::production();

    tracing::info!("Building {} routes into {}", routes.len(), out_dir.display());

    let mut report = BuildReport::default();
    for route in &routes {
        if route.is_dynamic {
            tracing::warn!("Skipping dynamic route {} (no build-time params)", route.path);
            report.skipped.push(route.clone());
            continue;
        }

        match build_page(root, &out_dir, route, loader, engine, layout.clone(), &options).await {
            Ok(file) => {
                tracing::debug!("Wrote {}", file.display());
                report.written.push(file);
            }
            Err(e) => {
                tracing::error!("Failed to build {}: {}", route.path, e);
                report.failed.push((route.clone(), e.to_string()));
            }
        }
    }

    write_manifest(root, &routes)?;
    report.routes = routes;
    Ok(report)
}

async fn build_page(
    root: &Path,
    out_dir: &Path,
    route: &Route,
    loader: &dyn ModuleLoader,
    engine: &dyn RenderEngine,
    layout: Option<Arc<Component>>,
    options: &InjectOptions,
) -> Result<PathBuf> {
    let module = loader.load(&root.join(&route.file)).await?;
    let props = module.static_props.clone().unwrap_or_default();
    let html = render_document_string(engine, &module, layout, props, options)?;

    let file = output_file(out_dir, &route.path);
    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&file, html).await?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::TemplateLoader;
    use crate::render::TemplateEngine;
    use crate::error::LoadError;
    use crate::loader::PageModule;
    use crate::routes::{manifest_path, read_manifest};
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Records whether the manifest existed each time a page was loaded.
    struct ManifestSpy {
        root: PathBuf,
        inner: TemplateLoader,
        seen: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl ModuleLoader for ManifestSpy {
        async fn load(&self, path: &Path) -> std::result::Result<PageModule, LoadError> {
            self.seen
                .lock()
                .unwrap()
                .push(manifest_path(&self.root).exists());
            self.inner.load(path).await
        }
    }

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_output_file() {
        let out = Path::new("dist");
        assert_eq!(output_file(out, "/"), Path::new("dist/index.html"));
        assert_eq!(output_file(out, "/about"), Path::new("dist/about/index.html"));
        assert_eq!(output_file(out, "/a/b"), Path::new("dist/a/b/index.html"));
    }

    #[tokio::test]
    async fn test_build_writes_static_pages() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "src/app/page.html", "<h1>Home</h1>");
        write(
            root,
            "src/app/about/page.html",
            "+++\ntitle = \"About us\"\n+++\n<h1>{{ title }}</h1>",
        );
        write(root, "src/app/blog/[slug]/page.html", "<h1>{{ slug }}</h1>");

        let config = ResolvedConfig::default();
        let report = build_site(root, &config, &TemplateLoader::new(), &TemplateEngine::new())
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.routes.len(), 3);
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, "/blog/:slug");

        let about = fs::read_to_string(root.join("dist/about/index.html")).unwrap();
        assert!(about.starts_with("<!DOCTYPE html>"));
        assert!(about.contains("<h1>About us</h1>"));
        assert!(!about.contains("<script"));
        assert!(root.join("dist/index.html").exists());
        assert_eq!(read_manifest(root).unwrap().routes.len(), 3);
    }

    #[tokio::test]
    async fn test_build_uses_layout_and_output_dir() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "src/app/layout.html",
            "<html><head></head><body><nav/>{{ children }}</body></html>",
        );
        write(root, "src/app/page.html", "<p>home</p>");

        let mut config = ResolvedConfig::default();
        config.static_site.output_dir = "out".to_string();
        build_site(root, &config, &TemplateLoader::new(), &TemplateEngine::new())
            .await
            .unwrap();

        let html = fs::read_to_string(root.join("out/index.html")).unwrap();
        assert!(html.contains("<body><nav/><p>home</p></body>"));
        assert_eq!(html.matches("/assets/style.css").count(), 1);
    }

    #[tokio::test]
    async fn test_failing_page_does_not_stop_build() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "src/app/page.html", "<p>ok</p>");
        write(root, "src/app/broken/page.html", "<p>{{ oops</p>");

        let report = build_site(
            root,
            &ResolvedConfig::default(),
            &TemplateLoader::new(),
            &TemplateEngine::new(),
        )
        .await
        .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0.path, "/broken");
        assert!(root.join("dist/index.html").exists());
    }

    #[tokio::test]
    async fn test_manifest_written_after_pages() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "src/app/page.html", "<p>home</p>");
        write(root, "src/app/about/page.html", "<p>about</p>");

        let loader = ManifestSpy {
            root: root.to_path_buf(),
            inner: TemplateLoader::new(),
            seen: Mutex::new(Vec::new()),
        };
        build_site(root, &ResolvedConfig::default(), &loader, &TemplateEngine::new())
            .await
            .unwrap();

        assert_eq!(*loader.seen.lock().unwrap(), vec![false, false]);
        assert_eq!(read_manifest(root).unwrap().routes.len(), 2);
    }
}
