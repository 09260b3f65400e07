// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Page registry and shared site state.
//!
//! A [`PageRegistry`] is an immutable snapshot mapping URL paths to loaded
//! page modules. Reloading never edits a registry in place: a new one is
//! built from disk and published into [`SiteState`] with a single atomic
//! store, so request handlers always see either the old table or the new
//! one, never a mix.

use arc_swap::{ArcSwap, ArcSwapOption};
use matchit::Router as MatchitRouter;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::loader::{ModuleLoader, PageModule};
use crate::render::{Component, Props};
use crate::routes::{rebuild_routes, Route, SOURCE_ROOT};

/// Project-relative path of the layout module.
pub const LAYOUT_FILE: &str = "src/app/layout.html";

/// A route with its loaded module.
#[derive(Debug, Clone)]
pub struct PageEntry {
    /// The route.
    pub route: Route,
    /// The loaded page module.
    pub module: Arc<PageModule>,
}

/// Result of resolving a request path.
#[derive(Debug)]
pub struct PageMatch<'a> {
    /// The matched page.
    pub entry: &'a PageEntry,
    /// Parameter values extracted from the request path (empty for exact hits).
    pub params: Vec<(String, String)>,
}

impl PageMatch<'_> {
    /// Parameters as props, for passing to the page component.
    pub fn params_as_props(&self) -> Props {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect()
    }
}

/// How request paths are matched against routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Literal path equality, e.g. `/blog/:slug` only matches `/blog/:slug`.
    #[default]
    Exact,
    /// Exact first, then `:param` segments match any single segment.
    Dynamic,
}

/// Immutable mapping from URL path to page module.
pub struct PageRegistry {
    pages: HashMap<String, PageEntry>,
    routes: Vec<Route>,
    matcher: MatchitRouter<String>,
}

impl Default for PageRegistry {
    fn default() -> Self {
        Self {
            pages: HashMap::new(),
            routes: Vec::new(),
            matcher: MatchitRouter::new(),
        }
    }
}

impl std::fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRegistry")
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

impl PageRegistry {
    /// Creates an empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a registry from loaded entries, in route order.
    pub fn from_entries(entries: Vec<PageEntry>) -> Self {
        let mut registry = Self::default();
        for entry in entries {
            registry.insert(entry);
        }
        registry
    }

    fn insert(&mut self, entry: PageEntry) {
        let path = entry.route.path.clone();
        if entry.route.is_dynamic {
            if let Err(e) = self.matcher.insert(entry.route.matcher_pattern(), path.clone()) {
                tracing::warn!("Could not register dynamic route {}: {}", path, e);
            }
        }
        self.routes.push(entry.route.clone());
        self.pages.insert(path, entry);
    }

    /// Looks up a page by exact path.
    pub fn get(&self, path: &str) -> Option<&PageEntry> {
        self.pages.get(path)
    }

    /// Matches a request path against dynamic routes.
    ///
    /// Exact paths take precedence; otherwise each `:param` segment matches
    /// one path segment and its value is returned in the match.
    pub fn match_dynamic(&self, path: &str) -> Option<PageMatch<'_>> {
        if let Some(entry) = self.get(path) {
            return Some(PageMatch {
                entry,
                params: Vec::new(),
            });
        }

        let matched = self.matcher.at(path).ok()?;
        let entry = self.pages.get(matched.value)?;
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Some(PageMatch { entry, params })
    }

    /// Resolves a request path using the given mode.
    pub fn resolve(&self, path: &str, mode: MatchMode) -> Option<PageMatch<'_>> {
        match mode {
            MatchMode::Exact => self.get(path).map(|entry| PageMatch {
                entry,
                params: Vec::new(),
            }),
            MatchMode::Dynamic => self.match_dynamic(path),
        }
    }

    /// Routes whose modules loaded, in discovery order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Number of loaded pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// True when no page is loaded.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Discovers routes, writes the manifest, and loads every page module into
/// a fresh registry.
///
/// A module that fails to load is logged and left out; the others still load.
pub async fn reload_pages(root: &Path, loader: &dyn ModuleLoader) -> Result<PageRegistry> {
    let routes = rebuild_routes(root)?;
    let mut entries = Vec::with_capacity(routes.len());

    for route in routes {
        let path = root.join(&route.file);
        match loader.load(&path).await {
            Ok(module) => entries.push(PageEntry {
                route,
                module: Arc::new(module),
            }),
            Err(e) => {
                tracing::error!("Failed to load page {} ({}): {}", route.path, route.file, e);
            }
        }
    }

    Ok(PageRegistry::from_entries(entries))
}

/// Loads the layout module if the project has one.
///
/// Returns `None` when the file is absent or fails to load.
pub async fn load_layout(root: &Path, loader: &dyn ModuleLoader) -> Option<Arc<Component>> {
    let path = root.join(LAYOUT_FILE);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        tracing::debug!("No layout at {}, using the built-in shell", LAYOUT_FILE);
        return None;
    }

    match loader.load(&path).await {
        Ok(module) => Some(module.component),
        Err(e) => {
            tracing::warn!("Failed to load {}: {}", LAYOUT_FILE, e);
            None
        }
    }
}

/// Shared page and layout state for one project.
///
/// Single writer (the reload path), many readers (request handlers).
pub struct SiteState {
    root: PathBuf,
    loader: Arc<dyn ModuleLoader>,
    pages: ArcSwap<PageRegistry>,
    layout: ArcSwapOption<Component>,
}

impl SiteState {
    /// Creates an empty state for the project at `root`.
    pub fn new(root: impl Into<PathBuf>, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            root: root.into(),
            loader,
            pages: ArcSwap::from_pointee(PageRegistry::empty()),
            layout: ArcSwapOption::empty(),
        }
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source directory (`<root>/src/app`).
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(SOURCE_ROOT)
    }

    /// The loader used for pages and the layout.
    pub fn loader(&self) -> &dyn ModuleLoader {
        self.loader.as_ref()
    }

    /// Current page registry snapshot.
    pub fn pages(&self) -> Arc<PageRegistry> {
        self.pages.load_full()
    }

    /// Current layout snapshot.
    pub fn layout(&self) -> Option<Arc<Component>> {
        self.layout.load_full()
    }

    /// Rebuilds the registry from disk and publishes it.
    ///
    /// Returns the number of pages loaded. On error the previous registry
    /// stays published.
    pub async fn reload_pages(&self) -> Result<usize> {
        let registry = reload_pages(&self.root, self.loader.as_ref()).await?;
        let count = registry.len();
        self.pages.store(Arc::new(registry));
        Ok(count)
    }

    /// Reloads the layout and publishes it. Returns true if a layout is present.
    pub async fn reload_layout(&self) -> bool {
        let layout = load_layout(&self.root, self.loader.as_ref()).await;
        let present = layout.is_some();
        self.layout.store(layout);
        present
    }
}

impl std::fmt::Debug for SiteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteState")
            .field("root", &self.root)
            .field("pages", &self.pages.load().len())
            .field("layout", &self.layout.load().is_some())
            .finish()
    }
}
