// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # xplora
//!
//! Core of a small file-routed web framework: everything the dev server and
//! the static builder share.
//!
//! ## Features
//!
//! - File-system routing (`src/app/**/page.html` → URL path)
//! - Project configuration from `xplora.toml` with typed defaults
//! - Template components with props, children and TOML front matter
//! - Streaming HTML injection of the stylesheet link and live-reload scripts
//! - Atomically swapped page/layout state for concurrent readers
//! - Static site generation with a persisted route manifest
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use xplora::{InjectOptions, SiteState, TemplateEngine, TemplateLoader};
//!
//! let site = SiteState::new(".", Arc::new(TemplateLoader::new()));
//! site.reload_pages().await?;
//! site.reload_layout().await;
//!
//! let pages = site.pages();
//! let entry = pages.get("/about").unwrap();
//! let html = xplora::document::render_document_string(
//!     &TemplateEngine::new(),
//!     &entry.module,
//!     site.layout(),
//!     entry.module.static_props.clone().unwrap_or_default(),
//!     &InjectOptions::production(),
//! )?;
//! ```

/// Static site generation.
pub mod builder;
/// Project configuration from `xplora.toml`.
pub mod config;
/// Full document assembly around rendered pages.
pub mod document;
/// Error types.
pub mod error;
/// Streaming stylesheet/script injection.
pub mod inject;
/// Page and layout module loading.
pub mod loader;
/// Page registry and shared site state.
pub mod pages;
/// Rendering engine seam and the built-in template engine.
pub mod render;
/// File-system route derivation and the route manifest.
pub mod routes;

pub use builder::{build_site, BuildReport};
pub use config::{resolve_config, ResolvedConfig};
pub use error::{ConfigError, LoadError, RenderError, Result, XploraError};
pub use inject::{HtmlInjector, InjectOptions};
pub use loader::{ModuleLoader, PageModule, TemplateLoader};
pub use pages::{MatchMode, PageEntry, PageMatch, PageRegistry, SiteState};
pub use render::{Component, Element, HtmlStream, Props, RenderEngine, RenderOutput, TemplateEngine};
pub use routes::{derive_route, rebuild_routes, Route, RouteManifest};
