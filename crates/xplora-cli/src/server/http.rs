// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP server for development.
//!
//! Request dispatch, first match wins:
//!
//! 1. `/assets/*` from `<output_dir>/assets`
//! 2. `/client/<name>` embedded runtime scripts
//! 3. a page from the route table, streamed
//! 4. `404 Not Found`
//!
//! Render errors and panics become a bare `500`; details only go to the log.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures_util::TryStreamExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use xplora::config::ResolvedConfig;
use xplora::document::render_document;
use xplora::{InjectOptions, MatchMode, RenderEngine, SiteState};

use super::assets::{client_script, JAVASCRIPT};

const HTML: &str = "text/html; charset=utf-8";

/// Shared application state for the development server.
pub struct AppState {
    /// Pages and layout, swapped on reload.
    pub site: Arc<SiteState>,
    /// Engine used for every page.
    pub engine: Arc<dyn RenderEngine>,
    /// Resolved project configuration.
    pub config: ResolvedConfig,
    /// What gets injected into each document.
    pub inject: InjectOptions,
    /// Route matching policy.
    pub match_mode: MatchMode,
    /// Directory served under `/assets`.
    pub assets_dir: PathBuf,
}

impl AppState {
    /// Creates the dev server state from the resolved configuration.
    pub fn new(site: Arc<SiteState>, engine: Arc<dyn RenderEngine>, config: ResolvedConfig) -> Self {
        let inject = InjectOptions::dev(config.dev.ws_port, config.dev.hmr);
        let match_mode = if config.dev.dynamic_routes {
            MatchMode::Dynamic
        } else {
            MatchMode::Exact
        };
        let assets_dir = config.output_dir(site.root()).join("assets");

        Self {
            site,
            engine,
            config,
            inject,
            match_mode,
            assets_dir,
        }
    }
}

/// Builds the dev HTTP router.
pub fn dev_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest_service("/assets", ServeDir::new(&state.assets_dir))
        .route("/client/:file", get(client_handler))
        .fallback(page_handler)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

async fn client_handler(Path(file): Path<String>) -> Response {
    match client_script(&file) {
        Some(script) => ([(header::CONTENT_TYPE, JAVASCRIPT)], script).into_response(),
        None => not_found(),
    }
}

async fn page_handler(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let path = uri.path();
    let pages = state.site.pages();

    let Some(matched) = pages.resolve(path, state.match_mode) else {
        tracing::debug!("No page for {}", path);
        return not_found();
    };

    // Static props first, route params override
    let mut props = matched.entry.module.static_props.clone().unwrap_or_default();
    props.extend(matched.params_as_props());

    let module = matched.entry.module.clone();
    let route = matched.entry.route.path.clone();

    match render_document(
        state.engine.as_ref(),
        &module,
        state.site.layout(),
        props,
        &state.inject,
    ) {
        Ok(stream) => {
            let stream = stream.inspect_err(move |e| {
                tracing::error!("Render of {} failed mid-stream: {}", route, e);
            });
            ([(header::CONTENT_TYPE, HTML)], Body::from_stream(stream)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to render {}: {}", route, e);
            internal_error()
        }
    }
}

fn handle_panic(_: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    internal_error()
}

pub(crate) fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

pub(crate) fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
