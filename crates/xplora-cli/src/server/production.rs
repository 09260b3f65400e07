// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Static file server for built output.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Uri},
    response::{IntoResponse, Response},
    Router,
};

use super::http::{internal_error, not_found};

/// State for the production server.
#[derive(Debug, Clone)]
pub struct StaticState {
    /// Build output directory.
    pub dir: PathBuf,
    /// Serve the root `index.html` for unknown page paths.
    pub fallback: bool,
}

/// Maps a URL path onto the output directory.
///
/// Paths containing a `.` anywhere map directly to that file; all others map
/// to `<path>/index.html`. Returns `None` for paths that try to leave the
/// directory.
pub fn resolve_static_path(dir: &Path, url_path: &str) -> Option<PathBuf> {
    let relative = Path::new(url_path.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    Some(if url_path.contains('.') {
        dir.join(relative)
    } else {
        dir.join(relative).join("index.html")
    })
}

/// Builds the production router.
pub fn static_router(state: StaticState) -> Router {
    Router::new()
        .fallback(static_handler)
        .with_state(Arc::new(state))
}

async fn static_handler(State(state): State<Arc<StaticState>>, uri: Uri) -> Response {
    let path = uri.path();
    let Some(file) = resolve_static_path(&state.dir, path) else {
        tracing::warn!("Rejected path {}", path);
        return not_found();
    };

    match serve_file(&file).await {
        Ok(Some(response)) => response,
        Ok(None) if state.fallback && file.ends_with("index.html") => {
            match serve_file(&state.dir.join("index.html")).await {
                Ok(Some(response)) => response,
                Ok(None) => not_found(),
                Err(e) => {
                    tracing::error!("Failed to read fallback page: {}", e);
                    internal_error()
                }
            }
        }
        Ok(None) => not_found(),
        Err(e) => {
            tracing::error!("Failed to read {}: {}", file.display(), e);
            internal_error()
        }
    }
}

async fn serve_file(file: &Path) -> std::io::Result<Option<Response>> {
    match tokio::fs::metadata(file).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Ok(None),
        Err(e) => {
            tracing::debug!("{} not served: {}", file.display(), e);
            return Ok(None);
        }
    }

    let bytes = tokio::fs::read(file).await?;
    let mime = mime_guess::from_path(file).first_or_octet_stream();
    Ok(Some(
        ([(header::CONTENT_TYPE, mime.as_ref().to_string())], bytes).into_response(),
    ))
}
