// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP servers.
//!
//! # Components
//!
//! - `http`: dev server using Axum
//! - `livereload`: WebSocket notifications on their own port
//! - `production`: static file server for built output
//! - `assets`: embedded client runtime

/// Embedded client runtime scripts.
pub mod assets;
/// Development HTTP server.
pub mod http;
/// Live reload WebSocket server.
pub mod livereload;
/// Production static file server.
pub mod production;

use axum::Router;

/// Binds `addr` and serves `app` until the process exits.
pub async fn serve(addr: &str, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))?;
    axum::serve(listener, app).await?;
    Ok(())
}
