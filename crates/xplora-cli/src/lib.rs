// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! xplora CLI library.
//!
//! Everything behind the `xplora` binary: the dev server with live reload,
//! the static build and the production server.
//!
//! # Usage
//!
//! ```bash
//! xplora dev      # Dev server on :3000, live reload on :3001
//! xplora build    # Write static pages to ./dist
//! xplora start    # Serve ./dist
//! ```
//!
//! # Configuration
//!
//! Projects are configured via `xplora.toml` at the project root.

/// CLI commands (dev, build, start).
pub mod commands;
/// CSS compiler invocation.
pub mod css;
/// HTTP servers and the live reload socket.
pub mod server;
/// File watching and hot reload.
pub mod watcher;
