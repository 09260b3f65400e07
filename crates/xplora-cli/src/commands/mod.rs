// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `build`: Generate static pages
//! - `dev`: Start development server with hot reload
//! - `start`: Serve a production build

/// Static build command.
pub mod build;
/// Development server command.
pub mod dev;
/// Production server command.
pub mod start;
