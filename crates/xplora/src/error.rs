// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for xplora.
//!
//! # Error Categories
//!
//! - **Config errors**: `xplora.toml` could not be read or parsed. These never
//!   leave [`crate::config::resolve_config`], which falls back to defaults.
//! - **Load errors**: a page or layout module could not be read or parsed.
//!   Batch operations isolate these per module.
//! - **Render errors**: the rendering engine failed for one element.
//! - **I/O, glob and manifest errors**: file-system work around routes and
//!   builds.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading or parsing the project configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or does not match the expected shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Failure while loading a page or layout module.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The module source could not be read.
    #[error("failed to read module {path}: {source}")]
    Io {
        /// Module path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The front matter block is not valid TOML.
    #[error("invalid front matter in {name}: {message}")]
    FrontMatter {
        /// Component name.
        name: String,
        /// Parser message.
        message: String,
    },

    /// The template body is malformed.
    #[error("template error in {name} at line {line}: {message}")]
    Template {
        /// Component name.
        name: String,
        /// 1-indexed line of the offending expression.
        line: usize,
        /// What went wrong.
        message: String,
    },
}

/// Failure while rendering an element.
#[derive(Debug, Error, Clone)]
pub enum RenderError {
    /// The engine failed for a reason of its own.
    #[error("render failed: {0}")]
    Engine(String),
}

/// Top-level error type for route, registry and build operations.
#[derive(Debug, Error)]
pub enum XploraError {
    /// File-system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid discovery glob (e.g. a malformed project path).
    #[error("route discovery failed: {0}")]
    Glob(#[from] glob::PatternError),

    /// Manifest (de)serialization failure.
    #[error("route manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Module load failure.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Render failure.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for xplora operations.
pub type Result<T> = std::result::Result<T, XploraError>;
