// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! xplora project configuration.
//!
//! Configuration is loaded from `xplora.toml` at the project root. Every
//! field is optional; missing fields take their defaults.
//!
//! # Example Configuration
//!
//! ```toml
//! [dev]
//! port = 4000        # ws_port defaults to 4001
//! hmr = true
//!
//! [static]
//! output_dir = "./dist"
//! revalidate = 3600
//! fallback = false
//!
//! [build]
//! minify = true
//! sourcemap = true
//! css_command = "tailwindcss"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// File name of the project configuration.
pub const CONFIG_FILE: &str = "xplora.toml";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_WS_PORT: u16 = 3001;
const DEFAULT_OUTPUT_DIR: &str = "./dist";
const DEFAULT_REVALIDATE: u64 = 3600;
const DEFAULT_CSS_COMMAND: &str = "tailwindcss";

/// Configuration as written by the user. Every field may be absent.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// `[dev]` section.
    pub dev: UserDevConfig,
    /// `[static]` section.
    #[serde(rename = "static")]
    pub static_site: UserStaticConfig,
    /// `[build]` section.
    pub build: UserBuildConfig,
}

/// User-supplied `[dev]` values.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UserDevConfig {
    /// HTTP port.
    pub port: Option<u16>,
    /// Live reload WebSocket port.
    #[serde(alias = "wsPort")]
    pub ws_port: Option<u16>,
    /// Inject live reload scripts and run the WebSocket server.
    pub hmr: Option<bool>,
    /// Match `[param]` routes against request paths.
    #[serde(alias = "dynamicRoutes")]
    pub dynamic_routes: Option<bool>,
}

/// User-supplied `[static]` values.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UserStaticConfig {
    /// Build output directory.
    #[serde(alias = "outputDir")]
    pub output_dir: Option<String>,
    /// Revalidation interval in seconds.
    pub revalidate: Option<u64>,
    /// Serve the root page for unknown paths in `start`.
    pub fallback: Option<bool>,
}

/// User-supplied `[build]` values.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UserBuildConfig {
    /// Minify the generated stylesheet.
    pub minify: Option<bool>,
    /// Emit source maps.
    pub sourcemap: Option<bool>,
    /// Command that compiles `src/app/styles.css`.
    #[serde(alias = "cssCommand")]
    pub css_command: Option<String>,
}

/// Fully resolved configuration. No field is optional past this point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    /// Development server settings.
    pub dev: DevConfig,
    /// Static output settings.
    #[serde(rename = "static")]
    pub static_site: StaticConfig,
    /// Build settings.
    pub build: BuildConfig,
}

/// Development server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevConfig {
    /// HTTP port (default: 3000).
    pub port: u16,
    /// WebSocket port (default: 3001, or `port + 1` when only `port` is set).
    pub ws_port: u16,
    /// Live reload enabled (default: true).
    pub hmr: bool,
    /// Dynamic segment matching in the dispatcher (default: false).
    pub dynamic_routes: bool,
}

/// Static output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticConfig {
    /// Output directory (default: "./dist").
    pub output_dir: String,
    /// Revalidation interval in seconds (default: 3600).
    pub revalidate: u64,
    /// Single-page fallback in the production server (default: false).
    pub fallback: bool,
}

/// Build settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    /// Minify CSS output (default: true).
    pub minify: bool,
    /// Source maps (default: true).
    pub sourcemap: bool,
    /// CSS compiler command (default: "tailwindcss").
    pub css_command: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        define_config(UserConfig::default())
    }
}

impl ResolvedConfig {
    /// Absolute output directory for a project root.
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.static_site.output_dir)
    }
}

/// Merges user values over the defaults, section by section.
pub fn define_config(user: UserConfig) -> ResolvedConfig {
    let UserConfig {
        dev,
        static_site,
        build,
    } = user;

    let ws_port = dev.ws_port.unwrap_or_else(|| {
        dev.port
            .and_then(|port| port.checked_add(1))
            .unwrap_or(DEFAULT_WS_PORT)
    });

    ResolvedConfig {
        dev: DevConfig {
            port: dev.port.unwrap_or(DEFAULT_PORT),
            ws_port,
            hmr: dev.hmr.unwrap_or(true),
            dynamic_routes: dev.dynamic_routes.unwrap_or(false),
        },
        static_site: StaticConfig {
            output_dir: static_site
                .output_dir
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
            revalidate: static_site.revalidate.unwrap_or(DEFAULT_REVALIDATE),
            fallback: static_site.fallback.unwrap_or(false),
        },
        build: BuildConfig {
            minify: build.minify.unwrap_or(true),
            sourcemap: build.sourcemap.unwrap_or(true),
            css_command: build
                .css_command
                .unwrap_or_else(|| DEFAULT_CSS_COMMAND.to_string()),
        },
    }
}

/// Reads `xplora.toml` from the project root.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config(root: &Path) -> Result<Option<UserConfig>, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })?;
    Ok(Some(config))
}

/// Loads the user configuration, falling back to an empty one.
///
/// An unreadable or invalid file is reported as a warning. Callers that need
/// to override individual values (e.g. from CLI flags) do so here, before
/// [`define_config`] derives dependent defaults.
pub fn resolve_user_config(root: &Path) -> UserConfig {
    match load_user_config(root) {
        Ok(user) => user.unwrap_or_default(),
        Err(err) => {
            tracing::warn!("Failed to load {}, using defaults: {}", CONFIG_FILE, err);
            UserConfig::default()
        }
    }
}

/// Loads and resolves the project configuration.
///
/// Never fails: an unreadable or invalid file is reported as a warning and
/// the defaults are used. The file is read on every call.
pub fn resolve_config(root: &Path) -> ResolvedConfig {
    define_config(resolve_user_config(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn user(toml_src: &str) -> UserConfig {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn test_empty_config_is_defaults() {
        let config = define_config(UserConfig::default());
        assert_eq!(config.dev.port, 3000);
        assert_eq!(config.dev.ws_port, 3001);
        assert!(config.dev.hmr);
        assert!(!config.dev.dynamic_routes);
        assert_eq!(config.static_site.output_dir, "./dist");
        assert_eq!(config.static_site.revalidate, 3600);
        assert!(!config.static_site.fallback);
        assert!(config.build.minify);
        assert!(config.build.sourcemap);
        assert_eq!(config.build.css_command, "tailwindcss");
    }

    #[test]
    fn test_port_derives_ws_port() {
        let config = define_config(user("[dev]\nport = 4000\n"));
        assert_eq!(config.dev.port, 4000);
        assert_eq!(config.dev.ws_port, 4001);
        assert!(config.dev.hmr);
    }

    #[test]
    fn test_explicit_ws_port_wins() {
        let config = define_config(user("[dev]\nport = 4000\nws_port = 5000\n"));
        assert_eq!(config.dev.ws_port, 5000);

        let config = define_config(user("[dev]\nport = 4000\nwsPort = 5000\n"));
        assert_eq!(config.dev.ws_port, 5000);
    }

    #[test]
    fn test_ws_port_overflow_uses_default() {
        let config = define_config(user("[dev]\nport = 65535\n"));
        assert_eq!(config.dev.ws_port, 3001);
    }

    #[test]
    fn test_explicit_false_and_zero_kept() {
        let config = define_config(user(
            r#"
            [dev]
            port = 5000
            hmr = false

            [static]
            outputDir = "./out"
            revalidate = 0
            fallback = true

            [build]
            minify = false
            sourcemap = false
            "#,
        ));

        assert_eq!(config.dev.port, 5000);
        assert!(!config.dev.hmr);
        assert_eq!(config.static_site.output_dir, "./out");
        assert_eq!(config.static_site.revalidate, 0);
        assert!(config.static_site.fallback);
        assert!(!config.build.minify);
        assert!(!config.build.sourcemap);
    }

    #[test]
    fn test_resolve_missing_file() {
        let dir = tempdir().unwrap();
        assert_eq!(resolve_config(dir.path()), ResolvedConfig::default());
    }

    #[test]
    fn test_resolve_invalid_file_falls_back() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[dev\nport = ").unwrap();

        assert!(load_user_config(dir.path()).is_err());
        assert_eq!(resolve_config(dir.path()), ResolvedConfig::default());
    }

    #[test]
    fn test_resolve_picks_up_edits() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        fs::write(&path, "[dev]\nport = 4000\n").unwrap();
        assert_eq!(resolve_config(dir.path()).dev.port, 4000);

        fs::write(&path, "[dev]\nport = 4100\n").unwrap();
        let config = resolve_config(dir.path());
        assert_eq!(config.dev.port, 4100);
        assert_eq!(config.dev.ws_port, 4101);
    }

    #[test]
    fn test_output_dir_is_joined() {
        let config = ResolvedConfig::default();
        let root = Path::new("/project");
        assert_eq!(config.output_dir(root), root.join("./dist"));
    }

    #[test]
    fn test_override_before_define_rederives_ws_port() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        fs::write(&path, "[dev]\nhmr = false\n").unwrap();
        let mut user = resolve_user_config(dir.path());
        user.dev.port = Some(5000);
        let config = define_config(user);
        assert_eq!(config.dev.ws_port, 5001);
        assert!(!config.dev.hmr);

        fs::write(&path, "[dev]\nws_port = 9000\n").unwrap();
        let mut user = resolve_user_config(dir.path());
        user.dev.port = Some(5000);
        assert_eq!(define_config(user).dev.ws_port, 9000);
    }
}
