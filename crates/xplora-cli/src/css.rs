// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CSS build step.
//!
//! Runs the configured compiler (Tailwind by default) over
//! `src/app/styles.css` and writes `<output_dir>/assets/style.css`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use thiserror::Error;
use tokio::process::Command;
use xplora::config::ResolvedConfig;

/// Project-relative stylesheet entry.
pub const STYLE_ENTRY: &str = "src/app/styles.css";

/// Stylesheet location relative to the output directory.
pub const STYLE_OUTPUT: &str = "assets/style.css";

/// Errors from the CSS step.
#[derive(Debug, Error)]
pub enum CssError {
    /// `build.css_command` is blank.
    #[error("no CSS command configured")]
    EmptyCommand,

    /// The compiler could not be started.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// Program that was started.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The compiler exited with a failure status.
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        /// Program that was started.
        command: String,
        /// Exit status.
        status: std::process::ExitStatus,
        /// Captured standard error.
        stderr: String,
    },

    /// The output directory could not be created.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a build did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssOutcome {
    /// The stylesheet was compiled.
    Built {
        /// Wall time in milliseconds.
        elapsed_ms: u128,
    },
    /// The project has no stylesheet entry.
    Skipped,
}

/// Invokes the CSS compiler for one project.
#[derive(Debug, Clone)]
pub struct CssBuilder {
    root: PathBuf,
    input: PathBuf,
    output: PathBuf,
    command: String,
    minify: bool,
}

impl CssBuilder {
    /// Creates a builder from the resolved configuration.
    pub fn new(root: &Path, config: &ResolvedConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            input: root.join(STYLE_ENTRY),
            output: config.output_dir(root).join(STYLE_OUTPUT),
            command: config.build.css_command.clone(),
            minify: config.build.minify,
        }
    }

    /// Overrides the compiler command.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Path the stylesheet is written to.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Compiles the stylesheet.
    pub async fn build(&self) -> Result<CssOutcome, CssError> {
        if !tokio::fs::try_exists(&self.input).await.unwrap_or(false) {
            tracing::debug!("No {} found, skipping CSS build", STYLE_ENTRY);
            return Ok(CssOutcome::Skipped);
        }

        // `bunx tailwindcss` and similar multi-word commands
        let mut words = self.command.split_whitespace();
        let program = words.next().ok_or(CssError::EmptyCommand)?;

        if let Some(parent) = self.output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut cmd = Command::new(program);
        cmd.args(words)
            .arg("-i")
            .arg(&self.input)
            .arg("-o")
            .arg(&self.output)
            .current_dir(&self.root)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.minify {
            cmd.arg("--minify");
        }

        tracing::debug!("Running {} for {}", self.command, self.input.display());
        let start = Instant::now();
        let output = cmd.output().await.map_err(|source| CssError::Spawn {
            command: program.to_string(),
            source,
        })?;

        if !output.status.success() {
            return Err(CssError::Failed {
                command: program.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(CssOutcome::Built {
            elapsed_ms: start.elapsed().as_millis(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn project_with_styles() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/app")).unwrap();
        std::fs::write(dir.path().join(STYLE_ENTRY), "body { margin: 0 }").unwrap();
        dir
    }

    #[test]
    fn test_paths_follow_config() {
        let mut config = ResolvedConfig::default();
        config.static_site.output_dir = "public".to_string();
        let builder = CssBuilder::new(Path::new("/p"), &config);
        assert_eq!(builder.output(), Path::new("/p/public/assets/style.css"));
    }

    #[tokio::test]
    async fn test_missing_entry_is_skipped() {
        let dir = tempdir().unwrap();
        let builder = CssBuilder::new(dir.path(), &ResolvedConfig::default());
        assert_eq!(builder.build().await.unwrap(), CssOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_blank_command() {
        let dir = project_with_styles();
        let builder = CssBuilder::new(dir.path(), &ResolvedConfig::default()).with_command("  ");
        assert!(matches!(builder.build().await, Err(CssError::EmptyCommand)));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let dir = project_with_styles();
        let builder = CssBuilder::new(dir.path(), &ResolvedConfig::default())
            .with_command("xplora-definitely-not-a-css-compiler");
        assert!(matches!(builder.build().await, Err(CssError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_is_checked() {
        let dir = project_with_styles();
        let config = ResolvedConfig::default();

        let ok = CssBuilder::new(dir.path(), &config).with_command("true");
        assert!(matches!(ok.build().await, Ok(CssOutcome::Built { .. })));
        assert!(dir.path().join("dist/assets").is_dir());

        let failing = CssBuilder::new(dir.path(), &config).with_command("false");
        assert!(matches!(failing.build().await, Err(CssError::Failed { .. })));
    }
}
