// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Production server command.
//!
//! Serves the output of `xplora build` as static files. No live reload.

use console::style;
use xplora::config::resolve_config;

use crate::server::production::{static_router, StaticState};
use crate::server::serve;

/// Serves the build output directory.
pub async fn run(host: &str, port: Option<u16>) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    let config = resolve_config(&root);
    let dir = config.output_dir(&root);

    if !dir.is_dir() {
        println!(
            "{} {}",
            style("No build output at").red(),
            style(dir.display()).yellow()
        );
        println!("Run {} first.", style("xplora build").cyan());
        anyhow::bail!("missing build output: {}", dir.display());
    }

    let port = port.unwrap_or(config.dev.port);
    let addr = format!("{}:{}", host, port);
    println!(
        "{} {}",
        style("Serving:").cyan(),
        style(dir.display()).dim()
    );
    println!(
        "{} {}",
        style("Server:").cyan(),
        style(format!("http://{}", addr)).green().bold()
    );

    let state = StaticState {
        dir,
        fallback: config.static_site.fallback,
    };
    serve(&addr, static_router(state)).await
}
