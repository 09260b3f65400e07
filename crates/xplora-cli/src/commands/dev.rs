// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Development server command with hot reload support.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use console::style;
use xplora::config::{define_config, resolve_user_config};
use xplora::{SiteState, TemplateEngine, TemplateLoader};

use super::build::css_step;
use crate::css::CssBuilder;
use crate::server::http::{dev_router, AppState};
use crate::server::livereload::{self, Notification};
use crate::server::serve;
use crate::watcher::{FileWatcher, HotReloader};

/// Runs the development server with hot reload.
pub async fn run(host: &str, port: Option<u16>) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;

    // A CLI port re-derives the ws port unless the file pins it
    let mut user = resolve_user_config(&root);
    if let Some(port) = port {
        user.dev.port = Some(port);
    }
    let config = define_config(user);

    let css = CssBuilder::new(&root, &config);
    css_step(&css).await;

    let loader = Arc::new(TemplateLoader::new().with_root(&root));
    let site = Arc::new(SiteState::new(&root, loader));
    let count = site.reload_pages().await?;
    let has_layout = site.reload_layout().await;

    println!(
        "{} {}",
        style("Pages:").cyan(),
        style(format!(
            "{} route(s){}",
            count,
            if has_layout { ", with layout" } else { "" }
        ))
        .dim()
    );
    for route in site.pages().routes() {
        println!("  {} -> {}", route.path, route.file);
    }

    let tx = livereload::channel();

    let (_watcher, mut changes) = FileWatcher::with_channel(&root.join("src"), root.clone())?;
    let reloader = HotReloader::new(site.clone(), css, tx.clone());
    tokio::spawn(async move {
        while let Some(paths) = changes.recv().await {
            let start = Instant::now();
            let sent = reloader.handle_changes(&paths).await;
            print_batch(&paths, &sent, start);
        }
    });

    let addr = format!("{}:{}", host, config.dev.port);
    let ws_addr = format!("{}:{}", host, config.dev.ws_port);
    let hmr = config.dev.hmr;

    println!(
        "{} {}",
        style("Server:").cyan(),
        style(format!("http://{}", addr)).green().bold()
    );
    if hmr {
        println!(
            "{} {}",
            style("Live reload:").cyan(),
            style(format!("ws://{}", ws_addr)).dim()
        );
    }
    println!(
        "{} {}",
        style("Status:").cyan(),
        style("Watching for changes...").dim()
    );
    println!();

    let state = Arc::new(AppState::new(site, Arc::new(TemplateEngine::new()), config));
    let http = serve(&addr, dev_router(state));

    if hmr {
        let ws = serve(&ws_addr, livereload::router(tx));
        tokio::try_join!(http, ws)?;
    } else {
        http.await?;
    }

    Ok(())
}

fn print_batch(paths: &[PathBuf], sent: &[Notification], start: Instant) {
    let display = paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let action = match sent.first() {
        Some(Notification::Reload) => "reload",
        Some(Notification::Css) => "css",
        None => "no update",
    };

    println!(
        "  {} {} {} {}",
        style("✓").green(),
        style(&display).dim(),
        style(action).cyan(),
        style(format!("{}ms", start.elapsed().as_millis())).dim()
    );
}
