// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Static build command.

use std::time::{Duration, Instant};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use xplora::config::resolve_config;
use xplora::{build_site, TemplateEngine, TemplateLoader};

use crate::css::{CssBuilder, CssOutcome};

/// Builds every static page into the output directory.
pub async fn run(output: Option<&str>) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    let mut config = resolve_config(&root);
    if let Some(output) = output {
        config.static_site.output_dir = output.to_string();
    }
    let out_dir = config.output_dir(&root);

    println!(
        "{} {}",
        style("Building into").cyan(),
        style(out_dir.display()).dim()
    );

    let start = Instant::now();
    css_step(&CssBuilder::new(&root, &config)).await;

    let pb = spinner("pages");
    let loader = TemplateLoader::new().with_root(&root);
    let report = build_site(&root, &config, &loader, &TemplateEngine::new()).await;
    pb.finish_and_clear();
    let report = report?;

    println!(
        "  {:<12} {} {}",
        style("Pages").cyan(),
        style("✓").green(),
        style(format!("{} written", report.written.len())).dim()
    );
    for route in &report.skipped {
        println!(
            "  {:<12} {} {}",
            style("Skipped").cyan(),
            style(&route.path).yellow(),
            style("(dynamic route)").dim()
        );
    }
    for (route, reason) in &report.failed {
        println!(
            "  {:<12} {} {}",
            style("Failed").cyan(),
            style("✗").red(),
            style(format!("{}: {}", route.path, reason)).red()
        );
    }

    println!(
        "\n{} {}",
        style("Done in").green().bold(),
        style(format!("{}ms", start.elapsed().as_millis())).dim()
    );

    if !report.is_success() {
        anyhow::bail!("{} page(s) failed to build", report.failed.len());
    }
    Ok(())
}

/// Runs the CSS step and prints the outcome. Failures are reported, not returned.
pub(crate) async fn css_step(css: &CssBuilder) {
    let pb = spinner("css");
    let result = css.build().await;
    pb.finish_and_clear();

    match result {
        Ok(CssOutcome::Built { elapsed_ms }) => println!(
            "  {:<12} {} {}",
            style("CSS").cyan(),
            style("✓").green(),
            style(format!("{}ms", elapsed_ms)).dim()
        ),
        Ok(CssOutcome::Skipped) => println!(
            "  {:<12} {}",
            style("CSS").cyan(),
            style("no src/app/styles.css").dim()
        ),
        Err(e) => {
            tracing::error!("CSS build failed: {}", e);
            println!(
                "  {:<12} {} {}",
                style("CSS").cyan(),
                style("✗").red(),
                style(e.to_string()).red()
            );
        }
    }
}

fn spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
