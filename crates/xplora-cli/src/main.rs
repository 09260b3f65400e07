// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xplora_cli::commands;

#[derive(Parser)]
#[command(name = "xplora")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "File-routed server-side rendering CLI", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the development server with live reload
    Dev {
        /// Port for the HTTP server (overrides xplora.toml)
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Generate static HTML for every static route
    Build {
        /// Output directory (overrides xplora.toml)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Serve a production build
    Start {
        /// Port to run the server on (overrides xplora.toml)
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Dev { port, host } => commands::dev::run(&host, port).await,
        Commands::Build { output } => commands::build::run(output.as_deref()).await,
        Commands::Start { port, host } => commands::start::run(&host, port).await,
    }
}
