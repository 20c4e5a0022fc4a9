//! Birr Lens CLI - Mobile-money SMS spending analyzer
//!
//! Usage:
//!   birr serve --port 5000           Start the web upload form
//!   birr analyze --file export.json  Analyze an export and render charts

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Serve {
            port,
            host,
            upload_dir,
            graph_dir,
            timezone,
        } => {
            commands::cmd_serve(
                &host,
                port,
                upload_dir.as_deref(),
                graph_dir.as_deref(),
                timezone,
            )
            .await
        }
        Commands::Analyze {
            file,
            graph_dir,
            timezone,
            json,
        } => commands::cmd_analyze(&file, graph_dir.as_deref(), timezone, json),
    }
}
