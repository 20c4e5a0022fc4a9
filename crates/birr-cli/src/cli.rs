//! CLI argument definitions using clap
//!
//! This module contains the clap structs for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use birr_core::TimeZoneSetting;
use clap::{Parser, Subcommand};

/// Birr Lens - See where your birr goes
#[derive(Parser)]
#[command(name = "birr")]
#[command(about = "Mobile-money SMS spending analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web upload form
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory for uploaded exports (default: $BIRR_UPLOAD_DIR or ./uploads)
        #[arg(long)]
        upload_dir: Option<PathBuf>,

        /// Directory for rendered charts (default: $BIRR_GRAPH_DIR or ./static/graphs)
        #[arg(long)]
        graph_dir: Option<PathBuf>,

        /// Timezone for days and hours: local, utc, or an offset like +03:00
        #[arg(long, default_value = "local")]
        timezone: TimeZoneSetting,
    },

    /// Analyze an SMS export file and render charts
    Analyze {
        /// JSON export with an "sms" list
        #[arg(short, long)]
        file: PathBuf,

        /// Directory for rendered charts (default: $BIRR_GRAPH_DIR or ./static/graphs)
        #[arg(long)]
        graph_dir: Option<PathBuf>,

        /// Timezone for days and hours: local, utc, or an offset like +03:00
        #[arg(long, default_value = "local")]
        timezone: TimeZoneSetting,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}
