//! Server command implementation

use std::path::Path;

use anyhow::Result;
use birr_core::TimeZoneSetting;
use birr_server::ServerConfig;

use super::{graph_dir_from, resolve_dir, DEFAULT_UPLOAD_DIR, UPLOAD_DIR_ENV};

pub async fn cmd_serve(
    host: &str,
    port: u16,
    upload_dir: Option<&Path>,
    graph_dir: Option<&Path>,
    timezone: TimeZoneSetting,
) -> Result<()> {
    let config = ServerConfig {
        upload_dir: resolve_dir(
            upload_dir,
            std::env::var(UPLOAD_DIR_ENV).ok(),
            DEFAULT_UPLOAD_DIR,
        ),
        graph_dir: graph_dir_from(graph_dir),
        timezone,
        ..Default::default()
    };

    println!("🚀 Starting Birr Lens web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!("   Uploads: {}", config.upload_dir.display());
    println!("   Charts: {}", config.graph_dir.display());
    println!("   Timezone: {}", config.timezone);
    println!();
    println!("   ⚠️  Single-operator tool: charts use fixed file names and");
    println!("      concurrent uploads overwrite each other's results.");

    birr_server::serve(host, port, config).await
}
