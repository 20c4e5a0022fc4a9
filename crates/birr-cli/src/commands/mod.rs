//! CLI command implementations
//!
//! - `analyze` - Offline analysis of an export file
//! - `serve` - Web server command

pub mod analyze;
pub mod serve;

use std::path::{Path, PathBuf};

// Re-export command functions for main.rs
pub use analyze::*;
pub use serve::*;

/// Environment override for the upload directory
pub const UPLOAD_DIR_ENV: &str = "BIRR_UPLOAD_DIR";

/// Environment override for the graph directory
pub const GRAPH_DIR_ENV: &str = "BIRR_GRAPH_DIR";

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_GRAPH_DIR: &str = "static/graphs";

/// Pick a directory: command-line flag, then environment, then default
pub fn resolve_dir(flag: Option<&Path>, env_value: Option<String>, default: &str) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    env_value
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Graph directory from flag, $BIRR_GRAPH_DIR or the default
pub fn graph_dir_from(flag: Option<&Path>) -> PathBuf {
    resolve_dir(flag, std::env::var(GRAPH_DIR_ENV).ok(), DEFAULT_GRAPH_DIR)
}
