//! Birr Lens Web Server
//!
//! Axum-based upload form for the Birr Lens spending analyzer.
//!
//! Routes:
//! - `GET /`                  upload form
//! - `POST /`                 analyze an uploaded SMS export (multipart field `file`)
//! - `GET /graphs/<filename>` rendered chart images
//!
//! Requests are handled one at a time from the operator's point of view: the
//! chart files use fixed names and a later upload overwrites earlier charts.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{info, warn};

use birr_core::{Analyzer, TimeZoneSetting};

mod handlers;
pub mod page;

use page::PageContent;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Where uploaded exports are saved under their original file name
    pub upload_dir: PathBuf,
    /// Where rendered charts are written and served from
    pub graph_dir: PathBuf,
    /// Timezone used for calendar days and hours
    pub timezone: TimeZoneSetting,
    /// Largest accepted upload in bytes
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            graph_dir: PathBuf::from("static/graphs"),
            timezone: TimeZoneSetting::Local,
            max_upload_size: MAX_UPLOAD_SIZE,
        }
    }
}

impl ServerConfig {
    /// Create the upload and graph directories if missing
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.upload_dir).with_context(|| {
            format!(
                "Failed to create upload directory {}",
                self.upload_dir.display()
            )
        })?;
        std::fs::create_dir_all(&self.graph_dir).with_context(|| {
            format!(
                "Failed to create graph directory {}",
                self.graph_dir.display()
            )
        })?;
        Ok(())
    }
}

/// Shared application state
pub struct AppState {
    pub config: ServerConfig,
    pub analyzer: Analyzer,
}

/// Create the application router
pub fn create_router(config: ServerConfig) -> anyhow::Result<Router> {
    let analyzer = Analyzer::new(config.timezone, config.graph_dir.clone())?;
    let body_limit = config.max_upload_size + MULTIPART_OVERHEAD;
    let graphs = ServeDir::new(&config.graph_dir);

    let state = Arc::new(AppState { config, analyzer });

    let app = Router::new()
        .route("/", get(handlers::index).post(handlers::upload))
        .nest_service("/graphs", graphs)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    Ok(app)
}

/// Start the server
pub async fn serve(host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    config.ensure_dirs()?;

    info!(
        upload_dir = %config.upload_dir.display(),
        graph_dir = %config.graph_dir.display(),
        timezone = %config.timezone,
        "Server configured"
    );

    let app = create_router(config)?;
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Malformed request rendered as the index page with a message
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, message = %self.message, "Request rejected");
        let html = page::render_index(&PageContent::Error(self.message));
        (self.status, Html(html)).into_response()
    }
}
