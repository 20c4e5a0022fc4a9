//! Upload form handlers

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Html,
};
use tracing::{error, info, warn};

use crate::page::{render_index, PageContent};
use crate::{AppError, AppState};
use birr_core::{AnalysisReport, Error};

/// An uploaded file as received from the form
struct Upload {
    filename: String,
    data: Vec<u8>,
}

/// GET / - Empty upload form
pub async fn index() -> Html<String> {
    Html(render_index(&PageContent::Empty))
}

/// POST / - Analyze an uploaded SMS export
///
/// Expects multipart form with:
/// - file: JSON export (required)
///
/// Every outcome, including analysis failures, is a 200 page with a message.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let max_upload_size = state.config.max_upload_size;
    let mut upload: Option<Upload> = None;

    // Extract the file field; other fields are ignored
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return multipart_failure(e, max_upload_size),
        };
        if field.name() != Some("file") || upload.is_some() {
            continue;
        }
        // A "file" field without a filename is a plain text field, not an upload
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => return multipart_failure(e, max_upload_size),
        };

        upload = Some(Upload {
            filename,
            data: data.to_vec(),
        });
    }

    let Some(upload) = upload else {
        return Ok(error_page("No file uploaded"));
    };
    if upload.filename.is_empty() {
        return Ok(error_page("No file selected"));
    }
    if upload.data.len() > max_upload_size {
        return Ok(too_large_page(max_upload_size));
    }

    match analyze_upload(state, upload).await {
        Ok(report) => Ok(Html(render_index(&PageContent::Report(&report)))),
        Err(message) => Ok(error_page(&message)),
    }
}

/// Save the upload and run the analysis, returning the user-facing message
/// on failure
async fn analyze_upload(state: Arc<AppState>, upload: Upload) -> Result<AnalysisReport, String> {
    let Some(name) = safe_file_name(&upload.filename) else {
        warn!(filename = %upload.filename, "Rejected upload file name");
        return Err("Invalid file name".to_string());
    };

    let path = state.config.upload_dir.join(name);
    tokio::fs::write(&path, &upload.data).await.map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to save upload");
        system_error(&e)
    })?;

    info!(path = %path.display(), bytes = upload.data.len(), "Saved upload");

    let result =
        tokio::task::spawn_blocking(move || state.analyzer.analyze_transactions(&path)).await;

    match result {
        Ok(Ok(report)) => Ok(report),
        Ok(Err(e @ (Error::InvalidFormat(_) | Error::NoTransactions))) => {
            info!(reason = %e, "Upload rejected");
            Err(e.to_string())
        }
        Ok(Err(e)) => {
            error!(error = %e, "Analysis failed");
            Err(system_error(&e))
        }
        Err(e) => {
            error!(error = %e, "Analysis task failed");
            Err(system_error(&e))
        }
    }
}

/// Final path component of a client-supplied file name
fn safe_file_name(filename: &str) -> Option<&str> {
    // Browsers on Windows may send a full path with backslashes
    let last = filename.rsplit(['/', '\\']).next()?;
    let name = Path::new(last).file_name()?.to_str()?;
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

/// Body-limit failures get the same page as an oversize file; anything else
/// is a malformed form
fn multipart_failure(
    err: MultipartError,
    max_upload_size: usize,
) -> Result<Html<String>, AppError> {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %err, "Upload exceeded body limit");
        return Ok(too_large_page(max_upload_size));
    }
    Err(AppError::bad_request(&format!(
        "Failed to read form field: {}",
        err.body_text()
    )))
}

fn too_large_page(max_upload_size: usize) -> Html<String> {
    error_page(&format!(
        "File too large. Maximum size is {} MB",
        max_upload_size / 1024 / 1024
    ))
}

fn system_error(err: &dyn std::fmt::Display) -> String {
    format!("System Error: {}", err)
}

fn error_page(message: &str) -> Html<String> {
    Html(render_index(&PageContent::Error(message.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("export.json"), Some("export.json"));
        assert_eq!(safe_file_name("../../etc/passwd"), Some("passwd"));
        assert_eq!(safe_file_name(r"C:\Users\me\sms.json"), Some("sms.json"));
        assert_eq!(safe_file_name(".."), None);
        assert_eq!(safe_file_name("dir/"), None);
    }
}
