//! HTTP endpoints for downloading recorded logs.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::recorder::{DailyLog, DATE_FORMAT};
use crate::state::AppState;

pub const ARCHIVE_NAME: &str = "records.zip";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/records", get(download_all))
        .route("/api/records/{date}", get(download_day))
}

fn attachment(filename: &str) -> String {
    format!("attachment; filename=\"{}\"", filename)
}

/// Download one day's log.
///
/// GET /api/records/{date}
pub async fn download_day(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Response {
    // Parsing also keeps arbitrary paths out of the file lookup
    let Ok(date) = NaiveDate::parse_from_str(&date, DATE_FORMAT) else {
        return (StatusCode::BAD_REQUEST, "Date must be YYYY-MM-DD").into_response();
    };

    match state.recorder.log().read_day(date).await {
        Ok(Some(content)) => (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    attachment(&DailyLog::file_name(date)),
                ),
            ],
            content,
        )
            .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "No records for that date").into_response(),
        Err(e) => {
            tracing::error!("Failed to read log for {}: {}", date, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read records").into_response()
        }
    }
}

/// Download every day's log as a zip archive.
///
/// GET /api/records
pub async fn download_all(State(state): State<Arc<AppState>>) -> Response {
    match state.recorder.log().archive().await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/zip".to_string()),
                (header::CONTENT_DISPOSITION, attachment(ARCHIVE_NAME)),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to build records archive: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build archive").into_response()
        }
    }
}
