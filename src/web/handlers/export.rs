// GET /export: download the session's last comparison as CSV.
//
// Without a prior comparison the user is sent back to the start page.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Extension;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use tracing::{debug, error};

use crate::error::CompareError;
use crate::web::session_store::SessionId;
use crate::web::{text_error, AppState};

pub const EXPORT_FAILED_MESSAGE: &str = "There was an error during export. Please try again.";

/// GET /export: CSV attachment named comparison_<activity_id>.csv.
pub async fn export_csv(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    let ctx = state.sessions.load(&session).await;

    match ctx.export() {
        Ok(export) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    content_disposition(&export.filename),
                ),
            ],
            export.bytes,
        )
            .into_response(),
        Err(CompareError::NoPriorComparison) => {
            debug!(session = %session, "Export without comparison, redirecting");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            error!(error = %e, session = %session, "Error during export");
            text_error(StatusCode::INTERNAL_SERVER_ERROR, EXPORT_FAILED_MESSAGE)
        }
    }
}

/// Attachment header with an ASCII fallback name and the exact UTF-8 name
/// in `filename*`.
fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = utf8_percent_encode(filename, NON_ALPHANUMERIC);
    format!("attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_plain() {
        assert_eq!(
            content_disposition("comparison_A1.csv"),
            "attachment; filename=\"comparison_A1.csv\"; filename*=UTF-8''comparison%5FA1%2Ecsv"
        );
    }

    #[test]
    fn test_content_disposition_unicode_and_quotes() {
        let header = content_disposition("comparison_é \".csv");
        assert!(header.contains("filename=\"comparison____.csv\""));
        assert!(header.contains("%C3%A9"));
    }
}
