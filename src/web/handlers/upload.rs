// GET  /              : upload form, plus the activity picker once a file is loaded
// POST /              : multipart upload of the spreadsheet (field "file")
// POST /reset         : forget the session's dataset and comparison
// GET  /api/activities: selectable activity IDs as JSON
//
// An upload that can't be parsed leaves the session untouched.

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Json};
use tracing::{error, info, warn};

use crate::web::auth::clear_cookie_header;
use crate::web::session_store::SessionId;
use crate::web::views::index_page;
use crate::web::{api_error, text_error, AppState};

pub const INVALID_FILE_MESSAGE: &str = "There was an error processing the file. \
     Please ensure it is a valid Excel file with the correct format.";

/// GET /: landing page.
pub async fn index(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Html<String> {
    let ctx = state.sessions.load(&session).await;
    let ids = ctx.activity_ids();
    Html(index_page(ids.as_deref()))
}

/// POST /: accept a spreadsheet upload and show the activity picker.
pub async fn upload(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    mut multipart: Multipart,
) -> Response {
    let bytes = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => match field.bytes().await {
                Ok(bytes) => break Some(bytes),
                Err(e) => {
                    warn!(error = %e, session = %session, "Failed to read upload body");
                    return text_error(StatusCode::BAD_REQUEST, INVALID_FILE_MESSAGE);
                }
            },
            Ok(Some(_)) => continue,
            Ok(None) => break None,
            Err(e) => {
                warn!(error = %e, session = %session, "Malformed multipart request");
                return text_error(StatusCode::BAD_REQUEST, INVALID_FILE_MESSAGE);
            }
        }
    };

    let mut ctx = state.sessions.load(&session).await;

    let Some(bytes) = bytes else {
        // No file part: same as visiting the page.
        let ids = ctx.activity_ids();
        return Html(index_page(ids.as_deref())).into_response();
    };

    match ctx.load_workbook(&bytes) {
        Ok(ids) => {
            info!(session = %session, size = bytes.len(), "Spreadsheet uploaded");
            let html = index_page(Some(&ids));
            state.sessions.save(&session, ctx).await;
            Html(html).into_response()
        }
        Err(e) => {
            error!(error = %e, session = %session, "Error processing upload");
            text_error(StatusCode::BAD_REQUEST, INVALID_FILE_MESSAGE)
        }
    }
}

/// POST /reset: forget the session, expire its cookie and go back to the
/// upload form. The next request starts a fresh session.
pub async fn reset(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    state.sessions.remove(&session).await;
    info!(session = %session, "Session reset");
    (
        [(header::SET_COOKIE, clear_cookie_header())],
        Redirect::to("/"),
    )
        .into_response()
}

/// GET /api/activities: selectable activity IDs of the uploaded file.
pub async fn list_activities(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    match state.sessions.load(&session).await.activity_ids() {
        Some(ids) => Json(serde_json::json!({ "activity_ids": ids })).into_response(),
        None => api_error(StatusCode::CONFLICT, "No file uploaded"),
    }
}
