// POST /comparison    : form field activity_id, renders the comparison table
// POST /api/comparison: JSON body {"activity_id": ...}, returns the comparison
//
// Both store the result in the session so GET /export can serve it.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use tracing::error;

use crate::error::CompareError;
use crate::web::session_store::SessionId;
use crate::web::views::comparison_page;
use crate::web::{api_error, text_error, AppState};

pub const COMPARISON_FAILED_MESSAGE: &str =
    "There was an error during comparison. Please try again.";

#[derive(Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub activity_id: String,
}

/// POST /comparison: compare one activity and render the table.
pub async fn compare_form(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Form(request): Form<CompareRequest>,
) -> Response {
    let mut ctx = state.sessions.load(&session).await;

    let html = match ctx.compare(&request.activity_id, &state.aligner) {
        Ok(comparison) => comparison_page(comparison),
        Err(e) => {
            error!(
                error = %e,
                session = %session,
                activity_id = %request.activity_id,
                "Error during comparison"
            );
            return text_error(StatusCode::BAD_REQUEST, COMPARISON_FAILED_MESSAGE);
        }
    };

    state.sessions.save(&session, ctx).await;
    Html(html).into_response()
}

/// POST /api/comparison: JSON variant of the comparison.
pub async fn compare_json(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(request): Json<CompareRequest>,
) -> Response {
    let mut ctx = state.sessions.load(&session).await;

    let body = match ctx.compare(&request.activity_id, &state.aligner) {
        Ok(comparison) => comparison.clone(),
        Err(e) => {
            error!(
                error = %e,
                session = %session,
                activity_id = %request.activity_id,
                "Error during comparison"
            );
            let status = match &e {
                CompareError::NotFound(_) => StatusCode::NOT_FOUND,
                CompareError::NoDataset => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            };
            return api_error(status, &e.to_string());
        }
    };

    state.sessions.save(&session, ctx).await;
    Json(body).into_response()
}
