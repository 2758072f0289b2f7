// Web server: Axum-based upload / compare / export front end.
//
// HTML routes mirror the three user operations; /api/* routes return the
// same data as JSON. Every request carries a signed session cookie whose ID
// keys the caller's SessionContext in the session store.
//
// Failures surface as short plain-text messages (or JSON errors on /api/*);
// details go to the server log only.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::keywords::align::KeywordAligner;

pub mod auth;
pub mod handlers;
pub mod session_store;
pub mod views;

use session_store::{MemorySessionStore, SessionStore};

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<dyn SessionStore>,
    pub aligner: KeywordAligner,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            aligner: KeywordAligner::new(config.sentinel_mode),
            config: Arc::new(config),
            sessions: Arc::new(MemorySessionStore::default()),
        }
    }
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(config: Config, port: u16, bind: &str) -> Result<()> {
    let state = AppState::new(config);
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Keyword comparison listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let pages = Router::new()
        .route(
            "/",
            get(handlers::upload::index).post(handlers::upload::upload),
        )
        .route("/comparison", post(handlers::comparison::compare_form))
        .route("/export", get(handlers::export::export_csv))
        .route("/reset", post(handlers::upload::reset));

    let api = Router::new()
        .route("/api/activities", get(handlers::upload::list_activities))
        .route("/api/comparison", post(handlers::comparison::compare_json));

    Router::new()
        .merge(pages)
        .merge(api)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::attach_session,
        ))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check: always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Plain-text error response for the HTML routes.
pub fn text_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message.to_string(),
    )
        .into_response()
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}
