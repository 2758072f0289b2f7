// Web route tests: drive the Axum router in-process with tower's oneshot.
//
// Each test plays a browser: it keeps the session cookie from the first
// response and sends it back on later requests.

#![cfg(feature = "web")]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use tower::ServiceExt;

use keyalign::config::Config;
use keyalign::web::{build_router, AppState};

const BOUNDARY: &str = "keyalign-test-boundary";

fn app() -> Router {
    let config = Config {
        session_secret: "test-session-secret".to_string(),
        ..Config::default()
    };
    build_router(AppState::new(config))
}

fn fixture_bytes() -> Vec<u8> {
    std::fs::read(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/activities.xlsx"
    ))
    .unwrap()
}

fn multipart_body(filename: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(cookie: Option<&str>, contents: &[u8]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(multipart_body("activities.xlsx", contents)))
        .unwrap()
}

fn compare_request(cookie: &str, activity_id: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/comparison")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, cookie)
        .body(Body::from(format!("activity_id={activity_id}")))
        .unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// "keyalign_session=..." pair from a Set-Cookie response header.
fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Upload the fixture in a fresh session and return that session's cookie.
async fn uploaded_session(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(upload_request(None, &fixture_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

// ============================================================
// Full flow: upload -> compare -> export
// ============================================================

#[tokio::test]
async fn upload_compare_export_flow() {
    let app = app();

    let response = app.clone().oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let html = body_text(response).await;
    assert!(html.contains("multipart/form-data"));
    assert!(!html.contains("<select"));

    let response = app
        .clone()
        .oneshot(upload_request(Some(&cookie), &fixture_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let html = body_text(response).await;
    assert!(html.contains("<option value=\"A1\">A1</option>"));
    assert!(html.contains("<option value=\"102\">102</option>"));
    assert!(!html.contains("Averages"));

    let response = app
        .clone()
        .oneshot(compare_request(&cookie, "A1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Wash hands"));
    assert!(html.contains("<td>towel</td>"));

    let response = app
        .clone()
        .oneshot(get("/export", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("filename=\"comparison_A1.csv\""));
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        body_text(response).await,
        "Manual,GPT,Gemini\nsoap,soap,soap\nwater,water,water\ntowel,-,-\n-,sink,-\n"
    );
}

#[tokio::test]
async fn revisiting_index_keeps_activity_picker() {
    let app = app();
    let cookie = uploaded_session(&app).await;

    let response = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    let html = body_text(response).await;
    assert!(html.contains("<select name=\"activity_id\">"));
}

// ============================================================
// Error surface
// ============================================================

#[tokio::test]
async fn invalid_upload_returns_plain_text_message() {
    let app = app();
    let response = app
        .clone()
        .oneshot(upload_request(None, b"not a spreadsheet"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response)
        .await
        .starts_with("There was an error processing the file."));
}

#[tokio::test]
async fn unknown_activity_returns_comparison_error() {
    let app = app();
    let cookie = uploaded_session(&app).await;

    let response = app
        .clone()
        .oneshot(compare_request(&cookie, "Z99"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_text(response).await,
        "There was an error during comparison. Please try again."
    );
}

#[tokio::test]
async fn compare_before_upload_fails() {
    let app = app();
    let response = app.clone().oneshot(get("/", None)).await.unwrap();
    let cookie = session_cookie(&response);

    let response = app
        .clone()
        .oneshot(compare_request(&cookie, "A1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_without_comparison_redirects_home() {
    let app = app();
    let cookie = uploaded_session(&app).await;

    let response = app
        .clone()
        .oneshot(get("/export", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

// ============================================================
// Sessions
// ============================================================

#[tokio::test]
async fn sessions_are_isolated_between_clients() {
    let app = app();
    let _cookie = uploaded_session(&app).await;

    let response = app
        .clone()
        .oneshot(get("/api/activities", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn forged_cookie_gets_a_fresh_session() {
    let app = app();
    let response = app
        .clone()
        .oneshot(get("/", Some("keyalign_session=1.deadbeef.0000")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn reset_clears_session() {
    let app = app();
    let cookie = uploaded_session(&app).await;

    let reset = Request::builder()
        .method("POST")
        .uri("/reset")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(reset).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.starts_with("keyalign_session=;"));
    assert!(cleared.contains("Max-Age=0"));

    let response = app
        .clone()
        .oneshot(get("/api/activities", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ============================================================
// JSON API and health
// ============================================================

#[tokio::test]
async fn api_activities_and_comparison() {
    let app = app();
    let cookie = uploaded_session(&app).await;

    let response = app
        .clone()
        .oneshot(get("/api/activities", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["activity_ids"], serde_json::json!(["A1", "102", "A3"]));

    let request = Request::builder()
        .method("POST")
        .uri("/api/comparison")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &cookie)
        .body(Body::from(r#"{"activity_id":"102"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["activity_name"], "Brush teeth");
    assert_eq!(json["table"]["rows"][0]["category"], "manual_gpt");
    assert_eq!(json["table"]["rows"][0]["manual"], "brush");

    // The JSON comparison is exportable too.
    let response = app
        .clone()
        .oneshot(get("/export", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_comparison_unknown_activity_is_404() {
    let app = app();
    let cookie = uploaded_session(&app).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/comparison")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &cookie)
        .body(Body::from(r#"{"activity_id":"nope"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_needs_no_session() {
    let response = app().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}
