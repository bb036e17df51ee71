#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use tower::ServiceExt;
use wordbook_app::db::DatabaseClient;
use wordbook_app::models::User;
use wordbook_app::routes::build_app;
use wordbook_app::{AppConfig, AppState};

pub async fn test_app() -> (Router, AppState) {
    let config = AppConfig {
        jwt_secret: "integration-test-secret".to_string(),
        ..AppConfig::default()
    };
    let db = DatabaseClient::in_memory().await.expect("in-memory store");
    let state = AppState::with_database(config, db);
    (build_app(state.clone()), state)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("router is infallible")
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Creates an account directly and returns it with a ready-made Cookie header.
pub async fn signed_in_user(state: &AppState, username: &str) -> (User, String) {
    let user = state
        .user_service
        .register(username, &format!("{}@example.com", username), "password123", "en")
        .await
        .unwrap();
    let token = state.user_service.issue_session(&user).unwrap();
    (user, format!("auth_token={}", token))
}
