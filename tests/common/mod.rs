#![allow(dead_code)]

use accounts::{build_app, AppState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Vec<String>,
    pub json: Value,
}

impl TestResponse {
    /// `name=value` of the first Set-Cookie header for `name`.
    pub fn cookie_pair(&self, name: &str) -> Option<String> {
        self.set_cookie
            .iter()
            .find(|c| c.starts_with(&format!("{name}=")))
            .map(|c| c.split(';').next().unwrap_or_default().to_string())
    }
}

pub fn app() -> Router {
    build_app(AppState::fake())
}

pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let set_cookie = res
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse {
        status,
        set_cookie,
        json,
    }
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn signup_body(email: &str, username: &str) -> Value {
    serde_json::json!({
        "email": email,
        "username": username,
        "password": "secret1",
        "firstName": "A",
        "lastName": "B"
    })
}
