use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{field, Span};

use crate::{auth, state::AppState, users};

/// Everything served under `/api`.
fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(auth::router())
        .route("/health", get(|| async { "ok" }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found." })))
}

fn request_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        path = %req.uri().path(),
        status = field::Empty,
    )
}

fn log_response(res: &Response<Body>, latency: Duration, span: &Span) {
    let status = res.status();
    span.record("status", field::display(status));
    let latency_ms = latency.as_millis() as u64;
    if status.is_server_error() {
        tracing::error!(%status, latency_ms, "request failed");
    } else {
        tracing::info!(%status, latency_ms, "request finished");
    }
}

pub fn build_app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(request_span)
        .on_response(log_response);

    Router::new()
        .nest("/api", api_routes())
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(trace)
}

fn bind_addr(host: Option<String>, port: Option<String>) -> anyhow::Result<SocketAddr> {
    let host = host.unwrap_or_else(|| "0.0.0.0".into());
    let port = port.unwrap_or_else(|| "8080".into());
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("cannot listen on {host}:{port}"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler failed");
    }
    tracing::info!("shutting down");
}

/// Serves `app` on `APP_HOST:APP_PORT` until ctrl-c.
pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr = bind_addr(std::env::var("APP_HOST").ok(), std::env::var("APP_PORT").ok())?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_defaults() {
        let addr = bind_addr(None, None).unwrap();
        assert_eq!(addr, "0.0.0.0:8080".parse().unwrap());
        let addr = bind_addr(Some("127.0.0.1".into()), Some("3000".into())).unwrap();
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn bind_addr_rejects_bad_port() {
        let err = bind_addr(None, Some("http".into())).unwrap_err();
        assert!(err.to_string().contains("0.0.0.0:http"));
    }
}
