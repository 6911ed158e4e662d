use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AppError;

/// Request body accepted either as JSON or as an urlencoded form,
/// chosen by `Content-Type`.
///
/// A request without `Content-Type` is read as JSON when it has a body and
/// as `T::default()` when it doesn't, so missing fields surface through
/// validation rather than as an extraction error.
pub struct JsonOrForm<T>(pub T);

enum BodyKind {
    Form,
    Json,
    Unlabelled,
}

fn body_kind(req: &Request) -> BodyKind {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ct| !ct.is_empty());
    match content_type {
        None => BodyKind::Unlabelled,
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => BodyKind::Form,
        Some(_) => BodyKind::Json,
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Form => {
                let Form(value) = Form::<T>::from_request(req, state).await.map_err(|e| {
                    warn!(error = %e, "rejected form body");
                    AppError::BadRequest(e.body_text())
                })?;
                Ok(Self(value))
            }
            BodyKind::Json => {
                let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
                    warn!(error = %e, "rejected json body");
                    AppError::BadRequest(e.body_text())
                })?;
                Ok(Self(value))
            }
            BodyKind::Unlabelled => {
                let bytes = Bytes::from_request(req, state).await.map_err(|e| {
                    warn!(error = %e, "failed to read request body");
                    AppError::BadRequest(e.body_text())
                })?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Self(T::default()));
                }
                let Json(value) = Json::<T>::from_bytes(&bytes).map_err(|e| {
                    warn!(error = %e, "rejected unlabelled body");
                    AppError::BadRequest(e.body_text())
                })?;
                Ok(Self(value))
            }
        }
    }
}
