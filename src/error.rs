//! HTTP-facing error type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::users::{repo::StoreError, validation::FieldErrors};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    Validation(FieldErrors),

    #[error("User already exists")]
    Conflict(FieldErrors),

    #[error("Login failed")]
    InvalidCredentials,

    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Store(StoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(errors) => ErrorBody {
                message: "Bad request.".into(),
                errors: Some(errors),
            },
            AppError::Conflict(errors) => ErrorBody {
                message: "User already exists".into(),
                errors: Some(errors),
            },
            AppError::InvalidCredentials => ErrorBody {
                message: "Login failed".into(),
                errors: Some(FieldErrors::single(
                    "credential",
                    "The provided credentials were invalid.",
                )),
            },
            AppError::BadRequest(msg) => ErrorBody {
                message: msg,
                errors: None,
            },
            AppError::Store(StoreError::Validation(errors)) => ErrorBody {
                message: "Validation error".into(),
                errors: Some(errors),
            },
            AppError::Store(err) => {
                tracing::error!(error = %err, "storage error");
                internal_body()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                internal_body()
            }
        };

        (status, Json(body)).into_response()
    }
}

fn internal_body() -> ErrorBody {
    ErrorBody {
        message: "Internal server error".into(),
        errors: None,
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
