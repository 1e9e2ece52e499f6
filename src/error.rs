//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reference: {kind} id '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("duplicate field: {0}")]
    DuplicateField(String),
    #[error("duplicate display order {order} (field {field_id})")]
    DuplicateDisplayOrder { order: u32, field_id: String },
    #[error("invalid identifier: '{0}'")]
    InvalidIdentifier(String),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Query assembly refused to build a request; nothing was sent.
    #[error("precondition failed: {0}")]
    Precondition(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("backend returned {status}: {detail}")]
    Backend { status: u16, detail: String },
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("serialization: {0}")]
    Json(#[from] serde_json::Error),
    #[error("state lock poisoned")]
    StateLock,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::UNPROCESSABLE_ENTITY, "config_error"),
            AppError::Precondition(_) => (StatusCode::UNPROCESSABLE_ENTITY, "precondition_failed"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Backend { status, .. } if *status == 404 => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Backend { .. } | AppError::Http(_) => (StatusCode::BAD_GATEWAY, "backend_error"),
            AppError::Json(_) | AppError::StateLock => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let details = match &self {
            AppError::Backend { status, detail } => Some(serde_json::json!({
                "backend_status": status,
                "detail": detail,
            })),
            _ => None,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}
