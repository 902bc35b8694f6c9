use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::render::DocumentError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Paraphrase failures never reach this type: the experience rewriter
/// absorbs them line by line.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Malformed upload: {0}")]
    Upload(#[from] MultipartError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upload(e) => (StatusCode::BAD_REQUEST, "UPLOAD_ERROR", e.body_text()),
            AppError::Document(e) => {
                tracing::error!("Document error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DOCUMENT_ERROR",
                    "The optimized document could not be generated".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
