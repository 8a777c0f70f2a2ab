// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the relay services.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound,
    Internal(String),
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            // Plain text, unlike the JSON error bodies.
            AppError::NotFound => (StatusCode::NOT_FOUND, "File not found").into_response(),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": msg }))).into_response()
            }
        }
    }
}
