// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request (malformed input, failed field validation)
    BadRequest(String),

    // 400, room creation: startTime must precede endTime
    InvalidTimeWindow,

    // 400, room creation: duration must be a positive number of minutes
    InvalidDuration,

    // 400, room creation: the topic's pool cannot cover a full paper
    InsufficientQuestions(String),

    // 409, retryable: the code generator ran out of retries
    CodeGenerationExhausted,

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., session already submitted)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
/// The `error` field carries the stable code a client can branch on; `message`
/// is human-readable detail.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BadRequest", msg),
            AppError::InvalidTimeWindow => (
                StatusCode::BAD_REQUEST,
                "InvalidTimeWindow",
                "End time must be after start time".to_string(),
            ),
            AppError::InvalidDuration => (
                StatusCode::BAD_REQUEST,
                "InvalidDuration",
                "Duration must be greater than 0".to_string(),
            ),
            AppError::InsufficientQuestions(topic) => (
                StatusCode::BAD_REQUEST,
                "InsufficientQuestions",
                format!("Not enough questions for topic '{}'", topic),
            ),
            AppError::CodeGenerationExhausted => (
                StatusCode::CONFLICT,
                "CodeGenerationExhausted",
                "Could not allocate a unique room code, please retry".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NotFound", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", msg),
        };
        let body = Json(json!({
            "error": error_code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
