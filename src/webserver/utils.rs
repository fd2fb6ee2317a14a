/// JSON response helpers shared by the API routes
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::models::{ErrorDetails, ErrorResponse};

/// 200 with the value as JSON body
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Error status with a structured `{"error": {...}}` body
pub fn error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    details: Option<&str>,
) -> Response {
    let body = ErrorResponse {
        error: ErrorDetails {
            code: code.to_string(),
            message: message.to_string(),
            details: details.map(str::to_string),
            timestamp: chrono::Utc::now(),
        },
    };
    (status, Json(body)).into_response()
}
