//! API error types mapped to HTTP status codes.
//!
//! Each [`ApiError`] variant maps to a specific HTTP status code and produces
//! a JSON response body `{"error": "message"}`. The legacy plain-text save
//! route bypasses this type and writes its own responses.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use seamaster_core::config;
use serde_json::json;

/// Application-level error type that implements `IntoResponse`.
///
/// Each variant maps to an HTTP status code:
/// - `BadRequest` → 400
/// - `Unauthorized` → 401 (with a `WWW-Authenticate: Basic` challenge)
/// - `NotFound` → 404
/// - `Internal` → 500
#[derive(Debug)]
pub enum ApiError {
    /// Invalid request payload or parameters (400).
    BadRequest(String),
    /// Missing or invalid credentials (401 with challenge header).
    Unauthorized(String),
    /// Resource not found (404).
    NotFound(String),
    /// Unexpected server error (500).
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(msg) => {
                let mut resp =
                    (StatusCode::UNAUTHORIZED, axum::Json(json!({ "error": msg }))).into_response();
                resp.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_str(&format!("Basic realm=\"{}\"", config::AUTH_REALM))
                        .expect("realm is a valid header value"),
                );
                resp
            }
            other => {
                let (status, message) = match other {
                    ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
                    ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                    ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
                    ApiError::Unauthorized(_) => unreachable!(),
                };
                let body = axum::Json(json!({ "error": message }));
                (status, body).into_response()
            }
        }
    }
}
