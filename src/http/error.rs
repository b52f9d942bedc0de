//! Conversion of service errors into HTTP responses.

use crate::error::{ErrorCode, TokenError};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

/// Structured error body with correlation ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub error: String,
    /// Human-readable message (sanitized)
    pub message: String,
    /// Correlation ID for tracing
    pub correlation_id: Uuid,
}

impl ErrorResponse {
    /// Build the sanitized body for `code`.
    #[must_use]
    pub fn new(code: ErrorCode, correlation_id: Uuid) -> Self {
        Self {
            error: code.as_str().to_string(),
            message: code.public_message().to_string(),
            correlation_id,
        }
    }
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        let code = self.code();
        let correlation_id = Uuid::new_v4();

        if self.is_client_error() {
            debug!(error = %self, %correlation_id, "Rejected request");
        } else {
            error!(error = %self, code = code.as_str(), %correlation_id, "Request failed");
        }

        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(ErrorResponse::new(code, correlation_id))).into_response();

        if code == ErrorCode::InvalidCredentials {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(r#"Basic realm="oauth2-server""#),
            );
        }

        response
    }
}
