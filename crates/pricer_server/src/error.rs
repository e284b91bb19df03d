//! API error type and the `{error}` failure envelope
//!
//! Every failed request, over HTTP or WebSocket, is answered with exactly one
//! `{"error": "<message>"}` body.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use pricer_pricing::PipelineError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request-level failure
#[derive(Debug, Error)]
pub enum ApiError {
    /// The snapshot pipeline rejected or failed the request
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The HTTP body could not be read, e.g. it exceeds the size limit
    #[error("Invalid request body: {0}")]
    Body(#[from] BytesRejection),

    /// Processing exceeded the configured deadline
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Failure envelope for this error
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }

    /// Log at a level matching the status class
    pub fn log(&self) {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), Json(self.body())).into_response()
    }
}

/// Failure envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure description
    pub error: String,
}

impl ErrorBody {
    /// Serialized envelope
    pub fn to_json(&self) -> String {
        serde_json::json!({ "error": self.error }).to_string()
    }
}
