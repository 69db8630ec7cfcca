//! Response handling.
//!
//! # Responsibilities
//! - Map handler and vendor failures to HTTP status codes
//! - Keep error bodies in the `{"error": "..."}` shape the storefront expects
//!
//! # Design Decisions
//! - Validation problems are 400 with a specific message
//! - Vendor failures are 500 carrying the error message

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::vendor::VendorError;

/// Errors returned from API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Verified body is not valid JSON.
    #[error("Invalid JSON")]
    InvalidJson,

    /// A required field is missing or out of range.
    #[error("{0}")]
    BadRequest(String),

    /// The vendor call failed.
    #[error(transparent)]
    Vendor(#[from] VendorError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Vendor(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Vendor(e) = &self {
            tracing::error!(error = %e, "Vendor call failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error for routes that answer in the `{"ok": ..}` envelope.
///
/// Same status codes as [`ApiError`], body `{"ok": false, "error": "..."}`.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct EnvelopeError(#[from] pub ApiError);

impl From<VendorError> for EnvelopeError {
    fn from(e: VendorError) -> Self {
        Self(ApiError::Vendor(e))
    }
}

impl IntoResponse for EnvelopeError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if let ApiError::Vendor(e) = &self.0 {
            tracing::error!(error = %e, "Vendor call failed");
        }
        (status, Json(json!({ "ok": false, "error": self.0.to_string() }))).into_response()
    }
}
