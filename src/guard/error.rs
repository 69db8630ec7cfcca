//! Rejection reasons produced by the request verifier.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Generic body returned for every rejection.
pub const REJECTION_BODY: &str = "This endpoint requires a signed request.";

/// Why a request failed verification.
///
/// Every variant maps to the same HTTP response; the reason only reaches
/// server-side logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// `x-signature` or `x-timestamp` absent or empty.
    #[error("Missing signature")]
    MissingSignature,

    /// `x-timestamp` is not a finite number.
    #[error("Bad timestamp")]
    BadTimestamp,

    /// Timestamp outside the allowed clock skew.
    #[error("Stale timestamp")]
    StaleTimestamp,

    /// Signature does not match the recomputed digest.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signature already accepted within the skew window.
    #[error("Replayed signature")]
    Replayed,
}

impl Rejection {
    /// Stable label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::MissingSignature => "missing_signature",
            Rejection::BadTimestamp => "bad_timestamp",
            Rejection::StaleTimestamp => "stale_timestamp",
            Rejection::InvalidSignature => "invalid_signature",
            Rejection::Replayed => "replayed",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            REJECTION_BODY,
        )
            .into_response()
    }
}
