//! Axum middleware enforcing signed requests.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{OriginalUri, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::guard::verifier::{SignedParts, Verifier};
use crate::observability::metrics;
use crate::signing::{method_carries_body, SIGNATURE_HEADER, TIMESTAMP_HEADER};

/// State shared by every guarded route.
#[derive(Debug, Clone)]
pub struct GuardState {
    pub verifier: Arc<Verifier>,
    /// Upper bound when buffering the body for verification.
    pub max_body_size: usize,
}

/// Verify the request before the handler runs.
///
/// On success the buffered body is put back into the request and an
/// [`Authorized`](crate::guard::Authorized) extension is attached, so
/// handlers parse the same bytes that were verified.
pub async fn require_signature(
    State(state): State<GuardState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    // Nested routers rewrite the URI; sign against what the client sent.
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());
    let method = parts.method.as_str().to_ascii_uppercase();
    let request_id = parts
        .headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let mut body_error = None;
    let body_bytes = if method_carries_body(&method) {
        match axum::body::to_bytes(body, state.max_body_size).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    request_id = %request_id,
                    limit = state.max_body_size,
                    error = %e,
                    "Request body unreadable, verifying with an empty body"
                );
                body_error = Some(e.to_string());
                Bytes::new()
            }
        }
    } else {
        Bytes::new()
    };

    let header = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());
    let signed = SignedParts {
        signature: header(SIGNATURE_HEADER),
        timestamp: header(TIMESTAMP_HEADER),
        method: &method,
        path: &path,
    };

    match state.verifier.verify(signed, body_bytes) {
        Ok(authorized) => {
            metrics::record_verification("authorized");
            let body = Body::from(authorized.body().clone());
            parts.extensions.insert(authorized);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(rejection) => {
            warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                reason = %rejection,
                body_error = body_error.as_deref().unwrap_or("none"),
                "Rejected unsigned or tampered request"
            );
            metrics::record_verification("rejected");
            metrics::record_rejection(rejection.reason());
            rejection.into_response()
        }
    }
}
