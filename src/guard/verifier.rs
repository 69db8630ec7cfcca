//! Server-side request verification.
//!
//! # Responsibilities
//! - Check presence of `x-signature` / `x-timestamp`
//! - Enforce the clock skew window
//! - Rebuild the payload from the verbatim request bytes
//! - Compare signatures in constant time
//!
//! # Design Decisions
//! - Pure and stateless unless a replay cache is attached
//! - The clock is a parameter so the skew boundary is testable
//! - The raw body travels with the decision; nobody re-reads the stream

use std::sync::Arc;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::guard::error::Rejection;
use crate::guard::replay::ReplayCache;
use crate::signing::{now_millis, SharedSecret, SigningPayload, MAX_CLOCK_SKEW_MS};

/// The parts of an inbound request that participate in verification.
#[derive(Debug, Clone, Copy)]
pub struct SignedParts<'a> {
    /// Raw `x-signature` header value.
    pub signature: Option<&'a str>,
    /// Raw `x-timestamp` header value.
    pub timestamp: Option<&'a str>,
    pub method: &'a str,
    /// Path as the server observed it, without query.
    pub path: &'a str,
}

/// A request that passed verification, carrying the body it was verified with.
#[derive(Debug, Clone, Default)]
pub struct Authorized {
    body: Bytes,
}

impl Authorized {
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text; `None` if the bytes are not UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Parse the verified body as JSON. An empty body parses as `{}`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        if self.body.is_empty() {
            serde_json::from_slice(b"{}")
        } else {
            serde_json::from_slice(&self.body)
        }
    }
}

/// Verifies signed requests against a shared secret.
#[derive(Debug, Clone)]
pub struct Verifier {
    secret: SharedSecret,
    replay_cache: Option<Arc<ReplayCache>>,
}

impl Verifier {
    pub fn new(secret: SharedSecret) -> Self {
        Self {
            secret,
            replay_cache: None,
        }
    }

    /// Reject signatures already accepted within the skew window.
    pub fn with_replay_cache(mut self, cache: Arc<ReplayCache>) -> Self {
        self.replay_cache = Some(cache);
        self
    }

    /// Verify against the current wall clock.
    pub fn verify(&self, parts: SignedParts<'_>, body: Bytes) -> Result<Authorized, Rejection> {
        self.verify_at(parts, body, now_millis())
    }

    /// Verify as if the clock read `now_ms`.
    ///
    /// `body` is ignored for `GET` and `HEAD`.
    pub fn verify_at(
        &self,
        parts: SignedParts<'_>,
        body: Bytes,
        now_ms: u64,
    ) -> Result<Authorized, Rejection> {
        let (signature, timestamp) = match (parts.signature, parts.timestamp) {
            (Some(sig), Some(ts)) if !sig.is_empty() && !ts.is_empty() => (sig, ts),
            _ => return Err(Rejection::MissingSignature),
        };

        check_freshness(timestamp, now_ms)?;

        let payload = SigningPayload::new(timestamp, parts.method, parts.path, body.to_vec());
        let expected = self.secret.sign(&payload);
        if !expected.matches(signature) {
            return Err(Rejection::InvalidSignature);
        }

        if let Some(cache) = &self.replay_cache {
            if !cache.check_and_record(expected.as_str(), now_ms) {
                return Err(Rejection::Replayed);
            }
        }

        let body = if payload.body().is_empty() {
            Bytes::new()
        } else {
            body
        };
        Ok(Authorized { body })
    }
}

/// Inclusive at exactly `MAX_CLOCK_SKEW_MS`.
fn check_freshness(timestamp: &str, now_ms: u64) -> Result<(), Rejection> {
    let ts: f64 = timestamp
        .trim()
        .parse()
        .map_err(|_| Rejection::BadTimestamp)?;
    if !ts.is_finite() {
        return Err(Rejection::BadTimestamp);
    }
    let skew = (now_ms as f64 - ts).abs();
    if skew > MAX_CLOCK_SKEW_MS as f64 {
        return Err(Rejection::StaleTimestamp);
    }
    Ok(())
}
