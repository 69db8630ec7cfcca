//! Request signing primitives shared by the client signer and the server verifier.
//!
//! # Data Flow
//! ```text
//! Client:
//!     body → canonical.rs (stable JSON)
//!     path → payload.rs (canonical path)
//!     timestamp + METHOD + path + body → mac.rs (HMAC-SHA256, hex)
//!     → x-signature / x-timestamp headers
//!
//! Server:
//!     headers + method + observed path + raw body bytes
//!     → payload.rs (rebuild verbatim)
//!     → mac.rs (recompute, constant-time compare)
//! ```
//!
//! # Design Decisions
//! - The payload has no delimiters; both sides must agree byte-for-byte
//! - The secret is injected, never read from the environment here
//! - Signatures are lowercase hex and always 64 characters

pub mod canonical;
pub mod mac;
pub mod payload;

pub use canonical::{format_number, stable_stringify};
pub use mac::{constant_time_eq, SharedSecret, Signature};
pub use payload::{canonical_path, method_carries_body, SigningPayload};

/// Header carrying the hex HMAC digest.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Header carrying the signing timestamp in milliseconds since the Unix epoch.
pub const TIMESTAMP_HEADER: &str = "x-timestamp";

/// Maximum tolerated distance between the signed timestamp and the verifier clock.
pub const MAX_CLOCK_SKEW_MS: u64 = 3 * 60 * 1000;

/// Length of a hex-encoded SHA-256 digest.
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Current wall clock in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
