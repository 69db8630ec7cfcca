//! Request integrity guard.
//!
//! # Data Flow
//! ```text
//! Inbound request on a guarded route
//!     → middleware.rs (read body once, collect headers/method/path)
//!     → verifier.rs (presence → freshness → payload → constant-time compare)
//!     → replay.rs (optional, reject reuse within the skew window)
//!     → Authorized { body } attached to the request
//!     → handler parses the verified bytes
//!
//! Any failure → 403 text/plain, reason logged server-side only.
//! ```
//!
//! # Design Decisions
//! - One response for every rejection reason
//! - No retries at this layer; clients re-sign with a fresh timestamp
//! - Replay within the window is allowed unless the cache is enabled

pub mod error;
pub mod middleware;
pub mod replay;
pub mod verifier;

pub use error::{Rejection, REJECTION_BODY};
pub use middleware::{require_signature, GuardState};
pub use replay::ReplayCache;
pub use verifier::{Authorized, SignedParts, Verifier};
