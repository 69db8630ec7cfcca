//! Client-side request signer.
//!
//! Mirrors what the browser storefront does before calling a guarded route:
//! canonicalize, sign, send with a deadline, and surface timeouts separately
//! from server rejections.

pub mod error;
pub mod signer;

pub use error::{ClientError, ClientResult};
pub use signer::{sign_request, HttpMethod, SecureClient, SignedRequest};
