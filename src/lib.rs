//! Storefront request integrity guard.
//!
//! Signs outgoing storefront API calls with HMAC-SHA256 and verifies them
//! on the server before any handler sees the body.

pub mod client;
pub mod config;
pub mod guard;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod signing;
pub mod vendor;

pub use client::{ClientError, SecureClient};
pub use config::GuardConfig;
pub use guard::{Rejection, Verifier};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use signing::SharedSecret;
