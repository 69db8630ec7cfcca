//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, limits, timeout)
//!     → guard (signature check on protected routes)
//!     → handlers.rs (validate input, call vendor)
//!     → response.rs (error mapping)
//!     → Send to client
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use response::{ApiError, ApiResult, EnvelopeError};
pub use server::{AppState, HttpServer};
