//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, environment overrides for secrets)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!     → injected into verifier, vendor client and server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only the loader touches the environment; the core receives values

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ClientConfig, GuardConfig, ListenerConfig, LogFormat, ObservabilityConfig, SecurityConfig,
    SigningConfig, TimeoutConfig, VendorConfig,
};
pub use validation::ValidationError;
