//! Signing payload construction.
//!
//! # Responsibilities
//! - Normalize the request path the way the server will observe it
//! - Concatenate `<timestamp><METHOD><path><body>` with no delimiters
//!
//! # Design Decisions
//! - The body is kept as raw bytes; the server signs exactly what it received
//! - `GET` and `HEAD` never contribute a body

use url::Url;

/// Base used to resolve relative paths; only the path component survives.
const CANONICAL_BASE: &str = "http://localhost";

/// Returns false for methods whose body is never part of the signature.
pub fn method_carries_body(method: &str) -> bool {
    !(method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD"))
}

/// Reduce a relative path (or a stray absolute URL) to its path component.
///
/// Query strings and fragments are dropped. Paths that cannot be resolved
/// only get a leading slash.
pub fn canonical_path(path: &str) -> String {
    let resolved = Url::parse(CANONICAL_BASE).and_then(|base| base.join(path));
    match resolved {
        Ok(url) => url.path().to_string(),
        Err(_) if path.starts_with('/') => path.to_string(),
        Err(_) => format!("/{}", path),
    }
}

/// The exact byte string covered by a request signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningPayload {
    timestamp: String,
    method: String,
    path: String,
    body: Vec<u8>,
}

impl SigningPayload {
    /// Build a payload from request parts.
    ///
    /// `method` is uppercased; the body is dropped for `GET`/`HEAD`.
    pub fn new(
        timestamp: impl Into<String>,
        method: &str,
        path: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        let method = method.to_ascii_uppercase();
        let body = if method_carries_body(&method) {
            body.into()
        } else {
            Vec::new()
        };
        Self {
            timestamp: timestamp.into(),
            method,
            path: path.into(),
            body,
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Concatenated bytes fed to the MAC.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            self.timestamp.len() + self.method.len() + self.path.len() + self.body.len(),
        );
        out.extend_from_slice(self.timestamp.as_bytes());
        out.extend_from_slice(self.method.as_bytes());
        out.extend_from_slice(self.path.as_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}
