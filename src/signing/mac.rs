//! HMAC-SHA256 signing and constant-time comparison.
//!
//! # Security
//! - The secret is never logged; `Debug` is redacted
//! - Comparison never short-circuits on content or length

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::signing::payload::SigningPayload;
use crate::signing::SIGNATURE_HEX_LEN;

type HmacSha256 = Hmac<Sha256>;

/// Shared symmetric key held by the signer and the verifier.
#[derive(Clone)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self(secret.as_ref().to_vec())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sign a payload, returning the lowercase hex digest.
    pub fn sign(&self, payload: &SigningPayload) -> Signature {
        self.sign_bytes(&payload.to_bytes())
    }

    /// Sign arbitrary bytes.
    pub fn sign_bytes(&self, bytes: &[u8]) -> Signature {
        // HMAC accepts keys of any length.
        let mut mac = HmacSha256::new_from_slice(&self.0).expect("HMAC key size is always valid");
        mac.update(bytes);
        Signature(hex::encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

impl From<&str> for SharedSecret {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for SharedSecret {
    fn from(secret: String) -> Self {
        Self(secret.into_bytes())
    }
}

/// Lowercase hex HMAC-SHA256 digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a signature received on the wire.
    ///
    /// The received value is lowercased first. A wrong length can never match
    /// a real digest and is rejected before the constant-time step.
    pub fn matches(&self, received: &str) -> bool {
        let received = received.to_ascii_lowercase();
        if received.len() != SIGNATURE_HEX_LEN {
            return false;
        }
        constant_time_eq(self.0.as_bytes(), received.as_bytes())
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Constant-time byte comparison tolerant of length mismatch.
///
/// Both operands are padded to the longer length with different fill bytes,
/// and the length check is folded into the result.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let max_len = a.len().max(b.len());

    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a);
    b_padded[..b.len()].copy_from_slice(b);

    let lengths_equal = (a.len() as u64).ct_eq(&(b.len() as u64));
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}
