//! Optional replay cache.
//!
//! Remembers accepted signatures for the skew window so a captured request
//! cannot be resubmitted while its timestamp is still fresh. Off unless
//! `guard.replay_protection` is set.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::signing::MAX_CLOCK_SKEW_MS;

/// Entry count above which expired signatures are purged on insert.
pub const PURGE_THRESHOLD: usize = 10_000;

/// Signatures seen within the skew window, keyed by lowercase hex.
#[derive(Debug, Default)]
pub struct ReplayCache {
    seen: DashMap<String, u64>,
}

impl ReplayCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a signature. Returns `false` if it was already seen and has not
    /// expired yet.
    pub fn check_and_record(&self, signature: &str, now_ms: u64) -> bool {
        let expires_at = now_ms.saturating_add(MAX_CLOCK_SKEW_MS);
        let fresh = match self.seen.entry(signature.to_ascii_lowercase()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() > now_ms {
                    false
                } else {
                    entry.insert(expires_at);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(expires_at);
                true
            }
        };

        if fresh && self.seen.len() > PURGE_THRESHOLD {
            self.purge_expired(now_ms);
        }
        fresh
    }

    /// Drop every entry whose window has closed.
    pub fn purge_expired(&self, now_ms: u64) {
        let before = self.seen.len();
        self.seen.retain(|_, expires_at| *expires_at > now_ms);
        tracing::debug!(removed = before - self.seen.len(), "Purged replay cache");
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
