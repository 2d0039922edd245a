//! Inbound frame replay protection.
//!
//! Two checks per inbound frame:
//! - counter strictly greater than the last accepted counter
//! - nonce not seen within the last `window_ms`
//!
//! The guard is consulted before decryption and only updated after the
//! frame authenticates, so a forged frame cannot advance it.

use crate::domain::SessionError;
use shared_crypto::Nonce;
use std::collections::HashMap;

/// Sliding-window replay guard for one session key.
#[derive(Clone, Debug)]
pub struct ReplayGuard {
    /// Highest counter accepted so far
    last_counter: Option<u64>,
    /// Accepted nonces and when they were seen (unix ms)
    seen_nonces: HashMap<Nonce, u64>,
    /// Window duration (ms)
    window_ms: u64,
}

impl ReplayGuard {
    /// Create a guard with the given nonce window.
    pub fn new(window_ms: u64) -> Self {
        Self {
            last_counter: None,
            seen_nonces: HashMap::new(),
            window_ms,
        }
    }

    /// Check a frame without recording it.
    pub fn check(&self, counter: u64, nonce: &Nonce, now_ms: u64) -> Result<(), SessionError> {
        if let Some(last) = self.last_counter {
            if counter <= last {
                return Err(SessionError::Replay {
                    counter,
                    last: Some(last),
                });
            }
        }
        if let Some(&seen_at) = self.seen_nonces.get(nonce) {
            if self.within_window(seen_at, now_ms) {
                return Err(SessionError::Replay {
                    counter,
                    last: self.last_counter,
                });
            }
        }
        Ok(())
    }

    /// Record an authenticated frame and evict nonces older than the window.
    pub fn commit(&mut self, counter: u64, nonce: Nonce, now_ms: u64) {
        let window_ms = self.window_ms;
        self.seen_nonces
            .retain(|_, seen_at| now_ms.saturating_sub(*seen_at) <= window_ms);
        self.seen_nonces.insert(nonce, now_ms);
        self.last_counter = Some(counter);
    }

    /// Last accepted counter.
    pub fn last_counter(&self) -> Option<u64> {
        self.last_counter
    }

    /// Forget everything (new session key).
    pub fn clear(&mut self) {
        self.last_counter = None;
        self.seen_nonces.clear();
    }

    /// Number of tracked nonces.
    pub fn nonce_count(&self) -> usize {
        self.seen_nonces.len()
    }

    fn within_window(&self, seen_at: u64, now_ms: u64) -> bool {
        now_ms.saturating_sub(seen_at) <= self.window_ms
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new(60_000)
    }
}
