//! Store Item Module
//!
//! Defines individual store items and the expiration policy applied to them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

// == Lifetime ==
/// Lifetime class of an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifetime {
    /// Never expires, survives `clear`, cannot be deleted
    Permanent,
    /// Expires after the store's item TTL
    #[default]
    Volatile,
}

impl Lifetime {
    pub fn is_permanent(self) -> bool {
        self == Lifetime::Permanent
    }
}

/// Numeric item-type codes: `0` is permanent, anything else is volatile.
impl From<u8> for Lifetime {
    fn from(code: u8) -> Self {
        match code {
            0 => Lifetime::Permanent,
            _ => Lifetime::Volatile,
        }
    }
}

// == Item ==
/// A stored value with its lifetime class and expiration instant.
#[derive(Debug, Clone)]
pub struct Item<V> {
    /// The stored value
    pub value: V,
    /// Lifetime class
    pub lifetime: Lifetime,
    /// Absolute expiration, never consulted for permanent items
    pub expires_at: Instant,
}

impl<V> Item<V> {
    // == Constructor ==
    /// Creates an item expiring `ttl` after `now`.
    pub fn new(value: V, lifetime: Lifetime, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            lifetime,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the item has expired at `now`.
    ///
    /// Boundary condition: an item expiring exactly at `now` is still live;
    /// it expires once `now` is strictly past `expires_at`. Permanent items
    /// never expire.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.lifetime {
            Lifetime::Permanent => false,
            Lifetime::Volatile => self.expires_at < now,
        }
    }

    // == Touch ==
    /// Slides the expiration to `now + ttl`.
    pub fn touch(&mut self, now: Instant, ttl: Duration) {
        self.expires_at = now + ttl;
    }
}
