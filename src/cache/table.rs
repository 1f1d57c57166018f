//! Item Table Module
//!
//! Owned key to item map plus the operation counters of its store.
//! Not synchronized; the store wraps it in a single lock.

use std::collections::HashMap;
use std::hash::Hash;

use tokio::time::Instant;

use crate::cache::{Item, Lifetime, Operations};

// == Table ==
#[derive(Debug)]
pub struct Table<K, V> {
    /// Key to item storage, len() is the live count
    items: HashMap<K, Item<V>>,
    /// Request counters since the last metrics read
    operations: Operations,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
            operations: Operations::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> Table<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    // == Put ==
    /// Stores an item, returning the one it replaced.
    ///
    /// Size grows only when the key is new.
    pub fn put(&mut self, key: K, item: Item<V>) -> Option<Item<V>> {
        self.items.insert(key, item)
    }

    pub fn get(&self, key: &K) -> Option<&Item<V>> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut Item<V>> {
        self.items.get_mut(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    // == Remove ==
    /// Removes a key, returning whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.items.remove(key).is_some()
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    // == Keys ==
    /// Snapshot of the keys present right now.
    pub fn keys(&self) -> Vec<K> {
        self.items.keys().cloned().collect()
    }

    // == Retain Permanent ==
    /// Drops every volatile item, expired or not.
    ///
    /// Returns the number of items removed.
    pub fn retain_permanent(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|_, item| item.lifetime == Lifetime::Permanent);
        before - self.items.len()
    }

    // == Sweep ==
    /// Removes every volatile item expired at `now`.
    ///
    /// Returns the number of items removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        for key in self.keys() {
            let expired = self
                .items
                .get(&key)
                .is_some_and(|item| item.is_expired(now));
            if expired && self.remove(&key) {
                removed += 1;
            }
        }
        removed
    }

    pub fn operations(&self) -> &Operations {
        &self.operations
    }

    pub fn operations_mut(&mut self) -> &mut Operations {
        &mut self.operations
    }
}
