//! Store Iterator Module
//!
//! Lazy, one-shot walk over a snapshot of store keys.

use std::hash::Hash;
use std::iter::FusedIterator;
use std::vec;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::cache::{Lifetime, Table};

// == Entries ==
/// Iterator returned by [`Store::iter`](crate::cache::Store::iter).
///
/// Holds the key set captured at creation. Each step locks the table,
/// looks the next key up again and skips it if it was removed or has
/// expired. Yields `(key, value, lifetime)`.
pub struct Entries<'a, K, V> {
    table: &'a Mutex<Table<K, V>>,
    keys: vec::IntoIter<K>,
}

impl<'a, K, V> Entries<'a, K, V> {
    pub(crate) fn new(table: &'a Mutex<Table<K, V>>, keys: Vec<K>) -> Self {
        Self {
            table,
            keys: keys.into_iter(),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Iterator for Entries<'_, K, V> {
    type Item = (K, V, Lifetime);

    fn next(&mut self) -> Option<Self::Item> {
        for key in self.keys.by_ref() {
            let now = Instant::now();
            let mut table = self.table.lock();

            let found = match table.get(&key) {
                Some(item) if !item.is_expired(now) => Some((item.value.clone(), item.lifetime)),
                _ => None,
            };

            if let Some((value, lifetime)) = found {
                table.operations_mut().record_get();
                return Some((key, value, lifetime));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.keys.size_hint().1)
    }
}

impl<K: Eq + Hash + Clone, V: Clone> FusedIterator for Entries<'_, K, V> {}
