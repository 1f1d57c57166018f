//! Store Module
//!
//! Public facade combining the item table, the expiration policy and the
//! background sweeper.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::{Entries, Info, Item, Lifetime, Metrics, StoreRegistry, Table};
use crate::config::StoreConfig;
use crate::error::{ConfigError, Result, StoreError};
use crate::tasks::Sweeper;

// == Store ==
/// In-process key/value store with a capacity ceiling and per-item TTL.
///
/// Volatile items expire `item_ttl` after their last insert, upsert or get.
/// Expired items are hidden from reads immediately but are only reclaimed by
/// `delete`, `clear` or the background sweeper, so they keep counting toward
/// the size until then.
///
/// All operations take `&self`; one lock guards the table, its size and its
/// counters for the duration of each call.
///
/// # Example
/// ```rust
/// use kvs_memory::{ErrorKind, Lifetime, Store, StoreConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let store = Store::new(StoreConfig::default().with_max_size(1)).unwrap();
///
///     store.insert("a", 1).unwrap();
///     let err = store.insert("b", 2).unwrap_err();
///     assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
///
///     store.upsert("a", 10).unwrap();
///     assert_eq!(store.get(&"a").unwrap(), (10, Lifetime::Volatile));
/// }
/// ```
#[derive(Debug)]
pub struct Store<K, V> {
    name: String,
    max_size: usize,
    item_ttl: Duration,
    table: Arc<Mutex<Table<K, V>>>,
    sweeper: Sweeper,
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates a store, naming it from the global registry if needed.
    ///
    /// Must be called inside a tokio runtime, which hosts the sweeper.
    pub fn new(config: StoreConfig) -> std::result::Result<Self, ConfigError> {
        StoreRegistry::global().create(config)
    }

    /// Builds a store from an already validated config.
    pub(crate) fn build(
        name: String,
        config: &StoreConfig,
    ) -> std::result::Result<Self, ConfigError> {
        let runtime = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;

        let table = Arc::new(Mutex::new(Table::new()));
        let sweeper = Sweeper::start(
            &runtime,
            Arc::downgrade(&table),
            config.sweep_interval(),
            name.clone(),
        );

        info!(
            store = %name,
            max_size = config.max_size,
            item_ttl_ms = u64::try_from(config.item_ttl.as_millis()).unwrap_or(u64::MAX),
            "Store created"
        );

        Ok(Self {
            name,
            max_size: config.max_size,
            item_ttl: config.item_ttl,
            table,
            sweeper,
        })
    }

    // == Insert ==
    /// Adds a volatile item. Fails if the key is already present.
    pub fn insert(&self, key: K, value: V) -> Result<()> {
        self.insert_with_lifetime(key, value, Lifetime::Volatile)
    }

    /// Adds an item with the given lifetime.
    ///
    /// Fails with `CapacityExceeded` when the store is full, then with
    /// `AlreadyExists` when the key is present, even if its item expired.
    pub fn insert_with_lifetime(&self, key: K, value: V, lifetime: Lifetime) -> Result<()> {
        debug!(store = %self.name, ?key, "insert");
        let mut table = self.table.lock();
        table.operations_mut().record_insert();

        if table.size() >= self.max_size {
            return Err(StoreError::capacity_exceeded("insert"));
        }
        if table.contains(&key) {
            return Err(StoreError::already_exists());
        }

        table.put(key, Item::new(value, lifetime, Instant::now(), self.item_ttl));
        Ok(())
    }

    // == Upsert ==
    /// Creates or replaces a volatile item.
    pub fn upsert(&self, key: K, value: V) -> Result<()> {
        self.upsert_with_lifetime(key, value, Lifetime::Volatile)
    }

    /// Creates or replaces an item with the given lifetime.
    ///
    /// Replacing never checks capacity; creating fails with
    /// `CapacityExceeded` when the store is full.
    pub fn upsert_with_lifetime(&self, key: K, value: V, lifetime: Lifetime) -> Result<()> {
        debug!(store = %self.name, ?key, "upsert");
        let mut table = self.table.lock();
        table.operations_mut().record_upsert();

        if !table.contains(&key) && table.size() >= self.max_size {
            return Err(StoreError::capacity_exceeded("upsert"));
        }

        table.put(key, Item::new(value, lifetime, Instant::now(), self.item_ttl));
        Ok(())
    }

    // == Get ==
    /// Returns the value and lifetime for `key`, sliding its expiration
    /// forward by a full TTL.
    ///
    /// An expired item is reported as `NotFound` but left in place.
    pub fn get(&self, key: &K) -> Result<(V, Lifetime)> {
        debug!(store = %self.name, ?key, "get");
        let now = Instant::now();
        let mut table = self.table.lock();
        table.operations_mut().record_get();

        match table.get_mut(key) {
            Some(item) if !item.is_expired(now) => {
                item.touch(now, self.item_ttl);
                Ok((item.value.clone(), item.lifetime))
            }
            _ => Err(StoreError::not_found()),
        }
    }

    // == Delete ==
    /// Removes a live volatile item.
    ///
    /// Absent and expired keys are `NotFound`; permanent items are
    /// `ProtectedItem`.
    pub fn delete(&self, key: &K) -> Result<()> {
        debug!(store = %self.name, ?key, "delete");
        let now = Instant::now();
        let mut table = self.table.lock();
        table.operations_mut().record_delete();

        let (permanent, expired) = match table.get(key) {
            Some(item) => (item.lifetime.is_permanent(), item.is_expired(now)),
            None => return Err(StoreError::not_found()),
        };
        if permanent {
            return Err(StoreError::protected_item());
        }
        if expired {
            return Err(StoreError::not_found());
        }

        table.remove(key);
        Ok(())
    }

    // == Clear ==
    /// Removes every volatile item, expired or not. Permanent items stay.
    pub fn clear(&self) {
        let mut table = self.table.lock();
        table.operations_mut().record_clear();

        let removed = table.retain_permanent();
        debug!(store = %self.name, removed, size = table.size(), "cleared");
    }

    // == Iterate ==
    /// Returns a one-shot iterator over the items live at each step.
    ///
    /// The key set is captured now; each key is looked up again when
    /// reached, so items deleted in the meantime are skipped. Every yielded
    /// item counts as a get.
    pub fn iter(&self) -> Entries<'_, K, V> {
        let keys = self.table.lock().keys();
        debug!(store = %self.name, keys = keys.len(), "iterate");
        Entries::new(&self.table, keys)
    }

    // == Metrics ==
    /// Returns the current state and the operation counts since the last
    /// call, then resets those counts.
    pub fn metrics(&self) -> Metrics {
        let mut table = self.table.lock();
        let operations = table.operations_mut().take();

        Metrics {
            name: self.name.clone(),
            size: table.size(),
            max_size: self.max_size,
            operations,
        }
    }

    // == Info ==
    /// Returns the current state. Does not touch any counter.
    pub fn info(&self) -> Info {
        Info {
            name: self.name.clone(),
            size: self.table.lock().size(),
            max_size: self.max_size,
            item_ttl: self.item_ttl,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current number of items, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.table.lock().size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Shutdown ==
    /// Stops the background sweeper. Dropping the store does the same.
    pub fn shutdown(&self) {
        self.sweeper.stop();
    }
}

impl<'a, K, V> IntoIterator for &'a Store<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    V: Clone + Send + 'static,
{
    type Item = (K, V, Lifetime);
    type IntoIter = Entries<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
