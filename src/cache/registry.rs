//! Store Registry Module
//!
//! Hands out default store names from an explicit counter instead of
//! module-level mutable state.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use crate::cache::Store;
use crate::config::StoreConfig;
use crate::error::ConfigError;

/// Prefix of generated store names
pub const NAME_PREFIX: &str = "kvs-";

// == Store Registry ==
/// Source of sequential store names (`kvs-1`, `kvs-2`, ...).
#[derive(Debug, Default)]
pub struct StoreRegistry {
    count: AtomicU64,
}

impl StoreRegistry {
    pub const fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
        }
    }

    /// Process-wide registry used by [`Store::new`].
    pub fn global() -> &'static StoreRegistry {
        static GLOBAL: OnceLock<StoreRegistry> = OnceLock::new();
        GLOBAL.get_or_init(StoreRegistry::new)
    }

    // == Next Name ==
    pub fn next_name(&self) -> String {
        let n = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", NAME_PREFIX, n)
    }

    /// Number of names handed out so far.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    // == Create ==
    /// Validates `config` and builds a store, naming it from this registry
    /// when the config has no name.
    pub fn create<K, V>(&self, config: StoreConfig) -> Result<Store<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone + Debug + Send + 'static,
        V: Clone + Send + 'static,
    {
        config.validate()?;
        let name = match &config.name {
            Some(name) => name.clone(),
            None => self.next_name(),
        };
        Store::build(name, &config)
    }
}
