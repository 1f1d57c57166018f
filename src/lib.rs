//! kvs_memory - An in-process key/value cache
//!
//! Bounded store with per-item TTL, permanent and volatile items, and a
//! background sweep reclaiming expired entries.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Entries, Info, Lifetime, Metrics, Operations, Store, StoreRegistry};
pub use config::StoreConfig;
pub use error::{ConfigError, ErrorKind, Result, StoreError};
