//! Cache Module
//!
//! Provides the in-memory store with per-item TTL, capacity admission and
//! lazy plus active expiration.

mod item;
mod iter;
mod registry;
mod stats;
mod store;
mod table;


// Re-export public types
pub use item::{Item, Lifetime};
pub use iter::Entries;
pub use registry::{StoreRegistry, NAME_PREFIX};
pub use stats::{Info, Metrics, Operations};
pub use store::Store;
pub use table::Table;
