//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the life of a store.
//!
//! # Tasks
//! - Expiry Sweeper: Removes expired volatile items every `item_ttl / 2` plus jitter

mod sweeper;

pub use sweeper::Sweeper;
