//! Store Statistics Module
//!
//! Tracks request volume per operation and the reports built from it.

use std::mem;
use std::time::Duration;

use serde::{Serialize, Serializer};

// == Operations ==
/// Requests received per operation since the last metrics read.
///
/// Counted on entry, whether or not the operation then succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Operations {
    pub insert: u64,
    pub upsert: u64,
    pub get: u64,
    #[serde(rename = "del")]
    pub delete: u64,
    pub clear: u64,
}

impl Operations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_insert(&mut self) {
        self.insert += 1;
    }

    pub fn record_upsert(&mut self) {
        self.upsert += 1;
    }

    pub fn record_get(&mut self) {
        self.get += 1;
    }

    pub fn record_delete(&mut self) {
        self.delete += 1;
    }

    pub fn record_clear(&mut self) {
        self.clear += 1;
    }

    // == Take ==
    /// Returns the current counts and resets every counter to zero.
    pub fn take(&mut self) -> Operations {
        mem::take(self)
    }

    /// Sum of all counters.
    pub fn total(&self) -> u64 {
        self.insert + self.upsert + self.get + self.delete + self.clear
    }
}

// == Metrics ==
/// Current state plus the operation counts since the previous read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub name: String,
    pub size: usize,
    pub max_size: usize,
    pub operations: Operations,
}

// == Info ==
/// Current state of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub name: String,
    pub size: usize,
    pub max_size: usize,
    #[serde(rename = "itemTTL", serialize_with = "as_millis")]
    pub item_ttl: Duration,
}

fn as_millis<S: Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX))
}
