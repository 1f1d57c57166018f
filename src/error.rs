//! Error types for the key/value store
//!
//! Provides unified error handling using thiserror.

use serde::Serialize;
use thiserror::Error;

// == Error Kind ==
/// The four ways a store operation can fail.
///
/// Callers match on the kind, never on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The store holds `max_size` items and the key is new
    CapacityExceeded,
    /// The key is absent or its item has expired
    NotFound,
    /// The key is already present (expired or not)
    AlreadyExists,
    /// The key holds a permanent item, which cannot be deleted
    ProtectedItem,
}

impl ErrorKind {
    /// Numeric code for the kind, stable across releases.
    pub fn code(self) -> u8 {
        match self {
            ErrorKind::CapacityExceeded => 0,
            ErrorKind::NotFound => 1,
            ErrorKind::AlreadyExists => 2,
            ErrorKind::ProtectedItem => 3,
        }
    }
}

// == Store Error ==
/// Failure returned by a store operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreError {
    kind: ErrorKind,
    message: String,
}

impl StoreError {
    /// Creates an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn capacity_exceeded(op: &str) -> Self {
        Self::new(
            ErrorKind::CapacityExceeded,
            format!("{} failed, max size reached", op),
        )
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound, "item not found")
    }

    pub fn already_exists() -> Self {
        Self::new(
            ErrorKind::AlreadyExists,
            "insert failed, key already exists",
        )
    }

    pub fn protected_item() -> Self {
        Self::new(ErrorKind::ProtectedItem, "cannot delete permanent item")
    }

    /// Returns the failure kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

// == Config Error ==
/// Failure while building or validating a store configuration.
///
/// Raised before any store state exists.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Store name is empty
    #[error("invalid parameter, name must be a non-empty string")]
    InvalidName,

    /// Capacity is zero or negative
    #[error("invalid parameter, maxSize must be a positive number (got {0})")]
    InvalidMaxSize(i64),

    /// Item TTL is zero, negative or too large to compute an expiration
    #[error("invalid parameter, itemTTL must be a positive number (got {0})")]
    InvalidItemTtl(i64),

    /// Pinned sweep interval is zero
    #[error("invalid parameter, sweep interval must be positive")]
    InvalidSweepInterval,

    /// An environment variable could not be parsed
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    /// Options document is malformed or has wrong field types
    #[error("invalid options: {0}")]
    Parse(#[from] serde_json::Error),

    /// The sweeper needs a tokio runtime to be spawned on
    #[error("store must be created inside a tokio runtime")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
