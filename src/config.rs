//! Configuration Module
//!
//! Builds and validates store configuration from code, environment variables
//! or a JSON options document.

use std::env;
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use tokio::time::Instant;

use crate::error::ConfigError;

/// Default capacity (10,000 items)
pub const DEFAULT_MAX_SIZE: usize = 10_000;

/// Default item TTL (5 minutes)
pub const DEFAULT_ITEM_TTL: Duration = Duration::from_millis(5 * 60 * 1000);

/// Default upper bound of the random delay added to the sweep interval
pub const DEFAULT_SWEEP_JITTER: Duration = Duration::from_millis(5);

/// Floor of the derived sweep interval
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Store configuration parameters.
///
/// # Example
/// ```rust
/// use kvs_memory::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_name("sessions")
///     .with_max_size(500)
///     .with_item_ttl(Duration::from_secs(30));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Store name, None = next sequential name from the registry
    pub name: Option<String>,
    /// Maximum number of items the store can hold
    pub max_size: usize,
    /// Lifetime given to volatile items on insert, upsert and get
    pub item_ttl: Duration,
    /// Upper bound of the random delay added to `item_ttl / 2`
    pub sweep_jitter: Duration,
    /// Fixed sweep interval, replacing the derived one when set
    pub sweep_interval: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: None,
            max_size: DEFAULT_MAX_SIZE,
            item_ttl: DEFAULT_ITEM_TTL,
            sweep_jitter: DEFAULT_SWEEP_JITTER,
            sweep_interval: None,
        }
    }
}

/// Options document accepted by [`StoreConfig::from_json`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreOptions {
    name: Option<String>,
    max_size: Option<i64>,
    #[serde(rename = "itemTTL")]
    item_ttl: Option<i64>,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_item_ttl(mut self, item_ttl: Duration) -> Self {
        self.item_ttl = item_ttl;
        self
    }

    pub fn with_sweep_jitter(mut self, jitter: Duration) -> Self {
        self.sweep_jitter = jitter;
        self
    }

    /// Pins the sweep interval instead of deriving it from the TTL.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    // == From Env ==
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `KVS_NAME` - Store name (default: sequential `kvs-<n>`)
    /// - `KVS_MAX_SIZE` - Maximum items (default: 10000)
    /// - `KVS_ITEM_TTL_MS` - Item TTL in milliseconds (default: 300000)
    /// - `KVS_SWEEP_JITTER_MS` - Sweep jitter bound in milliseconds (default: 5)
    ///
    /// Unset variables take their default. Unparseable or non-positive
    /// values are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(name) = env::var("KVS_NAME") {
            config.name = Some(name);
        }
        if let Some(max_size) = parse_env("KVS_MAX_SIZE")? {
            config.max_size = to_max_size(max_size)?;
        }
        if let Some(ttl) = parse_env("KVS_ITEM_TTL_MS")? {
            config.item_ttl = to_item_ttl(ttl)?;
        }
        if let Some(jitter) = parse_env("KVS_SWEEP_JITTER_MS")? {
            let jitter = u64::try_from(jitter).map_err(|_| ConfigError::InvalidEnv {
                var: "KVS_SWEEP_JITTER_MS",
                value: jitter.to_string(),
            })?;
            config.sweep_jitter = Duration::from_millis(jitter);
        }

        config.validate()?;
        Ok(config)
    }

    // == From JSON ==
    /// Parses an options object such as
    /// `{"name": "users", "maxSize": 100, "itemTTL": 5000}`.
    ///
    /// Every field is optional; `itemTTL` is in milliseconds.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let opts: StoreOptions = serde_json::from_str(json)?;
        let mut config = Self::default();

        config.name = opts.name;
        if let Some(max_size) = opts.max_size {
            config.max_size = to_max_size(max_size)?;
        }
        if let Some(ttl) = opts.item_ttl {
            config.item_ttl = to_item_ttl(ttl)?;
        }

        config.validate()?;
        Ok(config)
    }

    // == Validate ==
    /// Checks that every value is usable by a store.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if matches!(self.name.as_deref(), Some("")) {
            return Err(ConfigError::InvalidName);
        }
        if self.max_size == 0 {
            return Err(ConfigError::InvalidMaxSize(0));
        }
        if self.item_ttl.is_zero() {
            return Err(ConfigError::InvalidItemTtl(0));
        }
        // Expiration instants are `now + item_ttl`
        if Instant::now().checked_add(self.item_ttl).is_none() {
            let ms = i64::try_from(self.item_ttl.as_millis()).unwrap_or(i64::MAX);
            return Err(ConfigError::InvalidItemTtl(ms));
        }
        if self.sweep_interval.is_some_and(|interval| interval.is_zero()) {
            return Err(ConfigError::InvalidSweepInterval);
        }
        Ok(())
    }

    // == Sweep Interval ==
    /// Returns the delay between two sweeps.
    ///
    /// Half the item TTL plus a random jitter in `[0, sweep_jitter]`, so
    /// stores created together do not sweep in lockstep. Never shorter than
    /// [`MIN_SWEEP_INTERVAL`].
    pub fn sweep_interval(&self) -> Duration {
        if let Some(interval) = self.sweep_interval {
            return interval;
        }
        let jitter = rand::thread_rng().gen_range(Duration::ZERO..=self.sweep_jitter);
        (self.item_ttl / 2)
            .saturating_add(jitter)
            .max(MIN_SWEEP_INTERVAL)
    }
}

fn parse_env(var: &'static str) -> Result<Option<i64>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        Err(_) => Ok(None),
    }
}

fn to_max_size(value: i64) -> Result<usize, ConfigError> {
    match usize::try_from(value) {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::InvalidMaxSize(value)),
    }
}

fn to_item_ttl(value: i64) -> Result<Duration, ConfigError> {
    match u64::try_from(value) {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidItemTtl(value)),
    }
}
