//! kvs_memory demo
//!
//! Builds a store from the environment, runs a short session-cache workload
//! against it and reports metrics until interrupted.

use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kvs_memory::{ErrorKind, Lifetime, Metrics, Store, StoreConfig};

/// Interval between two metrics reports
const REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Metrics snapshot stamped with the time it was taken.
#[derive(Debug, Serialize)]
struct MetricsReport {
    timestamp: String,
    #[serde(flatten)]
    metrics: Metrics,
}

impl MetricsReport {
    fn new(metrics: Metrics) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            metrics,
        }
    }
}

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the store (starts its expiry sweeper)
/// 4. Seed it with a few permanent and volatile items
/// 5. Report metrics periodically until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvs_memory=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StoreConfig::from_env().context("loading store configuration")?;
    let store: Store<String, String> = Store::new(config).context("creating store")?;
    info!(info = ?store.info(), "Store ready");

    seed(&store)?;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut reports = tokio::time::interval(REPORT_INTERVAL);
    loop {
        tokio::select! {
            _ = reports.tick() => {
                let report = MetricsReport::new(store.metrics());
                info!("{}", serde_json::to_string(&report)?);
            }
            _ = &mut shutdown => break,
        }
    }

    store.shutdown();
    info!(size = store.len(), "Shutdown complete");
    Ok(())
}

/// Inserts a handful of items and exercises each failure path once.
fn seed(store: &Store<String, String>) -> anyhow::Result<()> {
    store.insert_with_lifetime(
        "config:motd".to_string(),
        "welcome".to_string(),
        Lifetime::Permanent,
    )?;
    for n in 1..=3 {
        store.upsert(format!("session:{}", n), format!("user-{}", n))?;
    }

    if let Err(err) = store.insert("session:1".to_string(), "dup".to_string()) {
        warn!(kind = ?err.kind(), "{}", err);
    }
    match store.delete(&"config:motd".to_string()) {
        Err(err) if err.kind() == ErrorKind::ProtectedItem => {
            warn!(kind = ?err.kind(), "{}", err)
        }
        other => other?,
    }

    for (key, value, lifetime) in store {
        info!(%key, %value, ?lifetime, "seeded");
    }
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
