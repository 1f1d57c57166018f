//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired volatile items.

use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::Table;

/// Handle to a running sweeper.
///
/// The task holds only a weak reference to the table, so it never keeps a
/// store alive. Dropping the handle stops the task.
#[derive(Debug)]
pub struct Sweeper {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    // == Start ==
    /// Spawns the sweep loop on `runtime`, sweeping every `interval`.
    ///
    /// # Arguments
    /// * `runtime` - Tokio runtime to spawn on
    /// * `table` - Weak reference to the table to sweep
    /// * `interval` - Delay between sweeps
    /// * `name` - Store name, used in log output
    pub fn start<K, V>(
        runtime: &Handle,
        table: Weak<Mutex<Table<K, V>>>,
        interval: Duration,
        name: String,
    ) -> Self
    where
        K: Eq + std::hash::Hash + Clone + Send + 'static,
        V: Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            store = %name,
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "Starting expiry sweeper"
        );
        let handle = runtime.spawn(sweep_loop(table, interval, name, shutdown_rx));

        Self {
            shutdown_tx,
            handle,
        }
    }

    // == Stop ==
    /// Signals the task to exit. Idempotent.
    pub fn stop(&self) {
        if !*self.shutdown_tx.borrow() {
            let _ = self.shutdown_tx.send(true);
            debug!("Expiry sweeper stop requested");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The sweep loop. Exits on shutdown or once the table is gone.
async fn sweep_loop<K, V>(
    table: Weak<Mutex<Table<K, V>>>,
    interval: Duration,
    name: String,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    K: Eq + std::hash::Hash + Clone,
{
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    info!(store = %name, "Expiry sweeper stopped");
                    return;
                }
            }
        }

        let Some(shared) = table.upgrade() else {
            debug!(store = %name, "Store dropped, expiry sweeper exiting");
            return;
        };

        let (removed, remaining) = {
            let mut guard = shared.lock();
            let removed = guard.sweep(Instant::now());
            (removed, guard.size())
        };

        if removed > 0 {
            info!(store = %name, removed, remaining, "Expiry sweep removed expired items");
        } else {
            debug!(store = %name, remaining, "Expiry sweep found no expired items");
        }
    }
}
