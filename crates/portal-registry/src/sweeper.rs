//! Background sweep that purges dead links.
//!
//! Lazy eviction only fires when a token is accessed, so links that expire
//! without ever being visited again would stay in memory forever. The
//! sweeper complements it by periodically dropping every dead record.
//!
//! The task is bound to the registry lifecycle: it is spawned on the
//! current tokio runtime at construction and stopped through a
//! [`CancellationToken`] on shutdown or drop.

use crate::error::{RegistryError, Result};
use crate::store::LinkStore;
use jiff::Timestamp;
use parking_lot::Mutex;
use portal_core::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Handle to a running sweep task.
#[derive(Debug)]
pub struct Sweeper {
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Sweeper {
    /// Spawns the sweep loop on the current tokio runtime.
    ///
    /// Fails with [`RegistryError::SchedulerUnavailable`] when called outside
    /// a runtime, and with [`RegistryError::InvalidSettings`] when the first
    /// tick at `now + every` cannot be represented.
    pub fn spawn<C: Clock>(store: Arc<LinkStore>, clock: Arc<C>, every: Duration) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| RegistryError::SchedulerUnavailable(e.to_string()))?;

        // First sweep one full period after start.
        let start = Instant::now().checked_add(every).ok_or_else(|| {
            RegistryError::InvalidSettings(format!("sweep interval {every:?} is too large"))
        })?;

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(run_sweep_loop(store, clock, start, every, cancel.clone()));

        Ok(Self {
            cancel,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Stops the loop from starting any further sweep.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancels the loop and waits for the task to finish. Idempotent.
    pub async fn shutdown(&self) {
        self.cancel();

        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "link sweep task ended abnormally");
            }
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_sweep_loop<C: Clock>(
    store: Arc<LinkStore>,
    clock: Arc<C>,
    start: Instant,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(start, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(interval = ?every, "link sweep task started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("link sweep task shutting down");
                break;
            }
            _ = ticker.tick() => {
                sweep_once(&store, clock.now());
            }
        }
    }
}

/// Runs a single sweep pass over `store`.
pub(crate) fn sweep_once(store: &LinkStore, now: Timestamp) -> usize {
    let removed = store.purge_dead(now);

    if removed > 0 {
        info!(removed, remaining = store.len(), "purged dead links");
    } else {
        debug!("link sweep: nothing to purge");
    }

    removed
}
