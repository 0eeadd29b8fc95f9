//! Background eviction of idle sessions.

use super::registry::SessionManager;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument};

/// Runs [`SessionManager::collect_garbage`] every `interval` until the
/// returned task is aborted.
///
/// The first sweep happens one interval after the call.
#[instrument(skip(manager))]
pub fn spawn_garbage_collector(
    manager: SessionManager,
    interval: Duration,
    timeout: Duration,
) -> JoinHandle<()> {
    info!(?interval, ?timeout, "Starting garbage collector");
    tokio::spawn(async move {
        let interval = interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let evicted = manager.collect_garbage(timeout).await;
            debug!(evicted, sessions = manager.len(), "Sweep finished");
        }
    })
}
