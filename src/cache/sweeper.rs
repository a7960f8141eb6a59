//! Background removal of stale cache entries.
//!
//! Lookups already ignore stale entries; the sweep only bounds memory held by
//! keys that are never read again.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

/// Call `purge` every `interval` until `shutdown` fires.
pub async fn run_sweeper<F>(interval: Duration, mut shutdown: broadcast::Receiver<()>, purge: F)
where
    F: Fn() -> usize,
{
    tracing::info!(interval_secs = interval.as_secs(), "Cache sweeper starting");

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    // The first tick completes immediately; there is nothing to sweep yet.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = purge();
                if removed > 0 {
                    tracing::debug!(removed, "Swept stale cache entries");
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Cache sweeper received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
