//! Trending decay background job.
//!
//! Runs for the life of the process, multiplying every trending score by
//! the decay factor once per hour and evicting near-zero entries. Interest
//! profiles are not touched here; they decay per-write in the enricher.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::analytics::AnalyticsStore;
use crate::metrics;

pub const DECAY_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub async fn start_trending_decay(store: Arc<AnalyticsStore>, mut shutdown: watch::Receiver<bool>) {
    info!(
        interval_secs = DECAY_INTERVAL.as_secs(),
        "starting trending decay loop"
    );

    let mut ticker = interval(DECAY_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval fires immediately; the first decay belongs one full period out
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let start = Instant::now();
                match store.decay_trending().await {
                    Ok(()) => {
                        metrics::record_decay_tick("success", start.elapsed());
                    }
                    Err(e) => {
                        metrics::record_decay_tick("error", start.elapsed());
                        error!(error = %e, "trending decay failed, retrying next tick");
                    }
                }
            }
            _ = shutdown.changed() => {
                info!("trending decay loop stopping");
                return;
            }
        }
    }
}
