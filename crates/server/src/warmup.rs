//! Periodic home-feed refresh.

use std::sync::Arc;
use std::time::Duration;

use marquee_metadata::aggregate::Aggregator;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Re-fetch the home feed every `every`, starting immediately. There is no
/// backoff; a failed run just waits for the next tick.
pub fn spawn(aggregator: Arc<Aggregator>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            run_once(&aggregator).await;
        }
    })
}

/// One warmup pass. Returns whether the feed could be fetched at all.
pub async fn run_once(aggregator: &Aggregator) -> bool {
    match aggregator.home_feed().await {
        Ok(feed) => {
            info!(
                trending = feed.trending.len(),
                web_series = feed.web_series.len(),
                top_rated = feed.top_rated.len(),
                upcoming = feed.upcoming.len(),
                "home feed warmup complete"
            );
            true
        }
        Err(e) => {
            warn!(error = %e, "home feed warmup failed");
            false
        }
    }
}
