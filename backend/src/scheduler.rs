use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

use crate::cache::ArtifactCache;

/// Periodically refreshes sources and recomputes outdated calendars.
pub struct RefreshScheduler {
    calendars: Arc<ArtifactCache>,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(calendars: Arc<ArtifactCache>, interval: Duration) -> Self {
        Self {
            calendars,
            interval,
        }
    }

    /// Run one refresh pass. Returns the number of calendars recomputed.
    pub async fn tick(&self) -> usize {
        let updated = self.calendars.refresh_all().await;
        if updated > 0 {
            tracing::debug!("Refresh cycle recomputed {} calendars", updated);
        }
        updated
    }

    /// Refresh forever. The first pass runs immediately.
    pub async fn run(self) {
        let mut ticker = time::interval(self.interval);
        // No catch-up bursts after a slow pass.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Refresh scheduler started (interval: {:?})", self.interval);

        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }
}
