use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::discovery::WidgetDiscovery;
use crate::events::SyncEvent;
use crate::policy::PageSelectors;
use crate::ports::{EventsPort, QueryPort};

/// Polls view eligibility and publishes an event each time it flips.
///
/// The first tick always publishes so a panel can start from a known state.
pub struct EligibilityWatcher {
    query: Arc<dyn QueryPort>,
    selectors: PageSelectors,
    events: Arc<dyn EventsPort>,
    period: Duration,
}

impl EligibilityWatcher {
    pub fn new(
        query: Arc<dyn QueryPort>,
        selectors: PageSelectors,
        events: Arc<dyn EventsPort>,
        period: Duration,
    ) -> Self {
        Self {
            query,
            selectors,
            events,
            period: period.max(Duration::from_millis(1)),
        }
    }

    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let discovery = WidgetDiscovery::new(self.query.as_ref(), &self.selectors);
        let mut last: Option<bool> = None;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let eligible = discovery.is_eligible().await;
            if last != Some(eligible) {
                debug!(eligible, "view eligibility changed");
                self.events.publish(SyncEvent::Eligibility { eligible });
                last = Some(eligible);
            }
        }
        debug!("eligibility watcher stopped");
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
