//! chartsync: keeps every chart widget on a trading data page on one interval.
//!
//! [`ChartSync`] wires the interval-sync orchestrator to a live Chromium page
//! through [`cdp_page::CdpPage`].

pub mod config;
pub mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use cdp_page::CdpPage;
use interval_sync::{
    BroadcastEvents, EligibilityWatcher, InteractionPort, QueryPort, SyncEvent, SyncOrchestrator,
    SyncPolicyHandle,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use config::{load_config, ChartSyncConfig, LoadedConfig};
pub use interval_sync;
pub use logging::init_logging;

const EVENT_CAPACITY: usize = 256;

/// An orchestrator bound to one page, plus the event stream the panel listens to.
pub struct ChartSync {
    orchestrator: Arc<SyncOrchestrator>,
    events: Arc<BroadcastEvents>,
    query: Arc<dyn QueryPort>,
    config: ChartSyncConfig,
}

impl ChartSync {
    pub fn attach(page: chromiumoxide::Page, config: &ChartSyncConfig) -> Result<Self> {
        Self::with_page(Arc::new(CdpPage::new(page)), config)
    }

    /// Same as [`ChartSync::attach`] for any page implementing both ports.
    pub fn with_page<P>(page: Arc<P>, config: &ChartSyncConfig) -> Result<Self>
    where
        P: QueryPort + InteractionPort + 'static,
    {
        let catalog = Arc::new(config.catalog()?);
        let policy = SyncPolicyHandle::new(config.sync.clone()).context("Invalid sync policy")?;
        let events = BroadcastEvents::new(EVENT_CAPACITY);

        let orchestrator = SyncOrchestrator::builder(catalog)
            .with_query(page.clone())
            .with_interaction(page.clone())
            .with_events(events.clone())
            .with_selectors(config.selectors.clone())
            .with_policy(policy)
            .build()
            .context("Failed to build sync orchestrator")?;
        info!(
            intervals = orchestrator.catalog().len(),
            "chart sync attached"
        );

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            events,
            query: page,
            config: config.clone(),
        })
    }

    pub fn orchestrator(&self) -> &Arc<SyncOrchestrator> {
        &self.orchestrator
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Starts publishing [`SyncEvent::Eligibility`] changes until `cancel` fires.
    pub fn spawn_eligibility_watch(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let period = self.orchestrator.policy().snapshot().timings.eligibility_poll();
        EligibilityWatcher::new(
            self.query.clone(),
            self.config.selectors.clone(),
            self.events.clone(),
            period,
        )
        .spawn(cancel)
    }
}
