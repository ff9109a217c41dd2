use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::BuildError;
use crate::events::NullEvents;
use crate::intervals::IntervalCatalog;
use crate::orchestrator::SyncOrchestrator;
use crate::policy::{PageSelectors, SyncPolicyHandle};
use crate::ports::{EventsPort, InteractionPort, QueryPort};
use crate::protocol::DropdownProtocol;
use crate::state::RunState;

/// Assembles a [`SyncOrchestrator`] from its ports.
///
/// Query and interaction ports are required; events default to [`NullEvents`],
/// selectors and policy to their defaults.
pub struct SyncOrchestratorBuilder {
    catalog: Arc<IntervalCatalog>,
    query: Option<Arc<dyn QueryPort>>,
    interaction: Option<Arc<dyn InteractionPort>>,
    events: Option<Arc<dyn EventsPort>>,
    selectors: PageSelectors,
    policy: SyncPolicyHandle,
    protocol: Option<DropdownProtocol>,
}

impl SyncOrchestratorBuilder {
    pub fn new(catalog: Arc<IntervalCatalog>) -> Self {
        Self {
            catalog,
            query: None,
            interaction: None,
            events: None,
            selectors: PageSelectors::default(),
            policy: SyncPolicyHandle::default(),
            protocol: None,
        }
    }

    pub fn with_query(mut self, port: Arc<dyn QueryPort>) -> Self {
        self.query = Some(port);
        self
    }

    pub fn with_interaction(mut self, port: Arc<dyn InteractionPort>) -> Self {
        self.interaction = Some(port);
        self
    }

    pub fn with_events(mut self, port: Arc<dyn EventsPort>) -> Self {
        self.events = Some(port);
        self
    }

    pub fn with_selectors(mut self, selectors: PageSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_policy(mut self, policy: SyncPolicyHandle) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_protocol(mut self, protocol: DropdownProtocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn build(self) -> Result<SyncOrchestrator, BuildError> {
        self.selectors.validate()?;
        self.policy.snapshot().validate()?;
        let query = self.query.ok_or(BuildError::MissingPort("query"))?;
        let interaction = self
            .interaction
            .ok_or(BuildError::MissingPort("interaction"))?;

        Ok(SyncOrchestrator {
            query,
            interaction,
            events: self.events.unwrap_or_else(|| Arc::new(NullEvents)),
            catalog: self.catalog,
            selectors: self.selectors,
            policy: self.policy,
            protocol: self.protocol.unwrap_or_default(),
            state: Mutex::new(RunState::default()),
        })
    }
}

impl SyncOrchestrator {
    pub fn builder(catalog: Arc<IntervalCatalog>) -> SyncOrchestratorBuilder {
        SyncOrchestratorBuilder::new(catalog)
    }
}
