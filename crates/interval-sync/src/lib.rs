//! Interval sync: drives every chart widget on a host page to one time interval.
//!
//! The page is reached only through [`ports::QueryPort`] and
//! [`ports::InteractionPort`]; progress and notices leave through
//! [`ports::EventsPort`].

pub mod api;
pub mod discovery;
pub mod errors;
pub mod events;
pub mod intervals;
pub mod model;
pub mod option;
pub mod orchestrator;
pub mod policy;
pub mod ports;
pub mod protocol;
pub mod runner;
pub mod strategies;
pub mod tempo;
pub mod wait;
pub mod watch;

mod state;

pub use api::SyncOrchestratorBuilder;
pub use errors::{BuildError, CatalogError, PolicyError, RunRejection, WidgetError};
pub use events::{BroadcastEvents, NullEvents, SyncEvent};
pub use intervals::{IntervalCatalog, IntervalOption};
pub use model::{
    ChartWidget, Notice, NoticeLevel, Progress, SyncReport, WidgetOutcome, WidgetStatus,
    WidgetSummary,
};
pub use orchestrator::SyncOrchestrator;
pub use policy::{AmbiguityPolicy, PageSelectors, SyncPolicyHandle, SyncPolicyView, SyncTimings};
pub use ports::{EventsPort, InteractionPort, PageCx, QueryPort};
pub use strategies::StrategyKind;
pub use watch::EligibilityWatcher;
