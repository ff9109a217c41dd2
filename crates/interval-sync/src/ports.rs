use async_trait::async_trait;
use chartsync_core_types::{
    ElementHandle, InteractionKind, Point, PortError, Query, Rect, ScrollBlock,
};

use crate::events::SyncEvent;
use crate::policy::{AmbiguityPolicy, PageSelectors, SyncTimings};

/// Read access to the live page. Any call may come back empty.
#[async_trait]
pub trait QueryPort: Send + Sync {
    /// Elements matching `query`, in document order, searched under `scope` or the whole page.
    async fn query_all(
        &self,
        scope: Option<&ElementHandle>,
        query: &Query,
    ) -> Result<Vec<ElementHandle>, PortError>;

    async fn query_one(
        &self,
        scope: Option<&ElementHandle>,
        query: &Query,
    ) -> Result<Option<ElementHandle>, PortError> {
        Ok(self.query_all(scope, query).await?.into_iter().next())
    }

    /// Direct element children, in document order.
    async fn children(&self, element: &ElementHandle) -> Result<Vec<ElementHandle>, PortError>;

    /// Nearest ancestor-or-self matching `query`.
    async fn closest(
        &self,
        element: &ElementHandle,
        query: &Query,
    ) -> Result<Option<ElementHandle>, PortError>;

    /// Raw text content, untrimmed.
    async fn text(&self, element: &ElementHandle) -> Result<Option<String>, PortError>;

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, PortError>;

    async fn geometry(&self, element: &ElementHandle) -> Result<Option<Rect>, PortError>;

    async fn child_count(&self, element: &ElementHandle) -> Result<usize, PortError>;
}

/// Synthetic input dispatch. Effects are only visible through later queries.
#[async_trait]
pub trait InteractionPort: Send + Sync {
    async fn emit(
        &self,
        element: &ElementHandle,
        kind: InteractionKind,
        at: Option<Point>,
    ) -> Result<(), PortError>;

    async fn scroll_into_view(
        &self,
        element: &ElementHandle,
        block: ScrollBlock,
    ) -> Result<(), PortError>;
}

/// Outbound notifications for the panel UI.
pub trait EventsPort: Send + Sync {
    fn publish(&self, event: SyncEvent);
}

/// Everything one widget interaction needs, borrowed for the duration of a run.
#[derive(Clone, Copy)]
pub struct PageCx<'a> {
    pub query: &'a dyn QueryPort,
    pub interaction: &'a dyn InteractionPort,
    pub selectors: &'a PageSelectors,
    pub timings: &'a SyncTimings,
    pub ambiguity: AmbiguityPolicy,
}
