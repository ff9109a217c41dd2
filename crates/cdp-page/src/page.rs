use async_trait::async_trait;
use chartsync_core_types::{
    ElementHandle, InteractionKind, Point, PortError, Query, Rect, ScrollBlock,
};
use chromiumoxide::page::Page;
use interval_sync::{InteractionPort, QueryPort};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::trace;

use crate::script::{self, build, decode, query_json, scope_json};

/// Query and interaction ports over one attached Chromium page.
#[derive(Clone)]
pub struct CdpPage {
    page: Page,
}

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn inner(&self) -> &Page {
        &self.page
    }

    async fn call<T: DeserializeOwned>(&self, body: &str, args: Value) -> Result<T, PortError> {
        let expression = build(body, &args);
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|err| PortError::transport(err.to_string()))?;
        let value = decode(result.value());
        if let Err(err) = &value {
            trace!(%err, "page call failed");
        }
        value
    }

    async fn element_call<T: DeserializeOwned>(
        &self,
        body: &str,
        element: &ElementHandle,
    ) -> Result<T, PortError> {
        self.call(body, json!({ "el": element.as_str() })).await
    }
}

fn handles(ids: Vec<String>) -> Vec<ElementHandle> {
    ids.into_iter().map(ElementHandle::new).collect()
}

#[async_trait]
impl QueryPort for CdpPage {
    async fn query_all(
        &self,
        scope: Option<&ElementHandle>,
        query: &Query,
    ) -> Result<Vec<ElementHandle>, PortError> {
        let ids: Vec<String> = self
            .call(
                script::QUERY_ALL,
                json!({ "scope": scope_json(scope), "query": query_json(query) }),
            )
            .await?;
        Ok(handles(ids))
    }

    async fn children(&self, element: &ElementHandle) -> Result<Vec<ElementHandle>, PortError> {
        let ids: Vec<String> = self.element_call(script::CHILDREN, element).await?;
        Ok(handles(ids))
    }

    async fn closest(
        &self,
        element: &ElementHandle,
        query: &Query,
    ) -> Result<Option<ElementHandle>, PortError> {
        let id: Option<String> = self
            .call(
                script::CLOSEST,
                json!({ "el": element.as_str(), "query": query_json(query) }),
            )
            .await?;
        Ok(id.map(ElementHandle::new))
    }

    async fn text(&self, element: &ElementHandle) -> Result<Option<String>, PortError> {
        self.element_call(script::TEXT, element).await
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, PortError> {
        self.call(
            script::ATTRIBUTE,
            json!({ "el": element.as_str(), "name": name }),
        )
        .await
    }

    async fn geometry(&self, element: &ElementHandle) -> Result<Option<Rect>, PortError> {
        self.element_call(script::GEOMETRY, element).await
    }

    async fn child_count(&self, element: &ElementHandle) -> Result<usize, PortError> {
        self.element_call(script::CHILD_COUNT, element).await
    }
}

#[async_trait]
impl InteractionPort for CdpPage {
    async fn emit(
        &self,
        element: &ElementHandle,
        kind: InteractionKind,
        at: Option<Point>,
    ) -> Result<(), PortError> {
        trace!(%element, kind = kind.label(), "dispatching");
        let Some(event) = kind.event_name() else {
            let _: Value = self.element_call(script::ACTIVATE, element).await?;
            return Ok(());
        };
        let _: Value = self
            .call(
                script::DISPATCH,
                json!({
                    "el": element.as_str(),
                    "event": event,
                    "x": at.map(|p| p.x),
                    "y": at.map(|p| p.y),
                }),
            )
            .await?;
        Ok(())
    }

    async fn scroll_into_view(
        &self,
        element: &ElementHandle,
        block: ScrollBlock,
    ) -> Result<(), PortError> {
        let _: Value = self
            .call(
                script::SCROLL,
                json!({ "el": element.as_str(), "block": block.as_str() }),
            )
            .await?;
        Ok(())
    }
}
