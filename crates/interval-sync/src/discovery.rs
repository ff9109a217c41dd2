use chartsync_core_types::{ElementHandle, PortError, Query};
use tracing::{debug, warn};

use crate::model::ChartWidget;
use crate::policy::PageSelectors;
use crate::ports::QueryPort;

/// Read-only scan of the page for chart widgets.
pub struct WidgetDiscovery<'a> {
    query: &'a dyn QueryPort,
    selectors: &'a PageSelectors,
}

impl<'a> WidgetDiscovery<'a> {
    pub fn new(query: &'a dyn QueryPort, selectors: &'a PageSelectors) -> Self {
        Self { query, selectors }
    }

    /// Whether the page currently shows the trading data view.
    pub async fn is_eligible(&self) -> bool {
        match self.read_eligibility().await {
            Ok(eligible) => eligible,
            Err(err) => {
                warn!(%err, "view eligibility check failed");
                false
            }
        }
    }

    async fn read_eligibility(&self) -> Result<bool, PortError> {
        let tab = self
            .query
            .query_one(None, &Query::css(&self.selectors.view_tab))
            .await?;
        let Some(tab) = tab else {
            return Ok(false);
        };
        let value = self
            .query
            .attribute(&tab, &self.selectors.view_tab_attribute)
            .await?;
        Ok(value.as_deref() == Some(self.selectors.view_tab_expected.as_str()))
    }

    /// Complete widgets in page order; empty when off the data view.
    pub async fn discover(&self) -> Vec<ChartWidget> {
        if !self.is_eligible().await {
            debug!("not on the trading data view");
            return Vec::new();
        }

        let children = match self.container_children().await {
            Ok(children) => children,
            Err(err) => {
                warn!(%err, "widget container unreadable");
                return Vec::new();
            }
        };

        let mut widgets = Vec::with_capacity(children.len());
        for (idx, child) in children.into_iter().enumerate() {
            let ordinal = idx + 1;
            match self.inspect(ordinal, child).await {
                Ok(Some(widget)) => widgets.push(widget),
                Ok(None) => debug!(ordinal, "skipping incomplete widget"),
                Err(err) => warn!(ordinal, %err, "skipping unreadable widget"),
            }
        }
        debug!(count = widgets.len(), "widgets discovered");
        widgets
    }

    async fn container_children(&self) -> Result<Vec<ElementHandle>, PortError> {
        let container = self
            .query
            .query_one(None, &Query::css(&self.selectors.container))
            .await?;
        match container {
            Some(container) => self.query.children(&container).await,
            None => {
                debug!("widget container not found");
                Ok(Vec::new())
            }
        }
    }

    async fn inspect(
        &self,
        ordinal: usize,
        element: ElementHandle,
    ) -> Result<Option<ChartWidget>, PortError> {
        let title = match self.scoped_text(&element, &self.selectors.widget_title).await? {
            Some(title) => title,
            None => return Ok(None),
        };

        let Some(selector) = self
            .query
            .query_one(Some(&element), &Query::css(&self.selectors.selector_field))
            .await?
        else {
            return Ok(None);
        };
        let Some(current_interval) = non_blank(self.query.text(&selector).await?) else {
            return Ok(None);
        };

        let Some(trigger) = self
            .query
            .closest(&selector, &Query::css(&self.selectors.selector_trigger))
            .await?
        else {
            return Ok(None);
        };
        let Some(dropdown_id) = non_blank(
            self.query
                .attribute(&trigger, &self.selectors.dropdown_id_attribute)
                .await?,
        ) else {
            return Ok(None);
        };

        Ok(Some(ChartWidget {
            ordinal_index: ordinal,
            element,
            title,
            current_interval,
            dropdown_id,
            selector,
            trigger,
        }))
    }

    async fn scoped_text(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> Result<Option<String>, PortError> {
        match self
            .query
            .query_one(Some(scope), &Query::css(selector))
            .await?
        {
            Some(found) => Ok(non_blank(self.query.text(&found).await?)),
            None => Ok(None),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
