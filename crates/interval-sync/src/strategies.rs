//! Dropdown opening strategies
//!
//! Three strategies in fallback order:
//! 1. Direct activate - semantic activation of the selector field, short probe
//! 2. Broad click - full click on the wider trigger, longer wait
//! 3. Population scan - any open overlay of the known class

use async_trait::async_trait;
use chartsync_core_types::{ElementHandle, InteractionKind, Point, PortError, Query};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::ChartWidget;
use crate::policy::AmbiguityPolicy;
use crate::ports::PageCx;
use crate::tempo::{settle, Settle};
use crate::wait::{populated, wait_for_dropdown};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    DirectActivate,
    BroadClick,
    PopulationScan,
}

impl StrategyKind {
    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::DirectActivate => "direct-activate",
            StrategyKind::BroadClick => "broad-click",
            StrategyKind::PopulationScan => "population-scan",
        }
    }

    pub fn fallback_chain() -> [StrategyKind; 3] {
        [
            StrategyKind::DirectActivate,
            StrategyKind::BroadClick,
            StrategyKind::PopulationScan,
        ]
    }
}

/// Where the pointer-based strategies aim.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aim {
    pub at: Option<Point>,
}

/// One rung of the dropdown ladder.
#[async_trait]
pub trait DropdownStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Tries to surface the widget's dropdown; `Ok(None)` means this rung did not resolve it.
    async fn attempt(
        &self,
        cx: &PageCx<'_>,
        widget: &ChartWidget,
        aim: Aim,
    ) -> Result<Option<ElementHandle>, PortError>;

    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

pub struct DirectActivate;

#[async_trait]
impl DropdownStrategy for DirectActivate {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DirectActivate
    }

    async fn attempt(
        &self,
        cx: &PageCx<'_>,
        widget: &ChartWidget,
        _aim: Aim,
    ) -> Result<Option<ElementHandle>, PortError> {
        debug!(title = %widget.title, "activating selector field");
        cx.interaction
            .emit(&widget.selector, InteractionKind::Activate, None)
            .await?;
        settle(cx.timings, Settle::Activate).await;
        Ok(wait_for_dropdown(cx.query, &widget.dropdown_id, cx.timings.probe()).await)
    }
}

pub struct BroadClick;

#[async_trait]
impl DropdownStrategy for BroadClick {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BroadClick
    }

    async fn attempt(
        &self,
        cx: &PageCx<'_>,
        widget: &ChartWidget,
        aim: Aim,
    ) -> Result<Option<ElementHandle>, PortError> {
        debug!(title = %widget.title, "field activation had no effect, clicking trigger");
        cx.interaction
            .emit(&widget.trigger, InteractionKind::Click, aim.at)
            .await?;
        settle(cx.timings, Settle::BroadClick).await;
        Ok(wait_for_dropdown(cx.query, &widget.dropdown_id, cx.timings.wait()).await)
    }
}

/// Best-effort: assumes the last open overlay belongs to this widget.
pub struct PopulationScan;

#[async_trait]
impl DropdownStrategy for PopulationScan {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PopulationScan
    }

    async fn attempt(
        &self,
        cx: &PageCx<'_>,
        widget: &ChartWidget,
        _aim: Aim,
    ) -> Result<Option<ElementHandle>, PortError> {
        let overlays = cx
            .query
            .query_all(None, &Query::css(&cx.selectors.dropdown_overlay))
            .await?;
        let mut open = Vec::with_capacity(overlays.len());
        for overlay in overlays {
            if populated(cx.query, &overlay).await {
                open.push(overlay);
            }
        }
        debug!(
            dropdown_id = %widget.dropdown_id,
            open = open.len(),
            "scanned for open dropdown overlays"
        );

        if open.len() > 1 && cx.ambiguity == AmbiguityPolicy::FailClosed {
            warn!(
                dropdown_id = %widget.dropdown_id,
                open = open.len(),
                "several overlays open, refusing to guess"
            );
            return Ok(None);
        }
        Ok(open.pop())
    }
}

pub fn standard_ladder() -> Vec<Box<dyn DropdownStrategy>> {
    StrategyKind::fallback_chain()
        .into_iter()
        .map(strategy_for)
        .collect()
}

pub fn strategy_for(kind: StrategyKind) -> Box<dyn DropdownStrategy> {
    match kind {
        StrategyKind::DirectActivate => Box::new(DirectActivate),
        StrategyKind::BroadClick => Box::new(BroadClick),
        StrategyKind::PopulationScan => Box::new(PopulationScan),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_follows_fallback_chain() {
        let names: Vec<_> = standard_ladder().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["direct-activate", "broad-click", "population-scan"]);
    }
}
