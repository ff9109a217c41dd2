use chartsync_core_types::{InteractionKind, ScrollBlock};
use tracing::{debug, info, warn};

use crate::errors::WidgetError;
use crate::model::{ChartWidget, OpenedDropdown};
use crate::ports::PageCx;
use crate::strategies::{standard_ladder, Aim, DropdownStrategy};
use crate::tempo::{settle, Settle};

/// Opens one widget's selector and resolves the dropdown it produced.
pub struct DropdownProtocol {
    ladder: Vec<Box<dyn DropdownStrategy>>,
}

impl DropdownProtocol {
    pub fn standard() -> Self {
        Self {
            ladder: standard_ladder(),
        }
    }

    pub fn with_ladder(ladder: Vec<Box<dyn DropdownStrategy>>) -> Self {
        Self { ladder }
    }

    pub fn rungs(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ladder.iter().map(|s| s.name())
    }

    pub async fn open_and_resolve(
        &self,
        cx: &PageCx<'_>,
        widget: &ChartWidget,
    ) -> Result<OpenedDropdown, WidgetError> {
        let aim = prime(cx, widget).await;

        for strategy in &self.ladder {
            match strategy.attempt(cx, widget, aim).await {
                Ok(Some(handle)) => {
                    info!(
                        title = %widget.title,
                        strategy = strategy.name(),
                        dropdown = %handle,
                        "dropdown resolved"
                    );
                    return Ok(OpenedDropdown {
                        handle,
                        strategy: strategy.kind(),
                    });
                }
                Ok(None) => debug!(strategy = strategy.name(), "strategy did not resolve dropdown"),
                Err(err) => warn!(strategy = strategy.name(), %err, "strategy failed"),
            }
        }

        Err(WidgetError::DropdownNotFound {
            dropdown_id: widget.dropdown_id.clone(),
        })
    }
}

impl Default for DropdownProtocol {
    fn default() -> Self {
        Self::standard()
    }
}

/// Scroll, hover and press/release on the trigger so the control is in a state
/// where activation registers. Individual signal failures are logged only.
async fn prime(cx: &PageCx<'_>, widget: &ChartWidget) -> Aim {
    if let Err(err) = cx
        .interaction
        .scroll_into_view(&widget.element, ScrollBlock::Center)
        .await
    {
        warn!(title = %widget.title, %err, "scroll into view failed");
    }
    settle(cx.timings, Settle::Scroll).await;

    let at = match cx.query.geometry(&widget.trigger).await {
        Ok(rect) => rect.map(|r| r.center()),
        Err(err) => {
            warn!(title = %widget.title, %err, "trigger geometry unavailable");
            None
        }
    };

    let sequence = [
        (InteractionKind::Enter, Settle::Hover),
        (InteractionKind::Hover, Settle::Hover),
        (InteractionKind::Press, Settle::Press),
        (InteractionKind::Release, Settle::Press),
    ];
    for (kind, pause) in sequence {
        if let Err(err) = cx.interaction.emit(&widget.trigger, kind, at).await {
            warn!(title = %widget.title, kind = kind.label(), %err, "signal dispatch failed");
        }
        settle(cx.timings, pause).await;
    }

    Aim { at }
}
