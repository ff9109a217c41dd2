use tracing::{debug, instrument};

use crate::errors::WidgetError;
use crate::intervals::IntervalOption;
use crate::model::{ChartWidget, WidgetStatus};
use crate::option::select_option;
use crate::ports::PageCx;
use crate::protocol::DropdownProtocol;
use crate::strategies::StrategyKind;

/// Drives one widget to `target`: open its dropdown, then pick the option.
#[instrument(skip_all, fields(widget = widget.ordinal_index, title = %widget.title, interval = %target.value))]
pub async fn sync_widget(
    cx: &PageCx<'_>,
    protocol: &DropdownProtocol,
    widget: &ChartWidget,
    target: &IntervalOption,
) -> Result<StrategyKind, WidgetError> {
    let opened = protocol.open_and_resolve(cx, widget).await?;
    debug!(strategy = opened.strategy.name(), "selecting option");

    if select_option(cx, &opened.handle, target).await? {
        Ok(opened.strategy)
    } else {
        Err(WidgetError::IntervalNotAvailable {
            label: target.label.clone(),
        })
    }
}

/// Status for a widget, short-circuiting the ones already showing `target`.
pub async fn process_widget(
    cx: &PageCx<'_>,
    protocol: &DropdownProtocol,
    widget: &ChartWidget,
    target: &IntervalOption,
) -> WidgetStatus {
    if target.matches_display(&widget.current_interval) {
        debug!(title = %widget.title, "already at target interval");
        return WidgetStatus::AlreadyAtTarget;
    }
    match sync_widget(cx, protocol, widget, target).await {
        Ok(strategy) => WidgetStatus::Synced { strategy },
        Err(err) => WidgetStatus::Failed(err),
    }
}
