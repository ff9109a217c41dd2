use chartsync_core_types::{ElementHandle, InteractionKind, PortError, Query};
use tracing::{debug, warn};

use crate::intervals::IntervalOption;
use crate::ports::PageCx;
use crate::tempo::{settle, Settle};

/// Activates the option labelled like `interval` inside `dropdown`.
///
/// Returns `Ok(false)` after closing the dropdown with a body click when no
/// option matches.
pub async fn select_option(
    cx: &PageCx<'_>,
    dropdown: &ElementHandle,
    interval: &IntervalOption,
) -> Result<bool, PortError> {
    let options = cx
        .query
        .query_all(Some(dropdown), &Query::css(&cx.selectors.dropdown_option))
        .await?;

    for option in &options {
        let text = match cx.query.text(option).await {
            Ok(Some(text)) => text,
            Ok(None) => continue,
            Err(err) => {
                debug!(%option, %err, "option text unreadable");
                continue;
            }
        };
        if text.trim() == interval.label {
            cx.interaction
                .emit(option, InteractionKind::Activate, None)
                .await?;
            debug!(label = %interval.label, "option activated");
            settle(cx.timings, Settle::Option).await;
            return Ok(true);
        }
    }

    warn!(
        label = %interval.label,
        scanned = options.len(),
        "no matching option, closing dropdown"
    );
    close_dropdown(cx).await?;
    Ok(false)
}

async fn close_dropdown(cx: &PageCx<'_>) -> Result<(), PortError> {
    let body = cx
        .query
        .query_one(None, &Query::css(&cx.selectors.page_body))
        .await?;
    match body {
        Some(body) => cx.interaction.emit(&body, InteractionKind::Activate, None).await,
        None => {
            warn!("page body not found, dropdown left open");
            Ok(())
        }
    }
}
