use std::sync::Arc;

use chartsync_core_types::ScrollBlock;
use parking_lot::Mutex;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::discovery::WidgetDiscovery;
use crate::errors::RunRejection;
use crate::events::SyncEvent;
use crate::intervals::{IntervalCatalog, IntervalOption};
use crate::model::{
    ChartWidget, Notice, NoticeLevel, Progress, SyncReport, WidgetOutcome, WidgetStatus,
    WidgetSummary,
};
use crate::policy::{PageSelectors, SyncPolicyHandle};
use crate::ports::{EventsPort, InteractionPort, PageCx, QueryPort};
use crate::protocol::DropdownProtocol;
use crate::runner::process_widget;
use crate::state::{RunGuard, RunState};

/// Single-flight state machine: `Idle -> Running -> Idle`.
pub struct SyncOrchestrator {
    pub(crate) query: Arc<dyn QueryPort>,
    pub(crate) interaction: Arc<dyn InteractionPort>,
    pub(crate) events: Arc<dyn EventsPort>,
    pub(crate) catalog: Arc<IntervalCatalog>,
    pub(crate) selectors: PageSelectors,
    pub(crate) policy: SyncPolicyHandle,
    pub(crate) protocol: DropdownProtocol,
    pub(crate) state: Mutex<RunState>,
}

impl SyncOrchestrator {
    pub fn catalog(&self) -> &IntervalCatalog {
        &self.catalog
    }

    pub fn policy(&self) -> &SyncPolicyHandle {
        &self.policy
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Interval the active run is driving widgets to.
    pub fn active_target(&self) -> Option<IntervalOption> {
        self.state.lock().target.clone()
    }

    /// `(processed, total)` of the active run, if any.
    pub fn progress(&self) -> Option<Progress> {
        self.state.lock().progress()
    }

    pub async fn is_eligible(&self) -> bool {
        self.discovery().is_eligible().await
    }

    /// Asks the active run to stop before its next widget. Returns whether a run was active.
    pub fn cancel(&self) -> bool {
        let token = {
            let state = self.state.lock();
            if !state.running {
                return false;
            }
            state.cancel.clone()
        };
        if let Some(token) = token {
            token.cancel();
        }
        info!("sync cancellation requested");
        self.notify(NoticeLevel::Warning, "sync stopped");
        true
    }

    /// Fresh widget scan for display; never touches the page.
    pub async fn rescan(&self) -> Vec<WidgetSummary> {
        let widgets = self.discovery().discover().await;
        if widgets.is_empty() {
            self.notify(
                NoticeLevel::Warning,
                "no charts found, make sure the trading data tab is open",
            );
        } else {
            self.notify(NoticeLevel::Info, format!("found {} charts", widgets.len()));
        }
        widgets.iter().map(ChartWidget::summary).collect()
    }

    /// Drives every discovered widget to `target` (an allow-list value or label).
    #[instrument(skip(self), fields(succeeded = tracing::field::Empty))]
    pub async fn start_sync(&self, requested: &str) -> Result<SyncReport, RunRejection> {
        let interval = match self.catalog.resolve(requested) {
            Some(interval) => interval.clone(),
            None => {
                return Err(
                    self.reject(RunRejection::UnsupportedInterval(requested.to_string()))
                )
            }
        };

        if self.is_running() {
            return Err(self.reject(RunRejection::Busy));
        }

        let discovery = self.discovery();
        if !discovery.is_eligible().await {
            return Err(self.reject(RunRejection::WrongContext));
        }

        let Some(guard) = RunGuard::acquire(&self.state, interval.clone()) else {
            return Err(self.reject(RunRejection::Busy));
        };

        let widgets = discovery.discover().await;
        if widgets.is_empty() {
            drop(guard);
            return Err(self.reject(RunRejection::NothingToSync));
        }
        guard.set_widgets(widgets.clone());

        let policy = self.policy.snapshot();
        let cx = PageCx {
            query: self.query.as_ref(),
            interaction: self.interaction.as_ref(),
            selectors: &self.selectors,
            timings: &policy.timings,
            ambiguity: policy.ambiguity,
        };

        let total = widgets.len();
        info!(total, interval = %interval.value, "sync started");
        self.notify(
            NoticeLevel::Info,
            format!("syncing {} charts to {}", total, interval.label),
        );
        self.events.publish(SyncEvent::Progress(Progress {
            processed: 0,
            total,
        }));

        let cancel = guard.cancel_token().clone();
        let mut outcomes = Vec::with_capacity(total);
        for (idx, widget) in widgets.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(visited = idx, total, "sync cancelled");
                break;
            }

            let status = process_widget(&cx, &self.protocol, widget, &interval).await;
            let interacted = !matches!(status, WidgetStatus::AlreadyAtTarget);
            match &status {
                WidgetStatus::Failed(err) => {
                    warn!(
                        widget = widget.ordinal_index,
                        title = %widget.title,
                        kind = err.kind(),
                        %err,
                        "widget sync failed"
                    );
                }
                _ => {
                    let progress = guard.mark_processed(&widget.dropdown_id);
                    self.events.publish(SyncEvent::Progress(progress));
                }
            }

            let outcome = WidgetOutcome::new(widget, status);
            self.events.publish(SyncEvent::WidgetFinished(outcome.clone()));
            outcomes.push(outcome);

            if interacted && idx + 1 < total {
                sleep(policy.timings.switch_delay()).await;
            }
        }

        let succeeded = guard.processed_count();
        drop(guard);

        tracing::Span::current().record("succeeded", succeeded);
        info!(succeeded, total, "sync finished");
        self.notify(
            NoticeLevel::Success,
            format!("sync finished: {}/{} charts", succeeded, total),
        );
        self.restore_scroll(&widgets).await;

        let report = SyncReport {
            target: interval,
            succeeded,
            total,
            outcomes,
        };
        self.events.publish(SyncEvent::RunFinished(report.clone()));
        Ok(report)
    }

    fn discovery(&self) -> WidgetDiscovery<'_> {
        WidgetDiscovery::new(self.query.as_ref(), &self.selectors)
    }

    fn reject(&self, rejection: RunRejection) -> RunRejection {
        warn!(%rejection, "sync request rejected");
        self.events.publish(SyncEvent::Notice(rejection.notice()));
        rejection
    }

    fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        self.events.publish(SyncEvent::Notice(Notice::new(level, message)));
    }

    async fn restore_scroll(&self, widgets: &[ChartWidget]) {
        let Some(first) = widgets.first() else {
            return;
        };
        if let Err(err) = self
            .interaction
            .scroll_into_view(&first.element, ScrollBlock::Start)
            .await
        {
            warn!(%err, "could not scroll back to the first chart");
        }
    }
}
