use chartsync_core_types::ElementHandle;
use serde::{Deserialize, Serialize};

use crate::errors::WidgetError;
use crate::intervals::IntervalOption;
use crate::strategies::StrategyKind;

/// One chart panel found on the page, captured at discovery time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartWidget {
    /// 1-based position of the panel inside the widget container.
    pub ordinal_index: usize,
    pub element: ElementHandle,
    pub title: String,
    pub current_interval: String,
    /// Id of the dropdown container the selector opens.
    pub dropdown_id: String,
    /// Narrow selector field (semantic activation target).
    pub selector: ElementHandle,
    /// Wider control wrapping the field (pointer target).
    pub trigger: ElementHandle,
}

impl ChartWidget {
    pub fn summary(&self) -> WidgetSummary {
        WidgetSummary {
            ordinal_index: self.ordinal_index,
            title: self.title.clone(),
            current_interval: self.current_interval.clone(),
        }
    }
}

/// Display-only view of a widget for the panel's chart list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSummary {
    pub ordinal_index: usize,
    pub title: String,
    pub current_interval: String,
}

/// A dropdown that became observable, plus the ladder rung that surfaced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenedDropdown {
    pub handle: ElementHandle,
    pub strategy: StrategyKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WidgetStatus {
    AlreadyAtTarget,
    Synced { strategy: StrategyKind },
    Failed(WidgetError),
}

impl WidgetStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, WidgetStatus::Failed(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetOutcome {
    pub ordinal_index: usize,
    pub title: String,
    pub dropdown_id: String,
    pub status: WidgetStatus,
}

impl WidgetOutcome {
    pub(crate) fn new(widget: &ChartWidget, status: WidgetStatus) -> Self {
        Self {
            ordinal_index: widget.ordinal_index,
            title: widget.title.clone(),
            dropdown_id: widget.dropdown_id.clone(),
            status,
        }
    }
}

/// Final tally of a run. Cancelled runs report the same way, with fewer outcomes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncReport {
    pub target: IntervalOption,
    pub succeeded: usize,
    pub total: usize,
    pub outcomes: Vec<WidgetOutcome>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.total
    }

    pub fn failures(&self) -> impl Iterator<Item = &WidgetOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_success())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.processed as f64 * 100.0 / self.total as f64
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}
