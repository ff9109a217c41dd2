use std::collections::HashSet;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::intervals::IntervalOption;
use crate::model::{ChartWidget, Progress};

/// State shared between the run loop and outside callers.
#[derive(Debug, Default)]
pub(crate) struct RunState {
    pub running: bool,
    pub target: Option<IntervalOption>,
    pub widgets: Vec<ChartWidget>,
    pub processed: HashSet<String>,
    pub cancel: Option<CancellationToken>,
}

impl RunState {
    pub fn progress(&self) -> Option<Progress> {
        self.running.then(|| Progress {
            processed: self.processed.len(),
            total: self.widgets.len(),
        })
    }
}

/// Holds the single-flight slot; resets the shared state to idle when dropped.
pub(crate) struct RunGuard<'a> {
    state: &'a Mutex<RunState>,
    cancel: CancellationToken,
}

impl<'a> RunGuard<'a> {
    /// Claims the slot, or `None` if a run is already active.
    pub fn acquire(state: &'a Mutex<RunState>, target: IntervalOption) -> Option<Self> {
        let mut guarded = state.lock();
        if guarded.running {
            return None;
        }
        let cancel = CancellationToken::new();
        *guarded = RunState {
            running: true,
            target: Some(target),
            widgets: Vec::new(),
            processed: HashSet::new(),
            cancel: Some(cancel.clone()),
        };
        Some(Self { state, cancel })
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn set_widgets(&self, widgets: Vec<ChartWidget>) {
        self.state.lock().widgets = widgets;
    }

    /// Records `key` and returns the progress after the insert.
    pub fn mark_processed(&self, key: &str) -> Progress {
        let mut guarded = self.state.lock();
        guarded.processed.insert(key.to_string());
        Progress {
            processed: guarded.processed.len(),
            total: guarded.widgets.len(),
        }
    }

    pub fn processed_count(&self) -> usize {
        self.state.lock().processed.len()
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock() = RunState::default();
    }
}
