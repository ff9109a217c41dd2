use chartsync_core_types::PortError;
use thiserror::Error;

use crate::model::{Notice, NoticeLevel};

/// Reasons a sync request is turned away before any widget is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunRejection {
    #[error("a sync run is already in progress")]
    Busy,
    #[error("page is not on the trading data view")]
    WrongContext,
    #[error("no chart widgets available to sync")]
    NothingToSync,
    #[error("interval {0:?} is not in the supported list")]
    UnsupportedInterval(String),
}

impl RunRejection {
    /// Notice shown to the user for this rejection.
    pub fn notice(&self) -> Notice {
        match self {
            RunRejection::Busy => Notice::new(NoticeLevel::Warning, "sync already in progress"),
            RunRejection::WrongContext => {
                Notice::new(NoticeLevel::Error, "switch to the trading data tab first")
            }
            RunRejection::NothingToSync => {
                Notice::new(NoticeLevel::Error, "no charts available to sync")
            }
            RunRejection::UnsupportedInterval(key) => Notice::new(
                NoticeLevel::Error,
                format!("interval {} is not supported", key),
            ),
        }
    }
}

/// Per-widget failure. Never aborts a run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("dropdown {dropdown_id} never became visible")]
    DropdownNotFound { dropdown_id: String },
    #[error("no option labelled {label:?} in the dropdown")]
    IntervalNotAvailable { label: String },
    #[error("page interaction failed: {0}")]
    Environment(#[from] PortError),
}

impl WidgetError {
    pub fn kind(&self) -> &'static str {
        match self {
            WidgetError::DropdownNotFound { .. } => "dropdown_not_found",
            WidgetError::IntervalNotAvailable { .. } => "interval_not_available",
            WidgetError::Environment(_) => "environment",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("interval catalog is empty")]
    Empty,
    #[error("interval #{0} has a blank label")]
    BlankLabel(usize),
    #[error("interval #{0} has a blank value")]
    BlankValue(usize),
    #[error("interval value {0:?} appears more than once")]
    DuplicateValue(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("poll interval {0} must be greater than zero")]
    ZeroPollInterval(&'static str),
    #[error("selector {0} is blank")]
    BlankSelector(&'static str),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{0} port is required")]
    MissingPort(&'static str),
    #[error(transparent)]
    Policy(#[from] PolicyError),
}
