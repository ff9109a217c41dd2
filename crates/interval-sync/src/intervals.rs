use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::CatalogError;

/// One supported chart interval: what the host page displays and the short key callers use.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct IntervalOption {
    pub label: String,
    pub value: String,
}

impl IntervalOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// True when a widget's displayed interval already denotes this option.
    pub fn matches_display(&self, text: &str) -> bool {
        let text = text.trim();
        text == self.label || text == self.value
    }
}

const BUILTIN: &[(&str, &str)] = &[
    ("5分", "5m"),
    ("15分", "15m"),
    ("30分", "30m"),
    ("1时", "1h"),
    ("2时", "2h"),
    ("4时", "4h"),
    ("6时", "6h"),
    ("12时", "12h"),
    ("1天", "1d"),
];

/// Frozen allow-list of intervals the orchestrator accepts.
#[derive(Clone, Debug)]
pub struct IntervalCatalog {
    options: Vec<IntervalOption>,
}

impl IntervalCatalog {
    pub fn builtin() -> Self {
        Self {
            options: BUILTIN
                .iter()
                .map(|(label, value)| IntervalOption::new(*label, *value))
                .collect(),
        }
    }

    pub fn from_options(options: Vec<IntervalOption>) -> Result<Self, CatalogError> {
        if options.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for (idx, option) in options.iter().enumerate() {
            if option.label.trim().is_empty() {
                return Err(CatalogError::BlankLabel(idx));
            }
            if option.value.trim().is_empty() {
                return Err(CatalogError::BlankValue(idx));
            }
            if !seen.insert(option.value.as_str()) {
                return Err(CatalogError::DuplicateValue(option.value.clone()));
            }
        }
        Ok(Self { options })
    }

    /// Looks the key up by value first, then by label.
    pub fn resolve(&self, key: &str) -> Option<&IntervalOption> {
        let key = key.trim();
        self.options
            .iter()
            .find(|opt| opt.value == key)
            .or_else(|| self.options.iter().find(|opt| opt.label == key))
    }

    pub fn options(&self) -> &[IntervalOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl Default for IntervalCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
