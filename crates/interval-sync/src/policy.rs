use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::errors::PolicyError;
use crate::wait::PollSpec;

/// What the population scan does when several open overlays are visible.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Take the last overlay in document order.
    #[default]
    LastOpened,
    /// Refuse to guess; the widget fails with `DropdownNotFound`.
    FailClosed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncPolicyView {
    pub timings: SyncTimings,
    pub ambiguity: AmbiguityPolicy,
}

impl SyncPolicyView {
    pub fn validate(&self) -> Result<(), PolicyError> {
        self.timings.validate()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTimings {
    pub scroll_settle_ms: u64,
    pub hover_settle_ms: u64,
    pub press_settle_ms: u64,
    pub activate_settle_ms: u64,
    pub probe_timeout_ms: u64,
    pub probe_poll_ms: u64,
    pub broad_click_settle_ms: u64,
    pub wait_timeout_ms: u64,
    pub wait_poll_ms: u64,
    pub option_settle_ms: u64,
    /// Pause between two widgets; lets the page finish the previous switch.
    pub switch_delay_ms: u64,
    pub eligibility_poll_ms: u64,
}

impl SyncTimings {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.probe_poll_ms == 0 {
            return Err(PolicyError::ZeroPollInterval("probe_poll_ms"));
        }
        if self.wait_poll_ms == 0 {
            return Err(PolicyError::ZeroPollInterval("wait_poll_ms"));
        }
        if self.eligibility_poll_ms == 0 {
            return Err(PolicyError::ZeroPollInterval("eligibility_poll_ms"));
        }
        Ok(())
    }

    /// Short "is it already open" check after direct activation.
    pub fn probe(&self) -> PollSpec {
        PollSpec::new(
            Duration::from_millis(self.probe_timeout_ms),
            Duration::from_millis(self.probe_poll_ms),
        )
    }

    /// Longer "wait for it to open" after the broad click.
    pub fn wait(&self) -> PollSpec {
        PollSpec::new(
            Duration::from_millis(self.wait_timeout_ms),
            Duration::from_millis(self.wait_poll_ms),
        )
    }

    pub fn switch_delay(&self) -> Duration {
        Duration::from_millis(self.switch_delay_ms)
    }

    pub fn eligibility_poll(&self) -> Duration {
        Duration::from_millis(self.eligibility_poll_ms)
    }
}

impl Default for SyncTimings {
    fn default() -> Self {
        Self {
            scroll_settle_ms: 200,
            hover_settle_ms: 100,
            press_settle_ms: 50,
            activate_settle_ms: 200,
            probe_timeout_ms: 500,
            probe_poll_ms: 50,
            broad_click_settle_ms: 300,
            wait_timeout_ms: 5_000,
            wait_poll_ms: 100,
            option_settle_ms: 200,
            switch_delay_ms: 500,
            eligibility_poll_ms: 1_000,
        }
    }
}

/// Structural queries describing the host page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSelectors {
    pub view_tab: String,
    pub view_tab_attribute: String,
    pub view_tab_expected: String,
    pub container: String,
    pub widget_title: String,
    pub selector_field: String,
    pub selector_trigger: String,
    pub dropdown_id_attribute: String,
    pub dropdown_overlay: String,
    pub dropdown_option: String,
    pub page_body: String,
}

impl PageSelectors {
    pub fn validate(&self) -> Result<(), PolicyError> {
        let fields: [(&'static str, &str); 11] = [
            ("view_tab", &self.view_tab),
            ("view_tab_attribute", &self.view_tab_attribute),
            ("view_tab_expected", &self.view_tab_expected),
            ("container", &self.container),
            ("widget_title", &self.widget_title),
            ("selector_field", &self.selector_field),
            ("selector_trigger", &self.selector_trigger),
            ("dropdown_id_attribute", &self.dropdown_id_attribute),
            ("dropdown_overlay", &self.dropdown_overlay),
            ("dropdown_option", &self.dropdown_option),
            ("page_body", &self.page_body),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some(&(name, _)) => Err(PolicyError::BlankSelector(name)),
            None => Ok(()),
        }
    }
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            view_tab: "#bn-tab-2".into(),
            view_tab_attribute: "aria-selected".into(),
            view_tab_expected: "true".into(),
            container: "#client-side > div > div.react-grid-layout.layout > div.react-grid-item.react-draggable.react-resizable > div > div > div > div > div.w-full.h-full.overflow-scroll > div > div".into(),
            widget_title: ".t-subtitle2.text-PrimaryText".into(),
            selector_field: ".bn-select-field-input".into(),
            selector_trigger: ".bn-select-field".into(),
            dropdown_id_attribute: "aria-controls".into(),
            dropdown_overlay: ".bn-select-overlay-options".into(),
            dropdown_option: "[role=\"option\"]".into(),
            page_body: "body".into(),
        }
    }
}

/// Shared, tunable sync policy. Runs take one snapshot when they start.
#[derive(Clone, Debug)]
pub struct SyncPolicyHandle {
    inner: Arc<RwLock<SyncPolicyView>>,
}

impl SyncPolicyHandle {
    pub fn new(view: SyncPolicyView) -> Result<Self, PolicyError> {
        view.validate()?;
        Ok(Self {
            inner: Arc::new(RwLock::new(view)),
        })
    }

    pub fn snapshot(&self) -> SyncPolicyView {
        self.inner.read().clone()
    }

    pub fn update(&self, view: SyncPolicyView) -> Result<(), PolicyError> {
        view.validate()?;
        *self.inner.write() = view;
        Ok(())
    }

    pub fn set_switch_delay(&self, delay: Duration) {
        self.inner.write().timings.switch_delay_ms =
            u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    }
}

impl Default for SyncPolicyHandle {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SyncPolicyView::default())),
        }
    }
}
