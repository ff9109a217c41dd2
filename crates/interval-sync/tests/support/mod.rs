//! Scripted in-memory page used by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chartsync_core_types::{
    ElementHandle, InteractionKind, Point, PortError, Query, Rect, ScrollBlock,
};
use interval_sync::{
    EventsPort, IntervalCatalog, PageSelectors, SyncEvent, SyncOrchestrator, SyncPolicyHandle,
    SyncPolicyView,
};
use parking_lot::Mutex;

/// What makes a widget's dropdown show up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenOn {
    /// Semantic activation of the selector field.
    Activate,
    /// Pointer click on the wider trigger.
    Click,
    /// Nothing does.
    Never,
    /// A trigger click opens an overlay under an unrelated id.
    Stray,
}

#[derive(Clone, Debug)]
pub struct FakeWidget {
    pub title: String,
    pub current: String,
    pub dropdown_id: String,
    pub open_on: OpenOn,
    pub options: Vec<String>,
}

impl FakeWidget {
    pub fn new(title: &str, current: &str, dropdown_id: &str, open_on: OpenOn) -> Self {
        Self {
            title: title.to_string(),
            current: current.to_string(),
            dropdown_id: dropdown_id.to_string(),
            open_on,
            options: standard_labels(),
        }
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }
}

pub fn standard_labels() -> Vec<String> {
    IntervalCatalog::builtin()
        .options()
        .iter()
        .map(|o| o.label.clone())
        .collect()
}

type Hook = Box<dyn Fn(&ElementHandle, InteractionKind) + Send + Sync>;

struct Overlay {
    key: String,
    owner: Option<usize>,
    options: Vec<String>,
}

#[derive(Default)]
struct PageState {
    eligible: bool,
    widgets: Vec<FakeWidget>,
    open: Vec<Overlay>,
    interactions: Vec<(ElementHandle, InteractionKind)>,
    scrolls: Vec<(ElementHandle, ScrollBlock)>,
    selected: Vec<(String, String)>,
}

/// Page double that answers structural queries and reacts to interactions.
pub struct ScriptedPage {
    selectors: PageSelectors,
    state: Mutex<PageState>,
    hook: Option<Hook>,
}

impl ScriptedPage {
    pub fn new(widgets: Vec<FakeWidget>) -> Self {
        Self {
            selectors: PageSelectors::default(),
            state: Mutex::new(PageState {
                eligible: true,
                widgets,
                ..PageState::default()
            }),
            hook: None,
        }
    }

    pub fn ineligible(self) -> Self {
        self.state.lock().eligible = false;
        self
    }

    pub fn with_hook(
        mut self,
        hook: impl Fn(&ElementHandle, InteractionKind) + Send + Sync + 'static,
    ) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Leaves an unrelated, populated overlay open on the page.
    pub fn with_leftover_overlay(self, key: &str) -> Self {
        self.state.lock().open.push(Overlay {
            key: key.to_string(),
            owner: None,
            options: vec!["leftover".to_string()],
        });
        self
    }

    pub fn set_eligible(&self, eligible: bool) {
        self.state.lock().eligible = eligible;
    }

    pub fn current_intervals(&self) -> Vec<String> {
        self.state
            .lock()
            .widgets
            .iter()
            .map(|w| w.current.clone())
            .collect()
    }

    pub fn interactions(&self) -> Vec<(ElementHandle, InteractionKind)> {
        self.state.lock().interactions.clone()
    }

    /// Interactions that targeted widget `ordinal` (1-based) or its controls.
    pub fn interactions_for(&self, ordinal: usize) -> Vec<InteractionKind> {
        let prefix = format!("w{}.", ordinal);
        self.interactions()
            .into_iter()
            .filter(|(el, _)| el.as_str().starts_with(&prefix))
            .map(|(_, kind)| kind)
            .collect()
    }

    pub fn scrolls(&self) -> Vec<(ElementHandle, ScrollBlock)> {
        self.state.lock().scrolls.clone()
    }

    pub fn selected(&self) -> Vec<(String, String)> {
        self.state.lock().selected.clone()
    }

    pub fn open_overlays(&self) -> Vec<String> {
        self.state.lock().open.iter().map(|o| o.key.clone()).collect()
    }

    fn widget_index(handle: &ElementHandle, suffix: &str) -> Option<usize> {
        let rest = handle.as_str().strip_prefix('w')?;
        let number = match suffix {
            "" => rest,
            _ => rest.strip_suffix(suffix)?,
        };
        number.parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1)
    }

    fn overlay_key(handle: &ElementHandle) -> Option<&str> {
        handle.as_str().strip_prefix("dd:")
    }

    fn open_for(state: &mut PageState, idx: usize, stray: bool) {
        let Some(widget) = state.widgets.get(idx) else {
            return;
        };
        let key = if stray {
            format!("{}-portal", widget.dropdown_id)
        } else {
            widget.dropdown_id.clone()
        };
        if state.open.iter().any(|o| o.key == key) {
            return;
        }
        let options = widget.options.clone();
        state.open.push(Overlay {
            key,
            owner: Some(idx),
            options,
        });
    }

    fn react(&self, element: &ElementHandle, kind: InteractionKind) {
        let mut state = self.state.lock();
        state.interactions.push((element.clone(), kind));

        if element.as_str() == "body" && kind == InteractionKind::Activate {
            state.open.clear();
            return;
        }

        if let Some(idx) = Self::widget_index(element, ".field") {
            let opens = state.widgets.get(idx).map(|w| w.open_on) == Some(OpenOn::Activate);
            if opens && kind == InteractionKind::Activate {
                Self::open_for(&mut state, idx, false);
            }
            return;
        }

        if let Some(idx) = Self::widget_index(element, ".trigger") {
            if kind == InteractionKind::Click {
                match state.widgets.get(idx).map(|w| w.open_on) {
                    Some(OpenOn::Click) => Self::open_for(&mut state, idx, false),
                    Some(OpenOn::Stray) => Self::open_for(&mut state, idx, true),
                    _ => {}
                }
            }
            return;
        }

        if kind != InteractionKind::Activate {
            return;
        }
        let Some((key, option)) = element
            .as_str()
            .strip_prefix("dd:")
            .and_then(|rest| rest.split_once(".opt"))
        else {
            return;
        };
        let Some(pos) = state.open.iter().position(|o| o.key == key) else {
            return;
        };
        let Some(label) = option
            .parse::<usize>()
            .ok()
            .and_then(|j| state.open[pos].options.get(j).cloned())
        else {
            return;
        };
        let overlay = state.open.remove(pos);
        if let Some(owner) = overlay.owner {
            state.widgets[owner].current = label.clone();
        }
        state.selected.push((overlay.key, label));
    }
}

#[async_trait]
impl interval_sync::ports::QueryPort for ScriptedPage {
    async fn query_all(
        &self,
        scope: Option<&ElementHandle>,
        query: &Query,
    ) -> Result<Vec<ElementHandle>, PortError> {
        let state = self.state.lock();
        let selector = match query {
            Query::Id(id) => {
                return Ok(state
                    .open
                    .iter()
                    .filter(|o| &o.key == id)
                    .map(|o| ElementHandle::new(format!("dd:{}", o.key)))
                    .collect());
            }
            Query::Css(selector) => selector.as_str(),
        };
        let s = &self.selectors;

        let found = match scope {
            None if selector == s.view_tab => vec![ElementHandle::new("tab")],
            None if selector == s.container => vec![ElementHandle::new("container")],
            None if selector == s.page_body => vec![ElementHandle::new("body")],
            None if selector == s.dropdown_overlay => state
                .open
                .iter()
                .map(|o| ElementHandle::new(format!("dd:{}", o.key)))
                .collect(),
            Some(scope) if selector == s.widget_title => Self::widget_index(scope, "")
                .map(|i| vec![ElementHandle::new(format!("w{}.title", i + 1))])
                .unwrap_or_default(),
            Some(scope) if selector == s.selector_field => Self::widget_index(scope, "")
                .map(|i| vec![ElementHandle::new(format!("w{}.field", i + 1))])
                .unwrap_or_default(),
            Some(scope) if selector == s.dropdown_option => Self::overlay_key(scope)
                .and_then(|key| state.open.iter().find(|o| o.key == key))
                .map(|o| {
                    (0..o.options.len())
                        .map(|j| ElementHandle::new(format!("dd:{}.opt{}", o.key, j)))
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        Ok(found)
    }

    async fn children(&self, element: &ElementHandle) -> Result<Vec<ElementHandle>, PortError> {
        if element.as_str() != "container" {
            return Ok(Vec::new());
        }
        let count = self.state.lock().widgets.len();
        Ok((1..=count)
            .map(|i| ElementHandle::new(format!("w{}", i)))
            .collect())
    }

    async fn closest(
        &self,
        element: &ElementHandle,
        query: &Query,
    ) -> Result<Option<ElementHandle>, PortError> {
        let wants_trigger = matches!(query, Query::Css(sel) if *sel == self.selectors.selector_trigger);
        Ok(Self::widget_index(element, ".field")
            .filter(|_| wants_trigger)
            .map(|i| ElementHandle::new(format!("w{}.trigger", i + 1))))
    }

    async fn text(&self, element: &ElementHandle) -> Result<Option<String>, PortError> {
        let state = self.state.lock();
        if let Some(idx) = Self::widget_index(element, ".title") {
            return Ok(state.widgets.get(idx).map(|w| w.title.clone()));
        }
        if let Some(idx) = Self::widget_index(element, ".field") {
            return Ok(state.widgets.get(idx).map(|w| format!(" {} ", w.current)));
        }
        if let Some((key, j)) = element
            .as_str()
            .strip_prefix("dd:")
            .and_then(|rest| rest.split_once(".opt"))
        {
            let label = state
                .open
                .iter()
                .find(|o| o.key == key)
                .and_then(|o| j.parse::<usize>().ok().and_then(|j| o.options.get(j)))
                .cloned();
            return match label {
                Some(label) => Ok(Some(label)),
                None => Err(PortError::Detached(element.clone())),
            };
        }
        Ok(None)
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, PortError> {
        let state = self.state.lock();
        if element.as_str() == "tab" && name == self.selectors.view_tab_attribute {
            return Ok(Some(state.eligible.to_string()));
        }
        if name == self.selectors.dropdown_id_attribute {
            if let Some(idx) = Self::widget_index(element, ".trigger") {
                return Ok(state.widgets.get(idx).map(|w| w.dropdown_id.clone()));
            }
        }
        Ok(None)
    }

    async fn geometry(&self, element: &ElementHandle) -> Result<Option<Rect>, PortError> {
        Ok(Self::widget_index(element, ".trigger")
            .map(|i| Rect::new(10.0, 100.0 * i as f64, 80.0, 20.0)))
    }

    async fn child_count(&self, element: &ElementHandle) -> Result<usize, PortError> {
        let state = self.state.lock();
        Ok(Self::overlay_key(element)
            .and_then(|key| state.open.iter().find(|o| o.key == key))
            .map(|o| o.options.len())
            .unwrap_or(0))
    }
}

#[async_trait]
impl interval_sync::ports::InteractionPort for ScriptedPage {
    async fn emit(
        &self,
        element: &ElementHandle,
        kind: InteractionKind,
        _at: Option<Point>,
    ) -> Result<(), PortError> {
        self.react(element, kind);
        if let Some(hook) = &self.hook {
            hook(element, kind);
        }
        Ok(())
    }

    async fn scroll_into_view(
        &self,
        element: &ElementHandle,
        block: ScrollBlock,
    ) -> Result<(), PortError> {
        self.state.lock().scrolls.push((element.clone(), block));
        Ok(())
    }
}

/// Collects every published event in order.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<SyncEvent>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().clone()
    }

    pub fn notices(&self) -> Vec<interval_sync::Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SyncEvent::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn progress(&self) -> Vec<interval_sync::Progress> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SyncEvent::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

impl EventsPort for Recorder {
    fn publish(&self, event: SyncEvent) {
        self.events.lock().push(event);
    }
}

pub struct Harness {
    pub page: Arc<ScriptedPage>,
    pub events: Arc<Recorder>,
    pub orchestrator: Arc<SyncOrchestrator>,
}

pub fn harness(page: ScriptedPage) -> Harness {
    harness_with_policy(page, SyncPolicyView::default())
}

pub fn harness_with_policy(page: ScriptedPage, view: SyncPolicyView) -> Harness {
    let page = Arc::new(page);
    let events = Arc::new(Recorder::default());
    let orchestrator = SyncOrchestrator::builder(Arc::new(IntervalCatalog::builtin()))
        .with_query(page.clone())
        .with_interaction(page.clone())
        .with_events(events.clone())
        .with_policy(SyncPolicyHandle::new(view).expect("valid policy"))
        .build()
        .expect("orchestrator builds");
    Harness {
        page,
        events,
        orchestrator: Arc::new(orchestrator),
    }
}
