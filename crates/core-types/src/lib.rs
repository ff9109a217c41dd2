use std::fmt;

use thiserror::Error;

/// Error surfaced by any page-facing port.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortError {
    /// The handle no longer points at a live element.
    #[error("element {0} is detached")]
    Detached(ElementHandle),
    /// The page rejected or threw while running an evaluation.
    #[error("page script failed: {0}")]
    Script(String),
    /// The connection to the page is gone or misbehaving.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The page answered with something we could not interpret.
    #[error("unexpected page reply: {0}")]
    Decode(String),
}

impl PortError {
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

/// Opaque reference to an element living in the host page.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural lookup understood by the query port.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Query {
    /// CSS selector, evaluated against the scope (or the document).
    Css(String),
    /// Exact element id; never parsed as a selector, so ids need no escaping.
    Id(String),
}

impl Query {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Css(selector) => write!(f, "css({})", selector),
            Query::Id(id) => write!(f, "id({})", id),
        }
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Bounding box in viewport coordinates.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

/// Synthetic input signal the interaction port can dispatch.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InteractionKind {
    Enter,
    Hover,
    Press,
    Release,
    Click,
    /// Semantic activation (`element.click()`), no coordinates involved.
    Activate,
}

impl InteractionKind {
    /// DOM event name dispatched for this kind; `None` for semantic activation.
    pub fn event_name(self) -> Option<&'static str> {
        match self {
            InteractionKind::Enter => Some("mouseenter"),
            InteractionKind::Hover => Some("mouseover"),
            InteractionKind::Press => Some("mousedown"),
            InteractionKind::Release => Some("mouseup"),
            InteractionKind::Click => Some("click"),
            InteractionKind::Activate => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InteractionKind::Enter => "enter",
            InteractionKind::Hover => "hover",
            InteractionKind::Press => "press",
            InteractionKind::Release => "release",
            InteractionKind::Click => "click",
            InteractionKind::Activate => "activate",
        }
    }
}

/// Vertical alignment requested when scrolling an element into view.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ScrollBlock {
    Start,
    Center,
}

impl ScrollBlock {
    pub fn as_str(self) -> &'static str {
        match self {
            ScrollBlock::Start => "start",
            ScrollBlock::Center => "center",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_center_is_midpoint() {
        let rect = Rect::new(10.0, 20.0, 100.0, 40.0);
        assert_eq!(rect.center(), Point { x: 60.0, y: 40.0 });
    }

    #[test]
    fn activation_has_no_dom_event() {
        assert_eq!(InteractionKind::Activate.event_name(), None);
        assert_eq!(InteractionKind::Press.event_name(), Some("mousedown"));
    }

    #[test]
    fn detached_error_names_handle() {
        let err = PortError::Detached(ElementHandle::new("7"));
        assert_eq!(err.to_string(), "element #7 is detached");
    }
}
