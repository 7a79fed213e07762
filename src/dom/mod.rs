//! Document access for the navigation core
//!
//! The core never owns the page. Everything it needs from the live element
//! tree goes through the [`Document`] trait:
//!
//! 1. tree walking (parents, children, element siblings)
//! 2. rendered boxes and computed style
//! 3. document-wide focus
//! 4. scrolling a specific element
//! 5. dispatching synthetic input events and host commands
//!
//! ```text
//! XboxLayout ──► SpatialNavigator ──► Document ◄── host page (mutates between polls)
//! ```
//!
//! Element handles are only valid until the next mutation of the tree. Every
//! query therefore returns `Option` and a detached handle simply reads as
//! "not found".

pub mod memory;
pub mod scene;

use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use memory::{DocumentEvent, MemoryDocument};
pub use scene::{Scene, SceneError, SceneNode};

/// Handle to a live element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    #[default]
    Block,
    Inline,
    InlineBlock,
    Flex,
    Grid,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    /// Declared value only: takes the parent's visibility, `Visible` at the root.
    #[default]
    Inherit,
    Visible,
    Hidden,
    Collapse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Auto,
    Scroll,
}

impl Overflow {
    /// `auto` and `scroll` let the user scroll the box.
    pub fn allows_scrolling(self) -> bool {
        matches!(self, Overflow::Auto | Overflow::Scroll)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    #[default]
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    /// Absolutely and fixed positioned boxes leave the normal flow.
    pub fn is_out_of_flow(self) -> bool {
        matches!(self, Position::Absolute | Position::Fixed)
    }
}

/// The subset of computed style the navigation core reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub opacity: f64,
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,
    pub flex_direction: FlexDirection,
    pub position: Position,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::default(),
            visibility: Visibility::default(),
            opacity: 1.0,
            overflow_x: Overflow::default(),
            overflow_y: Overflow::default(),
            flex_direction: FlexDirection::default(),
            position: Position::default(),
        }
    }
}

/// Scroll offset of a container, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub left: f64,
    pub top: f64,
}

/// Scroll geometry of an element (`scrollLeft`, `clientWidth`, `scrollWidth` and friends).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub offset: ScrollOffset,
    pub client_width: f64,
    pub client_height: f64,
    pub scroll_width: f64,
    pub scroll_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollBehavior {
    /// Jump to the new position within the current frame.
    #[default]
    Instant,
    Smooth,
}

/// Keys the reference layout synthesizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Escape,
    Shift,
    Control,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    /// DOM `KeyboardEvent.key` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Key::Enter => "Enter",
            Key::Escape => "Escape",
            Key::Shift => "Shift",
            Key::Control => "Control",
            Key::ArrowUp => "ArrowUp",
            Key::ArrowDown => "ArrowDown",
            Key::ArrowLeft => "ArrowLeft",
            Key::ArrowRight => "ArrowRight",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointer state carried by synthetic mouse events (`MouseEvent.button` / `buttons`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerButtons {
    pub button: i16,
    pub buttons: u16,
}

impl PointerButtons {
    /// Secondary button going down or held.
    pub const SECONDARY_HELD: PointerButtons = PointerButtons {
        button: 2,
        buttons: 2,
    };
    /// Secondary button released, nothing else held.
    pub const SECONDARY_RELEASED: PointerButtons = PointerButtons {
        button: 2,
        buttons: 0,
    };
}

/// Input events synthesized on behalf of the controller. All of them bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticEvent {
    KeyDown(Key),
    KeyUp(Key),
    MouseDown(PointerButtons),
    MouseUp(PointerButtons),
    ContextMenu(PointerButtons),
}

impl SyntheticEvent {
    /// DOM event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            SyntheticEvent::KeyDown(_) => "keydown",
            SyntheticEvent::KeyUp(_) => "keyup",
            SyntheticEvent::MouseDown(_) => "mousedown",
            SyntheticEvent::MouseUp(_) => "mouseup",
            SyntheticEvent::ContextMenu(_) => "contextmenu",
        }
    }

    pub fn bubbles(&self) -> bool {
        true
    }

    /// Keyboard events are dispatched with the default (non-cancelable) init.
    pub fn cancelable(&self) -> bool {
        !matches!(self, SyntheticEvent::KeyDown(_) | SyntheticEvent::KeyUp(_))
    }
}

/// Page-level actions that are not targeted at an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostCommand {
    HistoryBack,
    HistoryForward,
    ClosePage,
}

/// Live element tree as seen by the navigation core.
///
/// Rectangles are viewport-relative client rectangles (what
/// `getBoundingClientRect` reports), i.e. they already include the scroll
/// offsets of every scrolled ancestor.
pub trait Document {
    /// `<body>`, the default discovery root.
    fn body(&self) -> ElementId;

    /// `<html>`, the top-level scrolling element.
    fn document_element(&self) -> ElementId;

    fn is_connected(&self, element: ElementId) -> bool;

    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// Child elements in document order.
    fn children(&self, element: ElementId) -> Vec<ElementId>;

    fn previous_element_sibling(&self, element: ElementId) -> Option<ElementId>;

    fn next_element_sibling(&self, element: ElementId) -> Option<ElementId>;

    /// Lower-case tag name.
    fn tag_name(&self, element: ElementId) -> Option<&str>;

    fn attribute(&self, element: ElementId, name: &str) -> Option<&str>;

    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;

    fn computed_style(&self, element: ElementId) -> Option<ComputedStyle>;

    fn scroll_metrics(&self, element: ElementId) -> Option<ScrollMetrics>;

    /// Nearest positioned ancestor (`HTMLElement.offsetParent`).
    fn offset_parent(&self, element: ElementId) -> Option<ElementId>;

    /// Visible area of the page in client coordinates.
    fn viewport(&self) -> Rect;

    /// Currently focused element, `None` when focus rests on the document itself.
    fn active_element(&self) -> Option<ElementId>;

    /// Whether [`Document::focus`] can succeed for this element.
    fn is_focusable(&self, element: ElementId) -> bool;

    fn focus(&mut self, element: ElementId) -> bool;

    fn blur(&mut self, element: ElementId);

    /// Scrolls the nearest scrollable ancestors just enough to reveal `element`.
    fn scroll_into_view(&mut self, element: ElementId, behavior: ScrollBehavior);

    fn scroll_by(&mut self, element: ElementId, dx: f64, dy: f64, behavior: ScrollBehavior);

    fn scroll_to(&mut self, element: ElementId, offset: ScrollOffset);

    /// `HTMLElement.click()`.
    fn click(&mut self, element: ElementId);

    fn dispatch(&mut self, target: ElementId, event: SyntheticEvent);

    fn perform(&mut self, command: HostCommand);

    /// Target for synthetic input: the active element, or `<body>` when nothing is focused.
    fn event_target(&self) -> ElementId {
        self.active_element().unwrap_or_else(|| self.body())
    }
}
