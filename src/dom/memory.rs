//! In-memory live document
//!
//! [`MemoryDocument`] keeps an element tree with page-space layout boxes,
//! computed style and per-element scroll state, and answers [`Document`]
//! queries the way a browser would for an already laid-out page. It records
//! every side effect (focus changes, scrolls, clicks, synthetic events, host
//! commands) in an event log so callers can observe what the controller did.

use super::{
    ComputedStyle, Display, Document, ElementId, FlexDirection, HostCommand, Position,
    ScrollBehavior, ScrollMetrics, ScrollOffset, SyntheticEvent, Visibility,
};
use kurbo::{Rect, Size, Vec2};
use std::collections::BTreeMap;
use tracing::debug;

/// Side effect observed on a [`MemoryDocument`].
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    Dispatched {
        target: ElementId,
        event: SyntheticEvent,
    },
    Clicked(ElementId),
    Focused(ElementId),
    Blurred(ElementId),
    Scrolled {
        element: ElementId,
        offset: ScrollOffset,
        behavior: ScrollBehavior,
    },
    Command(HostCommand),
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    // Page-space box with every scroll offset at zero.
    layout: Rect,
    style: ComputedStyle,
    content_size: Option<Size>,
    scroll: ScrollOffset,
    focusable: bool,
    connected: bool,
}

impl Node {
    fn new(tag: &str, parent: Option<ElementId>, layout: Rect) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            parent,
            children: Vec::new(),
            layout,
            style: ComputedStyle::default(),
            content_size: None,
            scroll: ScrollOffset::default(),
            focusable: true,
            connected: true,
        }
    }
}

/// Element tree held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    root: ElementId,
    body: ElementId,
    viewport: Size,
    active: Option<ElementId>,
    events: Vec<DocumentEvent>,
}

impl MemoryDocument {
    /// Creates `<html>` and `<body>` covering a `width` x `height` viewport.
    pub fn new(width: f64, height: f64) -> Self {
        let page = Rect::new(0.0, 0.0, width, height);
        let mut root = Node::new("html", None, page);
        root.children.push(ElementId(1));
        let body = Node::new("body", Some(ElementId(0)), page);

        Self {
            nodes: vec![root, body],
            root: ElementId(0),
            body: ElementId(1),
            viewport: Size::new(width, height),
            active: None,
            events: Vec::new(),
        }
    }

    /// Appends a child element with the given page-space box.
    pub fn append(&mut self, parent: ElementId, tag: &str, rect: Rect) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(Node::new(tag, Some(parent), rect));
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(id);
        }
        id
    }

    pub fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn set_style(&mut self, element: ElementId, style: ComputedStyle) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.style = style;
        }
    }

    pub fn style_mut(&mut self, element: ElementId) -> Option<&mut ComputedStyle> {
        self.nodes.get_mut(element.0).map(|node| &mut node.style)
    }

    /// Size of the scrollable content (`scrollWidth` x `scrollHeight`).
    pub fn set_content_size(&mut self, element: ElementId, width: f64, height: f64) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.content_size = Some(Size::new(width, height));
        }
    }

    pub fn set_focusable(&mut self, element: ElementId, focusable: bool) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.focusable = focusable;
        }
    }

    /// Moves focus without logging, for setting up a page state.
    pub fn set_active(&mut self, element: Option<ElementId>) {
        self.active = element;
    }

    /// Detaches `element` and its subtree. Handles into it become stale.
    pub fn remove(&mut self, element: ElementId) {
        if element == self.root || element == self.body {
            return;
        }
        let Some(parent) = self.nodes.get(element.0).and_then(|node| node.parent) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.retain(|child| *child != element);
        }

        let mut stack = vec![element];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0) {
                node.connected = false;
                stack.extend(node.children.iter().copied());
            }
            if self.active == Some(current) {
                self.active = None;
            }
        }
        debug!("Detached element {} from {}", element, parent);
    }

    /// First connected element whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.nodes
            .iter()
            .enumerate()
            .find(|(_, node)| {
                node.connected && node.attributes.get("id").map(String::as_str) == Some(id)
            })
            .map(|(index, _)| ElementId(index))
    }

    pub fn scroll_offset(&self, element: ElementId) -> Option<ScrollOffset> {
        self.node(element).map(|node| node.scroll)
    }

    pub fn events(&self) -> &[DocumentEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn node(&self, element: ElementId) -> Option<&Node> {
        self.nodes.get(element.0).filter(|node| node.connected)
    }

    fn client_size(&self, element: ElementId, node: &Node) -> Size {
        if element == self.root {
            self.viewport
        } else {
            node.layout.size()
        }
    }

    fn scroll_range(&self, element: ElementId, node: &Node) -> (f64, f64, bool, bool) {
        let client = self.client_size(element, node);
        let content = node.content_size.unwrap_or(client);
        let max_x = (content.width - client.width).max(0.0);
        let max_y = (content.height - client.height).max(0.0);
        let reverse_x = node.style.flex_direction == FlexDirection::RowReverse;
        let reverse_y = node.style.flex_direction == FlexDirection::ColumnReverse;
        (max_x, max_y, reverse_x, reverse_y)
    }

    fn clamp_offset(&self, element: ElementId, offset: ScrollOffset) -> ScrollOffset {
        let Some(node) = self.node(element) else {
            return offset;
        };
        let (max_x, max_y, reverse_x, reverse_y) = self.scroll_range(element, node);
        let clamp = |value: f64, max: f64, reverse: bool| {
            if reverse {
                value.clamp(-max, 0.0)
            } else {
                value.clamp(0.0, max)
            }
        };
        ScrollOffset {
            left: clamp(offset.left, max_x, reverse_x),
            top: clamp(offset.top, max_y, reverse_y),
        }
    }

    fn apply_scroll(&mut self, element: ElementId, target: ScrollOffset, behavior: ScrollBehavior) {
        let clamped = self.clamp_offset(element, target);
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.scroll = clamped;
        }
        debug!(
            "Scrolled {} to ({:.1}, {:.1}) {:?}",
            element, clamped.left, clamped.top, behavior
        );
        self.events.push(DocumentEvent::Scrolled {
            element,
            offset: clamped,
            behavior,
        });
    }

    fn is_rendered(&self, element: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(id) = current {
            let Some(node) = self.node(id) else {
                return false;
            };
            if node.style.display == Display::None {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// `visibility` is inherited unless an element declares its own.
    fn resolved_visibility(&self, element: ElementId) -> Visibility {
        let mut current = Some(element);
        while let Some(id) = current {
            let Some(node) = self.node(id) else {
                break;
            };
            if node.style.visibility != Visibility::Inherit {
                return node.style.visibility;
            }
            current = node.parent;
        }
        Visibility::Visible
    }

    fn can_scroll_axis(&self, element: ElementId, node: &Node, vertical: bool) -> bool {
        let client = self.client_size(element, node);
        let content = node.content_size.unwrap_or(client);
        let overflow = if vertical {
            node.style.overflow_y
        } else {
            node.style.overflow_x
        };
        let allowed = element == self.root || overflow.allows_scrolling();
        if vertical {
            allowed && content.height > client.height
        } else {
            allowed && content.width > client.width
        }
    }

    fn visible_port(&self, element: ElementId) -> Option<Rect> {
        if element == self.root {
            Some(Rect::from_origin_size((0.0, 0.0), self.viewport))
        } else {
            self.bounding_rect(element)
        }
    }

    // Switches the selected tab the way a typical tab widget reacts to clicks.
    fn select_tab(&mut self, tab: ElementId) {
        let mut tab_list = self.parent(tab);
        while let Some(candidate) = tab_list {
            if self.attribute(candidate, "role") == Some("tablist") {
                break;
            }
            tab_list = self.parent(candidate);
        }
        let Some(tab_list) = tab_list else {
            return;
        };

        let mut stack = self.children(tab_list);
        stack.reverse();
        while let Some(current) = stack.pop() {
            if self.attribute(current, "role") == Some("tab") {
                let selected = if current == tab { "true" } else { "false" };
                self.set_attribute(current, "aria-selected", selected);
            }
            let mut children = self.children(current);
            children.reverse();
            stack.extend(children);
        }
    }
}

fn nearest_delta(start: f64, end: f64, port_start: f64, port_end: f64) -> f64 {
    if start < port_start && end > port_end {
        0.0
    } else if start < port_start {
        start - port_start
    } else if end > port_end {
        (end - port_end).min(start - port_start)
    } else {
        0.0
    }
}

impl Document for MemoryDocument {
    fn body(&self) -> ElementId {
        self.body
    }

    fn document_element(&self) -> ElementId {
        self.root
    }

    fn is_connected(&self, element: ElementId) -> bool {
        self.node(element).is_some()
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.node(element).and_then(|node| node.parent)
    }

    fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.node(element)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    fn previous_element_sibling(&self, element: ElementId) -> Option<ElementId> {
        let siblings = self.children(self.parent(element)?);
        let index = siblings.iter().position(|sibling| *sibling == element)?;
        index.checked_sub(1).map(|previous| siblings[previous])
    }

    fn next_element_sibling(&self, element: ElementId) -> Option<ElementId> {
        let siblings = self.children(self.parent(element)?);
        let index = siblings.iter().position(|sibling| *sibling == element)?;
        siblings.get(index + 1).copied()
    }

    fn tag_name(&self, element: ElementId) -> Option<&str> {
        self.node(element).map(|node| node.tag.as_str())
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<&str> {
        self.node(element)
            .and_then(|node| node.attributes.get(name))
            .map(String::as_str)
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        let node = self.node(element)?;
        if !self.is_rendered(element) {
            return Some(Rect::ZERO);
        }

        let mut shift = Vec2::ZERO;
        let mut pinned = node.style.position == Position::Fixed;
        let mut ancestor = node.parent;
        while let Some(id) = ancestor {
            if pinned {
                break;
            }
            let Some(current) = self.node(id) else {
                break;
            };
            shift += Vec2::new(current.scroll.left, current.scroll.top);
            pinned = current.style.position == Position::Fixed;
            ancestor = current.parent;
        }

        Some(node.layout - shift)
    }

    fn computed_style(&self, element: ElementId) -> Option<ComputedStyle> {
        let node = self.node(element)?;
        Some(ComputedStyle {
            visibility: self.resolved_visibility(element),
            ..node.style
        })
    }

    fn scroll_metrics(&self, element: ElementId) -> Option<ScrollMetrics> {
        let node = self.node(element)?;
        let client = self.client_size(element, node);
        let content = node.content_size.unwrap_or(client);
        Some(ScrollMetrics {
            offset: node.scroll,
            client_width: client.width,
            client_height: client.height,
            scroll_width: content.width.max(client.width),
            scroll_height: content.height.max(client.height),
        })
    }

    fn offset_parent(&self, element: ElementId) -> Option<ElementId> {
        if element == self.root || element == self.body || !self.is_rendered(element) {
            return None;
        }
        let node = self.node(element)?;
        if node.style.position == Position::Fixed {
            return None;
        }
        let mut ancestor = node.parent;
        while let Some(id) = ancestor {
            if id == self.body {
                return Some(id);
            }
            let current = self.node(id)?;
            if current.style.position != Position::Static {
                return Some(id);
            }
            ancestor = current.parent;
        }
        None
    }

    fn viewport(&self) -> Rect {
        Rect::from_origin_size((0.0, 0.0), self.viewport)
    }

    fn active_element(&self) -> Option<ElementId> {
        self.active.filter(|active| self.is_connected(*active))
    }

    fn is_focusable(&self, element: ElementId) -> bool {
        self.node(element).is_some_and(|node| node.focusable)
    }

    fn focus(&mut self, element: ElementId) -> bool {
        if !self.is_focusable(element) {
            return false;
        }
        if self.active != Some(element) {
            self.active = Some(element);
            self.events.push(DocumentEvent::Focused(element));
        }
        true
    }

    fn blur(&mut self, element: ElementId) {
        if self.active == Some(element) {
            self.active = None;
            self.events.push(DocumentEvent::Blurred(element));
        }
    }

    fn scroll_into_view(&mut self, element: ElementId, behavior: ScrollBehavior) {
        let mut container = self.parent(element);
        while let Some(id) = container {
            let Some(node) = self.node(id) else {
                break;
            };
            let scroll_x = self.can_scroll_axis(id, node, false);
            let scroll_y = self.can_scroll_axis(id, node, true);
            let parent = node.parent;

            if scroll_x || scroll_y {
                if let (Some(target), Some(port)) =
                    (self.bounding_rect(element), self.visible_port(id))
                {
                    let dx = if scroll_x {
                        nearest_delta(target.x0, target.x1, port.x0, port.x1)
                    } else {
                        0.0
                    };
                    let dy = if scroll_y {
                        nearest_delta(target.y0, target.y1, port.y0, port.y1)
                    } else {
                        0.0
                    };
                    if dx != 0.0 || dy != 0.0 {
                        self.scroll_by(id, dx, dy, behavior);
                    }
                }
            }
            container = parent;
        }
    }

    fn scroll_by(&mut self, element: ElementId, dx: f64, dy: f64, behavior: ScrollBehavior) {
        let Some(current) = self.scroll_offset(element) else {
            return;
        };
        let target = ScrollOffset {
            left: current.left + dx,
            top: current.top + dy,
        };
        self.apply_scroll(element, target, behavior);
    }

    fn scroll_to(&mut self, element: ElementId, offset: ScrollOffset) {
        if self.is_connected(element) {
            self.apply_scroll(element, offset, ScrollBehavior::Instant);
        }
    }

    fn click(&mut self, element: ElementId) {
        if !self.is_connected(element) {
            return;
        }
        self.events.push(DocumentEvent::Clicked(element));
        if self.attribute(element, "role") == Some("tab") {
            self.select_tab(element);
        }
    }

    fn dispatch(&mut self, target: ElementId, event: SyntheticEvent) {
        debug!(
            "Dispatching {} to {} (bubbles: {}, cancelable: {}): {:?}",
            event.event_type(),
            target,
            event.bubbles(),
            event.cancelable(),
            event
        );
        self.events.push(DocumentEvent::Dispatched { target, event });
    }

    fn perform(&mut self, command: HostCommand) {
        debug!("Host command: {:?}", command);
        self.events.push(DocumentEvent::Command(command));
    }
}
