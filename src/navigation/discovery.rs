//! Interactable element discovery
//!
//! Elements are discovered fresh on every request and never cached across
//! frames; a handle is only trusted until the host page mutates the tree.

use super::geometry::rect_contains;
use crate::dom::{Display, Document, ElementId, Visibility};
use kurbo::Rect;

/// Roles of elements that accept text or value input.
pub const INPUT_ROLES: [&str; 5] = ["textbox", "searchbox", "combobox", "slider", "spinbutton"];

/// Roles that make an arbitrary element interactive.
pub const INTERACTIVE_ROLES: [&str; 10] = [
    "button",
    "link",
    "checkbox",
    "radio",
    "slider",
    "tab",
    "textbox",
    "searchbox",
    "combobox",
    "spinbutton",
];

fn has_role(doc: &dyn Document, element: ElementId, roles: &[&str]) -> bool {
    doc.attribute(element, "role")
        .is_some_and(|role| roles.contains(&role))
}

pub fn is_content_editable(doc: &dyn Document, element: ElementId) -> bool {
    doc.attribute(element, "contenteditable")
        .is_some_and(|value| value != "false")
}

/// Native text inputs, input roles and content-editable regions.
pub fn is_input(doc: &dyn Document, element: ElementId) -> bool {
    matches!(doc.tag_name(element), Some("input" | "textarea"))
        || has_role(doc, element, &INPUT_ROLES)
        || is_content_editable(doc, element)
}

pub fn is_interactable(doc: &dyn Document, element: ElementId) -> bool {
    matches!(doc.tag_name(element), Some("button" | "a"))
        || is_input(doc, element)
        || has_role(doc, element, &INTERACTIVE_ROLES)
}

/// Rendered with a box and not hidden through `display`, `visibility` or `opacity`.
pub fn is_visible(doc: &dyn Document, element: ElementId) -> bool {
    let Some(rect) = doc.bounding_rect(element) else {
        return false;
    };
    if rect == Rect::ZERO {
        return false;
    }
    doc.computed_style(element).is_some_and(|style| {
        style.display != Display::None
            && style.visibility != Visibility::Hidden
            && style.opacity != 0.0
    })
}

pub fn is_dialog(doc: &dyn Document, element: ElementId) -> bool {
    doc.tag_name(element) == Some("dialog")
        || doc.attribute(element, "role") == Some("dialog")
        || doc.attribute(element, "aria-modal") == Some("true")
}

/// Closest dialog containing `element`, the element itself included.
pub fn dialog_of(doc: &dyn Document, element: ElementId) -> Option<ElementId> {
    let mut current = Some(element);
    while let Some(id) = current {
        if is_dialog(doc, id) {
            return Some(id);
        }
        current = doc.parent(id);
    }
    None
}

/// `<input type="range">` or an input carrying `role="slider"`.
pub fn is_slider(doc: &dyn Document, element: ElementId) -> bool {
    doc.tag_name(element) == Some("input")
        && (doc.attribute(element, "type") == Some("range")
            || doc.attribute(element, "role") == Some("slider"))
}

/// Where to look for interactable elements.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiscoveryScope {
    /// Subtree to walk, `<body>` when unset. The root itself is not a candidate.
    pub root: Option<ElementId>,
    /// Only keep elements whose box lies inside this rectangle.
    pub within: Option<Rect>,
}

impl DiscoveryScope {
    pub fn document() -> Self {
        Self::default()
    }

    pub fn subtree(root: Option<ElementId>) -> Self {
        Self { root, within: None }
    }

    pub fn viewport(doc: &dyn Document) -> Self {
        Self {
            root: None,
            within: Some(doc.viewport()),
        }
    }
}

/// Visible interactable descendants of the scope root in document order.
pub fn interactable_elements(doc: &dyn Document, scope: DiscoveryScope) -> Vec<ElementId> {
    let root = scope.root.unwrap_or_else(|| doc.body());
    let mut found = Vec::new();

    for element in descendants(doc, root) {
        if !is_interactable(doc, element) {
            continue;
        }
        let in_bounds = match scope.within {
            Some(bounds) => doc
                .bounding_rect(element)
                .is_some_and(|rect| rect_contains(rect, bounds)),
            None => true,
        };
        if in_bounds && is_visible(doc, element) {
            found.push(element);
        }
    }

    found
}

/// Pre-order walk of the subtree below `root`, `root` excluded.
pub fn descendants(doc: &dyn Document, root: ElementId) -> Vec<ElementId> {
    let mut order = Vec::new();
    let mut stack: Vec<ElementId> = doc.children(root).into_iter().rev().collect();
    while let Some(element) = stack.pop() {
        order.push(element);
        stack.extend(doc.children(element).into_iter().rev());
    }
    order
}

pub fn is_tab_list(doc: &dyn Document, element: ElementId) -> bool {
    doc.attribute(element, "role") == Some("tablist")
}

/// Tab list next to or around `element`.
///
/// At every level up the tree the previous sibling, then the next sibling,
/// then the element itself is checked.
pub fn tab_list_of(doc: &dyn Document, element: ElementId) -> Option<ElementId> {
    let mut current = Some(element);
    while let Some(id) = current {
        if let Some(previous) = doc.previous_element_sibling(id) {
            if is_tab_list(doc, previous) {
                return Some(previous);
            }
        }
        if let Some(next) = doc.next_element_sibling(id) {
            if is_tab_list(doc, next) {
                return Some(next);
            }
        }
        if is_tab_list(doc, id) {
            return Some(id);
        }
        current = doc.parent(id);
    }
    None
}

/// `role="tab"` descendants of a tab list in document order.
pub fn tab_items(doc: &dyn Document, tab_list: ElementId) -> Vec<ElementId> {
    descendants(doc, tab_list)
        .into_iter()
        .filter(|item| doc.attribute(*item, "role") == Some("tab"))
        .collect()
}

/// Index of the item with `aria-selected="true"`.
pub fn selected_tab(doc: &dyn Document, items: &[ElementId]) -> Option<usize> {
    items
        .iter()
        .position(|item| doc.attribute(*item, "aria-selected") == Some("true"))
}
