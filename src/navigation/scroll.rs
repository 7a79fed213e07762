//! Scroll containers and directional scrolling.

use super::discovery::descendants;
use super::ScrollAxis;
use crate::dom::{Document, ElementId, FlexDirection, ScrollBehavior, ScrollOffset};
use std::collections::HashSet;
use tracing::debug;

/// Result of a [`scroll`] request.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOutcome {
    /// Container of the focused element, if one was found.
    pub container: Option<ElementId>,
    /// Offset of `container` before the request, for reverting.
    pub original_offset: ScrollOffset,
    /// Whether the container was scrollable on the requested axis and got shifted.
    pub scrolled: bool,
}

/// Overflow allows scrolling on `axis` and the content is larger than the box.
///
/// The document element scrolls whenever its content exceeds the viewport.
pub fn is_scrollable(doc: &dyn Document, element: ElementId, axis: ScrollAxis) -> bool {
    let (Some(style), Some(metrics)) = (doc.computed_style(element), doc.scroll_metrics(element))
    else {
        return false;
    };
    let is_root = element == doc.document_element();
    match axis {
        ScrollAxis::Vertical => {
            (is_root || style.overflow_y.allows_scrolling())
                && metrics.scroll_height > metrics.client_height
        }
        ScrollAxis::Horizontal => {
            (is_root || style.overflow_x.allows_scrolling())
                && metrics.scroll_width > metrics.client_width
        }
    }
}

fn overflows_scrollably(doc: &dyn Document, element: ElementId) -> bool {
    let Some(style) = doc.computed_style(element) else {
        return false;
    };
    let Some(metrics) = doc.scroll_metrics(element) else {
        return false;
    };
    (style.overflow_y.allows_scrolling() && metrics.scroll_height > metrics.client_height)
        || (style.overflow_x.allows_scrolling() && metrics.scroll_width > metrics.client_width)
}

/// Closest ancestor (or `element` itself) that scrolls on either axis.
///
/// The walk stops at the document element, which is returned as the
/// top-level scrolling element.
pub fn nearest_scroll_container(doc: &dyn Document, element: ElementId) -> Option<ElementId> {
    let root = doc.document_element();
    if element == root {
        return Some(root);
    }
    if !doc.is_connected(element) {
        return None;
    }

    let mut current = Some(element);
    while let Some(id) = current {
        if overflows_scrollably(doc, id) {
            return Some(id);
        }
        current = doc.parent(id);
        if current == Some(root) {
            break;
        }
    }
    current
}

/// Whether `container` has room left in the direction of `speed`.
///
/// `column-reverse` and `row-reverse` containers start at offset 0 and
/// scroll towards negative offsets.
pub fn can_scroll_further(
    doc: &dyn Document,
    container: ElementId,
    axis: ScrollAxis,
    speed: f64,
) -> bool {
    let (Some(style), Some(metrics)) =
        (doc.computed_style(container), doc.scroll_metrics(container))
    else {
        return false;
    };

    let (offset, client, content, reverse) = match axis {
        ScrollAxis::Vertical => (
            metrics.offset.top,
            metrics.client_height,
            metrics.scroll_height,
            style.flex_direction == FlexDirection::ColumnReverse,
        ),
        ScrollAxis::Horizontal => (
            metrics.offset.left,
            metrics.client_width,
            metrics.scroll_width,
            style.flex_direction == FlexDirection::RowReverse,
        ),
    };

    match (speed >= 0.0, reverse) {
        (true, false) => offset + client < content,
        (true, true) => offset < 0.0,
        (false, false) => offset > 0.0,
        (false, true) => -offset + client < content,
    }
}

/// Whether `element` sits inside `container` but is taken out of its flow
/// by an absolutely or fixed positioned box on its offset-parent chain.
pub fn is_positioned_unrelated(doc: &dyn Document, element: ElementId, container: ElementId) -> bool {
    let inside: HashSet<ElementId> = descendants(doc, container).into_iter().collect();
    let mut unrelated = false;

    let mut current = Some(element);
    while let Some(id) = current {
        if !inside.contains(&id) {
            break;
        }
        let positioned = doc
            .computed_style(id)
            .is_some_and(|style| style.position.is_out_of_flow());
        if positioned {
            unrelated = true;
        }
        current = doc.offset_parent(id);
    }

    unrelated
}

/// Scrolls `container` by `speed` times its client extent on `axis`.
///
/// Returns whether the container was scrollable on that axis.
pub fn scroll_container(
    doc: &mut dyn Document,
    container: ElementId,
    axis: ScrollAxis,
    speed: f64,
    behavior: ScrollBehavior,
) -> bool {
    if !is_scrollable(doc, container, axis) {
        return false;
    }
    let Some(metrics) = doc.scroll_metrics(container) else {
        return false;
    };

    match axis {
        ScrollAxis::Vertical => {
            let amount = metrics.client_height * speed;
            debug!("Scrolling {} vertically by {:.1}", container, amount);
            doc.scroll_by(container, 0.0, amount, behavior);
        }
        ScrollAxis::Horizontal => {
            let amount = metrics.client_width * speed;
            debug!("Scrolling {} horizontally by {:.1}", container, amount);
            doc.scroll_by(container, amount, 0.0, behavior);
        }
    }
    true
}

/// Scrolls the container of the focused element, or the page when nothing has focus.
pub fn scroll(
    doc: &mut dyn Document,
    axis: ScrollAxis,
    speed: f64,
    behavior: ScrollBehavior,
) -> ScrollOutcome {
    let origin = doc.event_target();
    let Some(container) = nearest_scroll_container(doc, origin) else {
        debug!("No scroll container around {}", origin);
        return ScrollOutcome::default();
    };

    let original_offset = doc
        .scroll_metrics(container)
        .map(|metrics| metrics.offset)
        .unwrap_or_default();
    let scrolled = scroll_container(doc, container, axis, speed, behavior);

    ScrollOutcome {
        container: Some(container),
        original_offset,
        scrolled,
    }
}
