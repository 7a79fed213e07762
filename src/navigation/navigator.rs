//! Spatial navigator
//!
//! Moves document focus to the closest interactable element in a requested
//! direction. With a focused element inside the viewport the search is
//! relative to that element; without one, navigation starts from the
//! extremal visible element for the direction (e.g. the topmost one for
//! "down").

use super::discovery::{dialog_of, interactable_elements, DiscoveryScope};
use super::geometry::{directional_distance, rect_contains};
use super::scroll::{
    can_scroll_further, is_positioned_unrelated, nearest_scroll_container, scroll,
    scroll_container, ScrollOutcome,
};
use super::throttle::LeadingThrottle;
use super::{Direction, ScrollAxis};
use crate::config::NavigatorSettings;
use crate::dom::{Document, ElementId, ScrollBehavior};
use kurbo::Rect;
use std::time::Instant;
use tracing::{debug, info};

/// Focus movement and scrolling for one controller session.
///
/// Navigation and scroll requests are throttled independently with the same
/// window length.
#[derive(Debug, Clone)]
pub struct SpatialNavigator {
    navigation_throttle: LeadingThrottle,
    scroll_throttle: LeadingThrottle,
    navigation_scroll_speed: f64,
}

impl Default for SpatialNavigator {
    fn default() -> Self {
        Self::new(&NavigatorSettings::default())
    }
}

impl SpatialNavigator {
    pub fn new(settings: &NavigatorSettings) -> Self {
        debug!("Creating SpatialNavigator with settings: {:?}", settings);
        Self {
            navigation_throttle: LeadingThrottle::new(settings.throttle_window()),
            scroll_throttle: LeadingThrottle::new(settings.throttle_window()),
            navigation_scroll_speed: settings.navigation_scroll_speed,
        }
    }

    /// Clears both throttle windows.
    pub fn reset(&mut self) {
        self.navigation_throttle.reset();
        self.scroll_throttle.reset();
    }

    /// Throttled [`navigate`](Self::navigate).
    ///
    /// When the window allows the request, its outcome is written to `result`
    /// and `true` is returned. Dropped requests leave `result` untouched.
    pub fn request_navigation(
        &mut self,
        doc: &mut dyn Document,
        direction: Direction,
        now: Instant,
        result: &mut bool,
    ) -> bool {
        if !self.navigation_throttle.try_acquire(now) {
            return false;
        }
        *result = self.navigate(doc, direction);
        true
    }

    /// Throttled [`scroll`] of the focused element's container.
    pub fn request_scroll(
        &mut self,
        doc: &mut dyn Document,
        axis: ScrollAxis,
        speed: f64,
        behavior: ScrollBehavior,
        now: Instant,
        result: &mut ScrollOutcome,
    ) -> bool {
        if !self.scroll_throttle.try_acquire(now) {
            return false;
        }
        *result = scroll(doc, axis, speed, behavior);
        true
    }

    /// Moves focus one step in `direction`. Returns whether focus moved.
    pub fn navigate(&mut self, doc: &mut dyn Document, direction: Direction) -> bool {
        let viewport = doc.viewport();
        let reference = doc.active_element().filter(|active| {
            *active != doc.body()
                && doc
                    .bounding_rect(*active)
                    .is_some_and(|rect| rect_contains(rect, viewport))
        });

        match reference {
            Some(current) => self.navigate_from(doc, current, direction),
            None => {
                debug!("No focused element in view, picking a starting point {}", direction);
                match starting_point(doc, direction) {
                    Some(target) => focus(doc, target),
                    None => false,
                }
            }
        }
    }

    fn navigate_from(&self, doc: &mut dyn Document, current: ElementId, direction: Direction) -> bool {
        let mut candidate = find_candidate(doc, current, direction);

        if let Some(container) = nearest_scroll_container(doc, current) {
            let axis = direction.axis();
            let speed = direction.sign() * self.navigation_scroll_speed;

            while let Some(found) = candidate {
                if !can_scroll_further(doc, container, axis, speed)
                    || !is_positioned_unrelated(doc, found, container)
                {
                    break;
                }

                let Some(original) = doc.scroll_metrics(container).map(|m| m.offset) else {
                    break;
                };
                if !scroll_container(doc, container, axis, speed, ScrollBehavior::Instant) {
                    break;
                }
                let moved = doc
                    .scroll_metrics(container)
                    .is_some_and(|m| m.offset != original);

                let next = find_candidate(doc, current, direction);
                if !moved || next == candidate {
                    debug!("Scrolling {} revealed nothing new, reverting", container);
                    doc.scroll_to(container, original);
                    break;
                }
                candidate = next;
            }
        }

        match candidate {
            Some(target) => focus(doc, target),
            None => {
                debug!("No candidate {} of {}", direction, current);
                false
            }
        }
    }
}

/// Blurs the active element, focuses `target` and scrolls it into view.
pub fn focus(doc: &mut dyn Document, target: ElementId) -> bool {
    if !doc.is_focusable(target) {
        debug!("{} cannot take focus", target);
        return false;
    }
    if let Some(active) = doc.active_element() {
        doc.blur(active);
    }
    if !doc.focus(target) {
        return false;
    }
    doc.scroll_into_view(target, ScrollBehavior::Smooth);
    info!("Focus moved to {}", target);
    true
}

/// Closest interactable element in `direction`, never `current` itself.
///
/// Inside a dialog only the dialog's elements are considered. On equal
/// distances the element found first in document order wins.
pub fn find_candidate(
    doc: &dyn Document,
    current: ElementId,
    direction: Direction,
) -> Option<ElementId> {
    let source = doc.bounding_rect(current)?;
    let scope = DiscoveryScope::subtree(dialog_of(doc, current));
    let side = direction.side();

    let mut best: Option<(ElementId, f64)> = None;
    for element in interactable_elements(doc, scope) {
        if element == current {
            continue;
        }
        let Some(rect) = doc.bounding_rect(element) else {
            continue;
        };
        let distance = directional_distance(source, rect, side);
        if !distance.is_finite() {
            continue;
        }
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((element, distance));
        }
    }

    if let Some((element, distance)) = best {
        debug!("Candidate {} of {}: {} at {:.1}", direction, current, element, distance);
    }
    best.map(|(element, _)| element)
}

/// Extremal visible element for `direction` when nothing is focused.
pub fn starting_point(doc: &dyn Document, direction: Direction) -> Option<ElementId> {
    let mut best: Option<(ElementId, Rect)> = None;

    for element in interactable_elements(doc, DiscoveryScope::viewport(doc)) {
        let Some(rect) = doc.bounding_rect(element) else {
            continue;
        };
        let better = match best {
            None => true,
            Some((_, leader)) => sweeps_ahead(direction, rect, leader),
        };
        if better {
            best = Some((element, rect));
        }
    }

    best.map(|(element, _)| element)
}

fn sweeps_ahead(direction: Direction, rect: Rect, leader: Rect) -> bool {
    match direction {
        Direction::Up => rect.y1 > leader.y1 || (rect.y1 == leader.y1 && rect.x0 < leader.x0),
        Direction::Down => rect.y0 < leader.y0 || (rect.y0 == leader.y0 && rect.x0 < leader.x0),
        Direction::Left => rect.x1 > leader.x1 || (rect.x1 == leader.x1 && rect.y0 < leader.y0),
        Direction::Right => rect.x0 < leader.x0 || (rect.x0 == leader.x0 && rect.y0 < leader.y0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DocumentEvent, MemoryDocument, Overflow, Position, ScrollOffset};
    use std::time::Duration;

    fn button(doc: &mut MemoryDocument, parent: ElementId, x: f64, y: f64) -> ElementId {
        doc.append(parent, "button", Rect::new(x, y, x + 100.0, y + 40.0))
    }

    fn grid() -> (MemoryDocument, [ElementId; 4]) {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let body = doc.body();
        let top_left = button(&mut doc, body, 50.0, 50.0);
        let top_right = button(&mut doc, body, 300.0, 50.0);
        let bottom_left = button(&mut doc, body, 50.0, 200.0);
        let bottom_right = button(&mut doc, body, 300.0, 200.0);
        (doc, [top_left, top_right, bottom_left, bottom_right])
    }

    #[test]
    fn moves_to_the_closest_element_in_each_direction() {
        let (mut doc, [top_left, top_right, bottom_left, bottom_right]) = grid();
        let mut navigator = SpatialNavigator::default();
        doc.set_active(Some(top_left));

        assert!(navigator.navigate(&mut doc, Direction::Right));
        assert_eq!(doc.active_element(), Some(top_right));
        assert!(navigator.navigate(&mut doc, Direction::Down));
        assert_eq!(doc.active_element(), Some(bottom_right));
        assert!(navigator.navigate(&mut doc, Direction::Left));
        assert_eq!(doc.active_element(), Some(bottom_left));
        assert!(navigator.navigate(&mut doc, Direction::Up));
        assert_eq!(doc.active_element(), Some(top_left));
    }

    #[test]
    fn edge_of_the_page_reports_failure() {
        let (mut doc, [top_left, ..]) = grid();
        let mut navigator = SpatialNavigator::default();
        doc.set_active(Some(top_left));

        assert!(!navigator.navigate(&mut doc, Direction::Up));
        assert!(!navigator.navigate(&mut doc, Direction::Left));
        assert_eq!(doc.active_element(), Some(top_left));
    }

    #[test]
    fn candidate_is_never_the_reference() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let body = doc.body();
        let only = button(&mut doc, body, 10.0, 10.0);
        // Overlapping twin with an identical box.
        let twin = button(&mut doc, body, 10.0, 10.0);

        for direction in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert_ne!(find_candidate(&doc, only, direction), Some(only));
            assert_ne!(find_candidate(&doc, twin, direction), Some(twin));
        }
    }

    #[test]
    fn equal_distances_keep_the_first_in_document_order() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let body = doc.body();
        let current = button(&mut doc, body, 200.0, 100.0);
        let first = button(&mut doc, body, 100.0, 200.0);
        let second = button(&mut doc, body, 300.0, 200.0);

        assert_eq!(find_candidate(&doc, current, Direction::Down), Some(first));
        assert_ne!(find_candidate(&doc, current, Direction::Down), Some(second));
    }

    #[test]
    fn open_dialog_keeps_focus_inside() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let body = doc.body();
        let outside = button(&mut doc, body, 100.0, 500.0);
        let dialog = doc.append(body, "dialog", Rect::new(100.0, 100.0, 500.0, 400.0));
        let confirm = button(&mut doc, dialog, 120.0, 120.0);
        let cancel = button(&mut doc, dialog, 120.0, 300.0);

        assert_eq!(find_candidate(&doc, confirm, Direction::Down), Some(cancel));
        assert_eq!(find_candidate(&doc, cancel, Direction::Down), None);
        assert_eq!(find_candidate(&doc, outside, Direction::Up), Some(cancel));
    }

    #[test]
    fn bootstrap_sweeps_per_direction() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let body = doc.body();
        let right_top = button(&mut doc, body, 50.0, 100.0);
        let left_top = button(&mut doc, body, 10.0, 100.0);
        let lowest = button(&mut doc, body, 400.0, 400.0);

        assert_eq!(starting_point(&doc, Direction::Down), Some(left_top));
        assert_eq!(starting_point(&doc, Direction::Right), Some(left_top));
        assert_eq!(starting_point(&doc, Direction::Up), Some(lowest));
        assert_eq!(starting_point(&doc, Direction::Left), Some(lowest));
        assert_ne!(starting_point(&doc, Direction::Down), Some(right_top));
    }

    #[test]
    fn offscreen_focus_restarts_from_the_viewport() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let root = doc.document_element();
        doc.set_content_size(root, 800.0, 2000.0);
        let body = doc.body();
        let visible = button(&mut doc, body, 10.0, 10.0);
        let far = button(&mut doc, body, 10.0, 1500.0);
        doc.set_active(Some(far));

        let mut navigator = SpatialNavigator::default();
        assert!(navigator.navigate(&mut doc, Direction::Down));
        assert_eq!(doc.active_element(), Some(visible));
    }

    #[test]
    fn focus_blurs_previous_and_reveals_target() {
        let (mut doc, [top_left, top_right, ..]) = grid();
        doc.set_active(Some(top_left));
        doc.clear_events();

        assert!(focus(&mut doc, top_right));
        assert_eq!(
            doc.events(),
            &[
                DocumentEvent::Blurred(top_left),
                DocumentEvent::Focused(top_right)
            ]
        );

        doc.set_focusable(top_left, false);
        assert!(!focus(&mut doc, top_left));
        assert_eq!(doc.active_element(), Some(top_right));
    }

    #[test]
    fn unrelated_candidate_triggers_scroll_then_revert() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let body = doc.body();
        let list = doc.append(body, "div", Rect::new(0.0, 0.0, 300.0, 200.0));
        if let Some(style) = doc.style_mut(list) {
            style.overflow_y = Overflow::Auto;
        }
        doc.set_content_size(list, 300.0, 800.0);
        let current = button(&mut doc, list, 0.0, 0.0);
        let popup = doc.append(list, "div", Rect::new(0.0, 100.0, 300.0, 140.0));
        if let Some(style) = doc.style_mut(popup) {
            style.position = Position::Absolute;
        }
        let action = button(&mut doc, popup, 0.0, 100.0);
        doc.set_active(Some(current));
        doc.clear_events();

        let mut navigator = SpatialNavigator::default();
        assert!(navigator.navigate(&mut doc, Direction::Down));

        assert_eq!(doc.active_element(), Some(action));
        assert_eq!(doc.scroll_offset(list), Some(ScrollOffset::default()));
        let scrolls: Vec<_> = doc
            .events()
            .iter()
            .filter_map(|event| match event {
                DocumentEvent::Scrolled { element, offset, .. } if *element == list => {
                    Some(offset.top)
                }
                _ => None,
            })
            .collect();
        assert_eq!(scrolls, vec![100.0, 0.0]);
    }

    #[test]
    fn in_flow_candidate_does_not_scroll() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let body = doc.body();
        let list = doc.append(body, "div", Rect::new(0.0, 0.0, 300.0, 200.0));
        if let Some(style) = doc.style_mut(list) {
            style.overflow_y = Overflow::Auto;
        }
        doc.set_content_size(list, 300.0, 800.0);
        let current = button(&mut doc, list, 0.0, 0.0);
        let next = button(&mut doc, list, 0.0, 60.0);
        doc.set_active(Some(current));
        doc.clear_events();

        let mut navigator = SpatialNavigator::default();
        assert!(navigator.navigate(&mut doc, Direction::Down));
        assert_eq!(doc.active_element(), Some(next));
        assert!(!doc
            .events()
            .iter()
            .any(|event| matches!(event, DocumentEvent::Scrolled { .. })));
    }

    #[test]
    fn one_navigation_per_throttle_window() {
        let (mut doc, [top_left, top_right, ..]) = grid();
        doc.set_active(Some(top_left));
        let mut navigator = SpatialNavigator::default();
        let start = Instant::now();

        let mut executed = 0;
        let mut result = false;
        for frame in 0..15 {
            let now = start + Duration::from_millis(frame * 16);
            if navigator.request_navigation(&mut doc, Direction::Right, now, &mut result) {
                executed += 1;
            }
        }

        assert_eq!(executed, 1);
        assert!(result);
        assert_eq!(doc.active_element(), Some(top_right));
    }

    #[test]
    fn scroll_requests_have_their_own_window() {
        let (mut doc, [top_left, ..]) = grid();
        let root = doc.document_element();
        doc.set_content_size(root, 800.0, 2000.0);
        doc.set_active(Some(top_left));
        let mut navigator = SpatialNavigator::default();
        let now = Instant::now();

        let mut moved = false;
        assert!(navigator.request_navigation(&mut doc, Direction::Down, now, &mut moved));

        let mut outcome = ScrollOutcome::default();
        assert!(navigator.request_scroll(
            &mut doc,
            ScrollAxis::Vertical,
            0.5,
            ScrollBehavior::Instant,
            now,
            &mut outcome
        ));
        assert_eq!(outcome.container, Some(root));
        assert!(outcome.scrolled);
        assert!(!navigator.request_scroll(
            &mut doc,
            ScrollAxis::Vertical,
            0.5,
            ScrollBehavior::Instant,
            now + Duration::from_millis(100),
            &mut outcome
        ));
    }
}
