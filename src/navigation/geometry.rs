//! Directional distance between element boxes.
//!
//! Distances are measured from the midpoint of the source edge facing the
//! requested direction to the midpoint of the target's opposite edge. A target
//! only counts as reachable when it lies in the half-plane beyond that edge;
//! [`DISTANCE_TOLERANCE`] lets boxes that share an edge (or overlap it by a
//! couple of pixels) still qualify.

use kurbo::{Point, Rect};

/// Slack, in CSS pixels, for treating nearly aligned edges as aligned.
pub const DISTANCE_TOLERANCE: f64 = 2.0;

/// Edge of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Midpoint of `side` of `rect`.
pub fn edge_midpoint(rect: Rect, side: Side) -> Point {
    let center = rect.center();
    match side {
        Side::Top => Point::new(center.x, rect.y0),
        Side::Bottom => Point::new(center.x, rect.y1),
        Side::Left => Point::new(rect.x0, center.y),
        Side::Right => Point::new(rect.x1, center.y),
    }
}

/// Distance from `source`'s `side` edge to `target`'s opposite edge, or
/// `f64::INFINITY` when `target` is not beyond that edge.
pub fn directional_distance(source: Rect, target: Rect, side: Side) -> f64 {
    let from = edge_midpoint(source, side);
    let to = edge_midpoint(target, side.opposite());

    let behind = match side {
        Side::Top => from.y < to.y - DISTANCE_TOLERANCE,
        Side::Bottom => from.y > to.y + DISTANCE_TOLERANCE,
        Side::Left => from.x < to.x - DISTANCE_TOLERANCE,
        Side::Right => from.x > to.x + DISTANCE_TOLERANCE,
    };

    if behind {
        f64::INFINITY
    } else {
        from.distance(to)
    }
}

/// Whether `inner` lies within `outer`, give or take [`DISTANCE_TOLERANCE`].
pub fn rect_contains(inner: Rect, outer: Rect) -> bool {
    inner.y0 >= outer.y0 - DISTANCE_TOLERANCE
        && inner.y1 <= outer.y1 + DISTANCE_TOLERANCE
        && inner.x0 >= outer.x0 - DISTANCE_TOLERANCE
        && inner.x1 <= outer.x1 + DISTANCE_TOLERANCE
}
