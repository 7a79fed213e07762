//! Spatial navigation over a live [`Document`](crate::dom::Document)
//!
//! Leaves first:
//!
//! 1. [`geometry`] - directional distance and containment of element boxes
//! 2. [`discovery`] - visible interactive elements, dialog scope, tab lists
//! 3. [`scroll`] - nearest scroll container and directional scrolling
//! 4. [`throttle`] - leading-edge rate limiting of requests
//! 5. [`navigator`] - focus movement tying the above together
//!
//! ```text
//! request ──► LeadingThrottle ──► SpatialNavigator ──► discovery + geometry
//!                                        │
//!                                        └──► scroll (reveal, revert)
//! ```

pub mod discovery;
pub mod geometry;
pub mod navigator;
pub mod scroll;
pub mod throttle;

use std::fmt;

pub use geometry::{directional_distance, rect_contains, Side, DISTANCE_TOLERANCE};
pub use navigator::SpatialNavigator;
pub use scroll::ScrollOutcome;
pub use throttle::LeadingThrottle;

/// Cardinal navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Edge of the reference box distances are measured from.
    pub fn side(self) -> Side {
        match self {
            Direction::Up => Side::Top,
            Direction::Down => Side::Bottom,
            Direction::Left => Side::Left,
            Direction::Right => Side::Right,
        }
    }

    pub fn axis(self) -> ScrollAxis {
        match self {
            Direction::Up | Direction::Down => ScrollAxis::Vertical,
            Direction::Left | Direction::Right => ScrollAxis::Horizontal,
        }
    }

    /// `-1.0` towards the start of the axis, `1.0` towards its end.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Up | Direction::Left => -1.0,
            Direction::Down | Direction::Right => 1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollAxis {
    Vertical,
    Horizontal,
}
