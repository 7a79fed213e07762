//! Edge detection over level-sampled buttons.

use std::collections::HashSet;

/// Transition of a button between two polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Rising,
    Falling,
}

/// Set of button indices currently considered held.
///
/// A button enters the set on the first poll that reads it pressed and
/// leaves it on the first poll that reads it released, so each transition
/// reports exactly one edge no matter how long the button stays in a state.
#[derive(Debug, Clone, Default)]
pub struct ButtonEdgeState {
    held: HashSet<usize>,
}

impl ButtonEdgeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one reading and returns the edge it produces, if any.
    pub fn update(&mut self, index: usize, pressed: bool) -> Option<Edge> {
        match (pressed, self.held.contains(&index)) {
            (true, false) => {
                self.held.insert(index);
                Some(Edge::Rising)
            }
            (false, true) => {
                self.held.remove(&index);
                Some(Edge::Falling)
            }
            _ => None,
        }
    }

    pub fn is_held(&self, index: usize) -> bool {
        self.held.contains(&index)
    }
}
