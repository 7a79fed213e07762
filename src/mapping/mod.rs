//! Controller layouts: turning snapshots into navigation.
//!
//! A [`ControllerLayout`] owns the per-controller input state (held buttons,
//! modal context) and is polled once per frame by the
//! [`PollingManager`](crate::controller::PollingManager). Only the standard
//! Xbox-style layout exists today; the manager picks it through
//! [`LayoutKind::select`].
//!
//! ```text
//! registry ──► ControllerLayout ──► SpatialNavigator ──► Document
//!   (snapshot)   (edges, modal)       (focus, scroll)     (events)
//! ```

pub mod xbox;

pub use xbox::{XboxButton, XboxLayout};

use crate::config::NavigatorSettings;
use crate::controller::{ControllerId, ControllerRegistry, ControllerSnapshot, GamepadMapping};
use crate::dom::{Document, ElementId};
use crate::navigation::SpatialNavigator;
use std::fmt::{self, Display};
use std::ops::BitOrAssign;
use std::time::Instant;

/// Available layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    XboxStandard,
}

impl LayoutKind {
    /// Layout for a controller reporting `mapping`.
    pub fn select(mapping: GamepadMapping) -> Option<LayoutKind> {
        match mapping {
            GamepadMapping::Standard | GamepadMapping::XrStandard => Some(LayoutKind::XboxStandard),
            GamepadMapping::NonStandard => None,
        }
    }

    pub fn create(self, settings: &NavigatorSettings) -> Box<dyn ControllerLayout> {
        match self {
            LayoutKind::XboxStandard => Box::new(XboxLayout::new(settings)),
        }
    }
}

impl Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutKind::XboxStandard => write!(f, "Xbox (standard)"),
        }
    }
}

/// Everything a layout may touch during one poll of one controller.
pub struct PollContext<'a> {
    pub id: ControllerId,
    pub registry: &'a ControllerRegistry,
    pub document: &'a mut dyn Document,
    pub navigator: &'a mut SpatialNavigator,
    pub now: Instant,
}

impl PollContext<'_> {
    /// Latest snapshot, or `None` once the controller is no longer tracked.
    pub fn snapshot(&self) -> Option<ControllerSnapshot> {
        self.registry.snapshot(self.id)
    }
}

/// What a poll pass achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollReport {
    /// A navigation request ran this frame and moved focus.
    pub navigated: bool,
    /// A scroll request ran this frame and shifted a container.
    pub scrolled: bool,
    /// A bumper moved the selection of a tab list.
    pub tab_changed: bool,
}

impl BitOrAssign for PollReport {
    fn bitor_assign(&mut self, other: Self) {
        self.navigated |= other.navigated;
        self.scrolled |= other.scrolled;
        self.tab_changed |= other.tab_changed;
    }
}

/// Transient state of an in-progress tab cycle or slider adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModalContext {
    /// Tab list being cycled with the bumpers.
    pub tab_list: Option<ElementId>,
    /// The d-pad adjusts the focused slider instead of moving focus.
    pub slider_armed: bool,
}

impl ModalContext {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Capability interface of one controller layout.
pub trait ControllerLayout {
    fn kind(&self) -> LayoutKind;

    /// Runs one full polling pass for the controller in `ctx`.
    fn check_input(&mut self, ctx: &mut PollContext<'_>) -> PollReport;

    fn modal_context(&self) -> ModalContext;
}
