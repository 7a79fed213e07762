//! Standard Xbox-style layout
//!
//! Per frame, in this order:
//!
//! 1. left stick and d-pad request navigation, right stick requests scrolling
//! 2. A, B and the triggers synthesize key events (plus the d-pad while a
//!    slider is armed)
//! 3. Menu emulates a right click, View + LT closes the page
//! 4. a successful navigation clears the modal context
//! 5. bumpers cycle tabs, or walk history when the opposite trigger is held
//!
//! | Button | Key / action |
//! |---|---|
//! | A | `Enter`, activates links |
//! | B | `Escape`, leaves slider mode |
//! | LT / RT | `Shift` / `Control` |
//! | D-pad | navigation, arrow keys while a slider is armed |
//! | Menu | context menu |
//! | View + LT | close page |
//! | LB / RB | previous / next tab, history back / forward with RT / LT held |

use super::{ControllerLayout, LayoutKind, ModalContext, PollContext, PollReport};
use crate::config::NavigatorSettings;
use crate::controller::{ButtonEdgeState, ControllerSnapshot, Edge};
use crate::dom::{Document, HostCommand, Key, PointerButtons, ScrollBehavior, SyntheticEvent};
use crate::navigation::discovery::{is_slider, selected_tab, tab_items, tab_list_of};
use crate::navigation::{Direction, ScrollAxis, ScrollOutcome};
use tracing::{debug, info, warn};

/// Button indices of the standard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XboxButton {
    A = 0,
    B = 1,
    X = 2,
    Y = 3,
    LeftBumper = 4,
    RightBumper = 5,
    LeftTrigger = 6,
    RightTrigger = 7,
    View = 8,
    Menu = 9,
    LeftThumbStick = 10,
    RightThumbStick = 11,
    DpadUp = 12,
    DpadDown = 13,
    DpadLeft = 14,
    DpadRight = 15,
    Nexus = 16,
}

impl XboxButton {
    pub fn index(self) -> usize {
        self as usize
    }

    /// Key synthesized for this button, if it maps to one.
    pub fn key(self) -> Option<Key> {
        match self {
            XboxButton::A => Some(Key::Enter),
            XboxButton::B => Some(Key::Escape),
            XboxButton::LeftTrigger => Some(Key::Shift),
            XboxButton::RightTrigger => Some(Key::Control),
            XboxButton::DpadUp => Some(Key::ArrowUp),
            XboxButton::DpadDown => Some(Key::ArrowDown),
            XboxButton::DpadLeft => Some(Key::ArrowLeft),
            XboxButton::DpadRight => Some(Key::ArrowRight),
            _ => None,
        }
    }
}

pub const LEFT_STICK_X: usize = 0;
pub const LEFT_STICK_Y: usize = 1;
pub const RIGHT_STICK_X: usize = 2;
pub const RIGHT_STICK_Y: usize = 3;

const KEY_BUTTONS: [XboxButton; 4] = [
    XboxButton::A,
    XboxButton::B,
    XboxButton::LeftTrigger,
    XboxButton::RightTrigger,
];

const DPAD: [(XboxButton, Direction); 4] = [
    (XboxButton::DpadUp, Direction::Up),
    (XboxButton::DpadDown, Direction::Down),
    (XboxButton::DpadLeft, Direction::Left),
    (XboxButton::DpadRight, Direction::Right),
];

// Slider mode wants arrow keys in this order.
const SLIDER_KEYS: [XboxButton; 4] = [
    XboxButton::DpadLeft,
    XboxButton::DpadRight,
    XboxButton::DpadUp,
    XboxButton::DpadDown,
];

/// Edge tracker and event synthesizer for one standard controller.
#[derive(Debug, Clone)]
pub struct XboxLayout {
    edges: ButtonEdgeState,
    modal: ModalContext,
    navigation_threshold: f64,
    scroll_threshold: f64,
    scroll_behavior: ScrollBehavior,
}

impl XboxLayout {
    pub fn new(settings: &NavigatorSettings) -> Self {
        Self {
            edges: ButtonEdgeState::new(),
            modal: ModalContext::default(),
            navigation_threshold: settings.navigation_stick_threshold,
            scroll_threshold: settings.scroll_stick_threshold,
            scroll_behavior: if settings.smooth_scroll {
                ScrollBehavior::Smooth
            } else {
                ScrollBehavior::Instant
            },
        }
    }

    fn check_navigation(&mut self, ctx: &mut PollContext<'_>) -> bool {
        let Some(snapshot) = ctx.snapshot() else {
            return false;
        };

        let mut requests = Vec::new();
        let x = snapshot.axis(LEFT_STICK_X);
        let y = snapshot.axis(LEFT_STICK_Y);
        if x > self.navigation_threshold {
            requests.push(Direction::Right);
        } else if x < -self.navigation_threshold {
            requests.push(Direction::Left);
        }
        if y > self.navigation_threshold {
            requests.push(Direction::Down);
        } else if y < -self.navigation_threshold {
            requests.push(Direction::Up);
        }

        if !self.modal.slider_armed {
            for (button, direction) in DPAD {
                if snapshot.is_pressed(button.index()) {
                    requests.push(direction);
                }
            }
        }

        let mut result = false;
        for direction in requests {
            if ctx
                .navigator
                .request_navigation(ctx.document, direction, ctx.now, &mut result)
            {
                debug!("{} navigated {}: {}", ctx.id, direction, result);
            }
        }
        result
    }

    fn check_scrolling(&mut self, ctx: &mut PollContext<'_>) -> bool {
        let Some(snapshot) = ctx.snapshot() else {
            return false;
        };

        let mut outcome = ScrollOutcome::default();
        let axes = [
            (ScrollAxis::Horizontal, snapshot.axis(RIGHT_STICK_X)),
            (ScrollAxis::Vertical, snapshot.axis(RIGHT_STICK_Y)),
        ];
        for (axis, speed) in axes {
            if speed.abs() > self.scroll_threshold {
                ctx.navigator.request_scroll(
                    ctx.document,
                    axis,
                    speed,
                    self.scroll_behavior,
                    ctx.now,
                    &mut outcome,
                );
            }
        }
        outcome.scrolled
    }

    fn check_buttons(&mut self, ctx: &mut PollContext<'_>) {
        let Some(snapshot) = ctx.snapshot() else {
            return;
        };

        for button in KEY_BUTTONS {
            self.check_key(ctx, &snapshot, button);
        }
        if self.modal.slider_armed {
            for button in SLIDER_KEYS {
                self.check_key(ctx, &snapshot, button);
            }
        }

        self.check_menu(ctx);
        self.check_view(ctx);
    }

    fn check_key(&mut self, ctx: &mut PollContext<'_>, snapshot: &ControllerSnapshot, button: XboxButton) {
        let Some(key) = button.key() else {
            return;
        };
        let doc = &mut *ctx.document;

        match self.edges.update(button.index(), snapshot.is_pressed(button.index())) {
            Some(Edge::Rising) => {
                let target = doc.event_target();
                if button == XboxButton::A && doc.tag_name(target) == Some("a") {
                    info!("Activating link {}", target);
                    doc.click(target);
                }
                debug!("{:?} down -> {} on {}", button, key, target);
                doc.dispatch(target, SyntheticEvent::KeyDown(key));
            }
            Some(Edge::Falling) => {
                if button == XboxButton::A
                    && doc.active_element().is_some_and(|active| is_slider(&*doc, active))
                {
                    debug!("Slider armed");
                    self.modal.slider_armed = true;
                }
                if self.modal.slider_armed && button == XboxButton::B {
                    self.disarm_slider(doc);
                }
                let target = doc.event_target();
                debug!("{:?} up -> {} on {}", button, key, target);
                doc.dispatch(target, SyntheticEvent::KeyUp(key));
            }
            None => {}
        }
    }

    /// Leaves slider mode, releasing any arrow key that is still down.
    fn disarm_slider(&mut self, doc: &mut dyn Document) {
        debug!("Slider released");
        self.modal.slider_armed = false;
        for button in SLIDER_KEYS {
            let Some(key) = button.key() else {
                continue;
            };
            if self.edges.update(button.index(), false) == Some(Edge::Falling) {
                let target = doc.event_target();
                doc.dispatch(target, SyntheticEvent::KeyUp(key));
            }
        }
    }

    fn check_menu(&mut self, ctx: &mut PollContext<'_>) {
        let Some(snapshot) = ctx.snapshot() else {
            return;
        };
        let index = XboxButton::Menu.index();
        let doc = &mut *ctx.document;

        match self.edges.update(index, snapshot.is_pressed(index)) {
            Some(Edge::Rising) => {
                let target = doc.event_target();
                debug!("Context menu on {}", target);
                doc.dispatch(target, SyntheticEvent::MouseDown(PointerButtons::SECONDARY_HELD));
                doc.dispatch(target, SyntheticEvent::ContextMenu(PointerButtons::SECONDARY_HELD));
            }
            Some(Edge::Falling) => {
                let target = doc.event_target();
                doc.dispatch(target, SyntheticEvent::MouseUp(PointerButtons::SECONDARY_RELEASED));
            }
            None => {}
        }
    }

    fn check_view(&mut self, ctx: &mut PollContext<'_>) {
        let Some(snapshot) = ctx.snapshot() else {
            return;
        };
        let index = XboxButton::View.index();

        if self.edges.update(index, snapshot.is_pressed(index)) == Some(Edge::Falling)
            && self.edges.is_held(XboxButton::LeftTrigger.index())
        {
            info!("{} closing the page", ctx.id);
            ctx.document.perform(HostCommand::ClosePage);
        }
    }

    fn check_bumpers(&mut self, ctx: &mut PollContext<'_>) -> bool {
        let Some(snapshot) = ctx.snapshot() else {
            return false;
        };
        let left = self.check_bumper(ctx, &snapshot, XboxButton::LeftBumper);
        let right = self.check_bumper(ctx, &snapshot, XboxButton::RightBumper);
        left || right
    }

    /// Returns whether a tab list selection changed.
    fn check_bumper(&mut self, ctx: &mut PollContext<'_>, snapshot: &ControllerSnapshot, bumper: XboxButton) -> bool {
        let index = bumper.index();
        if self.edges.update(index, snapshot.is_pressed(index)) != Some(Edge::Falling) {
            return false;
        }

        let (history_modifier, command) = match bumper {
            XboxButton::LeftBumper => (XboxButton::RightTrigger, HostCommand::HistoryBack),
            _ => (XboxButton::LeftTrigger, HostCommand::HistoryForward),
        };
        if self.edges.is_held(history_modifier.index()) {
            info!("{} history {:?}", ctx.id, command);
            ctx.document.perform(command);
            return false;
        }

        self.cycle_tab(ctx, bumper == XboxButton::RightBumper)
    }

    fn cycle_tab(&mut self, ctx: &mut PollContext<'_>, forward: bool) -> bool {
        let doc = &mut *ctx.document;

        if let Some(cached) = self.modal.tab_list {
            if !doc.is_connected(cached) {
                warn!("Cached tab list {} is gone, looking it up again", cached);
                self.modal.tab_list = None;
            }
        }
        let tab_list = match self.modal.tab_list {
            Some(tab_list) => tab_list,
            None => {
                let origin = doc.event_target();
                let Some(found) = tab_list_of(&*doc, origin) else {
                    debug!("No tab list near {}", origin);
                    return false;
                };
                found
            }
        };
        self.modal.tab_list = Some(tab_list);

        let items = tab_items(&*doc, tab_list);
        let Some(last) = items.len().checked_sub(1) else {
            return false;
        };
        let selected = selected_tab(&*doc, &items);
        let next = match (selected, forward) {
            (Some(current), true) => (current + 1).min(last),
            (Some(current), false) => current.saturating_sub(1),
            (None, _) => 0,
        };

        let item = items[next];
        doc.click(item);
        doc.focus(item);
        debug!("Tab {} of {} selected in {}", next, items.len(), tab_list);
        selected != Some(next)
    }
}

impl ControllerLayout for XboxLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::XboxStandard
    }

    fn check_input(&mut self, ctx: &mut PollContext<'_>) -> PollReport {
        let navigated = self.check_navigation(ctx);
        let scrolled = self.check_scrolling(ctx);
        self.check_buttons(ctx);

        if navigated {
            if self.modal.slider_armed {
                self.disarm_slider(&mut *ctx.document);
            }
            self.modal.clear();
        }
        let tab_changed = self.check_bumpers(ctx);

        PollReport {
            navigated,
            scrolled,
            tab_changed,
        }
    }

    fn modal_context(&self) -> ModalContext {
        self.modal
    }
}
