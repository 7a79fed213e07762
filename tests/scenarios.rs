//! End-to-end behavior: registry → polling manager → Xbox layout → navigator → document.

use kurbo::Rect;
use padnav::controller::{
    ControllerId, ControllerSnapshot, ControllerSubscription, GamepadMapping, Polling,
    PollingManager,
};
use padnav::dom::{
    Document, DocumentEvent, ElementId, HostCommand, Key, MemoryDocument, Overflow, Position,
    ScrollOffset, SyntheticEvent,
};
use padnav::mapping::xbox::{LEFT_STICK_X, LEFT_STICK_Y};
use padnav::mapping::XboxButton;
use padnav::navigation::navigator::find_candidate;
use padnav::navigation::Direction;
use padnav::NavigatorSettings;
use proptest::prelude::*;
use std::time::{Duration, Instant};

const PAD: ControllerId = ControllerId(0);
const FRAME: Duration = Duration::from_millis(16);

struct Session {
    manager: PollingManager<Polling>,
    subscription: Option<ControllerSubscription>,
    doc: MemoryDocument,
    now: Instant,
}

impl Session {
    fn new(doc: MemoryDocument) -> Self {
        let manager = PollingManager::create(NavigatorSettings::default()).start();
        let subscription = manager
            .registry()
            .connect(PAD, GamepadMapping::Standard)
            .expect("standard pad is tracked");
        Self {
            manager,
            subscription: Some(subscription),
            doc,
            now: Instant::now(),
        }
    }

    fn frame(&mut self, snapshot: ControllerSnapshot) {
        if self.manager.registry().is_tracked(PAD) {
            self.manager
                .registry()
                .update(PAD, snapshot)
                .expect("pad is tracked");
        }
        self.manager.poll_frame(&mut self.doc, self.now);
        self.now += FRAME;
    }

    fn hold(&mut self, buttons: &[XboxButton], frames: usize) {
        for _ in 0..frames {
            let snapshot = buttons
                .iter()
                .fold(ControllerSnapshot::neutral(), |snapshot, button| {
                    snapshot.with_pressed(button.index())
                });
            self.frame(snapshot);
        }
    }

    fn idle(&mut self, duration: Duration) {
        self.now += duration;
    }

    fn count(&self, wanted: &DocumentEvent) -> usize {
        self.doc.events().iter().filter(|event| *event == wanted).count()
    }
}

fn row_of_buttons(count: usize) -> (MemoryDocument, Vec<ElementId>) {
    let mut doc = MemoryDocument::new(1280.0, 720.0);
    let body = doc.body();
    let buttons = (0..count)
        .map(|i| {
            let x = 40.0 + i as f64 * 160.0;
            doc.append(body, "button", Rect::new(x, 40.0, x + 120.0, 80.0))
        })
        .collect();
    (doc, buttons)
}

#[test]
fn rapid_stick_input_navigates_once_per_window() {
    let (mut doc, buttons) = row_of_buttons(4);
    doc.set_active(Some(buttons[0]));
    let mut session = Session::new(doc);
    let right = ControllerSnapshot::neutral().with_axis(LEFT_STICK_X, 1.0);

    for _ in 0..10 {
        session.frame(right.clone());
    }
    assert_eq!(session.doc.active_element(), Some(buttons[1]));
    assert_eq!(
        session
            .doc
            .events()
            .iter()
            .filter(|event| matches!(event, DocumentEvent::Focused(_)))
            .count(),
        1
    );

    session.idle(Duration::from_millis(250));
    session.frame(right);
    assert_eq!(session.doc.active_element(), Some(buttons[2]));
}

#[test]
fn primary_button_on_link_activates_once_and_sends_enter() {
    let mut doc = MemoryDocument::new(1280.0, 720.0);
    let body = doc.body();
    let link = doc.append(body, "a", Rect::new(40.0, 40.0, 200.0, 60.0));
    doc.set_attribute(link, "href", "/articles");
    doc.set_active(Some(link));
    let mut session = Session::new(doc);

    session.hold(&[XboxButton::A], 12);
    session.hold(&[], 3);

    assert_eq!(session.count(&DocumentEvent::Clicked(link)), 1);
    assert_eq!(
        session.count(&DocumentEvent::Dispatched {
            target: link,
            event: SyntheticEvent::KeyDown(Key::Enter)
        }),
        1
    );
    assert_eq!(
        session.count(&DocumentEvent::Dispatched {
            target: link,
            event: SyntheticEvent::KeyUp(Key::Enter)
        }),
        1
    );
}

#[test]
fn held_buttons_fire_one_down_and_one_up_per_edge() {
    let (mut doc, buttons) = row_of_buttons(1);
    doc.set_active(Some(buttons[0]));
    let mut session = Session::new(doc);

    for _ in 0..3 {
        session.hold(&[XboxButton::B, XboxButton::LeftTrigger], 7);
        session.hold(&[], 5);
    }

    for key in [Key::Escape, Key::Shift] {
        let down = DocumentEvent::Dispatched {
            target: buttons[0],
            event: SyntheticEvent::KeyDown(key),
        };
        let up = DocumentEvent::Dispatched {
            target: buttons[0],
            event: SyntheticEvent::KeyUp(key),
        };
        assert_eq!(session.count(&down), 3, "{key} down");
        assert_eq!(session.count(&up), 3, "{key} up");
    }
}

#[test]
fn unrelated_candidate_scrolls_then_reverts() {
    let mut doc = MemoryDocument::new(1280.0, 720.0);
    let body = doc.body();
    let list = doc.append(body, "div", Rect::new(0.0, 0.0, 400.0, 300.0));
    if let Some(style) = doc.style_mut(list) {
        style.overflow_y = Overflow::Auto;
    }
    doc.set_content_size(list, 400.0, 1200.0);
    let current = doc.append(list, "a", Rect::new(0.0, 0.0, 400.0, 40.0));
    let menu = doc.append(list, "div", Rect::new(0.0, 150.0, 400.0, 190.0));
    if let Some(style) = doc.style_mut(menu) {
        style.position = Position::Absolute;
    }
    let action = doc.append(menu, "button", Rect::new(0.0, 150.0, 120.0, 190.0));
    doc.set_active(Some(current));
    let mut session = Session::new(doc);

    session.frame(ControllerSnapshot::neutral().with_axis(LEFT_STICK_Y, 1.0));

    assert_eq!(session.doc.active_element(), Some(action));
    assert_eq!(session.doc.scroll_offset(list), Some(ScrollOffset::default()));
    let list_scrolls: Vec<f64> = session
        .doc
        .events()
        .iter()
        .filter_map(|event| match event {
            DocumentEvent::Scrolled { element, offset, .. } if *element == list => {
                Some(offset.top)
            }
            _ => None,
        })
        .collect();
    assert_eq!(list_scrolls, vec![150.0, 0.0]);
}

#[test]
fn bootstrap_down_prefers_the_leftmost_of_equal_tops() {
    let mut doc = MemoryDocument::new(1280.0, 720.0);
    let body = doc.body();
    let right = doc.append(body, "button", Rect::new(50.0, 100.0, 150.0, 140.0));
    let left = doc.append(body, "button", Rect::new(10.0, 100.0, 40.0, 140.0));
    let mut session = Session::new(doc);

    session.hold(&[XboxButton::DpadDown], 1);

    assert_eq!(session.doc.active_element(), Some(left));
    assert_ne!(session.doc.active_element(), Some(right));
}

#[test]
fn right_trigger_with_left_bumper_goes_back_without_touching_tabs() {
    let mut doc = MemoryDocument::new(1280.0, 720.0);
    let body = doc.body();
    let tabs = doc.append(body, "div", Rect::new(0.0, 0.0, 600.0, 40.0));
    doc.set_attribute(tabs, "role", "tablist");
    let first = doc.append(tabs, "button", Rect::new(0.0, 0.0, 200.0, 40.0));
    let second = doc.append(tabs, "button", Rect::new(200.0, 0.0, 400.0, 40.0));
    for tab in [first, second] {
        doc.set_attribute(tab, "role", "tab");
    }
    doc.set_attribute(first, "aria-selected", "false");
    doc.set_attribute(second, "aria-selected", "true");
    doc.set_active(Some(second));
    let mut session = Session::new(doc);

    session.hold(&[XboxButton::RightTrigger], 2);
    session.hold(&[XboxButton::RightTrigger, XboxButton::LeftBumper], 3);
    session.hold(&[XboxButton::RightTrigger], 2);
    session.hold(&[], 1);

    assert_eq!(
        session.count(&DocumentEvent::Command(HostCommand::HistoryBack)),
        1
    );
    assert_eq!(session.doc.attribute(second, "aria-selected"), Some("true"));
    assert_eq!(session.doc.attribute(first, "aria-selected"), Some("false"));
    assert!(!session
        .doc
        .events()
        .iter()
        .any(|event| matches!(event, DocumentEvent::Clicked(_))));
}

#[test]
fn view_closes_the_page_only_with_left_trigger_held() {
    let (doc, _) = row_of_buttons(1);
    let mut session = Session::new(doc);
    let close = DocumentEvent::Command(HostCommand::ClosePage);

    session.hold(&[XboxButton::View], 3);
    session.hold(&[], 2);
    assert_eq!(session.count(&close), 0);

    session.hold(&[XboxButton::LeftTrigger], 1);
    session.hold(&[XboxButton::LeftTrigger, XboxButton::View], 3);
    session.hold(&[XboxButton::LeftTrigger], 1);
    assert_eq!(session.count(&close), 1);
}

#[test]
fn successful_navigation_clears_slider_mode() {
    let mut doc = MemoryDocument::new(1280.0, 720.0);
    let body = doc.body();
    let slider = doc.append(body, "input", Rect::new(40.0, 40.0, 240.0, 60.0));
    doc.set_attribute(slider, "type", "range");
    let below = doc.append(body, "button", Rect::new(40.0, 120.0, 160.0, 160.0));
    doc.set_active(Some(slider));
    let mut session = Session::new(doc);

    session.hold(&[XboxButton::A], 1);
    session.hold(&[], 1);
    assert_eq!(
        session
            .manager
            .layout(PAD)
            .map(|layout| layout.modal_context().slider_armed),
        Some(true)
    );

    // The d-pad belongs to the slider now; the stick still navigates.
    session.hold(&[XboxButton::DpadDown], 2);
    assert_eq!(session.doc.active_element(), Some(slider));
    session.hold(&[], 1);

    session.idle(Duration::from_millis(300));
    session.frame(ControllerSnapshot::neutral().with_axis(LEFT_STICK_Y, 1.0));
    assert_eq!(session.doc.active_element(), Some(below));
    assert_eq!(
        session
            .manager
            .layout(PAD)
            .map(|layout| layout.modal_context().slider_armed),
        Some(false)
    );
}

#[test]
fn disconnect_stops_input_and_drops_layout_state() {
    let (mut doc, buttons) = row_of_buttons(2);
    doc.set_active(Some(buttons[0]));
    let mut session = Session::new(doc);

    session.hold(&[XboxButton::B], 1);
    assert_eq!(session.manager.active_layouts(), 1);

    if let Some(subscription) = session.subscription.take() {
        subscription.release();
    }
    session.doc.clear_events();
    session.hold(&[], 3);

    assert!(session.doc.events().is_empty());
    assert_eq!(session.manager.active_layouts(), 0);
}

fn boxes() -> impl Strategy<Value = Vec<(f64, f64, f64, f64)>> {
    prop::collection::vec(
        (0.0..1100.0f64, 0.0..600.0f64, 1.0..150.0f64, 1.0..100.0f64),
        1..12,
    )
}

proptest! {
    #[test]
    fn candidate_is_never_the_current_element(layout in boxes()) {
        let mut doc = MemoryDocument::new(1280.0, 720.0);
        let body = doc.body();
        let elements: Vec<ElementId> = layout
            .iter()
            .map(|(x, y, w, h)| doc.append(body, "button", Rect::new(*x, *y, x + w, y + h)))
            .collect();

        for current in &elements {
            for direction in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
                prop_assert_ne!(find_candidate(&doc, *current, direction), Some(*current));
            }
        }
    }
}
