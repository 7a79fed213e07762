//! Native gamepad sampling through gilrs.
//!
//! Connection events register controllers with the [`ControllerRegistry`];
//! every pump then writes a fresh [`ControllerSnapshot`] per tracked pad in
//! the standard button/axis order.

use super::registry::{ControllerRegistry, ControllerSubscription};
use super::snapshot::{ButtonReading, ControllerId, ControllerSnapshot, GamepadMapping};
use super::ControllerError;
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs, MappingSource};
use std::collections::HashMap;
use tracing::{error, info, warn};

/// gilrs buttons in standard layout order.
const STANDARD_BUTTONS: [Button; ControllerSnapshot::STANDARD_BUTTONS] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

pub struct GilrsSource {
    gilrs: Gilrs,
    subscriptions: HashMap<GamepadId, ControllerSubscription>,
}

impl GilrsSource {
    pub fn create() -> Result<Self, ControllerError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(ControllerError::SourceInitialization(e.to_string()));
            }
        };

        Ok(Self {
            gilrs,
            subscriptions: HashMap::new(),
        })
    }

    /// Registers pads that were already connected before the first pump.
    pub fn attach_connected(&mut self, registry: &ControllerRegistry) {
        let connected: Vec<GamepadId> = self.gilrs.gamepads().map(|(id, _)| id).collect();
        if connected.is_empty() {
            warn!("No gamepad connected, waiting for one");
        }
        for id in connected {
            self.attach(id, registry);
        }
    }

    /// Handles pending connection events and refreshes every tracked snapshot.
    pub fn pump(&mut self, registry: &ControllerRegistry) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => self.attach(id, registry),
                EventType::Disconnected => {
                    if let Some(subscription) = self.subscriptions.remove(&id) {
                        subscription.release();
                    }
                }
                _ => {}
            }
        }

        // Forget subscriptions the registry dropped on its own (e.g. after a stop).
        self.subscriptions
            .retain(|_, subscription| registry.is_tracked(subscription.id()));

        for (gamepad_id, subscription) in &self.subscriptions {
            let Some(gamepad) = self.gilrs.connected_gamepad(*gamepad_id) else {
                continue;
            };
            if let Err(e) = registry.update(subscription.id(), snapshot_of(&gamepad)) {
                warn!("Dropping snapshot: {}", e);
            }
        }
    }

    fn attach(&mut self, id: GamepadId, registry: &ControllerRegistry) {
        let Some(gamepad) = self.gilrs.connected_gamepad(id) else {
            return;
        };
        let mapping = mapping_of(&gamepad);
        info!("Gamepad {} ({}) reports {:?}", id, gamepad.name(), mapping);

        if let Some(subscription) = registry.connect(controller_id(id), mapping) {
            self.subscriptions.insert(id, subscription);
        }
    }
}

pub fn controller_id(id: GamepadId) -> ControllerId {
    ControllerId(usize::from(id))
}

fn mapping_of(gamepad: &Gamepad<'_>) -> GamepadMapping {
    match gamepad.mapping_source() {
        MappingSource::None => GamepadMapping::NonStandard,
        _ => GamepadMapping::Standard,
    }
}

/// Samples a pad in standard order. Y axes are flipped so that down is positive.
fn snapshot_of(gamepad: &Gamepad<'_>) -> ControllerSnapshot {
    let buttons = STANDARD_BUTTONS
        .iter()
        .map(|button| {
            let pressed = gamepad.is_pressed(*button);
            let value = gamepad
                .button_data(*button)
                .map(|data| f64::from(data.value()))
                .unwrap_or(if pressed { 1.0 } else { 0.0 });
            ButtonReading { pressed, value }
        })
        .collect();

    let axes = vec![
        f64::from(gamepad.value(Axis::LeftStickX)),
        -f64::from(gamepad.value(Axis::LeftStickY)),
        f64::from(gamepad.value(Axis::RightStickX)),
        -f64::from(gamepad.value(Axis::RightStickY)),
    ];

    ControllerSnapshot::new(buttons, axes)
}
