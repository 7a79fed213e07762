//! Per-frame controller readings.

use std::fmt;

/// Stable identifier of a physical controller for as long as it stays connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(pub usize);

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "controller {}", self.0)
    }
}

/// Button layout a controller reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadMapping {
    /// The standard gamepad layout (face buttons, bumpers, triggers, d-pad, two sticks).
    Standard,
    /// Standard layout of XR controllers.
    XrStandard,
    /// Raw device layout without a known mapping.
    NonStandard,
}

impl GamepadMapping {
    pub fn is_standard(self) -> bool {
        matches!(self, GamepadMapping::Standard | GamepadMapping::XrStandard)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ButtonReading {
    pub pressed: bool,
    /// Analog value in `[0, 1]`.
    pub value: f64,
}

impl ButtonReading {
    pub fn pressed() -> Self {
        Self {
            pressed: true,
            value: 1.0,
        }
    }
}

/// Buttons and axes sampled at the same instant.
///
/// Indices stay stable between snapshots of the same controller. Reading
/// past the end yields a released button or a centred axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControllerSnapshot {
    buttons: Vec<ButtonReading>,
    axes: Vec<f64>,
}

impl ControllerSnapshot {
    /// Number of buttons in the standard layout.
    pub const STANDARD_BUTTONS: usize = 17;
    /// Number of axes in the standard layout.
    pub const STANDARD_AXES: usize = 4;

    pub fn new(buttons: Vec<ButtonReading>, axes: Vec<f64>) -> Self {
        Self { buttons, axes }
    }

    /// All standard buttons released and sticks centred.
    pub fn neutral() -> Self {
        Self::new(
            vec![ButtonReading::default(); Self::STANDARD_BUTTONS],
            vec![0.0; Self::STANDARD_AXES],
        )
    }

    pub fn with_pressed(mut self, index: usize) -> Self {
        self.set_button(index, ButtonReading::pressed());
        self
    }

    pub fn with_axis(mut self, index: usize, value: f64) -> Self {
        if self.axes.len() <= index {
            self.axes.resize(index + 1, 0.0);
        }
        self.axes[index] = value.clamp(-1.0, 1.0);
        self
    }

    pub fn set_button(&mut self, index: usize, reading: ButtonReading) {
        if self.buttons.len() <= index {
            self.buttons.resize(index + 1, ButtonReading::default());
        }
        self.buttons[index] = reading;
    }

    pub fn button(&self, index: usize) -> ButtonReading {
        self.buttons.get(index).copied().unwrap_or_default()
    }

    pub fn is_pressed(&self, index: usize) -> bool {
        self.button(index).pressed
    }

    pub fn axis(&self, index: usize) -> f64 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_indices_read_as_neutral() {
        let snapshot = ControllerSnapshot::default();
        assert!(!snapshot.is_pressed(3));
        assert_eq!(snapshot.axis(1), 0.0);
    }

    #[test]
    fn builders_grow_and_clamp() {
        let snapshot = ControllerSnapshot::neutral()
            .with_pressed(20)
            .with_axis(1, -1.7);

        assert!(snapshot.is_pressed(20));
        assert!(!snapshot.is_pressed(0));
        assert_eq!(snapshot.axis(1), -1.0);
    }
}
