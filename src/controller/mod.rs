//! Controller subsystem
//!
//! 1. [`gilrs_source`] - samples connected gamepads into snapshots
//! 2. [`registry`] - tracks connected controllers and their latest snapshot
//! 3. [`edge_tracker`] - level readings to press/release edges
//! 4. [`manager`] - frame loop driving one layout per tracked controller
//!
//! ```text
//! Gamepad ──► GilrsSource ──► ControllerRegistry ──► PollingManager ──► ControllerLayout
//!             (snapshots)     (connect/disconnect)    (per frame)
//! ```

pub mod edge_tracker;
pub mod gilrs_source;
pub mod manager;
pub mod registry;
pub mod snapshot;

pub use edge_tracker::{ButtonEdgeState, Edge};
pub use gilrs_source::GilrsSource;
pub use manager::{FrameReport, Idle, ManagerState, PollingManager, Polling, Suspended};
pub use registry::{ControllerRegistry, ControllerSubscription};
pub use snapshot::{ButtonReading, ControllerId, ControllerSnapshot, GamepadMapping};

// Controller errors
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("Controller is not tracked: {0}")]
    UnknownController(ControllerId),

    #[error("Failed to initialize controller backend: {0}")]
    SourceInitialization(String),
}
