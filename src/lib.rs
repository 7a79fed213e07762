//! Gamepad-driven spatial navigation for laid-out documents.
//!
//! ```text
//! controller ──► mapping ──► navigation ──► dom
//! (snapshots)    (layouts)   (focus/scroll)  (Document trait)
//! ```
//!
//! [`install`] guards against setting the navigation up twice in one process.

pub mod config;
pub mod controller;
pub mod dom;
pub mod mapping;
pub mod navigation;

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

pub use config::{ConfigError, NavigatorSettings};
pub use controller::{ControllerError, ControllerRegistry, PollingManager};
pub use dom::{Document, MemoryDocument};
pub use mapping::{ControllerLayout, XboxLayout};
pub use navigation::{Direction, SpatialNavigator};

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Marks the process as initialized. Returns `true` only for the first call.
pub fn install() -> bool {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        info!("Already initialized.");
        false
    } else {
        info!("Initialized.");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_succeeds_once() {
        assert!(install());
        assert!(!install());
        assert!(!install());
    }
}
