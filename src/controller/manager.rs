//! Polling manager with an explicit lifecycle.
//!
//! ```text
//! Idle ──start──► Polling ──suspend──► Suspended
//!  ▲                │  ▲                  │
//!  └─────stop───────┘  └─────resume───────┘
//!  ▲                                      │
//!  └─────────────────stop─────────────────┘
//! ```
//!
//! Frames can only be polled in the `Polling` state. Stopping clears the
//! registry and every layout, the equivalent of unloading the page.

use super::registry::ControllerRegistry;
use super::snapshot::ControllerId;
use crate::config::NavigatorSettings;
use crate::dom::Document;
use crate::mapping::{ControllerLayout, LayoutKind, PollContext, PollReport};
use crate::navigation::SpatialNavigator;
use statum::{machine, state};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

#[state]
#[derive(Debug, Clone)]
pub enum ManagerState {
    Idle,
    Polling,
    Suspended,
}

/// Outcome of one frame across all tracked controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    pub controllers: usize,
    pub report: PollReport,
}

#[machine]
pub struct PollingManager<S: ManagerState> {
    registry: ControllerRegistry,
    navigator: SpatialNavigator,
    layouts: HashMap<ControllerId, Box<dyn ControllerLayout>>,
    settings: NavigatorSettings,
    frames: u64,
}

// Implementation of methods available in all states
impl<S: ManagerState> PollingManager<S> {
    /// Registry shared with the controller source.
    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &NavigatorSettings {
        &self.settings
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Controllers that currently own layout state.
    pub fn active_layouts(&self) -> usize {
        self.layouts.len()
    }

    pub fn layout(&self, id: ControllerId) -> Option<&dyn ControllerLayout> {
        self.layouts.get(&id).map(|layout| layout.as_ref())
    }
}

impl PollingManager<Idle> {
    pub fn create(settings: NavigatorSettings) -> Self {
        info!("Creating PollingManager with settings: {:?}", settings);
        let navigator = SpatialNavigator::new(&settings);
        Self::new(
            ControllerRegistry::new(),
            navigator,
            HashMap::new(),
            settings,
            0,
        )
    }

    pub fn start(self) -> PollingManager<Polling> {
        info!("PollingManager started");
        self.transition()
    }
}

impl PollingManager<Polling> {
    /// Runs one polling pass for every tracked controller.
    pub fn poll_frame(&mut self, document: &mut dyn Document, now: Instant) -> FrameReport {
        self.frames += 1;

        let ids = self.registry.ids();
        self.layouts.retain(|id, _| {
            let keep = ids.contains(id);
            if !keep {
                debug!("Dropping layout state of {}", id);
            }
            keep
        });

        let mut frame = FrameReport {
            controllers: ids.len(),
            report: PollReport::default(),
        };

        for id in ids {
            let layout = match self.layouts.entry(id) {
                std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
                std::collections::hash_map::Entry::Vacant(entry) => {
                    let Some(kind) = self.registry.mapping(id).and_then(LayoutKind::select) else {
                        continue;
                    };
                    info!("Using {} layout for {}", kind, id);
                    entry.insert(kind.create(&self.settings))
                }
            };

            let mut ctx = PollContext {
                id,
                registry: &self.registry,
                document: &mut *document,
                navigator: &mut self.navigator,
                now,
            };
            frame.report |= layout.check_input(&mut ctx);
        }

        frame
    }

    /// Stops scheduling frames, keeping every tracked controller.
    pub fn suspend(self) -> PollingManager<Suspended> {
        info!("PollingManager suspended after {} frames", self.frames);
        self.transition()
    }

    pub fn stop(self) -> PollingManager<Idle> {
        shutdown(self).transition()
    }
}

impl PollingManager<Suspended> {
    pub fn resume(self) -> PollingManager<Polling> {
        info!(
            "PollingManager resumed with {} tracked controllers",
            self.registry.len()
        );
        self.transition()
    }

    pub fn stop(self) -> PollingManager<Idle> {
        shutdown(self).transition()
    }
}

fn shutdown<S: ManagerState>(mut manager: PollingManager<S>) -> PollingManager<S> {
    info!("PollingManager stopping after {} frames", manager.frames);
    manager.registry.clear();
    manager.layouts.clear();
    manager.navigator.reset();
    manager
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ControllerSnapshot, GamepadMapping};
    use crate::dom::MemoryDocument;
    use crate::mapping::XboxButton;

    #[test]
    fn layouts_follow_the_registry() {
        let mut manager = PollingManager::create(NavigatorSettings::default()).start();
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let now = Instant::now();

        let subscription = manager
            .registry()
            .connect(ControllerId(0), GamepadMapping::Standard)
            .expect("tracked");
        let frame = manager.poll_frame(&mut doc, now);
        assert_eq!(frame.controllers, 1);
        assert_eq!(manager.active_layouts(), 1);
        assert_eq!(
            manager.layout(ControllerId(0)).map(|layout| layout.kind()),
            Some(LayoutKind::XboxStandard)
        );

        subscription.release();
        let frame = manager.poll_frame(&mut doc, now);
        assert_eq!(frame.controllers, 0);
        assert_eq!(manager.active_layouts(), 0);
        assert_eq!(manager.frames(), 2);
    }

    #[test]
    fn suspend_keeps_controllers_and_stop_forgets_them() {
        let manager = PollingManager::create(NavigatorSettings::default()).start();
        let registry = manager.registry().clone();
        let _subscription = registry
            .connect(ControllerId(1), GamepadMapping::Standard)
            .expect("tracked");

        let suspended = manager.suspend();
        assert!(suspended.registry().is_tracked(ControllerId(1)));

        let mut polling = suspended.resume();
        let mut doc = MemoryDocument::new(800.0, 600.0);
        registry
            .update(
                ControllerId(1),
                ControllerSnapshot::neutral().with_pressed(XboxButton::B.index()),
            )
            .expect("tracked");
        polling.poll_frame(&mut doc, Instant::now());
        assert_eq!(doc.events().len(), 1);

        let idle = polling.stop();
        assert!(registry.is_empty());
        assert_eq!(idle.active_layouts(), 0);
    }
}
