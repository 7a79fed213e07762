//! Live registry of tracked controllers.
//!
//! Connecting a controller hands out a [`ControllerSubscription`]; the
//! controller stays tracked until that handle is released or dropped.
//! Layouts look their controller up here on every check, so a controller
//! that disappears mid-frame turns the remaining checks into no-ops.

use super::snapshot::{ControllerId, ControllerSnapshot, GamepadMapping};
use super::ControllerError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct Tracked {
    mapping: GamepadMapping,
    snapshot: ControllerSnapshot,
    // Identifies the subscription that owns this entry.
    token: u64,
}

#[derive(Debug, Default)]
struct Table {
    next_token: u64,
    tracked: HashMap<ControllerId, Tracked>,
}

type Entries = RefCell<Table>;

/// Shared handle to the set of tracked controllers. Clones see the same set.
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    entries: Rc<Entries>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `id` if it reports a standard mapping and is not tracked yet.
    pub fn connect(&self, id: ControllerId, mapping: GamepadMapping) -> Option<ControllerSubscription> {
        if !mapping.is_standard() {
            warn!("Ignoring {}: non-standard mapping {:?}", id, mapping);
            return None;
        }
        let mut table = self.entries.borrow_mut();
        if table.tracked.contains_key(&id) {
            debug!("{} is already tracked", id);
            return None;
        }
        let token = table.next_token;
        table.next_token += 1;
        table.tracked.insert(
            id,
            Tracked {
                mapping,
                snapshot: ControllerSnapshot::neutral(),
                token,
            },
        );
        info!("{} connected ({:?})", id, mapping);

        Some(ControllerSubscription {
            id,
            token,
            entries: Rc::downgrade(&self.entries),
        })
    }

    /// Replaces the latest snapshot of a tracked controller.
    pub fn update(&self, id: ControllerId, snapshot: ControllerSnapshot) -> Result<(), ControllerError> {
        match self.entries.borrow_mut().tracked.get_mut(&id) {
            Some(tracked) => {
                tracked.snapshot = snapshot;
                Ok(())
            }
            None => Err(ControllerError::UnknownController(id)),
        }
    }

    pub fn snapshot(&self, id: ControllerId) -> Option<ControllerSnapshot> {
        self.entries
            .borrow()
            .tracked
            .get(&id)
            .map(|tracked| tracked.snapshot.clone())
    }

    pub fn mapping(&self, id: ControllerId) -> Option<GamepadMapping> {
        self.entries.borrow().tracked.get(&id).map(|tracked| tracked.mapping)
    }

    pub fn is_tracked(&self, id: ControllerId) -> bool {
        self.entries.borrow().tracked.contains_key(&id)
    }

    /// Tracked ids in ascending order.
    pub fn ids(&self) -> Vec<ControllerId> {
        let mut ids: Vec<_> = self.entries.borrow().tracked.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().tracked.is_empty()
    }

    /// Forgets every controller. Outstanding subscriptions become inert.
    pub fn clear(&self) {
        let mut table = self.entries.borrow_mut();
        if !table.tracked.is_empty() {
            info!("Releasing {} tracked controllers", table.tracked.len());
        }
        table.tracked.clear();
    }
}

/// Keeps a controller tracked while alive.
#[derive(Debug)]
pub struct ControllerSubscription {
    id: ControllerId,
    token: u64,
    entries: Weak<Entries>,
}

impl ControllerSubscription {
    pub fn id(&self) -> ControllerId {
        self.id
    }

    /// Stops tracking the controller (the disconnect notification).
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for ControllerSubscription {
    fn drop(&mut self) {
        let Some(entries) = self.entries.upgrade() else {
            return;
        };
        let mut table = entries.borrow_mut();
        let owned = table
            .tracked
            .get(&self.id)
            .is_some_and(|tracked| tracked.token == self.token);
        if owned {
            table.tracked.remove(&self.id);
            info!("{} disconnected", self.id);
        }
    }
}
