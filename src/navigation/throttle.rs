//! Leading-edge throttle for navigation and scroll requests.

use std::time::{Duration, Instant};
use tracing::debug;

/// Lets the first call of every window through and drops the rest.
///
/// Time is passed in by the caller so a frame loop can stamp all requests of
/// one frame with the same instant.
#[derive(Debug, Clone)]
pub struct LeadingThrottle {
    window: Duration,
    last_invoked: Option<Instant>,
}

impl LeadingThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_invoked: None,
        }
    }

    /// Whether a call at `now` may run. Accepting a call opens a new window.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_invoked {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.window {
                debug!(
                    "Throttled: {}ms left in window",
                    (self.window - elapsed).as_millis()
                );
                return false;
            }
        }
        self.last_invoked = Some(now);
        true
    }

    /// Forgets the last invocation so the next call passes immediately.
    pub fn reset(&mut self) {
        self.last_invoked = None;
    }
}
