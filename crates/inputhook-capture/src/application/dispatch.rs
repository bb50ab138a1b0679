//! Dispatch gateway: delivers events to the single registered consumer.
//!
//! The consumer is a boxed closure owned by the session. Registering a new
//! one replaces the old one; there is never more than one. Events raised
//! while nothing is registered are dropped with a warning and the native
//! input passes through.

use inputhook_core::{Event, Propagation};
use tracing::{debug, warn};

/// Consumer callback: receives each event by value and decides whether the
/// underlying native input is suppressed.
pub type EventHandler = Box<dyn FnMut(Event) -> Propagation + Send>;

/// Holds the consumer callback for one hook session.
#[derive(Default)]
pub struct Dispatcher {
    handler: Option<EventHandler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler`, replacing any previous registration.
    pub fn set_dispatcher<F>(&mut self, handler: F)
    where
        F: FnMut(Event) -> Propagation + Send + 'static,
    {
        self.handler = Some(Box::new(handler));
    }

    /// Removes the registration, if any.
    pub fn clear(&mut self) {
        self.handler = None;
    }

    pub fn is_set(&self) -> bool {
        self.handler.is_some()
    }

    /// Delivers `event` to the consumer and returns its verdict.
    pub fn dispatch(&mut self, event: Event) -> Propagation {
        match self.handler.as_mut() {
            Some(handler) => {
                debug!(
                    event_type = ?event.event_type(),
                    time = event.time,
                    mask = %format_args!("{:#06X}", event.mask),
                    "dispatching event"
                );
                handler(event)
            }
            None => {
                warn!(event_type = ?event.event_type(), "no dispatcher registered, event dropped");
                Propagation::Pass
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registered", &self.is_set())
            .finish()
    }
}
