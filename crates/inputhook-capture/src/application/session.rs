//! HookSession: the lifecycle of one hook run.
//!
//! ```text
//!   Idle ──start──▶ Running ──begin_restart──▶ Restarting
//!                    │   ▲                         │
//!                    │   └──────finish_restart─────┘
//!                    └──stop──▶ Stopped
//! ```
//!
//! A session is created by the consumer, given a dispatcher, and then moved
//! into a [`HookBackend`](crate::infrastructure::input_capture::HookBackend)
//! which drives it from the hook thread. `HookEnabled` is the first event a
//! consumer sees and `HookDisabled` the last; raw input outside `Running` is
//! passed through without being normalized.

use std::sync::Arc;

use inputhook_core::{Event, EventKind, KeyLookup, ModifierMask, Propagation, SystemProperties};
use tracing::{debug, info, info_span, trace, warn, Span};
use uuid::Uuid;

use super::normalize_input::{EventNormalizer, SessionOptions};
use crate::infrastructure::input_capture::{HookError, RawInputEvent};

/// Lifecycle state of a [`HookSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, hooks not yet installed.
    Idle,
    Running,
    /// Native hooks are being reinstalled.
    Restarting,
    Stopped,
}

/// State of one hook run: the normalizer, the consumer, and the lifecycle.
pub struct HookSession {
    id: Uuid,
    state: SessionState,
    normalizer: EventNormalizer,
    span: Span,
}

impl HookSession {
    pub fn new(
        lookup: Arc<dyn KeyLookup>,
        properties: Arc<dyn SystemProperties>,
        options: SessionOptions,
    ) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            state: SessionState::Idle,
            normalizer: EventNormalizer::new(lookup, properties, options),
            span: info_span!("hook_session", session = %id),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn modifiers(&self) -> ModifierMask {
        self.normalizer.modifiers()
    }

    /// Registers the consumer callback, replacing any previous one.
    pub fn set_dispatcher<F>(&mut self, handler: F)
    where
        F: FnMut(Event) -> Propagation + Send + 'static,
    {
        self.normalizer.dispatcher_mut().set_dispatcher(handler);
    }

    pub fn clear_dispatcher(&mut self) {
        self.normalizer.dispatcher_mut().clear();
    }

    /// Marks the hooks as installed: rebuilds the modifier mask from live
    /// key state and dispatches `HookEnabled`.
    pub fn start(&mut self, native_time: u64) -> Result<(), HookError> {
        let _entered = self.span.enter();
        if self.state != SessionState::Idle {
            return Err(HookError::AlreadyRunning);
        }

        let mask = self.normalizer.reinitialize_modifiers();
        self.state = SessionState::Running;
        info!(modifiers = %format_args!("{mask:#06X}"), "hook enabled");

        let _ = self
            .normalizer
            .dispatch_lifecycle(EventKind::HookEnabled, native_time);
        Ok(())
    }

    /// Normalizes one raw input and returns whether the native input should
    /// be suppressed.
    pub fn handle(&mut self, raw: &RawInputEvent) -> Propagation {
        let _entered = self.span.enter();
        if self.state != SessionState::Running {
            trace!(state = ?self.state, "raw input outside running session passed through");
            return Propagation::Pass;
        }
        self.normalizer.handle(raw)
    }

    /// The native hooks are about to be reinstalled.
    pub fn begin_restart(&mut self) {
        let _entered = self.span.enter();
        if self.state == SessionState::Running {
            info!("restarting native hooks");
            self.state = SessionState::Restarting;
        }
    }

    /// The native hooks are back. The modifier mask is rebuilt from live key
    /// state; keys that changed while the hooks were down produce no events.
    pub fn finish_restart(&mut self) {
        let _entered = self.span.enter();
        if self.state != SessionState::Restarting {
            return;
        }

        let before = self.normalizer.modifiers();
        let after = self.normalizer.reinitialize_modifiers();
        if before != after {
            // TODO: synthesize press/release events for the keys that changed
            // while the hooks were down.
            warn!(
                before = %format_args!("{before:#06X}"),
                after = %format_args!("{after:#06X}"),
                "modifier state changed across hook restart"
            );
        }
        self.state = SessionState::Running;
        debug!("native hooks restarted");
    }

    /// Marks the hooks as removed and dispatches `HookDisabled`, unless
    /// `HookEnabled` was never dispatched.
    pub fn stop(&mut self, native_time: u64) {
        let _entered = self.span.enter();
        match self.state {
            SessionState::Running | SessionState::Restarting => {
                self.state = SessionState::Stopped;
                let _ = self
                    .normalizer
                    .dispatch_lifecycle(EventKind::HookDisabled, native_time);
                info!("hook disabled");
            }
            SessionState::Idle => self.state = SessionState::Stopped,
            SessionState::Stopped => {}
        }
    }
}

impl std::fmt::Debug for HookSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
