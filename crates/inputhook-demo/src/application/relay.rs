//! Bridge from the blocking hook thread to an async consumer.
//!
//! The hook backend owns its thread for the whole session, so the relay
//! spawns a dedicated OS thread for it and forwards every event into a
//! bounded tokio channel. The verdict is decided synchronously on the hook
//! thread by a [`ConsumePolicy`]; the async side only observes.
//!
//! ```text
//!   hook thread                         tokio runtime
//!   ───────────                         ─────────────
//!   backend.run(session)
//!     └─ dispatcher ──try_send──▶ mpsc::Receiver<Event>
//!          └─ ConsumePolicy::verdict
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::thread::JoinHandle;

use inputhook_capture::{HookBackend, HookError, HookSession, StopSignal};
use inputhook_core::{Event, EventKind, KeyCode, Propagation};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, warn};

/// Error type for the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error("failed to spawn hook thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("hook thread panicked")]
    ThreadPanicked,
}

/// Which key events are suppressed.
#[derive(Debug, Clone, Default)]
pub struct ConsumePolicy {
    keys: HashSet<KeyCode>,
}

impl ConsumePolicy {
    pub fn new(keys: impl IntoIterator<Item = KeyCode>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Consumes presses and releases of the listed keys, passes everything
    /// else.
    pub fn verdict(&self, event: &Event) -> Propagation {
        match event.kind {
            EventKind::KeyPressed(key) | EventKind::KeyReleased(key)
                if self.keys.contains(&key.keycode) =>
            {
                Propagation::Consume
            }
            _ => Propagation::Pass,
        }
    }
}

/// Handle to a hook running on its own thread.
pub struct HookRelay {
    stop: Arc<dyn StopSignal>,
    thread: Option<JoinHandle<Result<(), HookError>>>,
}

impl HookRelay {
    pub fn stop_signal(&self) -> Arc<dyn StopSignal> {
        Arc::clone(&self.stop)
    }

    pub fn stop(&self) -> Result<(), HookError> {
        self.stop.request_stop()
    }

    /// Waits for the hook thread to finish and returns the backend's result.
    pub fn join(mut self) -> Result<(), RelayError> {
        match self.thread.take() {
            Some(handle) => match handle.join() {
                Ok(result) => Ok(result?),
                Err(_) => Err(RelayError::ThreadPanicked),
            },
            None => Ok(()),
        }
    }
}

/// Starts `backend` on a new thread and returns the relay handle together
/// with the receiving end of the event channel.
///
/// A key press of `stop_key` stops the hook from inside the callback. When
/// the channel is full the event is dropped; when the receiver is gone the
/// hook is stopped.
pub fn start_relay(
    mut backend: Box<dyn HookBackend>,
    mut session: HookSession,
    policy: ConsumePolicy,
    stop_key: Option<KeyCode>,
    capacity: usize,
) -> Result<(HookRelay, mpsc::Receiver<Event>), RelayError> {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let stop = backend.stop_signal();
    let callback_stop = Arc::clone(&stop);

    session.set_dispatcher(move |event| {
        if let EventKind::KeyPressed(key) = event.kind {
            if Some(key.keycode) == stop_key {
                debug!(key = %key.keycode, "stop key pressed");
                if let Err(e) = callback_stop.request_stop() {
                    error!("failed to stop hook: {e}");
                }
            }
        }

        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!(event = ?dropped.event_type(), "event channel full, dropping event");
            }
            Err(TrySendError::Closed(_)) => {
                if let Err(e) = callback_stop.request_stop() {
                    error!("failed to stop hook after receiver closed: {e}");
                }
            }
        }

        policy.verdict(&event)
    });

    let thread = std::thread::Builder::new()
        .name("inputhook-hook".to_string())
        .spawn(move || backend.run(session))
        .map_err(RelayError::Spawn)?;

    Ok((
        HookRelay {
            stop,
            thread: Some(thread),
        },
        rx,
    ))
}
