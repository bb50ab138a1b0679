//! Mock hook backend for testing.
//!
//! Queued raw events and restart requests are replayed through the session
//! on the thread that calls [`HookBackend::run`], exactly as the native hook
//! thread would deliver them. The verdict for each raw event is recorded so
//! tests can check what would have been suppressed.

use std::sync::{
    mpsc::{self, Receiver, Sender},
    Arc, Mutex,
};

use inputhook_core::Propagation;

use super::{HookBackend, HookError, RawInputEvent, StopSignal};
use crate::application::session::HookSession;

/// Control messages understood by [`MockHookBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSignal {
    Input(RawInputEvent),
    /// Simulates the native hooks being torn down and reinstalled.
    Restart,
    Stop,
}

/// A [`HookBackend`] fed from an in-process channel.
pub struct MockHookBackend {
    sender: Sender<MockSignal>,
    receiver: Receiver<MockSignal>,
    verdicts: Arc<Mutex<Vec<Propagation>>>,
    setup_failure: Option<String>,
    restart_failure: Option<String>,
    start_time: u64,
}

impl MockHookBackend {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            verdicts: Arc::new(Mutex::new(Vec::new())),
            setup_failure: None,
            restart_failure: None,
            start_time: 0,
        }
    }

    /// Makes the next `run` fail as if hook installation was refused.
    pub fn fail_setup(mut self, reason: &str) -> Self {
        self.setup_failure = Some(reason.to_string());
        self
    }

    /// Makes the next restart fail to reinstall the hooks, which ends `run`.
    pub fn fail_restart(mut self, reason: &str) -> Self {
        self.restart_failure = Some(reason.to_string());
        self
    }

    /// Timestamp used for the `HookEnabled` event.
    pub fn with_start_time(mut self, time: u64) -> Self {
        self.start_time = time;
        self
    }

    /// Queues a raw event, as if captured from hardware.
    pub fn inject_event(&self, event: RawInputEvent) {
        // The receiver lives as long as `self`, so sending cannot fail.
        let _ = self.sender.send(MockSignal::Input(event));
    }

    /// Queues a native hook restart.
    pub fn inject_restart(&self) {
        let _ = self.sender.send(MockSignal::Restart);
    }

    /// Returns a cloneable handle that queues events from other threads.
    pub fn injector(&self) -> Sender<MockSignal> {
        self.sender.clone()
    }

    /// Verdicts returned by the session, one per replayed raw event.
    pub fn verdicts(&self) -> Vec<Propagation> {
        self.verdicts.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Default for MockHookBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HookBackend for MockHookBackend {
    fn run(&mut self, mut session: HookSession) -> Result<(), HookError> {
        if let Some(reason) = self.setup_failure.take() {
            return Err(HookError::HookSetupFailed(reason));
        }

        session.start(self.start_time)?;

        let mut last_time = self.start_time;
        let mut outcome = Ok(());
        while let Ok(signal) = self.receiver.recv() {
            match signal {
                MockSignal::Input(raw) => {
                    last_time = raw_time(&raw);
                    let verdict = session.handle(&raw);
                    if let Ok(mut verdicts) = self.verdicts.lock() {
                        verdicts.push(verdict);
                    }
                }
                MockSignal::Restart => {
                    session.begin_restart();
                    if let Some(reason) = self.restart_failure.take() {
                        outcome = Err(HookError::HookSetupFailed(reason));
                        break;
                    }
                    session.finish_restart();
                }
                MockSignal::Stop => break,
            }
        }

        session.stop(last_time);
        outcome
    }

    fn stop_signal(&self) -> Arc<dyn StopSignal> {
        Arc::new(MockStopSignal {
            sender: Mutex::new(self.sender.clone()),
        })
    }
}

struct MockStopSignal {
    sender: Mutex<Sender<MockSignal>>,
}

impl StopSignal for MockStopSignal {
    fn request_stop(&self) -> Result<(), HookError> {
        let sender = self
            .sender
            .lock()
            .map_err(|e| HookError::SignalFailed(e.to_string()))?;
        sender
            .send(MockSignal::Stop)
            .map_err(|e| HookError::SignalFailed(e.to_string()))
    }
}

fn raw_time(raw: &RawInputEvent) -> u64 {
    match *raw {
        RawInputEvent::KeyDown { time_ms, .. }
        | RawInputEvent::KeyUp { time_ms, .. }
        | RawInputEvent::MouseMove { time_ms, .. }
        | RawInputEvent::MouseButtonDown { time_ms, .. }
        | RawInputEvent::MouseButtonUp { time_ms, .. }
        | RawInputEvent::MouseWheel { time_ms, .. }
        | RawInputEvent::MouseWheelH { time_ms, .. }
        | RawInputEvent::Unrecognized { time_ms, .. } => time_ms,
    }
}
