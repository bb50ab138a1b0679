//! Native hook backends.
//!
//! A backend installs the OS hooks on the calling thread, feeds every native
//! callback through a [`HookSession`], and suppresses the native input when
//! the session answers [`Propagation::Consume`]. It keeps doing so until a
//! [`StopSignal`] obtained beforehand is triggered, possibly from another
//! thread or from inside the consumer callback itself.
//!
//! # Windows-Specific Implementation
//!
//! On Windows the backend installs `WH_KEYBOARD_LL` and `WH_MOUSE_LL` hooks
//! and pumps a message loop. Low-level hook callbacks must return within the
//! system's hook timeout or Windows silently removes the hook, so consumers
//! should keep their callback short.
//!
//! # Testability
//!
//! [`mock::MockHookBackend`] replays queued raw events through a session on
//! the caller's thread.
//!
//! [`Propagation::Consume`]: inputhook_core::Propagation::Consume

use std::sync::Arc;

use inputhook_core::MouseButton;
use tracing::debug;

use crate::application::session::HookSession;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// A native input callback, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInputEvent {
    /// A key went down (including auto-repeat).
    KeyDown {
        /// Windows virtual-key code.
        virtual_key: u16,
        /// Hardware scan code.
        scan_code: u16,
        /// Native hook timestamp in milliseconds.
        time_ms: u64,
        /// Native extended-key flag (right-hand modifiers, keypad Enter, …).
        extended: bool,
    },
    KeyUp {
        virtual_key: u16,
        scan_code: u16,
        time_ms: u64,
        extended: bool,
    },
    /// The pointer moved to an absolute virtual-desktop position.
    MouseMove { x: i32, y: i32, time_ms: u64 },
    MouseButtonDown {
        button: RawMouseButton,
        x: i32,
        y: i32,
        time_ms: u64,
    },
    MouseButtonUp {
        button: RawMouseButton,
        x: i32,
        y: i32,
        time_ms: u64,
    },
    /// Vertical wheel; positive delta is away from the user.
    MouseWheel {
        delta: i16,
        x: i32,
        y: i32,
        time_ms: u64,
    },
    /// Horizontal wheel; positive delta is to the right.
    MouseWheelH {
        delta: i16,
        x: i32,
        y: i32,
        time_ms: u64,
    },
    /// A native message the engine does not translate.
    Unrecognized { message: u32, time_ms: u64 },
}

/// Native button identifier of a [`RawInputEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawMouseButton {
    Left,
    Right,
    Middle,
    /// Extra button with its native 1-based index (`XBUTTON1` = 1).
    X(u16),
}

impl RawMouseButton {
    /// Canonical button: `X(1)` and `X(2)` are buttons 4 and 5, `X(n)` is
    /// button `n + 3`. `X(0)` carries no index and is reported as button 4.
    pub fn to_button(self) -> MouseButton {
        match self {
            RawMouseButton::Left => MouseButton::Left,
            RawMouseButton::Right => MouseButton::Right,
            RawMouseButton::Middle => MouseButton::Middle,
            RawMouseButton::X(0) => {
                debug!("extra mouse button without an index, reported as button 4");
                MouseButton::Button4
            }
            RawMouseButton::X(1) => MouseButton::Button4,
            RawMouseButton::X(2) => MouseButton::Button5,
            RawMouseButton::X(index) => MouseButton::Extra(index.saturating_add(3)),
        }
    }
}

/// Error type for hook installation and lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("failed to install native hook: {0}")]
    HookSetupFailed(String),
    #[error("failed to obtain module handle: {0}")]
    ModuleHandleUnavailable(String),
    #[error("failed to create hook window: {0}")]
    WindowCreationFailed(String),
    #[error("hook session has already been started")]
    AlreadyRunning,
    #[error("failed to signal the hook thread: {0}")]
    SignalFailed(String),
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Cross-thread request to end a running backend.
pub trait StopSignal: Send + Sync {
    /// Asks the backend to remove its hooks and return from `run`. Calling it
    /// before `run` makes `run` return as soon as it has started.
    fn request_stop(&self) -> Result<(), HookError>;
}

/// A native hook mechanism.
pub trait HookBackend: Send {
    /// Installs the hooks on the calling thread and drives `session` until
    /// stopped. Blocks for the whole session.
    ///
    /// `HookEnabled` is dispatched once the hooks are in place and
    /// `HookDisabled` after they are removed; neither is dispatched when
    /// installation fails.
    fn run(&mut self, session: HookSession) -> Result<(), HookError>;

    /// Returns a handle that stops this backend's current or next run.
    fn stop_signal(&self) -> Arc<dyn StopSignal>;
}

/// Returns the hook backend for the current platform.
#[cfg(target_os = "windows")]
pub fn native_backend() -> Result<Box<dyn HookBackend>, HookError> {
    Ok(Box::new(windows::WindowsHookBackend::new()))
}

/// Returns the hook backend for the current platform.
#[cfg(not(target_os = "windows"))]
pub fn native_backend() -> Result<Box<dyn HookBackend>, HookError> {
    Err(HookError::UnsupportedPlatform(
        std::env::consts::OS.to_string(),
    ))
}
