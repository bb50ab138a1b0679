//! The native input injection primitive.
//!
//! [`InputRecord`] is the platform-neutral shape of one injectable input
//! (the fields of a Windows `INPUT` structure, minus the union). An
//! [`InputInjector`] submits records to the OS one at a time.
//!
//! | Module    | OS      | API used                     |
//! |-----------|---------|------------------------------|
//! | `windows` | Windows | `SendInput`, `MapVirtualKeyW` |
//! | `mock`    | any     | in-memory recording          |

use std::sync::Arc;

use thiserror::Error;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// One injectable native input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRecord {
    Keyboard(KeyboardRecord),
    Mouse(MouseRecord),
}

/// A key transition identified by virtual-key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardRecord {
    pub virtual_key: u16,
    pub key_up: bool,
    /// Sets the native extended-key flag.
    pub extended: bool,
}

/// A pointer action.
///
/// `dx`/`dy` are only meaningful for [`MouseAction::Move`], where they are
/// absolute virtual-desktop coordinates in `1..=65536`. `data` carries the
/// extra-button index for `XDown`/`XUp` and the signed wheel delta for
/// `Wheel`/`HWheel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseRecord {
    pub dx: i32,
    pub dy: i32,
    pub data: i32,
    pub action: MouseAction,
}

impl MouseRecord {
    /// Absolute motion to a normalized point.
    pub fn move_to(dx: i32, dy: i32) -> Self {
        Self {
            dx,
            dy,
            data: 0,
            action: MouseAction::Move,
        }
    }

    /// A record with no position.
    pub fn action(action: MouseAction, data: i32) -> Self {
        Self {
            dx: 0,
            dy: 0,
            data,
            action,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Move,
    LeftDown,
    LeftUp,
    RightDown,
    RightUp,
    MiddleDown,
    MiddleUp,
    XDown,
    XUp,
    Wheel,
    HWheel,
}

/// Error type for the injection primitive.
#[derive(Debug, Error)]
pub enum InjectionError {
    /// The OS refused the input; the string carries the native error.
    #[error("input injection rejected by the platform: {0}")]
    Rejected(String),
    #[error("input injection is not supported on {0}")]
    UnsupportedPlatform(String),
}

/// Submits native input records.
pub trait InputInjector: Send + Sync {
    /// Injects one record into the OS input stream.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError::Rejected`] if the OS does not accept it.
    fn submit(&self, record: &InputRecord) -> Result<(), InjectionError>;
}

/// Returns the injector for the current platform.
#[cfg(target_os = "windows")]
pub fn native_injector() -> Result<Arc<dyn InputInjector>, InjectionError> {
    Ok(Arc::new(windows::SendInputInjector::new()))
}

/// Returns the injector for the current platform.
#[cfg(not(target_os = "windows"))]
pub fn native_injector() -> Result<Arc<dyn InputInjector>, InjectionError> {
    Err(InjectionError::UnsupportedPlatform(
        std::env::consts::OS.to_string(),
    ))
}
