//! Windows settings queries.
//!
//! Values are read from the OS on every call, so a setting changed in the
//! control panel takes effect without restarting the hook.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::ffi::c_void;

use inputhook_core::SystemProperties;
use tracing::debug;
use windows::Win32::UI::Input::KeyboardAndMouse::{GetDoubleClickTime, GetKeyState};
use windows::Win32::UI::WindowsAndMessaging::{
    SystemParametersInfoW, SPI_GETKEYBOARDDELAY, SPI_GETKEYBOARDSPEED, SPI_GETMOUSE,
    SPI_GETMOUSESPEED, SPI_GETWHEELSCROLLLINES, SYSTEM_PARAMETERS_INFO_ACTION,
    SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
};

/// Fallback when `SPI_GETWHEELSCROLLLINES` fails; matches the Windows default.
const DEFAULT_WHEEL_SCROLL_LINES: u32 = 3;

/// [`SystemProperties`] backed by `SystemParametersInfoW` and `GetKeyState`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsSystemProperties;

/// Reads a `T`-sized value through `SystemParametersInfoW`.
fn query<T: Default>(action: SYSTEM_PARAMETERS_INFO_ACTION) -> Option<T> {
    let mut value = T::default();
    // SAFETY: `value` is a valid, writable buffer of the size the action writes.
    let result = unsafe {
        SystemParametersInfoW(
            action,
            0,
            Some(&mut value as *mut T as *mut c_void),
            SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
        )
    };
    match result {
        Ok(()) => Some(value),
        Err(e) => {
            debug!("SystemParametersInfoW({:#X}) failed: {e}", action.0);
            None
        }
    }
}

impl SystemProperties for WindowsSystemProperties {
    fn multi_click_time(&self) -> u64 {
        // SAFETY: GetDoubleClickTime has no preconditions.
        u64::from(unsafe { GetDoubleClickTime() })
    }

    fn wheel_scroll_lines(&self) -> u32 {
        query::<u32>(SPI_GETWHEELSCROLLLINES).unwrap_or(DEFAULT_WHEEL_SCROLL_LINES)
    }

    fn is_key_down(&self, virtual_key: u16) -> bool {
        // SAFETY: GetKeyState accepts any virtual-key code.
        unsafe { GetKeyState(i32::from(virtual_key)) < 0 }
    }

    fn is_key_toggled(&self, virtual_key: u16) -> bool {
        // SAFETY: GetKeyState accepts any virtual-key code.
        unsafe { GetKeyState(i32::from(virtual_key)) & 1 != 0 }
    }

    fn auto_repeat_rate(&self) -> Option<i64> {
        query::<u32>(SPI_GETKEYBOARDSPEED).map(i64::from)
    }

    fn auto_repeat_delay(&self) -> Option<i64> {
        query::<i32>(SPI_GETKEYBOARDDELAY).map(i64::from)
    }

    fn pointer_acceleration_multiplier(&self) -> Option<i64> {
        // [threshold1, threshold2, acceleration]
        query::<[i32; 3]>(SPI_GETMOUSE).map(|mouse| i64::from(mouse[2]))
    }

    fn pointer_acceleration_threshold(&self) -> Option<i64> {
        query::<[i32; 3]>(SPI_GETMOUSE).map(|mouse| i64::from(mouse[0]))
    }

    fn pointer_sensitivity(&self) -> Option<i64> {
        query::<i32>(SPI_GETMOUSESPEED).map(i64::from)
    }
}
