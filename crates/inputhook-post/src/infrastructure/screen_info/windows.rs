//! Windows virtual-desktop geometry via `GetSystemMetrics` and
//! `EnumDisplayMonitors`.

use inputhook_core::{NegativeOrigin, VirtualScreen};
use tracing::warn;
use windows::core::BOOL;
use windows::Win32::Foundation::{LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{EnumDisplayMonitors, HDC, HMONITOR};
use windows::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN,
};

use super::ScreenGeometry;

/// Windows implementation of [`ScreenGeometry`].
#[derive(Debug, Default)]
pub struct WindowsScreenGeometry;

impl WindowsScreenGeometry {
    pub fn new() -> Self {
        Self
    }
}

impl ScreenGeometry for WindowsScreenGeometry {
    fn virtual_screen(&self) -> VirtualScreen {
        // SAFETY: GetSystemMetrics is always safe to call
        let (width, height) = unsafe {
            (
                GetSystemMetrics(SM_CXVIRTUALSCREEN),
                GetSystemMetrics(SM_CYVIRTUALSCREEN),
            )
        };
        if width <= 0 || height <= 0 {
            warn!(width, height, "virtual screen metrics unavailable");
        }
        VirtualScreen {
            width: width.max(1) as u32,
            height: height.max(1) as u32,
        }
    }

    fn largest_negative_coordinates(&self) -> NegativeOrigin {
        let mut origin = NegativeOrigin::default();

        // SAFETY: `lpfn` is a valid function pointer with the correct signature.
        // `dwData` is a raw pointer to `origin` which outlives this call.
        // The callback is synchronous and called only within `EnumDisplayMonitors`.
        let enumerated = unsafe {
            EnumDisplayMonitors(
                None,
                None,
                Some(monitor_enum_proc),
                LPARAM(&mut origin as *mut NegativeOrigin as isize),
            )
        };
        if !enumerated.as_bool() {
            warn!("EnumDisplayMonitors failed, assuming no negative origin");
        }
        origin
    }
}

/// Win32 monitor enumeration callback.
///
/// # Safety
///
/// Called by Win32 inside `EnumDisplayMonitors`. `lparam` must be a valid
/// pointer to `NegativeOrigin` for the duration of the enumeration call.
unsafe extern "system" fn monitor_enum_proc(
    _hmonitor: HMONITOR,
    _hdc: HDC,
    lprc_monitor: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    let origin = &mut *(lparam.0 as *mut NegativeOrigin);
    if let Some(rect) = lprc_monitor.as_ref() {
        origin.left = origin.left.min(rect.left);
        origin.top = origin.top.min(rect.top);
    }

    BOOL(1) // continue enumeration
}

// ── Tests ─────────────────────────────────────────────────────────────────────
