//! Windows input injection via the SendInput API.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use tracing::error;
use windows::Win32::Foundation::GetLastError;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    MapVirtualKeyW, SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT,
    KEYBD_EVENT_FLAGS, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, MAPVK_VK_TO_VSC,
    MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_HWHEEL, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_MOVE, MOUSEEVENTF_RIGHTDOWN,
    MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_VIRTUALDESK, MOUSEEVENTF_WHEEL, MOUSEEVENTF_XDOWN,
    MOUSEEVENTF_XUP, MOUSEINPUT, MOUSE_EVENT_FLAGS, VIRTUAL_KEY,
};

use super::{InjectionError, InputInjector, InputRecord, KeyboardRecord, MouseAction, MouseRecord};

/// Windows implementation of [`InputInjector`] using SendInput.
#[derive(Debug, Default)]
pub struct SendInputInjector;

impl SendInputInjector {
    pub fn new() -> Self {
        Self
    }
}

impl InputInjector for SendInputInjector {
    fn submit(&self, record: &InputRecord) -> Result<(), InjectionError> {
        let input = match record {
            InputRecord::Keyboard(key) => keyboard_input(key),
            InputRecord::Mouse(mouse) => mouse_input(mouse),
        };

        // SAFETY: input is a valid INPUT structure on the stack
        let inserted = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
        if inserted == 0 {
            // SAFETY: GetLastError has no preconditions.
            let code = unsafe { GetLastError() };
            error!("SendInput() failed ({:#X})", code.0);
            return Err(InjectionError::Rejected(format!("SendInput error {:#X}", code.0)));
        }
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn keyboard_input(key: &KeyboardRecord) -> INPUT {
    let mut flags = KEYBD_EVENT_FLAGS(0);
    if key.key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    if key.extended {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }

    // SAFETY: MapVirtualKeyW is a pure table lookup.
    let scan = unsafe { MapVirtualKeyW(u32::from(key.virtual_key), MAPVK_VK_TO_VSC) };

    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(key.virtual_key),
                wScan: scan as u16,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn mouse_flags(action: MouseAction) -> MOUSE_EVENT_FLAGS {
    match action {
        MouseAction::Move => MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_MOVE | MOUSEEVENTF_VIRTUALDESK,
        MouseAction::LeftDown => MOUSEEVENTF_LEFTDOWN,
        MouseAction::LeftUp => MOUSEEVENTF_LEFTUP,
        MouseAction::RightDown => MOUSEEVENTF_RIGHTDOWN,
        MouseAction::RightUp => MOUSEEVENTF_RIGHTUP,
        MouseAction::MiddleDown => MOUSEEVENTF_MIDDLEDOWN,
        MouseAction::MiddleUp => MOUSEEVENTF_MIDDLEUP,
        MouseAction::XDown => MOUSEEVENTF_XDOWN,
        MouseAction::XUp => MOUSEEVENTF_XUP,
        MouseAction::Wheel => MOUSEEVENTF_WHEEL,
        MouseAction::HWheel => MOUSEEVENTF_HWHEEL,
    }
}

fn mouse_input(mouse: &MouseRecord) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: mouse.dx,
                dy: mouse.dy,
                // Wheel deltas are signed; the field is their two's complement.
                mouseData: mouse.data as u32,
                dwFlags: mouse_flags(mouse.action),
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_is_absolute_on_the_virtual_desktop() {
        let flags = mouse_flags(MouseAction::Move);

        assert!(flags.contains(MOUSEEVENTF_ABSOLUTE));
        assert!(flags.contains(MOUSEEVENTF_VIRTUALDESK));
    }

    #[test]
    fn test_negative_wheel_delta_keeps_its_bits() {
        let input = mouse_input(&MouseRecord::action(MouseAction::Wheel, -120));

        // SAFETY: the record was built as a mouse input.
        let data = unsafe { input.Anonymous.mi.mouseData };
        assert_eq!(data as i32, -120);
    }

    #[test]
    fn test_key_up_and_extended_flags() {
        let input = keyboard_input(&KeyboardRecord {
            virtual_key: 0x25,
            key_up: true,
            extended: true,
        });

        // SAFETY: the record was built as a keyboard input.
        let flags = unsafe { input.Anonymous.ki.dwFlags };
        assert!(flags.contains(KEYEVENTF_KEYUP));
        assert!(flags.contains(KEYEVENTF_EXTENDEDKEY));
    }
}
