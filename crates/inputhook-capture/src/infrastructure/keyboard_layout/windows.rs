//! Layout-aware character lookup through `ToUnicodeEx`.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use inputhook_core::keymap::windows_vk::vk;
use inputhook_core::{KeyCode, KeyLookup, ModifierMask, WindowsKeyTable};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyboardLayout, MapVirtualKeyExW, ToUnicodeEx, MAPVK_VK_TO_VSC,
};

/// Keeps `ToUnicodeEx` from touching the kernel's dead-key state.
const TOUNICODE_NO_STATE_CHANGE: u32 = 0x4;

const KEY_DOWN: u8 = 0x80;
const KEY_TOGGLED: u8 = 0x01;

/// [`KeyLookup`] that maps key codes through a [`WindowsKeyTable`] and asks
/// the foreground keyboard layout for characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutKeyLookup {
    table: WindowsKeyTable,
}

impl LayoutKeyLookup {
    pub fn new(table: WindowsKeyTable) -> Self {
        Self { table }
    }
}

/// Builds the 256-byte key state `ToUnicodeEx` expects from a modifier mask.
///
/// Inside a low-level hook the system key state has not been updated yet for
/// the key being processed, so the mask is the better source.
fn key_state_for(mask: ModifierMask) -> [u8; 256] {
    let mut state = [0u8; 256];
    let mut hold = |virtual_key: u16, held: bool| {
        if held {
            state[usize::from(virtual_key)] |= KEY_DOWN;
        }
    };
    hold(vk::LSHIFT, mask.contains(ModifierMask::SHIFT_L));
    hold(vk::RSHIFT, mask.contains(ModifierMask::SHIFT_R));
    hold(vk::SHIFT, mask.shift());
    hold(vk::LCONTROL, mask.contains(ModifierMask::CTRL_L));
    hold(vk::RCONTROL, mask.contains(ModifierMask::CTRL_R));
    hold(vk::CONTROL, mask.ctrl());
    hold(vk::LMENU, mask.contains(ModifierMask::ALT_L));
    hold(vk::RMENU, mask.contains(ModifierMask::ALT_R));
    hold(vk::MENU, mask.alt());

    if mask.contains(ModifierMask::CAPS_LOCK) {
        state[usize::from(vk::CAPITAL)] |= KEY_TOGGLED;
    }
    if mask.contains(ModifierMask::NUM_LOCK) {
        state[usize::from(vk::NUMLOCK)] |= KEY_TOGGLED;
    }
    state
}

impl KeyLookup for LayoutKeyLookup {
    fn keycode_to_scancode(&self, native: u16, extended: bool) -> KeyCode {
        self.table.keycode_to_scancode(native, extended)
    }

    fn scancode_to_keycode(&self, keycode: KeyCode) -> Option<u16> {
        self.table.scancode_to_keycode(keycode)
    }

    fn keycode_to_unicode(&self, native: u16, mask: ModifierMask) -> Vec<char> {
        // Windows-key chords never type text.
        if mask.meta() {
            return Vec::new();
        }

        let state = key_state_for(mask);
        let mut buffer = [0u16; 8];
        // SAFETY: GetKeyboardLayout(0) reads the calling thread's layout;
        // all buffers are valid for their stated lengths.
        let written = unsafe {
            let layout = GetKeyboardLayout(0);
            let scan_code = MapVirtualKeyExW(u32::from(native), MAPVK_VK_TO_VSC, Some(layout));
            ToUnicodeEx(
                u32::from(native),
                scan_code,
                &state,
                &mut buffer,
                TOUNICODE_NO_STATE_CHANGE,
                Some(layout),
            )
        };

        // Negative: a dead key was stored; zero: no translation.
        if written <= 0 {
            return Vec::new();
        }
        let units = &buffer[..(written as usize).min(buffer.len())];
        char::decode_utf16(units.iter().copied())
            .filter_map(Result::ok)
            .filter(|c| !c.is_control() || matches!(c, '\r' | '\t' | '\u{8}' | '\u{1b}'))
            .collect()
    }
}
