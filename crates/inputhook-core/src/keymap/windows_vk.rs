//! Default key lookup service built on Windows virtual-key codes.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h) and USB HID Usage
//! Tables 1.3.
//!
//! # How the table works
//!
//! `VK_TO_KEY` is a 256-entry constant array indexed by virtual-key code.
//! Position 0x41 holds [`KeyCode::KeyA`] because `VK_A` is 0x41; codes with
//! no keyboard equivalent hold [`KeyCode::Undefined`]. Forward lookups are a
//! single index; the reverse direction scans the array.
//!
//! Low-level hooks report a few keys through a generic code plus the
//! extended flag: `VK_RETURN` with the flag set is the keypad Enter, and the
//! generic `VK_CONTROL` / `VK_MENU` codes are the right-hand keys when the
//! flag is set.
//!
//! Characters are produced for a US layout. Platform adapters that can ask
//! the OS for the active layout should do so instead.

use super::keycode::KeyCode;
use super::KeyLookup;
use crate::domain::modifiers::ModifierMask;

/// Windows virtual-key codes used by the engine.
pub mod vk {
    pub const LBUTTON: u16 = 0x01;
    pub const RBUTTON: u16 = 0x02;
    pub const MBUTTON: u16 = 0x04;
    pub const XBUTTON1: u16 = 0x05;
    pub const XBUTTON2: u16 = 0x06;
    pub const BACK: u16 = 0x08;
    pub const TAB: u16 = 0x09;
    pub const RETURN: u16 = 0x0D;
    pub const SHIFT: u16 = 0x10;
    pub const CONTROL: u16 = 0x11;
    pub const MENU: u16 = 0x12;
    pub const PAUSE: u16 = 0x13;
    pub const CAPITAL: u16 = 0x14;
    pub const ESCAPE: u16 = 0x1B;
    pub const SPACE: u16 = 0x20;
    pub const PRIOR: u16 = 0x21;
    pub const NEXT: u16 = 0x22;
    pub const END: u16 = 0x23;
    pub const HOME: u16 = 0x24;
    pub const LEFT: u16 = 0x25;
    pub const UP: u16 = 0x26;
    pub const RIGHT: u16 = 0x27;
    pub const DOWN: u16 = 0x28;
    pub const SNAPSHOT: u16 = 0x2C;
    pub const INSERT: u16 = 0x2D;
    pub const DELETE: u16 = 0x2E;
    pub const LWIN: u16 = 0x5B;
    pub const RWIN: u16 = 0x5C;
    pub const APPS: u16 = 0x5D;
    pub const NUMPAD0: u16 = 0x60;
    pub const MULTIPLY: u16 = 0x6A;
    pub const ADD: u16 = 0x6B;
    pub const SUBTRACT: u16 = 0x6D;
    pub const DECIMAL: u16 = 0x6E;
    pub const DIVIDE: u16 = 0x6F;
    pub const F1: u16 = 0x70;
    pub const F13: u16 = 0x7C;
    pub const NUMLOCK: u16 = 0x90;
    pub const SCROLL: u16 = 0x91;
    pub const LSHIFT: u16 = 0xA0;
    pub const RSHIFT: u16 = 0xA1;
    pub const LCONTROL: u16 = 0xA2;
    pub const RCONTROL: u16 = 0xA3;
    pub const LMENU: u16 = 0xA4;
    pub const RMENU: u16 = 0xA5;
    pub const OEM_102: u16 = 0xE2;
}

/// US-layout characters of the symbol keys: (virtual key, plain, shifted).
const US_SYMBOLS: &[(u16, char, char)] = &[
    (0x30, '0', ')'),
    (0x31, '1', '!'),
    (0x32, '2', '@'),
    (0x33, '3', '#'),
    (0x34, '4', '$'),
    (0x35, '5', '%'),
    (0x36, '6', '^'),
    (0x37, '7', '&'),
    (0x38, '8', '*'),
    (0x39, '9', '('),
    (0xBA, ';', ':'),
    (0xBB, '=', '+'),
    (0xBC, ',', '<'),
    (0xBD, '-', '_'),
    (0xBE, '.', '>'),
    (0xBF, '/', '?'),
    (0xC0, '`', '~'),
    (0xDB, '[', '{'),
    (0xDC, '\\', '|'),
    (0xDD, ']', '}'),
    (0xDE, '\'', '"'),
    (vk::OEM_102, '\\', '|'),
];

/// Virtual key → canonical key, indexed by virtual-key code.
const VK_TO_KEY: [KeyCode; 256] = {
    use KeyCode::*;
    let mut t = [Undefined; 256];

    // Letters: VK_A..VK_Z are ASCII 'A'..'Z', HID ids are contiguous from 0x04.
    let letters = [
        KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM, KeyN,
        KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
    ];
    let mut i = 0;
    while i < letters.len() {
        t[0x41 + i] = letters[i];
        i += 1;
    }

    t[0x30] = Digit0;
    t[0x31] = Digit1;
    t[0x32] = Digit2;
    t[0x33] = Digit3;
    t[0x34] = Digit4;
    t[0x35] = Digit5;
    t[0x36] = Digit6;
    t[0x37] = Digit7;
    t[0x38] = Digit8;
    t[0x39] = Digit9;

    t[vk::BACK as usize] = Backspace;
    t[vk::TAB as usize] = Tab;
    t[vk::RETURN as usize] = Enter;
    t[vk::PAUSE as usize] = Pause;
    t[vk::CAPITAL as usize] = CapsLock;
    t[vk::ESCAPE as usize] = Escape;
    t[vk::SPACE as usize] = Space;
    t[vk::PRIOR as usize] = PageUp;
    t[vk::NEXT as usize] = PageDown;
    t[vk::END as usize] = End;
    t[vk::HOME as usize] = Home;
    t[vk::LEFT as usize] = ArrowLeft;
    t[vk::UP as usize] = ArrowUp;
    t[vk::RIGHT as usize] = ArrowRight;
    t[vk::DOWN as usize] = ArrowDown;
    t[vk::SNAPSHOT as usize] = PrintScreen;
    t[vk::INSERT as usize] = Insert;
    t[vk::DELETE as usize] = Delete;
    t[vk::APPS as usize] = ContextMenu;
    t[vk::NUMLOCK as usize] = NumLock;
    t[vk::SCROLL as usize] = ScrollLock;

    let numpad = [
        Numpad0, Numpad1, Numpad2, Numpad3, Numpad4, Numpad5, Numpad6, Numpad7, Numpad8, Numpad9,
    ];
    let mut i = 0;
    while i < numpad.len() {
        t[vk::NUMPAD0 as usize + i] = numpad[i];
        i += 1;
    }
    t[vk::MULTIPLY as usize] = NumpadMultiply;
    t[vk::ADD as usize] = NumpadAdd;
    t[vk::SUBTRACT as usize] = NumpadSubtract;
    t[vk::DECIMAL as usize] = NumpadDecimal;
    t[vk::DIVIDE as usize] = NumpadDivide;

    let function = [F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12];
    let mut i = 0;
    while i < function.len() {
        t[vk::F1 as usize + i] = function[i];
        i += 1;
    }
    let high_function = [F13, F14, F15, F16, F17, F18, F19, F20, F21, F22, F23, F24];
    let mut i = 0;
    while i < high_function.len() {
        t[vk::F13 as usize + i] = high_function[i];
        i += 1;
    }

    t[vk::LSHIFT as usize] = ShiftLeft;
    t[vk::RSHIFT as usize] = ShiftRight;
    t[vk::LCONTROL as usize] = ControlLeft;
    t[vk::RCONTROL as usize] = ControlRight;
    t[vk::LMENU as usize] = AltLeft;
    t[vk::RMENU as usize] = AltRight;
    t[vk::LWIN as usize] = MetaLeft;
    t[vk::RWIN as usize] = MetaRight;

    t[0xBA] = Semicolon; // VK_OEM_1
    t[0xBB] = Equal; // VK_OEM_PLUS
    t[0xBC] = Comma; // VK_OEM_COMMA
    t[0xBD] = Minus; // VK_OEM_MINUS
    t[0xBE] = Period; // VK_OEM_PERIOD
    t[0xBF] = Slash; // VK_OEM_2
    t[0xC0] = Backquote; // VK_OEM_3
    t[0xDB] = BracketLeft; // VK_OEM_4
    t[0xDC] = Backslash; // VK_OEM_5
    t[0xDD] = BracketRight; // VK_OEM_6
    t[0xDE] = Quote; // VK_OEM_7
    t[vk::OEM_102 as usize] = IntlBackslash;

    t
};

/// [`KeyLookup`] backed by the built-in virtual-key table.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsKeyTable;

impl WindowsKeyTable {
    pub fn new() -> Self {
        Self
    }
}

impl KeyLookup for WindowsKeyTable {
    fn keycode_to_scancode(&self, virtual_key: u16, extended: bool) -> KeyCode {
        match (virtual_key, extended) {
            (vk::RETURN, true) => KeyCode::NumpadEnter,
            (vk::SHIFT, _) => KeyCode::ShiftLeft,
            (vk::CONTROL, false) => KeyCode::ControlLeft,
            (vk::CONTROL, true) => KeyCode::ControlRight,
            (vk::MENU, false) => KeyCode::AltLeft,
            (vk::MENU, true) => KeyCode::AltRight,
            (code, _) => VK_TO_KEY
                .get(usize::from(code))
                .copied()
                .unwrap_or(KeyCode::Undefined),
        }
    }

    fn scancode_to_keycode(&self, keycode: KeyCode) -> Option<u16> {
        match keycode {
            KeyCode::Undefined => None,
            KeyCode::NumpadEnter => Some(vk::RETURN),
            key => VK_TO_KEY
                .iter()
                .position(|&mapped| mapped == key)
                .map(|index| index as u16),
        }
    }

    fn keycode_to_unicode(&self, virtual_key: u16, mask: ModifierMask) -> Vec<char> {
        // Control and Alt chords produce control codes or nothing; neither is
        // reported as typed text.
        if mask.ctrl() || mask.alt() || mask.meta() {
            return Vec::new();
        }

        let shift = mask.shift();
        let character = match virtual_key {
            0x41..=0x5A => {
                let upper = shift != mask.contains(ModifierMask::CAPS_LOCK);
                let base = char::from(virtual_key as u8);
                Some(if upper { base } else { base.to_ascii_lowercase() })
            }
            vk::SPACE => Some(' '),
            vk::TAB => Some('\t'),
            vk::RETURN => Some('\r'),
            vk::BACK => Some('\u{8}'),
            vk::ESCAPE => Some('\u{1b}'),
            code if (vk::NUMPAD0..vk::NUMPAD0 + 10).contains(&code) => {
                char::from_digit(u32::from(code - vk::NUMPAD0), 10)
            }
            vk::MULTIPLY => Some('*'),
            vk::ADD => Some('+'),
            vk::SUBTRACT => Some('-'),
            vk::DECIMAL => Some('.'),
            vk::DIVIDE => Some('/'),
            code => US_SYMBOLS
                .iter()
                .find(|(key, _, _)| *key == code)
                .map(|&(_, plain, shifted)| if shift { shifted } else { plain }),
        };

        character.into_iter().collect()
    }
}
