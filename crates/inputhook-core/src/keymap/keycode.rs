//! Canonical key codes.
//!
//! inputhook identifies keys by their USB HID usage id on the
//! Keyboard/Keypad page (0x07). HID ids name physical key positions, so the
//! same code is reported for the key left of `S` on a QWERTY and on an
//! AZERTY keyboard. The character a key produces is reported separately in
//! `KeyTyped` events.
//!
//! Reference: USB HID Usage Tables 1.3, section 10.
//!
//! [`KeyCode::Undefined`] (0x0000) stands for "no canonical code": it is the
//! keycode of every `KeyTyped` event and of keys the lookup table does not
//! know.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// USB HID usage id of a keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum KeyCode {
    Undefined = 0x0000,

    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    BracketLeft = 0x2F,
    BracketRight = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Backquote = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,
    CapsLock = 0x39,

    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    ArrowRight = 0x4F,
    ArrowLeft = 0x50,
    ArrowDown = 0x51,
    ArrowUp = 0x52,

    NumLock = 0x53,
    NumpadDivide = 0x54,
    NumpadMultiply = 0x55,
    NumpadSubtract = 0x56,
    NumpadAdd = 0x57,
    NumpadEnter = 0x58,
    Numpad1 = 0x59,
    Numpad2 = 0x5A,
    Numpad3 = 0x5B,
    Numpad4 = 0x5C,
    Numpad5 = 0x5D,
    Numpad6 = 0x5E,
    Numpad7 = 0x5F,
    Numpad8 = 0x60,
    Numpad9 = 0x61,
    Numpad0 = 0x62,
    NumpadDecimal = 0x63,

    /// The extra key between left Shift and `Z` on ISO keyboards.
    IntlBackslash = 0x64,
    ContextMenu = 0x65,

    F13 = 0x68,
    F14 = 0x69,
    F15 = 0x6A,
    F16 = 0x6B,
    F17 = 0x6C,
    F18 = 0x6D,
    F19 = 0x6E,
    F20 = 0x6F,
    F21 = 0x70,
    F22 = 0x71,
    F23 = 0x72,
    F24 = 0x73,

    ControlLeft = 0xE0,
    ShiftLeft = 0xE1,
    AltLeft = 0xE2,
    MetaLeft = 0xE3,
    ControlRight = 0xE4,
    ShiftRight = 0xE5,
    AltRight = 0xE6,
    MetaRight = 0xE7,
}

impl KeyCode {
    /// Every defined key code, [`KeyCode::Undefined`] excluded.
    pub const ALL: &'static [KeyCode] = {
        use KeyCode::*;
        &[
            KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM, KeyN,
            KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
            Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9, Digit0,
            Enter, Escape, Backspace, Tab, Space, Minus, Equal, BracketLeft, BracketRight,
            Backslash, Semicolon, Quote, Backquote, Comma, Period, Slash, CapsLock,
            F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
            PrintScreen, ScrollLock, Pause, Insert, Home, PageUp, Delete, End, PageDown,
            ArrowRight, ArrowLeft, ArrowDown, ArrowUp,
            NumLock, NumpadDivide, NumpadMultiply, NumpadSubtract, NumpadAdd, NumpadEnter,
            Numpad1, Numpad2, Numpad3, Numpad4, Numpad5, Numpad6, Numpad7, Numpad8, Numpad9,
            Numpad0, NumpadDecimal,
            IntlBackslash, ContextMenu,
            F13, F14, F15, F16, F17, F18, F19, F20, F21, F22, F23, F24,
            ControlLeft, ShiftLeft, AltLeft, MetaLeft, ControlRight, ShiftRight, AltRight,
            MetaRight,
        ]
    };

    /// Looks up a key code by HID usage id; unassigned ids give
    /// [`KeyCode::Undefined`].
    pub fn from_u16(value: u16) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_u16() == value)
            .unwrap_or(KeyCode::Undefined)
    }

    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn is_modifier(self) -> bool {
        (KeyCode::ControlLeft as u16..=KeyCode::MetaRight as u16).contains(&self.as_u16())
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Error returned when parsing a key name that is not a [`KeyCode`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key name: {0}")]
pub struct UnknownKeyName(pub String);

impl FromStr for KeyCode {
    type Err = UnknownKeyName;

    /// Parses a variant name such as `"ArrowUp"` or `"F5"`, ignoring case.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.to_string().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownKeyName(name.to_string()))
    }
}
