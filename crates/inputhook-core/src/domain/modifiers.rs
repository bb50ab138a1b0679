//! Modifier mask bits and the tracker that maintains them.
//!
//! The mask is a 16-bit set: eight sided keyboard modifiers, five pointer
//! buttons and three lock keys. The bit positions are part of the public
//! event format and never change.
//!
//! The tracker only ever changes the mask on explicit `set` / `unset` calls
//! from the normalizer, plus a full rebuild from live key state
//! ([`ModifierTracker::reinitialize`]) when a hook session starts or
//! restarts.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use super::event::MouseButton;
use crate::keymap::windows_vk::vk;
use crate::properties::SystemProperties;

/// Set of held modifier keys, held pointer buttons and active lock keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierMask(u16);

impl ModifierMask {
    pub const SHIFT_L: Self = Self(1 << 0);
    pub const CTRL_L: Self = Self(1 << 1);
    pub const META_L: Self = Self(1 << 2);
    pub const ALT_L: Self = Self(1 << 3);
    pub const SHIFT_R: Self = Self(1 << 4);
    pub const CTRL_R: Self = Self(1 << 5);
    pub const META_R: Self = Self(1 << 6);
    pub const ALT_R: Self = Self(1 << 7);

    pub const SHIFT: Self = Self(Self::SHIFT_L.0 | Self::SHIFT_R.0);
    pub const CTRL: Self = Self(Self::CTRL_L.0 | Self::CTRL_R.0);
    pub const META: Self = Self(Self::META_L.0 | Self::META_R.0);
    pub const ALT: Self = Self(Self::ALT_L.0 | Self::ALT_R.0);

    pub const BUTTON1: Self = Self(1 << 8);
    pub const BUTTON2: Self = Self(1 << 9);
    pub const BUTTON3: Self = Self(1 << 10);
    pub const BUTTON4: Self = Self(1 << 11);
    pub const BUTTON5: Self = Self(1 << 12);
    pub const BUTTONS: Self = Self(0x1F << 8);

    pub const NUM_LOCK: Self = Self(1 << 13);
    pub const CAPS_LOCK: Self = Self(1 << 14);
    pub const SCROLL_LOCK: Self = Self(1 << 15);
    pub const LOCKS: Self = Self(0x7 << 13);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if any bit of `other` is set in `self`.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn shift(self) -> bool {
        self.intersects(Self::SHIFT)
    }

    pub fn ctrl(self) -> bool {
        self.intersects(Self::CTRL)
    }

    pub fn alt(self) -> bool {
        self.intersects(Self::ALT)
    }

    pub fn meta(self) -> bool {
        self.intersects(Self::META)
    }

    /// Returns `true` if any pointer button is held. Motion with a held
    /// button is a drag.
    pub fn any_button(self) -> bool {
        self.intersects(Self::BUTTONS)
    }

    /// Returns the mask bit of a pointer button. Buttons above 5 have no bit.
    pub fn for_button(button: MouseButton) -> Option<Self> {
        match button {
            MouseButton::Left => Some(Self::BUTTON1),
            MouseButton::Right => Some(Self::BUTTON2),
            MouseButton::Middle => Some(Self::BUTTON3),
            MouseButton::Button4 => Some(Self::BUTTON4),
            MouseButton::Button5 => Some(Self::BUTTON5),
            MouseButton::Extra(_) => None,
        }
    }
}

impl BitOr for ModifierMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl BitOrAssign for ModifierMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.with(rhs);
    }
}

impl fmt::Debug for ModifierMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModifierMask({:#06X})", self.0)
    }
}

impl fmt::LowerHex for ModifierMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for ModifierMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

/// Every native key or button whose live state feeds the mask, with the bit
/// it controls.
pub const TRACKED_KEYS: &[(u16, ModifierMask)] = &[
    (vk::LSHIFT, ModifierMask::SHIFT_L),
    (vk::RSHIFT, ModifierMask::SHIFT_R),
    (vk::LCONTROL, ModifierMask::CTRL_L),
    (vk::RCONTROL, ModifierMask::CTRL_R),
    (vk::LMENU, ModifierMask::ALT_L),
    (vk::RMENU, ModifierMask::ALT_R),
    (vk::LWIN, ModifierMask::META_L),
    (vk::RWIN, ModifierMask::META_R),
    (vk::LBUTTON, ModifierMask::BUTTON1),
    (vk::RBUTTON, ModifierMask::BUTTON2),
    (vk::MBUTTON, ModifierMask::BUTTON3),
    (vk::XBUTTON1, ModifierMask::BUTTON4),
    (vk::XBUTTON2, ModifierMask::BUTTON5),
    (vk::NUMLOCK, ModifierMask::NUM_LOCK),
    (vk::CAPITAL, ModifierMask::CAPS_LOCK),
    (vk::SCROLL, ModifierMask::SCROLL_LOCK),
];

/// Returns the mask bit toggled by a keyboard virtual key, if any.
///
/// Pointer-button virtual keys are excluded: button bits follow button
/// messages, not keyboard messages.
pub fn modifier_for_virtual_key(virtual_key: u16) -> Option<ModifierMask> {
    match virtual_key {
        vk::LBUTTON | vk::RBUTTON | vk::MBUTTON | vk::XBUTTON1 | vk::XBUTTON2 => None,
        _ => TRACKED_KEYS
            .iter()
            .find(|(key, _)| *key == virtual_key)
            .map(|&(_, bit)| bit),
    }
}

/// Lock keys whose toggle state decides the produced characters.
const LOCK_KEYS: &[(u16, ModifierMask)] = &[
    (vk::NUMLOCK, ModifierMask::NUM_LOCK),
    (vk::CAPITAL, ModifierMask::CAPS_LOCK),
    (vk::SCROLL, ModifierMask::SCROLL_LOCK),
];

/// Maintains the current modifier mask for one hook session.
///
/// The lock bits of the mask follow the held key. Whether each lock is
/// switched on is tracked separately and only feeds character translation.
#[derive(Debug, Default, Clone)]
pub struct ModifierTracker {
    mask: ModifierMask,
    toggled: ModifierMask,
}

impl ModifierTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, bits: ModifierMask) {
        self.mask = self.mask.with(bits);
    }

    /// Records a key press of the key controlling `bits`. The first press of
    /// a lock key flips its toggle; auto-repeat presses do not.
    pub fn press(&mut self, bits: ModifierMask) {
        let flipped = bits.bits() & ModifierMask::LOCKS.bits() & !self.mask.bits();
        self.toggled = ModifierMask::from_bits(self.toggled.bits() ^ flipped);
        self.set(bits);
    }

    pub fn unset(&mut self, bits: ModifierMask) {
        self.mask = self.mask.without(bits);
    }

    pub fn current(&self) -> ModifierMask {
        self.mask
    }

    /// Lock keys currently switched on.
    pub fn toggled_locks(&self) -> ModifierMask {
        self.toggled
    }

    /// The mask handed to character translation: held modifiers, with the
    /// lock bits replaced by the toggle state.
    pub fn translation_mask(&self) -> ModifierMask {
        ModifierMask::from_bits(
            (self.mask.bits() & !ModifierMask::LOCKS.bits()) | self.toggled.bits(),
        )
    }

    /// Rebuilds the mask from the live state of every tracked key and
    /// returns it.
    pub fn reinitialize(&mut self, properties: &dyn SystemProperties) -> ModifierMask {
        self.mask = TRACKED_KEYS
            .iter()
            .filter(|(key, _)| properties.is_key_down(*key))
            .fold(ModifierMask::empty(), |mask, &(_, bit)| mask.with(bit));
        self.toggled = LOCK_KEYS
            .iter()
            .filter(|(key, _)| properties.is_key_toggled(*key))
            .fold(ModifierMask::empty(), |mask, &(_, bit)| mask.with(bit));
        self.mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::FixedProperties;

    // ── Mask bit layout ───────────────────────────────────────────────────────

    #[test]
    fn test_mask_bit_positions_are_fixed() {
        let expected: &[(ModifierMask, u16)] = &[
            (ModifierMask::SHIFT_L, 0x0001),
            (ModifierMask::CTRL_L, 0x0002),
            (ModifierMask::META_L, 0x0004),
            (ModifierMask::ALT_L, 0x0008),
            (ModifierMask::SHIFT_R, 0x0010),
            (ModifierMask::CTRL_R, 0x0020),
            (ModifierMask::META_R, 0x0040),
            (ModifierMask::ALT_R, 0x0080),
            (ModifierMask::BUTTON1, 0x0100),
            (ModifierMask::BUTTON2, 0x0200),
            (ModifierMask::BUTTON3, 0x0400),
            (ModifierMask::BUTTON4, 0x0800),
            (ModifierMask::BUTTON5, 0x1000),
            (ModifierMask::NUM_LOCK, 0x2000),
            (ModifierMask::CAPS_LOCK, 0x4000),
            (ModifierMask::SCROLL_LOCK, 0x8000),
        ];
        for &(mask, bits) in expected {
            assert_eq!(mask.bits(), bits, "{mask:?} must be {bits:#06X}");
        }
    }

    #[test]
    fn test_combined_masks_cover_both_sides() {
        assert_eq!(ModifierMask::SHIFT.bits(), 0x0011);
        assert_eq!(ModifierMask::CTRL.bits(), 0x0022);
        assert_eq!(ModifierMask::META.bits(), 0x0044);
        assert_eq!(ModifierMask::ALT.bits(), 0x0088);
        assert_eq!(ModifierMask::BUTTONS.bits(), 0x1F00);
    }

    #[test]
    fn test_predicates_detect_either_side() {
        assert!(ModifierMask::SHIFT_R.shift());
        assert!(ModifierMask::CTRL_L.ctrl());
        assert!(ModifierMask::ALT_R.alt());
        assert!(ModifierMask::META_L.meta());
        assert!(!ModifierMask::CAPS_LOCK.shift());
        assert!(ModifierMask::BUTTON3.any_button());
        assert!(!ModifierMask::SCROLL_LOCK.any_button());
    }

    #[test]
    fn test_button_bits_only_for_first_five_buttons() {
        assert_eq!(
            ModifierMask::for_button(MouseButton::Left),
            Some(ModifierMask::BUTTON1)
        );
        assert_eq!(
            ModifierMask::for_button(MouseButton::Button5),
            Some(ModifierMask::BUTTON5)
        );
        assert_eq!(ModifierMask::for_button(MouseButton::Extra(6)), None);
    }

    // ── Tracker ───────────────────────────────────────────────────────────────

    #[test]
    fn test_set_then_unset_restores_previous_mask() {
        // Arrange
        let mut tracker = ModifierTracker::new();
        tracker.set(ModifierMask::CTRL_L | ModifierMask::BUTTON1);
        let before = tracker.current();

        // Act
        tracker.set(ModifierMask::SHIFT_R);
        tracker.unset(ModifierMask::SHIFT_R);

        // Assert
        assert_eq!(tracker.current(), before);
    }

    #[test]
    fn test_set_then_unset_clears_bit_even_if_already_set() {
        // Arrange
        let mut tracker = ModifierTracker::new();
        tracker.set(ModifierMask::ALT_L);

        // Act
        tracker.set(ModifierMask::ALT_L);
        tracker.unset(ModifierMask::ALT_L);

        // Assert
        assert!(!tracker.current().contains(ModifierMask::ALT_L));
    }

    #[test]
    fn test_unset_of_clear_bit_is_a_no_op() {
        let mut tracker = ModifierTracker::new();
        tracker.set(ModifierMask::META_R);

        tracker.unset(ModifierMask::CAPS_LOCK);

        assert_eq!(tracker.current(), ModifierMask::META_R);
    }

    #[test]
    fn test_reinitialize_sets_exactly_the_held_keys() {
        // Arrange
        let properties = FixedProperties::default()
            .with_keys_down(&[vk::LSHIFT, vk::RMENU, vk::LBUTTON, vk::CAPITAL]);
        let mut tracker = ModifierTracker::new();
        tracker.set(ModifierMask::CTRL_R | ModifierMask::BUTTON2);

        // Act
        let mask = tracker.reinitialize(&properties);

        // Assert
        assert_eq!(
            mask,
            ModifierMask::SHIFT_L
                | ModifierMask::ALT_R
                | ModifierMask::BUTTON1
                | ModifierMask::CAPS_LOCK
        );
        assert_eq!(tracker.current(), mask);
    }

    #[test]
    fn test_reinitialize_with_nothing_held_clears_mask() {
        let mut tracker = ModifierTracker::new();
        tracker.set(ModifierMask::SHIFT_L);

        let mask = tracker.reinitialize(&FixedProperties::default());

        assert!(mask.is_empty());
    }

    // ── Lock toggles ──────────────────────────────────────────────────────────

    #[test]
    fn test_lock_press_and_release_leaves_lock_switched_on() {
        // Arrange
        let mut tracker = ModifierTracker::new();

        // Act
        tracker.press(ModifierMask::CAPS_LOCK);
        tracker.unset(ModifierMask::CAPS_LOCK);

        // Assert
        assert!(!tracker.current().contains(ModifierMask::CAPS_LOCK));
        assert_eq!(tracker.toggled_locks(), ModifierMask::CAPS_LOCK);
        assert_eq!(tracker.translation_mask(), ModifierMask::CAPS_LOCK);
    }

    #[test]
    fn test_second_lock_tap_switches_it_off() {
        let mut tracker = ModifierTracker::new();

        for _ in 0..2 {
            tracker.press(ModifierMask::NUM_LOCK);
            tracker.unset(ModifierMask::NUM_LOCK);
        }

        assert!(tracker.toggled_locks().is_empty());
    }

    #[test]
    fn test_auto_repeat_does_not_flip_lock() {
        let mut tracker = ModifierTracker::new();

        tracker.press(ModifierMask::CAPS_LOCK);
        tracker.press(ModifierMask::CAPS_LOCK);
        tracker.press(ModifierMask::CAPS_LOCK);

        assert_eq!(tracker.toggled_locks(), ModifierMask::CAPS_LOCK);
    }

    #[test]
    fn test_press_of_plain_modifier_does_not_toggle() {
        let mut tracker = ModifierTracker::new();

        tracker.press(ModifierMask::SHIFT_L);

        assert_eq!(tracker.current(), ModifierMask::SHIFT_L);
        assert!(tracker.toggled_locks().is_empty());
        assert_eq!(tracker.translation_mask(), ModifierMask::SHIFT_L);
    }

    #[test]
    fn test_translation_mask_hides_held_but_off_lock() {
        // Caps Lock held down while switching it off.
        let properties = FixedProperties::default().with_keys_down(&[vk::CAPITAL]);
        let mut tracker = ModifierTracker::new();

        tracker.reinitialize(&properties);

        assert!(tracker.current().contains(ModifierMask::CAPS_LOCK));
        assert!(tracker.translation_mask().is_empty());
    }

    #[test]
    fn test_reinitialize_reads_toggle_state() {
        let properties = FixedProperties::default().with_keys_toggled(&[vk::CAPITAL, vk::NUMLOCK]);
        let mut tracker = ModifierTracker::new();
        tracker.press(ModifierMask::SCROLL_LOCK);

        let mask = tracker.reinitialize(&properties);

        assert!(mask.is_empty(), "nothing is held");
        assert_eq!(
            tracker.toggled_locks(),
            ModifierMask::CAPS_LOCK | ModifierMask::NUM_LOCK
        );
    }

    #[test]
    fn test_keyboard_virtual_keys_map_to_bits() {
        assert_eq!(
            modifier_for_virtual_key(vk::LCONTROL),
            Some(ModifierMask::CTRL_L)
        );
        assert_eq!(
            modifier_for_virtual_key(vk::NUMLOCK),
            Some(ModifierMask::NUM_LOCK)
        );
        assert_eq!(modifier_for_virtual_key(0x41), None);
    }

    #[test]
    fn test_button_virtual_keys_are_not_keyboard_modifiers() {
        assert_eq!(modifier_for_virtual_key(vk::LBUTTON), None);
        assert_eq!(modifier_for_virtual_key(vk::XBUTTON2), None);
    }

    #[test]
    fn test_mask_formats_as_hex() {
        let mask = ModifierMask::SHIFT_L | ModifierMask::BUTTON1;
        assert_eq!(format!("{mask:#X}"), "0x101");
        assert_eq!(format!("{mask:?}"), "ModifierMask(0x0101)");
    }
}
