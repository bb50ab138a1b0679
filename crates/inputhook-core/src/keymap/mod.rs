//! Key code translation.
//!
//! The canonical representation is [`KeyCode`] (USB HID usage ids). Native
//! key identifiers are translated at the capture and posting boundaries
//! through a [`KeyLookup`] service, so the engine never embeds knowledge of a
//! particular keyboard layout.

pub mod keycode;
pub mod windows_vk;

pub use keycode::{KeyCode, UnknownKeyName};
pub use windows_vk::WindowsKeyTable;

use crate::domain::modifiers::ModifierMask;

/// Translation between native key identifiers, canonical key codes and
/// produced characters.
///
/// The method names follow the native hook vocabulary: a native key
/// identifier is looked up by `keycode_to_scancode`, and turned back by
/// `scancode_to_keycode`.
pub trait KeyLookup: Send + Sync {
    /// Canonical key code of a native key. `extended` is the native
    /// extended-key flag. Unknown keys give [`KeyCode::Undefined`].
    fn keycode_to_scancode(&self, native: u16, extended: bool) -> KeyCode;

    /// Native key identifier of a canonical key code, or `None` when the key
    /// cannot be produced on this platform.
    fn scancode_to_keycode(&self, keycode: KeyCode) -> Option<u16>;

    /// Characters produced by pressing `native` with `mask` held. Usually
    /// zero or one character; dead-key sequences can yield more.
    ///
    /// The lock bits of `mask` mean "switched on", not "held".
    fn keycode_to_unicode(&self, native: u16, mask: ModifierMask) -> Vec<char>;
}
