//! Native [`KeyLookup`] selection.
//!
//! Key code translation always uses the static virtual-key table; on Windows
//! the characters produced by a key come from the active keyboard layout
//! instead of the built-in US table.

use std::sync::Arc;

use inputhook_core::{KeyLookup, WindowsKeyTable};

#[cfg(target_os = "windows")]
pub mod windows;

/// Returns the key lookup service for the current platform.
#[cfg(target_os = "windows")]
pub fn native_key_lookup() -> Arc<dyn KeyLookup> {
    Arc::new(windows::LayoutKeyLookup::new(WindowsKeyTable::new()))
}

/// Returns the key lookup service for the current platform.
#[cfg(not(target_os = "windows"))]
pub fn native_key_lookup() -> Arc<dyn KeyLookup> {
    Arc::new(WindowsKeyTable::new())
}
