//! Operating-system settings and live input state.
//!
//! The engine asks the OS for a handful of values while it runs: the
//! double-click time (read on every button press so changes apply
//! immediately), the wheel scroll setting, and whether a given key or button
//! is currently held. [`SystemProperties`] is the seam for those queries.
//! The remaining methods describe keyboard repeat and pointer acceleration
//! settings; platforms that cannot report them return `None`.

use std::collections::HashSet;

/// Wheel setting meaning "scroll one page per notch".
pub const WHEEL_PAGESCROLL: u32 = u32::MAX;

/// Read access to OS input settings and live key state.
pub trait SystemProperties: Send + Sync {
    /// Maximum interval, in milliseconds, between presses of a multi-click.
    fn multi_click_time(&self) -> u64;

    /// Lines scrolled per wheel notch, or [`WHEEL_PAGESCROLL`].
    fn wheel_scroll_lines(&self) -> u32;

    /// Returns `true` if the key or button with this virtual-key code is
    /// currently held down.
    fn is_key_down(&self, virtual_key: u16) -> bool;

    /// Returns `true` if the lock key with this virtual-key code is switched
    /// on. Platforms without toggle state report every lock as off.
    fn is_key_toggled(&self, _virtual_key: u16) -> bool {
        false
    }

    /// Keyboard auto-repeat rate setting.
    fn auto_repeat_rate(&self) -> Option<i64> {
        None
    }

    /// Keyboard auto-repeat delay setting.
    fn auto_repeat_delay(&self) -> Option<i64> {
        None
    }

    fn pointer_acceleration_multiplier(&self) -> Option<i64> {
        None
    }

    fn pointer_acceleration_threshold(&self) -> Option<i64> {
        None
    }

    fn pointer_sensitivity(&self) -> Option<i64> {
        None
    }
}

/// In-memory [`SystemProperties`] with fixed values.
///
/// Used by tests and on platforms without a native settings adapter.
#[derive(Debug, Clone)]
pub struct FixedProperties {
    pub multi_click_time: u64,
    pub wheel_scroll_lines: u32,
    pub keys_down: HashSet<u16>,
    pub keys_toggled: HashSet<u16>,
    pub auto_repeat_rate: Option<i64>,
    pub auto_repeat_delay: Option<i64>,
}

impl Default for FixedProperties {
    fn default() -> Self {
        Self {
            multi_click_time: 500,
            wheel_scroll_lines: 3,
            keys_down: HashSet::new(),
            keys_toggled: HashSet::new(),
            auto_repeat_rate: None,
            auto_repeat_delay: None,
        }
    }
}

impl FixedProperties {
    pub fn with_multi_click_time(mut self, millis: u64) -> Self {
        self.multi_click_time = millis;
        self
    }

    pub fn with_wheel_scroll_lines(mut self, lines: u32) -> Self {
        self.wheel_scroll_lines = lines;
        self
    }

    pub fn with_keys_down(mut self, keys: &[u16]) -> Self {
        self.keys_down.extend(keys.iter().copied());
        self
    }

    pub fn with_keys_toggled(mut self, keys: &[u16]) -> Self {
        self.keys_toggled.extend(keys.iter().copied());
        self
    }
}

impl SystemProperties for FixedProperties {
    fn multi_click_time(&self) -> u64 {
        self.multi_click_time
    }

    fn wheel_scroll_lines(&self) -> u32 {
        self.wheel_scroll_lines
    }

    fn is_key_down(&self, virtual_key: u16) -> bool {
        self.keys_down.contains(&virtual_key)
    }

    fn is_key_toggled(&self, virtual_key: u16) -> bool {
        self.keys_toggled.contains(&virtual_key)
    }

    fn auto_repeat_rate(&self) -> Option<i64> {
        self.auto_repeat_rate
    }

    fn auto_repeat_delay(&self) -> Option<i64> {
        self.auto_repeat_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_properties_defaults() {
        let properties = FixedProperties::default();

        assert_eq!(properties.multi_click_time(), 500);
        assert_eq!(properties.wheel_scroll_lines(), 3);
        assert!(!properties.is_key_down(0x10));
        assert_eq!(properties.pointer_sensitivity(), None);
    }

    #[test]
    fn test_fixed_properties_builders() {
        let properties = FixedProperties::default()
            .with_multi_click_time(250)
            .with_wheel_scroll_lines(WHEEL_PAGESCROLL)
            .with_keys_down(&[0xA0, 0x14]);

        assert_eq!(properties.multi_click_time(), 250);
        assert_eq!(properties.wheel_scroll_lines(), WHEEL_PAGESCROLL);
        assert!(properties.is_key_down(0xA0));
        assert!(properties.is_key_down(0x14));
        assert!(!properties.is_key_down(0xA1));
    }

    #[test]
    fn test_toggled_keys_are_independent_of_held_keys() {
        let properties = FixedProperties::default().with_keys_toggled(&[0x14]);

        assert!(properties.is_key_toggled(0x14));
        assert!(!properties.is_key_down(0x14));
        assert!(!properties.is_key_toggled(0x90));
    }
}
