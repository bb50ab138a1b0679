//! # inputhook-core
//!
//! Platform-independent core of the inputhook engine: the canonical event
//! model, the state machines that derive modifier masks and click counts from
//! raw input, the coordinate normalizer used when synthesizing pointer motion,
//! and the key code tables.
//!
//! This crate never calls an OS API. Everything the engine needs from the
//! operating system (live key state, multi-click time, key translation) is
//! reached through the traits in [`keymap`] and [`properties`], so every rule
//! in here can be exercised from plain unit tests.
//!
//! # Architecture overview
//!
//! - **`domain`** – The [`Event`] value handed to consumers, the
//!   [`ModifierTracker`] that maintains the modifier mask, the
//!   [`ClickClassifier`] that counts multi-clicks, and
//!   [`normalize_coordinates`] for absolute pointer synthesis.
//!
//! - **`keymap`** – [`KeyCode`] (USB HID usage ids, the canonical key
//!   representation), the [`KeyLookup`] service trait, and the default
//!   Windows virtual-key table.
//!
//! - **`properties`** – The [`SystemProperties`] trait for OS settings and
//!   live key state.

pub mod domain;
pub mod keymap;
pub mod properties;

pub use domain::clicks::{ClickClassifier, ReleaseOutcome};
pub use domain::coordinates::{
    normalize_coordinates, NegativeOrigin, NormalizedCoordinate, Point, VirtualScreen,
};
pub use domain::event::{
    Event, EventKind, EventType, KeyboardData, MouseButton, MouseData, Propagation, ScrollKind,
    WheelData, WheelDirection,
};
pub use domain::modifiers::{ModifierMask, ModifierTracker};
pub use keymap::keycode::KeyCode;
pub use keymap::windows_vk::WindowsKeyTable;
pub use keymap::KeyLookup;
pub use properties::{FixedProperties, SystemProperties, WHEEL_PAGESCROLL};
