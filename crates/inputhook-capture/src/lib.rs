//! inputhook-capture library entry point.
//!
//! Turns native low-level keyboard and mouse callbacks into canonical
//! [`inputhook_core::Event`] values and hands them to a single registered
//! consumer, whose verdict decides whether the native input is suppressed.
//!
//! - **`application`** – the dispatch gateway, the event normalizer and the
//!   hook session lifecycle. No OS calls.
//! - **`infrastructure`** – hook backends (Windows low-level hooks and a
//!   channel-fed mock), the keyboard layout lookup and the Windows
//!   system-properties adapter.

pub mod application;
pub mod infrastructure;

pub use application::dispatch::{Dispatcher, EventHandler};
pub use application::normalize_input::{EventNormalizer, SessionOptions, TimeSource};
pub use application::session::{HookSession, SessionState};
pub use infrastructure::input_capture::{
    native_backend, HookBackend, HookError, RawInputEvent, RawMouseButton, StopSignal,
};
pub use infrastructure::keyboard_layout::native_key_lookup;
pub use infrastructure::system_properties::native_properties;
