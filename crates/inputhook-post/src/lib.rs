//! inputhook-post library entry point.
//!
//! The reverse direction of the hook: canonical [`inputhook_core::Event`]
//! values are turned into native injectable input records and submitted to
//! the OS.
//!
//! - **`application`** – [`EventPoster`], which maps events to records and
//!   submits them through the injection primitive.
//! - **`infrastructure`** – the injection primitive (`SendInput` on Windows,
//!   a recording mock elsewhere) and virtual-desktop geometry.

pub mod application;
pub mod infrastructure;

pub use application::post_event::{EventPoster, ExtendedKeyTable, PostError};
pub use infrastructure::input_injection::{
    native_injector, InjectionError, InputInjector, InputRecord, KeyboardRecord, MouseAction,
    MouseRecord,
};
pub use infrastructure::screen_info::{native_geometry, ScreenGeometry, StaticScreenGeometry};
