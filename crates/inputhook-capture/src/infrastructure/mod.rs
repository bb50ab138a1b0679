//! Infrastructure layer of the capture side.
//!
//! OS-facing adapters: native hook backends, keyboard layout lookup and
//! system settings.
//!
//! The raw input model ([`input_capture::RawInputEvent`]) lives here because
//! it is what backends produce; the `application` layer consumes it but
//! reaches the backends themselves only through traits.

pub mod input_capture;
pub mod keyboard_layout;
pub mod system_properties;
