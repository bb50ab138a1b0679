//! Infrastructure layer of the posting side.
//!
//! OS-facing adapters: the input injection primitive and screen geometry.

pub mod input_injection;
pub mod screen_info;
