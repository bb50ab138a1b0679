//! Application layer of the capture side.
//!
//! - **`dispatch`** – holds the consumer callback and delivers events to it.
//! - **`normalize_input`** – maps one raw native input to zero or more
//!   canonical events, maintaining the modifier mask and click state.
//! - **`session`** – lifecycle of one hook run: enabled/disabled
//!   notifications, restarts, and gating of raw input by state.
//!
//! Nothing here calls the OS; backends in `infrastructure` drive a
//! [`session::HookSession`] from their native callbacks.

pub mod dispatch;
pub mod normalize_input;
pub mod session;
