//! Application layer of the posting side.

pub mod post_event;
