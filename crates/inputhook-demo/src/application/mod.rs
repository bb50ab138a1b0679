//! Application layer of the demo.

pub mod commands;
pub mod relay;
pub mod report;
