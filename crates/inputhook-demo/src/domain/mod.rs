//! Domain layer of the demo: configuration types.

pub mod config;

pub use config::{AppConfig, ConfigError, HookConfig, PostConfig};
