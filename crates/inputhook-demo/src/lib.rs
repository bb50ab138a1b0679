//! inputhook-demo library crate.
//!
//! The testable parts of the demo binary.
//!
//! ```text
//! [inputhook-demo]
//!   ├── domain/         AppConfig (TOML)
//!   └── application/
//!         ├── report    one-line event formatting
//!         ├── relay     hook thread → tokio channel bridge
//!         └── commands  events for the `post` subcommands
//! ```

pub mod application;
pub mod domain;
