//! TOML-based configuration for the demo.
//!
//! Read from the platform-appropriate config file unless a path is given:
//! - Windows:  `%APPDATA%\inputhook\config.toml`
//! - Linux:    `~/.config/inputhook/config.toml`
//! - macOS:    `~/Library/Application Support/inputhook/config.toml`
//!
//! ```toml
//! [hook]
//! multi_click_time_ms = 400
//! epoch_time = false
//! log_level = "info"
//!
//! [post]
//! extended_keys = ["ArrowUp", "ArrowDown", "Home", "End"]
//! ```
//!
//! Every field has a default, so a missing file, a missing section, or a
//! missing key all fall back to the built-in behaviour.

use std::path::{Path, PathBuf};

use inputhook_capture::{SessionOptions, TimeSource};
use inputhook_post::ExtendedKeyTable;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub hook: HookConfig,
    #[serde(default)]
    pub post: PostConfig,
}

/// Capture-side settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HookConfig {
    /// Fixed multi-click threshold. Absent: follow the system setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_click_time_ms: Option<u64>,
    /// Stamp events with wall-clock epoch milliseconds instead of the native
    /// hook time.
    #[serde(default)]
    pub epoch_time: bool,
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Posting-side settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PostConfig {
    /// Keys posted with the extended-key flag while Shift is held.
    #[serde(default)]
    pub extended_keys: ExtendedKeyTable,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            multi_click_time_ms: None,
            epoch_time: false,
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Session settings derived from the `[hook]` section.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            multi_click_time: self.hook.multi_click_time_ms,
            time_source: if self.hook.epoch_time {
                TimeSource::UnixEpoch
            } else {
                TimeSource::Native
            },
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(platform_config_dir()
        .ok_or(ConfigError::NoPlatformConfigDir)?
        .join("config.toml"))
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Loads `AppConfig` from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory including the `inputhook` leaf.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("inputhook"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("inputhook"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("inputhook")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
