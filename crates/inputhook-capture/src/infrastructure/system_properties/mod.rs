//! Native [`SystemProperties`] adapters.

use std::sync::Arc;

use inputhook_core::SystemProperties;

use crate::infrastructure::input_capture::HookError;

#[cfg(target_os = "windows")]
pub mod windows;

/// Returns the settings adapter for the current platform.
#[cfg(target_os = "windows")]
pub fn native_properties() -> Result<Arc<dyn SystemProperties>, HookError> {
    Ok(Arc::new(windows::WindowsSystemProperties))
}

/// Returns the settings adapter for the current platform.
#[cfg(not(target_os = "windows"))]
pub fn native_properties() -> Result<Arc<dyn SystemProperties>, HookError> {
    Err(HookError::UnsupportedPlatform(
        std::env::consts::OS.to_string(),
    ))
}
