//! Virtual-desktop geometry.
//!
//! Absolute pointer motion is expressed relative to the whole virtual
//! desktop, which can extend left of or above the primary monitor. The
//! posting side needs two facts to normalize a pixel position: the size of
//! the virtual desktop and its most negative monitor edges.
//!
//! | Module    | OS      | API used                                   |
//! |-----------|---------|--------------------------------------------|
//! | `windows` | Windows | `GetSystemMetrics` + `EnumDisplayMonitors` |
//!
//! [`StaticScreenGeometry`] is always compiled so tests on any platform can
//! use it without a physical display.

use inputhook_core::{NegativeOrigin, VirtualScreen};

#[cfg(target_os = "windows")]
pub mod windows;

/// Read access to the current virtual-desktop layout.
///
/// Queried on every posted pointer event, so display changes apply
/// immediately.
pub trait ScreenGeometry: Send + Sync {
    /// Size of the virtual desktop in pixels. Never zero.
    fn virtual_screen(&self) -> VirtualScreen;

    /// The most negative left and top monitor edges, 0 when none.
    fn largest_negative_coordinates(&self) -> NegativeOrigin;
}

/// A [`ScreenGeometry`] with a fixed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticScreenGeometry {
    pub screen: VirtualScreen,
    pub origin: NegativeOrigin,
}

impl StaticScreenGeometry {
    /// A single 1920×1080 monitor at the origin.
    pub fn single_1080p() -> Self {
        Self {
            screen: VirtualScreen {
                width: 1920,
                height: 1080,
            },
            origin: NegativeOrigin::default(),
        }
    }

    /// Two 1920×1080 monitors, the secondary one left of the primary.
    pub fn dual_1080p_left() -> Self {
        Self {
            screen: VirtualScreen {
                width: 3840,
                height: 1080,
            },
            origin: NegativeOrigin {
                left: -1920,
                top: 0,
            },
        }
    }
}

impl ScreenGeometry for StaticScreenGeometry {
    fn virtual_screen(&self) -> VirtualScreen {
        self.screen
    }

    fn largest_negative_coordinates(&self) -> NegativeOrigin {
        self.origin
    }
}

/// Returns the geometry source for the current platform.
#[cfg(target_os = "windows")]
pub fn native_geometry() -> std::sync::Arc<dyn ScreenGeometry> {
    std::sync::Arc::new(windows::WindowsScreenGeometry::new())
}

/// Returns the geometry source for the current platform: a single 1080p
/// monitor where no native query exists.
#[cfg(not(target_os = "windows"))]
pub fn native_geometry() -> std::sync::Arc<dyn ScreenGeometry> {
    std::sync::Arc::new(StaticScreenGeometry::single_1080p())
}
