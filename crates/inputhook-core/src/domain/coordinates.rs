//! Virtual-desktop coordinate normalization.
//!
//! Absolute pointer injection on Windows takes coordinates in a 0–65535
//! space spanning the whole virtual desktop. Monitors left of or above the
//! primary monitor have negative pixel coordinates, so a pixel point is first
//! shifted by the largest negative origin, then scaled.
//!
//! ```text
//!  (-1920, 0)          (0, 0)              (1920, 0)
//!      ┌──────────────────┬──────────────────┐
//!      │   left monitor   │  primary monitor │
//!      └──────────────────┴──────────────────┘
//!  origin = (-1920, 0), virtual screen = 3840 × 1080
//!  pixel (0, 540) → shifted (1920, 540) → normalized (32768, 32768)
//! ```

use serde::{Deserialize, Serialize};

/// Upper bound of the normalized coordinate space.
pub const NORMALIZED_MAX: i32 = 65_536;

/// A point in native pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to the 16-bit coordinates carried by events, clamping
    /// values that do not fit instead of wrapping them.
    pub fn to_event_coordinates(self) -> (i16, i16) {
        (clamp_to_i16(self.x), clamp_to_i16(self.y))
    }
}

fn clamp_to_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Size in pixels of the virtual desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualScreen {
    pub width: u32,
    pub height: u32,
}

/// The most negative monitor edge on each axis (0 when no monitor extends
/// left of or above the primary one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NegativeOrigin {
    pub left: i32,
    pub top: i32,
}

/// A point in the normalized absolute space, each axis in `1..=65536`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCoordinate {
    pub x: i32,
    pub y: i32,
}

/// Maps a pixel point onto the normalized absolute space.
///
/// `screen` must have non-zero dimensions.
pub fn normalize_coordinates(
    point: Point,
    screen: VirtualScreen,
    origin: NegativeOrigin,
) -> NormalizedCoordinate {
    debug_assert!(
        screen.width > 0 && screen.height > 0,
        "virtual screen must have non-zero dimensions"
    );

    NormalizedCoordinate {
        x: normalize_axis(point.x, origin.left, screen.width),
        y: normalize_axis(point.y, origin.top, screen.height),
    }
}

fn normalize_axis(value: i32, origin: i32, size: u32) -> i32 {
    let shifted = (i64::from(value) + i64::from(origin.unsigned_abs())).max(1);
    let size = i64::from(size.max(1));
    // Rounded multiply-then-divide.
    let scaled = (shifted * i64::from(NORMALIZED_MAX) + size / 2) / size;
    scaled.clamp(1, i64::from(NORMALIZED_MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HD: VirtualScreen = VirtualScreen {
        width: 1920,
        height: 1080,
    };

    #[test]
    fn test_centre_of_single_monitor_maps_to_centre() {
        // Arrange
        let point = Point::new(960, 540);

        // Act
        let normalized = normalize_coordinates(point, FULL_HD, NegativeOrigin::default());

        // Assert
        assert_eq!(normalized, NormalizedCoordinate { x: 32768, y: 32768 });
    }

    #[test]
    fn test_origin_maps_to_one_not_zero() {
        let normalized =
            normalize_coordinates(Point::new(0, 0), FULL_HD, NegativeOrigin::default());

        assert_eq!(normalized.x, 34, "0 is treated as 1 before scaling");
        assert!(normalized.x >= 1 && normalized.y >= 1);
    }

    #[test]
    fn test_negative_origin_shifts_points_right() {
        // Arrange
        let screen = VirtualScreen {
            width: 3840,
            height: 1080,
        };
        let origin = NegativeOrigin {
            left: -1920,
            top: 0,
        };

        // Act
        let normalized = normalize_coordinates(Point::new(0, 540), screen, origin);

        // Assert
        assert_eq!(normalized, NormalizedCoordinate { x: 32768, y: 32768 });
    }

    #[test]
    fn test_leftmost_pixel_of_negative_monitor_is_in_range() {
        let screen = VirtualScreen {
            width: 3840,
            height: 2160,
        };
        let origin = NegativeOrigin {
            left: -1920,
            top: -1080,
        };

        let normalized = normalize_coordinates(Point::new(-1920, -1080), screen, origin);

        assert!(normalized.x >= 1);
        assert!(normalized.y >= 1);
    }

    #[test]
    fn test_results_stay_in_range_across_the_screen() {
        for x in (0..1920).step_by(97) {
            for y in (0..1080).step_by(53) {
                let n = normalize_coordinates(Point::new(x, y), FULL_HD, NegativeOrigin::default());
                assert!((1..=NORMALIZED_MAX).contains(&n.x), "x out of range for {x}");
                assert!((1..=NORMALIZED_MAX).contains(&n.y), "y out of range for {y}");
            }
        }
    }

    #[test]
    fn test_scaling_rounds_to_nearest() {
        // 1 * 65536 / 3 = 21845.33 → 21845; 2 * 65536 / 3 = 43690.67 → 43691
        let screen = VirtualScreen {
            width: 3,
            height: 3,
        };
        let n = normalize_coordinates(Point::new(1, 2), screen, NegativeOrigin::default());

        assert_eq!(n, NormalizedCoordinate { x: 21845, y: 43691 });
    }

    #[test]
    fn test_renormalizing_a_normalized_coordinate_is_idempotent() {
        // Arrange
        let normalized_space = VirtualScreen {
            width: NORMALIZED_MAX as u32,
            height: NORMALIZED_MAX as u32,
        };
        let first = normalize_coordinates(Point::new(731, 212), FULL_HD, NegativeOrigin::default());

        // Act
        let again = normalize_coordinates(
            Point::new(first.x, first.y),
            normalized_space,
            NegativeOrigin::default(),
        );
        let third = normalize_coordinates(
            Point::new(again.x, again.y),
            normalized_space,
            NegativeOrigin::default(),
        );

        // Assert
        assert_eq!(again, first);
        assert_eq!(third, again);
    }

    #[test]
    fn test_event_coordinates_clamp_instead_of_wrapping() {
        assert_eq!(Point::new(40_000, -40_000).to_event_coordinates(), (i16::MAX, i16::MIN));
        assert_eq!(Point::new(-5, 7).to_event_coordinates(), (-5, 7));
    }
}
