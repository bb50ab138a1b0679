//! Multi-click counting.
//!
//! A click streak is a run of presses of the same button, each within the
//! multi-click threshold of the previous one. The classifier keeps the
//! streak's button, the time and point of its latest press, and the count.
//!
//! The threshold is passed in on every call rather than stored, so a change
//! to the system's double-click time applies to the very next press.

use tracing::warn;

use super::coordinates::Point;
use super::event::MouseButton;

/// What a button release means for the click streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// Count to report on the release (and on the click, if any).
    pub clicks: u16,
    /// The release happened exactly where the streak's last press did, so
    /// it completes a click.
    pub at_click_point: bool,
}

/// Click streak state for one hook session.
#[derive(Debug, Default, Clone)]
pub struct ClickClassifier {
    last_button: Option<MouseButton>,
    last_time: u64,
    count: u16,
    last_point: Option<Point>,
}

impl ClickClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current click count.
    pub fn count(&self) -> u16 {
        self.count
    }

    pub fn last_button(&self) -> Option<MouseButton> {
        self.last_button
    }

    /// Returns `true` if `point` is where the last press happened.
    pub fn is_last_click_point(&self, point: Point) -> bool {
        self.last_point == Some(point)
    }

    /// Registers a button press and returns the count to report for it.
    pub fn press(&mut self, button: MouseButton, time: u64, point: Point, threshold: u64) -> u16 {
        if self.last_button == Some(button) && self.elapsed(time) <= threshold {
            match self.count.checked_add(1) {
                Some(count) => self.count = count,
                None => warn!(button = button.number(), "click count overflow, holding at maximum"),
            }
        } else {
            self.count = 1;
            self.last_button = Some(button);
        }

        self.last_time = time;
        self.last_point = Some(point);
        self.count
    }

    /// Registers a button release.
    ///
    /// A release of the streak's button that comes after the threshold ends
    /// the streak: the count is reported one last time and then drops to 0.
    pub fn release(
        &mut self,
        button: MouseButton,
        time: u64,
        point: Point,
        threshold: u64,
    ) -> ReleaseOutcome {
        let outcome = ReleaseOutcome {
            clicks: self.count,
            at_click_point: self.is_last_click_point(point),
        };

        if self.last_button == Some(button) && self.elapsed(time) > threshold {
            self.count = 0;
        }

        outcome
    }

    /// Registers pointer motion.
    ///
    /// Returns `None` when the pointer sits on the last click point; no
    /// motion event is reported for it. Otherwise returns the count to
    /// report, resetting a streak that has expired.
    pub fn motion(&mut self, time: u64, point: Point, threshold: u64) -> Option<u16> {
        if self.is_last_click_point(point) {
            return None;
        }

        if self.count != 0 && self.elapsed(time) > threshold {
            self.count = 0;
        }

        Some(self.count)
    }

    /// Registers a wheel notch, which always stands alone. Returns the count
    /// to report.
    pub fn wheel(&mut self) -> u16 {
        self.count = 1;
        self.last_button = None;
        self.count
    }

    fn elapsed(&self, time: u64) -> u64 {
        time.saturating_sub(self.last_time)
    }
}
