//! EventNormalizer: maps raw native input to canonical events.
//!
//! For each [`RawInputEvent`] the normalizer updates the modifier mask and
//! click state, builds the canonical events in their fixed order, and
//! dispatches them. The returned [`Propagation`] is `Consume` when the
//! consumer consumed any of those events; the backend then suppresses the
//! native input.
//!
//! # Architecture
//!
//! The normalizer depends only on the [`KeyLookup`] and [`SystemProperties`]
//! traits, injected at construction time, so it runs unchanged under the
//! Windows hook backend and in unit tests.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use inputhook_core::domain::modifiers::modifier_for_virtual_key;
use inputhook_core::{
    ClickClassifier, Event, EventKind, KeyLookup, KeyboardData, ModifierMask, ModifierTracker,
    MouseData, Point, Propagation, ScrollKind, SystemProperties, WheelData, WheelDirection,
    WHEEL_PAGESCROLL,
};
use tracing::{debug, trace};

use super::dispatch::Dispatcher;
use crate::infrastructure::input_capture::{RawInputEvent, RawMouseButton};

/// Clock used for event timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSource {
    /// The native hook timestamp (milliseconds since system start).
    #[default]
    Native,
    /// Wall-clock milliseconds since the Unix epoch.
    UnixEpoch,
}

/// Per-session settings of the normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Fixed multi-click threshold in milliseconds. `None` reads the system
    /// setting on every press.
    pub multi_click_time: Option<u64>,
    pub time_source: TimeSource,
}

/// Stateful translator from raw input to dispatched events.
pub struct EventNormalizer {
    modifiers: ModifierTracker,
    clicks: ClickClassifier,
    dispatcher: Dispatcher,
    lookup: Arc<dyn KeyLookup>,
    properties: Arc<dyn SystemProperties>,
    options: SessionOptions,
}

impl EventNormalizer {
    pub fn new(
        lookup: Arc<dyn KeyLookup>,
        properties: Arc<dyn SystemProperties>,
        options: SessionOptions,
    ) -> Self {
        Self {
            modifiers: ModifierTracker::new(),
            clicks: ClickClassifier::new(),
            dispatcher: Dispatcher::new(),
            lookup,
            properties,
            options,
        }
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn modifiers(&self) -> ModifierMask {
        self.modifiers.current()
    }

    /// Rebuilds the modifier mask from live key state.
    pub fn reinitialize_modifiers(&mut self) -> ModifierMask {
        self.modifiers.reinitialize(self.properties.as_ref())
    }

    /// Dispatches a payload-free lifecycle event with an empty mask.
    pub fn dispatch_lifecycle(&mut self, kind: EventKind, native_time: u64) -> Propagation {
        let event = Event::new(self.timestamp(native_time), ModifierMask::empty(), kind);
        self.dispatcher.dispatch(event)
    }

    /// Normalizes and dispatches one raw input.
    pub fn handle(&mut self, raw: &RawInputEvent) -> Propagation {
        match *raw {
            RawInputEvent::KeyDown {
                virtual_key,
                time_ms,
                extended,
                ..
            } => self.key_down(virtual_key, extended, time_ms),
            RawInputEvent::KeyUp {
                virtual_key,
                time_ms,
                extended,
                ..
            } => self.key_up(virtual_key, extended, time_ms),
            RawInputEvent::MouseButtonDown {
                button,
                x,
                y,
                time_ms,
            } => self.button_down(button, Point::new(x, y), time_ms),
            RawInputEvent::MouseButtonUp {
                button,
                x,
                y,
                time_ms,
            } => self.button_up(button, Point::new(x, y), time_ms),
            RawInputEvent::MouseMove { x, y, time_ms } => self.motion(Point::new(x, y), time_ms),
            RawInputEvent::MouseWheel {
                delta,
                x,
                y,
                time_ms,
            } => self.wheel(delta, WheelDirection::Vertical, Point::new(x, y), time_ms),
            RawInputEvent::MouseWheelH {
                delta,
                x,
                y,
                time_ms,
            } => self.wheel(delta, WheelDirection::Horizontal, Point::new(x, y), time_ms),
            RawInputEvent::Unrecognized { message, .. } => {
                debug!("unhandled native input message {message:#06X}");
                Propagation::Pass
            }
        }
    }

    // ── Keyboard ──────────────────────────────────────────────────────────────

    fn key_down(&mut self, virtual_key: u16, extended: bool, native_time: u64) -> Propagation {
        if let Some(bit) = modifier_for_virtual_key(virtual_key) {
            self.modifiers.press(bit);
        }

        let time = self.timestamp(native_time);
        let mask = self.modifiers.current();
        let keycode = self.lookup.keycode_to_scancode(virtual_key, extended);
        debug!("key {virtual_key:#04X} pressed, keycode {keycode:?}");

        let pressed = Event::new(
            time,
            mask,
            EventKind::KeyPressed(KeyboardData::key(keycode, virtual_key)),
        );
        let mut verdict = self.dispatcher.dispatch(pressed);
        if verdict.is_consumed() {
            return verdict;
        }

        let translation_mask = self.modifiers.translation_mask();
        for keychar in self.lookup.keycode_to_unicode(virtual_key, translation_mask) {
            let typed = Event::new(
                time,
                mask,
                EventKind::KeyTyped(KeyboardData::typed(virtual_key, keychar)),
            );
            verdict = verdict.or(self.dispatcher.dispatch(typed));
        }

        verdict
    }

    fn key_up(&mut self, virtual_key: u16, extended: bool, native_time: u64) -> Propagation {
        if let Some(bit) = modifier_for_virtual_key(virtual_key) {
            self.modifiers.unset(bit);
        }

        let keycode = self.lookup.keycode_to_scancode(virtual_key, extended);
        debug!("key {virtual_key:#04X} released, keycode {keycode:?}");

        let released = Event::new(
            self.timestamp(native_time),
            self.modifiers.current(),
            EventKind::KeyReleased(KeyboardData::key(keycode, virtual_key)),
        );
        self.dispatcher.dispatch(released)
    }

    // ── Pointer ───────────────────────────────────────────────────────────────

    fn button_down(&mut self, raw: RawMouseButton, point: Point, native_time: u64) -> Propagation {
        let button = raw.to_button();
        if let Some(bit) = ModifierMask::for_button(button) {
            self.modifiers.set(bit);
        }

        let time = self.timestamp(native_time);
        let threshold = self.multi_click_threshold();
        let clicks = self.clicks.press(button, time, point, threshold);
        debug!(button = button.number(), clicks, "button pressed at {point:?}");

        let (x, y) = point.to_event_coordinates();
        let pressed = Event::new(
            time,
            self.modifiers.current(),
            EventKind::MousePressed(MouseData {
                button: Some(button),
                clicks,
                x,
                y,
            }),
        );
        self.dispatcher.dispatch(pressed)
    }

    fn button_up(&mut self, raw: RawMouseButton, point: Point, native_time: u64) -> Propagation {
        let button = raw.to_button();
        if let Some(bit) = ModifierMask::for_button(button) {
            self.modifiers.unset(bit);
        }

        let time = self.timestamp(native_time);
        let threshold = self.multi_click_threshold();
        let outcome = self.clicks.release(button, time, point, threshold);
        debug!(button = button.number(), clicks = outcome.clicks, "button released at {point:?}");

        let (x, y) = point.to_event_coordinates();
        let data = MouseData {
            button: Some(button),
            clicks: outcome.clicks,
            x,
            y,
        };
        let mask = self.modifiers.current();

        let verdict = self
            .dispatcher
            .dispatch(Event::new(time, mask, EventKind::MouseReleased(data)));
        if verdict.is_consumed() || !outcome.at_click_point {
            return verdict;
        }

        verdict.or(self
            .dispatcher
            .dispatch(Event::new(time, mask, EventKind::MouseClicked(data))))
    }

    fn motion(&mut self, point: Point, native_time: u64) -> Propagation {
        let time = self.timestamp(native_time);
        let threshold = self.multi_click_threshold();
        let Some(clicks) = self.clicks.motion(time, point, threshold) else {
            trace!("motion at last click point suppressed");
            return Propagation::Pass;
        };

        let mask = self.modifiers.current();
        let (x, y) = point.to_event_coordinates();
        let data = MouseData {
            button: None,
            clicks,
            x,
            y,
        };
        let kind = if mask.any_button() {
            EventKind::MouseDragged(data)
        } else {
            EventKind::MouseMoved(data)
        };
        trace!(?kind, "pointer motion");

        self.dispatcher.dispatch(Event::new(time, mask, kind))
    }

    fn wheel(
        &mut self,
        delta: i16,
        direction: WheelDirection,
        point: Point,
        native_time: u64,
    ) -> Propagation {
        let clicks = self.clicks.wheel();

        let (kind, amount) = match self.properties.wheel_scroll_lines() {
            WHEEL_PAGESCROLL => (ScrollKind::Block, 1),
            lines => (
                ScrollKind::Unit,
                u16::try_from(lines).unwrap_or(u16::MAX),
            ),
        };
        // Native vertical deltas are positive away from the user; events
        // report positive rotation as scrolling down.
        let rotation = match direction {
            WheelDirection::Vertical => delta.saturating_neg(),
            WheelDirection::Horizontal => delta,
        };
        debug!(rotation, amount, ?direction, "wheel");

        let (x, y) = point.to_event_coordinates();
        let event = Event::new(
            self.timestamp(native_time),
            self.modifiers.current(),
            EventKind::MouseWheel(WheelData {
                clicks,
                x,
                y,
                kind,
                amount,
                rotation,
                direction,
            }),
        );
        self.dispatcher.dispatch(event)
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn multi_click_threshold(&self) -> u64 {
        self.options
            .multi_click_time
            .unwrap_or_else(|| self.properties.multi_click_time())
    }

    fn timestamp(&self, native_time: u64) -> u64 {
        match self.options.time_source {
            TimeSource::Native => native_time,
            TimeSource::UnixEpoch => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_millis() as u64)
                .unwrap_or(native_time),
        }
    }
}
