//! EventPoster: synthesizes native input from canonical events.
//!
//! Each postable event becomes one or two [`InputRecord`]s: a button event
//! posted with pointer movement is preceded by an absolute motion record to
//! the event's position. All records of an event are built before any is
//! submitted, and submission stops at the first record the OS rejects.
//!
//! | Event type                          | Records                          |
//! |-------------------------------------|----------------------------------|
//! | `KeyPressed` / `KeyReleased`        | key down / key up                |
//! | `MousePressed` / `MouseReleased`    | [motion], button down / up       |
//! | `MouseMoved` / `MouseDragged`       | absolute motion                  |
//! | `MouseWheel`                        | vertical or horizontal wheel     |
//! | `KeyTyped`, `MouseClicked`, hooks   | rejected                         |

use std::sync::Arc;

use inputhook_core::{
    normalize_coordinates, Event, EventKind, EventType, KeyCode, KeyLookup, MouseButton,
    MouseData, Point, WheelData, WheelDirection,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::infrastructure::input_injection::{
    InjectionError, InputInjector, InputRecord, KeyboardRecord, MouseAction, MouseRecord,
};
use crate::infrastructure::screen_info::ScreenGeometry;

/// Error type for posting events.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("failed to allocate the input record buffer")]
    OutOfMemory,
    /// The event type has no native input equivalent.
    #[error("event type {0:?} cannot be posted")]
    UnsupportedEventType(EventType),
    #[error("key code {0} has no native virtual key")]
    UnsupportedKeycode(KeyCode),
    #[error("mouse button event without a button")]
    MissingButton,
    #[error("input injection failed: {0}")]
    InjectionFailed(#[from] InjectionError),
}

/// Keys posted with the extended-key flag while Shift is held.
///
/// Without the flag, Windows interprets a synthesized navigation key with
/// Shift down as its numeric keypad twin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtendedKeyTable(Vec<KeyCode>);

impl ExtendedKeyTable {
    pub fn new(keys: Vec<KeyCode>) -> Self {
        Self(keys)
    }

    pub fn contains(&self, keycode: KeyCode) -> bool {
        self.0.contains(&keycode)
    }

    pub fn keys(&self) -> &[KeyCode] {
        &self.0
    }
}

impl Default for ExtendedKeyTable {
    fn default() -> Self {
        Self(vec![
            KeyCode::ArrowUp,
            KeyCode::ArrowDown,
            KeyCode::ArrowLeft,
            KeyCode::ArrowRight,
            KeyCode::Home,
            KeyCode::End,
            KeyCode::PageUp,
            KeyCode::PageDown,
            KeyCode::Insert,
            KeyCode::Delete,
        ])
    }
}

/// Maps canonical events to native input and injects them.
///
/// Holds no mutable state; one poster can be shared across threads.
pub struct EventPoster {
    injector: Arc<dyn InputInjector>,
    lookup: Arc<dyn KeyLookup>,
    screen: Arc<dyn ScreenGeometry>,
    extended_keys: ExtendedKeyTable,
}

impl EventPoster {
    pub fn new(
        injector: Arc<dyn InputInjector>,
        lookup: Arc<dyn KeyLookup>,
        screen: Arc<dyn ScreenGeometry>,
    ) -> Self {
        Self {
            injector,
            lookup,
            screen,
            extended_keys: ExtendedKeyTable::default(),
        }
    }

    pub fn with_extended_keys(mut self, extended_keys: ExtendedKeyTable) -> Self {
        self.extended_keys = extended_keys;
        self
    }

    /// Posts `event`, moving the pointer to the event position for button
    /// and motion events.
    ///
    /// # Errors
    ///
    /// See [`PostError`]. Nothing is injected when the event cannot be
    /// mapped; records already injected stay injected when a later one fails.
    pub fn post_event(&self, event: &Event) -> Result<(), PostError> {
        self.post(event, true)
    }

    /// Posts `event` without touching the pointer position. Motion events
    /// produce no input at all.
    pub fn post_event_dont_move_mouse(&self, event: &Event) -> Result<(), PostError> {
        self.post(event, false)
    }

    fn post(&self, event: &Event, move_pointer: bool) -> Result<(), PostError> {
        let records = self.build_records(event, move_pointer)?;
        debug!(
            event_type = ?event.event_type(),
            records = records.len(),
            "posting event"
        );

        for record in &records {
            self.injector.submit(record).map_err(|e| {
                warn!("injection of {record:?} failed: {e}");
                PostError::InjectionFailed(e)
            })?;
        }
        Ok(())
    }

    /// Maps `event` to the native records that reproduce it, in submission
    /// order.
    pub fn build_records(
        &self,
        event: &Event,
        move_pointer: bool,
    ) -> Result<Vec<InputRecord>, PostError> {
        let mut records = Vec::new();
        records
            .try_reserve_exact(2)
            .map_err(|_| PostError::OutOfMemory)?;

        match event.kind {
            EventKind::KeyPressed(data) | EventKind::KeyReleased(data) => {
                let key_up = matches!(event.kind, EventKind::KeyReleased(_));
                let virtual_key = self.lookup.scancode_to_keycode(data.keycode).ok_or_else(|| {
                    warn!("unable to look up key code {}", data.keycode);
                    PostError::UnsupportedKeycode(data.keycode)
                })?;
                let extended = event.mask.shift() && self.extended_keys.contains(data.keycode);
                records.push(InputRecord::Keyboard(KeyboardRecord {
                    virtual_key,
                    key_up,
                    extended,
                }));
            }
            EventKind::MousePressed(data) | EventKind::MouseReleased(data) => {
                let pressed = matches!(event.kind, EventKind::MousePressed(_));
                let (action, extra) = button_action(&data, pressed)?;
                if move_pointer {
                    records.push(self.motion_record(&data));
                }
                records.push(InputRecord::Mouse(MouseRecord::action(action, extra)));
            }
            EventKind::MouseMoved(data) | EventKind::MouseDragged(data) => {
                if move_pointer {
                    records.push(self.motion_record(&data));
                }
            }
            EventKind::MouseWheel(data) => {
                records.push(InputRecord::Mouse(wheel_record(&data)));
            }
            EventKind::KeyTyped(_)
            | EventKind::MouseClicked(_)
            | EventKind::HookEnabled
            | EventKind::HookDisabled => {
                debug!("ignoring post of {:?}", event.event_type());
                return Err(PostError::UnsupportedEventType(event.event_type()));
            }
        }

        Ok(records)
    }

    fn motion_record(&self, data: &MouseData) -> InputRecord {
        let point = Point::new(i32::from(data.x), i32::from(data.y));
        let normalized = normalize_coordinates(
            point,
            self.screen.virtual_screen(),
            self.screen.largest_negative_coordinates(),
        );
        InputRecord::Mouse(MouseRecord::move_to(normalized.x, normalized.y))
    }
}

impl std::fmt::Debug for EventPoster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPoster")
            .field("extended_keys", &self.extended_keys)
            .finish_non_exhaustive()
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn button_action(data: &MouseData, pressed: bool) -> Result<(MouseAction, i32), PostError> {
    let Some(button) = data.button else {
        warn!("no button specified for mouse button event");
        return Err(PostError::MissingButton);
    };

    Ok(match (button, pressed) {
        (MouseButton::Left, true) => (MouseAction::LeftDown, 0),
        (MouseButton::Left, false) => (MouseAction::LeftUp, 0),
        (MouseButton::Right, true) => (MouseAction::RightDown, 0),
        (MouseButton::Right, false) => (MouseAction::RightUp, 0),
        (MouseButton::Middle, true) => (MouseAction::MiddleDown, 0),
        (MouseButton::Middle, false) => (MouseAction::MiddleUp, 0),
        // Extra buttons are numbered from 1 natively: button 4 is X1.
        (other, true) => (MouseAction::XDown, i32::from(other.number()) - 3),
        (other, false) => (MouseAction::XUp, i32::from(other.number()) - 3),
    })
}

/// Wheel delta is `amount × rotation`. Vertical rotation is flipped back to
/// the native polarity so a captured event replays in the same direction.
fn wheel_record(data: &WheelData) -> MouseRecord {
    let delta = i32::from(data.amount).saturating_mul(i32::from(data.rotation));
    match data.direction {
        WheelDirection::Vertical => MouseRecord::action(MouseAction::Wheel, delta.saturating_neg()),
        WheelDirection::Horizontal => MouseRecord::action(MouseAction::HWheel, delta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::input_injection::mock::MockInputInjector;
    use crate::infrastructure::screen_info::StaticScreenGeometry;
    use inputhook_core::keymap::windows_vk::vk;
    use inputhook_core::{
        KeyboardData, ModifierMask, ScrollKind, WindowsKeyTable,
    };
    use mockall::mock;

    mock! {
        Lookup {}
        impl KeyLookup for Lookup {
            fn keycode_to_scancode(&self, native: u16, extended: bool) -> KeyCode;
            fn scancode_to_keycode(&self, keycode: KeyCode) -> Option<u16>;
            fn keycode_to_unicode(&self, native: u16, mask: ModifierMask) -> Vec<char>;
        }
    }

    fn poster_with(injector: Arc<MockInputInjector>) -> EventPoster {
        EventPoster::new(
            injector,
            Arc::new(WindowsKeyTable::new()),
            Arc::new(StaticScreenGeometry::single_1080p()),
        )
    }

    fn key_event(kind: fn(KeyboardData) -> EventKind, keycode: KeyCode, mask: ModifierMask) -> Event {
        Event::new(0, mask, kind(KeyboardData::key(keycode, 0)))
    }

    fn mouse(button: Option<MouseButton>, x: i16, y: i16) -> MouseData {
        MouseData {
            button,
            clicks: 1,
            x,
            y,
        }
    }

    fn wheel(rotation: i16, amount: u16, direction: WheelDirection) -> Event {
        Event::new(
            0,
            ModifierMask::empty(),
            EventKind::MouseWheel(WheelData {
                clicks: 1,
                x: 0,
                y: 0,
                kind: ScrollKind::Unit,
                amount,
                rotation,
                direction,
            }),
        )
    }

    // ── Keyboard ──────────────────────────────────────────────────────────────

    #[test]
    fn test_key_press_posts_key_down_record() {
        // Arrange
        let injector = Arc::new(MockInputInjector::new());
        let poster = poster_with(Arc::clone(&injector));
        let event = key_event(EventKind::KeyPressed, KeyCode::KeyA, ModifierMask::empty());

        // Act
        poster.post_event(&event).expect("post succeeds");

        // Assert
        assert_eq!(
            injector.records(),
            vec![InputRecord::Keyboard(KeyboardRecord {
                virtual_key: 0x41,
                key_up: false,
                extended: false,
            })]
        );
    }

    #[test]
    fn test_key_release_posts_key_up_record() {
        let poster = poster_with(Arc::new(MockInputInjector::new()));
        let event = key_event(EventKind::KeyReleased, KeyCode::Escape, ModifierMask::empty());

        let records = poster.build_records(&event, true).unwrap();

        assert_eq!(
            records,
            vec![InputRecord::Keyboard(KeyboardRecord {
                virtual_key: vk::ESCAPE,
                key_up: true,
                extended: false,
            })]
        );
    }

    #[test]
    fn test_navigation_key_with_shift_is_extended() {
        let poster = poster_with(Arc::new(MockInputInjector::new()));
        let event = key_event(EventKind::KeyPressed, KeyCode::ArrowLeft, ModifierMask::SHIFT_R);

        let records = poster.build_records(&event, true).unwrap();

        assert!(matches!(
            records[0],
            InputRecord::Keyboard(KeyboardRecord { extended: true, .. })
        ));
    }

    #[test]
    fn test_navigation_key_without_shift_is_not_extended() {
        let poster = poster_with(Arc::new(MockInputInjector::new()));
        let event = key_event(EventKind::KeyPressed, KeyCode::Delete, ModifierMask::CTRL_L);

        let records = poster.build_records(&event, true).unwrap();

        assert!(matches!(
            records[0],
            InputRecord::Keyboard(KeyboardRecord { extended: false, .. })
        ));
    }

    #[test]
    fn test_every_default_extended_key_is_honoured() {
        let poster = poster_with(Arc::new(MockInputInjector::new()));

        for &keycode in ExtendedKeyTable::default().keys() {
            let event = key_event(EventKind::KeyPressed, keycode, ModifierMask::SHIFT_L);
            let records = poster.build_records(&event, true).unwrap();
            assert!(
                matches!(records[0], InputRecord::Keyboard(KeyboardRecord { extended: true, .. })),
                "{keycode} should be extended"
            );
        }
    }

    #[test]
    fn test_custom_extended_key_table_replaces_default() {
        let poster = poster_with(Arc::new(MockInputInjector::new()))
            .with_extended_keys(ExtendedKeyTable::new(vec![KeyCode::KeyA]));

        let a = poster
            .build_records(
                &key_event(EventKind::KeyPressed, KeyCode::KeyA, ModifierMask::SHIFT_L),
                true,
            )
            .unwrap();
        let up = poster
            .build_records(
                &key_event(EventKind::KeyPressed, KeyCode::ArrowUp, ModifierMask::SHIFT_L),
                true,
            )
            .unwrap();

        assert!(matches!(a[0], InputRecord::Keyboard(KeyboardRecord { extended: true, .. })));
        assert!(matches!(up[0], InputRecord::Keyboard(KeyboardRecord { extended: false, .. })));
    }

    #[test]
    fn test_unmapped_key_code_is_rejected_without_injection() {
        // Arrange
        let mut lookup = MockLookup::new();
        lookup
            .expect_scancode_to_keycode()
            .withf(|keycode| *keycode == KeyCode::F24)
            .times(1)
            .returning(|_| None);
        let injector = Arc::new(MockInputInjector::new());
        let poster = EventPoster::new(
            Arc::clone(&injector) as Arc<dyn InputInjector>,
            Arc::new(lookup),
            Arc::new(StaticScreenGeometry::single_1080p()),
        );

        // Act
        let result = poster.post_event(&key_event(
            EventKind::KeyPressed,
            KeyCode::F24,
            ModifierMask::empty(),
        ));

        // Assert
        assert!(matches!(result, Err(PostError::UnsupportedKeycode(KeyCode::F24))));
        assert!(injector.records().is_empty());
    }

    // ── Buttons and motion ────────────────────────────────────────────────────

    #[test]
    fn test_button_press_moves_pointer_first() {
        // Arrange
        let injector = Arc::new(MockInputInjector::new());
        let poster = poster_with(Arc::clone(&injector));
        let event = Event::new(
            0,
            ModifierMask::empty(),
            EventKind::MousePressed(mouse(Some(MouseButton::Left), 960, 540)),
        );

        // Act
        poster.post_event(&event).unwrap();

        // Assert
        assert_eq!(
            injector.records(),
            vec![
                InputRecord::Mouse(MouseRecord::move_to(32_768, 32_768)),
                InputRecord::Mouse(MouseRecord::action(MouseAction::LeftDown, 0)),
            ]
        );
    }

    #[test]
    fn test_button_release_without_move_posts_only_button() {
        let poster = poster_with(Arc::new(MockInputInjector::new()));
        let event = Event::new(
            0,
            ModifierMask::empty(),
            EventKind::MouseReleased(mouse(Some(MouseButton::Right), 10, 10)),
        );

        let records = poster.build_records(&event, false).unwrap();

        assert_eq!(
            records,
            vec![InputRecord::Mouse(MouseRecord::action(MouseAction::RightUp, 0))]
        );
    }

    #[test]
    fn test_extra_buttons_post_x_records_with_native_index() {
        let poster = poster_with(Arc::new(MockInputInjector::new()));
        let cases = [
            (MouseButton::Button4, 1),
            (MouseButton::Button5, 2),
            (MouseButton::Extra(7), 4),
        ];

        for (button, index) in cases {
            let event = Event::new(
                0,
                ModifierMask::empty(),
                EventKind::MousePressed(mouse(Some(button), 0, 0)),
            );
            let records = poster.build_records(&event, false).unwrap();
            assert_eq!(
                records,
                vec![InputRecord::Mouse(MouseRecord::action(MouseAction::XDown, index))]
            );
        }
    }

    #[test]
    fn test_button_event_without_button_is_rejected() {
        let injector = Arc::new(MockInputInjector::new());
        let poster = poster_with(Arc::clone(&injector));
        let event = Event::new(
            0,
            ModifierMask::empty(),
            EventKind::MousePressed(mouse(None, 5, 5)),
        );

        let result = poster.post_event(&event);

        assert!(matches!(result, Err(PostError::MissingButton)));
        assert!(injector.records().is_empty(), "no motion record either");
    }

    #[test]
    fn test_drag_posts_absolute_motion_on_shifted_desktop() {
        let poster = EventPoster::new(
            Arc::new(MockInputInjector::new()),
            Arc::new(WindowsKeyTable::new()),
            Arc::new(StaticScreenGeometry::dual_1080p_left()),
        );
        let event = Event::new(
            0,
            ModifierMask::BUTTON1,
            EventKind::MouseDragged(mouse(None, 0, 540)),
        );

        let records = poster.build_records(&event, true).unwrap();

        // x: (0 + 1920) of 3840 is the middle of the virtual desktop.
        assert_eq!(
            records,
            vec![InputRecord::Mouse(MouseRecord::move_to(32_768, 32_768))]
        );
    }

    #[test]
    fn test_motion_without_move_produces_nothing() {
        let injector = Arc::new(MockInputInjector::new());
        let poster = poster_with(Arc::clone(&injector));
        let event = Event::new(
            0,
            ModifierMask::empty(),
            EventKind::MouseMoved(mouse(None, 100, 100)),
        );

        poster.post_event_dont_move_mouse(&event).unwrap();

        assert!(injector.records().is_empty());
    }

    // ── Wheel ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_vertical_wheel_delta_is_amount_times_rotation_in_native_polarity() {
        let poster = poster_with(Arc::new(MockInputInjector::new()));

        let records = poster
            .build_records(&wheel(-120, 3, WheelDirection::Vertical), true)
            .unwrap();

        assert_eq!(
            records,
            vec![InputRecord::Mouse(MouseRecord::action(MouseAction::Wheel, 360))]
        );
    }

    #[test]
    fn test_horizontal_wheel_posts_hwheel() {
        let poster = poster_with(Arc::new(MockInputInjector::new()));

        let records = poster
            .build_records(&wheel(120, 1, WheelDirection::Horizontal), false)
            .unwrap();

        assert_eq!(
            records,
            vec![InputRecord::Mouse(MouseRecord::action(MouseAction::HWheel, 120))]
        );
    }

    // ── Unsupported events and failures ───────────────────────────────────────

    #[test]
    fn test_derived_and_lifecycle_events_are_rejected() {
        let poster = poster_with(Arc::new(MockInputInjector::new()));
        let events = [
            Event::new(0, ModifierMask::empty(), EventKind::KeyTyped(KeyboardData::typed(0x41, 'a'))),
            Event::new(0, ModifierMask::empty(), EventKind::MouseClicked(mouse(Some(MouseButton::Left), 0, 0))),
            Event::new(0, ModifierMask::empty(), EventKind::HookEnabled),
            Event::new(0, ModifierMask::empty(), EventKind::HookDisabled),
        ];

        for event in events {
            let result = poster.post_event(&event);
            assert!(
                matches!(result, Err(PostError::UnsupportedEventType(t)) if t == event.event_type()),
                "{:?} must be rejected",
                event.event_type()
            );
        }
    }

    #[test]
    fn test_injection_failure_stops_remaining_records() {
        // Arrange
        let injector = Arc::new(MockInputInjector::failing_after(0));
        let poster = poster_with(Arc::clone(&injector));
        let event = Event::new(
            0,
            ModifierMask::empty(),
            EventKind::MousePressed(mouse(Some(MouseButton::Middle), 1, 1)),
        );

        // Act
        let result = poster.post_event(&event);

        // Assert
        assert!(matches!(result, Err(PostError::InjectionFailed(_))));
        assert!(injector.records().is_empty());
    }
}
