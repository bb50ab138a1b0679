//! The canonical event model.
//!
//! Every native callback the hook receives is normalized into one or more
//! [`Event`] values. An event is a small `Copy` value: the dispatcher hands a
//! fresh one to the consumer for each notification, and the consumer answers
//! with a [`Propagation`] deciding whether the native input continues to the
//! rest of the system.
//!
//! # Event ordering on a single native input
//!
//! | Native input      | Events, in order                                   |
//! |-------------------|----------------------------------------------------|
//! | key down          | `KeyPressed`, then zero or more `KeyTyped`          |
//! | key up            | `KeyReleased`                                      |
//! | button down       | `MousePressed`                                     |
//! | button up         | `MouseReleased`, then possibly `MouseClicked`      |
//! | pointer motion    | `MouseMoved` or `MouseDragged` (or nothing)        |
//! | wheel             | `MouseWheel`                                       |

use serde::{Deserialize, Serialize};

use super::modifiers::ModifierMask;
use crate::keymap::keycode::KeyCode;

/// Payload-free discriminant of an [`EventKind`].
///
/// The numeric values are stable and are what the demo prints as `id=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventType {
    HookEnabled = 1,
    HookDisabled = 2,
    KeyTyped = 3,
    KeyPressed = 4,
    KeyReleased = 5,
    MouseClicked = 6,
    MousePressed = 7,
    MouseReleased = 8,
    MouseMoved = 9,
    MouseDragged = 10,
    MouseWheel = 11,
}

impl EventType {
    /// Returns the stable numeric identifier of this event type.
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// A normalized input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Milliseconds, either the native hook clock or the Unix epoch depending
    /// on how the session was configured.
    pub time: u64,
    /// Modifier, button and lock state at the moment of the event.
    pub mask: ModifierMask,
    /// What happened, with its payload.
    pub kind: EventKind,
}

impl Event {
    pub fn new(time: u64, mask: ModifierMask, kind: EventKind) -> Self {
        Self { time, mask, kind }
    }

    /// Returns the discriminant of this event's kind.
    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    /// Returns the keyboard payload for key events.
    pub fn keyboard(&self) -> Option<&KeyboardData> {
        match &self.kind {
            EventKind::KeyPressed(data) | EventKind::KeyReleased(data) | EventKind::KeyTyped(data) => {
                Some(data)
            }
            _ => None,
        }
    }

    /// Returns the mouse payload for button and motion events.
    pub fn mouse(&self) -> Option<&MouseData> {
        match &self.kind {
            EventKind::MousePressed(data)
            | EventKind::MouseReleased(data)
            | EventKind::MouseClicked(data)
            | EventKind::MouseMoved(data)
            | EventKind::MouseDragged(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the wheel payload for wheel events.
    pub fn wheel(&self) -> Option<&WheelData> {
        match &self.kind {
            EventKind::MouseWheel(data) => Some(data),
            _ => None,
        }
    }
}

/// The kind of an [`Event`] together with its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// The native hooks are installed and events will follow.
    HookEnabled,
    /// The native hooks have been removed; no further events follow.
    HookDisabled,
    KeyPressed(KeyboardData),
    KeyReleased(KeyboardData),
    /// A character produced by a key press. `keycode` is always
    /// [`KeyCode::Undefined`].
    KeyTyped(KeyboardData),
    MousePressed(MouseData),
    MouseReleased(MouseData),
    /// A press and release of the same button at the same point.
    MouseClicked(MouseData),
    MouseMoved(MouseData),
    /// Pointer motion while at least one button is held.
    MouseDragged(MouseData),
    MouseWheel(WheelData),
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::HookEnabled => EventType::HookEnabled,
            EventKind::HookDisabled => EventType::HookDisabled,
            EventKind::KeyPressed(_) => EventType::KeyPressed,
            EventKind::KeyReleased(_) => EventType::KeyReleased,
            EventKind::KeyTyped(_) => EventType::KeyTyped,
            EventKind::MousePressed(_) => EventType::MousePressed,
            EventKind::MouseReleased(_) => EventType::MouseReleased,
            EventKind::MouseClicked(_) => EventType::MouseClicked,
            EventKind::MouseMoved(_) => EventType::MouseMoved,
            EventKind::MouseDragged(_) => EventType::MouseDragged,
            EventKind::MouseWheel(_) => EventType::MouseWheel,
        }
    }
}

/// Payload of key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyboardData {
    /// Canonical key code; [`KeyCode::Undefined`] for typed characters and
    /// keys with no mapping.
    pub keycode: KeyCode,
    /// The platform's own key identifier (a Windows virtual-key code).
    pub rawcode: u16,
    /// The produced character; only set on `KeyTyped`.
    pub keychar: Option<char>,
}

impl KeyboardData {
    /// Payload of a `KeyPressed` / `KeyReleased` event.
    pub fn key(keycode: KeyCode, rawcode: u16) -> Self {
        Self {
            keycode,
            rawcode,
            keychar: None,
        }
    }

    /// Payload of a `KeyTyped` event.
    pub fn typed(rawcode: u16, keychar: char) -> Self {
        Self {
            keycode: KeyCode::Undefined,
            rawcode,
            keychar: Some(keychar),
        }
    }
}

/// Identifier of a pointer button.
///
/// Buttons 1 to 5 have names; higher-numbered extra buttons keep their
/// number in [`MouseButton::Extra`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Button4,
    Button5,
    Extra(u16),
}

impl MouseButton {
    /// Returns the 1-based button number.
    pub fn number(self) -> u16 {
        match self {
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 3,
            MouseButton::Button4 => 4,
            MouseButton::Button5 => 5,
            MouseButton::Extra(n) => n,
        }
    }

    /// Builds a button from its 1-based number. `0` means "no button".
    pub fn from_number(number: u16) -> Option<Self> {
        match number {
            0 => None,
            1 => Some(MouseButton::Left),
            2 => Some(MouseButton::Right),
            3 => Some(MouseButton::Middle),
            4 => Some(MouseButton::Button4),
            5 => Some(MouseButton::Button5),
            n => Some(MouseButton::Extra(n)),
        }
    }
}

/// Payload of button and motion events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseData {
    /// `None` for motion events.
    pub button: Option<MouseButton>,
    /// Current multi-click count.
    pub clicks: u16,
    pub x: i16,
    pub y: i16,
}

/// Whether a wheel notch scrolls by lines or by pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ScrollKind {
    Unit = 1,
    Block = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WheelDirection {
    Vertical = 3,
    Horizontal = 4,
}

/// Payload of wheel events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WheelData {
    pub clicks: u16,
    pub x: i16,
    pub y: i16,
    pub kind: ScrollKind,
    /// Lines per notch for [`ScrollKind::Unit`], `1` for [`ScrollKind::Block`].
    pub amount: u16,
    /// Signed wheel delta. Positive vertical rotation scrolls down.
    pub rotation: i16,
    pub direction: WheelDirection,
}

/// The consumer's verdict on an event.
///
/// `Consume` suppresses the underlying native input so no other application
/// sees it.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Propagation {
    #[default]
    Pass,
    Consume,
}

impl Propagation {
    pub fn is_consumed(self) -> bool {
        self == Propagation::Consume
    }

    /// Combines the verdicts of several events raised by the same native
    /// input: consumed if any of them was.
    pub fn or(self, other: Propagation) -> Propagation {
        if self.is_consumed() || other.is_consumed() {
            Propagation::Consume
        } else {
            Propagation::Pass
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_ids_are_stable() {
        // Arrange
        let expected: &[(EventType, u8)] = &[
            (EventType::HookEnabled, 1),
            (EventType::HookDisabled, 2),
            (EventType::KeyTyped, 3),
            (EventType::KeyPressed, 4),
            (EventType::KeyReleased, 5),
            (EventType::MouseClicked, 6),
            (EventType::MousePressed, 7),
            (EventType::MouseReleased, 8),
            (EventType::MouseMoved, 9),
            (EventType::MouseDragged, 10),
            (EventType::MouseWheel, 11),
        ];

        // Act / Assert
        for &(event_type, id) in expected {
            assert_eq!(event_type.id(), id, "{event_type:?} must have id {id}");
        }
    }

    #[test]
    fn test_mouse_button_numbers_round_trip() {
        for number in 1..=12u16 {
            let button = MouseButton::from_number(number).expect("non-zero number is a button");
            assert_eq!(button.number(), number);
        }
    }

    #[test]
    fn test_button_zero_means_no_button() {
        assert_eq!(MouseButton::from_number(0), None);
    }

    #[test]
    fn test_named_buttons_do_not_use_extra_variant() {
        assert_eq!(MouseButton::from_number(4), Some(MouseButton::Button4));
        assert_eq!(MouseButton::from_number(5), Some(MouseButton::Button5));
        assert_eq!(MouseButton::from_number(6), Some(MouseButton::Extra(6)));
    }

    #[test]
    fn test_typed_payload_has_undefined_keycode() {
        // Arrange / Act
        let data = KeyboardData::typed(0x41, 'a');

        // Assert
        assert_eq!(data.keycode, KeyCode::Undefined);
        assert_eq!(data.keychar, Some('a'));
        assert_eq!(data.rawcode, 0x41);
    }

    #[test]
    fn test_payload_accessors_match_kind() {
        // Arrange
        let key = Event::new(
            10,
            ModifierMask::empty(),
            EventKind::KeyPressed(KeyboardData::key(KeyCode::KeyA, 0x41)),
        );
        let click = Event::new(
            11,
            ModifierMask::empty(),
            EventKind::MouseClicked(MouseData {
                button: Some(MouseButton::Left),
                clicks: 2,
                x: 5,
                y: 6,
            }),
        );

        // Act / Assert
        assert!(key.keyboard().is_some());
        assert!(key.mouse().is_none());
        assert_eq!(click.mouse().map(|m| m.clicks), Some(2));
        assert!(click.wheel().is_none());
        assert_eq!(click.event_type(), EventType::MouseClicked);
    }

    #[test]
    fn test_propagation_or_is_consumed_if_either_is() {
        use Propagation::*;
        assert_eq!(Pass.or(Pass), Pass);
        assert_eq!(Pass.or(Consume), Consume);
        assert_eq!(Consume.or(Pass), Consume);
        assert_eq!(Consume.or(Consume), Consume);
    }

    #[test]
    fn test_propagation_defaults_to_pass() {
        assert_eq!(Propagation::default(), Propagation::Pass);
    }
}
