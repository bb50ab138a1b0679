//! Event sequences for the `post` subcommands.
//!
//! Each builder returns the events in posting order, stamped with time `0`;
//! the poster ignores event time.

use inputhook_core::{
    Event, EventKind, KeyCode, KeyboardData, ModifierMask, MouseButton, MouseData, ScrollKind,
    WheelData, WheelDirection,
};

/// Mask bit held while the modifier key `key` is down.
fn modifier_bit(key: KeyCode) -> Option<ModifierMask> {
    match key {
        KeyCode::ShiftLeft => Some(ModifierMask::SHIFT_L),
        KeyCode::ShiftRight => Some(ModifierMask::SHIFT_R),
        KeyCode::ControlLeft => Some(ModifierMask::CTRL_L),
        KeyCode::ControlRight => Some(ModifierMask::CTRL_R),
        KeyCode::AltLeft => Some(ModifierMask::ALT_L),
        KeyCode::AltRight => Some(ModifierMask::ALT_R),
        KeyCode::MetaLeft => Some(ModifierMask::META_L),
        KeyCode::MetaRight => Some(ModifierMask::META_R),
        _ => None,
    }
}

fn key(kind: fn(KeyboardData) -> EventKind, keycode: KeyCode, mask: ModifierMask) -> Event {
    Event::new(0, mask, kind(KeyboardData::key(keycode, 0)))
}

/// Presses `modifiers` in order, taps `target`, then releases the modifiers
/// in reverse order. Each event carries the mask in effect when it fires.
pub fn key_chord(modifiers: &[KeyCode], target: KeyCode) -> Vec<Event> {
    let mut events = Vec::with_capacity(modifiers.len() * 2 + 2);
    let mut mask = ModifierMask::empty();

    for &modifier in modifiers {
        events.push(key(EventKind::KeyPressed, modifier, mask));
        if let Some(bit) = modifier_bit(modifier) {
            mask = mask.with(bit);
        }
    }

    events.push(key(EventKind::KeyPressed, target, mask));
    events.push(key(EventKind::KeyReleased, target, mask));

    for &modifier in modifiers.iter().rev() {
        events.push(key(EventKind::KeyReleased, modifier, mask));
        if let Some(bit) = modifier_bit(modifier) {
            mask = mask.without(bit);
        }
    }

    events
}

/// Press and release of `button` at `(x, y)`.
pub fn click(button: MouseButton, x: i16, y: i16) -> [Event; 2] {
    let data = MouseData {
        button: Some(button),
        clicks: 1,
        x,
        y,
    };
    let held = ModifierMask::for_button(button).unwrap_or_default();
    [
        Event::new(0, ModifierMask::empty(), EventKind::MousePressed(data)),
        Event::new(0, held, EventKind::MouseReleased(data)),
    ]
}

pub fn move_to(x: i16, y: i16) -> Event {
    Event::new(
        0,
        ModifierMask::empty(),
        EventKind::MouseMoved(MouseData {
            button: None,
            clicks: 0,
            x,
            y,
        }),
    )
}

/// One wheel notch batch. `notches` follows the event convention: positive
/// vertical rotation scrolls down, positive horizontal rotation scrolls right.
pub fn scroll(notches: i16, horizontal: bool) -> Event {
    Event::new(
        0,
        ModifierMask::empty(),
        EventKind::MouseWheel(WheelData {
            clicks: 1,
            x: 0,
            y: 0,
            kind: ScrollKind::Unit,
            amount: 1,
            rotation: notches.saturating_mul(120),
            direction: if horizontal {
                WheelDirection::Horizontal
            } else {
                WheelDirection::Vertical
            },
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use inputhook_core::EventType;

    #[test]
    fn test_plain_key_tap_is_press_then_release() {
        let events = key_chord(&[], KeyCode::KeyA);

        let types: Vec<EventType> = events.iter().map(Event::event_type).collect();
        assert_eq!(types, vec![EventType::KeyPressed, EventType::KeyReleased]);
        assert!(events.iter().all(|e| e.mask.is_empty()));
    }

    #[test]
    fn test_chord_masks_track_held_modifiers() {
        // Arrange / Act
        let events = key_chord(&[KeyCode::ShiftLeft, KeyCode::ControlRight], KeyCode::End);

        // Assert
        let masks: Vec<ModifierMask> = events.iter().map(|e| e.mask).collect();
        let both = ModifierMask::SHIFT_L.with(ModifierMask::CTRL_R);
        assert_eq!(
            masks,
            vec![
                ModifierMask::empty(),
                ModifierMask::SHIFT_L,
                both,
                both,
                both,
                ModifierMask::SHIFT_L,
            ]
        );
        assert_eq!(events[2].keyboard().map(|k| k.keycode), Some(KeyCode::End));
        assert_eq!(
            events[5].keyboard().map(|k| k.keycode),
            Some(KeyCode::ShiftLeft),
            "modifiers are released in reverse order"
        );
    }

    #[test]
    fn test_non_modifier_in_chord_adds_no_mask_bit() {
        let events = key_chord(&[KeyCode::KeyB], KeyCode::KeyA);

        assert!(events.iter().all(|e| e.mask.is_empty()));
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn test_click_release_carries_button_bit() {
        let [press, release] = click(MouseButton::Right, 10, 20);

        assert_eq!(press.event_type(), EventType::MousePressed);
        assert!(press.mask.is_empty());
        assert_eq!(release.mask, ModifierMask::BUTTON2);
        assert_eq!(release.mouse().map(|m| (m.x, m.y)), Some((10, 20)));
    }

    #[test]
    fn test_move_to_has_no_button() {
        let event = move_to(-100, 5);

        assert_eq!(event.mouse().and_then(|m| m.button), None);
        assert_eq!(event.mouse().map(|m| m.x), Some(-100));
    }

    #[test]
    fn test_scroll_rotation_is_notches_times_delta() {
        let down = scroll(2, false);
        let left = scroll(-1, true);

        assert_eq!(down.wheel().map(|w| w.rotation), Some(240));
        assert_eq!(
            left.wheel().map(|w| (w.rotation, w.direction)),
            Some((-120, WheelDirection::Horizontal))
        );
    }
}
