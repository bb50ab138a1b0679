//! Integration tests for the capture pipeline.
//!
//! These tests drive a `HookSession` through the channel-fed mock backend the
//! same way the Windows hook thread does: raw events in, verdicts out.

use std::sync::{Arc, Mutex};
use std::thread;

use inputhook_capture::infrastructure::input_capture::mock::{MockHookBackend, MockSignal};
use inputhook_capture::{
    native_key_lookup, HookBackend, HookSession, RawInputEvent, RawMouseButton, SessionOptions,
};
use inputhook_core::keymap::windows_vk::vk;
use inputhook_core::{Event, EventType, FixedProperties, KeyCode, ModifierMask, Propagation};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn session(properties: FixedProperties) -> HookSession {
    HookSession::new(
        native_key_lookup(),
        Arc::new(properties),
        SessionOptions::default(),
    )
}

fn record_into(session: &mut HookSession, consume: fn(&Event) -> bool) -> Arc<Mutex<Vec<Event>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    session.set_dispatcher(move |event| {
        sink.lock().unwrap().push(event);
        if consume(&event) {
            Propagation::Consume
        } else {
            Propagation::Pass
        }
    });
    events
}

fn key(virtual_key: u16, down: bool, time_ms: u64) -> RawInputEvent {
    if down {
        RawInputEvent::KeyDown {
            virtual_key,
            scan_code: 0,
            time_ms,
            extended: false,
        }
    } else {
        RawInputEvent::KeyUp {
            virtual_key,
            scan_code: 0,
            time_ms,
            extended: false,
        }
    }
}

fn types(events: &Arc<Mutex<Vec<Event>>>) -> Vec<EventType> {
    events.lock().unwrap().iter().map(Event::event_type).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_consumed_escape_is_suppressed_and_other_keys_pass() {
    // Arrange
    let mut backend = MockHookBackend::new();
    let mut session = session(FixedProperties::default());
    let _events = record_into(&mut session, |e| {
        e.keyboard()
            .is_some_and(|k| k.keycode == KeyCode::Escape)
    });
    backend.inject_event(key(vk::ESCAPE, true, 10));
    backend.inject_event(key(vk::ESCAPE, false, 20));
    backend.inject_event(key(0x41, true, 30));
    backend.stop_signal().request_stop().unwrap();

    // Act
    backend.run(session).expect("mock run succeeds");

    // Assert
    assert_eq!(
        backend.verdicts(),
        vec![Propagation::Consume, Propagation::Consume, Propagation::Pass]
    );
}

#[test]
fn test_triple_click_then_drag_sequence() {
    // Arrange
    let mut backend = MockHookBackend::new();
    let mut session = session(FixedProperties::default().with_multi_click_time(300));
    let events = record_into(&mut session, |_| false);
    for t in [1_000u64, 1_100, 1_200] {
        backend.inject_event(RawInputEvent::MouseButtonDown {
            button: RawMouseButton::Left,
            x: 50,
            y: 60,
            time_ms: t,
        });
        backend.inject_event(RawInputEvent::MouseButtonUp {
            button: RawMouseButton::Left,
            x: 50,
            y: 60,
            time_ms: t + 20,
        });
    }
    backend.inject_event(RawInputEvent::MouseButtonDown {
        button: RawMouseButton::Left,
        x: 50,
        y: 60,
        time_ms: 2_000,
    });
    backend.inject_event(RawInputEvent::MouseMove {
        x: 80,
        y: 60,
        time_ms: 2_010,
    });
    backend.stop_signal().request_stop().unwrap();

    // Act
    backend.run(session).unwrap();

    // Assert
    let events = events.lock().unwrap();
    let clicks: Vec<u16> = events
        .iter()
        .filter(|e| e.event_type() == EventType::MouseClicked)
        .map(|e| e.mouse().unwrap().clicks)
        .collect();
    assert_eq!(clicks, vec![1, 2, 3]);

    let second_cycle: Vec<(EventType, u16)> = events
        .iter()
        .filter(|e| (1_100..=1_120).contains(&e.time))
        .filter_map(|e| e.mouse().map(|m| (e.event_type(), m.clicks)))
        .collect();
    assert_eq!(
        second_cycle,
        vec![
            (EventType::MousePressed, 2),
            (EventType::MouseReleased, 2),
            (EventType::MouseClicked, 2),
        ]
    );

    let dragged = events
        .iter()
        .find(|e| e.event_type() == EventType::MouseDragged)
        .expect("motion with the button held is a drag");
    assert!(dragged.mask.contains(ModifierMask::BUTTON1));
    assert_eq!(dragged.mouse().unwrap().clicks, 1, "streak restarted after the pause");
}

#[test]
fn test_restart_rereads_modifiers_without_dispatching_key_events() {
    // Arrange
    let mut backend = MockHookBackend::new();
    let mut session = session(FixedProperties::default().with_keys_down(&[vk::RSHIFT]));
    let events = record_into(&mut session, |_| false);
    backend.inject_event(key(vk::LCONTROL, true, 5));
    backend.inject_restart();
    backend.inject_event(key(0x42, true, 15));
    backend.stop_signal().request_stop().unwrap();

    // Act
    backend.run(session).unwrap();

    // Assert
    let events = events.lock().unwrap();
    let pressed_b = events
        .iter()
        .find(|e| {
            e.keyboard()
                .is_some_and(|k| k.keycode == KeyCode::KeyB)
        })
        .unwrap();
    assert_eq!(
        pressed_b.mask,
        ModifierMask::SHIFT_R,
        "the live state replaced the tracked control key"
    );
    assert_eq!(
        events
            .iter()
            .filter(|e| e.event_type() == EventType::KeyReleased)
            .count(),
        0
    );
}

#[test]
fn test_consumer_can_stop_the_hook_from_inside_its_callback() {
    // Arrange
    let mut backend = MockHookBackend::new();
    let stop = backend.stop_signal();
    let mut session = HookSession::new(
        native_key_lookup(),
        Arc::new(FixedProperties::default()),
        SessionOptions::default(),
    );
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    session.set_dispatcher(move |event| {
        sink.lock().unwrap().push(event.event_type());
        if event
            .keyboard()
            .is_some_and(|k| k.keycode == KeyCode::Escape)
        {
            stop.request_stop().expect("stop from callback");
        }
        Propagation::Pass
    });
    let injector = backend.injector();

    // Act
    let feeder = thread::spawn(move || {
        injector
            .send(MockSignal::Input(key(vk::ESCAPE, true, 1)))
            .unwrap();
    });
    feeder.join().unwrap();
    backend.run(session).unwrap();

    // Assert
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            EventType::HookEnabled,
            EventType::KeyPressed,
            EventType::KeyTyped,
            EventType::HookDisabled
        ]
    );
}

#[test]
fn test_session_without_dispatcher_passes_everything() {
    let mut backend = MockHookBackend::new();
    let session = session(FixedProperties::default());
    backend.inject_event(key(0x41, true, 1));
    backend.inject_event(RawInputEvent::MouseWheel {
        delta: 120,
        x: 0,
        y: 0,
        time_ms: 2,
    });
    backend.stop_signal().request_stop().unwrap();

    backend.run(session).unwrap();

    assert_eq!(backend.verdicts(), vec![Propagation::Pass, Propagation::Pass]);
}

#[test]
fn test_hook_lifecycle_events_carry_empty_masks() {
    let mut backend = MockHookBackend::new().with_start_time(3);
    let mut session = session(FixedProperties::default().with_keys_down(&[vk::LSHIFT]));
    let events = record_into(&mut session, |_| false);
    backend.stop_signal().request_stop().unwrap();

    backend.run(session).unwrap();

    assert_eq!(
        types(&events),
        vec![EventType::HookEnabled, EventType::HookDisabled]
    );
    assert!(events.lock().unwrap().iter().all(|e| e.mask.is_empty()));
}
