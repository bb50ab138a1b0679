//! One-line textual rendering of events for the `listen` command.
//!
//! ```text
//! id=4,when=1200,mask=0x1,keycode=KeyA,rawcode=0x41
//! id=3,when=1210,mask=0x0,keychar='a',rawcode=0x41
//! id=7,when=1300,mask=0x100,x=10,y=20,button=1,clicks=1
//! id=11,when=1400,mask=0x0,type=1,amount=3,rotation=-120,direction=3
//! ```

use std::fmt::Write;

use inputhook_core::{Event, EventKind};

/// Renders `event` as a comma-separated `key=value` line.
pub fn format_event(event: &Event) -> String {
    let mut line = format!(
        "id={},when={},mask={:#x}",
        event.event_type().id(),
        event.time,
        event.mask
    );

    // Writing into a String cannot fail.
    let _ = match event.kind {
        EventKind::KeyPressed(key) | EventKind::KeyReleased(key) => {
            write!(line, ",keycode={},rawcode={:#X}", key.keycode, key.rawcode)
        }
        EventKind::KeyTyped(key) => write!(
            line,
            ",keychar={:?},rawcode={:#X}",
            key.keychar.unwrap_or('\u{fffd}'),
            key.rawcode
        ),
        EventKind::MousePressed(mouse)
        | EventKind::MouseReleased(mouse)
        | EventKind::MouseClicked(mouse)
        | EventKind::MouseMoved(mouse)
        | EventKind::MouseDragged(mouse) => write!(
            line,
            ",x={},y={},button={},clicks={}",
            mouse.x,
            mouse.y,
            mouse.button.map_or(0, |b| b.number()),
            mouse.clicks
        ),
        EventKind::MouseWheel(wheel) => write!(
            line,
            ",type={},amount={},rotation={},direction={}",
            wheel.kind as u8, wheel.amount, wheel.rotation, wheel.direction as u8
        ),
        EventKind::HookEnabled | EventKind::HookDisabled => Ok(()),
    };

    line
}
