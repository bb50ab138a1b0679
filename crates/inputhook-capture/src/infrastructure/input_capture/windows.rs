//! Windows low-level keyboard and mouse hook backend.
//!
//! `run` installs `WH_KEYBOARD_LL` and `WH_MOUSE_LL` hooks on the calling
//! thread, creates a hidden window that receives display-change broadcasts,
//! and registers an `EVENT_OBJECT_NAMECHANGE` WinEvent hook. Windows can
//! silently drop low-level hooks (for example across secure desktop
//! switches); the name-change notification is used as the cue to reinstall
//! them.
//!
//! Hook procedures are plain `extern "system"` functions with no user
//! pointer, so the running [`HookSession`] is parked in a thread-local for
//! the duration of `run`.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicU32, Ordering};
use std::sync::Arc;

use inputhook_core::Propagation;
use tracing::{debug, error, info, warn};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::SystemInformation::GetTickCount64;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Accessibility::{SetWinEventHook, UnhookWinEvent, HWINEVENTHOOK};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetMessageW, PostMessageW, PostQuitMessage, PostThreadMessageW, RegisterClassExW,
    SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx, EVENT_OBJECT_NAMECHANGE,
    HC_ACTION, HHOOK, KBDLLHOOKSTRUCT, KBDLLHOOKSTRUCT_FLAGS, LLKHF_EXTENDED, MSG,
    MSLLHOOKSTRUCT, WH_KEYBOARD_LL, WH_MOUSE_LL, WINEVENT_OUTOFCONTEXT,
    WINEVENT_SKIPOWNPROCESS, WM_CLOSE, WM_DESTROY, WM_DISPLAYCHANGE, WM_KEYDOWN, WM_KEYUP,
    WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEHWHEEL,
    WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_QUIT, WM_RBUTTONDOWN, WM_RBUTTONUP, WM_SYSKEYDOWN,
    WM_SYSKEYUP, WM_XBUTTONDOWN, WM_XBUTTONUP, WNDCLASSEXW, WS_DISABLED, WS_EX_NOACTIVATE,
};

use super::{HookBackend, HookError, RawInputEvent, RawMouseButton, StopSignal};
use crate::application::session::HookSession;

const WINDOW_CLASS: PCWSTR = w!("inputhook");

/// Everything the hook procedures need, owned by the hook thread.
struct HookThreadState {
    session: HookSession,
    module: HINSTANCE,
    keyboard_hook: Option<HHOOK>,
    mouse_hook: Option<HHOOK>,
    /// Set when a restart could not reinstall the hooks; ends the message loop.
    restart_failure: Option<HookError>,
}

thread_local! {
    static ACTIVE: RefCell<Option<HookThreadState>> = const { RefCell::new(None) };
}

/// Windows implementation of [`HookBackend`].
pub struct WindowsHookBackend {
    signal: Arc<WindowsStopSignal>,
}

impl WindowsHookBackend {
    pub fn new() -> Self {
        Self {
            signal: Arc::new(WindowsStopSignal::default()),
        }
    }
}

impl Default for WindowsHookBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HookBackend for WindowsHookBackend {
    fn run(&mut self, session: HookSession) -> Result<(), HookError> {
        if ACTIVE.with(|cell| cell.borrow().is_some()) {
            return Err(HookError::AlreadyRunning);
        }

        // SAFETY: a null module name returns the handle of the current executable.
        let module = unsafe { GetModuleHandleW(PCWSTR::null()) }
            .map(|handle| HINSTANCE(handle.0))
            .map_err(|e| HookError::ModuleHandleUnavailable(e.to_string()))?;

        let window = create_hidden_window(module)?;
        // The thread has a message queue once a window exists, so the id can
        // be published for PostThreadMessageW.
        // SAFETY: GetCurrentThreadId has no preconditions.
        self.signal
            .thread_id
            .store(unsafe { GetCurrentThreadId() }, Ordering::SeqCst);
        self.signal.window.store(window.0 as isize, Ordering::SeqCst);

        let (keyboard_hook, mouse_hook) = match install_input_hooks(module) {
            Ok(hooks) => hooks,
            Err(e) => {
                // SAFETY: `window` was created on this thread and is still alive.
                unsafe { DestroyWindow(window).ok() };
                self.signal.reset();
                return Err(e);
            }
        };

        // SAFETY: the callback has the WINEVENTPROC signature and lives for the program.
        let win_event_hook = unsafe {
            SetWinEventHook(
                EVENT_OBJECT_NAMECHANGE,
                EVENT_OBJECT_NAMECHANGE,
                None,
                Some(win_event_proc),
                0,
                0,
                WINEVENT_OUTOFCONTEXT | WINEVENT_SKIPOWNPROCESS,
            )
        };
        if win_event_hook.is_invalid() {
            warn!("SetWinEventHook failed, hooks will not be restarted automatically");
        }

        ACTIVE.with(|cell| {
            *cell.borrow_mut() = Some(HookThreadState {
                session,
                module,
                keyboard_hook: Some(keyboard_hook),
                mouse_hook: Some(mouse_hook),
                restart_failure: None,
            });
        });
        let started = ACTIVE.with(|cell| match cell.borrow_mut().as_mut() {
            // SAFETY: GetTickCount64 has no preconditions.
            Some(state) => state.session.start(unsafe { GetTickCount64() }),
            None => Ok(()),
        });

        if started.is_ok() {
            if self.signal.stop_requested.load(Ordering::SeqCst) {
                // SAFETY: posts WM_QUIT to this thread's own queue.
                unsafe { PostQuitMessage(0) };
            }

            let mut msg = MSG::default();
            // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
            unsafe {
                while GetMessageW(&mut msg, None, 0, 0).as_bool() {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
        }

        let state = ACTIVE.with(|cell| cell.borrow_mut().take());
        if !win_event_hook.is_invalid() {
            // SAFETY: the handle came from SetWinEventHook above.
            unsafe {
                let _ = UnhookWinEvent(win_event_hook);
            }
        }
        let mut outcome = started;
        if let Some(mut state) = state {
            unhook(state.keyboard_hook.take());
            unhook(state.mouse_hook.take());
            // SAFETY: GetTickCount64 has no preconditions.
            state.session.stop(unsafe { GetTickCount64() });
            if let Some(failure) = state.restart_failure.take() {
                outcome = Err(failure);
            }
        }
        // SAFETY: destroying an already-destroyed window fails harmlessly.
        unsafe { DestroyWindow(window).ok() };
        self.signal.reset();

        outcome
    }

    fn stop_signal(&self) -> Arc<dyn StopSignal> {
        Arc::clone(&self.signal) as Arc<dyn StopSignal>
    }
}

/// Posts the shutdown messages to the hook thread.
#[derive(Default)]
struct WindowsStopSignal {
    thread_id: AtomicU32,
    window: AtomicIsize,
    stop_requested: AtomicBool,
}

impl WindowsStopSignal {
    fn reset(&self) {
        self.thread_id.store(0, Ordering::SeqCst);
        self.window.store(0, Ordering::SeqCst);
        self.stop_requested.store(false, Ordering::SeqCst);
    }
}

impl StopSignal for WindowsStopSignal {
    fn request_stop(&self) -> Result<(), HookError> {
        self.stop_requested.store(true, Ordering::SeqCst);

        let thread_id = self.thread_id.load(Ordering::SeqCst);
        if thread_id == 0 {
            // Not running yet: `run` checks the flag after starting.
            return Ok(());
        }

        let window = self.window.load(Ordering::SeqCst);
        if window != 0 {
            // SAFETY: posting to a window that no longer exists fails without side effects.
            unsafe {
                let _ = PostMessageW(
                    Some(HWND(window as *mut _)),
                    WM_CLOSE,
                    WPARAM(0),
                    LPARAM(0),
                );
            }
        }

        // SAFETY: PostThreadMessageW only enqueues a message.
        unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }
            .map_err(|e| HookError::SignalFailed(e.to_string()))
    }
}

fn install_input_hooks(module: HINSTANCE) -> Result<(HHOOK, HHOOK), HookError> {
    // SAFETY: both procedures have the HOOKPROC signature and live for the program;
    // the calling thread pumps messages for as long as the hooks are installed.
    let keyboard = unsafe {
        SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), Some(module), 0)
    }
    .map_err(|e| HookError::HookSetupFailed(format!("WH_KEYBOARD_LL: {e}")))?;

    // SAFETY: as above.
    let mouse = unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), Some(module), 0) };
    match mouse {
        Ok(mouse) => {
            debug!("low-level hooks installed");
            Ok((keyboard, mouse))
        }
        Err(e) => {
            unhook(Some(keyboard));
            Err(HookError::HookSetupFailed(format!("WH_MOUSE_LL: {e}")))
        }
    }
}

fn unhook(hook: Option<HHOOK>) {
    if let Some(hook) = hook {
        // SAFETY: the handle came from SetWindowsHookExW and is unhooked at most once.
        if let Err(e) = unsafe { UnhookWindowsHookEx(hook) } {
            warn!("UnhookWindowsHookEx failed: {e}");
        }
    }
}

fn create_hidden_window(module: HINSTANCE) -> Result<HWND, HookError> {
    let class = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        lpfnWndProc: Some(window_proc),
        hInstance: module,
        lpszClassName: WINDOW_CLASS,
        ..Default::default()
    };
    // SAFETY: `class` is fully initialised; registering an existing class fails
    // harmlessly and CreateWindowExW below still finds it.
    unsafe { RegisterClassExW(&class) };

    // SAFETY: the class was registered above with this module handle.
    unsafe {
        CreateWindowExW(
            WS_EX_NOACTIVATE,
            WINDOW_CLASS,
            w!("inputhook display monitor"),
            WS_DISABLED,
            0,
            0,
            1,
            1,
            None,
            None,
            Some(module),
            None,
        )
    }
    .map_err(|e| HookError::WindowCreationFailed(e.to_string()))
}

/// Window procedure of the hidden window.
///
/// # Safety
///
/// Called by Windows on the hook thread while dispatching messages.
unsafe extern "system" fn window_proc(
    hwnd: HWND,
    message: u32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    match message {
        WM_CLOSE => {
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }
        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }
        WM_DISPLAYCHANGE => {
            info!("display configuration changed");
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, message, w_param, l_param),
    }
}

/// Runs `raw` through the parked session.
fn deliver(raw: RawInputEvent) -> Propagation {
    ACTIVE.with(|cell| match cell.try_borrow_mut() {
        Ok(mut guard) => guard
            .as_mut()
            .map(|state| state.session.handle(&raw))
            .unwrap_or_default(),
        Err(_) => {
            // The consumer pumped messages from inside its callback.
            warn!("re-entrant hook callback passed through");
            Propagation::Pass
        }
    })
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// Called by Windows from the hook thread. `l_param` points to a
/// `KBDLLHOOKSTRUCT` when `n_code == HC_ACTION`.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code != HC_ACTION as i32 {
        return CallNextHookEx(None, n_code, w_param, l_param);
    }

    // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
    let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
    let virtual_key = kbs.vkCode as u16;
    let scan_code = kbs.scanCode as u16;
    let time_ms = u64::from(kbs.time);
    let extended = (kbs.flags & LLKHF_EXTENDED) != KBDLLHOOKSTRUCT_FLAGS(0);

    let raw = match w_param.0 as u32 {
        WM_KEYDOWN | WM_SYSKEYDOWN => RawInputEvent::KeyDown {
            virtual_key,
            scan_code,
            time_ms,
            extended,
        },
        WM_KEYUP | WM_SYSKEYUP => RawInputEvent::KeyUp {
            virtual_key,
            scan_code,
            time_ms,
            extended,
        },
        message => RawInputEvent::Unrecognized { message, time_ms },
    };

    if deliver(raw).is_consumed() {
        return LRESULT(1);
    }
    CallNextHookEx(None, n_code, w_param, l_param)
}

/// Low-level mouse hook callback.
///
/// # Safety
///
/// Called by Windows from the hook thread. `l_param` points to a
/// `MSLLHOOKSTRUCT` when `n_code == HC_ACTION`.
unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code != HC_ACTION as i32 {
        return CallNextHookEx(None, n_code, w_param, l_param);
    }

    // SAFETY: l_param points to a MSLLHOOKSTRUCT when n_code == HC_ACTION.
    let mhs = &*(l_param.0 as *const MSLLHOOKSTRUCT);
    let x = mhs.pt.x;
    let y = mhs.pt.y;
    let time_ms = u64::from(mhs.time);
    let high_word = (mhs.mouseData >> 16) as u16;

    let raw = match w_param.0 as u32 {
        WM_MOUSEMOVE => RawInputEvent::MouseMove { x, y, time_ms },
        WM_LBUTTONDOWN => button_down(RawMouseButton::Left, x, y, time_ms),
        WM_LBUTTONUP => button_up(RawMouseButton::Left, x, y, time_ms),
        WM_RBUTTONDOWN => button_down(RawMouseButton::Right, x, y, time_ms),
        WM_RBUTTONUP => button_up(RawMouseButton::Right, x, y, time_ms),
        WM_MBUTTONDOWN => button_down(RawMouseButton::Middle, x, y, time_ms),
        WM_MBUTTONUP => button_up(RawMouseButton::Middle, x, y, time_ms),
        WM_XBUTTONDOWN => button_down(RawMouseButton::X(high_word), x, y, time_ms),
        WM_XBUTTONUP => button_up(RawMouseButton::X(high_word), x, y, time_ms),
        WM_MOUSEWHEEL => RawInputEvent::MouseWheel {
            delta: high_word as i16,
            x,
            y,
            time_ms,
        },
        WM_MOUSEHWHEEL => RawInputEvent::MouseWheelH {
            delta: high_word as i16,
            x,
            y,
            time_ms,
        },
        message => RawInputEvent::Unrecognized { message, time_ms },
    };

    if deliver(raw).is_consumed() {
        return LRESULT(1);
    }
    CallNextHookEx(None, n_code, w_param, l_param)
}

fn button_down(button: RawMouseButton, x: i32, y: i32, time_ms: u64) -> RawInputEvent {
    RawInputEvent::MouseButtonDown {
        button,
        x,
        y,
        time_ms,
    }
}

fn button_up(button: RawMouseButton, x: i32, y: i32, time_ms: u64) -> RawInputEvent {
    RawInputEvent::MouseButtonUp {
        button,
        x,
        y,
        time_ms,
    }
}

/// WinEvent callback: reinstalls the low-level hooks on a name change.
///
/// # Safety
///
/// Called by Windows on the hook thread while it pumps messages.
unsafe extern "system" fn win_event_proc(
    _hook: HWINEVENTHOOK,
    event: u32,
    _hwnd: HWND,
    _id_object: i32,
    _id_child: i32,
    _event_thread: u32,
    _event_time: u32,
) {
    if event != EVENT_OBJECT_NAMECHANGE {
        debug!("unhandled window event {event:#X}");
        return;
    }

    ACTIVE.with(|cell| {
        let Ok(mut guard) = cell.try_borrow_mut() else {
            warn!("hook restart skipped during a running callback");
            return;
        };
        let Some(state) = guard.as_mut() else {
            return;
        };

        state.session.begin_restart();
        unhook(state.keyboard_hook.take());
        unhook(state.mouse_hook.take());
        match install_input_hooks(state.module) {
            Ok((keyboard, mouse)) => {
                state.keyboard_hook = Some(keyboard);
                state.mouse_hook = Some(mouse);
                state.session.finish_restart();
            }
            Err(e) => {
                // The session stays in Restarting; `run` stops it, which still
                // dispatches HookDisabled, and reports the failure.
                error!("failed to reinstall hooks: {e}");
                state.restart_failure = Some(e);
                // SAFETY: posts WM_QUIT to this thread's own queue.
                unsafe { PostQuitMessage(0) };
            }
        }
    });
}
