//! Windows input injection via the SendInput API.
//!
//! Key codes are already Windows virtual-key codes, so they pass straight
//! through.  Mouse moves are relative (no `MOUSEEVENTF_ABSOLUTE`), and one
//! wheel tick is one `WHEEL_DELTA`.

#![cfg(target_os = "windows")]

use irbridge_core::{InjectionError, InputInjector, MouseButton};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_MOVE, MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_WHEEL,
    MOUSEINPUT, MOUSE_EVENT_FLAGS, VIRTUAL_KEY,
};

/// One notch of the mouse wheel.
const WHEEL_DELTA: i32 = 120;

/// Keys that need `KEYEVENTF_EXTENDEDKEY` to be told apart from their numpad twins.
const EXTENDED_KEYS: &[u16] = &[
    0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, // navigation cluster
    0x2D, 0x2E, // Insert, Delete
    0x5B, 0x5C, 0x5D, // Windows keys, context menu
    0x6F, // NumPad /
    0x90, // Num Lock
    0xA3, 0xA5, // Right Ctrl, Right Alt
];

/// [`InputInjector`] backed by `SendInput`.
#[derive(Debug, Default)]
pub struct WindowsInjector;

impl WindowsInjector {
    pub fn new() -> Self {
        Self
    }
}

impl InputInjector for WindowsInjector {
    fn press_key(&self, key: u16) -> Result<(), InjectionError> {
        send_key(key, false)
    }

    fn release_key(&self, key: u16) -> Result<(), InjectionError> {
        send_key(key, true)
    }

    fn press_mouse_button(&self, button: MouseButton) -> Result<(), InjectionError> {
        let flags = match button {
            MouseButton::Left => MOUSEEVENTF_LEFTDOWN,
            MouseButton::Right => MOUSEEVENTF_RIGHTDOWN,
        };
        send_mouse(0, 0, 0, flags)
    }

    fn release_mouse_button(&self, button: MouseButton) -> Result<(), InjectionError> {
        let flags = match button {
            MouseButton::Left => MOUSEEVENTF_LEFTUP,
            MouseButton::Right => MOUSEEVENTF_RIGHTUP,
        };
        send_mouse(0, 0, 0, flags)
    }

    fn move_mouse_by(&self, dx: i32, dy: i32) -> Result<(), InjectionError> {
        send_mouse(dx, dy, 0, MOUSEEVENTF_MOVE)
    }

    fn scroll_wheel(&self, ticks: i32) -> Result<(), InjectionError> {
        let delta = wheel_delta(ticks)?;
        // mouseData carries the signed delta reinterpreted as a DWORD.
        send_mouse(0, 0, delta as u32, MOUSEEVENTF_WHEEL)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn wheel_delta(ticks: i32) -> Result<i32, InjectionError> {
    ticks
        .checked_mul(WHEEL_DELTA)
        .ok_or_else(|| InjectionError::Platform(format!("scroll of {ticks} notches overflows")))
}

fn send_key(key: u16, key_up: bool) -> Result<(), InjectionError> {
    if key == 0 || key > 0xFE {
        return Err(InjectionError::InvalidKeyCode(key));
    }

    let mut flags = KEYBD_EVENT_FLAGS(0);
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    if EXTENDED_KEYS.contains(&key) {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }

    let input = INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(key),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };
    send(input)
}

fn send_mouse(
    dx: i32,
    dy: i32,
    mouse_data: u32,
    flags: MOUSE_EVENT_FLAGS,
) -> Result<(), InjectionError> {
    let input = INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                mouseData: mouse_data,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };
    send(input)
}

fn send(input: INPUT) -> Result<(), InjectionError> {
    // SAFETY: `input` is a fully initialised INPUT structure on the stack and
    // the size argument matches its type.
    let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
    if sent == 1 {
        Ok(())
    } else {
        Err(InjectionError::Platform(
            "SendInput rejected the event (blocked by UIPI or another desktop)".into(),
        ))
    }
}
