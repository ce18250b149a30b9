//! The input injection capability a bound action executes against.
//!
//! Each supported OS provides an implementation in the host's infrastructure
//! layer.  Key codes are Windows virtual-key codes (see [`crate::keymap`]);
//! adapters for other platforms translate them at the boundary.

use thiserror::Error;

/// Error type for input injection operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InjectionError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("invalid key code: {0}")]
    InvalidKeyCode(u16),
}

/// Mouse buttons an action can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

/// Platform-agnostic key and mouse injection.
///
/// Implementations must not block for long: actions run on the serial
/// reader thread.
#[cfg_attr(test, mockall::automock)]
pub trait InputInjector: Send + Sync {
    /// Presses (key-down) a virtual key.
    fn press_key(&self, key: u16) -> Result<(), InjectionError>;

    /// Releases (key-up) a virtual key.
    fn release_key(&self, key: u16) -> Result<(), InjectionError>;

    fn press_mouse_button(&self, button: MouseButton) -> Result<(), InjectionError>;

    fn release_mouse_button(&self, button: MouseButton) -> Result<(), InjectionError>;

    /// Moves the pointer relative to its current position.
    fn move_mouse_by(&self, dx: i32, dy: i32) -> Result<(), InjectionError>;

    /// Scrolls the vertical wheel by whole notches; positive is away from the user.
    fn scroll_wheel(&self, ticks: i32) -> Result<(), InjectionError>;
}
