//! Recording injector for unit and integration tests.
//!
//! The real injectors move the cursor and press keys on the machine running
//! the tests.  `RecordingInjector` pushes each call into a `Mutex<Vec<...>>`
//! instead, so assertions can check exactly what was injected and in what
//! order.
//!
//! ```ignore
//! let injector = Arc::new(RecordingInjector::new());
//! let dispatcher = ButtonDispatcher::new(bindings, injector.clone());
//!
//! dispatcher.on_button_pressed("FF30CF");
//!
//! assert_eq!(injector.events(), [InjectedEvent::MouseMove { dx: 12, dy: -5 }]);
//! ```
//!
//! Set `should_fail` to make every call return `InjectionError::Platform`.

use std::sync::Mutex;

use irbridge_core::{InjectionError, InputInjector, MouseButton};

/// One recorded injector call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedEvent {
    KeyDown(u16),
    KeyUp(u16),
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    MouseMove { dx: i32, dy: i32 },
    Scroll(i32),
}

/// An injector that records every call without touching the OS.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    events: Mutex<Vec<InjectedEvent>>,
    /// When `true`, every method returns an error and records nothing.
    pub should_fail: bool,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of the calls recorded so far.
    pub fn events(&self) -> Vec<InjectedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: InjectedEvent) -> Result<(), InjectionError> {
        if self.should_fail {
            return Err(InjectionError::Platform("mock failure".into()));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

impl InputInjector for RecordingInjector {
    fn press_key(&self, key: u16) -> Result<(), InjectionError> {
        self.record(InjectedEvent::KeyDown(key))
    }

    fn release_key(&self, key: u16) -> Result<(), InjectionError> {
        self.record(InjectedEvent::KeyUp(key))
    }

    fn press_mouse_button(&self, button: MouseButton) -> Result<(), InjectionError> {
        self.record(InjectedEvent::ButtonDown(button))
    }

    fn release_mouse_button(&self, button: MouseButton) -> Result<(), InjectionError> {
        self.record(InjectedEvent::ButtonUp(button))
    }

    fn move_mouse_by(&self, dx: i32, dy: i32) -> Result<(), InjectionError> {
        self.record(InjectedEvent::MouseMove { dx, dy })
    }

    fn scroll_wheel(&self, ticks: i32) -> Result<(), InjectionError> {
        self.record(InjectedEvent::Scroll(ticks))
    }
}
