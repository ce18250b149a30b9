//! Injector that only logs what it would do.

use irbridge_core::{InjectionError, InputInjector, MouseButton};
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunInjector;

impl DryRunInjector {
    pub fn new() -> Self {
        Self
    }
}

impl InputInjector for DryRunInjector {
    fn press_key(&self, key: u16) -> Result<(), InjectionError> {
        info!(key = format_args!("0x{key:02X}"), "dry run: key down");
        Ok(())
    }

    fn release_key(&self, key: u16) -> Result<(), InjectionError> {
        info!(key = format_args!("0x{key:02X}"), "dry run: key up");
        Ok(())
    }

    fn press_mouse_button(&self, button: MouseButton) -> Result<(), InjectionError> {
        info!(?button, "dry run: mouse button down");
        Ok(())
    }

    fn release_mouse_button(&self, button: MouseButton) -> Result<(), InjectionError> {
        info!(?button, "dry run: mouse button up");
        Ok(())
    }

    fn move_mouse_by(&self, dx: i32, dy: i32) -> Result<(), InjectionError> {
        info!(dx, dy, "dry run: mouse move");
        Ok(())
    }

    fn scroll_wheel(&self, ticks: i32) -> Result<(), InjectionError> {
        info!(ticks, "dry run: wheel scroll");
        Ok(())
    }
}
