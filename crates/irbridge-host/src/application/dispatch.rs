//! ButtonDispatcher: executes the bound action for each button press.
//!
//! # Debounce
//!
//! IR remotes repeat a held button's code every ~100 ms.  The dispatcher
//! remembers the *last* code it executed and when; a press is skipped only if
//! it repeats that same code within the binding's minimum re-fire interval.
//! Any other code resets the window, so alternating two buttons quickly never
//! debounces either of them.
//!
//! The last-fired state is updated only when an action actually executes.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use irbridge_core::{BindingStore, InputInjector};
use tracing::{debug, trace, warn};

use crate::infrastructure::serial::ButtonListener;

/// What happened to one button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The bound action ran.
    Executed,
    /// No binding exists for the code.
    Unbound,
    /// Same code as the last press, inside its minimum interval.
    Debounced,
    /// The action was found but the injector rejected it.
    Failed,
}

/// Button-press listener that looks up and executes bindings.
pub struct ButtonDispatcher {
    bindings: Arc<RwLock<BindingStore>>,
    injector: Arc<dyn InputInjector>,
    last: Mutex<Option<(String, Instant)>>,
}

impl ButtonDispatcher {
    pub fn new(bindings: Arc<RwLock<BindingStore>>, injector: Arc<dyn InputInjector>) -> Self {
        Self {
            bindings,
            injector,
            last: Mutex::new(None),
        }
    }

    /// Handles a press of `code` as if it arrived at `now`.
    pub fn handle_press_at(&self, code: &str, now: Instant) -> DispatchOutcome {
        let store = self.bindings.read().unwrap_or_else(PoisonError::into_inner);
        let Some(binding) = store.find_by_code(code) else {
            debug!(code, "no binding for button");
            return DispatchOutcome::Unbound;
        };

        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((last_code, fired_at)) = last.as_ref() {
            if last_code == code
                && now.saturating_duration_since(*fired_at) < binding.min_refire_interval()
            {
                trace!(code, "press debounced");
                return DispatchOutcome::Debounced;
            }
        }

        match binding.execute(self.injector.as_ref()) {
            Ok(()) => {
                debug!(code, action = %binding.action(), "action executed");
                *last = Some((code.to_string(), now));
                DispatchOutcome::Executed
            }
            Err(e) => {
                warn!(code, error = %e, "action failed");
                DispatchOutcome::Failed
            }
        }
    }
}

impl ButtonListener for ButtonDispatcher {
    fn on_button_pressed(&self, code: &str) {
        self.handle_press_at(code, Instant::now());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::input_injection::{InjectedEvent, RecordingInjector};
    use irbridge_core::{Action, BoundAction, ClickButtons, MouseButton};
    use std::time::Duration;

    fn dispatcher_with(
        bindings: Vec<BoundAction>,
        injector: Arc<RecordingInjector>,
    ) -> ButtonDispatcher {
        let mut store = BindingStore::new();
        for binding in bindings {
            store.add(binding);
        }
        ButtonDispatcher::new(Arc::new(RwLock::new(store)), injector)
    }

    fn click(code: &str) -> BoundAction {
        BoundAction::new(
            code,
            Action::MouseClick {
                buttons: ClickButtons::Left,
            },
        )
    }

    #[test]
    fn test_bound_code_executes_action() {
        // Arrange
        let injector = Arc::new(RecordingInjector::new());
        let dispatcher = dispatcher_with(
            vec![BoundAction::new("FF30CF", Action::MouseMove { dx: 12, dy: -5 })],
            Arc::clone(&injector),
        );

        // Act
        let outcome = dispatcher.handle_press_at("FF30CF", Instant::now());

        // Assert
        assert_eq!(outcome, DispatchOutcome::Executed);
        assert_eq!(injector.events(), [InjectedEvent::MouseMove { dx: 12, dy: -5 }]);
    }

    #[test]
    fn test_unbound_code_injects_nothing() {
        let injector = Arc::new(RecordingInjector::new());
        let dispatcher = dispatcher_with(vec![], Arc::clone(&injector));

        assert_eq!(
            dispatcher.handle_press_at("nope", Instant::now()),
            DispatchOutcome::Unbound
        );
        assert!(injector.events().is_empty());
    }

    #[test]
    fn test_same_code_within_interval_is_debounced() {
        // Arrange: clicks default to a 300 ms re-fire interval
        let injector = Arc::new(RecordingInjector::new());
        let dispatcher = dispatcher_with(vec![click("A")], Arc::clone(&injector));
        let t0 = Instant::now();

        // Act
        let first = dispatcher.handle_press_at("A", t0);
        let second = dispatcher.handle_press_at("A", t0 + Duration::from_millis(100));

        // Assert
        assert_eq!(first, DispatchOutcome::Executed);
        assert_eq!(second, DispatchOutcome::Debounced);
        assert_eq!(
            injector.events(),
            [
                InjectedEvent::ButtonDown(MouseButton::Left),
                InjectedEvent::ButtonUp(MouseButton::Left)
            ]
        );
    }

    #[test]
    fn test_same_code_after_interval_fires_again() {
        let injector = Arc::new(RecordingInjector::new());
        let dispatcher = dispatcher_with(vec![click("A")], Arc::clone(&injector));
        let t0 = Instant::now();

        dispatcher.handle_press_at("A", t0);
        let again = dispatcher.handle_press_at("A", t0 + Duration::from_millis(300));

        assert_eq!(again, DispatchOutcome::Executed);
        assert_eq!(injector.events().len(), 4);
    }

    #[test]
    fn test_different_codes_are_never_debounced_against_each_other() {
        // Arrange
        let injector = Arc::new(RecordingInjector::new());
        let dispatcher = dispatcher_with(vec![click("A"), click("B")], Arc::clone(&injector));
        let t0 = Instant::now();
        let ms = Duration::from_millis;

        // Act: A, B, A all within 300 ms of each other
        let outcomes = [
            dispatcher.handle_press_at("A", t0),
            dispatcher.handle_press_at("B", t0 + ms(50)),
            dispatcher.handle_press_at("A", t0 + ms(100)),
        ];

        // Assert: the last code is global, so B resets A's window
        assert_eq!(outcomes, [DispatchOutcome::Executed; 3]);
    }

    #[test]
    fn test_zero_interval_never_debounces() {
        let injector = Arc::new(RecordingInjector::new());
        let dispatcher = dispatcher_with(
            vec![BoundAction::new("W", Action::WheelScroll { ticks: 1 })],
            Arc::clone(&injector),
        );
        let t0 = Instant::now();

        dispatcher.handle_press_at("W", t0);
        let repeat = dispatcher.handle_press_at("W", t0);

        assert_eq!(repeat, DispatchOutcome::Executed);
        assert_eq!(injector.events(), [InjectedEvent::Scroll(1); 2]);
    }

    #[test]
    fn test_failed_action_does_not_start_debounce_window() {
        // Arrange
        let dispatcher = ButtonDispatcher::new(
            Arc::new(RwLock::new({
                let mut store = BindingStore::new();
                store.add(click("A"));
                store
            })),
            Arc::new(RecordingInjector::failing()),
        );
        let t0 = Instant::now();

        // Act
        let first = dispatcher.handle_press_at("A", t0);
        let second = dispatcher.handle_press_at("A", t0 + Duration::from_millis(10));

        // Assert: still Failed, not Debounced
        assert_eq!(first, DispatchOutcome::Failed);
        assert_eq!(second, DispatchOutcome::Failed);
    }

    #[test]
    fn test_rebinding_is_seen_by_the_next_press() {
        // Arrange
        let injector = Arc::new(RecordingInjector::new());
        let bindings = Arc::new(RwLock::new(BindingStore::new()));
        let dispatcher = ButtonDispatcher::new(Arc::clone(&bindings), injector.clone());
        assert_eq!(
            dispatcher.handle_press_at("K", Instant::now()),
            DispatchOutcome::Unbound
        );

        // Act
        bindings
            .write()
            .unwrap()
            .add(BoundAction::new("K", Action::KeyPress { key: 0x4B }));

        // Assert
        assert_eq!(
            dispatcher.handle_press_at("K", Instant::now()),
            DispatchOutcome::Executed
        );
        assert_eq!(
            injector.events(),
            [InjectedEvent::KeyDown(0x4B), InjectedEvent::KeyUp(0x4B)]
        );
    }
}
