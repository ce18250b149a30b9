//! Interactive construction of a [`BoundAction`].
//!
//! The user first picks an action kind from a numbered menu, then answers the
//! prompts for that kind:
//!
//! | Kind        | Prompts                                         |
//! |-------------|-------------------------------------------------|
//! | KeyPress    | key name, minimum re-fire interval (blank = 0)  |
//! | MouseClick  | button: 1 = left, 2 = right, 3 = both           |
//! | MouseMove   | horizontal offset, vertical offset              |
//! | WheelScroll | ticks                                           |
//! | KeyCombo    | number of keys, then one key name per key       |
//!
//! An empty answer (or closed input) at any prompt cancels the whole setup
//! with [`BindingError::ConstructionCancelled`].  A numeric prompt that gets
//! something else asks again.  Key-name prompts accept `list` to print every
//! known name.

use std::str::FromStr;
use std::time::Duration;

use irbridge_core::{Action, ActionKind, BindingError, BoundAction, ClickButtons, KeyNameResolver};

/// Answer that prints the key-name table instead of naming a key.
const LIST_KEYWORD: &str = "list";

/// Line-oriented user dialogue.
pub trait Prompter {
    /// Shows `question` and returns the trimmed answer, or `None` when the
    /// input is closed.
    fn ask(&mut self, question: &str) -> Option<String>;

    /// Shows an informational line.
    fn say(&mut self, message: &str);
}

/// Asks the user what `code` should do and returns the new binding.
///
/// # Errors
///
/// - [`BindingError::ConstructionCancelled`] if any prompt is left blank.
/// - [`BindingError::UnknownKeyName`] if a key name cannot be resolved.
/// - [`BindingError::InvalidParameters`] if the answers do not form a valid
///   action (for example a key code of zero).
pub fn configure_binding(
    code: &str,
    prompter: &mut dyn Prompter,
    keys: &dyn KeyNameResolver,
) -> Result<BoundAction, BindingError> {
    let kind = ask_kind(prompter)?;

    let binding = match kind {
        ActionKind::KeyPress => {
            let key = ask_key(prompter, keys, "Key name (\"list\" shows all):")?;
            let interval = ask_interval(prompter)?;
            BoundAction::new(code, Action::KeyPress { key }).with_min_refire_interval(interval)
        }
        ActionKind::MouseClick => {
            let buttons = loop {
                let selector: i64 = ask_number(prompter, "Button (1 = left, 2 = right, 3 = both):")?;
                match ClickButtons::from_selector(selector) {
                    Some(buttons) => break buttons,
                    None => prompter.say("Enter 1, 2 or 3."),
                }
            };
            BoundAction::new(code, Action::MouseClick { buttons })
        }
        ActionKind::MouseMove => {
            let dx = ask_number(prompter, "Horizontal offset in pixels (negative = left):")?;
            let dy = ask_number(prompter, "Vertical offset in pixels (negative = up):")?;
            BoundAction::new(code, Action::MouseMove { dx, dy })
        }
        ActionKind::WheelScroll => {
            let ticks = ask_number(prompter, "Wheel ticks (negative = towards you):")?;
            BoundAction::new(code, Action::WheelScroll { ticks })
        }
        ActionKind::KeyCombo => {
            let count = loop {
                let count: usize = ask_number(prompter, "Number of keys in the combination:")?;
                if count >= 1 {
                    break count;
                }
                prompter.say("A combination needs at least one key.");
            };
            let combo = (1..=count)
                .map(|i| ask_key(prompter, keys, &format!("Key {i} of {count}:")))
                .collect::<Result<Vec<_>, _>>()?;
            BoundAction::new(code, Action::KeyCombo { keys: combo })
        }
    };

    binding.action().validate()?;
    Ok(binding)
}

fn ask_kind(prompter: &mut dyn Prompter) -> Result<ActionKind, BindingError> {
    prompter.say("What should this button do?");
    for kind in ActionKind::ALL {
        prompter.say(&format!("  {}) {}", kind.tag(), kind.description()));
    }
    loop {
        let tag: i64 = ask_number(prompter, "Action (blank to cancel):")?;
        match ActionKind::from_tag(tag) {
            Some(kind) => return Ok(kind),
            None => prompter.say(&format!("Choose a number between 1 and {}.", ActionKind::ALL.len())),
        }
    }
}

fn ask_key(
    prompter: &mut dyn Prompter,
    keys: &dyn KeyNameResolver,
    question: &str,
) -> Result<u16, BindingError> {
    loop {
        let answer = ask_required(prompter, question)?;
        if answer.eq_ignore_ascii_case(LIST_KEYWORD) {
            prompter.say(&keys.all_names().join(", "));
            continue;
        }
        return keys
            .code_for_name(&answer)
            .ok_or(BindingError::UnknownKeyName(answer));
    }
}

/// Like [`ask_number`], except that a blank answer means "no minimum".
fn ask_interval(prompter: &mut dyn Prompter) -> Result<Duration, BindingError> {
    loop {
        let answer = prompter
            .ask("Minimum milliseconds between repeats (blank = 0):")
            .ok_or(BindingError::ConstructionCancelled)?;
        if answer.trim().is_empty() {
            return Ok(Duration::ZERO);
        }
        match answer.trim().parse::<u64>() {
            Ok(ms) => return Ok(Duration::from_millis(ms)),
            Err(_) => prompter.say("Please enter a whole number of milliseconds."),
        }
    }
}

fn ask_number<T: FromStr>(prompter: &mut dyn Prompter, question: &str) -> Result<T, BindingError> {
    loop {
        let answer = ask_required(prompter, question)?;
        match answer.parse() {
            Ok(value) => return Ok(value),
            Err(_) => prompter.say(&format!("{answer:?} is not a valid number.")),
        }
    }
}

fn ask_required(prompter: &mut dyn Prompter, question: &str) -> Result<String, BindingError> {
    match prompter.ask(question) {
        Some(answer) if !answer.trim().is_empty() => Ok(answer.trim().to_string()),
        _ => Err(BindingError::ConstructionCancelled),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
