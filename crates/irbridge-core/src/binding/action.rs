//! `BoundAction`: one button code bound to one desktop action.
//!
//! Internally an action is a tagged enum with named fields per kind.  The
//! integer tag and the flat `params` list only exist at the persistence
//! boundary:
//!
//! | Kind          | Tag | Params                 | Effect                                  |
//! |---------------|-----|------------------------|-----------------------------------------|
//! | `KeyPress`    | 1   | `[key]`                | press + release one key                 |
//! | `MouseClick`  | 2   | `[1=left 2=right 3=both]` | press + release the selected button(s) |
//! | `MouseMove`   | 3   | `[dx, dy]`             | move the pointer relative to where it is |
//! | `WheelScroll` | 4   | `[ticks]`              | scroll by a signed number of notches    |
//! | `KeyCombo`    | 5   | `[n, key_1 .. key_n]`  | press all keys in order, then release them in the same order |

use std::fmt;
use std::time::Duration;

use super::BindingError;
use crate::config::ConfigSection;
use crate::injector::{InjectionError, InputInjector, MouseButton};
use crate::keymap::KeyNameResolver;

const KEY_ACTION_ID: &str = "actionId";
const KEY_MIN_INTERVAL: &str = "minPressInterval";
const KEY_PARAMS_COUNT: &str = "paramsCount";
const PARAM_PREFIX: &str = "param_";

/// Default minimum re-fire interval for clicks and key combinations.
const REPEAT_GUARD: Duration = Duration::from_millis(300);

/// The five action kinds and their persisted integer tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActionKind {
    KeyPress = 1,
    MouseClick = 2,
    MouseMove = 3,
    WheelScroll = 4,
    KeyCombo = 5,
}

impl ActionKind {
    /// All kinds in tag order.
    pub const ALL: [ActionKind; 5] = [
        ActionKind::KeyPress,
        ActionKind::MouseClick,
        ActionKind::MouseMove,
        ActionKind::WheelScroll,
        ActionKind::KeyCombo,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|k| i64::from(k.tag()) == tag)
    }

    /// Interval applied to a freshly constructed binding of this kind.
    pub fn default_min_refire_interval(self) -> Duration {
        match self {
            Self::MouseClick | Self::KeyCombo => REPEAT_GUARD,
            Self::KeyPress | Self::MouseMove | Self::WheelScroll => Duration::ZERO,
        }
    }

    /// One-line description shown in the setup menu.
    pub fn description(self) -> &'static str {
        match self {
            Self::KeyPress => "press a keyboard key",
            Self::MouseClick => "click a mouse button",
            Self::MouseMove => "move the mouse pointer",
            Self::WheelScroll => "scroll the mouse wheel",
            Self::KeyCombo => "press a key combination",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::KeyPress => "KeyPress",
            Self::MouseClick => "MouseClick",
            Self::MouseMove => "MouseMove",
            Self::WheelScroll => "WheelScroll",
            Self::KeyCombo => "KeyCombo",
        };
        f.write_str(name)
    }
}

/// Which mouse button(s) a click presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickButtons {
    Left,
    Right,
    Both,
}

impl ClickButtons {
    /// The persisted selector: 1 = left, 2 = right, 3 = both.
    pub fn selector(self) -> i64 {
        match self {
            Self::Left => 1,
            Self::Right => 2,
            Self::Both => 3,
        }
    }

    pub fn from_selector(selector: i64) -> Option<Self> {
        match selector {
            1 => Some(Self::Left),
            2 => Some(Self::Right),
            3 => Some(Self::Both),
            _ => None,
        }
    }

    pub fn buttons(self) -> &'static [MouseButton] {
        match self {
            Self::Left => &[MouseButton::Left],
            Self::Right => &[MouseButton::Right],
            Self::Both => &[MouseButton::Left, MouseButton::Right],
        }
    }
}

/// A desktop action with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    KeyPress { key: u16 },
    MouseClick { buttons: ClickButtons },
    MouseMove { dx: i32, dy: i32 },
    WheelScroll { ticks: i32 },
    KeyCombo { keys: Vec<u16> },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::KeyPress { .. } => ActionKind::KeyPress,
            Self::MouseClick { .. } => ActionKind::MouseClick,
            Self::MouseMove { .. } => ActionKind::MouseMove,
            Self::WheelScroll { .. } => ActionKind::WheelScroll,
            Self::KeyCombo { .. } => ActionKind::KeyCombo,
        }
    }

    /// Builds an action from its flat parameter list.
    ///
    /// # Errors
    ///
    /// [`BindingError::InvalidParameters`] if the list length does not match
    /// the kind's arity or a value is out of range.
    pub fn from_params(kind: ActionKind, params: &[i64]) -> Result<Self, BindingError> {
        let action = match kind {
            ActionKind::KeyPress => {
                expect_len(kind, params, 1)?;
                Self::KeyPress {
                    key: key_code(kind, params[0])?,
                }
            }
            ActionKind::MouseClick => {
                expect_len(kind, params, 1)?;
                let buttons = ClickButtons::from_selector(params[0]).ok_or_else(|| {
                    invalid(kind, format!("button selector {} is not 1, 2 or 3", params[0]))
                })?;
                Self::MouseClick { buttons }
            }
            ActionKind::MouseMove => {
                expect_len(kind, params, 2)?;
                Self::MouseMove {
                    dx: offset(kind, params[0])?,
                    dy: offset(kind, params[1])?,
                }
            }
            ActionKind::WheelScroll => {
                expect_len(kind, params, 1)?;
                Self::WheelScroll {
                    ticks: offset(kind, params[0])?,
                }
            }
            ActionKind::KeyCombo => {
                let (&count, keys) = params
                    .split_first()
                    .ok_or_else(|| invalid(kind, "missing key count".to_string()))?;
                if count < 1 || usize::try_from(count).ok() != Some(keys.len()) {
                    return Err(invalid(
                        kind,
                        format!("key count {count} does not match {} listed keys", keys.len()),
                    ));
                }
                Self::KeyCombo {
                    keys: keys
                        .iter()
                        .map(|&k| key_code(kind, k))
                        .collect::<Result<_, _>>()?,
                }
            }
        };
        Ok(action)
    }

    /// Flattens the action back into its persisted parameter list.
    pub fn to_params(&self) -> Vec<i64> {
        match self {
            Self::KeyPress { key } => vec![i64::from(*key)],
            Self::MouseClick { buttons } => vec![buttons.selector()],
            Self::MouseMove { dx, dy } => vec![i64::from(*dx), i64::from(*dy)],
            Self::WheelScroll { ticks } => vec![i64::from(*ticks)],
            Self::KeyCombo { keys } => std::iter::once(keys.len() as i64)
                .chain(keys.iter().map(|&k| i64::from(k)))
                .collect(),
        }
    }

    /// Checks the invariants `from_params` enforces on a hand-built action.
    ///
    /// # Errors
    ///
    /// [`BindingError::InvalidParameters`] for a zero key code or an empty
    /// key combination.
    pub fn validate(&self) -> Result<(), BindingError> {
        match self {
            Self::KeyPress { key } => key_code(ActionKind::KeyPress, i64::from(*key)).map(drop),
            Self::KeyCombo { keys } if keys.is_empty() => Err(invalid(
                ActionKind::KeyCombo,
                "a key combination needs at least one key".to_string(),
            )),
            Self::KeyCombo { keys } => keys
                .iter()
                .try_for_each(|&k| key_code(ActionKind::KeyCombo, i64::from(k)).map(drop)),
            Self::MouseClick { .. } | Self::MouseMove { .. } | Self::WheelScroll { .. } => Ok(()),
        }
    }

    /// Performs the action through `injector`.
    ///
    /// # Errors
    ///
    /// [`BindingError::InvalidParameters`] before any event is injected if the
    /// action is invalid, or [`BindingError::Injection`] if the injector fails.
    pub fn execute(&self, injector: &dyn InputInjector) -> Result<(), BindingError> {
        self.validate()?;
        match self {
            Self::KeyPress { key } => press_then_release(
                std::slice::from_ref(key),
                |k| injector.press_key(k),
                |k| injector.release_key(k),
            )?,
            Self::MouseClick { buttons } => press_then_release(
                buttons.buttons(),
                |b| injector.press_mouse_button(b),
                |b| injector.release_mouse_button(b),
            )?,
            Self::MouseMove { dx, dy } => injector.move_mouse_by(*dx, *dy)?,
            Self::WheelScroll { ticks } => injector.scroll_wheel(*ticks)?,
            Self::KeyCombo { keys } => press_then_release(
                keys,
                |k| injector.press_key(k),
                |k| injector.release_key(k),
            )?,
        }
        Ok(())
    }
}

impl Action {
    /// Like the `Display` form, but with key codes spelled as `keys` names
    /// them.  Codes without a name fall back to hex.
    pub fn describe(&self, keys: &dyn KeyNameResolver) -> String {
        let name = |code: u16| keys.name_for_code(code).unwrap_or_else(|| format!("0x{code:02X}"));
        match self {
            Self::KeyPress { key } => format!("key {}", name(*key)),
            Self::KeyCombo { keys: combo } => {
                let names: Vec<String> = combo.iter().map(|&k| name(k)).collect();
                format!("combo {}", names.join(" + "))
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyPress { key } => write!(f, "key 0x{key:02X}"),
            Self::MouseClick { buttons } => write!(f, "click {buttons:?}"),
            Self::MouseMove { dx, dy } => write!(f, "move pointer by ({dx}, {dy})"),
            Self::WheelScroll { ticks } => write!(f, "scroll {ticks} notches"),
            Self::KeyCombo { keys } => {
                f.write_str("combo")?;
                for key in keys {
                    write!(f, " 0x{key:02X}")?;
                }
                Ok(())
            }
        }
    }
}

/// Presses every item in order, then releases every item in the same order.
///
/// If a press fails, the items already held are released before the error is
/// returned so no key or button is left down.
fn press_then_release<T: Copy>(
    items: &[T],
    press: impl Fn(T) -> Result<(), InjectionError>,
    release: impl Fn(T) -> Result<(), InjectionError>,
) -> Result<(), InjectionError> {
    for (held, &item) in items.iter().enumerate() {
        if let Err(e) = press(item) {
            for &pressed in &items[..held] {
                let _ = release(pressed);
            }
            return Err(e);
        }
    }

    let mut first_error = None;
    for &item in items {
        if let Err(e) = release(item) {
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

fn invalid(kind: ActionKind, reason: String) -> BindingError {
    BindingError::InvalidParameters { kind, reason }
}

fn expect_len(kind: ActionKind, params: &[i64], arity: usize) -> Result<(), BindingError> {
    if params.len() == arity {
        Ok(())
    } else {
        Err(invalid(
            kind,
            format!("expected {arity} parameter(s), got {}", params.len()),
        ))
    }
}

fn key_code(kind: ActionKind, value: i64) -> Result<u16, BindingError> {
    match u16::try_from(value) {
        Ok(code) if code != 0 => Ok(code),
        _ => Err(invalid(kind, format!("{value} is not a valid key code"))),
    }
}

fn offset(kind: ActionKind, value: i64) -> Result<i32, BindingError> {
    i32::try_from(value).map_err(|_| invalid(kind, format!("{value} is out of range")))
}

/// A button code bound to an action.
///
/// The time the binding last fired is runtime state owned by the dispatch
/// layer and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAction {
    button_code: String,
    action: Action,
    min_refire_interval: Duration,
}

impl BoundAction {
    /// Binds `action` to `button_code` with the kind's default re-fire interval.
    pub fn new(button_code: impl Into<String>, action: Action) -> Self {
        let min_refire_interval = action.kind().default_min_refire_interval();
        Self {
            button_code: button_code.into(),
            action,
            min_refire_interval,
        }
    }

    pub fn with_min_refire_interval(mut self, interval: Duration) -> Self {
        self.min_refire_interval = interval;
        self
    }

    pub fn button_code(&self) -> &str {
        &self.button_code
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }

    pub fn params(&self) -> Vec<i64> {
        self.action.to_params()
    }

    /// Repeats of the same button inside this interval are ignored.
    pub fn min_refire_interval(&self) -> Duration {
        self.min_refire_interval
    }

    /// Executes the bound action.  See [`Action::execute`].
    ///
    /// # Errors
    ///
    /// As for [`Action::execute`].
    pub fn execute(&self, injector: &dyn InputInjector) -> Result<(), BindingError> {
        self.action.execute(injector)
    }

    /// Projects the binding into a config section named after its button code.
    pub fn to_section(&self) -> ConfigSection {
        let params = self.action.to_params();
        let mut section = ConfigSection::new(self.button_code.clone());
        section.set(KEY_ACTION_ID, self.kind().tag().to_string());
        section.set(
            KEY_MIN_INTERVAL,
            self.min_refire_interval.as_millis().to_string(),
        );
        section.set(KEY_PARAMS_COUNT, params.len().to_string());
        for (index, value) in params.iter().enumerate() {
            section.set(format!("{PARAM_PREFIX}{index}"), value.to_string());
        }
        section
    }

    /// Rebuilds a binding from a section written by [`BoundAction::to_section`].
    ///
    /// # Errors
    ///
    /// [`BindingError::MalformedBinding`] if a required record is missing or
    /// not an integer, the action id is unknown, or the parameters do not fit
    /// the action kind.
    pub fn from_section(section: &ConfigSection) -> Result<Self, BindingError> {
        let code = section.name();
        let malformed = |reason: String| BindingError::MalformedBinding {
            code: code.to_string(),
            reason,
        };

        let tag = read_int(section, KEY_ACTION_ID)?;
        let kind = ActionKind::from_tag(tag)
            .ok_or_else(|| malformed(format!("unknown {KEY_ACTION_ID} {tag}")))?;

        let interval_ms = read_int(section, KEY_MIN_INTERVAL)?;
        let interval_ms = u64::try_from(interval_ms)
            .map_err(|_| malformed(format!("{KEY_MIN_INTERVAL} {interval_ms} is negative")))?;

        let count = read_int(section, KEY_PARAMS_COUNT)?;
        if count < 0 {
            return Err(malformed(format!("{KEY_PARAMS_COUNT} {count} is negative")));
        }
        let params = (0..count)
            .map(|index| read_int(section, &format!("{PARAM_PREFIX}{index}")))
            .collect::<Result<Vec<_>, _>>()?;

        let action = Action::from_params(kind, &params).map_err(|e| malformed(e.to_string()))?;
        Ok(Self {
            button_code: code.to_string(),
            action,
            min_refire_interval: Duration::from_millis(interval_ms),
        })
    }
}

fn read_int(section: &ConfigSection, key: &str) -> Result<i64, BindingError> {
    let malformed = |reason: String| BindingError::MalformedBinding {
        code: section.name().to_string(),
        reason,
    };
    let value = section
        .value(key)
        .ok_or_else(|| malformed(format!("missing `{key}`")))?;
    value
        .parse()
        .map_err(|_| malformed(format!("`{key}` is not an integer: {value:?}")))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
