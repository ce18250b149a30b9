//! The learn flow behind the `attach key` command.
//!
//! ```text
//! capture code ──► suppress auto-repeat ──► capture again ──► equal? ──no──► failure tone, retry
//!                                                               │
//!                                                              yes
//!                                                               ▼
//!                     configure action ──► add to store ──► save file ──► success tone
//! ```
//!
//! The suppression window after the first capture keeps the remote's
//! auto-repeat of a still-held button from confirming itself; the user has to
//! release and press again.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use irbridge_core::{BindingError, BindingStore, BoundAction, KeyNameResolver, Melody};
use thiserror::Error;
use tracing::{info, warn};

use super::configure_binding::{configure_binding, Prompter};
use crate::infrastructure::serial::{DeviceLink, LinkError};
use crate::infrastructure::storage::{BindingsFile, StorageError};

/// Error type for the learn flow.
#[derive(Debug, Error)]
pub enum LearnError {
    #[error("receiver link: {0}")]
    Link(#[from] LinkError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error("binding is active but could not be saved: {0}")]
    Storage(#[from] StorageError),

    /// The user left a prompt blank.
    #[error("binding setup cancelled")]
    Cancelled,

    /// Every attempt captured two different codes.
    #[error("the two presses did not match in {attempts} attempt(s)")]
    CodesDisagree { attempts: u32 },
}

/// Capture and tone capabilities the learn flow needs from the receiver.
#[cfg_attr(test, mockall::automock)]
pub trait CaptureSource: Send + Sync {
    /// Captures the next button code, waiting at most `timeout`.
    fn capture_next(&self, timeout: Duration) -> Result<String, LinkError>;

    /// Ignores every frame for `window` from now.
    fn suppress_for(&self, window: Duration);

    fn play(&self, melody: &Melody) -> Result<(), LinkError>;
}

impl CaptureSource for DeviceLink {
    fn capture_next(&self, timeout: Duration) -> Result<String, LinkError> {
        self.enter_capture_mode();
        self.wait_for_capture(timeout)
    }

    fn suppress_for(&self, window: Duration) {
        DeviceLink::suppress_for(self, window);
    }

    fn play(&self, melody: &Melody) -> Result<(), LinkError> {
        self.send_melody(melody)
    }
}

/// Timing and retry limits for [`learn_binding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearnOptions {
    pub capture_timeout: Duration,
    pub confirm_suppression: Duration,
    /// Capture-and-confirm rounds before giving up; `0` is treated as `1`.
    pub max_attempts: u32,
}

impl Default for LearnOptions {
    fn default() -> Self {
        Self {
            capture_timeout: Duration::from_secs(30),
            confirm_suppression: Duration::from_millis(500),
            max_attempts: 3,
        }
    }
}

/// Runs the learn flow once and returns the saved binding.
///
/// An existing binding for the same code is replaced.  If saving fails the
/// new binding stays active for this run and [`LearnError::Storage`] is
/// returned.
///
/// # Errors
///
/// See [`LearnError`].  Capture timeouts and a closed link surface as
/// [`LearnError::Link`].
pub fn learn_binding(
    source: &dyn CaptureSource,
    prompter: &mut dyn Prompter,
    keys: &dyn KeyNameResolver,
    bindings: &RwLock<BindingStore>,
    file: &mut BindingsFile,
    options: &LearnOptions,
) -> Result<BoundAction, LearnError> {
    let code = capture_confirmed(source, prompter, options)?;

    if let Some(existing) = bindings
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .find_by_code(&code)
    {
        prompter.say(&format!(
            "Button {code} is already bound to {}; it will be replaced.",
            existing.action().describe(keys)
        ));
    }

    let binding = match configure_binding(&code, prompter, keys) {
        Ok(binding) => binding,
        Err(BindingError::ConstructionCancelled) => return Err(LearnError::Cancelled),
        Err(e) => {
            play_or_warn(source, &Melody::failure());
            return Err(e.into());
        }
    };

    bindings
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .add(binding.clone());
    info!(code = %code, action = %binding.action(), "binding added");

    if let Err(e) = file.record(&binding) {
        play_or_warn(source, &Melody::failure());
        return Err(e.into());
    }

    play_or_warn(source, &Melody::success());
    prompter.say(&format!("Saved: {code} -> {}", binding.action().describe(keys)));
    Ok(binding)
}

fn capture_confirmed(
    source: &dyn CaptureSource,
    prompter: &mut dyn Prompter,
    options: &LearnOptions,
) -> Result<String, LearnError> {
    let attempts = options.max_attempts.max(1);
    for attempt in 1..=attempts {
        prompter.say("Press the button on the remote...");
        let first = source.capture_next(options.capture_timeout)?;

        prompter.say(&format!("Got {first}. Press the same button again to confirm..."));
        source.suppress_for(options.confirm_suppression);
        let second = source.capture_next(options.capture_timeout)?;

        if first == second {
            return Ok(first);
        }
        warn!(attempt, first = %first, second = %second, "confirmation press did not match");
        play_or_warn(source, &Melody::failure());
        prompter.say(&format!("The codes differ ({first} / {second}). Let's try again."));
    }
    Err(LearnError::CodesDisagree { attempts })
}

fn play_or_warn(source: &dyn CaptureSource, melody: &Melody) {
    if let Err(e) = source.play(melody) {
        warn!(error = %e, "failed to play feedback tone");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
