//! Button-code → action bindings.
//!
//! A [`BoundAction`] ties one remote button code to one desktop action.  The
//! [`BindingStore`] holds every binding, at most one per button code.
//!
//! # Persistence projection
//!
//! Each binding is stored as one config section named after its button code:
//!
//! ```text
//! [FF30CF]            ← button code
//! actionId=3          ← ActionKind tag
//! minPressInterval=0  ← minimum re-fire interval in milliseconds
//! paramsCount=2
//! param_0=12          ← flat parameter list, meaning fixed per kind
//! param_1=-5
//! ```

mod action;
mod store;

pub use action::{Action, ActionKind, BoundAction, ClickButtons};
pub use store::BindingStore;

use thiserror::Error;

use crate::injector::InjectionError;

/// Error type for binding construction, persistence, and execution.
#[derive(Debug, Error)]
pub enum BindingError {
    /// The parameter list does not fit the action kind.
    #[error("invalid parameters for {kind}: {reason}")]
    InvalidParameters { kind: ActionKind, reason: String },

    /// A stored section could not be turned back into a binding.
    #[error("malformed binding [{code}]: {reason}")]
    MalformedBinding { code: String, reason: String },

    /// The user aborted interactive construction.
    #[error("binding setup cancelled")]
    ConstructionCancelled,

    /// A key name typed during setup has no key code.
    #[error("unknown key name: {0:?}")]
    UnknownKeyName(String),

    /// The injector refused an event.
    #[error("input injection failed: {0}")]
    Injection(#[from] InjectionError),
}
