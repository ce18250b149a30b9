//! Ordered `[section]` / `key=value` text format used to persist bindings.
//!
//! # File format
//!
//! ```text
//! [F1]
//! actionId=1
//! minPressInterval=300
//! paramsCount=1
//! param_0=70
//! ```
//!
//! - A line starting with `[` opens a section; the name is the text between
//!   the brackets, trimmed.
//! - Inside a section, a line containing `=` is a record.  It is split on the
//!   *first* `=` and both sides are trimmed, so `key = a=b` becomes key `key`,
//!   value `a=b`.  An empty value (`key=`) is legal.
//! - Every other line (blank, no `=`, or before the first header) is ignored.
//! - There is no escaping, no comments, and no nesting.
//!
//! Section order and record order are preserved, so a load-then-save cycle
//! reproduces an already-trimmed file byte for byte.

mod section;
mod store;

pub use section::{ConfigRecord, ConfigSection};
pub use store::ConfigStore;

use thiserror::Error;

/// Error type for config store operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A section or record with the same name/key is already present.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// The requested section or record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Reading or writing the backing file failed.
    #[error("config persistence failed: {0}")]
    PersistenceFailure(#[from] std::io::Error),
}
