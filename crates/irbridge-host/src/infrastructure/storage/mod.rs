//! Persistence adapters.
//!
//! - **`settings`** – host settings in TOML at the platform config directory.
//! - **`bindings`** – the bindings file in the `[section]` / `key=value`
//!   format, read and written through [`irbridge_core::ConfigStore`].

pub mod bindings;
pub mod settings;

pub use bindings::BindingsFile;
pub use settings::HostSettings;

use std::path::PathBuf;

use irbridge_core::ConfigError;
use thiserror::Error;

/// Error type for settings and bindings persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings TOML could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be serialized to TOML.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The bindings file could not be read, parsed, or written.
    #[error("bindings file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}
