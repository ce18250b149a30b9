//! TOML host settings.
//!
//! Read from the platform-appropriate settings file:
//! - Windows:  `%APPDATA%\irbridge\settings.toml`
//! - Linux:    `$XDG_CONFIG_HOME/irbridge/settings.toml` or `~/.config/irbridge/settings.toml`
//! - macOS:    `~/Library/Application Support/irbridge/settings.toml`
//!
//! The bindings file defaults to `bindings.ini` in the same directory.
//!
//! ```toml
//! [general]
//! log_level = "debug"
//!
//! [serial]
//! connect_timeout_ms = 5000
//! max_scan_rounds = 10
//!
//! [learn]
//! confirm_suppression_ms = 700
//! ```
//!
//! Every section and field has a serde default, so a missing file, a missing
//! section, or a missing field all fall back to the built-in values.  On
//! first run the binary writes the defaults out so there is a file to edit.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::StorageError;
use crate::application::connect::ConnectPolicy;
use crate::application::learn::LearnOptions;
use crate::infrastructure::serial::LineSettings;

const APP_DIR: &str = "irbridge";
const SETTINGS_FILE: &str = "settings.toml";
const BINDINGS_FILE: &str = "bindings.ini";

// ── Settings schema ───────────────────────────────────────────────────────────

/// Top-level host settings stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HostSettings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub serial: SerialSettings,
    #[serde(default)]
    pub learn: LearnSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Bindings file; defaults to `bindings.ini` next to the settings file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings_file: Option<PathBuf>,
}

/// Receiver connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialSettings {
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// How long each candidate port gets to send its handshake.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Pause between two full scans of the port list.
    #[serde(default = "default_rescan_interval_ms")]
    pub rescan_interval_ms: u64,
    /// Number of full scans before giving up; `0` scans forever.
    #[serde(default)]
    pub max_scan_rounds: u32,
}

/// Learn-flow settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LearnSettings {
    /// How long to wait for each button press.
    #[serde(default = "default_capture_timeout_ms")]
    pub capture_timeout_ms: u64,
    /// Frames are ignored for this long after the first press, so the
    /// remote's auto-repeat cannot confirm itself.
    #[serde(default = "default_confirm_suppression_ms")]
    pub confirm_suppression_ms: u64,
    /// Press-and-confirm rounds before the learn flow gives up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_baud_rate() -> u32 {
    LineSettings::default().baud_rate
}
fn default_connect_timeout_ms() -> u64 {
    3000
}
fn default_rescan_interval_ms() -> u64 {
    1000
}
fn default_capture_timeout_ms() -> u64 {
    30_000
}
fn default_confirm_suppression_ms() -> u64 {
    500
}
fn default_max_attempts() -> u32 {
    3
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            bindings_file: None,
        }
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            connect_timeout_ms: default_connect_timeout_ms(),
            rescan_interval_ms: default_rescan_interval_ms(),
            max_scan_rounds: 0,
        }
    }
}

impl Default for LearnSettings {
    fn default() -> Self {
        Self {
            capture_timeout_ms: default_capture_timeout_ms(),
            confirm_suppression_ms: default_confirm_suppression_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl SerialSettings {
    pub fn line_settings(&self) -> LineSettings {
        LineSettings {
            baud_rate: self.baud_rate,
        }
    }

    pub fn connect_policy(&self) -> ConnectPolicy {
        ConnectPolicy {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            rescan_interval: Duration::from_millis(self.rescan_interval_ms),
            max_scan_rounds: self.max_scan_rounds,
        }
    }
}

impl LearnSettings {
    pub fn learn_options(&self) -> LearnOptions {
        LearnOptions {
            capture_timeout: Duration::from_millis(self.capture_timeout_ms),
            confirm_suppression: Duration::from_millis(self.confirm_suppression_ms),
            max_attempts: self.max_attempts,
        }
    }
}

impl HostSettings {
    /// The configured bindings file, or `bindings.ini` in the settings directory.
    ///
    /// # Errors
    ///
    /// [`StorageError::NoPlatformConfigDir`] if no file is configured and the
    /// settings directory cannot be determined.
    pub fn bindings_path(&self) -> Result<PathBuf, StorageError> {
        match &self.general.bindings_file {
            Some(path) => Ok(path.clone()),
            None => Ok(settings_dir()?.join(BINDINGS_FILE)),
        }
    }
}

// ── Settings repository ───────────────────────────────────────────────────────

/// The platform-appropriate settings directory.
///
/// # Errors
///
/// [`StorageError::NoPlatformConfigDir`] when the base directory cannot be
/// determined from the environment.
pub fn settings_dir() -> Result<PathBuf, StorageError> {
    config_dir_from(|name| std::env::var_os(name)).ok_or(StorageError::NoPlatformConfigDir)
}

/// Full path of the default settings file.
///
/// # Errors
///
/// As for [`settings_dir`].
pub fn settings_file_path() -> Result<PathBuf, StorageError> {
    Ok(settings_dir()?.join(SETTINGS_FILE))
}

/// Loads settings from `path`, returning the defaults if the file does not exist.
///
/// # Errors
///
/// [`StorageError::Io`] for file-system errors other than "not found", and
/// [`StorageError::Parse`] if the TOML is malformed.
pub fn load_settings(path: &Path) -> Result<HostSettings, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let settings: HostSettings = toml::from_str(&content)?;
            debug!("loaded settings from {}", path.display());
            Ok(settings)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no settings at {}, using defaults", path.display());
            Ok(HostSettings::default())
        }
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `settings` to `path`, creating the directory if needed.
///
/// # Errors
///
/// [`StorageError::Io`] for file-system failures or
/// [`StorageError::Serialize`] if serialization fails.
pub fn save_settings(path: &Path, settings: &HostSettings) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(settings)?;
    std::fs::write(path, content).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the default settings to `path` unless a file is already there.
///
/// Returns `true` if a file was written.
///
/// # Errors
///
/// As for [`save_settings`].
pub fn write_default_settings_if_missing(path: &Path) -> Result<bool, StorageError> {
    if path.exists() {
        return Ok(false);
    }
    save_settings(path, &HostSettings::default())?;
    info!("wrote default settings to {}", path.display());
    Ok(true)
}

/// Resolves the settings directory from environment lookups.
///
/// Windows uses `%APPDATA%`, macOS `~/Library/Application Support`, and other
/// Unix systems `$XDG_CONFIG_HOME` falling back to `~/.config`.
fn config_dir_from(var: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    let home = || var("HOME").map(PathBuf::from);
    let base = if cfg!(target_os = "windows") {
        var("APPDATA").map(PathBuf::from)
    } else if cfg!(target_os = "macos") {
        home().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(unix) {
        var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| home().map(|h| h.join(".config")))
    } else {
        None
    }?;
    Some(base.join(APP_DIR))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_serial_settings_match_receiver_profile() {
        let settings = SerialSettings::default();
        assert_eq!(settings.baud_rate, 115_200);
        assert_eq!(settings.connect_timeout_ms, 3000);
        assert_eq!(settings.max_scan_rounds, 0, "scan forever by default");
    }

    #[test]
    fn test_default_learn_settings() {
        let options = LearnSettings::default().learn_options();
        assert_eq!(options.confirm_suppression, Duration::from_millis(500));
        assert_eq!(options.max_attempts, 3);
    }

    #[test]
    fn test_connect_policy_converts_milliseconds() {
        let mut serial = SerialSettings::default();
        serial.rescan_interval_ms = 250;

        let policy = serial.connect_policy();

        assert_eq!(policy.connect_timeout, Duration::from_secs(3));
        assert_eq!(policy.rescan_interval, Duration::from_millis(250));
    }

    // ── TOML round-trip ───────────────────────────────────────────────────────

    #[test]
    fn test_settings_serialize_and_deserialize_round_trip() {
        // Arrange
        let mut settings = HostSettings::default();
        settings.serial.max_scan_rounds = 4;
        settings.general.bindings_file = Some(PathBuf::from("/tmp/remote.ini"));

        // Act
        let text = toml::to_string_pretty(&settings).expect("serialize");
        let restored: HostSettings = toml::from_str(&text).expect("deserialize");

        // Assert
        assert_eq!(settings, restored);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let settings: HostSettings = toml::from_str("").expect("deserialize empty");
        assert_eq!(settings, HostSettings::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        // Arrange
        let text = "[serial]\nconnect_timeout_ms = 5000\n";

        // Act
        let settings: HostSettings = toml::from_str(text).expect("deserialize partial");

        // Assert
        assert_eq!(settings.serial.connect_timeout_ms, 5000);
        assert_eq!(settings.serial.baud_rate, 115_200);
        assert_eq!(settings.general.log_level, "info");
    }

    #[test]
    fn test_unset_bindings_file_is_omitted_from_toml() {
        let text = toml::to_string_pretty(&HostSettings::default()).expect("serialize");
        assert!(!text.contains("bindings_file"));
    }

    // ── File access ───────────────────────────────────────────────────────────

    #[test]
    fn test_load_settings_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let settings = load_settings(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(settings, HostSettings::default());
    }

    #[test]
    fn test_load_settings_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[[[ not toml").unwrap();

        assert!(matches!(load_settings(&path), Err(StorageError::Parse(_))));
    }

    #[test]
    fn test_save_then_load_settings_via_temp_dir() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let mut settings = HostSettings::default();
        settings.general.log_level = "debug".to_string();

        // Act
        save_settings(&path, &settings).unwrap();
        let loaded = load_settings(&path).unwrap();

        // Assert
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_settings_file_is_written_with_defaults() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("irbridge").join("settings.toml");

        // Act
        let written = write_default_settings_if_missing(&path).unwrap();

        // Assert
        assert!(written);
        assert_eq!(load_settings(&path).unwrap(), HostSettings::default());
    }

    #[test]
    fn test_existing_settings_file_is_left_alone() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[general]\nlog_level = \"trace\"\n").unwrap();

        // Act
        let written = write_default_settings_if_missing(&path).unwrap();

        // Assert
        assert!(!written);
        assert_eq!(load_settings(&path).unwrap().general.log_level, "trace");
    }

    // ── Directory resolution ──────────────────────────────────────────────────

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<OsString> {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| OsString::from(*value))
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_config_dir_prefers_xdg_config_home() {
        let dir = config_dir_from(env_of(&[("XDG_CONFIG_HOME", "/xdg"), ("HOME", "/home/u")]));
        assert_eq!(dir, Some(PathBuf::from("/xdg/irbridge")));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_config_dir_falls_back_to_home_dot_config() {
        let dir = config_dir_from(env_of(&[("HOME", "/home/u")]));
        assert_eq!(dir, Some(PathBuf::from("/home/u/.config/irbridge")));
    }

    #[test]
    fn test_config_dir_without_environment_is_none() {
        assert_eq!(config_dir_from(env_of(&[])), None);
    }

    #[test]
    fn test_configured_bindings_file_wins_over_default() {
        let mut settings = HostSettings::default();
        settings.general.bindings_file = Some(PathBuf::from("custom.ini"));

        assert_eq!(settings.bindings_path().unwrap(), PathBuf::from("custom.ini"));
    }

    #[test]
    fn test_settings_file_path_ends_with_settings_toml() {
        // NoPlatformConfigDir in a stripped environment is also acceptable.
        if let Ok(path) = settings_file_path() {
            assert!(path.ends_with("settings.toml"), "got {path:?}");
        }
    }
}
