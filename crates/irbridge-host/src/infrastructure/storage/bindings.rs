//! The bindings file on disk.
//!
//! [`BindingsFile`] keeps the raw [`ConfigStore`] it loaded next to the path,
//! so recording one binding rewrites only that binding's section and leaves
//! every other section (including ones that failed to load) untouched.

use std::path::{Path, PathBuf};

use irbridge_core::{BindingStore, BoundAction, ConfigError, ConfigStore};
use tracing::{debug, info};

use super::StorageError;

#[derive(Debug)]
pub struct BindingsFile {
    path: PathBuf,
    config: ConfigStore,
}

impl BindingsFile {
    /// Loads the bindings file at `path`.
    ///
    /// A missing file yields an empty store; it is created on the first
    /// [`BindingsFile::record`].  Sections that are not valid bindings are
    /// skipped and stay in the file.
    ///
    /// # Errors
    ///
    /// [`StorageError::Config`] if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<(Self, BindingStore), StorageError> {
        let path = path.into();
        let config = match ConfigStore::load_from_file(&path) {
            Ok(config) => config,
            Err(ConfigError::PersistenceFailure(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no bindings file at {}, starting empty", path.display());
                ConfigStore::new()
            }
            Err(source) => return Err(StorageError::Config { path, source }),
        };

        let (store, skipped) = BindingStore::from_config(&config);
        info!(
            "loaded {} bindings from {} ({} skipped)",
            store.len(),
            path.display(),
            skipped.len()
        );
        Ok((Self { path, config }, store))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Writes `binding` into its section and saves the whole file.
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] if the parent directory cannot be created, or
    /// [`StorageError::Config`] if the file cannot be written.
    pub fn record(&mut self, binding: &BoundAction) -> Result<(), StorageError> {
        self.config.update_section(binding.to_section());

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        self.config
            .save_to_file(&self.path)
            .map_err(|source| StorageError::Config {
                path: self.path.clone(),
                source,
            })?;
        info!(
            code = binding.button_code(),
            "saved binding to {}",
            self.path.display()
        );
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
