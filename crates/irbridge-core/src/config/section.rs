//! Sections and records of the bindings text format.

use super::ConfigError;

/// A single `key=value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    pub key: String,
    pub value: String,
}

impl ConfigRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parses a body line by splitting on the first `=`.
    ///
    /// Returns `None` when the line contains no `=`.
    pub(crate) fn parse_line(line: &str) -> Option<Self> {
        let (key, value) = line.split_once('=')?;
        Some(Self::new(key.trim(), value.trim()))
    }
}

/// A named, ordered group of records.  Keys are unique within a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSection {
    name: String,
    records: Vec<ConfigRecord>,
}

impl ConfigSection {
    /// Creates an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[ConfigRecord] {
        &self.records
    }

    /// Appends a record.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyExists`] if the key is already present.
    pub fn add_record(&mut self, record: ConfigRecord) -> Result<(), ConfigError> {
        if self.records.iter().any(|r| r.key == record.key) {
            return Err(ConfigError::AlreadyExists(format!(
                "key `{}` in section [{}]",
                record.key, self.name
            )));
        }
        self.records.push(record);
        Ok(())
    }

    /// Sets `key` to `value`, replacing the existing value in place or
    /// appending a new record.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.records.iter_mut().find(|r| r.key == key) {
            Some(existing) => existing.value = value,
            None => self.records.push(ConfigRecord { key, value }),
        }
    }

    /// Looks up a record by key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if no record has this key.
    pub fn get_by_key(&self, key: &str) -> Result<&ConfigRecord, ConfigError> {
        self.records
            .iter()
            .find(|r| r.key == key)
            .ok_or_else(|| ConfigError::NotFound(format!("key `{key}` in section [{}]", self.name)))
    }

    /// Convenience accessor for the value of `key`, if present.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.key == key)
            .map(|r| r.value.as_str())
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        out.push('[');
        out.push_str(&self.name);
        out.push_str("]\n");
        for record in &self.records {
            out.push_str(&record.key);
            out.push('=');
            out.push_str(&record.value);
            out.push('\n');
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
