//! The ordered collection of sections plus text/file round-tripping.

use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use super::{ConfigError, ConfigRecord, ConfigSection};

/// An ordered list of uniquely named sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    sections: Vec<ConfigSection>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sections in store order.
    pub fn sections(&self) -> &[ConfigSection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Appends a new section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyExists`] if a section with the same name
    /// is already present.
    pub fn add_section(&mut self, section: ConfigSection) -> Result<(), ConfigError> {
        if self.position(section.name()).is_some() {
            return Err(ConfigError::AlreadyExists(format!(
                "section [{}]",
                section.name()
            )));
        }
        self.sections.push(section);
        Ok(())
    }

    /// Replaces the section with the same name, keeping its position, or
    /// appends it when no such section exists.
    pub fn update_section(&mut self, section: ConfigSection) {
        match self.position(section.name()) {
            Some(index) => self.sections[index] = section,
            None => self.sections.push(section),
        }
    }

    /// Looks up a section by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if no section has this name.
    pub fn get_by_name(&self, name: &str) -> Result<&ConfigSection, ConfigError> {
        self.sections
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| ConfigError::NotFound(format!("section [{name}]")))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name() == name)
    }

    /// Parses the bindings text format.
    ///
    /// A body line belongs to the most recent header; lines before the first
    /// header are ignored.  A trailing `\r` on any line is dropped so files
    /// saved with CRLF endings load the same as LF files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyExists`] if the text repeats a section
    /// name, or repeats a key inside one section.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut store = Self::new();
        let mut current: Option<ConfigSection> = None;

        for raw_line in text.split('\n') {
            let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

            if let Some(header) = line.strip_prefix('[') {
                if let Some(done) = current.take() {
                    store.add_section(done)?;
                }
                current = Some(ConfigSection::new(section_name(header)));
                continue;
            }

            let Some(section) = current.as_mut() else {
                continue;
            };
            if let Some(record) = ConfigRecord::parse_line(line) {
                section.add_record(record)?;
            }
        }

        if let Some(done) = current {
            store.add_section(done)?;
        }
        Ok(store)
    }

    /// Renders the store as `[name]\n` followed by `key=value\n` per record.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            section.write_to(&mut out);
        }
        out
    }

    /// Reads and parses a whole store from `reader`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::PersistenceFailure`] if reading fails (including
    /// non-UTF-8 content), or a parse error as for [`ConfigStore::parse`].
    pub fn load_from<R: Read>(mut reader: R) -> Result<Self, ConfigError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse(&text)
    }

    /// Writes the serialized store to `writer` and flushes it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::PersistenceFailure`] if writing fails.
    pub fn save_to<W: Write>(&self, mut writer: W) -> Result<(), ConfigError> {
        writer.write_all(self.serialize().as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Loads a store from the file at `path`.
    ///
    /// # Errors
    ///
    /// As for [`ConfigStore::load_from`]; a missing file is a
    /// [`ConfigError::PersistenceFailure`] with kind `NotFound`.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let store = Self::load_from(std::io::BufReader::new(file))?;
        debug!("loaded {} config sections from {}", store.len(), path.display());
        Ok(store)
    }

    /// Overwrites the file at `path` with the serialized store.
    ///
    /// # Errors
    ///
    /// [`ConfigError::PersistenceFailure`] if the file cannot be written.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        self.save_to(std::io::BufWriter::new(file))?;
        debug!("saved {} config sections to {}", self.len(), path.display());
        Ok(())
    }
}

/// Extracts the section name from the text following the opening `[`.
fn section_name(header: &str) -> &str {
    let header = header.trim_end();
    header.strip_suffix(']').unwrap_or(header).trim()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const F1_TEXT: &str = "[F1]\nactionId=1\nminPressInterval=300\nparamsCount=1\nparam_0=70\n";

    fn section(name: &str, records: &[(&str, &str)]) -> ConfigSection {
        let mut s = ConfigSection::new(name);
        for (k, v) in records {
            s.set(*k, *v);
        }
        s
    }

    // ── parse ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_single_section_keeps_record_order() {
        // Act
        let store = ConfigStore::parse(F1_TEXT).unwrap();

        // Assert
        assert_eq!(store.len(), 1);
        let f1 = store.get_by_name("F1").unwrap();
        let keys: Vec<_> = f1.records().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["actionId", "minPressInterval", "paramsCount", "param_0"]);
        assert_eq!(f1.value("param_0"), Some("70"));
    }

    #[test]
    fn test_parse_ignores_lines_before_first_header_and_without_equals() {
        let text = "orphan=1\n\n[A]\nnot a record\n\nx = 1 \n[B]\n";

        let store = ConfigStore::parse(text).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.sections()[0].records(), &[ConfigRecord::new("x", "1")]);
        assert!(store.sections()[1].records().is_empty());
    }

    #[test]
    fn test_parse_trims_section_name() {
        let store = ConfigStore::parse("[  0xFF30CF ]\nk=v\n").unwrap();
        assert!(store.get_by_name("0xFF30CF").is_ok());
    }

    #[test]
    fn test_parse_handles_crlf_line_endings() {
        let store = ConfigStore::parse("[F1]\r\nactionId=1\r\n").unwrap();
        assert_eq!(store.get_by_name("F1").unwrap().value("actionId"), Some("1"));
    }

    #[test]
    fn test_parse_duplicate_section_is_rejected() {
        let result = ConfigStore::parse("[A]\nx=1\n[A]\ny=2\n");
        assert!(matches!(result, Err(ConfigError::AlreadyExists(_))));
    }

    #[test]
    fn test_parse_duplicate_key_in_section_is_rejected() {
        let result = ConfigStore::parse("[A]\nx=1\nx=2\n");
        assert!(matches!(result, Err(ConfigError::AlreadyExists(_))));
    }

    #[test]
    fn test_parse_empty_text_yields_empty_store() {
        assert!(ConfigStore::parse("").unwrap().is_empty());
    }

    // ── serialize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_serialize_reproduces_trimmed_input() {
        let text = "[F1]\nactionId=1\nminPressInterval=300\n[0x20DF]\nactionId=3\nlabel=\n";

        let store = ConfigStore::parse(text).unwrap();

        assert_eq!(store.serialize(), text);
    }

    #[test]
    fn test_serialize_normalises_untrimmed_input_once() {
        let store = ConfigStore::parse("[ A ]\n  k  =  v  \n").unwrap();
        let once = store.serialize();

        assert_eq!(once, "[A]\nk=v\n");
        assert_eq!(ConfigStore::parse(&once).unwrap().serialize(), once);
    }

    // ── add / update / get ────────────────────────────────────────────────────

    #[test]
    fn test_add_section_rejects_duplicate_name() {
        let mut store = ConfigStore::new();
        store.add_section(ConfigSection::new("A")).unwrap();

        let result = store.add_section(ConfigSection::new("A"));

        assert!(matches!(result, Err(ConfigError::AlreadyExists(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_section_replaces_in_place() {
        // Arrange
        let mut store = ConfigStore::new();
        store.add_section(section("A", &[("x", "1")])).unwrap();
        store.add_section(section("B", &[("y", "2")])).unwrap();

        // Act
        store.update_section(section("A", &[("z", "3")]));

        // Assert – position preserved, contents replaced wholesale
        assert_eq!(store.sections()[0].name(), "A");
        assert_eq!(store.sections()[0].records(), &[ConfigRecord::new("z", "3")]);
        assert_eq!(store.sections()[1].name(), "B");
    }

    #[test]
    fn test_update_section_appends_when_absent() {
        let mut store = ConfigStore::new();
        store.update_section(section("A", &[]));
        store.update_section(section("B", &[]));

        let names: Vec<_> = store.sections().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn test_get_by_name_missing_returns_not_found() {
        let store = ConfigStore::new();
        assert!(matches!(store.get_by_name("A"), Err(ConfigError::NotFound(_))));
    }

    // ── load / save ───────────────────────────────────────────────────────────

    #[test]
    fn test_save_to_writer_then_load_from_reader_round_trips() {
        let store = ConfigStore::parse(F1_TEXT).unwrap();
        let mut buf = Vec::new();

        store.save_to(&mut buf).unwrap();
        let loaded = ConfigStore::load_from(buf.as_slice()).unwrap();

        assert_eq!(loaded, store);
    }

    #[test]
    fn test_load_from_non_utf8_is_persistence_failure() {
        let bytes: &[u8] = &[b'[', 0xFF, 0xFE, b']'];
        let result = ConfigStore::load_from(bytes);
        assert!(matches!(result, Err(ConfigError::PersistenceFailure(_))));
    }

    #[test]
    fn test_load_from_missing_file_is_persistence_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigStore::load_from_file(&dir.path().join("absent.ini"));
        match result {
            Err(ConfigError::PersistenceFailure(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("expected persistence failure, got {other:?}"),
        }
    }

    #[test]
    fn test_save_to_file_and_load_from_file_round_trip() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.ini");
        let store = ConfigStore::parse(F1_TEXT).unwrap();

        // Act
        store.save_to_file(&path).unwrap();
        let loaded = ConfigStore::load_from_file(&path).unwrap();

        // Assert
        assert_eq!(std::fs::read_to_string(&path).unwrap(), F1_TEXT);
        assert_eq!(loaded, store);
    }
}
