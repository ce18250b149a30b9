//! In-memory set of bindings, at most one per button code.

use tracing::warn;

use super::{BindingError, BoundAction};
use crate::config::ConfigStore;

/// Every known binding, in the order they were last bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingStore {
    bindings: Vec<BoundAction>,
}

impl BindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `binding` after removing any binding with the same button
    /// code.  Returns the binding that was removed, if any.
    pub fn add(&mut self, binding: BoundAction) -> Option<BoundAction> {
        let previous = self
            .bindings
            .iter()
            .position(|b| b.button_code() == binding.button_code())
            .map(|index| self.bindings.remove(index));
        self.bindings.push(binding);
        previous
    }

    pub fn find_by_code(&self, code: &str) -> Option<&BoundAction> {
        self.bindings.iter().find(|b| b.button_code() == code)
    }

    pub fn all(&self) -> &[BoundAction] {
        &self.bindings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoundAction> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Rebuilds the store from every section of `config`.
    ///
    /// Sections that do not describe a valid binding are skipped with a
    /// warning; their errors are returned alongside the store so the caller
    /// can report them.
    pub fn from_config(config: &ConfigStore) -> (Self, Vec<BindingError>) {
        let mut store = Self::new();
        let mut skipped = Vec::new();
        for section in config.sections() {
            match BoundAction::from_section(section) {
                Ok(binding) => {
                    store.add(binding);
                }
                Err(e) => {
                    warn!(section = section.name(), error = %e, "skipping binding");
                    skipped.push(e);
                }
            }
        }
        (store, skipped)
    }
}

impl<'a> IntoIterator for &'a BindingStore {
    type Item = &'a BoundAction;
    type IntoIter = std::slice::Iter<'a, BoundAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
