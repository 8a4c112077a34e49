//! The remote-code → output-actions lookup table.
//!
//! A [`MappingTable`] is built exactly once at startup through a
//! [`MappingTableBuilder`] and never mutated afterwards.  The builder enforces
//! the two table-level invariants:
//!
//! - remote codes are unique across the table;
//! - every entry has at least one action.
//!
//! Because the finished table has no mutating methods it can be shared with
//! the dispatch path behind an `Arc` without any locking.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::action::OutputAction;
use super::event::RemoteCode;

/// Table-level validation failures.  `index` is the zero-based position of
/// the offending entry in the order entries were declared.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("duplicate CEC code {code} found at index {index}")]
    DuplicateCode { index: usize, code: RemoteCode },

    #[error("no actions defined for CEC key code {code} at index {index}")]
    NoActions { index: usize, code: RemoteCode },
}

/// One declared mapping: a remote code and the actions it fires, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub code: RemoteCode,
    pub actions: Vec<OutputAction>,
}

impl MappingEntry {
    pub fn new(code: RemoteCode, actions: Vec<OutputAction>) -> Self {
        Self { code, actions }
    }
}

/// Immutable lookup from remote code to its ordered action sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: HashMap<RemoteCode, Vec<OutputAction>>,
}

impl MappingTable {
    /// Returns a builder for a new table.
    pub fn builder() -> MappingTableBuilder {
        MappingTableBuilder::default()
    }

    /// Builds a table from already-parsed entries, validating them in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`TableError`] encountered; no partial table is produced.
    pub fn from_entries<I>(entries: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = MappingEntry>,
    {
        let mut builder = Self::builder();
        for entry in entries {
            builder.push(entry)?;
        }
        Ok(builder.build())
    }

    /// Looks up the actions mapped to `code`.
    pub fn get(&self, code: RemoteCode) -> Option<&[OutputAction]> {
        self.entries.get(&code).map(Vec::as_slice)
    }

    pub fn contains(&self, code: RemoteCode) -> bool {
        self.entries.contains_key(&code)
    }

    /// Number of mapped remote codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all mapped remote codes in unspecified order.
    pub fn codes(&self) -> impl Iterator<Item = RemoteCode> + '_ {
        self.entries.keys().copied()
    }
}

/// Accumulates validated entries for a [`MappingTable`].
///
/// Entries are indexed by the order in which they are pushed, so error
/// messages point at the declaration that caused them.
#[derive(Debug, Default)]
pub struct MappingTableBuilder {
    entries: HashMap<RemoteCode, Vec<OutputAction>>,
    next_index: usize,
}

impl MappingTableBuilder {
    /// Returns `true` if `code` has already been pushed.
    pub fn contains(&self, code: RemoteCode) -> bool {
        self.entries.contains_key(&code)
    }

    /// Zero-based index the next pushed entry will receive.
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Adds an entry.
    ///
    /// # Errors
    ///
    /// - [`TableError::DuplicateCode`] if the code is already present.
    /// - [`TableError::NoActions`] if the entry has no actions.
    pub fn push(&mut self, entry: MappingEntry) -> Result<&mut Self, TableError> {
        let index = self.next_index;
        if self.entries.contains_key(&entry.code) {
            return Err(TableError::DuplicateCode { index, code: entry.code });
        }
        if entry.actions.is_empty() {
            return Err(TableError::NoActions { index, code: entry.code });
        }
        self.entries.insert(entry.code, entry.actions);
        self.next_index += 1;
        Ok(self)
    }

    /// Finishes the table.
    pub fn build(self) -> MappingTable {
        debug!("built mapping table with {} entries", self.entries.len());
        MappingTable { entries: self.entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: RemoteCode, actions: Vec<OutputAction>) -> MappingEntry {
        MappingEntry::new(code, actions)
    }

    #[test]
    fn test_from_entries_exposes_declared_codes() {
        // Arrange
        let entries = vec![
            entry(0, vec![OutputAction::press(28)]),
            entry(1, vec![OutputAction::press(103)]),
            entry(113, vec![OutputAction::down(29), OutputAction::up(29)]),
        ];

        // Act
        let table = MappingTable::from_entries(entries).unwrap();

        // Assert
        let mut codes: Vec<_> = table.codes().collect();
        codes.sort_unstable();
        assert_eq!(codes, vec![0, 1, 113]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_get_preserves_action_order() {
        let table = MappingTable::from_entries(vec![entry(
            7,
            vec![OutputAction::down(42), OutputAction::press(30), OutputAction::up(42)],
        )])
        .unwrap();

        assert_eq!(
            table.get(7),
            Some(&[OutputAction::down(42), OutputAction::press(30), OutputAction::up(42)][..])
        );
    }

    #[test]
    fn test_get_unknown_code_returns_none() {
        let table = MappingTable::from_entries(vec![entry(1, vec![OutputAction::press(2)])]).unwrap();
        assert_eq!(table.get(99), None);
        assert!(!table.contains(99));
    }

    #[test]
    fn test_duplicate_code_is_rejected_with_index() {
        // Arrange
        let entries = vec![
            entry(5, vec![OutputAction::press(30)]),
            entry(5, vec![OutputAction::press(31)]),
        ];

        // Act
        let err = MappingTable::from_entries(entries).unwrap_err();

        // Assert
        assert_eq!(err, TableError::DuplicateCode { index: 1, code: 5 });
        assert_eq!(err.to_string(), "duplicate CEC code 5 found at index 1");
    }

    #[test]
    fn test_empty_action_list_is_rejected() {
        let err = MappingTable::from_entries(vec![entry(3, Vec::new())]).unwrap_err();
        assert_eq!(err, TableError::NoActions { index: 0, code: 3 });
    }

    #[test]
    fn test_builder_tracks_next_index() {
        // Arrange
        let mut builder = MappingTable::builder();

        // Act
        builder.push(entry(1, vec![OutputAction::press(2)])).unwrap();
        builder.push(entry(2, vec![OutputAction::press(3)])).unwrap();

        // Assert
        assert_eq!(builder.next_index(), 2);
        assert!(builder.contains(1));
        assert!(!builder.contains(3));
    }

    #[test]
    fn test_empty_table_is_valid() {
        let table = MappingTable::from_entries(Vec::new()).unwrap();
        assert!(table.is_empty());
    }
}
