//! Import and export of portable library documents
//!
//! An export is a pretty-printed JSON array of canonical book objects. An
//! import accepts that shape plus loosely-labelled records from other tools,
//! and merges them without ever overwriting a book already in the library.

use crate::error::{ImportError, Result};
use crate::library::{now_millis, Library, LibraryEvent};
use crate::normalize::normalize_imported;
use crate::storage::KeyValueStore;
use crate::types::{Book, RawBook};
use serde_json::Value;
use std::collections::HashSet;

/// Valid records read from an import document
#[derive(Debug, Clone, PartialEq)]
pub struct ImportBatch {
    /// Number of elements in the document
    pub found: usize,

    /// Normalized records, in document order
    pub books: Vec<Book>,
}

/// Outcome of merging an import into the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Elements in the document
    pub found: usize,

    /// Elements that normalized into a book
    pub valid: usize,

    /// Books actually added after dropping known ids
    pub added: usize,
}

impl ImportReport {
    /// Valid records skipped because their id was already present
    pub fn skipped(&self) -> usize {
        self.valid - self.added
    }
}

/// Serialize books as a pretty-printed, re-importable JSON array
pub fn export_json(books: &[Book]) -> Result<String> {
    Ok(serde_json::to_string_pretty(books)?)
}

/// Parse an import document into normalized books.
///
/// Fails when the text is not JSON or its top level is not an array.
/// Elements that are not objects, or lack both title and author, are
/// dropped.
pub fn parse_import(text: &str, now_ms: i64) -> std::result::Result<ImportBatch, ImportError> {
    let document: Value = serde_json::from_str(text).map_err(ImportError::Malformed)?;
    let Value::Array(items) = document else {
        return Err(ImportError::NotASequence);
    };

    let found = items.len();
    let books = items
        .into_iter()
        .filter_map(RawBook::from_value)
        .filter_map(|raw| normalize_imported(&raw, now_ms))
        .collect();

    Ok(ImportBatch { found, books })
}

/// Keep only books whose id is neither in `existing` nor earlier in the batch
pub fn reconcile<'a>(existing: impl IntoIterator<Item = &'a Book>, incoming: Vec<Book>) -> Vec<Book> {
    let mut known: HashSet<String> = existing.into_iter().map(|b| b.id.clone()).collect();
    incoming
        .into_iter()
        .filter(|book| known.insert(book.id.clone()))
        .collect()
}

impl<S: KeyValueStore> Library<S> {
    /// Export the collection in its current order
    pub fn export(&self) -> Result<String> {
        export_json(self.books())
    }

    /// Merge an import document into the library
    pub fn import(&mut self, text: &str) -> Result<ImportReport> {
        let batch = parse_import(text, now_millis())?;
        self.import_batch(batch)
    }

    /// Merge already-parsed records.
    ///
    /// Records whose id already exists are dropped: local edits win over
    /// re-imported copies. The merged collection is committed once.
    pub fn import_batch(&mut self, batch: ImportBatch) -> Result<ImportReport> {
        let valid = batch.books.len();
        let fresh = reconcile(self.books(), batch.books);
        let added = fresh.len();

        let report = ImportReport {
            found: batch.found,
            valid,
            added,
        };

        if added > 0 {
            let mut merged = self.books().to_vec();
            merged.extend(fresh);
            self.commit(merged, LibraryEvent::Imported { added })?;
        }

        tracing::info!(
            "Import found {} records, {} valid, {} added",
            report.found,
            report.valid,
            report.added
        );
        Ok(report)
    }
}
