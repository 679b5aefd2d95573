// src/store/mod.rs

//! Package state storage layouts
//!
//! This module provides read access to package state records in two
//! physical layouts behind one capability trait:
//! - Expanded: `root/<repository>/<package>`, one record per file
//! - Consolidated: `root/<repository>.txt`, one record per line
//!
//! An in-memory store implements the same trait for tests and embedding.

pub mod consolidated;
pub mod expanded;
pub mod memory;

pub use consolidated::ConsolidatedStore;
pub use expanded::ExpandedStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::record::PackageRecord;
use serde::Serialize;

/// Read-only view of package state records
///
/// Implementations hold no cached state: each call reflects what is on disk
/// at that moment. Per-repository methods return
/// [`Error::RepositoryNotFound`](crate::Error::RepositoryNotFound) when the
/// repository does not exist.
pub trait PackageStore {
    /// List repository names, sorted lexicographically
    fn repositories(&self) -> Result<Vec<String>>;

    /// List the package names stored in a repository, in store order
    fn package_names(&self, repo: &str) -> Result<Vec<String>>;

    /// Look up a single package
    ///
    /// Returns `Ok(None)` if the repository exists but the package does not
    /// (an empty package entry counts as absent).
    fn record(&self, repo: &str, name: &str) -> Result<Option<PackageRecord>>;

    /// Read every non-empty record in a repository, in store order
    ///
    /// Entries that cannot be read are skipped and counted in
    /// [`RecordSet::errors`]; the rest are always returned.
    fn records(&self, repo: &str) -> Result<RecordSet>;

    /// Number of entries `records(repo)` would return, plus its error count
    fn count_records(&self, repo: &str) -> Result<RecordCount> {
        let set = self.records(repo)?;
        Ok(RecordCount {
            records: set.len(),
            errors: set.errors,
        })
    }
}

/// Record and unreadable-entry counts for one repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordCount {
    pub records: usize,
    pub errors: usize,
}

/// One stored package record together with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordEntry {
    /// Lookup key: the file name (expanded) or first token of the line (consolidated)
    pub package: String,

    /// 1-based line number within a consolidated file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    /// Record line as stored
    pub raw: String,

    /// Parsed record (the malformed sentinel if the line is unparseable)
    pub record: PackageRecord,
}

/// Records read from one repository plus the number of unreadable entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    pub entries: Vec<RecordEntry>,
    pub errors: usize,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record lines in store order
    pub fn raw_lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.raw.as_str())
    }
}

/// Hidden entries (`.git`, editor swap files, ...) are never repositories or packages
pub(crate) fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
