// src/store/expanded.rs

//! Expanded layout: one directory per repository, one file per package
//!
//! ```text
//! root/
//!   core/
//!     bash        "bash 5.2.037-1 5.2.026-2 <commit>"
//!     glibc       "glibc 2.40-1 2.39-2 <commit>"
//!   extra/
//!     firefox     "firefox 120.0 119.0 <commit>"
//! ```

use super::{PackageStore, RecordEntry, RecordSet, is_hidden};
use crate::error::{Error, Result};
use crate::record::{PackageRecord, record_line};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Package state store backed by the expanded layout
#[derive(Debug, Clone)]
pub struct ExpandedStore {
    root: PathBuf,
}

impl ExpandedStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the directory holding a repository's package files
    ///
    /// Returns: `<root>/<repo>`
    pub fn repository_dir(&self, repo: &str) -> PathBuf {
        self.root.join(repo)
    }

    /// Resolve a repository directory, failing if it does not exist
    fn existing_repository_dir(&self, repo: &str) -> Result<PathBuf> {
        let dir = self.repository_dir(repo);
        if repo.is_empty() || is_hidden(repo) || repo.contains(['/', '\\']) || !dir.is_dir() {
            return Err(Error::RepositoryNotFound(repo.to_string()));
        }
        Ok(dir)
    }

    /// Read one package file and turn it into an entry
    ///
    /// Returns `Ok(None)` if the file is missing or empty.
    fn read_entry(&self, dir: &Path, name: &str) -> Result<Option<RecordEntry>> {
        let path = dir.join(name);
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            Error::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Ok(record_line(&content).map(|raw| RecordEntry {
            package: name.to_string(),
            line: None,
            record: PackageRecord::parse(&raw),
            raw,
        }))
    }
}

/// Entries of one directory accepted by a filter
#[derive(Debug, Default)]
struct DirListing {
    /// Sorted entry names
    names: Vec<String>,
    /// Accepted entries whose names are not valid UTF-8
    unreadable: usize,
}

/// List the immediate entries of `dir` accepted by `keep`, skipping hidden names
fn list_dir(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<DirListing> {
    let entries = fs::read_dir(dir)
        .map_err(|e| Error::IoError(format!("Failed to read directory {}: {}", dir.display(), e)))?;

    let mut listing = DirListing::default();
    for entry in entries {
        let entry = entry.map_err(|e| {
            Error::IoError(format!("Failed to read entry in {}: {}", dir.display(), e))
        })?;

        let path = entry.path();
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            if keep(&path) {
                warn!("Skipping entry with non UTF-8 name {}", path.display());
                listing.unreadable += 1;
            }
            continue;
        };

        if is_hidden(name) || !keep(&path) {
            continue;
        }
        listing.names.push(name.to_string());
    }

    listing.names.sort();
    Ok(listing)
}

impl PackageStore for ExpandedStore {
    fn repositories(&self) -> Result<Vec<String>> {
        debug!("Discovering repositories in {}", self.root.display());
        Ok(list_dir(&self.root, Path::is_dir)?.names)
    }

    fn package_names(&self, repo: &str) -> Result<Vec<String>> {
        let dir = self.existing_repository_dir(repo)?;
        Ok(list_dir(&dir, Path::is_file)?.names)
    }

    fn record(&self, repo: &str, name: &str) -> Result<Option<PackageRecord>> {
        let dir = self.existing_repository_dir(repo)?;

        // Only plain file names address a package
        if name.is_empty() || is_hidden(name) || name.contains(['/', '\\']) {
            return Ok(None);
        }

        Ok(self.read_entry(&dir, name)?.map(|entry| entry.record))
    }

    fn records(&self, repo: &str) -> Result<RecordSet> {
        let dir = self.existing_repository_dir(repo)?;
        let listing = list_dir(&dir, Path::is_file)?;
        let mut set = RecordSet {
            errors: listing.unreadable,
            ..RecordSet::default()
        };

        for name in listing.names {
            match self.read_entry(&dir, &name) {
                Ok(Some(entry)) => set.entries.push(entry),
                Ok(None) => debug!("Skipping empty package file {}/{}", repo, name),
                Err(e) => {
                    warn!("{}", e);
                    set.errors += 1;
                }
            }
        }

        debug!(
            "Read {} records from {} ({} errors)",
            set.entries.len(),
            dir.display(),
            set.errors
        );
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, ExpandedStore) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("core")).unwrap();
        fs::create_dir_all(root.join("extra")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join("README.md"), "not a repository").unwrap();

        fs::write(root.join("core/glibc"), "glibc 2.40-1 2.39-2 0123456789abcdef\n").unwrap();
        fs::write(root.join("core/bash"), "bash 5.2.037-1 5.2.026-2 fedcba9876543210").unwrap();
        fs::write(root.join("extra/firefox"), "firefox 120.0 119.0 abcdef1234567890\n").unwrap();

        let store = ExpandedStore::new(root);
        (temp_dir, store)
    }

    #[test]
    fn test_repositories_sorted_and_filtered() {
        let (_temp, store) = create_test_store();
        assert_eq!(store.repositories().unwrap(), vec!["core", "extra"]);
    }

    #[test]
    fn test_repositories_missing_root() {
        let store = ExpandedStore::new("/nonexistent/pkgstate/root");
        let result = store.repositories();
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn test_package_names_skip_hidden_and_directories() {
        let (temp, store) = create_test_store();
        fs::write(temp.path().join("core/.bash.swp"), "junk").unwrap();
        fs::create_dir_all(temp.path().join("core/subdir")).unwrap();

        assert_eq!(store.package_names("core").unwrap(), vec!["bash", "glibc"]);
    }

    #[test]
    fn test_record_lookup() {
        let (_temp, store) = create_test_store();

        let record = store.record("extra", "firefox").unwrap().unwrap();
        assert_eq!(record, PackageRecord::new("firefox", "120.0", "119.0", "abcdef1234567890"));

        assert!(store.record("extra", "chromium").unwrap().is_none());
        assert!(store.record("extra", "../core/bash").unwrap().is_none());
        assert!(matches!(
            store.record("community", "firefox"),
            Err(Error::RepositoryNotFound(_))
        ));
    }

    #[test]
    fn test_empty_file_is_absent() {
        let (temp, store) = create_test_store();
        fs::write(temp.path().join("core/empty"), "  \n\n").unwrap();

        assert!(store.record("core", "empty").unwrap().is_none());
        assert_eq!(store.records("core").unwrap().len(), 2);
        assert_eq!(store.count_records("core").unwrap().records, 2);
        // Still a file on disk, so the raw listing includes it
        assert_eq!(store.package_names("core").unwrap(), vec!["bash", "empty", "glibc"]);
    }

    #[test]
    fn test_malformed_file_yields_sentinel() {
        let (temp, store) = create_test_store();
        fs::write(temp.path().join("core/foo"), "foo\n").unwrap();

        let record = store.record("core", "foo").unwrap().unwrap();
        assert!(record.is_malformed());

        let set = store.records("core").unwrap();
        assert_eq!(set.len(), 3);
        let entry = set.entries.iter().find(|e| e.package == "foo").unwrap();
        assert_eq!(entry.raw, "foo");
        assert!(entry.record.is_malformed());
    }

    #[test]
    fn test_records_in_sorted_order() {
        let (_temp, store) = create_test_store();
        let set = store.records("core").unwrap();

        let names: Vec<_> = set.entries.iter().map(|e| e.package.as_str()).collect();
        assert_eq!(names, vec!["bash", "glibc"]);
        assert_eq!(set.errors, 0);
        assert!(set.entries.iter().all(|e| e.line.is_none()));
    }

    #[test]
    fn test_unreadable_file_counts_as_error() {
        let (temp, store) = create_test_store();
        // Invalid UTF-8 fails read_to_string
        fs::write(temp.path().join("core/broken"), [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let set = store.records("core").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.errors, 1);
        assert_eq!(store.count_records("core").unwrap().records, 2);
        assert!(matches!(store.record("core", "broken"), Err(Error::IoError(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_file_name_counts_as_error() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (temp, store) = create_test_store();
        let name = OsStr::from_bytes(b"caf\xe9");
        fs::write(temp.path().join("core").join(name), "cafe 2 1 bbbb\n").unwrap();

        let set = store.records("core").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.errors, 1);
        assert_eq!(store.package_names("core").unwrap(), vec!["bash", "glibc"]);

        let count = store.count_records("core").unwrap();
        assert_eq!(count.records, 2);
        assert_eq!(count.errors, 1);
    }

    #[test]
    fn test_non_repository_names_rejected() {
        let (_temp, store) = create_test_store();
        for name in [".git", "README.md", "", "core/../extra"] {
            assert!(matches!(store.records(name), Err(Error::RepositoryNotFound(_))));
        }
    }
}
