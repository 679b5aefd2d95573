// src/store/consolidated.rs

//! Consolidated layout: one text file per repository
//!
//! Each `<repo>.txt` starts with a `#` header block followed by one record
//! line per package, in the order the packages were consolidated:
//!
//! ```text
//! # Repository: core
//! # Generated: 2026-10-18T09:30:00Z
//! # Package count: 2
//! # Format: package-name version1 version2 commit-hash
//! #
//! bash 5.2.037-1 5.2.026-2 fedcba9876543210
//! glibc 2.40-1 2.39-2 0123456789abcdef
//! ```
//!
//! Readers skip every line starting with `#` and never depend on the header
//! fields.

use super::{PackageStore, RecordCount, RecordEntry, RecordSet, is_hidden};
use crate::error::{Error, Result};
use crate::record::{PackageRecord, line_key};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extension of consolidated repository files
pub const EXTENSION: &str = "txt";

/// Lines starting with this marker are header/comment lines
pub const COMMENT_MARKER: char = '#';

/// Package state store backed by the consolidated layout
#[derive(Debug, Clone)]
pub struct ConsolidatedStore {
    root: PathBuf,
}

/// A line yielded while scanning a consolidated file
enum ScannedLine<'a> {
    Record { number: usize, text: &'a str },
    Unreadable,
}

impl ConsolidatedStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the consolidated file for a repository
    ///
    /// Returns: `<root>/<repo>.txt`
    pub fn repository_file(&self, repo: &str) -> PathBuf {
        self.root.join(format!("{}.{}", repo, EXTENSION))
    }

    /// Open a repository file, mapping absence to `RepositoryNotFound`
    fn open(&self, repo: &str) -> Result<(PathBuf, File)> {
        if repo.is_empty() || is_hidden(repo) || repo.contains(['/', '\\']) {
            return Err(Error::RepositoryNotFound(repo.to_string()));
        }

        let path = self.repository_file(repo);
        match File::open(&path) {
            Ok(file) if path.is_file() => Ok((path, file)),
            Ok(_) => Err(Error::RepositoryNotFound(repo.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Error::RepositoryNotFound(repo.to_string()))
            }
            Err(e) => Err(Error::IoError(format!(
                "Failed to open {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Stream the record lines of a repository file
    ///
    /// Comment and blank lines are skipped. Lines that are not valid UTF-8
    /// are reported as unreadable and scanning continues; an I/O error ends
    /// the scan after reporting it.
    fn scan(&self, repo: &str, mut visit: impl FnMut(ScannedLine<'_>)) -> Result<()> {
        let (path, file) = self.open(repo)?;
        let reader = BufReader::new(file);

        for (idx, chunk) in reader.split(b'\n').enumerate() {
            let number = idx + 1;
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Failed to read {} at line {}: {}", path.display(), number, e);
                    visit(ScannedLine::Unreadable);
                    break;
                }
            };

            let Ok(line) = std::str::from_utf8(&bytes) else {
                warn!("Skipping non UTF-8 line {} in {}", number, path.display());
                visit(ScannedLine::Unreadable);
                continue;
            };

            if line.starts_with(COMMENT_MARKER) || line.trim().is_empty() {
                continue;
            }

            visit(ScannedLine::Record {
                number,
                text: line.trim(),
            });
        }

        Ok(())
    }

    /// Overwrite a repository's consolidated file with the given record lines
    ///
    /// The write is not transactional: a failure part way leaves a truncated
    /// file behind, which a later run replaces completely. Returns the path
    /// written and its size in bytes.
    pub fn write_repository(
        &self,
        repo: &str,
        lines: &[String],
        generated_at: DateTime<Utc>,
    ) -> Result<(PathBuf, u64)> {
        fs::create_dir_all(&self.root).map_err(|e| {
            Error::WriteError(format!("Failed to create directory {}: {}", self.root.display(), e))
        })?;

        let path = self.repository_file(repo);
        let write_err =
            |e: io::Error| Error::WriteError(format!("Failed to write {}: {}", path.display(), e));

        let file = File::create(&path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);

        writer
            .write_all(render_header(repo, generated_at, lines.len()).as_bytes())
            .map_err(write_err)?;
        for line in lines {
            writeln!(writer, "{}", line).map_err(write_err)?;
        }
        writer.flush().map_err(write_err)?;
        drop(writer);

        let bytes = fs::metadata(&path).map_err(write_err)?.len();
        debug!("Wrote {} records ({} bytes) to {}", lines.len(), bytes, path.display());
        Ok((path, bytes))
    }
}

/// Header block written at the top of every consolidated file
pub fn render_header(repo: &str, generated_at: DateTime<Utc>, count: usize) -> String {
    format!(
        "# Repository: {}\n# Generated: {}\n# Package count: {}\n# Format: package-name version1 version2 commit-hash\n#\n",
        repo,
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        count
    )
}

impl PackageStore for ConsolidatedStore {
    fn repositories(&self) -> Result<Vec<String>> {
        debug!("Discovering consolidated files in {}", self.root.display());

        let entries = fs::read_dir(&self.root).map_err(|e| {
            Error::IoError(format!("Failed to read directory {}: {}", self.root.display(), e))
        })?;

        let mut repos = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| {
                    Error::IoError(format!(
                        "Failed to read entry in {}: {}",
                        self.root.display(),
                        e
                    ))
                })?
                .path();

            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
                && !is_hidden(stem)
            {
                repos.push(stem.to_string());
            }
        }

        repos.sort();
        Ok(repos)
    }

    fn package_names(&self, repo: &str) -> Result<Vec<String>> {
        Ok(self
            .records(repo)?
            .entries
            .into_iter()
            .map(|entry| entry.package)
            .collect())
    }

    fn record(&self, repo: &str, name: &str) -> Result<Option<PackageRecord>> {
        // Duplicate lines are possible; the last one in the file wins
        Ok(self
            .records(repo)?
            .entries
            .into_iter()
            .rev()
            .find(|entry| entry.package == name)
            .map(|entry| entry.record))
    }

    fn records(&self, repo: &str) -> Result<RecordSet> {
        let mut set = RecordSet::default();

        self.scan(repo, |line| match line {
            ScannedLine::Record { number, text } => set.entries.push(RecordEntry {
                package: line_key(text).to_string(),
                line: Some(number),
                raw: text.to_string(),
                record: PackageRecord::parse(text),
            }),
            ScannedLine::Unreadable => set.errors += 1,
        })?;

        Ok(set)
    }

    fn count_records(&self, repo: &str) -> Result<RecordCount> {
        let mut count = RecordCount::default();
        self.scan(repo, |line| match line {
            ScannedLine::Record { .. } => count.records += 1,
            ScannedLine::Unreadable => count.errors += 1,
        })?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const CORE: &str = "# Repository: core\n\
        # Generated: 2026-10-18T09:30:00Z\n\
        # Package count: 2\n\
        # Format: package-name version1 version2 commit-hash\n\
        #\n\
        bash 5.2.037-1 5.2.026-2 fedcba9876543210\n\
        glibc 2.40-1 2.39-2 0123456789abcdef\n";

    fn create_test_store() -> (TempDir, ConsolidatedStore) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("core.txt"), CORE).unwrap();
        fs::write(
            root.join("extra.txt"),
            "# Repository: extra\n#\nfirefox 120.0 119.0 abcdef1234567890\n\n   \nfirefox-esr 115.5 115.4 1111111122222222\n",
        )
        .unwrap();
        fs::write(root.join("notes.md"), "ignored").unwrap();
        fs::create_dir_all(root.join("dir.txt")).unwrap();

        let store = ConsolidatedStore::new(root);
        (temp_dir, store)
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_repositories() {
        let (_temp, store) = create_test_store();
        assert_eq!(store.repositories().unwrap(), vec!["core", "extra"]);
    }

    #[test]
    fn test_records_with_line_numbers() {
        let (_temp, store) = create_test_store();
        let set = store.records("core").unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.errors, 0);
        assert_eq!(set.entries[0].package, "bash");
        assert_eq!(set.entries[0].line, Some(6));
        assert_eq!(set.entries[1].line, Some(7));
        assert_eq!(
            set.entries[1].record,
            PackageRecord::new("glibc", "2.40-1", "2.39-2", "0123456789abcdef")
        );
    }

    #[test]
    fn test_blank_lines_skipped() {
        let (_temp, store) = create_test_store();
        let set = store.records("extra").unwrap();

        let lines: Vec<_> = set.entries.iter().map(|e| e.line.unwrap()).collect();
        assert_eq!(lines, vec![3, 6]);
        assert_eq!(store.count_records("extra").unwrap().records, 2);
    }

    #[test]
    fn test_missing_repository() {
        let (_temp, store) = create_test_store();
        assert!(matches!(store.records("community"), Err(Error::RepositoryNotFound(_))));
        assert!(matches!(store.count_records("notes"), Err(Error::RepositoryNotFound(_))));
        assert!(matches!(store.records("dir"), Err(Error::RepositoryNotFound(_))));
    }

    #[test]
    fn test_record_last_duplicate_wins() {
        let (temp, store) = create_test_store();
        fs::write(
            temp.path().join("dupes.txt"),
            "# header\nfoo 1.0 0.9 aaaa\nbar 2.0 1.9 bbbb\nfoo 1.1 1.0 cccc\n",
        )
        .unwrap();

        let record = store.record("dupes", "foo").unwrap().unwrap();
        assert_eq!(record.version, "1.1");
        assert_eq!(record.commit_hash, "cccc");
        assert!(store.record("dupes", "baz").unwrap().is_none());
        assert_eq!(store.package_names("dupes").unwrap(), vec!["foo", "bar", "foo"]);
    }

    #[test]
    fn test_malformed_line_keeps_key() {
        let (temp, store) = create_test_store();
        fs::write(temp.path().join("odd.txt"), "#\nfoo\nbar 1 0 abc\n").unwrap();

        let set = store.records("odd").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.entries[0].package, "foo");
        assert!(set.entries[0].record.is_malformed());
        assert_eq!(store.count_records("odd").unwrap().records, 2);
    }

    #[test]
    fn test_invalid_utf8_line_counted_and_skipped() {
        let (temp, store) = create_test_store();
        let mut content = b"# header\nfoo 1.0 0.9 aaaa\n".to_vec();
        content.extend_from_slice(&[0xff, 0xfe, b'\n']);
        content.extend_from_slice(b"bar 2.0 1.9 bbbb\n");
        fs::write(temp.path().join("mixed.txt"), content).unwrap();

        let set = store.records("mixed").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.errors, 1);
        assert_eq!(set.entries[1].line, Some(4));
        assert_eq!(
            store.count_records("mixed").unwrap(),
            RecordCount {
                records: 2,
                errors: 1
            }
        );
    }

    #[test]
    fn test_write_repository_overwrites() {
        let temp = TempDir::new().unwrap();
        let store = ConsolidatedStore::new(temp.path().join("out"));

        let lines = vec!["bash 1 0 aaaa".to_string(), "zsh 2 1 bbbb".to_string()];
        let (path, bytes) = store.write_repository("core", &lines, fixed_time()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(bytes, content.len() as u64);
        assert!(content.starts_with("# Repository: core\n# Generated: 2026-10-18T09:30:00Z\n"));
        assert!(content.contains("# Package count: 2\n"));
        assert!(content.ends_with("#\nbash 1 0 aaaa\nzsh 2 1 bbbb\n"));

        store.write_repository("core", &lines[..1], fixed_time()).unwrap();
        assert_eq!(store.count_records("core").unwrap().records, 1);
    }

    #[test]
    fn test_write_empty_repository() {
        let temp = TempDir::new().unwrap();
        let store = ConsolidatedStore::new(temp.path());

        store.write_repository("empty", &[], fixed_time()).unwrap();

        assert_eq!(store.repositories().unwrap(), vec!["empty"]);
        assert_eq!(store.count_records("empty").unwrap().records, 0);
        assert!(store.records("empty").unwrap().is_empty());
    }

    #[test]
    fn test_render_header() {
        let header = render_header("extra", fixed_time(), 42);
        let lines: Vec<_> = header.lines().collect();
        assert_eq!(
            lines,
            vec![
                "# Repository: extra",
                "# Generated: 2026-10-18T09:30:00Z",
                "# Package count: 42",
                "# Format: package-name version1 version2 commit-hash",
                "#",
            ]
        );
    }
}
