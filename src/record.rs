// src/record.rs

//! Package state record codec
//!
//! A package state line holds four whitespace-separated fields:
//! `package-name version previous-version commit-hash`. Parsing is total:
//! lines with fewer than four tokens become the all-empty sentinel record
//! instead of an error, and tokens past the fourth are ignored.

use serde::Serialize;
use std::fmt;

/// Number of positional fields in a package state line
pub const EXPECTED_FIELDS: usize = 4;

/// Number of commit hash characters shown in human-readable output
pub const SHORT_COMMIT_LEN: usize = 8;

/// State of a single package in a repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub previous_version: String,
    pub commit_hash: String,
}

impl PackageRecord {
    /// Create a record from its four fields
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        previous_version: impl Into<String>,
        commit_hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            previous_version: previous_version.into(),
            commit_hash: commit_hash.into(),
        }
    }

    /// Parse a package state line
    ///
    /// Never fails. A line with fewer than four tokens yields the malformed
    /// sentinel (all fields empty), see [`PackageRecord::is_malformed`].
    pub fn parse(line: &str) -> Self {
        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
            (Some(name), Some(version), Some(previous), Some(commit)) => {
                Self::new(name, version, previous, commit)
            }
            _ => Self::default(),
        }
    }

    /// True if this is the sentinel produced for an unparseable line
    pub fn is_malformed(&self) -> bool {
        self.name.is_empty()
            && self.version.is_empty()
            && self.previous_version.is_empty()
            && self.commit_hash.is_empty()
    }

    /// Serialize the four fields joined by single spaces
    pub fn to_line(&self) -> String {
        self.to_string()
    }

    /// Commit hash truncated for display; the stored hash is never shortened
    pub fn short_commit(&self) -> &str {
        match self.commit_hash.char_indices().nth(SHORT_COMMIT_LEN) {
            Some((idx, _)) => &self.commit_hash[..idx],
            None => &self.commit_hash,
        }
    }
}

impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.name, self.version, self.previous_version, self.commit_hash
        )
    }
}

/// Canonical record line for the content of a package file
///
/// Returns `None` when the content is empty after trimming (an empty file is
/// treated as an absent package). Single-line content is kept verbatim apart
/// from the trim; content spanning several lines is folded into one line so
/// it stays a single record in the consolidated layout.
pub fn record_line(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }

    if !trimmed.contains(['\n', '\r']) {
        return Some(trimmed.to_string());
    }

    let folded = trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Some(folded)
}

/// First whitespace-separated token of a record line, used as its lookup key
pub fn line_key(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}
