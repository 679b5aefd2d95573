// src/store/memory.rs

//! In-memory package state store for tests and embedding.
//!
//! [`MemoryStore`] keeps repositories in a `BTreeMap` and records in
//! insertion order. It implements the full [`PackageStore`] trait, so query
//! logic can be exercised without touching the filesystem.

use super::{PackageStore, RecordEntry, RecordSet};
use crate::error::{Error, Result};
use crate::record::{PackageRecord, line_key};
use std::collections::BTreeMap;

/// An in-memory implementation of [`PackageStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    repos: BTreeMap<String, RecordSet>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty repository (no-op if it already exists).
    pub fn add_repository(&mut self, repo: &str) -> &mut Self {
        self.repos.entry(repo.to_string()).or_default();
        self
    }

    /// Append a record, creating the repository if needed.
    pub fn insert(&mut self, repo: &str, record: PackageRecord) -> &mut Self {
        let raw = record.to_line();
        self.push(repo, record.name.clone(), raw, record)
    }

    /// Append a raw record line, parsed the same way the file layouts parse it.
    pub fn insert_line(&mut self, repo: &str, line: &str) -> &mut Self {
        let raw = line.trim().to_string();
        let record = PackageRecord::parse(&raw);
        self.push(repo, line_key(&raw).to_string(), raw, record)
    }

    /// Count an unreadable entry against a repository.
    pub fn record_error(&mut self, repo: &str) -> &mut Self {
        self.repos.entry(repo.to_string()).or_default().errors += 1;
        self
    }

    fn push(
        &mut self,
        repo: &str,
        package: String,
        raw: String,
        record: PackageRecord,
    ) -> &mut Self {
        self.repos
            .entry(repo.to_string())
            .or_default()
            .entries
            .push(RecordEntry {
                package,
                line: None,
                raw,
                record,
            });
        self
    }

    fn get(&self, repo: &str) -> Result<&RecordSet> {
        self.repos
            .get(repo)
            .ok_or_else(|| Error::RepositoryNotFound(repo.to_string()))
    }
}

impl PackageStore for MemoryStore {
    fn repositories(&self) -> Result<Vec<String>> {
        Ok(self.repos.keys().cloned().collect())
    }

    fn package_names(&self, repo: &str) -> Result<Vec<String>> {
        Ok(self.get(repo)?.entries.iter().map(|e| e.package.clone()).collect())
    }

    fn record(&self, repo: &str, name: &str) -> Result<Option<PackageRecord>> {
        Ok(self
            .get(repo)?
            .entries
            .iter()
            .rev()
            .find(|entry| entry.package == name)
            .map(|entry| entry.record.clone()))
    }

    fn records(&self, repo: &str) -> Result<RecordSet> {
        self.get(repo).cloned()
    }
}
