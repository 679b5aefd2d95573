// src/query.rs

//! Layout-agnostic package queries
//!
//! `PackageQuery` answers search, list, info and repository summaries over
//! any [`PackageStore`], so the expanded and consolidated layouts give the
//! same answers for the same data.

use crate::error::Result;
use crate::record::PackageRecord;
use crate::store::PackageStore;
use serde::Serialize;
use tracing::{debug, warn};

/// How a search query is compared against package names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Package name must equal the query
    Exact,
    /// Package name must contain the query, ignoring case
    Substring,
}

impl MatchMode {
    pub fn from_exact(exact: bool) -> Self {
        if exact { MatchMode::Exact } else { MatchMode::Substring }
    }

    fn matches(self, query: &Needle<'_>, package: &str) -> bool {
        match self {
            MatchMode::Exact => package == query.original,
            MatchMode::Substring => package.to_lowercase().contains(&query.folded),
        }
    }
}

/// Search query with its case-folded form computed once
struct Needle<'q> {
    original: &'q str,
    folded: String,
}

/// A package that matched a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub repository: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub package: String,
    pub raw: String,
    pub record: PackageRecord,
}

/// Search hits in encounter order plus the number of items that could not be read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    pub errors: usize,
}

/// Qualified package names plus the number of items that could not be read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageListing {
    pub packages: Vec<String>,
    pub errors: usize,
}

/// Package count for one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySummary {
    pub name: String,
    pub package_count: usize,
    /// Package entries that could not be read
    pub errors: usize,
}

/// All repository summaries plus the number of repositories that could not be counted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryListing {
    pub repositories: Vec<RepositorySummary>,
    pub errors: usize,
}

impl RepositoryListing {
    pub fn total_packages(&self) -> usize {
        self.repositories.iter().map(|r| r.package_count).sum()
    }

    /// Unreadable package entries plus repositories that could not be counted
    pub fn total_errors(&self) -> usize {
        self.errors + self.repositories.iter().map(|r| r.errors).sum::<usize>()
    }
}

/// Query engine over a package store
pub struct PackageQuery<'a, S: PackageStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: PackageStore + ?Sized> PackageQuery<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Search every repository for matching package names
    ///
    /// Hits keep encounter order: repositories in enumeration order, then
    /// records in store order. A repository that cannot be read is skipped
    /// and counted in `errors`.
    pub fn search(&self, query: &str, mode: MatchMode) -> Result<SearchResults> {
        let needle = Needle {
            original: query,
            folded: query.to_lowercase(),
        };
        let mut results = SearchResults::default();

        for repo in self.store.repositories()? {
            let set = match self.store.records(&repo) {
                Ok(set) => set,
                Err(e) => {
                    warn!("Skipping repository {} during search: {}", repo, e);
                    results.errors += 1;
                    continue;
                }
            };

            results.errors += set.errors;
            results.hits.extend(
                set.entries
                    .into_iter()
                    .filter(|entry| mode.matches(&needle, &entry.package))
                    .map(|entry| SearchHit {
                        repository: repo.clone(),
                        line: entry.line,
                        package: entry.package,
                        raw: entry.raw,
                        record: entry.record,
                    }),
            );
        }

        debug!("Search for '{}' ({:?}) found {} hits", query, mode, results.hits.len());
        Ok(results)
    }

    /// List qualified package names (`repository/package`), sorted
    ///
    /// With a filter, a missing repository is `Error::RepositoryNotFound`
    /// while an empty one yields an empty list. Without one, a repository
    /// that cannot be read is skipped and counted in `errors`.
    pub fn list_packages(&self, repo_filter: Option<&str>) -> Result<PackageListing> {
        let repos = match repo_filter {
            Some(repo) => vec![repo.to_string()],
            None => self.store.repositories()?,
        };

        let mut listing = PackageListing::default();
        for repo in &repos {
            let set = match self.store.records(repo) {
                Ok(set) => set,
                Err(e) if repo_filter.is_some() => return Err(e),
                Err(e) => {
                    warn!("Skipping repository {} while listing: {}", repo, e);
                    listing.errors += 1;
                    continue;
                }
            };

            listing.errors += set.errors;
            listing.packages.extend(
                set.entries
                    .into_iter()
                    .map(|entry| format!("{}/{}", repo, entry.package)),
            );
        }

        listing.packages.sort();
        Ok(listing)
    }

    /// Look up one package in one repository
    ///
    /// Returns `Err(Error::RepositoryNotFound)` if the repository is missing
    /// and `Ok(None)` if only the package is.
    pub fn info(&self, name: &str, repo: &str) -> Result<Option<PackageRecord>> {
        self.store.record(repo, name)
    }

    /// Summarize every repository with its record count
    pub fn repositories(&self) -> Result<RepositoryListing> {
        let mut listing = RepositoryListing::default();

        for name in self.store.repositories()? {
            match self.store.count_records(&name) {
                Ok(count) => listing.repositories.push(RepositorySummary {
                    name,
                    package_count: count.records,
                    errors: count.errors,
                }),
                Err(e) => {
                    warn!("Failed to count packages in {}: {}", name, e);
                    listing.errors += 1;
                }
            }
        }

        Ok(listing)
    }
}
