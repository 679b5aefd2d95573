// src/consolidate.rs

//! Consolidation of the expanded layout into the consolidated layout
//!
//! Each repository directory is rewritten as a single `<repo>.txt` file
//! holding every non-empty package record, in sorted file-name order, under
//! a `#` header. The consolidated files are derived artifacts: every run
//! overwrites them completely, and a failed run is repaired by running it
//! again.

use crate::error::Result;
use crate::store::{ConsolidatedStore, ExpandedStore, PackageStore};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{info, warn};

/// Outcome of consolidating one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationReport {
    pub repository: String,
    pub path: PathBuf,
    /// Records written
    pub packages: usize,
    /// Package files that could not be read and were left out
    pub errors: usize,
    /// Size of the written file
    pub bytes: u64,
}

/// Outcome of consolidating every repository under a root
#[derive(Debug, Clone, Default)]
pub struct ConsolidationSummary {
    pub reports: Vec<ConsolidationReport>,
    /// Repositories whose consolidation failed, with the error message
    pub failed: Vec<(String, String)>,
}

impl ConsolidationSummary {
    pub fn total_packages(&self) -> usize {
        self.reports.iter().map(|r| r.packages).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.reports.iter().map(|r| r.errors).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Consolidate one expanded repository into its consolidated file
///
/// Unreadable package files are counted in the report and skipped; empty
/// package files are dropped silently. The consolidated file is always
/// rewritten from scratch.
pub fn consolidate_repository(
    source: &ExpandedStore,
    target: &ConsolidatedStore,
    repo: &str,
    generated_at: DateTime<Utc>,
) -> Result<ConsolidationReport> {
    let set = source.records(repo)?;
    let lines: Vec<String> = set.raw_lines().map(str::to_string).collect();

    let (path, bytes) = target.write_repository(repo, &lines, generated_at)?;

    info!(
        "Consolidated {} packages from {} into {} ({} errors)",
        lines.len(),
        repo,
        path.display(),
        set.errors
    );

    Ok(ConsolidationReport {
        repository: repo.to_string(),
        path,
        packages: lines.len(),
        errors: set.errors,
        bytes,
    })
}

/// Consolidate every repository of the expanded store
///
/// A failure in one repository is logged and recorded in the summary;
/// the remaining repositories are still consolidated. Only a failure to
/// enumerate the source root is returned as an error.
pub fn consolidate_all(
    source: &ExpandedStore,
    target: &ConsolidatedStore,
) -> Result<ConsolidationSummary> {
    consolidate_each(source, target, Utc::now(), |_| {})
}

/// Like [`consolidate_all`], calling `progress` after each repository
pub fn consolidate_each(
    source: &ExpandedStore,
    target: &ConsolidatedStore,
    generated_at: DateTime<Utc>,
    mut progress: impl FnMut(&std::result::Result<ConsolidationReport, (String, String)>),
) -> Result<ConsolidationSummary> {
    let repos = source.repositories()?;
    info!("Found {} repositories to consolidate", repos.len());

    let mut summary = ConsolidationSummary::default();
    for repo in repos {
        let outcome = consolidate_repository(source, target, &repo, generated_at).map_err(|e| {
            warn!("Failed to consolidate {}: {}", repo, e);
            (repo.clone(), e.to_string())
        });

        progress(&outcome);
        match outcome {
            Ok(report) => summary.reports.push(report),
            Err(failure) => summary.failed.push(failure),
        }
    }

    Ok(summary)
}
