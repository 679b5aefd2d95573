// src/lib.rs

//! pkgstate
//!
//! Tracks the state of every package in a repository mirror: current
//! version, previous version, and the commit that produced it.
//!
//! # Architecture
//!
//! - Record-first: one whitespace-separated line per package
//!   (`name version previous-version commit-hash`)
//! - Two layouts: expanded (directory per repository, file per package) and
//!   consolidated (one `<repo>.txt` per repository)
//! - Layout-agnostic queries: `PackageQuery` runs against any `PackageStore`
//! - Consolidation is a full, non-transactional rewrite of derived files

pub mod cli;
pub mod consolidate;
mod error;
pub mod query;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use query::{MatchMode, PackageQuery};
pub use record::PackageRecord;
pub use store::{ConsolidatedStore, ExpandedStore, MemoryStore, PackageStore, RecordCount};
