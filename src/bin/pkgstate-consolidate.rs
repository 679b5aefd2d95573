// src/bin/pkgstate-consolidate.rs

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use pkgstate::cli::{self, output::group_digits};
use pkgstate::consolidate::consolidate_each;
use pkgstate::{ConsolidatedStore, ExpandedStore};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Consolidate per-package files into one file per repository directory
#[derive(Parser)]
#[command(name = "pkgstate-consolidate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Repository root holding one directory per repository
    #[arg(default_value = ".")]
    repo_path: PathBuf,
}

fn run(cli: Cli) -> Result<ExitCode> {
    let root = cli
        .repo_path
        .canonicalize()
        .with_context(|| format!("Repository path {} not found", cli.repo_path.display()))?;

    let rule = "=".repeat(80);
    println!("{}", rule);
    println!("REPOSITORY CONSOLIDATION");
    println!("{}", rule);
    println!("Repository: {}", root.display());
    println!();

    info!("Consolidating repositories under {}", root.display());
    let source = ExpandedStore::new(&root);
    let target = ConsolidatedStore::new(&root);

    let summary = consolidate_each(&source, &target, Utc::now(), |outcome| match outcome {
        Ok(report) => println!(
            "Consolidating {}... ✓ {} packages → {}.txt",
            report.repository, report.packages, report.repository
        ),
        Err((repo, message)) => println!("Consolidating {}... ✗ {}", repo, message),
    })?;

    println!();
    println!("{}", rule);
    println!("CONSOLIDATION COMPLETE");
    println!("{}", rule);
    println!("Created files: {}", summary.reports.len());
    println!("Total packages: {}", group_digits(summary.total_packages() as u64));
    println!("Errors: {}", summary.total_errors());
    if !summary.failed.is_empty() {
        println!("Failed repositories: {}", summary.failed.len());
    }
    println!();

    if !summary.reports.is_empty() {
        println!("Created consolidated files:");
        for report in &summary.reports {
            let file_name = report
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("  {:<40} {:>8} bytes", file_name, group_digits(report.bytes));
        }
        println!();
    }

    println!("Original directories preserved. Remove them manually if no longer needed.");

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> ExitCode {
    cli::init_tracing();
    cli::exit_code(run(Cli::parse()))
}
