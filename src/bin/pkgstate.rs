// src/bin/pkgstate.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use pkgstate::cli::{self, output::Output};
use pkgstate::{ExpandedStore, MatchMode, PackageQuery};
use serde_json::json;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "pkgstate")]
#[command(author, version, long_about = None)]
#[command(about = "Query package state repositories (expanded layout)")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a package across all repositories
    Search {
        /// Package name to search for
        package: String,
        /// Repository root (default: current directory)
        #[arg(short, long, default_value = ".")]
        repo_path: String,
    },
    /// List packages
    List {
        /// Repository name to list packages from
        #[arg(long)]
        repo: Option<String>,
        /// Repository root (default: current directory)
        #[arg(short, long, default_value = ".")]
        repo_path: String,
    },
    /// Get package information
    Info {
        /// Package name
        package: String,
        /// Repository name
        repo: String,
        /// Repository root (default: current directory)
        #[arg(short, long, default_value = ".")]
        repo_path: String,
    },
    /// List all repositories
    Repos {
        /// Repository root (default: current directory)
        #[arg(short, long, default_value = ".")]
        repo_path: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        shell: Shell,
    },
}

fn run(cli: Cli) -> Result<ExitCode> {
    let out = Output::new(cli.json);

    match cli.command {
        Commands::Search { package, repo_path } => {
            debug!("Searching {} for {}", repo_path, package);
            let store = ExpandedStore::new(&repo_path);
            let results = PackageQuery::new(&store).search(&package, MatchMode::Exact)?;

            if results.hits.is_empty() {
                let code = out.not_found(&format!(
                    "Package '{}' not found in any repository",
                    package
                ));
                out.read_errors(results.errors);
                return Ok(code);
            }

            if out.is_json() {
                out.data(&results)?;
            } else {
                println!(
                    "Found '{}' in {} repository/repositories:",
                    package,
                    results.hits.len()
                );
                for hit in &results.hits {
                    println!(
                        "  {}: {} {} (commit: {})",
                        hit.repository,
                        hit.package,
                        hit.record.version,
                        hit.record.short_commit()
                    );
                }
                out.read_errors(results.errors);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::List { repo, repo_path } => {
            let store = ExpandedStore::new(&repo_path);
            let listing = match PackageQuery::new(&store).list_packages(repo.as_deref()) {
                Ok(listing) => listing,
                Err(e) if e.is_not_found() => return Ok(out.not_found(&e.to_string())),
                Err(e) => return Err(e.into()),
            };

            if out.is_json() {
                out.data(&listing)?;
            } else if listing.packages.is_empty() {
                match &repo {
                    Some(repo) => println!("No packages found in {}", repo),
                    None => println!("No packages found"),
                }
            } else {
                match &repo {
                    Some(repo) => println!("Packages in {}:", repo),
                    None => println!("All packages:"),
                }
                for package in &listing.packages {
                    println!("  {}", package);
                }
            }
            out.read_errors(listing.errors);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Info {
            package,
            repo,
            repo_path,
        } => {
            let store = ExpandedStore::new(&repo_path);
            let record = match PackageQuery::new(&store).info(&package, &repo) {
                Ok(Some(record)) => record,
                Ok(None) => {
                    return Ok(out.not_found(&format!(
                        "Package '{}' not found in repository '{}'",
                        package, repo
                    )));
                }
                Err(e) if e.is_not_found() => return Ok(out.not_found(&e.to_string())),
                Err(e) => return Err(e.into()),
            };

            if out.is_json() {
                out.data(&json!({ "repository": repo, "record": record }))?;
            } else {
                println!("Package: {}", record.name);
                println!("Repository: {}", repo);
                println!("Version: {}", record.version);
                println!("Previous version: {}", record.previous_version);
                println!("Commit: {}", record.commit_hash);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Repos { repo_path } => {
            let store = ExpandedStore::new(&repo_path);
            let listing = PackageQuery::new(&store).repositories()?;

            if out.is_json() {
                out.data(&listing)?;
            } else {
                println!("Available repositories:");
                for repo in &listing.repositories {
                    println!("  {} ({} packages)", repo.name, repo.package_count);
                }
                out.read_errors(listing.total_errors());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Completions { shell } => {
            cli::print_completions::<Cli>(shell);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    cli::init_tracing();
    cli::exit_code(run(Cli::parse()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_info_arguments() {
        let cli =
            Cli::try_parse_from(["pkgstate", "info", "bash", "core", "-r", "/srv/state"]).unwrap();
        match cli.command {
            Commands::Info {
                package,
                repo,
                repo_path,
            } => {
                assert_eq!(package, "bash");
                assert_eq!(repo, "core");
                assert_eq!(repo_path, "/srv/state");
            }
            _ => panic!("expected info command"),
        }
    }

    #[test]
    fn test_info_requires_repository() {
        assert!(Cli::try_parse_from(["pkgstate", "info", "bash"]).is_err());
    }
}
