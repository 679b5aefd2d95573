// src/bin/pkgstate-txt.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use pkgstate::cli::{self, output::Output, output::group_digits};
use pkgstate::store::consolidated::EXTENSION;
use pkgstate::{ConsolidatedStore, MatchMode, PackageQuery, PackageStore};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pkgstate-txt")]
#[command(author, version, long_about = None)]
#[command(about = "Query package state repositories (consolidated format)")]
#[command(after_help = "Examples:
  # Search for a package
  pkgstate-txt search firefox

  # Exact package name search
  pkgstate-txt search firefox --exact

  # List all packages in a repository
  pkgstate-txt list extra-x86_64

  # List all repositories
  pkgstate-txt repos")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a package across all consolidated files
    Search {
        /// Package name (case-insensitive substring unless --exact)
        package: String,
        /// Exact match for package search
        #[arg(long)]
        exact: bool,
        /// Path to repository (default: current directory)
        #[arg(long, default_value = ".")]
        repo_path: String,
    },
    /// List all packages in a repository
    List {
        /// Repository name
        repo: String,
        /// Path to repository (default: current directory)
        #[arg(long, default_value = ".")]
        repo_path: String,
    },
    /// List all available repositories
    Repos {
        /// Path to repository (default: current directory)
        #[arg(long, default_value = ".")]
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
        Commands::Search {
            package,
            exact,
            repo_path,
        } => {
            let store = ConsolidatedStore::new(&repo_path);
            let results =
                PackageQuery::new(&store).search(&package, MatchMode::from_exact(exact))?;

            if results.hits.is_empty() {
                let code = out.not_found(&format!("No packages found matching '{}'", package));
                out.read_errors(results.errors);
                return Ok(code);
            }

            if out.is_json() {
                out.data(&results)?;
            } else {
                println!("Found {} package(s):\n", results.hits.len());
                for hit in &results.hits {
                    println!("Repository: {}", hit.repository);
                    println!("  {}", hit.raw);
                    println!();
                }
                out.read_errors(results.errors);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::List { repo, repo_path } => {
            let store = ConsolidatedStore::new(&repo_path);
            let set = match store.records(&repo) {
                Ok(set) => set,
                Err(e) if e.is_not_found() => {
                    return Ok(out.not_found(&format!("Error: {}", e)));
                }
                Err(e) => return Err(e.into()),
            };

            if out.is_json() {
                out.data(&serde_json::json!({
                    "repository": repo,
                    "entries": set.entries,
                    "errors": set.errors,
                }))?;
            } else {
                println!("Packages in {} ({} total):\n", repo, set.len());
                for line in set.raw_lines() {
                    println!("  {}", line);
                }
                out.read_errors(set.errors);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Repos { repo_path } => {
            let store = ConsolidatedStore::new(&repo_path);
            let listing = PackageQuery::new(&store).repositories()?;

            if listing.repositories.is_empty() {
                return Ok(out.not_found("No repositories found"));
            }

            if out.is_json() {
                out.data(&listing)?;
                return Ok(ExitCode::SUCCESS);
            }

            println!("Available repositories:\n");
            println!("{:<40} {:<30} {:>10}", "Repository", "File", "Packages");
            println!("{}", "-".repeat(82));
            for repo in &listing.repositories {
                println!(
                    "{:<40} {:<30} {:>10}",
                    repo.name,
                    format!("{}.{}", repo.name, EXTENSION),
                    group_digits(repo.package_count as u64)
                );
            }

            println!();
            println!(
                "{:<40} {} files {:>20} packages",
                "Total",
                listing.repositories.len(),
                group_digits(listing.total_packages() as u64)
            );
            out.read_errors(listing.total_errors());
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
    fn test_parse_search_flags() {
        let cli = Cli::try_parse_from([
            "pkgstate-txt",
            "search",
            "firefox",
            "--exact",
            "--repo-path",
            "/srv/state",
        ])
        .unwrap();

        match cli.command {
            Commands::Search {
                package,
                exact,
                repo_path,
            } => {
                assert_eq!(package, "firefox");
                assert!(exact);
                assert_eq!(repo_path, "/srv/state");
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_list_requires_repository() {
        assert!(Cli::try_parse_from(["pkgstate-txt", "list"]).is_err());
    }
}
