// src/cli/mod.rs

//! Shared plumbing for the pkgstate command-line tools
//!
//! Logging setup, shell completions and exit-code handling used by the
//! `pkgstate`, `pkgstate-txt` and `pkgstate-consolidate` binaries.

pub mod output;

use clap::CommandFactory;
use clap_complete::Shell;
use std::io;
use std::process::ExitCode;

/// Default log filter when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "warn";

/// Initialize the tracing subscriber
///
/// Logs go to stderr so stdout only carries query results.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Write shell completions for the tool's command tree to stdout
pub fn print_completions<C: CommandFactory>(shell: Shell) {
    let mut cmd = C::command();
    let bin_name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

/// Turn the outcome of a tool run into its process exit code
///
/// Errors are printed as `Error: <cause chain>` on stderr.
pub fn exit_code(result: anyhow::Result<ExitCode>) -> ExitCode {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
