//! Restyle: rebase and restyle a Git branch across a code-style migration.
//!
//! This is the main entry point for the `restyle` CLI. It parses arguments,
//! runs the rewrite, and maps errors to exit codes.

mod cli;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod git;
pub mod preflight;
pub mod progress;
pub mod restyle;
pub mod revisions;
pub mod rewrite;
pub mod vcs;
pub mod worktree;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match rewrite::execute(cli) {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
