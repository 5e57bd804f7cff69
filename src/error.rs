//! Error types for the restyle CLI.
//!
//! Uses thiserror for derive macros. Each variant maps to a process exit code
//! through [`RestyleError::exit_code`].

use crate::exit_codes;
use thiserror::Error;

/// Main error type for restyle operations.
#[derive(Error, Debug)]
pub enum RestyleError {
    /// An environment precondition failed before any mutation was attempted.
    #[error("{0}")]
    Precondition(String),

    /// The configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The worktree manager was misused or its derived path is unusable.
    #[error("{0}")]
    Setup(String),

    /// A required revision, remote, or switch-point commit was not found.
    #[error("{0}")]
    Lookup(String),

    /// A wrapped external tool exited non-zero. Carries the command line,
    /// the exit code, and the captured stderr. Never retried.
    #[error("`{command}` failed (exit code {code}): {stderr}")]
    Tool {
        command: String,
        code: i32,
        stderr: String,
    },
}

impl RestyleError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RestyleError::Precondition(_) | RestyleError::Config(_) => {
                exit_codes::PRECONDITION_FAILURE
            }
            RestyleError::Setup(_) | RestyleError::Lookup(_) | RestyleError::Tool { .. } => {
                exit_codes::REWRITE_FAILURE
            }
        }
    }
}

/// Result type alias for restyle operations.
pub type Result<T> = std::result::Result<T, RestyleError>;
