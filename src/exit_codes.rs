//! Exit code constants for the restyle CLI.
//!
//! - 0: Success
//! - 1: Rewrite failure, or rewrite completed with recorded soft errors
//! - 2: Environment precondition failure (detected before any mutation)

/// Successful execution with a clean outcome.
pub const SUCCESS: i32 = 0;

/// The rewrite failed, or completed with recorded soft errors.
pub const REWRITE_FAILURE: i32 = 1;

/// An environment precondition failed: not inside a repository, git too old,
/// unsupported formatter version, or an unreadable configuration file.
pub const PRECONDITION_FAILURE: i32 = 2;
