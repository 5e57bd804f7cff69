//! Fail-fast environment precondition checks.
//!
//! All checks run before any mutation: a failure here means no worktree was
//! ever created (exit code 2). The formatter version pin lives on
//! [`crate::restyle::Formatter::check_version`] and is invoked alongside
//! these from the command entry point.

use crate::error::{RestyleError, Result};
use crate::git;
use std::path::{Path, PathBuf};

/// Minimum git version: `git worktree remove` appeared in 2.17.0.
pub const MIN_GIT_VERSION: (u32, u32, u32) = (2, 17, 0);

/// The ambient directory must be inside a git working copy.
pub fn ensure_inside_repository() -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| {
        RestyleError::Precondition(format!("failed to get current working directory: {}", e))
    })?;
    git::detect_repo_root(cwd)
}

/// The installed git must support worktree removal.
pub fn ensure_worktree_support(repo_root: &Path) -> Result<()> {
    let version = git::git_version(repo_root)?;
    if !meets_minimum(version) {
        let (major, minor, patch) = version;
        let (need_major, need_minor, need_patch) = MIN_GIT_VERSION;
        return Err(RestyleError::Precondition(format!(
            "git {}.{}.{} is too old; {}.{}.{} or newer is required for worktree removal",
            major, minor, patch, need_major, need_minor, need_patch
        )));
    }
    Ok(())
}

fn meets_minimum(version: (u32, u32, u32)) -> bool {
    version >= MIN_GIT_VERSION
}
