//! Isolated worktree management for a rewrite run.
//!
//! The rewrite never mutates the user's primary checkout: all history
//! surgery happens in a disposable worktree created next to the main working
//! directory and removed again on both success and failure paths. Exactly one
//! worktree is live per manager instance at any time.

use crate::error::{RestyleError, Result};
use crate::vcs::Vcs;
use std::env;
use std::path::PathBuf;

/// Manages the single disposable worktree of a rewrite run.
#[derive(Debug)]
pub struct WorktreeManager {
    repo_root: PathBuf,
    active: Option<ActiveWorktree>,
}

#[derive(Debug)]
struct ActiveWorktree {
    path: PathBuf,
    original_dir: PathBuf,
}

impl WorktreeManager {
    pub fn new(repo_root: PathBuf) -> Self {
        Self {
            repo_root,
            active: None,
        }
    }

    /// Create the isolated worktree and enter it.
    ///
    /// The directory name is derived from the label and the process id, and
    /// placed as a sibling of the main working directory. The process's
    /// working directory is switched into the new worktree; `teardown`
    /// restores it.
    pub fn prepare(&mut self, vcs: &dyn Vcs, label: &str) -> Result<PathBuf> {
        if self.active.is_some() {
            return Err(RestyleError::Setup(
                "a worktree is already prepared for this rewrite".to_string(),
            ));
        }

        let parent = self.repo_root.parent().ok_or_else(|| {
            RestyleError::Setup(format!(
                "repository root '{}' has no parent directory to place a worktree in",
                self.repo_root.display()
            ))
        })?;
        let path = parent.join(worktree_dir_name(label));

        if path.exists() {
            return Err(RestyleError::Setup(format!(
                "worktree path '{}' already exists; remove it and retry",
                path.display()
            )));
        }

        let original_dir = env::current_dir().map_err(|e| {
            RestyleError::Setup(format!("failed to get current working directory: {}", e))
        })?;

        vcs.create_worktree(&self.repo_root, &path)?;

        // Registered before entering, so a failed directory switch still
        // leaves the worktree removable through teardown.
        self.active = Some(ActiveWorktree {
            path: path.clone(),
            original_dir,
        });
        env::set_current_dir(&path).map_err(|e| {
            RestyleError::Setup(format!(
                "failed to enter worktree '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(path)
    }

    /// Move the active worktree's HEAD to `spec` without attaching a branch
    /// name, so commits can be created and discarded freely.
    pub fn checkout_detached(&self, vcs: &dyn Vcs, spec: &str) -> Result<()> {
        let active = self.active.as_ref().ok_or_else(|| {
            RestyleError::Setup("no worktree prepared for this rewrite".to_string())
        })?;
        vcs.checkout_detached(&active.path, spec)
    }

    /// Restore the original working directory and remove the worktree.
    ///
    /// Idempotent: does nothing if never prepared or already torn down.
    pub fn teardown(&mut self, vcs: &dyn Vcs) -> Result<()> {
        let Some(active) = self.active.take() else {
            return Ok(());
        };

        // The worktree cannot be removed while the process still sits inside
        // it; fall back to the repository root if the original directory is
        // gone.
        if env::set_current_dir(&active.original_dir).is_err() {
            env::set_current_dir(&self.repo_root).map_err(|e| {
                RestyleError::Setup(format!("failed to leave worktree: {}", e))
            })?;
        }

        vcs.remove_worktree(&self.repo_root, &active.path)
    }
}

/// Directory name for a rewrite worktree: label slug plus process id.
///
/// The pid keeps concurrent runs against different branches apart; callers
/// are responsible for not rewriting the same branch twice at once.
pub fn worktree_dir_name(label: &str) -> String {
    format!("restyle-{}-{}", sanitize_label(label), std::process::id())
}

/// Sanitize a branch name for use in a directory name.
///
/// Converts to lowercase, replaces runs of non-alphanumerics with single
/// hyphens, and trims leading/trailing hyphens.
fn sanitize_label(label: &str) -> String {
    let mut result = String::new();
    let mut last_was_hyphen = true;

    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    result
}
