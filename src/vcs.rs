//! Version-control capability interface.
//!
//! The orchestration logic never issues raw git argument lists itself; it
//! goes through this narrow trait so it can be exercised against a fake
//! implementation without a real version-control binary. [`GitCli`] is the
//! production implementation on top of [`crate::git::run_git`].

use crate::error::Result;
use crate::git::run_git;
use crate::revisions::Revision;
use std::path::Path;

/// How a path changed in a commit, from `--name-status` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Other,
}

impl ChangeKind {
    /// Deleted paths no longer exist in the working tree and cannot be
    /// handed to the formatter.
    pub fn is_deletion(&self) -> bool {
        matches!(self, ChangeKind::Deleted)
    }
}

/// A path touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPath {
    pub kind: ChangeKind,
    /// Repository-relative path with forward slashes. For renames and
    /// copies this is the destination path.
    pub path: String,
}

/// A configured remote with its fetch URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

/// The version-control operations the rewrite needs.
///
/// Every method takes the directory to operate in explicitly; implementations
/// hold no per-run state.
pub trait Vcs {
    /// Resolve a revision spec (branch name, `<rev>^`, `HEAD`) to a full id.
    fn resolve_revision(&self, dir: &Path, spec: &str) -> Result<Revision>;

    /// Commits reachable from `new_inclusive` but not `old_exclusive`, in the
    /// tool's native newest-first order.
    fn list_revisions(
        &self,
        dir: &Path,
        old_exclusive: &Revision,
        new_inclusive: &Revision,
    ) -> Result<Vec<Revision>>;

    /// The newest commit reachable from `tip` whose message contains `phrase`
    /// as a fixed string, if any.
    fn find_subject_match(&self, dir: &Path, tip: &str, phrase: &str) -> Result<Option<Revision>>;

    /// Configured remotes with their fetch URLs.
    fn remotes(&self, dir: &Path) -> Result<Vec<Remote>>;

    /// Create a detached worktree at `path`.
    fn create_worktree(&self, dir: &Path, path: &Path) -> Result<()>;

    /// Remove the worktree at `path` and its backing metadata.
    fn remove_worktree(&self, dir: &Path, path: &Path) -> Result<()>;

    /// Move HEAD to `spec` without attaching a branch name.
    fn checkout_detached(&self, dir: &Path, spec: &str) -> Result<()>;

    /// Rebase the current (detached) head onto `base`.
    fn rebase_onto(&self, dir: &Path, base: &Revision) -> Result<()>;

    /// Replay `commit` onto the current head, preferring the replayed
    /// commit's content on conflict and preserving emptiness.
    fn cherry_pick(&self, dir: &Path, commit: &Revision) -> Result<()>;

    /// Fold the working-tree state of `paths` into the head commit without
    /// changing its message or opening an editor.
    fn amend_paths(&self, dir: &Path, paths: &[String]) -> Result<()>;

    /// Paths touched by `spec`, with their change kinds.
    fn changed_paths(&self, dir: &Path, spec: &str) -> Result<Vec<ChangedPath>>;
}

/// Production implementation driving the `git` binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl Vcs for GitCli {
    fn resolve_revision(&self, dir: &Path, spec: &str) -> Result<Revision> {
        let output = run_git(dir, &["rev-parse", "--verify", spec])?;
        Ok(Revision::new(output.trimmed()))
    }

    fn list_revisions(
        &self,
        dir: &Path,
        old_exclusive: &Revision,
        new_inclusive: &Revision,
    ) -> Result<Vec<Revision>> {
        let range = format!("{}..{}", old_exclusive, new_inclusive);
        let output = run_git(dir, &["rev-list", &range])?;
        Ok(output.lines().into_iter().map(Revision::new).collect())
    }

    fn find_subject_match(&self, dir: &Path, tip: &str, phrase: &str) -> Result<Option<Revision>> {
        let grep = format!("--grep={}", phrase);
        let output = run_git(
            dir,
            &["rev-list", "--fixed-strings", &grep, "--max-count=1", tip],
        )?;
        if output.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Revision::new(output.trimmed())))
        }
    }

    fn remotes(&self, dir: &Path) -> Result<Vec<Remote>> {
        let output = run_git(dir, &["remote", "-v"])?;
        let mut remotes: Vec<Remote> = Vec::new();
        for line in output.lines() {
            // Format: "origin\tgit@host:owner/repo.git (fetch)"
            let mut fields = line.split_whitespace();
            let (Some(name), Some(url)) = (fields.next(), fields.next()) else {
                continue;
            };
            if fields.next() == Some("(push)") {
                continue;
            }
            if remotes.iter().any(|r| r.name == name) {
                continue;
            }
            remotes.push(Remote {
                name: name.to_string(),
                url: url.to_string(),
            });
        }
        Ok(remotes)
    }

    fn create_worktree(&self, dir: &Path, path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        run_git(dir, &["worktree", "add", "--detach", &path_str])?;
        Ok(())
    }

    fn remove_worktree(&self, dir: &Path, path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        run_git(dir, &["worktree", "remove", "--force", &path_str])?;
        Ok(())
    }

    fn checkout_detached(&self, dir: &Path, spec: &str) -> Result<()> {
        run_git(dir, &["checkout", "--detach", spec])?;
        Ok(())
    }

    fn rebase_onto(&self, dir: &Path, base: &Revision) -> Result<()> {
        run_git(dir, &["rebase", base.as_str()])?;
        Ok(())
    }

    fn cherry_pick(&self, dir: &Path, commit: &Revision) -> Result<()> {
        run_git(
            dir,
            &["cherry-pick", "-Xtheirs", "--allow-empty", commit.as_str()],
        )?;
        Ok(())
    }

    fn amend_paths(&self, dir: &Path, paths: &[String]) -> Result<()> {
        let mut args = vec!["commit", "--amend", "--no-edit", "--allow-empty", "--"];
        args.extend(paths.iter().map(String::as_str));
        run_git(dir, &args)?;
        Ok(())
    }

    fn changed_paths(&self, dir: &Path, spec: &str) -> Result<Vec<ChangedPath>> {
        let output = run_git(dir, &["show", "--format=", "--name-status", spec])?;
        Ok(parse_name_status(&output.lines()))
    }
}

/// Parse `--name-status` lines into changed paths.
///
/// Rename and copy entries carry a similarity score on the status token and
/// two path fields; the destination path is the one that exists afterwards.
pub(crate) fn parse_name_status(lines: &[&str]) -> Vec<ChangedPath> {
    let mut changed = Vec::new();
    for line in lines {
        let mut fields = line.split('\t');
        let Some(status) = fields.next() else {
            continue;
        };
        let kind = match status.chars().next() {
            Some('A') => ChangeKind::Added,
            Some('M') => ChangeKind::Modified,
            Some('D') => ChangeKind::Deleted,
            Some('R') => ChangeKind::Renamed,
            Some('C') => ChangeKind::Copied,
            Some(_) => ChangeKind::Other,
            None => continue,
        };
        let path = match kind {
            ChangeKind::Renamed | ChangeKind::Copied => fields.nth(1),
            _ => fields.next(),
        };
        let Some(path) = path else {
            continue;
        };
        if path.is_empty() {
            continue;
        }
        changed.push(ChangedPath {
            kind,
            path: path.to_string(),
        });
    }
    changed
}
