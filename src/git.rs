//! Git command runner for restyle.
//!
//! Provides a safe wrapper around git commands with captured stdout/stderr
//! and structured error handling. All git operations go through this module;
//! a non-zero exit is fatal to the run and never retried.

use crate::error::{RestyleError, Result};
use std::path::Path;
use std::process::{Command, Output};

/// Result of a successful git command execution.
///
/// `stdout` is kept raw (including trailing newlines) so that callers can
/// apply the exact line-splitting rule they need; `stderr` is trimmed since
/// it is only ever used for diagnostics.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Raw standard output from the command.
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Returns stdout with surrounding whitespace removed.
    ///
    /// Use this for scalar output such as revision ids or version strings.
    pub fn trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Returns stdout split on newlines, stripping exactly one trailing blank
    /// line while preserving all leading and interior blank lines.
    ///
    /// Git terminates list output with a single newline, so an empty listing
    /// (for example `rev-list` over an empty range) must yield an empty
    /// sequence rather than a sequence containing one empty string.
    pub fn lines(&self) -> Vec<&str> {
        let body = self.stdout.strip_suffix('\n').unwrap_or(&self.stdout);
        let body = body.strip_suffix('\r').unwrap_or(body);
        if body.is_empty() {
            return Vec::new();
        }
        body.split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect()
    }

    /// Returns true if stdout carries no content.
    pub fn is_empty(&self) -> bool {
        self.trimmed().is_empty()
    }
}

/// Run a git command with the specified working directory.
///
/// # Arguments
///
/// * `cwd` - The working directory to run the command in
/// * `args` - The git command arguments (without the "git" prefix)
///
/// # Returns
///
/// * `Ok(GitOutput)` - On exit code 0
/// * `Err(RestyleError::Tool)` - On non-zero exit, carrying the exit code and
///   captured stderr
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();
    let command_line = format!("git {}", args.join(" "));

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| RestyleError::Tool {
            command: command_line.clone(),
            code: -1,
            stderr: format!("failed to execute: {}", e),
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let code = output.status.code().unwrap_or(-1);
        let stderr = if git_output.stderr.is_empty() {
            git_output.trimmed().to_string()
        } else {
            git_output.stderr.clone()
        };
        Err(RestyleError::Tool {
            command: command_line,
            code,
            stderr,
        })
    }
}

/// Get the repository root using `git rev-parse --show-toplevel`.
///
/// "Not inside a git repository" is an environment precondition failure
/// (exit code 2), not a tool failure, so this helper maps the error kind
/// accordingly.
pub fn detect_repo_root<P: AsRef<Path>>(cwd: P) -> Result<std::path::PathBuf> {
    let cwd = cwd.as_ref();

    let output = Command::new("git")
        .current_dir(cwd)
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .map_err(|e| {
            RestyleError::Precondition(format!(
                "failed to execute git: {} (is git installed?)",
                e
            ))
        })?;

    if output.status.success() {
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(std::path::PathBuf::from(root))
    } else {
        Err(RestyleError::Precondition(
            "not inside a git repository. Run this command from within the repository to rewrite."
                .to_string(),
        ))
    }
}

/// Report the installed git version as (major, minor, patch).
pub fn git_version<P: AsRef<Path>>(cwd: P) -> Result<(u32, u32, u32)> {
    let output = run_git(cwd, &["--version"])?;
    parse_git_version(output.trimmed()).ok_or_else(|| {
        RestyleError::Precondition(format!(
            "could not parse git version from '{}'",
            output.trimmed()
        ))
    })
}

/// Parse "git version X.Y.Z[.extra]" into (X, Y, Z).
///
/// Missing components default to zero; platform suffixes such as
/// "2.39.2.windows.1" are ignored past the third component.
pub(crate) fn parse_git_version(text: &str) -> Option<(u32, u32, u32)> {
    let rest = text.strip_prefix("git version ")?;
    let mut parts = rest.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let patch = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    Some((major, minor, patch))
}
