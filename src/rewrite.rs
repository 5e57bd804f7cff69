//! Branch rewriter: the end-to-end rebase-then-restyle workflow.
//!
//! The flow is: prepare an isolated worktree, locate the style-switch commit
//! on the target branch, rebase the branch onto the commit preceding it, then
//! replay each rebased commit onto the switch commit with restyling. The
//! worktree is torn down on success and failure alike; commits created before
//! a failure exist only in the disposable worktree, so no rollback is
//! attempted.

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{RestyleError, Result};
use crate::exit_codes;
use crate::preflight;
use crate::progress::Reporter;
use crate::restyle::classify::Classifier;
use crate::restyle::{Formatter, RestyleEngine};
use crate::revisions::{Revision, commits_between};
use crate::vcs::{GitCli, Vcs};
use crate::worktree::WorktreeManager;
use std::path::Path;

/// Immutable description of one rewrite run.
#[derive(Debug, Clone)]
pub struct RewriteRequest {
    /// Branch to rewrite.
    pub existing_branch: String,
    /// Branch carrying the style-switch commit.
    pub target_branch: String,
}

/// Aggregated result of a completed rewrite.
///
/// This replaces an ambient ok-flag: phases report their diagnostics into
/// `soft_errors`, and the caller decides the exit code from the whole value.
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    /// The final restyled position. The worktree that produced it is already
    /// removed, so this id is the only handle until a branch names it.
    pub head: Revision,
    /// Number of commits replayed onto the switch commit.
    pub replayed: usize,
    /// Total number of files restyled across all replayed commits.
    pub restyled_files: usize,
    /// Failures that did not invalidate the rewrite itself.
    pub soft_errors: Vec<String>,
}

impl RewriteOutcome {
    pub fn ok(&self) -> bool {
        self.soft_errors.is_empty()
    }
}

/// Drives the rewrite state machine.
pub struct BranchRewriter<'a> {
    vcs: &'a dyn Vcs,
    config: &'a Config,
    engine: &'a RestyleEngine<'a>,
    reporter: &'a Reporter,
}

impl<'a> BranchRewriter<'a> {
    pub fn new(
        vcs: &'a dyn Vcs,
        config: &'a Config,
        engine: &'a RestyleEngine<'a>,
        reporter: &'a Reporter,
    ) -> Self {
        Self {
            vcs,
            config,
            engine,
            reporter,
        }
    }

    /// Run the whole rewrite for `request`, guaranteeing worktree teardown.
    ///
    /// A teardown failure after a successful rewrite is recorded as a soft
    /// error: the result is real, the leftover worktree is only a cleanup
    /// problem. On a failed rewrite the original error wins and the teardown
    /// failure is reported as a warning.
    pub fn run(&self, repo_root: &Path, request: &RewriteRequest) -> Result<RewriteOutcome> {
        let mut worktrees = WorktreeManager::new(repo_root.to_path_buf());

        match self.rewrite(&mut worktrees, request) {
            Ok((head, replayed, restyled_files)) => {
                let mut soft_errors = Vec::new();
                if let Err(err) = worktrees.teardown(self.vcs) {
                    soft_errors.push(format!("worktree teardown failed: {}", err));
                }
                Ok(RewriteOutcome {
                    head,
                    replayed,
                    restyled_files,
                    soft_errors,
                })
            }
            Err(err) => {
                if let Err(teardown_err) = worktrees.teardown(self.vcs) {
                    eprintln!("Warning: worktree teardown failed: {}", teardown_err);
                }
                Err(err)
            }
        }
    }

    fn rewrite(
        &self,
        worktrees: &mut WorktreeManager,
        request: &RewriteRequest,
    ) -> Result<(Revision, usize, usize)> {
        let worktree = worktrees.prepare(self.vcs, &request.existing_branch)?;
        self.reporter
            .step(format!("Created worktree at {}", worktree.display()));
        worktrees.checkout_detached(self.vcs, &request.existing_branch)?;

        let target_ref = self.resolve_target_ref(&worktree, &request.target_branch)?;
        let switch = self
            .vcs
            .find_subject_match(&worktree, &target_ref, &self.config.style_switch_subject)?
            .ok_or_else(|| {
                RestyleError::Lookup(format!(
                    "no commit on '{}' contains the style-switch phrase '{}'",
                    target_ref, self.config.style_switch_subject
                ))
            })?;
        let boundary = self
            .vcs
            .resolve_revision(&worktree, &format!("{}^", switch))?;
        self.reporter.step(format!(
            "Style switch commit {}; old-style boundary {}",
            switch.short(),
            boundary.short()
        ));

        self.reporter.step(format!(
            "Rebasing {} onto {}",
            request.existing_branch,
            boundary.short()
        ));
        self.vcs.rebase_onto(&worktree, &boundary)?;
        let rebased_head = self.vcs.resolve_revision(&worktree, "HEAD")?;

        let commits = commits_between(self.vcs, &worktree, &boundary, &rebased_head)?;
        self.reporter
            .step(format!("{} commit(s) to replay", commits.len()));

        worktrees.checkout_detached(self.vcs, switch.as_str())?;

        let mut restyled_files = 0;
        for (index, commit) in commits.iter().enumerate() {
            self.reporter.step(format!(
                "Replaying {}/{}: {}",
                index + 1,
                commits.len(),
                commit.short()
            ));
            let report = self.engine.apply_commit_onto_head(&worktree, commit)?;
            if !report.restyled.is_empty() {
                self.reporter
                    .step(format!("  restyled {} file(s)", report.restyled.len()));
            }
            restyled_files += report.restyled.len();
        }

        let head = self.vcs.resolve_revision(&worktree, "HEAD")?;
        Ok((head, commits.len(), restyled_files))
    }

    /// Resolve the target branch to the ref the sentinel search runs on.
    ///
    /// With `upstream_url` configured, the remote whose URL contains the
    /// fragment provides the remote-tracking ref; otherwise the branch name
    /// is used as given.
    fn resolve_target_ref(&self, dir: &Path, target_branch: &str) -> Result<String> {
        let Some(url_fragment) = &self.config.upstream_url else {
            return Ok(target_branch.to_string());
        };

        let remotes = self.vcs.remotes(dir)?;
        let remote = remotes
            .iter()
            .find(|remote| remote.url.contains(url_fragment))
            .ok_or_else(|| {
                RestyleError::Lookup(format!(
                    "no remote URL contains '{}'; cannot locate the upstream target branch",
                    url_fragment
                ))
            })?;
        Ok(format!("{}/{}", remote.name, target_branch))
    }
}

/// Entry point behind `main`: preflight, wiring, run, summary.
///
/// Returns the process exit code for a completed run; fatal errors propagate
/// as `Err` and are mapped to exit codes by the caller.
pub fn execute(cli: Cli) -> Result<i32> {
    let reporter = Reporter::new(cli.verbose);

    // Preconditions, strictly before any mutation.
    let repo_root = preflight::ensure_inside_repository()?;
    preflight::ensure_worktree_support(&repo_root)?;
    let config = Config::load_or_default(&repo_root)?;
    let formatter = Formatter::from_config(&config, &repo_root)?;
    formatter.check_version()?;
    let classifier = Classifier::from_config(&config)?;

    let vcs = GitCli;
    let engine = RestyleEngine::new(&vcs, classifier, formatter);
    let rewriter = BranchRewriter::new(&vcs, &config, &engine, &reporter);
    let request = RewriteRequest {
        existing_branch: cli.existing_branch,
        target_branch: cli.target_branch,
    };

    let outcome = rewriter.run(&repo_root, &request)?;

    for note in &outcome.soft_errors {
        eprintln!("Warning: {}", note);
    }
    println!(
        "Rewrote {} commit(s), restyled {} file(s).",
        outcome.replayed, outcome.restyled_files
    );
    println!("Final revision: {}", outcome.head);
    println!(
        "The result is not on any branch; keep it with: git branch <name> {}",
        outcome.head.short()
    );

    Ok(if outcome.ok() {
        exit_codes::SUCCESS
    } else {
        exit_codes::REWRITE_FAILURE
    })
}
