//! Restyle engine: formatter invocation and the replay-restyle-amend step.
//!
//! The engine replays one historical commit onto the current head, reformats
//! the styleable files it touched, and folds the reformatting back into the
//! replayed commit without altering its message.

pub mod classify;

use crate::config::Config;
use crate::error::{RestyleError, Result};
use crate::revisions::Revision;
use crate::vcs::{ChangedPath, Vcs};
use self::classify::{Classifier, FileDisposition};
use std::path::{Path, PathBuf};
use std::process::Command;

/// The external formatter, pinned to one supported version.
#[derive(Debug, Clone)]
pub struct Formatter {
    program: String,
    args: Vec<String>,
    config_path: PathBuf,
    expected_version: String,
}

impl Formatter {
    /// Build the formatter invocation from the configuration.
    ///
    /// The configured command line is parsed with shell quoting rules; the
    /// style configuration file is resolved against the repository root and
    /// passed as `-c <path>` on every run.
    pub fn from_config(config: &Config, repo_root: &Path) -> Result<Self> {
        let words = shell_words::split(&config.format_command).map_err(|e| {
            RestyleError::Config(format!(
                "failed to parse format_command '{}': {}",
                config.format_command, e
            ))
        })?;
        let mut words = words.into_iter();
        let program = words
            .next()
            .ok_or_else(|| RestyleError::Config("format_command is empty".to_string()))?;

        Ok(Self {
            program,
            args: words.collect(),
            config_path: repo_root.join(&config.format_config),
            expected_version: config.format_version.clone(),
        })
    }

    /// Require the formatter to report exactly the supported version string.
    ///
    /// A different formatter version produces different output, which would
    /// make replayed commits diverge from the restyled upstream history.
    pub fn check_version(&self) -> Result<()> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .map_err(|e| {
                RestyleError::Precondition(format!(
                    "failed to execute formatter '{}': {} (is it installed?)",
                    self.program, e
                ))
            })?;

        if !output.status.success() {
            return Err(RestyleError::Precondition(format!(
                "formatter '{}' failed to report its version",
                self.program
            )));
        }

        let reported = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if reported != self.expected_version {
            return Err(RestyleError::Precondition(format!(
                "unsupported formatter version '{}' (exactly '{}' is required)",
                reported, self.expected_version
            )));
        }
        Ok(())
    }

    /// Reformat `paths` in place, relative to `dir`.
    ///
    /// No-op on empty input: nothing is spawned. Otherwise the formatter runs
    /// exactly twice over the full list. One pass is not idempotent for all
    /// constructs; a third pass is not attempted.
    pub fn restyle(&self, dir: &Path, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        self.run_once(dir, paths)?;
        self.run_once(dir, paths)
    }

    fn run_once(&self, dir: &Path, paths: &[String]) -> Result<()> {
        let command_line = format!("{} {}", self.program, self.args.join(" "));

        let output = Command::new(&self.program)
            .current_dir(dir)
            .args(&self.args)
            .arg("-c")
            .arg(&self.config_path)
            .args(paths)
            .output()
            .map_err(|e| RestyleError::Tool {
                command: command_line.clone(),
                code: -1,
                stderr: format!("failed to execute: {}", e),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RestyleError::Tool {
                command: command_line,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Outcome of replaying one commit.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    /// The replayed commit as it now exists on the new history.
    pub head: Revision,
    /// Paths that were reformatted and folded back in.
    pub restyled: Vec<String>,
}

/// Replays commits and normalizes the formatting of the files they touch.
pub struct RestyleEngine<'a> {
    vcs: &'a dyn Vcs,
    classifier: Classifier,
    formatter: Formatter,
}

impl<'a> RestyleEngine<'a> {
    pub fn new(vcs: &'a dyn Vcs, classifier: Classifier, formatter: Formatter) -> Self {
        Self {
            vcs,
            classifier,
            formatter,
        }
    }

    /// Replay `commit` onto the current head and restyle what it touched.
    ///
    /// The replayed commit's content wins any conflict: the historical
    /// position re-authored later, so its own content is authoritative.
    /// Originally empty commits stay empty, and the commit message is never
    /// altered. If no touched path is styleable the commit is left exactly as
    /// cherry-picked, with only its parent changed.
    pub fn apply_commit_onto_head(&self, dir: &Path, commit: &Revision) -> Result<ReplayReport> {
        self.vcs.cherry_pick(dir, commit)?;

        let touched = self.vcs.changed_paths(dir, "HEAD")?;
        let styleable = self.styleable_subset(&touched);

        if !styleable.is_empty() {
            self.formatter.restyle(dir, &styleable)?;
            self.vcs.amend_paths(dir, &styleable)?;
        }

        let head = self.vcs.resolve_revision(dir, "HEAD")?;
        Ok(ReplayReport {
            head,
            restyled: styleable,
        })
    }

    fn styleable_subset(&self, touched: &[ChangedPath]) -> Vec<String> {
        touched
            .iter()
            .filter(|changed| !changed.kind.is_deletion())
            .filter(|changed| {
                self.classifier.classify(&changed.path) == FileDisposition::Styleable
            })
            .map(|changed| changed.path.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(unix)]
    use crate::test_support::{
        commit_empty, commit_file, create_nested_repo, fake_formatter_script, git, git_stdout,
        write_script,
    };
    #[cfg(unix)]
    use crate::vcs::GitCli;

    #[cfg(unix)]
    fn formatter_for(script: &Path, repo: &Path) -> Formatter {
        let config = Config {
            format_command: script.display().to_string(),
            ..Config::default()
        };
        Formatter::from_config(&config, repo).unwrap()
    }

    #[cfg(unix)]
    fn engine_for<'a>(script: &Path, repo: &Path, vcs: &'a GitCli) -> RestyleEngine<'a> {
        RestyleEngine::new(
            vcs,
            Classifier::from_config(&Config::default()).unwrap(),
            formatter_for(script, repo),
        )
    }

    #[test]
    fn from_config_rejects_empty_command() {
        let config = Config {
            format_command: String::new(),
            ..Config::default()
        };
        let err = Formatter::from_config(&config, Path::new(".")).unwrap_err();
        assert!(matches!(err, RestyleError::Config(_)));
    }

    #[test]
    fn from_config_rejects_unbalanced_quotes() {
        let config = Config {
            format_command: "uncrustify \"unterminated".to_string(),
            ..Config::default()
        };
        let err = Formatter::from_config(&config, Path::new(".")).unwrap_err();
        assert!(matches!(err, RestyleError::Config(_)));
    }

    #[cfg(unix)]
    #[test]
    fn restyle_empty_input_spawns_nothing() {
        // `false` exits non-zero on any invocation, so this only passes if
        // no subprocess is spawned at all.
        let config = Config {
            format_command: "false".to_string(),
            ..Config::default()
        };
        let formatter = Formatter::from_config(&config, Path::new(".")).unwrap();
        formatter.restyle(Path::new("."), &[]).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn restyle_runs_exactly_two_passes() {
        let (temp_dir, repo) = create_nested_repo();
        let log = temp_dir.path().join("invocations.log");
        let script = write_script(
            temp_dir.path(),
            "counting-formatter",
            &format!(
                "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then echo v; exit 0; fi\necho run >> \"{}\"\n",
                log.display()
            ),
        );
        std::fs::write(repo.join("file.cpp"), "int x;\n").unwrap();

        let formatter = formatter_for(&script, &repo);
        formatter.restyle(&repo, &["file.cpp".to_string()]).unwrap();

        let recorded = std::fs::read_to_string(&log).unwrap();
        assert_eq!(recorded.lines().count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn restyle_failure_is_a_tool_error() {
        let (temp_dir, repo) = create_nested_repo();
        let script = write_script(
            temp_dir.path(),
            "broken-formatter",
            "#!/bin/sh\necho \"style engine exploded\" >&2\nexit 3\n",
        );

        let formatter = formatter_for(&script, &repo);
        let err = formatter
            .restyle(&repo, &["file.cpp".to_string()])
            .unwrap_err();
        match err {
            RestyleError::Tool { code, stderr, .. } => {
                assert_eq!(code, 3);
                assert!(stderr.contains("style engine exploded"));
            }
            other => panic!("expected Tool error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn check_version_accepts_exact_match() {
        let (temp_dir, repo) = create_nested_repo();
        let script = fake_formatter_script(temp_dir.path(), "Uncrustify-0.78.1");
        let formatter = formatter_for(&script, &repo);
        formatter.check_version().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn check_version_rejects_other_versions() {
        let (temp_dir, repo) = create_nested_repo();
        let script = fake_formatter_script(temp_dir.path(), "Uncrustify-0.64.0");
        let formatter = formatter_for(&script, &repo);
        let err = formatter.check_version().unwrap_err();
        assert!(matches!(err, RestyleError::Precondition(_)));
        assert!(err.to_string().contains("Uncrustify-0.64.0"));
    }

    #[test]
    fn check_version_missing_binary_is_a_precondition_error() {
        let config = Config {
            format_command: "no-such-formatter-xyz".to_string(),
            ..Config::default()
        };
        let formatter = Formatter::from_config(&config, Path::new(".")).unwrap();
        let err = formatter.check_version().unwrap_err();
        assert!(matches!(err, RestyleError::Precondition(_)));
    }

    #[cfg(unix)]
    #[test]
    fn apply_commit_restyles_and_preserves_message() {
        let (temp_dir, repo) = create_nested_repo();
        let script = fake_formatter_script(temp_dir.path(), "v");

        commit_file(&repo, "src/feature.cpp", "OLDSTYLE int f();\n", "Add feature entry point");
        let picked = git_stdout(&repo, &["rev-parse", "HEAD"]);
        git(&repo, &["reset", "--hard", "HEAD~1"]);

        let vcs = GitCli;
        let engine = engine_for(&script, &repo, &vcs);
        let report = engine
            .apply_commit_onto_head(&repo, &Revision::new(picked))
            .unwrap();

        assert_eq!(report.restyled, vec!["src/feature.cpp".to_string()]);
        let subject = git_stdout(&repo, &["log", "-1", "--format=%s"]);
        assert_eq!(subject, "Add feature entry point");
        let content = std::fs::read_to_string(repo.join("src/feature.cpp")).unwrap();
        assert!(content.contains("NEWSTYLE"));
        assert!(!content.contains("OLDSTYLE"));
    }

    #[cfg(unix)]
    #[test]
    fn apply_commit_without_styleable_files_keeps_tree_identical() {
        let (temp_dir, repo) = create_nested_repo();
        let script = fake_formatter_script(temp_dir.path(), "v");

        commit_file(&repo, "docs/notes.md", "OLDSTYLE notes\n", "Document the plan");
        let picked = git_stdout(&repo, &["rev-parse", "HEAD"]);
        let picked_tree = git_stdout(&repo, &["rev-parse", "HEAD^{tree}"]);
        git(&repo, &["reset", "--hard", "HEAD~1"]);

        let vcs = GitCli;
        let engine = engine_for(&script, &repo, &vcs);
        let report = engine
            .apply_commit_onto_head(&repo, &Revision::new(picked))
            .unwrap();

        assert!(report.restyled.is_empty());
        // Only the parent changed; the tree content round-tripped untouched.
        let new_tree = git_stdout(&repo, &["rev-parse", "HEAD^{tree}"]);
        assert_eq!(new_tree, picked_tree);
        let subject = git_stdout(&repo, &["log", "-1", "--format=%s"]);
        assert_eq!(subject, "Document the plan");
    }

    #[cfg(unix)]
    #[test]
    fn apply_commit_preserves_empty_commits() {
        let (temp_dir, repo) = create_nested_repo();
        let script = fake_formatter_script(temp_dir.path(), "v");

        commit_empty(&repo, "Marker for the style epoch");
        let picked = git_stdout(&repo, &["rev-parse", "HEAD"]);
        git(&repo, &["reset", "--hard", "HEAD~1"]);

        let vcs = GitCli;
        let engine = engine_for(&script, &repo, &vcs);
        let report = engine
            .apply_commit_onto_head(&repo, &Revision::new(picked))
            .unwrap();

        assert!(report.restyled.is_empty());
        let subject = git_stdout(&repo, &["log", "-1", "--format=%s"]);
        assert_eq!(subject, "Marker for the style epoch");
        // Still empty: same tree as its parent.
        let head_tree = git_stdout(&repo, &["rev-parse", "HEAD^{tree}"]);
        let parent_tree = git_stdout(&repo, &["rev-parse", "HEAD~1^{tree}"]);
        assert_eq!(head_tree, parent_tree);
    }

    #[cfg(unix)]
    #[test]
    fn apply_commit_skips_exempt_paths() {
        let (temp_dir, repo) = create_nested_repo();
        let script = fake_formatter_script(temp_dir.path(), "v");

        commit_file(
            &repo,
            "third_party/zlib/inflate.c",
            "OLDSTYLE vendored\n",
            "Import zlib",
        );
        let picked = git_stdout(&repo, &["rev-parse", "HEAD"]);
        git(&repo, &["reset", "--hard", "HEAD~1"]);

        let vcs = GitCli;
        let engine = engine_for(&script, &repo, &vcs);
        let report = engine
            .apply_commit_onto_head(&repo, &Revision::new(picked))
            .unwrap();

        assert!(report.restyled.is_empty());
        let content = std::fs::read_to_string(repo.join("third_party/zlib/inflate.c")).unwrap();
        assert!(content.contains("OLDSTYLE"));
    }
}
