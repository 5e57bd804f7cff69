use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not
        // thread-safe. Lock it so tests don't race even if a #[serial]
        // annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Create a repository at the tempdir root with one initial commit.
pub(crate) fn create_test_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    init_repo(temp_dir.path());
    temp_dir
}

/// Create a repository in a `repo/` subdirectory, leaving the tempdir root
/// free for sibling worktrees derived from it.
pub(crate) fn create_nested_repo() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let repo = temp_dir.path().join("repo");
    std::fs::create_dir_all(&repo).unwrap();
    init_repo(&repo);
    (temp_dir, repo)
}

fn init_repo(path: &Path) {
    git(path, &["init"]);
    // Ensure the repo uses a deterministic default branch name across
    // environments. This sets HEAD to an unborn `master` branch before the
    // first commit.
    git(path, &["symbolic-ref", "HEAD", "refs/heads/master"]);

    // Configure git user for commits
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);

    // Initial commit (required for worktree creation)
    std::fs::write(path.join("README.md"), "# Test\n").unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);
}

/// Write (creating parent directories) and commit a single file.
pub(crate) fn commit_file(repo: &Path, rel_path: &str, content: &str, message: &str) {
    let file = repo.join(rel_path);
    if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&file, content).unwrap();
    git(repo, &["add", "-A"]);
    git(repo, &["commit", "-m", message]);
}

/// Commit with no content change.
pub(crate) fn commit_empty(repo: &Path, message: &str) {
    git(repo, &["commit", "--allow-empty", "-m", message]);
}

pub(crate) fn git(repo_dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }
}

/// Capture trimmed stdout of a git query that must succeed.
pub(crate) fn git_stdout(repo_dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Write an executable shell script and return its path.
#[cfg(unix)]
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// A stand-in formatter: reports `version` for `--version`, otherwise
/// rewrites every file argument in place, replacing `OLDSTYLE` with
/// `NEWSTYLE`. Idempotent, so two passes produce the same result as one.
#[cfg(unix)]
pub(crate) fn fake_formatter_script(dir: &Path, version: &str) -> PathBuf {
    let body = format!(
        r#"#!/bin/sh
if [ "$1" = "--version" ]; then
    echo "{version}"
    exit 0
fi
skip=0
for arg in "$@"; do
    if [ "$skip" -eq 1 ]; then skip=0; continue; fi
    case "$arg" in
        -c) skip=1 ;;
        -*) ;;
        *)
            sed 's/OLDSTYLE/NEWSTYLE/g' "$arg" > "$arg.restyled"
            mv "$arg.restyled" "$arg"
            ;;
    esac
done
"#
    );
    write_script(dir, "fake-formatter", &body)
}
