//! Git repository access.
//!
//! [`GitRepo`] locates the repository and answers path questions;
//! [`RepositoryView`] is the immutable per-run snapshot of the three file
//! lists every check sees.

use crate::core::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Represents a git repository.
#[derive(Debug, Clone)]
pub struct GitRepo {
    /// Root directory of the repository.
    root: PathBuf,
    /// Path to the .git directory (or file for worktrees).
    git_dir: PathBuf,
}

impl GitRepo {
    /// Discovers the git repository from the current directory.
    pub fn discover() -> Result<Self> {
        Self::discover_from(&std::env::current_dir().map_err(|e| Error::io("get current dir", e))?)
    }

    /// Discovers the git repository from a specific path.
    pub fn discover_from(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel", "--git-dir"])
            .current_dir(path)
            .output()
            .map_err(|e| Error::io("run git rev-parse", e))?;

        if !output.status.success() {
            return Err(Error::NotGitRepo);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut lines = stdout.lines();

        let root = lines.next().map(PathBuf::from).ok_or(Error::NotGitRepo)?;

        let git_dir = lines
            .next()
            .map(|s| {
                let p = PathBuf::from(s);
                if p.is_absolute() {
                    p
                } else {
                    root.join(p)
                }
            })
            .ok_or(Error::NotGitRepo)?;

        Ok(Self { root, git_dir })
    }

    /// Returns the root directory of the repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the hooks directory path.
    #[must_use]
    pub fn hooks_dir(&self) -> PathBuf {
        self.git_dir.join("hooks")
    }

    /// Returns the path to a specific hook.
    #[must_use]
    pub fn hook_path(&self, hook_name: &str) -> PathBuf {
        self.hooks_dir().join(hook_name)
    }

    /// Snapshots the staged, staged-for-deletion, and unstaged file lists.
    ///
    /// Taken once at the start of a run; fixes applied during the same run
    /// are not reflected back into the snapshot.
    pub fn snapshot(&self) -> Result<RepositoryView> {
        Ok(RepositoryView {
            staged: self.diff_names(&["--cached", "--diff-filter=ACMR"])?,
            staged_for_deletion: self.diff_names(&["--cached", "--diff-filter=D"])?,
            unstaged: self.diff_names(&[])?,
        })
    }

    /// Runs `git diff --name-only` with extra arguments, returning relative
    /// paths.
    fn diff_names(&self, extra: &[&str]) -> Result<Vec<String>> {
        let mut args = vec!["diff", "--name-only"];
        args.extend(extra);

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::io("run git diff", e))?;

        if !output.status.success() {
            return Err(Error::git(
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect())
    }
}

/// Read-only snapshot of the repository's change set for one run.
///
/// Paths are relative to the repository root.
#[derive(Debug, Clone, Default)]
pub struct RepositoryView {
    /// Files staged for the commit.
    pub staged: Vec<String>,
    /// Files staged for deletion.
    pub staged_for_deletion: Vec<String>,
    /// Files with unstaged changes.
    pub unstaged: Vec<String>,
}

impl RepositoryView {
    /// Files to re-stage after fixes: everything originally staged or
    /// unstaged, minus files staged for deletion, in snapshot order.
    ///
    /// This is deliberately a blanket re-add, not a per-fix one.
    #[must_use]
    pub fn restage_targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = Vec::new();
        for path in self.staged.iter().chain(self.unstaged.iter()) {
            if self.staged_for_deletion.contains(path) || targets.contains(path) {
                continue;
            }
            targets.push(path.clone());
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("run git");
        assert!(output.status.success(), "git {args:?} failed");
    }

    fn create_test_repo() -> (TempDir, GitRepo) {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path();

        git(path, &["init"]);
        git(path, &["config", "user.email", "test@test.com"]);
        git(path, &["config", "user.name", "Test"]);

        let repo = GitRepo::discover_from(path).expect("discover repo");
        (temp, repo)
    }

    fn commit_file(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).expect("write file");
        git(dir, &["add", name]);
        git(dir, &["commit", "-m", "add file", "--no-verify"]);
    }

    // =========================================================================
    // Discovery tests
    // =========================================================================

    #[test]
    fn test_discover_repo() {
        let (_temp, repo) = create_test_repo();
        assert!(repo.root().exists());
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let (temp, _) = create_test_repo();

        let subdir = temp.path().join("src/lib");
        std::fs::create_dir_all(&subdir).expect("create subdir");

        let repo = GitRepo::discover_from(&subdir).expect("discover from subdir");
        // Canonicalize both paths to handle macOS /var -> /private/var symlinks
        let expected = temp.path().canonicalize().expect("canonicalize temp");
        let actual = repo.root().canonicalize().expect("canonicalize root");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_not_git_repo() {
        let temp = TempDir::new().expect("create temp dir");
        let result = GitRepo::discover_from(temp.path());
        assert!(matches!(result, Err(Error::NotGitRepo)));
    }

    // =========================================================================
    // Hooks tests
    // =========================================================================

    #[test]
    fn test_hooks_dir() {
        let (_temp, repo) = create_test_repo();
        assert!(repo.hooks_dir().ends_with("hooks"));
    }

    #[test]
    fn test_hook_path() {
        let (_temp, repo) = create_test_repo();
        let hook_path = repo.hook_path("pre-commit");
        assert!(hook_path.ends_with("pre-commit"));
        assert!(hook_path.to_string_lossy().contains("hooks"));
    }

    // =========================================================================
    // Snapshot tests
    // =========================================================================

    #[test]
    fn test_snapshot_empty_repo() {
        let (_temp, repo) = create_test_repo();
        let view = repo.snapshot().expect("snapshot");
        assert!(view.staged.is_empty());
        assert!(view.staged_for_deletion.is_empty());
        assert!(view.unstaged.is_empty());
    }

    #[test]
    fn test_snapshot_staged_file() {
        let (temp, repo) = create_test_repo();

        std::fs::write(temp.path().join("new.txt"), "content").expect("write file");
        git(temp.path(), &["add", "new.txt"]);

        let view = repo.snapshot().expect("snapshot");
        assert_eq!(view.staged, vec!["new.txt"]);
        assert!(view.unstaged.is_empty());
    }

    #[test]
    fn test_snapshot_unstaged_modification() {
        let (temp, repo) = create_test_repo();
        commit_file(temp.path(), "a.txt", "original");

        std::fs::write(temp.path().join("a.txt"), "modified").expect("modify file");

        let view = repo.snapshot().expect("snapshot");
        assert!(view.staged.is_empty());
        assert_eq!(view.unstaged, vec!["a.txt"]);
    }

    #[test]
    fn test_snapshot_staged_deletion() {
        let (temp, repo) = create_test_repo();
        commit_file(temp.path(), "a.txt", "content");

        git(temp.path(), &["rm", "a.txt"]);

        let view = repo.snapshot().expect("snapshot");
        assert!(view.staged.is_empty());
        assert_eq!(view.staged_for_deletion, vec!["a.txt"]);
    }

    #[test]
    fn test_snapshot_staged_and_unstaged_same_file() {
        let (temp, repo) = create_test_repo();
        commit_file(temp.path(), "a.txt", "one");

        std::fs::write(temp.path().join("a.txt"), "two").expect("modify file");
        git(temp.path(), &["add", "a.txt"]);
        std::fs::write(temp.path().join("a.txt"), "three").expect("modify again");

        let view = repo.snapshot().expect("snapshot");
        assert_eq!(view.staged, vec!["a.txt"]);
        assert_eq!(view.unstaged, vec!["a.txt"]);
    }

    // =========================================================================
    // Re-stage target tests
    // =========================================================================

    #[test]
    fn test_restage_targets_union_without_duplicates() {
        let view = RepositoryView {
            staged: vec!["main.py".to_string(), "ignoreme.py".to_string()],
            staged_for_deletion: vec![],
            unstaged: vec!["main.py".to_string()],
        };
        assert_eq!(view.restage_targets(), vec!["main.py", "ignoreme.py"]);
    }

    #[test]
    fn test_restage_targets_excludes_deletions() {
        let view = RepositoryView {
            staged: vec!["keep.py".to_string()],
            staged_for_deletion: vec!["gone.py".to_string()],
            unstaged: vec!["gone.py".to_string(), "edit.py".to_string()],
        };
        assert_eq!(view.restage_targets(), vec!["keep.py", "edit.py"]);
    }

    #[test]
    fn test_restage_targets_empty_view() {
        assert!(RepositoryView::default().restage_targets().is_empty());
    }
}
