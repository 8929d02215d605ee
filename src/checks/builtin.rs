//! Built-in checks: repository predicates and external command wrappers.

use super::{Autofix, Check, FileFilter, Problem};
use crate::core::error::{Error, Result};
use crate::core::gateway::Gateway;
use crate::core::git::RepositoryView;

// Assembled from two halves so the string literal doesn't trigger the check
// against this file itself.
const DO_NOT_SUBMIT: &str = concat!("DO NOT ", "SUBMIT");

/// Checks that each staged file doesn't also have unstaged changes.
///
/// Its autofix stages the offending files again.
#[derive(Debug, Clone, Default)]
pub struct NoStagedAndUnstagedChanges {
    slow: bool,
}

impl NoStagedAndUnstagedChanges {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the check slow (run only with `--all`).
    #[must_use]
    pub fn slow(mut self, slow: bool) -> Self {
        self.slow = slow;
        self
    }
}

impl Check for NoStagedAndUnstagedChanges {
    fn name(&self) -> &str {
        "NoStagedAndUnstagedChanges"
    }

    fn is_slow(&self) -> bool {
        self.slow
    }

    fn is_fixable(&self) -> bool {
        true
    }

    fn check(
        &self,
        gateway: &mut dyn Gateway,
        repository: &RepositoryView,
    ) -> Result<Option<Problem>> {
        let mut both: Vec<String> = repository
            .staged
            .iter()
            .filter(|path| repository.unstaged.contains(path))
            .cloned()
            .collect();
        both.sort();

        if both.is_empty() {
            return Ok(None);
        }

        gateway.print(&both.join("\n"));

        let mut autofix = vec!["git".to_string(), "add".to_string()];
        autofix.extend(both);
        Ok(Some(Problem::fixable(Autofix::Command(autofix))))
    }
}

/// Checks that staged files do not contain the do-not-submit marker.
///
/// The match is case-insensitive over the file's raw bytes.
#[derive(Debug, Clone, Default)]
pub struct DoNotSubmit {
    filter: FileFilter,
    slow: bool,
}

impl DoNotSubmit {
    /// Creates the check, matching every staged file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the files the check inspects.
    #[must_use]
    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Marks the check slow (run only with `--all`).
    #[must_use]
    pub fn slow(mut self, slow: bool) -> Self {
        self.slow = slow;
        self
    }
}

impl Check for DoNotSubmit {
    fn name(&self) -> &str {
        "DoNotSubmit"
    }

    fn is_slow(&self) -> bool {
        self.slow
    }

    fn check(
        &self,
        gateway: &mut dyn Gateway,
        repository: &RepositoryView,
    ) -> Result<Option<Problem>> {
        let needle = DO_NOT_SUBMIT.as_bytes();
        let mut bad_paths = Vec::new();

        for path in self.filter.apply(&repository.staged) {
            let content = gateway.read_file(&path)?.to_ascii_uppercase();
            if content.windows(needle.len()).any(|window| window == needle) {
                bad_paths.push(path);
            }
        }

        if bad_paths.is_empty() {
            return Ok(None);
        }

        bad_paths.sort();
        gateway.print(&bad_paths.join("\n"));
        Ok(Some(Problem::new(format!(
            "file contains '{DO_NOT_SUBMIT}'"
        ))))
    }
}

/// Checks that staged file paths do not contain whitespace.
#[derive(Debug, Clone, Default)]
pub struct NoWhitespaceInFilePath {
    filter: FileFilter,
    slow: bool,
}

impl NoWhitespaceInFilePath {
    /// Creates the check, matching every staged file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the files the check inspects.
    #[must_use]
    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Marks the check slow (run only with `--all`).
    #[must_use]
    pub fn slow(mut self, slow: bool) -> Self {
        self.slow = slow;
        self
    }
}

impl Check for NoWhitespaceInFilePath {
    fn name(&self) -> &str {
        "NoWhitespaceInFilePath"
    }

    fn is_slow(&self) -> bool {
        self.slow
    }

    fn check(
        &self,
        gateway: &mut dyn Gateway,
        repository: &RepositoryView,
    ) -> Result<Option<Problem>> {
        let mut bad_paths: Vec<String> = self
            .filter
            .apply(&repository.staged)
            .into_iter()
            .filter(|path| path.chars().any(char::is_whitespace))
            .collect();

        if bad_paths.is_empty() {
            return Ok(None);
        }

        bad_paths.sort();
        gateway.print(&bad_paths.join("\n"));
        Ok(Some(Problem::new("file path contains whitespace")))
    }
}

/// A check that wraps an external command.
///
/// A non-zero exit status is interpreted as a problem; the declared fix
/// command, when present, becomes the problem's autofix.
#[derive(Debug, Clone)]
pub struct CommandCheck {
    name: String,
    cmd: Vec<String>,
    fix: Option<Vec<String>>,
    pass_files: bool,
    separately: bool,
    filter: FileFilter,
    slow: bool,
}

impl CommandCheck {
    /// Starts building a command check.
    #[must_use]
    pub fn builder(name: impl Into<String>, cmd: Vec<String>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            cmd,
            fix: None,
            pass_files: false,
            separately: false,
            include: Vec::new(),
            exclude: Vec::new(),
            slow: false,
        }
    }
}

impl Check for CommandCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_slow(&self) -> bool {
        self.slow
    }

    fn is_fixable(&self) -> bool {
        self.fix.is_some()
    }

    fn check(
        &self,
        gateway: &mut dyn Gateway,
        repository: &RepositoryView,
    ) -> Result<Option<Problem>> {
        let files = self.filter.apply(&repository.staged);

        if self.separately {
            let mut problem = false;
            for path in &files {
                let mut cmd = self.cmd.clone();
                cmd.push(path.clone());
                if gateway.run(&cmd)? != 0 {
                    problem = true;
                }
            }

            if problem {
                // One fix command covers every failing file.
                return Ok(Some(Problem {
                    message: None,
                    autofix: self.fix.clone().map(Autofix::Command),
                }));
            }
            return Ok(None);
        }

        let mut cmd = self.cmd.clone();
        if self.pass_files {
            cmd.extend(files.iter().cloned());
        }

        if gateway.run(&cmd)? != 0 {
            let autofix = self.fix.as_ref().map(|fix| {
                let mut fix = fix.clone();
                if self.pass_files {
                    fix.extend(files.iter().cloned());
                }
                Autofix::Command(fix)
            });
            return Ok(Some(Problem {
                message: None,
                autofix,
            }));
        }

        Ok(None)
    }
}

/// Builder for [`CommandCheck`].
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    name: String,
    cmd: Vec<String>,
    fix: Option<Vec<String>>,
    pass_files: bool,
    separately: bool,
    include: Vec<String>,
    exclude: Vec<String>,
    slow: bool,
}

impl CommandBuilder {
    /// Declares the fix command.
    #[must_use]
    pub fn fix(mut self, cmd: Vec<String>) -> Self {
        self.fix = Some(cmd);
        self
    }

    /// Appends the filtered staged file list to the command.
    #[must_use]
    pub fn pass_files(mut self, pass_files: bool) -> Self {
        self.pass_files = pass_files;
        self
    }

    /// Runs the command once per matched file instead of once with all
    /// files. Requires `pass_files`.
    #[must_use]
    pub fn separately(mut self, separately: bool) -> Self {
        self.separately = separately;
        self
    }

    /// Appends include glob patterns.
    #[must_use]
    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Appends exclude glob patterns.
    #[must_use]
    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Marks the check slow (run only with `--all`).
    #[must_use]
    pub fn slow(mut self, slow: bool) -> Self {
        self.slow = slow;
        self
    }

    /// Validates the configuration and builds the check.
    pub fn build(self) -> Result<CommandCheck> {
        if self.separately && !self.pass_files {
            return Err(Error::usage(
                "if `separately` is set, `pass_files` must also be set",
            ));
        }

        Ok(CommandCheck {
            filter: FileFilter::new(&self.include, &self.exclude)?,
            name: self.name,
            cmd: self.cmd,
            fix: self.fix,
            pass_files: self.pass_files,
            separately: self.separately,
            slow: self.slow,
        })
    }
}

fn command_with(base: &[&str], args: &[String]) -> Vec<String> {
    let mut cmd: Vec<String> = base.iter().map(|s| (*s).to_string()).collect();
    cmd.extend(args.iter().cloned());
    cmd
}

/// Checks Python formatting with black.
#[must_use]
pub fn python_format(args: &[String]) -> CommandBuilder {
    CommandCheck::builder("PythonFormat", command_with(&["black", "--check"], args))
        .pass_files(true)
        .include(["*.py"])
        .fix(command_with(&["black"], args))
}

/// Lints Python code with flake8.
#[must_use]
pub fn python_lint(args: &[String]) -> CommandBuilder {
    CommandCheck::builder(
        "PythonLint",
        command_with(&["flake8", "--max-line-length=88"], args),
    )
    .pass_files(true)
    .include(["*.py"])
}

/// Checks the order of Python imports with isort.
#[must_use]
pub fn python_import_order(args: &[String]) -> CommandBuilder {
    CommandCheck::builder("PythonImportOrder", command_with(&["isort", "-c"], args))
        .pass_files(true)
        .include(["*.py"])
        .fix(command_with(&["isort"], args))
}

/// Checks Python static type annotations with mypy.
#[must_use]
pub fn python_types(args: &[String]) -> CommandBuilder {
    CommandCheck::builder("PythonTypes", command_with(&["mypy"], args))
        .pass_files(true)
        .include(["*.py"])
}

/// Lints JavaScript code with ESLint.
#[must_use]
pub fn javascript_lint() -> CommandBuilder {
    CommandCheck::builder("JavaScriptLint", command_with(&["npx", "eslint"], &[]))
        .pass_files(true)
        .include(["*.js"])
        .fix(command_with(&["npx", "eslint", "--fix"], &[]))
}

/// Checks Rust formatting with rustfmt.
#[must_use]
pub fn rust_format(args: &[String]) -> CommandBuilder {
    CommandCheck::builder(
        "RustFormat",
        command_with(&["cargo", "fmt", "--", "--check"], args),
    )
    .pass_files(true)
    .include(["*.rs"])
    .fix(command_with(&["cargo", "fmt", "--"], args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::console::Console;
    use crate::core::gateway::testing::RecordingGateway;

    fn view(staged: &[&str], unstaged: &[&str]) -> RepositoryView {
        RepositoryView {
            staged: staged.iter().map(|s| (*s).to_string()).collect(),
            staged_for_deletion: Vec::new(),
            unstaged: unstaged.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn marker() -> Vec<u8> {
        [&b"DO NOT "[..], &b"SUBMIT"[..]].concat()
    }

    // =========================================================================
    // NoStagedAndUnstagedChanges
    // =========================================================================

    #[test]
    fn test_overlap_check_passes_without_overlap() {
        let console = Console::buffered(false);
        let mut gateway = RecordingGateway::new(console.clone());
        let result = NoStagedAndUnstagedChanges::new()
            .check(&mut gateway, &view(&["a.py"], &["b.py"]))
            .expect("check");
        assert!(result.is_none());
        assert_eq!(console.contents(), "");
    }

    #[test]
    fn test_overlap_check_reports_sorted_intersection() {
        let console = Console::buffered(false);
        let mut gateway = RecordingGateway::new(console.clone());
        let result = NoStagedAndUnstagedChanges::new()
            .check(&mut gateway, &view(&["b.py", "a.py"], &["a.py", "b.py"]))
            .expect("check")
            .expect("problem");

        assert_eq!(console.contents(), "|  a.py\n|  b.py\n");
        assert!(result.message.is_none());
        match result.autofix {
            Some(Autofix::Command(cmd)) => {
                assert_eq!(cmd, vec!["git", "add", "a.py", "b.py"]);
            },
            other => panic!("expected command autofix, got {other:?}"),
        }
    }

    #[test]
    fn test_overlap_check_is_fixable() {
        assert!(NoStagedAndUnstagedChanges::new().is_fixable());
    }

    // =========================================================================
    // DoNotSubmit
    // =========================================================================

    #[test]
    fn test_do_not_submit_detects_marker() {
        let console = Console::buffered(false);
        let mut gateway =
            RecordingGateway::new(console.clone()).with_default_file(&marker());
        let problem = DoNotSubmit::new()
            .check(&mut gateway, &view(&["main.py"], &[]))
            .expect("check")
            .expect("problem");

        assert_eq!(console.contents(), "|  main.py\n");
        let expected = format!("file contains '{}{}'", "DO NOT ", "SUBMIT");
        assert_eq!(problem.message.as_deref(), Some(expected.as_str()));
        assert!(problem.autofix.is_none());
    }

    #[test]
    fn test_do_not_submit_is_case_insensitive() {
        let content = marker().to_ascii_lowercase();
        let mut gateway =
            RecordingGateway::new(Console::buffered(false)).with_default_file(&content);
        let problem = DoNotSubmit::new()
            .check(&mut gateway, &view(&["main.py"], &[]))
            .expect("check");
        assert!(problem.is_some());
    }

    #[test]
    fn test_do_not_submit_passes_clean_files() {
        let mut gateway =
            RecordingGateway::new(Console::buffered(false)).with_default_file(b"clean content");
        let problem = DoNotSubmit::new()
            .check(&mut gateway, &view(&["main.py"], &[]))
            .expect("check");
        assert!(problem.is_none());
    }

    #[test]
    fn test_do_not_submit_respects_filter() {
        let filter = FileFilter::new(&["*.py"], &[]).expect("compile");
        let mut gateway =
            RecordingGateway::new(Console::buffered(false)).with_default_file(&marker());
        // Only main.py is inspected; the .rs file never gets read.
        let problem = DoNotSubmit::new()
            .with_filter(filter)
            .check(&mut gateway, &view(&["main.py", "lib.rs"], &[]))
            .expect("check")
            .expect("problem");
        assert!(problem.message.is_some());
    }

    #[test]
    fn test_do_not_submit_read_error_aborts() {
        let mut gateway = RecordingGateway::new(Console::buffered(false));
        let result = DoNotSubmit::new().check(&mut gateway, &view(&["main.py"], &[]));
        assert!(result.is_err());
    }

    // =========================================================================
    // NoWhitespaceInFilePath
    // =========================================================================

    #[test]
    fn test_whitespace_check_reports_bad_paths() {
        let console = Console::buffered(false);
        let mut gateway = RecordingGateway::new(console.clone());
        let problem = NoWhitespaceInFilePath::new()
            .check(&mut gateway, &view(&["ok.py", "has space.py"], &[]))
            .expect("check")
            .expect("problem");

        assert_eq!(console.contents(), "|  has space.py\n");
        assert_eq!(
            problem.message.as_deref(),
            Some("file path contains whitespace")
        );
    }

    #[test]
    fn test_whitespace_check_passes_clean_paths() {
        let mut gateway = RecordingGateway::new(Console::buffered(false));
        let problem = NoWhitespaceInFilePath::new()
            .check(&mut gateway, &view(&["ok.py", "also_ok.rs"], &[]))
            .expect("check");
        assert!(problem.is_none());
    }

    // =========================================================================
    // CommandCheck
    // =========================================================================

    #[test]
    fn test_separately_requires_pass_files() {
        let result = CommandCheck::builder("Bad", vec!["tool".to_string()])
            .separately(true)
            .build();
        assert!(matches!(result, Err(Error::Usage { .. })));
    }

    #[test]
    fn test_separately_with_pass_files_builds() {
        let result = CommandCheck::builder("Good", vec!["tool".to_string()])
            .pass_files(true)
            .separately(true)
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_command_check_passes_filtered_files() {
        let mut gateway = RecordingGateway::new(Console::buffered(false));
        let check = python_format(&[]).build().expect("build");
        let problem = check
            .check(&mut gateway, &view(&["main.py", "lib.rs"], &[]))
            .expect("check");

        assert!(problem.is_none());
        assert_eq!(
            gateway.commands,
            vec![vec!["black", "--check", "main.py"]]
        );
    }

    #[test]
    fn test_command_check_failure_appends_files_to_fix() {
        let mut gateway =
            RecordingGateway::new(Console::buffered(false)).with_handler(|_, _| 1);
        let check = python_format(&[]).build().expect("build");
        let problem = check
            .check(&mut gateway, &view(&["main.py"], &[]))
            .expect("check")
            .expect("problem");

        match problem.autofix {
            Some(Autofix::Command(cmd)) => assert_eq!(cmd, vec!["black", "main.py"]),
            other => panic!("expected command autofix, got {other:?}"),
        }
    }

    #[test]
    fn test_command_check_without_fix_is_not_fixable() {
        let check = python_lint(&[]).build().expect("build");
        assert!(!check.is_fixable());

        let mut gateway =
            RecordingGateway::new(Console::buffered(false)).with_handler(|_, _| 1);
        let problem = check
            .check(&mut gateway, &view(&["main.py"], &[]))
            .expect("check")
            .expect("problem");
        assert!(problem.autofix.is_none());
    }

    #[test]
    fn test_command_check_separately_runs_per_file() {
        let mut gateway = RecordingGateway::new(Console::buffered(false))
            .with_handler(|cmd, _| i32::from(cmd.last().map(String::as_str) == Some("b.py")));
        let check = CommandCheck::builder("PerFile", vec!["tool".to_string()])
            .pass_files(true)
            .separately(true)
            .fix(vec!["tool".to_string(), "--write".to_string()])
            .build()
            .expect("build");

        let problem = check
            .check(&mut gateway, &view(&["a.py", "b.py"], &[]))
            .expect("check")
            .expect("problem");

        assert_eq!(
            gateway.commands,
            vec![vec!["tool", "a.py"], vec!["tool", "b.py"]]
        );
        // The fix command is reused as-is, without per-file arguments.
        match problem.autofix {
            Some(Autofix::Command(cmd)) => assert_eq!(cmd, vec!["tool", "--write"]),
            other => panic!("expected command autofix, got {other:?}"),
        }
    }

    #[test]
    fn test_command_check_without_pass_files_runs_bare() {
        let mut gateway = RecordingGateway::new(Console::buffered(false));
        let check = CommandCheck::builder("Bare", vec!["make".to_string(), "lint".to_string()])
            .build()
            .expect("build");
        check
            .check(&mut gateway, &view(&["main.py"], &[]))
            .expect("check");
        assert_eq!(gateway.commands, vec![vec!["make", "lint"]]);
    }

    // =========================================================================
    // Factories
    // =========================================================================

    #[test]
    fn test_factory_names() {
        assert_eq!(python_format(&[]).build().expect("build").name(), "PythonFormat");
        assert_eq!(python_lint(&[]).build().expect("build").name(), "PythonLint");
        assert_eq!(
            python_import_order(&[]).build().expect("build").name(),
            "PythonImportOrder"
        );
        assert_eq!(python_types(&[]).build().expect("build").name(), "PythonTypes");
        assert_eq!(javascript_lint().build().expect("build").name(), "JavaScriptLint");
        assert_eq!(rust_format(&[]).build().expect("build").name(), "RustFormat");
    }

    #[test]
    fn test_factory_extra_args_carry_into_fix() {
        let args = vec!["--line-length=100".to_string()];
        let mut gateway =
            RecordingGateway::new(Console::buffered(false)).with_handler(|_, _| 1);
        let check = python_format(&args).build().expect("build");
        let problem = check
            .check(&mut gateway, &view(&["main.py"], &[]))
            .expect("check")
            .expect("problem");

        assert_eq!(
            gateway.commands,
            vec![vec!["black", "--check", "--line-length=100", "main.py"]]
        );
        match problem.autofix {
            Some(Autofix::Command(cmd)) => {
                assert_eq!(cmd, vec!["black", "--line-length=100", "main.py"]);
            },
            other => panic!("expected command autofix, got {other:?}"),
        }
    }

    #[test]
    fn test_factory_exclude_extends_include() {
        let mut gateway = RecordingGateway::new(Console::buffered(false));
        let check = python_format(&[])
            .exclude(["ignoreme.py"])
            .build()
            .expect("build");
        check
            .check(&mut gateway, &view(&["main.py", "ignoreme.py"], &[]))
            .expect("check");
        assert_eq!(
            gateway.commands,
            vec![vec!["black", "--check", "main.py"]]
        );
    }
}
