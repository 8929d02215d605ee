//! The check engine.
//!
//! Drives registered checks strictly sequentially, in registration order,
//! against one immutable repository snapshot. Check mode reports every
//! executed check; fix mode reports only fixable problems and applies their
//! autofixes.

use crate::checks::{Autofix, Check};
use crate::core::console::Console;
use crate::core::error::Result;
use crate::core::gateway::Gateway;
use crate::core::git::RepositoryView;

/// Run configuration, immutable for the duration of one invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Run slow checks too.
    pub check_all: bool,
    /// Report fixes without applying them (fix mode only).
    pub dry_run: bool,
    /// Echo the commands used to apply fixes.
    pub verbose: bool,
}

/// Counters accumulated over a single engine pass, in execution order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Checks executed (skipped slow checks are not counted).
    pub checks_run: usize,
    /// Problems detected.
    pub problems_found: usize,
    /// Problems fixed (or that would be fixed, under dry-run).
    pub problems_fixed: usize,
    /// Detected problems that carry an autofix.
    pub fixable: usize,
}

impl RunSummary {
    /// Whether any problem was detected.
    #[must_use]
    pub fn found_problems(&self) -> bool {
        self.problems_found > 0
    }
}

/// Drives registered checks against a repository snapshot.
pub struct Precommit {
    checks: Vec<Box<dyn Check>>,
    console: Console,
    options: RunOptions,
}

impl Precommit {
    /// Creates an engine over the given checks.
    #[must_use]
    pub fn new(checks: Vec<Box<dyn Check>>, console: Console, options: RunOptions) -> Self {
        Self {
            checks,
            console,
            options,
        }
    }

    /// Runs every check and reports pass/fail per section.
    ///
    /// Returns the run counters; the caller maps `found_problems` to the
    /// process exit status.
    pub fn check(
        &self,
        gateway: &mut dyn Gateway,
        repository: &RepositoryView,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for check in &self.checks {
            if self.skipped(check.as_ref()) {
                continue;
            }

            tracing::debug!(check = check.name(), "running check");
            self.print_banner(check.name());

            let problem = check.check(gateway, repository)?;
            summary.checks_run += 1;

            match problem {
                Some(problem) => {
                    summary.problems_found += 1;
                    if let Some(message) = &problem.message {
                        gateway.print(message);
                    }
                    if problem.autofix.is_some() && check.is_fixable() {
                        summary.fixable += 1;
                    }
                    self.console.print(&self.console.red("o--[ failed! ]"));
                },
                None => {
                    self.console.print(&self.console.green("o--[ passed! ]"));
                },
            }
            self.console.print("");
        }

        self.console.print("");
        let mut line = format!(
            "Ran {} checks. Detected {} issues.",
            summary.checks_run, summary.problems_found
        );
        if summary.fixable > 0 {
            line.push_str(&format!(
                " Fix {} of them with 'precommit fix'.",
                summary.fixable
            ));
        }
        self.console.print(&line);

        Ok(summary)
    }

    /// Runs every fixable check and applies the autofix of each problem
    /// that carries one.
    ///
    /// Problems without an autofix, and passing checks, are omitted from
    /// the report entirely. After the pass, every originally staged or
    /// unstaged file (minus staged deletions) is re-staged so applied fixes
    /// are captured by the commit.
    pub fn fix(
        &self,
        gateway: &mut dyn Gateway,
        repository: &RepositoryView,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for check in &self.checks {
            if self.skipped(check.as_ref()) || !check.is_fixable() {
                continue;
            }

            summary.checks_run += 1;
            tracing::debug!(check = check.name(), "running fixable check");

            // Defer the check's own output until we know the section is
            // reportable at all.
            self.console.begin_capture();
            let outcome = check.check(gateway, repository);
            let captured = self.console.end_capture();

            let Some(problem) = outcome? else { continue };
            let Some(autofix) = problem.autofix else {
                continue;
            };

            summary.problems_found += 1;
            self.print_banner(check.name());
            for line in captured.lines() {
                self.console.print(line);
            }
            if let Some(message) = &problem.message {
                gateway.print(message);
            }

            if self.options.verbose {
                if let Autofix::Command(cmd) = &autofix {
                    gateway.print(&format!("$ {}", cmd.join(" ")));
                }
            }

            if self.options.dry_run {
                self.console
                    .print(&self.console.yellow("o--[ would fix! ]"));
            } else {
                autofix.apply(gateway)?;
                self.console.print(&self.console.green("o--[ fixed! ]"));
            }
            summary.problems_fixed += 1;
            self.console.print("");
        }

        if summary.problems_fixed > 0 && !self.options.dry_run {
            let targets = repository.restage_targets();
            if !targets.is_empty() {
                let mut cmd = vec!["git".to_string(), "add".to_string()];
                cmd.extend(targets);
                gateway.run(&cmd)?;
            }
        }

        self.console.print("");
        self.console.print(&format!(
            "Ran {} fixable checks. Detected {} issues. Fixed {} of them.",
            summary.checks_run, summary.problems_found, summary.problems_fixed
        ));

        Ok(summary)
    }

    fn skipped(&self, check: &dyn Check) -> bool {
        if check.is_slow() && !self.options.check_all {
            tracing::debug!(check = check.name(), "skipping slow check");
            return true;
        }
        false
    }

    fn print_banner(&self, name: &str) {
        self.console
            .print(&self.console.blue(&format!("o--[ {name} ]")));
    }
}
