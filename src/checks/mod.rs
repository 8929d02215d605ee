//! The check protocol.
//!
//! A [`Check`] inspects the repository snapshot and reports at most one
//! [`Problem`]; a problem may carry an [`Autofix`]. The [`Checklist`] is the
//! ordered registry the configuration populates, and [`FileFilter`] is the
//! include/exclude glob filtering every check applies to the staged file
//! list before inspecting it.

use crate::core::error::{Error, Result};
use crate::core::gateway::Gateway;
use crate::core::git::RepositoryView;
use glob::Pattern;
use std::fmt;

pub mod builtin;

/// A unit of validation logic against the repository's staged change set.
pub trait Check {
    /// Display name used for report section headers.
    fn name(&self) -> &str;

    /// Slow checks run only when the engine is invoked with `check_all`.
    fn is_slow(&self) -> bool {
        false
    }

    /// Whether invoking a fix is meaningful for this check.
    fn is_fixable(&self) -> bool {
        false
    }

    /// Inspects the repository and reports at most one problem.
    ///
    /// Must be safely re-invocable: no side effects beyond reads and report
    /// printing through the gateway. Returning `Err` aborts the whole run.
    fn check(
        &self,
        gateway: &mut dyn Gateway,
        repository: &RepositoryView,
    ) -> Result<Option<Problem>>;
}

/// A reported finding, optionally carrying an autofix action.
///
/// Constructed fresh by every `check()` invocation and consumed by the
/// engine; never shared across checks.
#[derive(Debug, Default)]
pub struct Problem {
    /// Printed to the report when present.
    pub message: Option<String>,
    /// Absent means the failure is not auto-fixable even if the owning
    /// check claims to be.
    pub autofix: Option<Autofix>,
}

impl Problem {
    /// A problem carrying a message and no autofix.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            autofix: None,
        }
    }

    /// A problem whose only payload is an autofix action.
    #[must_use]
    pub fn fixable(autofix: Autofix) -> Self {
        Self {
            message: None,
            autofix: Some(autofix),
        }
    }

    /// Attaches an autofix action.
    #[must_use]
    pub fn with_autofix(mut self, autofix: Autofix) -> Self {
        self.autofix = Some(autofix);
        self
    }
}

/// An action that resolves a problem when invoked.
pub enum Autofix {
    /// Run an external command.
    Command(Vec<String>),
    /// Invoke a callback.
    Callback(Box<dyn FnOnce() -> Result<()>>),
}

impl Autofix {
    /// Builds a command autofix from argument parts.
    pub fn command<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Command(parts.into_iter().map(Into::into).collect())
    }

    /// Applies the fix. Command exit codes are not inspected; only failure
    /// to launch is an error.
    pub fn apply(self, gateway: &mut dyn Gateway) -> Result<()> {
        match self {
            Self::Command(cmd) => {
                gateway.run(&cmd)?;
                Ok(())
            },
            Self::Callback(callback) => callback(),
        }
    }
}

impl fmt::Debug for Autofix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Ordered registry of checks.
///
/// Insertion order is execution and report order; duplicates are permitted.
#[derive(Default)]
pub struct Checklist {
    checks: Vec<Box<dyn Check>>,
}

impl Checklist {
    /// Creates an empty checklist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a check.
    pub fn check(&mut self, check: impl Check + 'static) {
        self.checks.push(Box::new(check));
    }

    /// Registers an already-boxed check.
    pub fn push(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    /// Number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether no checks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Consumes the checklist, yielding the checks in registration order.
    #[must_use]
    pub fn into_checks(self) -> Vec<Box<dyn Check>> {
        self.checks
    }
}

impl fmt::Debug for Checklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.checks.iter().map(|check| check.name()))
            .finish()
    }
}

/// Include/exclude glob filtering over repository-relative paths.
///
/// Exclude patterns always take precedence over include patterns. An empty
/// include list matches every path; an empty exclude list matches none.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl FileFilter {
    /// Compiles include and exclude glob patterns.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Returns the subset of `paths` this filter keeps, in input order.
    #[must_use]
    pub fn apply(&self, paths: &[String]) -> Vec<String> {
        paths
            .iter()
            .filter(|path| self.matches(path))
            .cloned()
            .collect()
    }

    /// Whether a single path passes the filter.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if self.exclude.iter().any(|pattern| pattern.matches(path)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|pattern| pattern.matches(path))
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p.as_ref())
                .map_err(|e| Error::usage(format!("invalid glob pattern '{}': {e}", p.as_ref())))
        })
        .collect()
}
