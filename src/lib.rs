//! # precommit
//!
//! Simple git pre-commit hook management.
//!
//! A checklist of [`Check`]s declared in `precommit.toml` runs against the
//! files staged in the current git repository. Each check reports at most
//! one [`Problem`]; a problem may carry an autofix that `precommit fix`
//! applies.
//!
//! ## Features
//!
//! - **Declarative checklist**: register built-in checks and arbitrary
//!   command wrappers in `precommit.toml`
//! - **Glob filtering**: every check narrows the staged file list with
//!   include/exclude patterns; excludes always win
//! - **Autofixes**: `precommit fix` applies the fixes failing checks
//!   declare, then re-stages the changed files
//! - **Hook installation**: `precommit init` writes the configuration and
//!   the git pre-commit hook
//!
//! ## Example
//!
//! ```rust,no_run
//! use precommit::checks::builtin;
//! use precommit::{Checklist, Console, GitRepo, Precommit, RunOptions, SystemGateway};
//!
//! fn main() -> precommit::Result<()> {
//!     let mut checklist = Checklist::new();
//!     checklist.check(builtin::NoStagedAndUnstagedChanges::new());
//!     checklist.check(builtin::python_format(&[]).build()?);
//!
//!     let repo = GitRepo::discover()?;
//!     let console = Console::new(false);
//!     let mut gateway = SystemGateway::new(console.clone());
//!
//!     let engine = Precommit::new(checklist.into_checks(), console, RunOptions::default());
//!     let summary = engine.check(&mut gateway, &repo.snapshot()?)?;
//!     if summary.found_problems() {
//!         std::process::exit(1);
//!     }
//!     Ok(())
//! }
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod core;

// Re-export main types for convenience
pub use crate::checks::{Autofix, Check, Checklist, FileFilter, Problem};
pub use crate::core::console::Console;
pub use crate::core::error::{Error, Result};
pub use crate::core::gateway::{Gateway, SystemGateway};
pub use crate::core::git::{GitRepo, RepositoryView};
pub use crate::core::runner::{Precommit, RunOptions, RunSummary};
