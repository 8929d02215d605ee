//! Configuration handling for precommit.
//!
//! The checklist is declared in `precommit.toml` at the repository root as
//! an ordered `[[check]]` array. The file is loaded from that explicit path
//! only — never found by searching ambient locations — and a missing file
//! is a distinct error from a failing run.

use crate::checks::builtin::{
    self, CommandCheck, DoNotSubmit, NoStagedAndUnstagedChanges, NoWhitespaceInFilePath,
};
use crate::checks::{Check, Checklist, FileFilter};
use crate::core::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration file name, relative to the repository root.
pub const CONFIG_FILE_NAME: &str = "precommit.toml";

/// Default configuration written by `precommit init`.
pub const DEFAULT_CONFIG: &str = r#"# Pre-commit checks for this repository.
#
# This file was created by 'precommit init'. You are welcome to edit it to
# customize your pre-commit hook. Checks run in the order declared here.

[[check]]
type = "NoStagedAndUnstagedChanges"

[[check]]
type = "NoWhitespaceInFilePath"

[[check]]
type = "DoNotSubmit"

# Check Python format with black.
[[check]]
type = "PythonFormat"

# Lint Python code with flake8.
[[check]]
type = "PythonLint"

# Check the order of Python imports with isort.
[[check]]
type = "PythonImportOrder"

# Check Python static type annotations with mypy.
[[check]]
type = "PythonTypes"

# Lint JavaScript code with ESLint.
[[check]]
type = "JavaScriptLint"
"#;

/// Parsed configuration file.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Declared checks, in registration order.
    #[serde(default, rename = "check")]
    pub checks: Vec<CheckEntry>,
}

impl Config {
    /// Loads the configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound {
                    path: path.to_path_buf(),
                });
            },
            Err(e) => return Err(Error::io(format!("read {}", path.display()), e)),
        };

        toml::from_str(&content)
            .map_err(|e| Error::config_parse_with_source(format!("invalid {CONFIG_FILE_NAME}"), e))
    }

    /// Materializes the declared checks into a checklist.
    pub fn into_checklist(self) -> Result<Checklist> {
        let mut checklist = Checklist::new();
        for entry in self.checks {
            checklist.push(entry.into_check()?);
        }
        Ok(checklist)
    }
}

/// Loads `precommit.toml` from the repository root and builds the checklist.
pub fn load_checklist(root: &Path) -> Result<Checklist> {
    Config::load_from(&root.join(CONFIG_FILE_NAME))?.into_checklist()
}

/// One `[[check]]` declaration.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum CheckEntry {
    /// Staged files must not also have unstaged changes.
    NoStagedAndUnstagedChanges {
        #[serde(default)]
        slow: bool,
    },

    /// Staged files must not contain the do-not-submit marker.
    DoNotSubmit {
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
        #[serde(default)]
        slow: bool,
    },

    /// Staged file paths must not contain whitespace.
    NoWhitespaceInFilePath {
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
        #[serde(default)]
        slow: bool,
    },

    /// Check Python format with black.
    PythonFormat {
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
        #[serde(default)]
        slow: bool,
    },

    /// Lint Python code with flake8.
    PythonLint {
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
        #[serde(default)]
        slow: bool,
    },

    /// Check the order of Python imports with isort.
    PythonImportOrder {
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
        #[serde(default)]
        slow: bool,
    },

    /// Check Python static type annotations with mypy.
    PythonTypes {
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
        #[serde(default)]
        slow: bool,
    },

    /// Lint JavaScript code with ESLint.
    JavaScriptLint {
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
        #[serde(default)]
        slow: bool,
    },

    /// Check Rust formatting with rustfmt.
    RustFormat {
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
        #[serde(default)]
        slow: bool,
    },

    /// An arbitrary external command.
    Command {
        name: String,
        cmd: Vec<String>,
        #[serde(default)]
        fix: Option<Vec<String>>,
        #[serde(default)]
        pass_files: bool,
        #[serde(default)]
        separately: bool,
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
        #[serde(default)]
        slow: bool,
    },
}

impl CheckEntry {
    /// Builds the declared check.
    pub fn into_check(self) -> Result<Box<dyn Check>> {
        match self {
            Self::NoStagedAndUnstagedChanges { slow } => {
                Ok(Box::new(NoStagedAndUnstagedChanges::new().slow(slow)))
            },
            Self::DoNotSubmit {
                include,
                exclude,
                slow,
            } => Ok(Box::new(
                DoNotSubmit::new()
                    .with_filter(FileFilter::new(&include, &exclude)?)
                    .slow(slow),
            )),
            Self::NoWhitespaceInFilePath {
                include,
                exclude,
                slow,
            } => Ok(Box::new(
                NoWhitespaceInFilePath::new()
                    .with_filter(FileFilter::new(&include, &exclude)?)
                    .slow(slow),
            )),
            Self::PythonFormat {
                args,
                include,
                exclude,
                slow,
            } => build_command(builtin::python_format(&args), include, exclude, slow),
            Self::PythonLint {
                args,
                include,
                exclude,
                slow,
            } => build_command(builtin::python_lint(&args), include, exclude, slow),
            Self::PythonImportOrder {
                args,
                include,
                exclude,
                slow,
            } => build_command(builtin::python_import_order(&args), include, exclude, slow),
            Self::PythonTypes {
                args,
                include,
                exclude,
                slow,
            } => build_command(builtin::python_types(&args), include, exclude, slow),
            Self::JavaScriptLint {
                include,
                exclude,
                slow,
            } => build_command(builtin::javascript_lint(), include, exclude, slow),
            Self::RustFormat {
                args,
                include,
                exclude,
                slow,
            } => build_command(builtin::rust_format(&args), include, exclude, slow),
            Self::Command {
                name,
                cmd,
                fix,
                pass_files,
                separately,
                include,
                exclude,
                slow,
            } => {
                let mut builder = CommandCheck::builder(name, cmd)
                    .pass_files(pass_files)
                    .separately(separately);
                if let Some(fix) = fix {
                    builder = builder.fix(fix);
                }
                build_command(builder, include, exclude, slow)
            },
        }
    }
}

fn build_command(
    builder: builtin::CommandBuilder,
    include: Vec<String>,
    exclude: Vec<String>,
    slow: bool,
) -> Result<Box<dyn Check>> {
    Ok(Box::new(
        builder.include(include).exclude(exclude).slow(slow).build()?,
    ))
}
