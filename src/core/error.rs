//! Error types for precommit.
//!
//! Problems reported by checks are *not* errors: they flow through the
//! [`crate::checks::Problem`] value. Everything here aborts the run.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in precommit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at the repository root.
    #[error("could not find {}. You can create it with 'precommit init'.", .path.display())]
    ConfigNotFound {
        /// Path where the configuration was expected.
        path: PathBuf,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {message}")]
    ConfigParse {
        /// Description of the parse error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed check construction or CLI invocation.
    #[error("{message}")]
    Usage {
        /// Description of the misuse.
        message: String,
    },

    /// Not inside a git repository.
    #[error("must be in git repository.")]
    NotGitRepo,

    /// A git invocation failed.
    #[error("git {operation} failed: {message}")]
    Git {
        /// Name of the git operation that failed.
        operation: String,
        /// Error message.
        message: String,
    },

    /// An external command's binary could not be found.
    #[error("command not found: {command}")]
    CommandNotFound {
        /// The command that wasn't found.
        command: String,
    },

    /// `init` refusing to overwrite an existing file.
    #[error("{} already exists. Re-run with --force to overwrite it.", .path.display())]
    AlreadyExists {
        /// Path to the existing file.
        path: PathBuf,
    },

    /// File I/O error.
    #[error("I/O error: {message}")]
    Io {
        /// Description of what failed.
        message: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    /// Internal error (should never happen).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Creates a new usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Creates a new configuration parse error with source.
    pub fn config_parse_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new I/O error with context.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Creates a new git operation error.
    pub fn git(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Git {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
