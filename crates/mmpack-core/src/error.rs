//! Error types for mmpack operations.
//!
//! Every error carries an [`ErrorCode`] so it can be searched and
//! referenced independently of the (potentially reworded) message text.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Stable identifier for an mmpack error, grouped by subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Package name not present in any configured repository.
    M0101,
    /// No version of a known package satisfies the requested range.
    M0102,
    /// Solver exhausted every decision without finding a solution.
    M0201,
    /// A system-level prerequisite (per `sysdeps`) is missing.
    M0301,
    /// Downloaded or installed content failed its SHA-256 check.
    M0401,
    /// Malformed package or index metadata.
    M0402,
    /// Filesystem or network I/O failure.
    M0501,
    /// Malformed or unreadable configuration file.
    M0601,
    /// User declined the confirmation prompt.
    M0701,
}

impl ErrorCode {
    /// The `MNNNN`-style code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::M0101 => "M0101",
            Self::M0102 => "M0102",
            Self::M0201 => "M0201",
            Self::M0301 => "M0301",
            Self::M0401 => "M0401",
            Self::M0402 => "M0402",
            Self::M0501 => "M0501",
            Self::M0601 => "M0601",
            Self::M0701 => "M0701",
        }
    }

    /// A short human title, used for one-line CLI summaries.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::M0101 => "package not found",
            Self::M0102 => "version not satisfiable",
            Self::M0201 => "unsatisfiable constraints",
            Self::M0301 => "missing system dependency",
            Self::M0401 => "integrity check failed",
            Self::M0402 => "malformed metadata",
            Self::M0501 => "I/O error",
            Self::M0601 => "invalid configuration",
            Self::M0701 => "user denied",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result type alias used throughout the mmpack workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by mmpack's core, solver, archive, downloader and CLI.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested package name does not exist in the index.
    #[error("[{code}] package '{name}' not found", code = ErrorCode::M0101)]
    UnknownPackage {
        /// Name that could not be resolved.
        name: String,
    },

    /// A version constraint matched zero candidates for a known package.
    #[error(
        "[{code}] no version of '{name}' satisfies '{constraint}'",
        code = ErrorCode::M0102
    )]
    VersionNotFound {
        /// Package name.
        name: String,
        /// Constraint that could not be satisfied, rendered for display.
        constraint: String,
    },

    /// The solver backtracked past its last decision point.
    #[error(
        "[{code}] could not satisfy requested package constraints",
        code = ErrorCode::M0201
    )]
    Unsatisfiable,

    /// One or more `sysdeps` entries are missing on the host.
    #[error(
        "[{code}] missing system dependencies: {}",
        missing.join(", "),
        code = ErrorCode::M0301
    )]
    MissingSysDeps {
        /// Names reported missing by the sysdep checker.
        missing: Vec<String>,
    },

    /// A downloaded or on-disk artifact did not match its recorded hash.
    #[error(
        "[{code}] checksum mismatch for '{name}': expected {expected}, got {actual}",
        code = ErrorCode::M0401
    )]
    Integrity {
        /// Package or file name.
        name: String,
        /// Expected hex-encoded SHA-256.
        expected: String,
        /// Actual hex-encoded SHA-256.
        actual: String,
    },

    /// Package or index metadata could not be parsed.
    #[error("[{code}] malformed metadata: {message}", code = ErrorCode::M0402)]
    Metadata {
        /// Description of what failed to parse.
        message: String,
    },

    /// Filesystem or network I/O failure.
    #[error("[{code}] I/O error at {path}: {source}", code = ErrorCode::M0501)]
    Io {
        /// Path involved in the failing operation.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is unreadable or has an invalid value.
    #[error("[{code}] invalid configuration: {message}", code = ErrorCode::M0601)]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// The user declined the confirmation prompt.
    #[error("[{code}] aborted by user", code = ErrorCode::M0701)]
    Denied,
}

impl Error {
    /// Build an [`Error::Io`] from a path and the originating [`std::io::Error`].
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The [`ErrorCode`] carried by this error, for CLI summaries and tests.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownPackage { .. } => ErrorCode::M0101,
            Self::VersionNotFound { .. } => ErrorCode::M0102,
            Self::Unsatisfiable => ErrorCode::M0201,
            Self::MissingSysDeps { .. } => ErrorCode::M0301,
            Self::Integrity { .. } => ErrorCode::M0401,
            Self::Metadata { .. } => ErrorCode::M0402,
            Self::Io { .. } => ErrorCode::M0501,
            Self::Config { .. } => ErrorCode::M0601,
            Self::Denied => ErrorCode::M0701,
        }
    }
}
