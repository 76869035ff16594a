//! Error types for warden-core

use std::path::PathBuf;

/// Result type for warden-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in warden-core operations.
///
/// Every variant here is fatal for the run. Per-path filesystem failures
/// during a walk and structural defects found while comparing are recorded
/// as [`Notification`](crate::Notification)s instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed policy / report configuration
    #[error("Configuration error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A policy that loaded but cannot be walked
    #[error("Invalid policy: {message}")]
    InvalidPolicy { message: String },

    /// A baseline whose referenced artifact no longer matches its review
    #[error("Integrity check failed for {reference}: {message}")]
    Integrity { reference: PathBuf, message: String },

    /// Failed read or write of a walk or reviews artifact
    #[error("Failed to {action} {path}: {message}")]
    Persistence {
        action: &'static str,
        path: PathBuf,
        message: String,
    },

    /// A walk was produced on a different host than the one under review
    #[error("Walk {path} was recorded on host {actual:?}, expected {expected:?}")]
    WalkMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// No walk artifact could be located for a host
    #[error("No walk found for host {hostname:?} in {dir}")]
    NoWalkFound { hostname: String, dir: PathBuf },

    /// Not enough information to pick the walks to compare
    #[error("{message}")]
    Unresolved { message: String },

    /// A walk that records the same path more than once. Reported as a
    /// comparison notification, never returned from a run.
    #[error("Path {path} recorded more than once in walk {walk_id}")]
    DuplicatePath { path: PathBuf, walk_id: uuid::Uuid },

    /// The traversal worker pool could not be started
    #[error("Unable to start walk workers: {0}")]
    WorkerPool(String),

    /// Filesystem error from warden-fs
    #[error(transparent)]
    Fs(#[from] warden_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Broad classes of failure, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Integrity,
    Io,
    Persistence,
    ComparisonDefect,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config { .. }
            | Self::InvalidPolicy { .. }
            | Self::NoWalkFound { .. }
            | Self::Unresolved { .. } => ErrorCategory::Config,
            Self::Integrity { .. } | Self::WalkMismatch { .. } => ErrorCategory::Integrity,
            Self::Persistence { .. } | Self::Json(_) => ErrorCategory::Persistence,
            Self::WorkerPool(_) | Self::Fs(_) | Self::Io(_) => ErrorCategory::Io,
            Self::DuplicatePath { .. } => ErrorCategory::ComparisonDefect,
        }
    }

    pub(crate) fn config(path: impl Into<PathBuf>, source: warden_fs::Error) -> Self {
        Self::Config {
            path: path.into(),
            message: source.to_string(),
        }
    }

    pub(crate) fn persistence(
        action: &'static str,
        path: impl Into<PathBuf>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Persistence {
            action,
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config => write!(f, "ConfigError"),
            Self::Integrity => write!(f, "IntegrityError"),
            Self::Io => write!(f, "IOError"),
            Self::Persistence => write!(f, "PersistenceError"),
            Self::ComparisonDefect => write!(f, "ComparisonDefect"),
        }
    }
}
