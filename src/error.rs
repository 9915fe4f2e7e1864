//! Error types for the rolling log writer

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Filesystem operation that failed during a write attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    CreateDir,
    CreateFile,
    Metadata,
    Open,
    Write,
    Rename,
}

impl IoOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            IoOp::CreateDir => "create log directory",
            IoOp::CreateFile => "create log file",
            IoOp::Metadata => "query log file size",
            IoOp::Open => "open log file",
            IoOp::Write => "write log file",
            IoOp::Rename => "archive log file",
        }
    }
}

impl std::fmt::Display for IoOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by [`crate::logging::RollingLogWriter`]
#[derive(Debug, Error)]
pub enum LogError {
    /// The path string cannot name a log file
    #[error("invalid log path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A filesystem operation failed
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Every attempt failed; carries the cause of the last one
    #[error("multiple errors occurred writing to '{path}' ({attempts} attempts)")]
    MultipleErrors {
        path: String,
        attempts: usize,
        #[source]
        source: Box<LogError>,
    },
}

impl LogError {
    pub(crate) fn io(op: IoOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        LogError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        LogError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// The innermost error, looking through `MultipleErrors`
    pub fn root_cause(&self) -> &LogError {
        match self {
            LogError::MultipleErrors { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Categories of disk errors for user-facing hints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskErrorKind {
    /// Disk is full or quota exceeded
    DiskFull,
    /// Permission denied (read or write)
    PermissionDenied,
    /// File or directory not found
    NotFound,
    /// Other IO error
    Other,
}

impl DiskErrorKind {
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            DiskErrorKind::DiskFull => Some("disk full - free space needed to keep logging"),
            DiskErrorKind::PermissionDenied => {
                Some("permission denied - check access to the log file and its directory")
            }
            DiskErrorKind::NotFound => Some("file or directory not found"),
            DiskErrorKind::Other => None,
        }
    }
}

/// Categorize an IO error
pub fn categorize_io_error(e: &io::Error) -> DiskErrorKind {
    use std::io::ErrorKind;

    match e.kind() {
        ErrorKind::WriteZero => DiskErrorKind::DiskFull,
        ErrorKind::PermissionDenied => DiskErrorKind::PermissionDenied,
        ErrorKind::NotFound => DiskErrorKind::NotFound,
        _ => {
            #[cfg(unix)]
            {
                if let Some(os_error) = e.raw_os_error() {
                    // ENOSPC, EDQUOT (Linux), EDQUOT (macOS)
                    if os_error == 28 || os_error == 122 || os_error == 69 {
                        return DiskErrorKind::DiskFull;
                    }
                    // EACCES
                    if os_error == 13 {
                        return DiskErrorKind::PermissionDenied;
                    }
                }
            }
            #[cfg(windows)]
            {
                if let Some(os_error) = e.raw_os_error() {
                    // ERROR_HANDLE_DISK_FULL, ERROR_DISK_FULL
                    if os_error == 39 || os_error == 112 {
                        return DiskErrorKind::DiskFull;
                    }
                    // ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
                    if os_error == 32 || os_error == 33 {
                        return DiskErrorKind::PermissionDenied;
                    }
                }
            }
            DiskErrorKind::Other
        }
    }
}

impl LogError {
    /// Hint for the user derived from the underlying IO error, if any
    pub fn hint(&self) -> Option<&'static str> {
        match self.root_cause() {
            LogError::Io { source, .. } => categorize_io_error(source).hint(),
            _ => None,
        }
    }
}
