/// Error types for grip.
///
/// Every failure the library can report is a variant of [`SearchError`]. Most of them are
/// local to a single file or directory: the walker hands them to the output sink and keeps
/// going, so one unreadable file never takes its siblings down with it.
///
/// ```rust,ignore
/// match outcome {
///     Ok(file) if file.has_matches() => // print it,
///     Ok(_) => // nothing to show,
///     Err(SearchError::PermissionDenied(path)) => // report and move on,
///     Err(e) => // report and move on,
/// }
/// ```
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while configuring or running a search
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("{} is not a valid directory: {source}", path.display())]
    InvalidDirectory { path: PathBuf, source: io::Error },
    #[error("Invalid UTF-8 in file {} at line {line_number}", path.display())]
    Encoding { path: PathBuf, line_number: usize },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    ConfigLoad(#[from] config::ConfigError),
    #[error("IO error in {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl SearchError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn invalid_directory(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::InvalidDirectory {
            path: path.into(),
            source,
        }
    }

    pub fn encoding(path: impl Into<PathBuf>, line_number: usize) -> Self {
        Self::Encoding {
            path: path.into(),
            line_number,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Maps an error from opening `path` onto the matching variant.
    pub fn from_open(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::file_not_found(path),
            io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::io(path, err),
        }
    }

    /// The file or directory this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::FileNotFound(path) | Self::PermissionDenied(path) => Some(path),
            Self::InvalidDirectory { path, .. }
            | Self::Encoding { path, .. }
            | Self::Io { path, .. } => Some(path),
            Self::Config(_) | Self::ConfigLoad(_) => None,
        }
    }
}
