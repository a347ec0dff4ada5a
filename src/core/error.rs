// Error Types
// Failure kinds surfaced by probing, extraction and copying

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No file was supplied")]
    NoFileSupplied,

    #[error("Unsupported archive format: {0} (expected {1})")]
    UnsupportedArchiveFormat(String, String),

    #[error("Corrupt archive {path}: {reason}")]
    CorruptArchive { path: PathBuf, reason: String },

    #[error("Remote store unavailable at {path}: {reason}")]
    RemoteUnavailable { path: PathBuf, reason: String },

    #[error("Remote store is empty: no executable copy and no archive under {0}")]
    RemoteStoreEmpty(PathBuf),

    #[error("Permission denied: {0}")]
    FilesystemPermission(PathBuf),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    /// Classify an I/O failure at the given path
    pub fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::FilesystemPermission(path.to_path_buf())
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Short machine-friendly kind name used in status lines
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoFileSupplied => "NoFileSupplied",
            Self::UnsupportedArchiveFormat(..) => "UnsupportedArchiveFormat",
            Self::CorruptArchive { .. } => "CorruptArchive",
            Self::RemoteUnavailable { .. } => "RemoteUnavailable",
            Self::RemoteStoreEmpty(_) => "RemoteStoreEmpty",
            Self::FilesystemPermission(_) => "FilesystemPermission",
            Self::Io { .. } => "Io",
        }
    }
}

/// Extension for attaching a path to raw I/O results
pub trait IoResultExt<T> {
    fn at(self, path: &Path) -> Result<T, SyncError>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T, SyncError> {
        self.map_err(|e| SyncError::io(path, e))
    }
}
