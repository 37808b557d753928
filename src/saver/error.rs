use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("metadata unreadable at {path}: {reason}")]
    MetadataUnreadable { path: PathBuf, reason: String },

    #[error("bundled screensaver not found: {0}")]
    SourceMissing(PathBuf),

    #[error("bundled screensaver is not a bundle directory: {0}")]
    NotABundle(PathBuf),

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("copy failed at {path}: {source}")]
    CopyFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported file type in bundle: {0}")]
    UnsupportedFileType(PathBuf),
}

impl InstallError {
    pub fn metadata(path: &Path, reason: impl ToString) -> Self {
        Self::MetadataUnreadable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Classify an I/O failure that happened while touching `path`.
    pub fn io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::CopyFailed {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, InstallError>;
