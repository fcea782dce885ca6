use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure taxonomy for a scan. Only the two root-validation variants are
/// fatal; everything else degrades a single result entry while the rest of
/// the scan proceeds.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("scan root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("could not stat {}: {source}", .path.display())]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("not a regular file: {}", .0.display())]
    NotRegularFile(PathBuf),

    #[error("read failed on {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("hashing {} exceeded the {}s time limit", .path.display(), .limit.as_secs())]
    HashTimeout { path: PathBuf, limit: Duration },

    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("could not extract {}: {reason}", .path.display())]
    Extraction { path: PathBuf, reason: String },

    #[error("no ROM files found in archive")]
    EmptyArchive,
}

impl ScanError {
    /// Fatal errors abort the whole scan; anything else is recorded on the
    /// individual result and the scan continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::RootNotFound(_) | ScanError::RootNotDirectory(_)
        )
    }
}
