use crate::domain::{FileEntry, ScanReport};
use crate::error::ScanError;
use anyhow::Result;
use std::path::Path;
use std::time::Duration;

/// Digest plus the byte count that went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedFile {
    pub digest: String,
    pub size: u64,
}

pub trait FileSystemPort {
    /// Enumerate ROM and archive candidates under `root`. Fails only when
    /// the root itself is invalid; unreadable entries inside the tree are
    /// skipped, not reported.
    fn walk(&self, root: &Path) -> Result<Vec<FileEntry>, ScanError>;
}

pub trait HashingPort {
    fn hash_file(
        &self,
        path: &Path,
        timeout: Duration,
        progress: &dyn HashProgress,
    ) -> Result<HashedFile, ScanError>;
}

/// Observer for the hashing read loop. Calls arrive inline and throttled;
/// percent is non-decreasing and the final call for a file is always 100.
pub trait HashProgress {
    fn on_file_start(&self, name: &str, total_bytes: u64);
    fn on_progress(&self, percent: u8, bytes_read: u64, total_bytes: u64);
    fn on_file_done(&self);
}

/// No-op observer for callers that do not track progress.
pub struct SilentProgress;

impl HashProgress for SilentProgress {
    fn on_file_start(&self, _name: &str, _total_bytes: u64) {}
    fn on_progress(&self, _percent: u8, _bytes_read: u64, _total_bytes: u64) {}
    fn on_file_done(&self) {}
}

pub trait OutputPort {
    fn write_report(&self, report: &ScanReport) -> Result<()>;
}
