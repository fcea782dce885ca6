use crate::adapters::ArchiveFormat;
use crate::domain::{classify, FileEntry, FileKind, RomScanResult, ScanConfig, ScanReport};
use crate::error::ScanError;
use crate::ports::{FileSystemPort, HashProgress, HashingPort};
use std::path::Path;
use std::sync::atomic::Ordering;
use tracing::{debug, info, warn};

/// Orchestrates one scan: walk, hash the loose ROMs, then work through the
/// archives one at a time. Strictly sequential; every per-item failure is
/// folded into the report and only a bad root aborts the whole run.
pub struct RomScanService<F, H, P> {
    filesystem: F,
    hasher: H,
    progress: P,
}

impl<F, H, P> RomScanService<F, H, P>
where
    F: FileSystemPort,
    H: HashingPort,
    P: HashProgress,
{
    pub fn new(filesystem: F, hasher: H, progress: P) -> Self {
        Self {
            filesystem,
            hasher,
            progress,
        }
    }

    pub fn scan(&self, config: &ScanConfig) -> Result<ScanReport, ScanError> {
        let entries = self.filesystem.walk(&config.root)?;

        let (roms, archives): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|entry| classify(&entry.filename) == FileKind::Rom);
        info!(
            roms = roms.len(),
            archives = archives.len(),
            root = %config.root.display(),
            "discovery complete"
        );

        let mut results = Vec::new();
        let files_scanned = roms.len();
        let archives_scanned = archives.len();

        for entry in &roms {
            if self.aborted(config) {
                warn!("scan aborted between items");
                return Ok(ScanReport::new(results, files_scanned, archives_scanned));
            }
            results.push(self.process_rom(entry, config));
        }

        for entry in &archives {
            if self.aborted(config) {
                warn!("scan aborted between items");
                break;
            }
            self.process_archive(entry, config, &mut results);
        }

        Ok(ScanReport::new(results, files_scanned, archives_scanned))
    }

    fn aborted(&self, config: &ScanConfig) -> bool {
        config
            .abort
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn process_rom(&self, entry: &FileEntry, config: &ScanConfig) -> RomScanResult {
        match self.hash_path(&entry.absolute_path, config) {
            Ok((digest, size)) => RomScanResult::hashed(
                entry.relative_path.clone(),
                entry.absolute_path.clone(),
                digest,
                size,
            ),
            Err(err) => {
                debug!(file = %entry.relative_path, %err, "rom failed");
                RomScanResult::failed(
                    entry.relative_path.clone(),
                    entry.absolute_path.clone(),
                    err.to_string(),
                )
            }
        }
    }

    /// One result per staged member, or a single error result when the
    /// archive cannot be processed or holds no ROMs. Scratch space lives in
    /// the `ExtractedRom`s and is gone once this returns.
    fn process_archive(
        &self,
        entry: &FileEntry,
        config: &ScanConfig,
        results: &mut Vec<RomScanResult>,
    ) {
        let extracted = ArchiveFormat::for_path(&entry.absolute_path)
            .and_then(|format| format.extract_matching(&entry.absolute_path));

        let extracted = match extracted {
            Ok(extracted) => extracted,
            Err(err) => {
                debug!(archive = %entry.relative_path, %err, "archive failed");
                results.push(RomScanResult::failed(
                    entry.relative_path.clone(),
                    entry.absolute_path.clone(),
                    err.to_string(),
                ));
                return;
            }
        };

        if extracted.is_empty() {
            results.push(RomScanResult::failed(
                entry.relative_path.clone(),
                entry.absolute_path.clone(),
                ScanError::EmptyArchive.to_string(),
            ));
            return;
        }

        for rom in &extracted {
            let display = format!("{}/{}", entry.relative_path, rom.name);
            let result = match self.hash_path(&rom.staged_path, config) {
                Ok((digest, size)) => RomScanResult::hashed(
                    display,
                    entry.absolute_path.clone(),
                    digest,
                    size,
                ),
                Err(err) => RomScanResult::failed(display, entry.absolute_path.clone(), err.to_string()),
            };
            results.push(result.from_archive(entry.filename.clone(), rom.name.clone()));
        }
        // `extracted` drops here and takes the scratch directory with it.
    }

    fn hash_path(&self, path: &Path, config: &ScanConfig) -> Result<(String, u64), ScanError> {
        let meta = std::fs::metadata(path).map_err(|source| ScanError::Stat {
            path: path.to_path_buf(),
            source,
        })?;
        if !meta.is_file() {
            return Err(ScanError::NotRegularFile(path.to_path_buf()));
        }
        let hashed = self
            .hasher
            .hash_file(path, config.hash_timeout, &self.progress)?;
        Ok((hashed.digest, hashed.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FileSystemAdapter, Md5Hasher};
    use crate::ports::SilentProgress;
    use std::fs;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn service() -> RomScanService<FileSystemAdapter, Md5Hasher, SilentProgress> {
        RomScanService::new(FileSystemAdapter::new(), Md5Hasher::new(), SilentProgress)
    }

    #[test]
    fn bad_root_is_fatal() {
        let err = service()
            .scan(&ScanConfig::new("/no/such/root".into()))
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn loose_roms_are_hashed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("mario.sfc"), b"X".repeat(1000)).unwrap();

        let report = service()
            .scan(&ScanConfig::new(dir.path().to_path_buf()))
            .unwrap();
        assert_eq!(report.results.len(), 1);
        let result = &report.results[0];
        assert_eq!(result.display_name, "mario.sfc");
        assert_eq!(result.size, Some(1000));
        assert_eq!(result.hash.as_deref().map(str::len), Some(32));
        assert!(result.archive_name.is_none());
    }

    #[test]
    fn abort_flag_stops_between_items() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.sfc"), b"one").unwrap();
        fs::write(dir.path().join("b.sfc"), b"two").unwrap();

        let flag = Arc::new(AtomicBool::new(true));
        let config = ScanConfig::new(dir.path().to_path_buf()).with_abort_flag(flag);
        let report = service().scan(&config).unwrap();
        assert!(report.results.is_empty());
    }

    #[test]
    fn every_result_has_hash_xor_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.gba"), b"fine").unwrap();
        fs::write(dir.path().join("empty.zip"), b"not a zip").unwrap();

        let report = service()
            .scan(&ScanConfig::new(dir.path().to_path_buf()))
            .unwrap();
        assert_eq!(report.results.len(), 2);
        for result in &report.results {
            assert_ne!(result.hash.is_some(), result.error.is_some());
        }
    }
}
