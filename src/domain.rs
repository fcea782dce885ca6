use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tempfile::TempDir;

/// Extensions recognized as ROM images. Catalog matching depends on these,
/// so membership is a compatibility surface: extending a platform means
/// appending here, never removing.
pub const ROM_EXTENSIONS: &[&str] = &[
    "nes", "fds", "sfc", "smc", "gb", "gbc", "gba", "nds", "md", "gen", "smd", "32x", "sg", "sms",
    "gg", "n64", "z64", "v64", "bin", "iso", "cue", "pce", "ngp", "ngc", "ws", "wsc", "a26", "a78",
    "lnx", "col", "vb", "min",
];

/// Container formats the archive adapter layer can open.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "7z", "rar"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Rom,
    Archive,
    Ignored,
}

/// Classify a filename by its lowercased final extension. No magic-byte
/// sniffing and no double-extension handling; a name lands in exactly one
/// of the three kinds.
pub fn classify(filename: &str) -> FileKind {
    let Some(ext) = Path::new(filename).extension() else {
        return FileKind::Ignored;
    };
    let ext = ext.to_string_lossy().to_lowercase();
    if ROM_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Rom
    } else if ARCHIVE_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Archive
    } else {
        FileKind::Ignored
    }
}

/// A candidate file found directly on disk by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub filename: String,
    pub absolute_path: PathBuf,
    /// Rooted at the scan directory, forward-slash separated on every
    /// platform so entries compare stably.
    pub relative_path: String,
}

/// A raw table-of-contents entry from an archive. Internal to the adapter
/// layer; never part of a scan's final output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    pub name: String,
    pub is_directory: bool,
}

/// A ROM-classified archive member staged into a scratch directory.
///
/// The scratch directory is shared by every member extracted from the same
/// archive and is removed when the last of them is dropped, so staged files
/// cannot outlive the scan that produced them.
#[derive(Debug)]
pub struct ExtractedRom {
    pub name: String,
    pub staged_path: PathBuf,
    pub source_archive: PathBuf,
    pub scratch: Arc<TempDir>,
}

/// One scanned ROM, hashed or failed. Exactly one of `hash` and `error` is
/// set; construction goes through `hashed`/`failed` so that invariant holds
/// by design. For ROMs found inside an archive, `source_path` points at the
/// archive and `archive_name`/`member_name` carry the provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RomScanResult {
    pub display_name: String,
    pub source_path: PathBuf,
    pub hash: Option<String>,
    pub size: Option<u64>,
    pub error: Option<String>,
    pub archive_name: Option<String>,
    pub member_name: Option<String>,
}

impl RomScanResult {
    pub fn hashed(display_name: String, source_path: PathBuf, hash: String, size: u64) -> Self {
        Self {
            display_name,
            source_path,
            hash: Some(hash),
            size: Some(size),
            error: None,
            archive_name: None,
            member_name: None,
        }
    }

    pub fn failed(display_name: String, source_path: PathBuf, error: String) -> Self {
        Self {
            display_name,
            source_path,
            hash: None,
            size: None,
            error: Some(error),
            archive_name: None,
            member_name: None,
        }
    }

    pub fn from_archive(mut self, archive_name: String, member_name: String) -> Self {
        self.archive_name = Some(archive_name);
        self.member_name = Some(member_name);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.hash.is_some()
    }
}

/// Aggregate handed to output adapters once a scan completes.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanReport {
    pub results: Vec<RomScanResult>,
    pub files_scanned: usize,
    pub archives_scanned: usize,
    pub bytes_hashed: u64,
}

impl ScanReport {
    pub fn new(results: Vec<RomScanResult>, files_scanned: usize, archives_scanned: usize) -> Self {
        let bytes_hashed = results.iter().filter_map(|r| r.size).sum();
        Self {
            results,
            files_scanned,
            archives_scanned,
            bytes_hashed,
        }
    }

    pub fn hashed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    pub fn error_count(&self) -> usize {
        self.results.len() - self.hashed_count()
    }
}

/// A platform candidate supplied by the catalog collaborator. Read-only
/// input to the inference heuristic; the core never fabricates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub name: String,
}

/// Catalog-side metadata for a known digest. The catalog collaborator
/// returns a `HashMap<String, CatalogEntry>` keyed by lowercase hex digest
/// for a given platform id; the core only ever looks up digests it computed
/// itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub achievement_count: u32,
}

pub const DEFAULT_HASH_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub root: PathBuf,
    pub hash_timeout: Duration,
    pub quiet: bool,
    /// Checked between items only; raising it mid-file lets the current
    /// hash finish.
    pub abort: Option<Arc<AtomicBool>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            hash_timeout: DEFAULT_HASH_TIMEOUT,
            quiet: false,
            abort: None,
        }
    }
}

impl ScanConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    pub fn with_hash_timeout(mut self, timeout: Duration) -> Self {
        self.hash_timeout = timeout;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_abort_flag(mut self, abort: Arc<AtomicBool>) -> Self {
        self.abort = Some(abort);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rom_and_archive_tables_are_disjoint() {
        for ext in ROM_EXTENSIONS {
            assert!(
                !ARCHIVE_EXTENSIONS.contains(ext),
                "{ext} appears in both tables"
            );
        }
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(classify("Mario.SFC"), FileKind::Rom);
        assert_eq!(classify("pack.ZIP"), FileKind::Archive);
    }

    #[test]
    fn classify_uses_final_extension_only() {
        assert_eq!(classify("game.sfc.bak"), FileKind::Ignored);
        assert_eq!(classify("weird.name.gba"), FileKind::Rom);
    }

    #[test]
    fn classify_ignores_unknown_and_missing_extensions() {
        assert_eq!(classify("readme.txt"), FileKind::Ignored);
        assert_eq!(classify("Makefile"), FileKind::Ignored);
        assert_eq!(classify(""), FileKind::Ignored);
    }

    #[test]
    fn every_name_lands_in_exactly_one_kind() {
        let names = ["a.sfc", "b.zip", "c.txt", "d.7z", "e.rar", "f.nes", "g"];
        for name in names {
            let kind = classify(name);
            let as_rom = kind == FileKind::Rom;
            let as_archive = kind == FileKind::Archive;
            assert!(!(as_rom && as_archive), "{name} classified twice");
        }
    }

    #[test]
    fn result_constructors_keep_hash_error_exclusive() {
        let ok = RomScanResult::hashed("a.sfc".into(), "/r/a.sfc".into(), "ab".into(), 10);
        assert!(ok.hash.is_some() && ok.error.is_none());

        let bad = RomScanResult::failed("b.sfc".into(), "/r/b.sfc".into(), "boom".into());
        assert!(bad.hash.is_none() && bad.error.is_some());
        assert!(bad.size.is_none());
    }
}
