use crate::adapters::{rar_archive, sevenz_archive, zip_archive};
use crate::domain::{ArchiveMember, ExtractedRom};
use crate::error::ScanError;
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::debug;

/// Container formats with an adapter behind them. Dispatch is a fixed
/// extension-to-variant table; an unknown extension never reaches a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    SevenZ,
    Rar,
}

impl ArchiveFormat {
    pub fn for_path(path: &Path) -> Result<Self, ScanError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "zip" => Ok(ArchiveFormat::Zip),
            "7z" => Ok(ArchiveFormat::SevenZ),
            "rar" => Ok(ArchiveFormat::Rar),
            _ => Err(ScanError::UnsupportedFormat(ext)),
        }
    }

    /// Table of contents, names only. A malformed archive degrades to an
    /// empty listing rather than failing the scan.
    pub fn list(self, path: &Path) -> Vec<ArchiveMember> {
        match self {
            ArchiveFormat::Zip => zip_archive::list(path),
            ArchiveFormat::SevenZ => sevenz_archive::list(path),
            ArchiveFormat::Rar => rar_archive::list(path),
        }
    }

    /// Stage every ROM-classified member into one fresh scratch directory.
    ///
    /// The scratch directory is created lazily on the first match, so an
    /// archive with no ROM members leaves nothing on disk. On any error the
    /// partially filled directory is torn down before the error propagates;
    /// dropping the returned `ExtractedRom`s removes it on the success path.
    pub fn extract_matching(self, path: &Path) -> Result<Vec<ExtractedRom>, ScanError> {
        let roms = match self {
            ArchiveFormat::Zip => zip_archive::extract_matching(path),
            ArchiveFormat::SevenZ => sevenz_archive::extract_matching(path),
            ArchiveFormat::Rar => rar_archive::extract_matching(path),
        }?;
        debug!(
            archive = %path.display(),
            staged = roms.len(),
            "extraction complete"
        );
        Ok(roms)
    }
}

/// Reduce an in-archive member path to its leaf filename. Directory
/// components are discarded; both separator styles occur in the wild.
pub(crate) fn member_leaf_name(member: &str) -> Option<String> {
    let normalized = member.replace('\\', "/");
    let leaf = normalized.rsplit('/').next()?;
    if leaf.is_empty() {
        None
    } else {
        Some(leaf.to_string())
    }
}

/// One scratch directory per archive, never shared or reused.
pub(crate) fn new_scratch(archive: &Path) -> Result<Arc<TempDir>, ScanError> {
    let dir = tempfile::Builder::new()
        .prefix("romscout-")
        .tempdir()
        .map_err(|err| extraction_error(archive, err))?;
    debug!(archive = %archive.display(), scratch = %dir.path().display(), "scratch created");
    Ok(Arc::new(dir))
}

pub(crate) fn extraction_error(path: &Path, err: impl Display) -> ScanError {
    ScanError::Extraction {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_covers_the_archive_table() {
        assert_eq!(
            ArchiveFormat::for_path(Path::new("a.zip")).unwrap(),
            ArchiveFormat::Zip
        );
        assert_eq!(
            ArchiveFormat::for_path(Path::new("b.7Z")).unwrap(),
            ArchiveFormat::SevenZ
        );
        assert_eq!(
            ArchiveFormat::for_path(Path::new("c.rar")).unwrap(),
            ArchiveFormat::Rar
        );
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = ArchiveFormat::for_path(Path::new("d.tar.gz")).unwrap_err();
        assert!(matches!(err, ScanError::UnsupportedFormat(ext) if ext == "gz"));
    }

    #[test]
    fn leaf_name_strips_directory_components() {
        assert_eq!(member_leaf_name("roms/jp/zelda.sfc").unwrap(), "zelda.sfc");
        assert_eq!(member_leaf_name("roms\\zelda.sfc").unwrap(), "zelda.sfc");
        assert_eq!(member_leaf_name("plain.nes").unwrap(), "plain.nes");
        assert_eq!(member_leaf_name("dir/"), None);
    }
}
