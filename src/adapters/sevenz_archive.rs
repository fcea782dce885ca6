use crate::adapters::archive::{extraction_error, member_leaf_name, new_scratch};
use crate::domain::{classify, ArchiveMember, ExtractedRom, FileKind};
use crate::error::ScanError;
use std::path::Path;
use tracing::debug;

pub(crate) fn list(path: &Path) -> Vec<ArchiveMember> {
    let Ok(archive) = sevenz_rust2::Archive::open(path) else {
        debug!(archive = %path.display(), "malformed 7z, listing as empty");
        return Vec::new();
    };
    archive
        .files
        .iter()
        .map(|entry| ArchiveMember {
            name: entry.name().to_string(),
            is_directory: entry.is_directory(),
        })
        .collect()
}

pub(crate) fn extract_matching(path: &Path) -> Result<Vec<ExtractedRom>, ScanError> {
    let archive = sevenz_rust2::Archive::open(path).map_err(|err| extraction_error(path, err))?;

    // Names first, then one reader for the member payloads.
    let wanted: Vec<String> = archive
        .files
        .iter()
        .filter(|entry| !entry.is_directory() && entry.has_stream())
        .map(|entry| entry.name().to_string())
        .filter(|name| {
            member_leaf_name(name).is_some_and(|leaf| classify(&leaf) == FileKind::Rom)
        })
        .collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = sevenz_rust2::SevenZReader::open(path, sevenz_rust2::Password::empty())
        .map_err(|err| extraction_error(path, err))?;

    let scratch = new_scratch(path)?;
    let mut roms = Vec::with_capacity(wanted.len());
    for name in wanted {
        let bytes = reader
            .read_file(&name)
            .map_err(|err| extraction_error(path, err))?;
        // Leaf membership was checked above.
        let leaf = member_leaf_name(&name).unwrap_or(name);
        let staged = scratch.path().join(&leaf);
        std::fs::write(&staged, bytes).map_err(|err| extraction_error(path, err))?;
        roms.push(ExtractedRom {
            name: leaf,
            staged_path: staged,
            source_archive: path.to_path_buf(),
            scratch: std::sync::Arc::clone(&scratch),
        });
    }
    Ok(roms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_7z(dir: &Path, members: &[(&str, &[u8])]) -> std::path::PathBuf {
        let staging = dir.join("staging");
        fs::create_dir_all(&staging).unwrap();
        for (name, data) in members {
            let dest = staging.join(name);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(dest, data).unwrap();
        }
        let archive = dir.join("pack.7z");
        sevenz_rust2::compress_to_path(&staging, &archive).unwrap();
        archive
    }

    #[test]
    fn round_trip_stages_rom_members_only() {
        let dir = tempfile::tempdir().unwrap();
        let archive = write_7z(dir.path(), &[("zelda.sfc", b"YY"), ("readme.txt", b"hi")]);

        let members = list(&archive);
        assert!(members.iter().any(|m| m.name.ends_with("zelda.sfc")));

        let roms = extract_matching(&archive).unwrap();
        assert_eq!(roms.len(), 1);
        assert_eq!(roms[0].name, "zelda.sfc");
        assert_eq!(fs::read(&roms[0].staged_path).unwrap(), b"YY");

        let scratch = roms[0].scratch.path().to_path_buf();
        drop(roms);
        assert!(!scratch.exists());
    }

    #[test]
    fn corrupt_archive_lists_empty_but_fails_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.7z");
        fs::write(&archive, b"not a sevenz header").unwrap();

        assert!(list(&archive).is_empty());
        let err = extract_matching(&archive).unwrap_err();
        assert!(matches!(err, ScanError::Extraction { .. }));
    }

    #[test]
    fn archive_without_roms_creates_no_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let archive = write_7z(dir.path(), &[("readme.txt", b"hi")]);
        assert!(extract_matching(&archive).unwrap().is_empty());
    }
}
