use crate::adapters::archive::{extraction_error, member_leaf_name, new_scratch};
use crate::domain::{classify, ArchiveMember, ExtractedRom, FileKind};
use crate::error::ScanError;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

pub(crate) fn list(path: &Path) -> Vec<ArchiveMember> {
    let Ok(file) = File::open(path) else {
        return Vec::new();
    };
    let Ok(mut archive) = zip::ZipArchive::new(BufReader::new(file)) else {
        debug!(archive = %path.display(), "malformed zip, listing as empty");
        return Vec::new();
    };

    let mut members = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let Ok(entry) = archive.by_index(index) else {
            continue;
        };
        members.push(ArchiveMember {
            name: entry.name().to_string(),
            is_directory: entry.is_dir(),
        });
    }
    members
}

pub(crate) fn extract_matching(path: &Path) -> Result<Vec<ExtractedRom>, ScanError> {
    let file = File::open(path).map_err(|err| extraction_error(path, err))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|err| extraction_error(path, err))?;

    let mut scratch = None;
    let mut roms = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|err| extraction_error(path, err))?;
        if entry.is_dir() {
            continue;
        }
        let Some(leaf) = member_leaf_name(entry.name()) else {
            continue;
        };
        if classify(&leaf) != FileKind::Rom {
            continue;
        }

        let dir = match &scratch {
            Some(dir) => std::sync::Arc::clone(dir),
            None => {
                let dir = new_scratch(path)?;
                scratch = Some(std::sync::Arc::clone(&dir));
                dir
            }
        };

        // File::create truncates, so colliding leaf names resolve to
        // last-write-wins.
        let staged = dir.path().join(&leaf);
        let mut out = File::create(&staged).map_err(|err| extraction_error(path, err))?;
        std::io::copy(&mut entry, &mut out).map_err(|err| extraction_error(path, err))?;

        roms.push(ExtractedRom {
            name: leaf,
            staged_path: staged,
            source_archive: path.to_path_buf(),
            scratch: dir,
        });
    }
    Ok(roms)
}
