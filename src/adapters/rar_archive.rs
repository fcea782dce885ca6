use crate::adapters::archive::{extraction_error, member_leaf_name, new_scratch};
use crate::domain::{classify, ArchiveMember, ExtractedRom, FileKind};
use crate::error::ScanError;
use std::path::Path;
use tracing::debug;

pub(crate) fn list(path: &Path) -> Vec<ArchiveMember> {
    let Ok(archive) = unrar::Archive::new(path).open_for_listing() else {
        debug!(archive = %path.display(), "malformed rar, listing as empty");
        return Vec::new();
    };

    let mut members = Vec::new();
    for entry in archive {
        let Ok(header) = entry else {
            continue;
        };
        members.push(ArchiveMember {
            name: header.filename.to_string_lossy().replace('\\', "/"),
            is_directory: header.is_directory(),
        });
    }
    members
}

pub(crate) fn extract_matching(path: &Path) -> Result<Vec<ExtractedRom>, ScanError> {
    let mut archive = unrar::Archive::new(path)
        .open_for_processing()
        .map_err(|err| extraction_error(path, err))?;

    let mut scratch = None;
    let mut roms = Vec::new();
    while let Some(cursor) = archive
        .read_header()
        .map_err(|err| extraction_error(path, err))?
    {
        let entry = cursor.entry();
        let leaf = member_leaf_name(&entry.filename.to_string_lossy())
            .filter(|leaf| entry.is_file() && classify(leaf) == FileKind::Rom);

        archive = match leaf {
            Some(leaf) => {
                let dir = match &scratch {
                    Some(dir) => std::sync::Arc::clone(dir),
                    None => {
                        let dir = new_scratch(path)?;
                        scratch = Some(std::sync::Arc::clone(&dir));
                        dir
                    }
                };
                let staged = dir.path().join(&leaf);
                let next = cursor
                    .extract_to(&staged)
                    .map_err(|err| extraction_error(path, err))?;
                roms.push(ExtractedRom {
                    name: leaf,
                    staged_path: staged,
                    source_archive: path.to_path_buf(),
                    scratch: dir,
                });
                next
            }
            None => cursor.skip().map_err(|err| extraction_error(path, err))?,
        };
    }
    Ok(roms)
}
