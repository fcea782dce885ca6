use crate::domain::{classify, FileEntry, FileKind};
use crate::error::ScanError;
use crate::ports::FileSystemPort;
use ignore::WalkBuilder;
use std::path::{Component, Path};
use tracing::debug;

pub struct FileSystemAdapter;

impl FileSystemAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Join path components with forward slashes regardless of host separator.
fn forward_slashed(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}

impl FileSystemPort for FileSystemAdapter {
    fn walk(&self, root: &Path) -> Result<Vec<FileEntry>, ScanError> {
        let meta = std::fs::metadata(root)
            .map_err(|_| ScanError::RootNotFound(root.to_path_buf()))?;
        if !meta.is_dir() {
            return Err(ScanError::RootNotDirectory(root.to_path_buf()));
        }
        let root = root
            .canonicalize()
            .map_err(|_| ScanError::RootNotFound(root.to_path_buf()))?;
        let root = root.as_path();

        // Standard filters off: a ROM folder is scanned verbatim, dotfiles
        // and gitignore rules included.
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .build();

        let mut entries = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("skipping unreadable entry: {err}");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let Some(filename) = path.file_name().map(|n| n.to_string_lossy().to_string())
            else {
                continue;
            };
            if classify(&filename) == FileKind::Ignored {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            entries.push(FileEntry {
                filename,
                absolute_path: path.to_path_buf(),
                relative_path: forward_slashed(relative),
            });
        }

        debug!(count = entries.len(), root = %root.display(), "walk complete");
        Ok(entries)
    }
}
