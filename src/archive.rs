// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! Uncompressed ZIP packaging of copy directories
//!
//! Entries use the STORED method so the archive is a pure container.
//! Hidden and platform junk entries are pruned, and the archive being
//! written is never captured by its own walk.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// Entry names kept out of archives: macOS resource forks, dotfiles and
/// Finder metadata.
pub fn is_excluded(name: &str) -> bool {
    name.starts_with("__MACOSX") || name.starts_with('.') || name.ends_with(".DS_Store")
}

/// Pack everything under `folder` into `<folder>/<archive_name>.zip` with
/// STORED entries and forward-slash relative paths. Directories become
/// zero-length entries with a trailing slash. Returns the archive path.
pub fn build_stored_zip(folder: &Path, archive_name: &str) -> Result<PathBuf> {
    let zip_path = folder.join(format!("{}.zip", archive_name));

    // Collect before creating the archive so neither the fresh file nor a
    // stale one of the same name becomes an entry.
    let mut entries: Vec<(PathBuf, String, bool)> = Vec::new();
    let walk = WalkDir::new(folder)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(&e.file_name().to_string_lossy()));
    for entry in walk {
        let entry = entry.map_err(crate::walker::walk_error)?;
        if entry.depth() == 0 || entry.path() == zip_path {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(folder) else {
            continue;
        };
        entries.push((
            entry.path().to_path_buf(),
            zip_entry_name(rel),
            entry.file_type().is_dir(),
        ));
    }

    let file = File::create(&zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (path, name, is_dir) in entries {
        if is_dir {
            zip.add_directory(name, options)?;
        } else {
            let data = std::fs::read(&path)?;
            zip.start_file(name, options)?;
            zip.write_all(&data)?;
        }
    }
    zip.finish()?;

    tracing::debug!("stored archive written: {}", zip_path.display());
    Ok(zip_path)
}

/// ZIP entry names always use forward slashes, whatever the host separator.
fn zip_entry_name(rel: &Path) -> String {
    rel.iter()
        .map(|c| c.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn junk_names_are_excluded() {
        assert!(is_excluded("__MACOSX"));
        assert!(is_excluded("__MACOSX_res"));
        assert!(is_excluded(".DS_Store"));
        assert!(is_excluded("backup.DS_Store"));
        assert!(is_excluded(".hidden"));
        assert!(!is_excluded("photo_001.jpg"));
        assert!(!is_excluded("MACOSX"));
    }

    #[test]
    fn entry_names_use_forward_slashes() {
        let rel: PathBuf = ["sub", "deeper", "y.txt"].iter().collect();
        assert_eq!(zip_entry_name(&rel), "sub/deeper/y.txt");
        assert_eq!(zip_entry_name(Path::new("x.txt")), "x.txt");
    }
}
