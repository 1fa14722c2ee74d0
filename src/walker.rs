// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! File classification and directory walking

use std::io::Read;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, SphragisError};

/// Extensions treated as images (overlay and swap targets).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Extensions treated as video (invisible tag only).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4"];

/// Bytes inspected by the binary heuristic.
const BINARY_PROBE_LEN: usize = 8000;

/// Coarse kind used to route files to different treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Video,
    Other,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Video => "video",
            FileKind::Other => "file",
        }
    }
}

pub fn classify(path: &Path) -> FileKind {
    if is_image_file(path) {
        FileKind::Image
    } else if is_video_file(path) {
        FileKind::Video
    } else {
        FileKind::Other
    }
}

/// True when the extension is in the allow-list, case-insensitively.
pub fn is_supported(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

pub fn is_image_file(path: &Path) -> bool {
    matches_any(path, IMAGE_EXTENSIONS)
}

pub fn is_video_file(path: &Path) -> bool {
    matches_any(path, VIDEO_EXTENSIONS)
}

/// Every allow-listed file under `dir`, walked recursively in name-sorted
/// order. Unreadable entries are skipped.
pub fn supported_files(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_supported(p, extensions))
        .collect()
}

/// Binary heuristic over the first 8000 bytes: any byte outside 7..=127.
pub fn is_binary_file(path: &Path) -> Result<bool> {
    let file = std::fs::File::open(path)?;
    let mut probe = Vec::with_capacity(BINARY_PROBE_LEN);
    file.take(BINARY_PROBE_LEN as u64).read_to_end(&mut probe)?;
    Ok(probe.iter().any(|&b| !(7..=127).contains(&b)))
}

/// Copy the tree under `source` into `dest`, preserving relative structure.
/// Returns the number of files copied. Any failure is fatal to the copy.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<u64> {
    let mut copied = 0;
    std::fs::create_dir_all(dest)?;
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(walk_error)?;
        let Ok(rel) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Final path component as a displayable string.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn walk_error(e: walkdir::Error) -> SphragisError {
    match e.into_io_error() {
        Some(io) => SphragisError::FileSystem(io),
        None => SphragisError::FileSystem(std::io::Error::other("filesystem loop detected")),
    }
}

fn matches_any(path: &Path, extensions: &[&str]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            extensions.contains(&ext.as_str())
        }
        None => false,
    }
}
