// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! Tail-tag watermark codec
//!
//! A watermark is a byte suffix `<<==` + UTF-8 payload + `==>>` appended at
//! end of file. Detection never reads more than the last [`MAX_TAIL`] bytes,
//! so the whole tag has to fit inside that window.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Result, SphragisError};
use crate::progress::Reporter;
use crate::walker::{self, file_name};

/// Opening marker of a watermark tag.
pub const START_MARK: &[u8] = b"<<==";

/// Closing marker of a watermark tag.
pub const END_MARK: &[u8] = b"==>>";

/// Size of the end-of-file window scanned for tags. Files smaller than this
/// are reported untagged so that tiny files never false-positive.
pub const MAX_TAIL: usize = 100;

/// Longest payload whose tag still fits the scan window.
pub const MAX_PAYLOAD: usize = MAX_TAIL - START_MARK.len() - END_MARK.len();

/// Byte offsets of a tag located inside a tail window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpan {
    /// Offset of the start marker within the window.
    pub start: usize,
    /// First payload byte.
    pub payload_start: usize,
    /// One past the last payload byte.
    pub payload_end: usize,
}

/// Scan a tail window for a tag: the LAST occurrence of the start marker,
/// then the first end marker after it. The last-occurrence rule keeps
/// payloads that happen to contain marker bytes detectable.
pub fn locate_tag(window: &[u8]) -> Option<TagSpan> {
    let start = find_last(window, START_MARK)?;
    let payload_start = start + START_MARK.len();
    let payload_end = find_from(window, END_MARK, payload_start)?;
    Some(TagSpan {
        start,
        payload_start,
        payload_end,
    })
}

/// True when the tail window of `path` carries a complete tag.
pub fn has_watermark(path: &Path) -> Result<bool> {
    let mut file = File::open(path)?;
    match tail_window(&mut file)? {
        Some((_, window)) => Ok(locate_tag(&window).is_some()),
        None => Ok(false),
    }
}

/// Payload of the tag in `path`'s tail window, or None when untagged.
pub fn extract_watermark(path: &Path) -> Result<Option<String>> {
    let mut file = File::open(path)?;
    let window = match tail_window(&mut file)? {
        Some((_, window)) => window,
        None => return Ok(None),
    };
    Ok(locate_tag(&window)
        .map(|span| String::from_utf8_lossy(&window[span.payload_start..span.payload_end]).into_owned()))
}

/// Append a tag carrying `payload` to `path`. Returns false without
/// touching the file when it already carries a tag. Payloads whose tag
/// would overflow the scan window are rejected.
pub fn add_watermark(path: &Path, payload: &str) -> Result<bool> {
    let tag_len = START_MARK.len() + payload.len() + END_MARK.len();
    if tag_len > MAX_TAIL {
        return Err(SphragisError::Watermark(format!(
            "payload of {} bytes makes a {} byte tag; the scan window is {} bytes",
            payload.len(),
            tag_len,
            MAX_TAIL
        )));
    }

    if has_watermark(path)? {
        tracing::info!("{} already has a watermark", path.display());
        return Ok(false);
    }

    let old_len = std::fs::metadata(path)?.len();

    let mut tag = Vec::with_capacity(tag_len);
    tag.extend_from_slice(START_MARK);
    tag.extend_from_slice(payload.as_bytes());
    tag.extend_from_slice(END_MARK);

    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(&tag)?;

    if old_len + (tag_len as u64) < MAX_TAIL as u64 {
        tracing::warn!(
            "{} is smaller than the scan window even after tagging; the tag will not be detected",
            path.display()
        );
    }
    Ok(true)
}

/// Truncate `path` at the tag's start marker. Returns false when no tag was
/// found (the file is left untouched).
pub fn remove_watermark(path: &Path) -> Result<bool> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let (file_len, window) = match tail_window(&mut file)? {
        Some(tail) => tail,
        None => return Ok(false),
    };
    match locate_tag(&window) {
        Some(span) => {
            let cut = file_len - (window.len() - span.start) as u64;
            file.set_len(cut)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Counts from a directory-wide watermark strip.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripSummary {
    pub removed: usize,
    pub untagged: usize,
    pub failed: usize,
}

/// Remove the tag from every allow-listed file under `dir`, reporting
/// per-file progress. Per-file failures are counted and logged, never fatal.
pub fn strip_watermarks(dir: &Path, extensions: &[String], reporter: &Reporter) -> Result<StripSummary> {
    let files = walker::supported_files(dir, extensions);
    let total = files.len();
    let mut summary = StripSummary::default();

    for (index, file) in files.iter().enumerate() {
        reporter.check_cancelled()?;
        match remove_watermark(file) {
            Ok(true) => {
                summary.removed += 1;
                reporter.log(&format!("Removed watermark: {}", file_name(file)));
            }
            Ok(false) => {
                summary.untagged += 1;
                tracing::debug!("no watermark in {}", file.display());
            }
            Err(e) => {
                summary.failed += 1;
                reporter.log(&format!("Failed to remove watermark from {}: {}", file_name(file), e));
            }
        }
        reporter.progress((index + 1) as f32 / total as f32);
    }
    Ok(summary)
}

/// Read the last `min(MAX_TAIL, len)` bytes. None when the file is smaller
/// than the scan window (such files are untagged by policy).
fn tail_window(file: &mut File) -> std::io::Result<Option<(u64, Vec<u8>)>> {
    let len = file.metadata()?.len();
    if len < MAX_TAIL as u64 {
        return Ok(None);
    }
    let read_len = MAX_TAIL.min(len as usize);
    file.seek(SeekFrom::End(-(read_len as i64)))?;
    let mut window = vec![0u8; read_len];
    file.read_exact(&mut window)?;
    Ok(Some((len, window)))
}

fn find_last(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}
