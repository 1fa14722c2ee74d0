// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! End-to-end watermark codec behavior on real files.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use sphragis::codec::{self, MAX_PAYLOAD, MAX_TAIL};
use sphragis::progress::{CancelToken, Reporter};
use sphragis::SphragisError;

/// Deterministic filler covering text and non-text byte values.
fn filler(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn write_file(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn roundtrip_survives_across_payload_lengths() {
    let dir = tempfile::tempdir().unwrap();
    let original = filler(150);

    for payload_len in [1, 5, 12, 40, MAX_PAYLOAD] {
        let payload: String = "p".repeat(payload_len);
        let file = write_file(&dir, &format!("len_{}.bin", payload_len), &original);

        assert!(
            codec::add_watermark(&file, &payload).unwrap(),
            "add failed for payload length {}",
            payload_len
        );
        assert!(codec::has_watermark(&file).unwrap());
        assert_eq!(
            codec::extract_watermark(&file).unwrap().as_deref(),
            Some(payload.as_str()),
            "extraction mismatch for payload length {}",
            payload_len
        );

        assert!(codec::remove_watermark(&file).unwrap());
        assert_eq!(
            std::fs::read(&file).unwrap(),
            original,
            "removal did not restore the original bytes for length {}",
            payload_len
        );
        assert!(!codec::has_watermark(&file).unwrap());
    }
}

#[test]
fn unicode_payload_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(&dir, "unicode.txt", &filler(200));

    let payload = "śņôw shoot № 007";
    assert!(codec::add_watermark(&file, payload).unwrap());
    assert_eq!(
        codec::extract_watermark(&file).unwrap().as_deref(),
        Some(payload)
    );
}

#[test]
fn empty_payload_is_detectable() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(&dir, "empty_payload.bin", &filler(120));

    assert!(codec::add_watermark(&file, "").unwrap());
    assert!(codec::has_watermark(&file).unwrap());
    assert_eq!(codec::extract_watermark(&file).unwrap().as_deref(), Some(""));
}

#[test]
fn second_add_is_a_policy_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let original = filler(150);
    let file = write_file(&dir, "twice.bin", &original);

    assert!(codec::add_watermark(&file, "label 007").unwrap());
    let after_first = std::fs::read(&file).unwrap();

    assert!(
        !codec::add_watermark(&file, "label 008").unwrap(),
        "a tagged file must reject a second tag"
    );
    assert_eq!(
        std::fs::read(&file).unwrap(),
        after_first,
        "the rejected add must not touch the file"
    );

    // exactly one tag: one removal restores the original exactly
    assert!(codec::remove_watermark(&file).unwrap());
    assert_eq!(std::fs::read(&file).unwrap(), original);
    assert!(!codec::has_watermark(&file).unwrap());
}

#[test]
fn short_files_report_untagged_even_with_marker_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let mut content = b"<<==looks like a tag==>>".to_vec();
    content.resize(90, b'x');
    let file = write_file(&dir, "short.bin", &content);

    assert!(!codec::has_watermark(&file).unwrap());
    assert_eq!(codec::extract_watermark(&file).unwrap(), None);
    assert!(!codec::remove_watermark(&file).unwrap());
    assert_eq!(std::fs::read(&file).unwrap(), content, "short files stay untouched");
}

#[test]
fn tag_on_a_tiny_file_is_legal_but_undetected() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(&dir, "tiny.bin", &filler(50));

    // the append succeeds, but 50 + 9 bytes stays below the scan window
    assert!(codec::add_watermark(&file, "x").unwrap());
    assert_eq!(std::fs::metadata(&file).unwrap().len(), 59);
    assert!(!codec::has_watermark(&file).unwrap());
}

#[test]
fn window_boundary_is_inclusive() {
    let dir = tempfile::tempdir().unwrap();

    // 92 bytes + an empty-payload tag lands exactly on the window size
    let file = write_file(&dir, "boundary.bin", &filler(MAX_TAIL - 8));
    assert!(codec::add_watermark(&file, "").unwrap());
    assert_eq!(std::fs::metadata(&file).unwrap().len(), MAX_TAIL as u64);
    assert!(codec::has_watermark(&file).unwrap());
}

#[test]
fn payload_containing_start_marker_still_detects() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(&dir, "marker_payload.bin", &filler(150));

    assert!(codec::add_watermark(&file, "a<<==b").unwrap());
    assert!(codec::has_watermark(&file).unwrap());
    // the last-occurrence rule surrenders the prefix before the inner marker
    assert_eq!(codec::extract_watermark(&file).unwrap().as_deref(), Some("b"));
    assert!(codec::remove_watermark(&file).unwrap());
}

#[test]
fn strip_walks_the_allow_list_with_progress() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    let extensions: Vec<String> = ["txt", "jpg", "mp4"].iter().map(|s| s.to_string()).collect();

    let a = write_file(&dir, "a.txt", &filler(120));
    let b = write_file(&dir, "sub/b.jpg", &filler(130));
    let c = write_file(&dir, "c.mp4", &filler(140));
    let ignored = write_file(&dir, "d.pdf", &filler(120));

    for file in [&a, &b, &c, &ignored] {
        codec::add_watermark(file, "label 007").unwrap();
    }

    let fractions: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fractions);
    let reporter = Reporter::silent().with_progress(move |f| sink.lock().unwrap().push(f));

    let summary = codec::strip_watermarks(dir.path(), &extensions, &reporter).unwrap();
    assert_eq!(summary.removed, 3);
    assert_eq!(summary.untagged, 0);
    assert_eq!(summary.failed, 0);

    let fractions = fractions.lock().unwrap();
    assert_eq!(fractions.len(), 3, "one progress tick per visited file");
    assert!(fractions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(*fractions.last().unwrap(), 1.0);

    // the pdf was outside the allow-list and keeps its tag
    assert!(codec::has_watermark(&ignored).unwrap());

    let second = codec::strip_watermarks(dir.path(), &extensions, &Reporter::silent()).unwrap();
    assert_eq!(second.removed, 0);
    assert_eq!(second.untagged, 3);
}

#[test]
fn strip_honours_cancellation() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir, "a.txt", &filler(120));

    let token = CancelToken::new();
    token.cancel();
    let reporter = Reporter::silent().with_cancel(token);
    let extensions = vec!["txt".to_string()];

    match codec::strip_watermarks(dir.path(), &extensions, &reporter) {
        Err(SphragisError::Cancelled) => {}
        other => panic!("expected cancellation, got {:?}", other.map(|s| s.removed)),
    }
}
