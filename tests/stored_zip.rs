// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! Archive layout, exclusion and integrity checks.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use sphragis::archive;
use zip::CompressionMethod;

fn make_tree(root: &Path) -> PathBuf {
    let folder = root.join("order");
    std::fs::create_dir_all(folder.join("sub")).unwrap();
    std::fs::write(folder.join("x.txt"), b"watermarked photo set").unwrap();
    std::fs::write(folder.join("sub/y.txt"), b"second file").unwrap();
    folder
}

fn entry_names(zip_path: &Path) -> BTreeSet<String> {
    let mut archive = zip::ZipArchive::new(File::open(zip_path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn archive_mirrors_the_tree_with_forward_slashes() {
    let dir = tempfile::tempdir().unwrap();
    let folder = make_tree(dir.path());

    let zip_path = archive::build_stored_zip(&folder, "order-Copies").unwrap();
    assert_eq!(zip_path, folder.join("order-Copies.zip"));

    let expected: BTreeSet<String> = ["x.txt", "sub/", "sub/y.txt"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(entry_names(&zip_path), expected);
}

#[test]
fn entries_are_stored_uncompressed_with_matching_crc() {
    let dir = tempfile::tempdir().unwrap();
    let folder = make_tree(dir.path());
    let content = b"watermarked photo set";

    let zip_path = archive::build_stored_zip(&folder, "order-Copies").unwrap();
    let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
    let entry = archive.by_name("x.txt").unwrap();

    assert_eq!(entry.compression(), CompressionMethod::Stored);
    assert_eq!(entry.size(), content.len() as u64);
    assert_eq!(entry.compressed_size(), entry.size(), "stored means no compression");
    assert_eq!(entry.crc32(), crc32fast::hash(content));
}

#[test]
fn junk_entries_are_pruned_whole() {
    let dir = tempfile::tempdir().unwrap();
    let folder = make_tree(dir.path());
    std::fs::create_dir_all(folder.join("__MACOSX")).unwrap();
    std::fs::write(folder.join("__MACOSX/resource.bin"), b"junk").unwrap();
    std::fs::create_dir_all(folder.join(".hidden")).unwrap();
    std::fs::write(folder.join(".hidden/inner.txt"), b"junk").unwrap();
    std::fs::write(folder.join(".DS_Store"), b"junk").unwrap();
    std::fs::write(folder.join("sub/.DS_Store"), b"junk").unwrap();

    let zip_path = archive::build_stored_zip(&folder, "order-Copies").unwrap();

    let names = entry_names(&zip_path);
    let expected: BTreeSet<String> = ["x.txt", "sub/", "sub/y.txt"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(names, expected, "junk must not reach the archive");
}

#[test]
fn a_stale_archive_of_the_same_name_is_not_swallowed() {
    let dir = tempfile::tempdir().unwrap();
    let folder = make_tree(dir.path());
    std::fs::write(folder.join("order-Copies.zip"), b"stale bytes").unwrap();

    let zip_path = archive::build_stored_zip(&folder, "order-Copies").unwrap();

    let names = entry_names(&zip_path);
    assert!(!names.contains("order-Copies.zip"), "entries: {:?}", names);
    assert!(names.contains("x.txt"));
}

#[test]
fn empty_folder_produces_an_empty_archive() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("order");
    std::fs::create_dir_all(&folder).unwrap();

    let zip_path = archive::build_stored_zip(&folder, "order-Copies").unwrap();
    assert!(entry_names(&zip_path).is_empty());
}
