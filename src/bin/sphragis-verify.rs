// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! Sphragis Verify Utility
//!
//! Walks a delivery and reports each file's kind and watermark payload.

use clap::Parser;
use std::path::PathBuf;

use sphragis::codec;
use sphragis::config::ScanConfig;
use sphragis::walker::{self, FileKind};

#[derive(Parser, Debug)]
#[command(name = "sphragis-verify")]
#[command(version = "1.0.0")]
#[command(about = "Inspect watermark tags in a delivery")]
struct Args {
    /// File or directory to inspect
    path: PathBuf,

    /// Only list files that carry a watermark
    #[arg(short, long)]
    tagged_only: bool,

    /// Extensions to inspect (defaults to the standard allow-list)
    #[arg(short, long)]
    extensions: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if !args.path.exists() {
        eprintln!("Path not found: {:?}", args.path);
        std::process::exit(1);
    }

    let extensions = if args.extensions.is_empty() {
        ScanConfig::default().extensions
    } else {
        args.extensions.clone()
    };

    let files: Vec<PathBuf> = if args.path.is_dir() {
        walker::supported_files(&args.path, &extensions)
    } else {
        vec![args.path.clone()]
    };

    if files.is_empty() {
        println!("No supported files under {:?}", args.path);
        return Ok(());
    }

    println!("Inspecting {} file(s)...", files.len());

    let mut tagged = 0;
    let mut untagged = 0;
    let mut failed = 0;

    for file in &files {
        let kind = match walker::classify(file) {
            FileKind::Image => "image",
            FileKind::Video => "video",
            FileKind::Other => match walker::is_binary_file(file) {
                Ok(true) => "binary",
                Ok(false) => "text",
                Err(_) => "file",
            },
        };

        match codec::extract_watermark(file) {
            Ok(Some(payload)) => {
                tagged += 1;
                println!("  {} [{}]: \"{}\"", file.display(), kind, payload);
            }
            Ok(None) => {
                untagged += 1;
                if !args.tagged_only {
                    println!("  {} [{}]: no watermark", file.display(), kind);
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("  Skip: {} ({})", file.display(), e);
            }
        }
    }

    println!();
    println!(
        "Done. {} tagged, {} untagged, {} unreadable.",
        tagged, untagged, failed
    );

    Ok(())
}
