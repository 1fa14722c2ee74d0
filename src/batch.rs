// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! Batch orchestrator: numbered copies, tagging, overlay, swap, archive
//!
//! A job runs as sequential blocking I/O: one pass creating and processing
//! each numbered copy, then a second pass packing copies into archives.
//! Per-file problems are counted and logged; directory copy and archive
//! failures abort the job.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive;
use crate::codec;
use crate::config::{AppConfig, CopyLayout};
use crate::error::{Result, SphragisError};
use crate::numbering::{order_number, strip_trailing_number, trailing_number};
use crate::overlay::{self, OverlayRenderer};
use crate::progress::{Reporter, StepTracker};
use crate::swap;
use crate::walker::{self, file_name};

/// Suffix of the directory collecting all numbered copies.
pub const COPIES_SUFFIX: &str = "-Copies";

/// Description of one batch run.
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Directory whose tree is copied and processed.
    pub source: PathBuf,
    /// How many numbered copies to make.
    pub copies: u32,
    /// Watermark base text; a trailing digit run seeds the order numbers.
    pub base_text: String,
    /// Paint the visible overlay onto one image per copy.
    pub overlay: bool,
    /// Swap numbered image pairs in each copy.
    pub swap: bool,
    /// Pack each copy into a stored archive that replaces its contents.
    pub zip: bool,
    /// Overlay text override; defaults to the copy's order number.
    pub overlay_text: Option<String>,
    /// Target photo number override; defaults to the copy's order number.
    pub photo_number: Option<u32>,
}

impl BatchJob {
    pub fn new(source: impl Into<PathBuf>, copies: u32, base_text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            copies,
            base_text: base_text.into(),
            overlay: false,
            swap: false,
            zip: false,
            overlay_text: None,
            photo_number: None,
        }
    }

    /// First order number: the base text's trailing digit run, default 1.
    pub fn start_number(&self) -> u32 {
        trailing_number(&self.base_text).unwrap_or(1)
    }

    /// Base text without its trailing digit run.
    pub fn label(&self) -> &str {
        strip_trailing_number(&self.base_text)
    }

    /// Watermark payload for one copy.
    pub fn payload_for(&self, order: &str) -> String {
        let label = self.label();
        if label.is_empty() {
            order.to_string()
        } else {
            format!("{} {}", label, order)
        }
    }

    /// Progress denominator: every copy takes a copy step and a tag step,
    /// plus one step per enabled toggle. Wide so the product cannot wrap.
    pub fn total_steps(&self) -> u64 {
        let per_copy = 2 + self.overlay as u64 + self.swap as u64 + self.zip as u64;
        u64::from(self.copies) * per_copy
    }

    fn validate(&self) -> Result<()> {
        if self.copies == 0 {
            return Err(SphragisError::InvalidJob(
                "a batch needs at least one copy".to_string(),
            ));
        }
        if !self.source.is_dir() {
            return Err(SphragisError::InvalidJob(format!(
                "source must be an existing directory: {}",
                self.source.display()
            )));
        }
        if self.source.file_name().is_none() || self.source.parent().is_none() {
            return Err(SphragisError::InvalidJob(
                "source directory needs a name and a parent".to_string(),
            ));
        }
        let last = self
            .start_number()
            .checked_add(self.copies - 1)
            .ok_or_else(|| {
                SphragisError::InvalidJob("order numbers overflow".to_string())
            })?;
        let widest = self.payload_for(&order_number(last));
        if widest.len() > codec::MAX_PAYLOAD {
            return Err(SphragisError::InvalidJob(format!(
                "base text too long: payload \"{}\" is {} bytes, limit {}",
                widest,
                widest.len(),
                codec::MAX_PAYLOAD
            )));
        }
        Ok(())
    }
}

/// Per-kind counts from one batch run.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchSummary {
    pub copies: u32,
    pub files_tagged: usize,
    pub already_tagged: usize,
    pub tag_failures: usize,
    pub overlays_applied: usize,
    pub overlays_missed: usize,
    pub overlay_failures: usize,
    pub pairs_swapped: usize,
    pub swaps_skipped: usize,
    pub swap_failures: usize,
    pub archives_written: usize,
}

/// Run a job to completion on the current thread. Progress and console
/// lines flow through `reporter`; cancellation is polled between stages.
pub fn run(
    job: &BatchJob,
    config: &AppConfig,
    renderer: &dyn OverlayRenderer,
    reporter: &Reporter,
) -> Result<BatchSummary> {
    job.validate()?;

    let source_name = file_name(&job.source);
    let parent = job
        .source
        .parent()
        .ok_or_else(|| SphragisError::InvalidJob("source directory needs a parent".to_string()))?;
    let copies_root = parent.join(format!("{}{}", source_name, COPIES_SUFFIX));
    std::fs::create_dir_all(&copies_root)?;

    let start = job.start_number();
    let mut tracker = StepTracker::new(job.total_steps(), reporter);
    let mut summary = BatchSummary::default();
    let mut order_dirs: Vec<PathBuf> = Vec::new();

    tracing::info!(
        "batch start: {} copies of {} from order {}",
        job.copies,
        job.source.display(),
        order_number(start)
    );

    for i in 0..job.copies {
        reporter.check_cancelled()?;
        let order = start + i;
        let order_str = order_number(order);
        let order_dir = copies_root.join(&order_str);
        let copy_root = match config.batch.layout {
            CopyLayout::Nested => order_dir.join(&source_name),
            CopyLayout::Flat => order_dir.clone(),
        };

        walker::copy_tree(&job.source, &copy_root)?;
        reporter.log(&format!("Directory copied: {}", order_dir.display()));
        tracker.step();

        reporter.check_cancelled()?;
        let payload = job.payload_for(&order_str);
        tag_supported_files(&copy_root, &payload, config, reporter, &mut summary);
        tracker.step();

        if job.overlay {
            reporter.check_cancelled()?;
            let photo = job.photo_number.unwrap_or(order);
            let text = job.overlay_text.clone().unwrap_or_else(|| order_str.clone());
            // a renderer failure spoils one copy's overlay, not the batch
            match overlay::overlay_numbered_photo(
                &copy_root,
                &text,
                photo,
                config.overlay.position,
                renderer,
                reporter,
            ) {
                Ok(true) => summary.overlays_applied += 1,
                Ok(false) => summary.overlays_missed += 1,
                Err(e) => {
                    summary.overlay_failures += 1;
                    reporter.log(&format!("Overlay failed in {}: {}", order_str, e));
                }
            }
            tracker.step();
        }

        if job.swap {
            reporter.check_cancelled()?;
            let outcome = swap::perform_swap(&copy_root, order, reporter);
            summary.pairs_swapped += outcome.swapped;
            summary.swaps_skipped += outcome.skipped;
            summary.swap_failures += outcome.failed;
            tracker.step();
        }

        order_dirs.push(order_dir);
        reporter.log(&format!("Processed folder: {}", order_str));
    }

    if job.zip {
        let archive_name = file_name(&copies_root);
        for order_dir in &order_dirs {
            reporter.check_cancelled()?;
            let zip_path = archive::build_stored_zip(order_dir, &archive_name)?;
            replace_with_archive(order_dir, &zip_path)?;
            summary.archives_written += 1;
            reporter.log(&format!("Created ZIP archive: {}", zip_path.display()));
            tracker.step();
        }
    }

    reporter.log("Batch processing completed");
    summary.copies = job.copies;
    Ok(summary)
}

/// Run a job on the blocking pool, keeping async callers responsive. The
/// job itself stays sequential; sinks are invoked from the worker thread.
pub async fn run_async(
    job: BatchJob,
    config: AppConfig,
    renderer: Arc<dyn OverlayRenderer>,
    reporter: Reporter,
) -> Result<BatchSummary> {
    tokio::task::spawn_blocking(move || run(&job, &config, renderer.as_ref(), &reporter)).await?
}

fn tag_supported_files(
    root: &Path,
    payload: &str,
    config: &AppConfig,
    reporter: &Reporter,
    summary: &mut BatchSummary,
) {
    for file in walker::supported_files(root, &config.scan.extensions) {
        let name = file_name(&file);
        match codec::add_watermark(&file, payload) {
            Ok(true) => {
                summary.files_tagged += 1;
                reporter.log(&format!("{}: Watermark added", name));
            }
            Ok(false) => {
                summary.already_tagged += 1;
                reporter.log(&format!("{}: Already has watermark", name));
            }
            Err(e) => {
                summary.tag_failures += 1;
                reporter.log(&format!("{}: Failed to add watermark: {}", name, e));
            }
        }
    }
}

/// Delete everything in `dir` except the archive that replaces it.
fn replace_with_archive(dir: &Path, keep: &Path) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path == keep {
            continue;
        }
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}
