// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! Swap resolver: exchanges numbered image pairs inside a copy directory
//!
//! A file whose first filename digit run equals the copy's order number is
//! paired with the sibling whose run reads ten higher. Pairs are only formed
//! inside the copy's hundred block, and only when the sibling actually
//! exists on disk. Swaps are best-effort renames with no rollback.

use std::path::Path;

use chrono::Utc;

use crate::error::Result;
use crate::numbering::{first_digit_run, matches_number, zero_padded};
use crate::progress::Reporter;
use crate::walker::{self, file_name, IMAGE_EXTENSIONS};

/// Distance between the two numbers of a swap pair.
pub const SWAP_OFFSET: u32 = 10;

/// Counts from one directory-level swap pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapOutcome {
    pub swapped: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Eligibility window around `base`: numbers strictly inside `base`'s
/// hundred block (`series + 1 ..= series + 99`). Widened so the top block
/// of the u32 range cannot wrap.
pub fn in_hundred_block(n: u32, base: u32) -> bool {
    let series = u64::from(base) / 100 * 100;
    let n = u64::from(n);
    n >= series + 1 && n <= series + 99
}

/// True when the file name's first digit run equals `order`.
pub fn is_candidate(name: &str, order: u32) -> bool {
    match first_digit_run(name) {
        Some((start, end)) => matches_number(&name[start..end], order),
        None => false,
    }
}

/// Sibling file name a candidate would swap with: the matched run replaced
/// by `order + SWAP_OFFSET`, re-padded to at least the run's width. None
/// when the name is not a candidate or the pair leaves the hundred block.
pub fn partner_name(name: &str, order: u32) -> Option<String> {
    let (start, end) = first_digit_run(name)?;
    let run = &name[start..end];
    if !matches_number(run, order) {
        return None;
    }
    let partner = order.checked_add(SWAP_OFFSET)?;
    if !in_hundred_block(order, order) || !in_hundred_block(partner, order) {
        return None;
    }
    let replacement = zero_padded(partner, run.len().max(3));
    Some(format!("{}{}{}", &name[..start], replacement, &name[end..]))
}

/// Exchange two files through a three-step rename. The temporary name lives
/// next to `a`. A failed step leaves whatever state was reached; callers
/// log and move on.
pub fn swap_files(a: &Path, b: &Path) -> Result<()> {
    let parent = a.parent().unwrap_or_else(|| Path::new(""));
    let temp = parent.join(format!(
        "temp_{}_{}",
        Utc::now().timestamp_millis(),
        file_name(a)
    ));
    std::fs::rename(a, &temp)?;
    std::fs::rename(b, a)?;
    std::fs::rename(&temp, b)?;
    Ok(())
}

/// Run the resolver over every image under `dir` for the copy's order
/// number. Missing partners and out-of-block candidates are logged and
/// skipped, never silently dropped.
pub fn perform_swap(dir: &Path, order: u32, reporter: &Reporter) -> SwapOutcome {
    let image_extensions: Vec<String> = IMAGE_EXTENSIONS.iter().map(|s| s.to_string()).collect();
    let mut outcome = SwapOutcome::default();

    for file in walker::supported_files(dir, &image_extensions) {
        let name = file_name(&file);
        if !is_candidate(&name, order) {
            continue;
        }
        let Some(partner) = partner_name(&name, order) else {
            outcome.skipped += 1;
            reporter.log(&format!(
                "Swap skipped for {}: pair leaves the {} block",
                name,
                (order / 100) * 100
            ));
            continue;
        };
        let partner_path = file
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&partner);
        if !partner_path.exists() {
            outcome.skipped += 1;
            reporter.log(&format!("No matching swap file found for: {}", name));
            continue;
        }
        reporter.log(&format!("Swapping files: {} <-> {}", name, partner));
        match swap_files(&file, &partner_path) {
            Ok(()) => outcome.swapped += 1,
            Err(e) => {
                outcome.failed += 1;
                reporter.log(&format!("Failed to swap {} and {}: {}", name, partner, e));
            }
        }
    }
    outcome
}
