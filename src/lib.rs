// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! Sphragis: Batch File Watermarker & Packager
//!
//! Prepares numbered batches of file deliveries: copies a source directory,
//! appends an invisible tail watermark to every supported file, optionally
//! paints a visible text overlay, swaps numbered image pairs and packs each
//! copy into an uncompressed ZIP archive.

pub mod archive;
pub mod batch;
pub mod codec;
pub mod config;
pub mod error;
pub mod numbering;
pub mod overlay;
pub mod progress;
pub mod swap;
pub mod walker;

pub use batch::{BatchJob, BatchSummary};
pub use config::AppConfig;
pub use error::{Result, SphragisError};
pub use overlay::{BitmapOverlay, OverlayRenderer, TextPosition};
pub use progress::{CancelToken, Reporter};
