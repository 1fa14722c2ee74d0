// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! Error types for Sphragis

use thiserror::Error;

/// Result type alias for Sphragis operations
pub type Result<T> = std::result::Result<T, SphragisError>;

/// Sphragis error types
#[derive(Error, Debug)]
pub enum SphragisError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Invalid job: {0}")]
    InvalidJob(String),

    #[error("Watermark error: {0}")]
    Watermark(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Operation cancelled")]
    Cancelled,
}
