// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! Configuration management for Sphragis

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::overlay::TextPosition;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// File selection settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Batch pipeline settings
    #[serde(default)]
    pub batch: BatchConfig,

    /// Visible overlay settings
    #[serde(default)]
    pub overlay: OverlayConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScanConfig {
    /// Extensions eligible for watermarking, compared case-insensitively
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BatchConfig {
    /// Shape of each numbered copy directory
    #[serde(default)]
    pub layout: CopyLayout,
}

/// How the source tree lands inside an order folder
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CopyLayout {
    /// `<order>/<sourceName>/...` (the source directory itself is copied)
    #[default]
    Nested,
    /// `<order>/...` (the source contents are copied directly)
    Flat,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OverlayConfig {
    /// Anchor corner for the painted text
    #[serde(default)]
    pub position: TextPosition,

    /// Blend strength of the white glyphs, 0.0..=1.0
    #[serde(default = "default_alpha")]
    pub alpha: f32,

    /// Integer upscale of the 8x8 glyph grid
    #[serde(default = "default_scale")]
    pub scale: u32,

    /// Distance in pixels from the anchored edges
    #[serde(default = "default_padding")]
    pub padding: u32,
}

// Default value functions
fn default_alpha() -> f32 { 0.5 }
fn default_scale() -> u32 { 2 }
fn default_padding() -> u32 { 5 }

fn default_extensions() -> Vec<String> {
    vec!["txt", "jpg", "jpeg", "png", "mp4"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            layout: CopyLayout::Nested,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            position: TextPosition::BottomRight,
            alpha: default_alpha(),
            scale: default_scale(),
            padding: default_padding(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::SphragisError::Config(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.scan.extensions.is_empty() {
            return Err(crate::SphragisError::Config(
                "scan.extensions must list at least one extension".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.overlay.alpha) {
            return Err(crate::SphragisError::Config(format!(
                "overlay.alpha must be within 0.0..=1.0, got {}",
                self.overlay.alpha
            )));
        }
        if self.overlay.scale == 0 {
            return Err(crate::SphragisError::Config(
                "overlay.scale must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
