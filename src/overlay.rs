// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! Visible text overlay painted onto delivery images
//!
//! The default renderer rasterizes an 8x8 bitmap font at an integer scale
//! and blends white glyphs over the image at a configurable alpha. The
//! trait seam exists so callers can substitute their own rasterizer.

use std::path::Path;

use clap::ValueEnum;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::config::OverlayConfig;
use crate::error::Result;
use crate::numbering::first_number;
use crate::progress::Reporter;
use crate::walker::{self, file_name, IMAGE_EXTENSIONS};

/// Anchor corner for the painted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TextPosition {
    TopLeft,
    TopRight,
    Center,
    BottomLeft,
    #[default]
    BottomRight,
}

/// Paints `text` onto `image` at `position`, rewriting the file in place.
/// Returns false when the image could not be used (unreadable, not an
/// image); errors are reserved for failures after decoding succeeded.
pub trait OverlayRenderer: Send + Sync {
    fn overlay_text(&self, image: &Path, text: &str, position: TextPosition) -> Result<bool>;
}

/// Default renderer: white 8x8 bitmap glyphs, scaled and alpha-blended.
#[derive(Debug, Clone)]
pub struct BitmapOverlay {
    alpha: f32,
    scale: u32,
    padding: u32,
}

impl BitmapOverlay {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            alpha: config.alpha,
            scale: config.scale.max(1),
            padding: config.padding,
        }
    }
}

impl Default for BitmapOverlay {
    fn default() -> Self {
        Self::new(&OverlayConfig::default())
    }
}

impl OverlayRenderer for BitmapOverlay {
    fn overlay_text(&self, image: &Path, text: &str, position: TextPosition) -> Result<bool> {
        let decoded = match image::open(image) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!("could not open {} for overlay: {}", image.display(), e);
                return Ok(false);
            }
        };
        // JPEG output cannot carry an alpha channel, so blend in plain RGB
        let mut canvas = decoded.to_rgb8();

        let (text_w, text_h) = text_extent(text, self.scale);
        if text_w == 0 {
            return Ok(true);
        }
        let (x, y) = anchor(
            position,
            canvas.width(),
            canvas.height(),
            text_w,
            text_h,
            self.padding,
        );
        draw_text(&mut canvas, text, x, y, self.scale, self.alpha);

        canvas.save(image)?;
        Ok(true)
    }
}

/// Paint `text` onto the one image under `folder` whose first filename
/// digit run equals `number`. A missing target is logged and reported as
/// false, never an error.
pub fn overlay_numbered_photo(
    folder: &Path,
    text: &str,
    number: u32,
    position: TextPosition,
    renderer: &dyn OverlayRenderer,
    reporter: &Reporter,
) -> Result<bool> {
    let image_extensions: Vec<String> = IMAGE_EXTENSIONS.iter().map(|s| s.to_string()).collect();
    let target = walker::supported_files(folder, &image_extensions)
        .into_iter()
        .find(|path| first_number(&file_name(path)) == Some(number));

    let Some(target) = target else {
        reporter.log(&format!(
            "No photo numbered {} found in {}",
            number,
            folder.display()
        ));
        return Ok(false);
    };

    let painted = renderer.overlay_text(&target, text, position)?;
    if painted {
        reporter.log(&format!("Added visible watermark to {}", file_name(&target)));
    } else {
        reporter.log(&format!("Could not paint {}", file_name(&target)));
    }
    Ok(painted)
}

/// Pixel box occupied by `text` at `scale`.
fn text_extent(text: &str, scale: u32) -> (u32, u32) {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        (0, 0)
    } else {
        (chars * 8 * scale, 8 * scale)
    }
}

/// Top-left corner of the glyph box. Signed so oversized text on small
/// images simply clips at the borders.
fn anchor(position: TextPosition, w: u32, h: u32, text_w: u32, text_h: u32, padding: u32) -> (i64, i64) {
    let (w, h) = (w as i64, h as i64);
    let (tw, th) = (text_w as i64, text_h as i64);
    let pad = padding as i64;
    match position {
        TextPosition::TopLeft => (pad, pad),
        TextPosition::TopRight => (w - tw - pad, pad),
        TextPosition::Center => ((w - tw) / 2, (h - th) / 2),
        TextPosition::BottomLeft => (pad, h - th - pad),
        TextPosition::BottomRight => (w - tw - pad, h - th - pad),
    }
}

fn draw_text(canvas: &mut RgbImage, text: &str, x: i64, y: i64, scale: u32, alpha: f32) {
    let mut cursor_x = x;
    for ch in text.chars() {
        if let Some(glyph) = BASIC_FONTS.get(ch) {
            for (row_idx, row_bits) in glyph.iter().enumerate() {
                for col_idx in 0..8u32 {
                    if (row_bits >> col_idx) & 1 == 1 {
                        fill_block(
                            canvas,
                            cursor_x + (col_idx * scale) as i64,
                            y + (row_idx as u32 * scale) as i64,
                            scale,
                            alpha,
                        );
                    }
                }
            }
        }
        cursor_x += (8 * scale) as i64;
    }
}

fn fill_block(canvas: &mut RgbImage, x: i64, y: i64, scale: u32, alpha: f32) {
    for dy in 0..scale as i64 {
        for dx in 0..scale as i64 {
            let (px, py) = (x + dx, y + dy);
            if px < 0 || py < 0 || px >= canvas.width() as i64 || py >= canvas.height() as i64 {
                continue;
            }
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            for channel in 0..3 {
                let blended = pixel[channel] as f32 * (1.0 - alpha) + 255.0 * alpha;
                pixel[channel] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn anchors_cover_all_five_corners() {
        // 100x80 image, 24x8 text, padding 5
        assert_eq!(anchor(TextPosition::TopLeft, 100, 80, 24, 8, 5), (5, 5));
        assert_eq!(anchor(TextPosition::TopRight, 100, 80, 24, 8, 5), (71, 5));
        assert_eq!(anchor(TextPosition::Center, 100, 80, 24, 8, 5), (38, 36));
        assert_eq!(anchor(TextPosition::BottomLeft, 100, 80, 24, 8, 5), (5, 67));
        assert_eq!(anchor(TextPosition::BottomRight, 100, 80, 24, 8, 5), (71, 67));
    }

    #[test]
    fn extent_scales_with_glyph_count() {
        assert_eq!(text_extent("007", 1), (24, 8));
        assert_eq!(text_extent("007", 2), (48, 16));
        assert_eq!(text_extent("", 2), (0, 0));
    }

    #[test]
    fn drawing_out_of_bounds_clips_instead_of_panicking() {
        let mut canvas = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        draw_text(&mut canvas, "wide text", -20, -20, 3, 0.5);
        draw_text(&mut canvas, "x", 2, 2, 2, 0.5);
    }

    #[test]
    fn glyphs_brighten_the_target_corner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo_001.png");
        RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]))
            .save(&path)
            .unwrap();

        let renderer = BitmapOverlay::default();
        assert!(renderer
            .overlay_text(&path, "7", TextPosition::BottomRight)
            .unwrap());

        let reloaded = image::open(&path).unwrap().to_rgb8();
        let bottom_right_lit = (40..64)
            .flat_map(|x| (40..64).map(move |y| (x, y)))
            .any(|(x, y)| reloaded.get_pixel(x, y)[0] > 0);
        assert!(bottom_right_lit, "expected blended glyph pixels near the corner");
        let top_left_untouched = reloaded.get_pixel(1, 1)[0] == 0;
        assert!(top_left_untouched);
    }

    #[test]
    fn unreadable_image_reports_false() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_an_image.png");
        std::fs::write(&path, "plain text").unwrap();
        let renderer = BitmapOverlay::default();
        assert!(!renderer.overlay_text(&path, "7", TextPosition::Center).unwrap());
    }
}
