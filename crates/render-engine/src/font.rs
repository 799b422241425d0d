//! Font access used by resolution, layout, and rasterization.

use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use burnsub_common::error::{BurnError, BurnResult};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

/// A font that can answer coverage and metric queries and draw onto a canvas.
///
/// `y` passed to [`GlyphFont::draw_text`] is the top of the line box.
pub trait GlyphFont: Send + Sync {
    /// Whether the character map has an entry for `c`.
    fn has_glyph(&self, c: char) -> bool;

    /// Ascent plus descent at `px`, in whole pixels.
    fn line_height(&self, px: f32) -> u32;

    /// Advance width of a single line at `px`.
    fn text_width(&self, px: f32, text: &str) -> u32;

    /// Draw a single line.
    fn draw_text(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, px: f32, text: &str);
}

/// TrueType/OpenType font backed by `ab_glyph`.
pub struct TrueTypeFont {
    font: FontVec,
}

impl TrueTypeFont {
    pub fn from_bytes(data: Vec<u8>) -> BurnResult<Self> {
        let font = FontVec::try_from_vec(data)
            .map_err(|e| BurnError::font(format!("Invalid font data: {e}")))?;
        Ok(Self { font })
    }

    pub fn from_file(path: impl AsRef<Path>) -> BurnResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            BurnError::font(format!("Cannot read font {}: {e}", path.display()))
        })?;
        Self::from_bytes(data).map_err(|e| match e {
            BurnError::Font { message } => {
                BurnError::font(format!("{message} ({})", path.display()))
            }
            other => other,
        })
    }
}

impl std::fmt::Debug for TrueTypeFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrueTypeFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl GlyphFont for TrueTypeFont {
    fn has_glyph(&self, c: char) -> bool {
        self.font.glyph_id(c).0 != 0
    }

    fn line_height(&self, px: f32) -> u32 {
        let scaled = self.font.as_scaled(PxScale::from(px));
        (scaled.ascent() - scaled.descent()).ceil().max(0.0) as u32
    }

    fn text_width(&self, px: f32, text: &str) -> u32 {
        text_size(PxScale::from(px), &self.font, text).0
    }

    fn draw_text(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, px: f32, text: &str) {
        draw_text_mut(canvas, color, x, y, PxScale::from(px), &self.font, text);
    }
}
