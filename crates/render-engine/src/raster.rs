//! Outlined text rendering onto an RGB canvas.

use image::{Rgb, RgbImage};

use crate::font::GlyphFont;
use crate::placement::{CanvasSize, PlacedCue};
use crate::quantize::{quantize, IndexedBitmap, Palette};

/// Offsets stamped in the border colour, per outline step.
const OUTLINE_DIRECTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, 1),
    (0, -1),
    (-1, 1),
    (1, 1),
    (-1, -1),
    (1, -1),
];

const OUTLINE_STEPS: i32 = 2;

/// Draw placed cues onto a background-filled canvas.
pub fn rasterize(
    cues: &[PlacedCue],
    font: &dyn GlyphFont,
    px: f32,
    canvas: CanvasSize,
    palette: &Palette,
) -> RgbImage {
    let mut image = RgbImage::from_pixel(canvas.width, canvas.height, palette.background());
    for cue in cues {
        for line in &cue.lines {
            if line.text.is_empty() {
                continue;
            }
            stamp_outlined(&mut image, font, px, line.x, line.y, &line.text, palette);
        }
    }
    image
}

fn stamp_outlined(
    image: &mut RgbImage,
    font: &dyn GlyphFont,
    px: f32,
    x: i32,
    y: i32,
    text: &str,
    palette: &Palette,
) {
    let border: Rgb<u8> = palette.border();
    for adj in 0..OUTLINE_STEPS {
        for (dx, dy) in OUTLINE_DIRECTIONS {
            font.draw_text(image, border, x + dx * adj, y + dy * adj, px, text);
        }
    }
    font.draw_text(image, palette.fill(), x, y, px, text);
}

/// Rasterize and quantize in one step.
pub fn render_bitmap(
    cues: &[PlacedCue],
    font: &dyn GlyphFont,
    px: f32,
    canvas: CanvasSize,
    palette: &Palette,
) -> IndexedBitmap {
    quantize(&rasterize(cues, font, px, canvas, palette), palette)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::PlacedLine;

    /// Fills each glyph cell solid; antialiases the rightmost column.
    struct BoxFont;

    impl GlyphFont for BoxFont {
        fn has_glyph(&self, _: char) -> bool {
            true
        }
        fn line_height(&self, px: f32) -> u32 {
            px as u32
        }
        fn text_width(&self, px: f32, text: &str) -> u32 {
            text.chars().count() as u32 * px as u32
        }
        fn draw_text(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, px: f32, text: &str) {
            let w = self.text_width(px, text) as i32;
            for dy in 0..px as i32 {
                for dx in 0..w {
                    let (cx, cy) = (x + dx, y + dy);
                    if cx < 0 || cy < 0 || cx >= canvas.width() as i32 || cy >= canvas.height() as i32 {
                        continue;
                    }
                    let pixel = if dx == w - 1 {
                        let old = canvas.get_pixel(cx as u32, cy as u32).0;
                        Rgb([
                            ((old[0] as u16 + color.0[0] as u16) / 2) as u8,
                            ((old[1] as u16 + color.0[1] as u16) / 2) as u8,
                            ((old[2] as u16 + color.0[2] as u16) / 2) as u8,
                        ])
                    } else {
                        color
                    };
                    canvas.put_pixel(cx as u32, cy as u32, pixel);
                }
            }
        }
    }

    fn cue(x: i32, y: i32, text: &str) -> PlacedCue {
        PlacedCue {
            x,
            y,
            width: text.len() as u32 * 4,
            height: 4,
            lines: vec![PlacedLine {
                text: text.to_string(),
                x,
                y,
                width: text.len() as u32 * 4,
            }],
            fell_back: false,
        }
    }

    #[test]
    fn test_empty_placement_is_blank() {
        let palette = Palette::default();
        let bitmap = render_bitmap(&[], &BoxFont, 4.0, CanvasSize::new(16, 8), &palette);
        assert!(bitmap.is_blank());
    }

    #[test]
    fn test_outline_surrounds_fill() {
        let palette = Palette::default();
        let bitmap = render_bitmap(&[cue(4, 2, "ab")], &BoxFont, 4.0, CanvasSize::new(20, 10), &palette);
        assert_eq!(bitmap.get(4, 2), Some(Palette::FILL));
        // one pixel left of the text is border
        assert_eq!(bitmap.get(3, 2), Some(Palette::BORDER));
        // far corner untouched
        assert_eq!(bitmap.get(19, 9), Some(Palette::TRANSPARENT));
        let used = bitmap.used_indices();
        assert!(used.contains(&Palette::FILL));
        assert!(used.contains(&Palette::BORDER));
        assert!(used.iter().all(|&i| i < 4));
    }

    #[test]
    fn test_blended_edge_quantizes_to_antialias() {
        let palette = Palette::default();
        let bitmap = render_bitmap(&[cue(2, 2, "a")], &BoxFont, 4.0, CanvasSize::new(12, 8), &palette);
        // last column: fill blended over border -> (127,127,127) -> antialias
        assert_eq!(bitmap.get(5, 3), Some(Palette::ANTIALIAS));
    }
}
