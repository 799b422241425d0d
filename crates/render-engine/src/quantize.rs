//! Fixed four-entry palette and nearest-colour quantization.

use std::collections::BTreeSet;

use burnsub_common::config::PaletteConfig;
use image::{Rgb, RgbImage};

/// The four subtitle colours, in index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb<u8>; 4],
}

impl Palette {
    pub const FILL: u8 = 0;
    pub const ANTIALIAS: u8 = 1;
    pub const BORDER: u8 = 2;
    /// Background; every adapter treats this index as transparent.
    pub const TRANSPARENT: u8 = 3;

    pub fn new(fill: Rgb<u8>, antialias: Rgb<u8>, border: Rgb<u8>, background: Rgb<u8>) -> Self {
        Self {
            colors: [fill, antialias, border, background],
        }
    }

    pub fn colors(&self) -> &[Rgb<u8>; 4] {
        &self.colors
    }

    pub fn color(&self, index: u8) -> Rgb<u8> {
        self.colors[(index as usize).min(3)]
    }

    pub fn fill(&self) -> Rgb<u8> {
        self.colors[Self::FILL as usize]
    }

    pub fn border(&self) -> Rgb<u8> {
        self.colors[Self::BORDER as usize]
    }

    pub fn background(&self) -> Rgb<u8> {
        self.colors[Self::TRANSPARENT as usize]
    }

    /// Flat `r g b` bytes, twelve in total.
    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.0).collect()
    }

    /// Index of the closest entry by squared RGB distance; ties go to the
    /// lower index.
    pub fn nearest(&self, pixel: &Rgb<u8>) -> u8 {
        let mut best = 0u8;
        let mut best_distance = u32::MAX;
        for (index, color) in self.colors.iter().enumerate() {
            let distance: u32 = pixel
                .0
                .iter()
                .zip(color.0.iter())
                .map(|(&a, &b)| {
                    let d = a as i32 - b as i32;
                    (d * d) as u32
                })
                .sum();
            if distance < best_distance {
                best = index as u8;
                best_distance = distance;
            }
        }
        best
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from(&PaletteConfig::default())
    }
}

impl From<&PaletteConfig> for Palette {
    fn from(config: &PaletteConfig) -> Self {
        Self::new(
            Rgb(config.fill),
            Rgb(config.antialias),
            Rgb(config.border),
            Rgb(config.background),
        )
    }
}

/// A bitmap of palette indices, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl IndexedBitmap {
    /// A fully transparent bitmap.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Palette::TRANSPARENT; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Distinct indices present.
    pub fn used_indices(&self) -> BTreeSet<u8> {
        self.pixels.iter().copied().collect()
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&p| p == Palette::TRANSPARENT)
    }

    /// Expand back to RGB.
    pub fn to_rgb(&self, palette: &Palette) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            palette.color(self.get(x, y).unwrap_or(Palette::TRANSPARENT))
        })
    }
}

/// Map every pixel to its nearest palette entry. No dithering.
pub fn quantize(image: &RgbImage, palette: &Palette) -> IndexedBitmap {
    IndexedBitmap {
        width: image.width(),
        height: image.height(),
        pixels: image.pixels().map(|p| palette.nearest(p)).collect(),
    }
}
