//! Caption list -> numbered subtitle bitmaps.
//!
//! Every check that can reject the batch (overlap, font, glyph coverage,
//! off-screen text) runs over all groups before the first pixel is drawn,
//! so a failed render produces no images at all.

use std::sync::Arc;
use std::time::Instant;

use burnsub_caption_model::caption::CaptionList;
use burnsub_caption_model::grouping::{ensure_min_gap, group_captions, CaptionGroup};
use burnsub_caption_model::layout::Layout;
use burnsub_caption_model::set::CaptionSet;
use burnsub_common::config::{Align, AppConfig, OutputDefaults, Position, ZeroDurationPolicy};
use burnsub_common::error::{BurnError, BurnResult};
use burnsub_common::timecode::{frame_interval_us, Microseconds};
use rayon::prelude::*;

use crate::font::GlyphFont;
use crate::font_catalog::{check_glyph_coverage, FontCatalog};
use crate::placement::{place_group, CanvasSize, PlacedCue, PlacementContext, TextMetrics};
use crate::quantize::{IndexedBitmap, Palette};
use crate::raster::render_bitmap;

/// Per-render parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    pub position: Position,
    pub align: Align,
    /// Push touching or overlapping groups one frame apart.
    pub avoid_same_next_start_prev_end: bool,
    pub font_scale: f64,
    pub zero_duration: ZeroDurationPolicy,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&OutputDefaults::default())
    }
}

impl From<&OutputDefaults> for RenderOptions {
    fn from(defaults: &OutputDefaults) -> Self {
        Self {
            width: defaults.width,
            height: defaults.height,
            frame_rate: defaults.frame_rate,
            position: defaults.position,
            align: defaults.align,
            avoid_same_next_start_prev_end: defaults.avoid_same_next_start_prev_end,
            font_scale: defaults.font_scale,
            zero_duration: defaults.zero_duration,
        }
    }
}

impl RenderOptions {
    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.width, self.height)
    }

    /// Font size in pixels: `floor(width * font_scale)`.
    pub fn font_px(&self) -> f32 {
        (self.width as f64 * self.font_scale).floor() as f32
    }

    pub fn validate(&self) -> BurnResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BurnError::config(format!(
                "Canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(BurnError::config(format!(
                "Frame rate must be positive, got {}",
                self.frame_rate
            )));
        }
        if !(self.font_scale.is_finite() && self.font_px() >= 1.0) {
            return Err(BurnError::config(format!(
                "Font scale {} gives no usable font size at width {}",
                self.font_scale, self.width
            )));
        }
        Ok(())
    }
}

/// One rendered group.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    /// 1-based, contiguous, in group order.
    pub index: usize,
    pub bitmap: IndexedBitmap,
    pub start: Microseconds,
    pub end: Microseconds,
}

impl RenderedImage {
    /// `subtitleNNNN.<ext>`.
    pub fn file_name(&self, extension: &str) -> String {
        format!("subtitle{:04}.{extension}", self.index)
    }
}

/// Everything a mux adapter consumes.
#[derive(Debug, Clone)]
pub struct RenderedSequence {
    pub images: Vec<RenderedImage>,
    pub canvas: CanvasSize,
    pub frame_rate: f64,
    pub palette: Palette,
    pub language: String,
}

impl RenderedSequence {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderedImage> {
        self.images.iter()
    }

    /// Fully transparent canvas-sized bitmap.
    pub fn blank(&self) -> IndexedBitmap {
        IndexedBitmap::blank(self.canvas.width, self.canvas.height)
    }

    /// End of the last image, or 0.
    pub fn end(&self) -> Microseconds {
        self.images.iter().map(|i| i.end).max().unwrap_or(0)
    }
}

/// Turns caption lists into rendered sequences.
#[derive(Debug, Clone)]
pub struct Renderer {
    catalog: FontCatalog,
    palette: Palette,
}

impl Renderer {
    pub fn new(catalog: FontCatalog, palette: Palette) -> Self {
        Self { catalog, palette }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            FontCatalog::from_config(&config.fonts),
            Palette::from(&config.palette),
        )
    }

    pub fn catalog(&self) -> &FontCatalog {
        &self.catalog
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Render one language of a set, inheriting the set's default layout.
    pub fn render_set(
        &self,
        set: &CaptionSet,
        language: &str,
        options: &RenderOptions,
    ) -> BurnResult<RenderedSequence> {
        let captions = set.captions(language)?;
        let inherited = set.layout_for(language);
        self.render_with_layout(captions, language, inherited.as_ref(), options)
    }

    pub fn render(
        &self,
        captions: &CaptionList,
        language: &str,
        options: &RenderOptions,
    ) -> BurnResult<RenderedSequence> {
        self.render_with_layout(captions, language, captions.layout.as_ref(), options)
    }

    fn render_with_layout(
        &self,
        captions: &CaptionList,
        language: &str,
        inherited_layout: Option<&Layout>,
        options: &RenderOptions,
    ) -> BurnResult<RenderedSequence> {
        options.validate()?;

        let mut groups = group_captions(&captions.captions)?;
        tracing::info!(
            language,
            cues = captions.len(),
            groups = groups.len(),
            "Grouped captions"
        );

        if options.avoid_same_next_start_prev_end {
            let gap = frame_interval_us(options.frame_rate);
            let nudged = ensure_min_gap(&mut groups, gap);
            tracing::debug!(nudged, gap_us = gap, "Applied one-frame gap");
        }

        let groups = apply_zero_duration_policy(groups, options.zero_duration);

        let resolved = self.catalog.resolve(language, options.align)?;
        let align = resolved.align;

        let sequence = |images: Vec<RenderedImage>| RenderedSequence {
            images,
            canvas: options.canvas(),
            frame_rate: options.frame_rate,
            palette: self.palette,
            language: language.to_string(),
        };

        if groups.is_empty() {
            return Ok(sequence(Vec::new()));
        }

        let font: Arc<dyn GlyphFont> = resolved.entry.asset.load()?;
        check_glyph_coverage(font.as_ref(), &groups)?;

        let px = options.font_px();
        let ctx = PlacementContext {
            position: options.position,
            align,
            canvas: options.canvas(),
            metrics: TextMetrics {
                font: font.as_ref(),
                px,
            },
            inherited_layout,
        };
        let placements: Vec<Vec<PlacedCue>> = groups
            .iter()
            .map(|group| place_group(group, &ctx))
            .collect::<BurnResult<_>>()?;

        let started = Instant::now();
        let canvas = options.canvas();
        let palette = self.palette;
        let bitmaps: Vec<IndexedBitmap> = placements
            .par_iter()
            .map(|cues| render_bitmap(cues, font.as_ref(), px, canvas, &palette))
            .collect();

        let images: Vec<RenderedImage> = groups
            .iter()
            .zip(bitmaps)
            .enumerate()
            .map(|(i, (group, bitmap))| RenderedImage {
                index: i + 1,
                bitmap,
                start: group.start,
                end: group.end,
            })
            .collect();

        tracing::info!(
            language,
            images = images.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rasterized subtitles"
        );
        Ok(sequence(images))
    }
}

fn apply_zero_duration_policy(
    groups: Vec<CaptionGroup>,
    policy: ZeroDurationPolicy,
) -> Vec<CaptionGroup> {
    let zero = groups.iter().filter(|g| g.is_zero_duration()).count();
    if zero == 0 {
        return groups;
    }
    match policy {
        ZeroDurationPolicy::Keep => {
            tracing::warn!(count = zero, "Keeping zero-duration cues");
            groups
        }
        ZeroDurationPolicy::Drop => {
            tracing::warn!(count = zero, "Dropping zero-duration cues");
            groups.into_iter().filter(|g| !g.is_zero_duration()).collect()
        }
    }
}
