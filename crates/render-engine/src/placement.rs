//! Line placement for top, bottom, and source-positioned cues.
//!
//! Members of a group are placed last-to-first so edge-anchored stacks grow
//! away from their edge. Placement never clips: anything that would land
//! outside the canvas is an error.

use burnsub_caption_model::caption::Caption;
use burnsub_caption_model::grouping::CaptionGroup;
use burnsub_caption_model::layout::Layout;
use burnsub_common::config::{Align, Position};
use burnsub_common::error::{BurnError, BurnResult};

use crate::font::GlyphFont;

/// Distance kept from the canvas edge by edge anchoring and the source
/// right-edge clamp, and the upward nudge for low source positions.
pub const MARGIN: i32 = 10;

/// Source positions further down than this (percent) are nudged up.
pub const LOW_SOURCE_PERCENT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Why a source-positioned cue was placed at the bottom instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Neither the cue nor its list carries a layout.
    MissingLayout,
    /// The origin is not expressed in percent on both axes.
    NotPercent,
}

/// Where a cue goes under `Position::Source`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceAnchor {
    Anchor { x_percent: f64, y_percent: f64 },
    Fallback(FallbackReason),
}

impl SourceAnchor {
    /// Use the cue's own layout, else the inherited list layout.
    pub fn for_caption(caption: &Caption, inherited: Option<&Layout>) -> Self {
        let Some(layout) = caption.layout.as_ref().or(inherited) else {
            return Self::Fallback(FallbackReason::MissingLayout);
        };
        if !layout.has_percent_origin() {
            return Self::Fallback(FallbackReason::NotPercent);
        }
        Self::Anchor {
            x_percent: layout.origin.x.value,
            y_percent: layout.origin.y.value,
        }
    }
}

/// One line of text with its top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
}

/// A cue's text block.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCue {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub lines: Vec<PlacedLine>,
    /// True when a source-positioned cue fell back to the bottom edge.
    pub fell_back: bool,
}

/// Font and size used to measure text.
#[derive(Clone, Copy)]
pub struct TextMetrics<'a> {
    pub font: &'a dyn GlyphFont,
    pub px: f32,
}

impl TextMetrics<'_> {
    pub fn line_height(&self) -> u32 {
        self.font.line_height(self.px)
    }

    fn measure(&self, text: &str) -> (Vec<(String, u32)>, u32, u32) {
        let lines: Vec<(String, u32)> = text
            .split('\n')
            .map(|line| (line.to_string(), self.font.text_width(self.px, line)))
            .collect();
        let width = lines.iter().map(|(_, w)| *w).max().unwrap_or(0);
        let height = self.line_height() * lines.len() as u32;
        (lines, width, height)
    }
}

/// Inputs shared by every group of one render.
#[derive(Clone, Copy)]
pub struct PlacementContext<'a> {
    pub position: Position,
    pub align: Align,
    pub canvas: CanvasSize,
    pub metrics: TextMetrics<'a>,
    /// Layout inherited by cues that carry none.
    pub inherited_layout: Option<&'a Layout>,
}

/// Place every member of `group`, back to front.
pub fn place_group(group: &CaptionGroup, ctx: &PlacementContext<'_>) -> BurnResult<Vec<PlacedCue>> {
    let canvas_w = ctx.canvas.width as i32;
    let canvas_h = ctx.canvas.height as i32;
    let mut stacked: i32 = 0;
    let mut placed = Vec::with_capacity(group.len());

    for caption in group.captions.iter().rev() {
        let text = caption.text();
        let (lines, width, height) = ctx.metrics.measure(&text);
        let (w, h) = (width as i32, height as i32);

        let source = match ctx.position {
            Position::Source => Some(SourceAnchor::for_caption(caption, ctx.inherited_layout)),
            _ => None,
        };

        let (x, y, fell_back) = match source {
            Some(SourceAnchor::Anchor {
                x_percent,
                y_percent,
            }) => {
                let mut x = (canvas_w as f64 * x_percent / 100.0) as i32;
                let mut y = (canvas_h as f64 * y_percent / 100.0) as i32;
                if x + w > canvas_w {
                    x = canvas_w - w - MARGIN;
                }
                if y_percent > LOW_SOURCE_PERCENT {
                    y -= MARGIN;
                }
                (x, y, false)
            }
            other => {
                if let Some(SourceAnchor::Fallback(reason)) = other {
                    tracing::warn!(
                        start_us = caption.start,
                        reason = ?reason,
                        "Source position unavailable, using bottom"
                    );
                }
                let x = (canvas_w - w) / 2;
                let y = match ctx.position {
                    Position::Top => MARGIN + stacked,
                    _ => canvas_h - h - MARGIN - stacked,
                };
                stacked += h;
                (x, y, other.is_some())
            }
        };

        let line_height = ctx.metrics.line_height() as i32;
        let lines: Vec<PlacedLine> = lines
            .into_iter()
            .enumerate()
            .map(|(i, (text, line_w))| {
                let slack = w - line_w as i32;
                let line_x = match ctx.align {
                    Align::Left => x,
                    Align::Center => x + slack / 2,
                    Align::Right => x + slack,
                };
                PlacedLine {
                    text,
                    x: line_x,
                    y: y + i as i32 * line_height,
                    width: line_w,
                }
            })
            .collect();

        for line in &lines {
            check_on_screen(line, line_height, ctx.canvas)?;
        }

        placed.push(PlacedCue {
            x,
            y,
            width,
            height,
            lines,
            fell_back,
        });
    }

    Ok(placed)
}

fn check_on_screen(line: &PlacedLine, line_height: i32, canvas: CanvasSize) -> BurnResult<()> {
    let right = line.x + line.width as i32;
    let bottom = line.y + line_height;
    if line.x < 0 || line.y < 0 || right > canvas.width as i32 || bottom > canvas.height as i32 {
        return Err(BurnError::render(format!(
            "Text runs off screen: \"{}\" spans ({}, {})-({right}, {bottom}) on a {}x{} canvas",
            line.text, line.x, line.y, canvas.width, canvas.height
        )));
    }
    Ok(())
}
