//! The adapter seam between rendering and delivery formats.

use burnsub_common::error::BurnResult;
use burnsub_render_engine::{encode_png, CanvasSize, RenderedSequence};
use rayon::prelude::*;

use crate::bundle::OutputBundle;

/// Serializes a rendered image sequence into one delivery format.
///
/// Adapters only consume what the renderer produced. They never regroup
/// cues or touch fonts and layout.
pub trait MuxAdapter: Send + Sync {
    /// Short format name used in logs.
    fn name(&self) -> &str;

    fn mux(&self, sequence: &RenderedSequence) -> BurnResult<OutputBundle>;

    /// Canvas the format expects when the caller has not chosen one.
    fn preferred_canvas(&self) -> Option<CanvasSize> {
        None
    }
}

/// Full HD, the default for the ffmpeg and picture-track formats.
pub const FULL_HD: CanvasSize = CanvasSize {
    width: 1920,
    height: 1080,
};

/// Encode every image as indexed PNG, in sequence order.
pub(crate) fn encode_all_png(sequence: &RenderedSequence) -> BurnResult<Vec<Vec<u8>>> {
    sequence
        .images
        .par_iter()
        .map(|image| encode_png(&image.bitmap, &sequence.palette))
        .collect()
}

/// `dir/name`, or `name` when `dir` is empty.
pub(crate) fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
