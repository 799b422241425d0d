//! ffmpeg filtergraph overlaying each subtitle frame during its window.

use burnsub_common::error::BurnResult;
use burnsub_common::timecode::format_seconds;
use burnsub_render_engine::{CanvasSize, RenderedSequence};

use crate::adapter::{encode_all_png, join_path, MuxAdapter, FULL_HD};
use crate::bundle::OutputBundle;

pub const DEFAULT_DIR: &str = "embedded_subs";
pub const GRAPH_FILE: &str = "filtergraph.txt";

#[derive(Debug, Clone)]
pub struct FiltergraphAdapter {
    pub output_dir: String,
}

impl Default for FiltergraphAdapter {
    fn default() -> Self {
        Self {
            output_dir: DEFAULT_DIR.to_string(),
        }
    }
}

impl FiltergraphAdapter {
    /// One transparent colour source, then one overlay per image. The final
    /// pad is always `[out]`.
    pub fn graph(&self, sequence: &RenderedSequence) -> String {
        let count = sequence.len();
        let label = |n: usize| {
            if n == count {
                "[out]".to_string()
            } else {
                format!("[s{n}]")
            }
        };

        let mut output = format!(
            "color=c=black@0.0:s={}x{}:r={}:d={},format=rgba{}",
            sequence.canvas.width,
            sequence.canvas.height,
            sequence.frame_rate,
            format_seconds(sequence.end()),
            label(0),
        );
        for (i, image) in sequence.iter().enumerate() {
            let n = i + 1;
            output.push_str(&format!(
                ";\nmovie={}[i{n}];[s{}][i{n}]overlay=x=0:y=0:enable='between(t,{},{})'{}",
                image.file_name("png"),
                n - 1,
                format_seconds(image.start),
                format_seconds(image.end),
                label(n),
            ));
        }
        output.push('\n');
        output
    }
}

impl MuxAdapter for FiltergraphAdapter {
    fn name(&self) -> &str {
        "filtergraph"
    }

    fn mux(&self, sequence: &RenderedSequence) -> BurnResult<OutputBundle> {
        let pngs = encode_all_png(sequence)?;
        let mut bundle = OutputBundle::new();
        for (image, bytes) in sequence.iter().zip(pngs) {
            bundle.push(join_path(&self.output_dir, &image.file_name("png")), bytes);
        }
        bundle.push_text(join_path(&self.output_dir, GRAPH_FILE), self.graph(sequence));
        Ok(bundle)
    }

    fn preferred_canvas(&self) -> Option<CanvasSize> {
        Some(FULL_HD)
    }
}
