//! ffmpeg concat-demuxer script sequencing blank and subtitle frames.
//!
//! ```text
//! ffmpeg -f concat -safe 0 -i embedded_subs/concat.txt ...
//! ```

use burnsub_common::error::BurnResult;
use burnsub_common::timecode::format_seconds;
use burnsub_render_engine::{encode_png, CanvasSize, RenderedSequence};

use crate::adapter::{encode_all_png, join_path, MuxAdapter, FULL_HD};
use crate::bundle::OutputBundle;

pub const DEFAULT_DIR: &str = "embedded_subs";
pub const BLANK_FILE: &str = "blank.png";
pub const SCRIPT_FILE: &str = "concat.txt";

#[derive(Debug, Clone)]
pub struct ConcatAdapter {
    /// Directory inside the bundle holding the script and images.
    pub output_dir: String,
}

impl Default for ConcatAdapter {
    fn default() -> Self {
        Self {
            output_dir: DEFAULT_DIR.to_string(),
        }
    }
}

impl ConcatAdapter {
    /// The script text. Gaps between groups are filled with the blank
    /// frame; a final blank stops the last subtitle from persisting.
    pub fn script(&self, sequence: &RenderedSequence) -> String {
        let mut lines = vec!["ffconcat version 1.0".to_string()];
        let mut prev_end = 0;
        for image in sequence.iter() {
            let gap = image.start - prev_end;
            if gap > 0 {
                lines.push(format!("file {BLANK_FILE}"));
                lines.push(format!("duration {}", format_seconds(gap)));
            }
            lines.push(format!("file {}", image.file_name("png")));
            lines.push(format!("duration {}", format_seconds(image.end - image.start)));
            prev_end = image.end;
        }
        lines.push(format!("file {BLANK_FILE}"));
        lines.join("\n")
    }
}

impl MuxAdapter for ConcatAdapter {
    fn name(&self) -> &str {
        "concat"
    }

    fn mux(&self, sequence: &RenderedSequence) -> BurnResult<OutputBundle> {
        let pngs = encode_all_png(sequence)?;
        let blank = encode_png(&sequence.blank(), &sequence.palette)?;

        let mut bundle = OutputBundle::new();
        for (image, bytes) in sequence.iter().zip(pngs) {
            bundle.push(join_path(&self.output_dir, &image.file_name("png")), bytes);
        }
        bundle.push(join_path(&self.output_dir, BLANK_FILE), blank);
        bundle.push_text(join_path(&self.output_dir, SCRIPT_FILE), self.script(sequence));
        Ok(bundle)
    }

    fn preferred_canvas(&self) -> Option<CanvasSize> {
        Some(FULL_HD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnsub_render_engine::{IndexedBitmap, Palette, RenderedImage};

    fn sequence(times: &[(i64, i64)]) -> RenderedSequence {
        RenderedSequence {
            images: times
                .iter()
                .enumerate()
                .map(|(i, &(start, end))| RenderedImage {
                    index: i + 1,
                    bitmap: IndexedBitmap::blank(8, 8),
                    start,
                    end,
                })
                .collect(),
            canvas: CanvasSize::new(8, 8),
            frame_rate: 25.0,
            palette: Palette::default(),
            language: "en".into(),
        }
    }

    #[test]
    fn test_back_to_back_has_no_inner_filler() {
        let script = ConcatAdapter::default().script(&sequence(&[(0, 3_000_000), (3_000_000, 6_000_000)]));
        assert_eq!(
            script,
            "ffconcat version 1.0\n\
             file subtitle0001.png\nduration 3.000\n\
             file subtitle0002.png\nduration 3.000\n\
             file blank.png"
        );
    }

    #[test]
    fn test_gaps_get_filler() {
        let script = ConcatAdapter::default().script(&sequence(&[(500_000, 1_000_000), (2_250_000, 3_000_000)]));
        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(
            lines,
            vec![
                "ffconcat version 1.0",
                "file blank.png",
                "duration 0.500",
                "file subtitle0001.png",
                "duration 0.500",
                "file blank.png",
                "duration 1.250",
                "file subtitle0002.png",
                "duration 0.750",
                "file blank.png",
            ]
        );
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(
            ConcatAdapter::default().script(&sequence(&[])),
            "ffconcat version 1.0\nfile blank.png"
        );
    }

    #[test]
    fn test_bundle_layout() {
        let bundle = ConcatAdapter::default().mux(&sequence(&[(0, 1_000_000)])).unwrap();
        let paths: Vec<&str> = bundle.paths().collect();
        assert_eq!(
            paths,
            vec![
                "embedded_subs/subtitle0001.png",
                "embedded_subs/blank.png",
                "embedded_subs/concat.txt",
            ]
        );
        assert!(bundle.get("embedded_subs/blank.png").unwrap().starts_with(b"\x89PNG"));
    }
}
