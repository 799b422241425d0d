//! Advanced SubStation Alpha script with embedded picture events.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use burnsub_common::error::BurnResult;
use burnsub_common::timecode::format_centis;
use burnsub_render_engine::{CanvasSize, RenderedSequence};

use crate::adapter::{encode_all_png, MuxAdapter, FULL_HD};
use crate::bundle::OutputBundle;

pub const SCRIPT_FILE: &str = "subtitles.ass";
pub const DEFAULT_TITLE: &str = "Burnsub picture subtitles";

const GRAPHICS_LINE_WIDTH: usize = 80;

#[derive(Debug, Clone)]
pub struct AssAdapter {
    pub title: String,
}

impl Default for AssAdapter {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl AssAdapter {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn script(&self, sequence: &RenderedSequence, pngs: &[Vec<u8>]) -> String {
        let mut output = String::new();

        output.push_str("[Script Info]\n");
        output.push_str(&format!("Title: {}\n", self.title));
        output.push_str("ScriptType: v4.00+\n");
        output.push_str(&format!("PlayResX: {}\n", sequence.canvas.width));
        output.push_str(&format!("PlayResY: {}\n", sequence.canvas.height));
        output.push_str("WrapStyle: 0\n");
        output.push_str("ScaledBorderAndShadow: yes\n\n");

        output.push_str("[V4+ Styles]\n");
        output.push_str(
            "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, \
             BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
             BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n",
        );
        // top-left anchored, no margins: pictures cover the whole frame
        output.push_str(
            "Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,\
             0,0,0,0,100,100,0,0,1,0,0,7,0,0,0,1\n\n",
        );

        output.push_str("[Graphics]\n");
        for (image, png) in sequence.iter().zip(pngs) {
            output.push_str(&format!("filename: {}\n", image.file_name("png")));
            let encoded = STANDARD.encode(png);
            for chunk in encoded.as_bytes().chunks(GRAPHICS_LINE_WIDTH) {
                // base64 output is ASCII
                output.push_str(&String::from_utf8_lossy(chunk));
                output.push('\n');
            }
        }
        output.push('\n');

        output.push_str("[Events]\n");
        output.push_str(
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        );
        for image in sequence.iter() {
            output.push_str(&format!(
                "Picture: 0,{},{},Default,,0,0,0,,{},0,0,100,100,0\n",
                format_centis(image.start),
                format_centis(image.end),
                image.file_name("png"),
            ));
        }
        output
    }
}

impl MuxAdapter for AssAdapter {
    fn name(&self) -> &str {
        "ass"
    }

    fn mux(&self, sequence: &RenderedSequence) -> BurnResult<OutputBundle> {
        let pngs = encode_all_png(sequence)?;
        let mut bundle = OutputBundle::new();
        bundle.push_text(SCRIPT_FILE, self.script(sequence, &pngs));
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
                    bitmap: IndexedBitmap::blank(64, 36),
                    start,
                    end,
                })
                .collect(),
            canvas: FULL_HD,
            frame_rate: 25.0,
            palette: Palette::default(),
            language: "en".into(),
        }
    }

    fn script_for(adapter: &AssAdapter, times: &[(i64, i64)]) -> String {
        let bundle = adapter.mux(&sequence(times)).unwrap();
        bundle.text(SCRIPT_FILE).unwrap().to_string()
    }

    #[test]
    fn test_sections_and_script_info() {
        let script = script_for(&AssAdapter::with_title("My Custom Title"), &[(1_000_000, 4_000_000)]);
        for section in ["[Script Info]", "[V4+ Styles]", "[Graphics]", "[Events]"] {
            assert!(script.contains(section), "missing {section}");
        }
        assert!(script.contains("Title: My Custom Title\n"));
        assert!(script.contains("ScriptType: v4.00+\n"));
        assert!(script.contains("PlayResX: 1920\nPlayResY: 1080\n"));
    }

    #[test]
    fn test_style_has_zero_margins() {
        let script = script_for(&AssAdapter::default(), &[(0, 1)]);
        let style = script.lines().find(|l| l.starts_with("Style: Default")).unwrap();
        assert!(style.ends_with(",0,0,0,1"));
    }

    #[test]
    fn test_graphics_embed_png() {
        let script = script_for(&AssAdapter::default(), &[(1_000_000, 4_000_000)]);
        assert!(script.contains("filename: subtitle0001.png\niVBORw0KGgo"));
        let graphics: Vec<&str> = script
            .lines()
            .skip_while(|l| *l != "[Graphics]")
            .skip(2)
            .take_while(|l| !l.is_empty())
            .collect();
        assert!(graphics.iter().all(|l| l.len() <= GRAPHICS_LINE_WIDTH));
    }

    #[test]
    fn test_picture_events() {
        let script = script_for(
            &AssAdapter::default(),
            &[(1_000_000, 4_000_000), (5_025_670_000, 9_296_780_000)],
        );
        assert!(script.contains(
            "Picture: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,subtitle0001.png,0,0,100,100,0\n"
        ));
        assert!(script.contains("1:23:45.67,2:34:56.78"));
        assert_eq!(script.matches("Picture: 0,").count(), 2);
        assert_eq!(script.matches("filename: subtitle").count(), 2);
    }
}
