//! IMSC1 image-profile TTML, one background image per group.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use burnsub_common::error::BurnResult;
use burnsub_common::timecode::format_clock_millis;
use burnsub_render_engine::RenderedSequence;

use crate::adapter::{encode_all_png, MuxAdapter};
use crate::bundle::OutputBundle;

pub const DOCUMENT_FILE: &str = "subtitles.ttml";

/// Where the images live relative to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageMode {
    /// Base64 `<smpte:image>` elements in the head metadata.
    #[default]
    Inline,
    /// Separate `subtitleNNNN.png` files next to the document.
    Referenced,
}

#[derive(Debug, Clone, Default)]
pub struct TtmlAdapter {
    pub image_mode: ImageMode,
}

impl TtmlAdapter {
    /// Build the document. `pngs` must hold one encoded image per group
    /// when images are inline; it is ignored otherwise.
    pub fn document(&self, sequence: &RenderedSequence, pngs: &[Vec<u8>]) -> String {
        let mut output = String::new();
        output.push_str("<?xml version='1.0' encoding='UTF-8'?>\n");
        output.push_str("<tt xmlns:itts=\"http://www.w3.org/ns/ttml/profile/imsc1#styling\"\n");
        output.push_str("    xmlns:ittp=\"http://www.w3.org/ns/ttml/profile/imsc1#parameter\"\n");
        output.push_str("    xmlns:ittm=\"http://www.w3.org/ns/ttml/profile/imsc1#metadata\"\n");
        output.push_str("    xmlns:ttm=\"http://www.w3.org/ns/ttml#metadata\"\n");
        output.push_str("    xmlns:tts=\"http://www.w3.org/ns/ttml#styling\"\n");
        output.push_str("    xmlns:ttp=\"http://www.w3.org/ns/ttml#parameter\"\n");
        output.push_str("    xmlns:smpte=\"http://www.smpte-ra.org/schemas/2052-1/2010/smpte-tt\"\n");
        output.push_str("    xmlns=\"http://www.w3.org/ns/ttml\"\n");
        output.push_str("    xmlns:tt=\"http://www.w3.org/ns/ttml\"\n");
        output.push_str(&format!(
            "    xml:lang=\"{}\" tts:extent=\"{}px {}px\"\n",
            escape_attr(&sequence.language),
            sequence.canvas.width,
            sequence.canvas.height
        ));
        output.push_str("    ttp:profile=\"http://www.w3.org/ns/ttml/profile/imsc1/image\"\n");
        output.push_str("    ittp:activeArea=\"100% 100% 100% 100%\">\n");
        output.push_str("<head>\n");
        output.push_str("    <layout>\n");
        output.push_str(
            "        <region xml:id=\"r1\" tts:origin=\"0% 0%\" tts:extent=\"100% 100%\" \
             tts:showBackground=\"always\" tts:textAlign=\"left\" tts:displayAlign=\"before\" />\n",
        );
        output.push_str("    </layout>\n");
        output.push_str("    <metadata>\n");
        if self.image_mode == ImageMode::Inline {
            for (image, png) in sequence.iter().zip(pngs) {
                output.push_str(&format!(
                    "<smpte:image imageType=\"PNG\" encoding=\"Base64\" xml:id=\"img_{}\">{}</smpte:image>\n",
                    image.index,
                    STANDARD.encode(png)
                ));
            }
        }
        output.push_str("    </metadata>\n");
        output.push_str("</head>\n");
        output.push_str("<body>\n");
        for image in sequence.iter() {
            let background = match self.image_mode {
                ImageMode::Inline => format!("#img_{}", image.index),
                ImageMode::Referenced => image.file_name("png"),
            };
            output.push_str(&format!(
                "<div region=\"r1\" begin=\"{}\" end=\"{}\" smpte:backgroundImage=\"{}\"/>\n",
                format_clock_millis(image.start),
                format_clock_millis(image.end),
                background
            ));
        }
        output.push_str("</body>\n");
        output.push_str("</tt>");
        output
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

impl MuxAdapter for TtmlAdapter {
    fn name(&self) -> &str {
        "ttml"
    }

    fn mux(&self, sequence: &RenderedSequence) -> BurnResult<OutputBundle> {
        let pngs = encode_all_png(sequence)?;
        let mut bundle = OutputBundle::new();
        bundle.push_text(DOCUMENT_FILE, self.document(sequence, &pngs));
        if self.image_mode == ImageMode::Referenced {
            for (image, bytes) in sequence.iter().zip(pngs) {
                bundle.push(image.file_name("png"), bytes);
            }
        }
        Ok(bundle)
    }
}
