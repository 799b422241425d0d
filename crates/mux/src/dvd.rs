//! Scenarist DVD subtitle descriptor (`.sst`) with TIFF frames.

use std::fmt;

use burnsub_common::config::TiffCompression;
use burnsub_common::error::BurnResult;
use burnsub_common::timecode::format_frame_timecode;
use burnsub_render_engine::{encode_tiff, Palette, RenderedSequence};
use rayon::prelude::*;

use crate::adapter::MuxAdapter;
use crate::bundle::OutputBundle;

pub const DESCRIPTOR_FILE: &str = "subtitles.sst";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TapeType {
    #[default]
    NonDrop,
    Drop,
}

impl fmt::Display for TapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonDrop => write!(f, "NON_DROP"),
            Self::Drop => write!(f, "DROP"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DvdAdapter {
    pub tape_type: TapeType,
    /// Older authoring tools expect 1-based colour slots and a
    /// transparent fourth contrast.
    pub compat: bool,
    pub tiff_compression: TiffCompression,
}

impl DvdAdapter {
    pub fn new(tiff_compression: TiffCompression) -> Self {
        Self {
            tiff_compression,
            ..Self::default()
        }
    }

    fn color_and_contrast(&self) -> (&'static str, &'static str) {
        if self.compat {
            ("(1 2 3 4)", "(15 15 15 0)")
        } else {
            ("(0 1 2 3)", "(7 7 7 7)")
        }
    }

    /// The complete `.sst` text.
    pub fn descriptor(&self, sequence: &RenderedSequence) -> String {
        let mut output = self.header(sequence);
        for image in sequence.iter() {
            output.push_str(&format!(
                "{:04} {} {} {}\n",
                image.index,
                format_frame_timecode(image.start, sequence.frame_rate),
                format_frame_timecode(image.end, sequence.frame_rate),
                image.file_name("tif"),
            ));
        }
        output
    }

    fn header(&self, sequence: &RenderedSequence) -> String {
        let width = sequence.canvas.width;
        let height = sequence.canvas.height;
        let (color, contrast) = self.color_and_contrast();
        let palette = &sequence.palette;

        let mut output = String::new();
        output.push_str("st_format 2\n");
        output.push_str("SubTitle\tFace_Painting\n");
        output.push_str(&format!("Tape_Type\t{}\n", self.tape_type));
        output.push_str("Display_Start\tnon_forced\n");
        output.push_str(&format!("Pixel_Area\t(2 {})\n", height.saturating_sub(1)));
        output.push_str(&format!(
            "Display_Area\t(0 2 {} {})\n",
            width.saturating_sub(1),
            height.saturating_sub(1)
        ));
        output.push_str(&format!("Color\t{color}\n"));
        output.push_str(&format!("Contrast\t{contrast}\n"));
        for (label, index) in [
            ("BG", Palette::TRANSPARENT),
            ("PA", Palette::FILL),
            ("E1", Palette::ANTIALIAS),
            ("E2", Palette::BORDER),
        ] {
            let [r, g, b] = palette.color(index).0;
            output.push_str(&format!("{label}\t({r} {g} {b} = = =)\n"));
        }
        output.push_str("directory\tC:\\\n");
        output.push_str("Base_Time\t00:00:00:00\n");
        output.push_str(&"#".repeat(48));
        output.push('\n');
        output.push_str("SP_NUMBER START END FILE_NAME\n");
        output
    }
}

impl MuxAdapter for DvdAdapter {
    fn name(&self) -> &str {
        "dvd"
    }

    fn mux(&self, sequence: &RenderedSequence) -> BurnResult<OutputBundle> {
        let frames: Vec<Vec<u8>> = sequence
            .images
            .par_iter()
            .map(|image| encode_tiff(&image.bitmap, &sequence.palette, self.tiff_compression))
            .collect::<BurnResult<_>>()?;

        let mut bundle = OutputBundle::new();
        bundle.push_text(DESCRIPTOR_FILE, self.descriptor(sequence));
        for (image, bytes) in sequence.iter().zip(frames) {
            bundle.push(image.file_name("tif"), bytes);
        }
        tracing::debug!(frames = sequence.len(), tape_type = %self.tape_type, "Muxed DVD descriptor");
        Ok(bundle)
    }
}
