//! Render a caption set and write the bundle.

use std::path::PathBuf;

use burnsub_common::config::{Align, AppConfig, Position};
use burnsub_mux::{MuxFormat, SubtitleWriter};
use burnsub_render_engine::{RenderOptions, Renderer};
use clap::Args;

#[derive(Args)]
pub struct RenderArgs {
    /// Caption set JSON file
    input: PathBuf,

    /// Output format: dvd|concat|filtergraph|ttml|ass
    #[arg(short, long)]
    format: String,

    /// Output directory (must not exist, or be empty)
    #[arg(short, long)]
    output: PathBuf,

    /// Language to render; required when the set has several
    #[arg(short, long)]
    lang: Option<String>,

    /// Anchor: top|bottom|source
    #[arg(long)]
    position: Option<String>,

    /// Line alignment: left|center|right
    #[arg(long)]
    align: Option<String>,

    /// Canvas width
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height
    #[arg(long)]
    height: Option<u32>,

    /// Frame rate
    #[arg(long)]
    fps: Option<f64>,

    /// Push touching cues one frame apart
    #[arg(long)]
    avoid_overlap: bool,
}

pub fn run(args: RenderArgs, config: &AppConfig) -> anyhow::Result<()> {
    let format: MuxFormat = args.format.parse()?;
    let adapter = format.adapter(&config.output);

    let mut options = RenderOptions::from(&config.output);
    if args.width.is_none() && args.height.is_none() {
        if let Some(canvas) = adapter.preferred_canvas() {
            options.width = canvas.width;
            options.height = canvas.height;
        }
    }
    if let Some(width) = args.width {
        options.width = width;
    }
    if let Some(height) = args.height {
        options.height = height;
    }
    if let Some(fps) = args.fps {
        options.frame_rate = fps;
    }
    if let Some(position) = &args.position {
        options.position = position.parse::<Position>()?;
    }
    if let Some(align) = &args.align {
        options.align = align.parse::<Align>()?;
    }
    options.avoid_same_next_start_prev_end |= args.avoid_overlap;
    options.validate()?;

    let mut set = super::load_captions(&args.input)?;
    set.relativize(options.width, options.height, true);

    println!("Rendering {} as {format}", args.input.display());
    println!(
        "  Canvas: {}x{} @ {}fps, position {}, align {}",
        options.width, options.height, options.frame_rate, options.position, options.align
    );

    let writer = SubtitleWriter::new(Renderer::from_config(config), adapter, options);
    let bundle = writer.write(&set, args.lang.as_deref())?;
    let dest = bundle.write_to_dir(&args.output)?;

    println!("Wrote {} file(s) to {}", bundle.len(), dest.display());
    for path in bundle.paths() {
        println!("  {path}");
    }
    Ok(())
}
