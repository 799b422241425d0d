//! Burnsub CLI: burn caption sets into image subtitle deliverables.
//!
//! Usage:
//!   burnsub render <CAPTIONS> --format <FMT> --output <DIR>   Render and mux
//!   burnsub validate <CAPTIONS>                               Check timing
//!   burnsub fonts <LANG>                                      Show font choice

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "burnsub",
    about = "Render captions into DVD, ffmpeg, TTML and ASS image subtitles",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a caption set and write one delivery format
    Render(commands::render::RenderArgs),

    /// Check a caption set for overlapping cues
    Validate {
        /// Caption set JSON file
        input: PathBuf,
    },

    /// Show which catalog font a language resolves to
    Fonts {
        /// BCP-47 language tag
        language: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => burnsub_common::config::AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => burnsub_common::config::AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    burnsub_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Render(args) => commands::render::run(args, &config),
        Commands::Validate { input } => commands::validate::run(input),
        Commands::Fonts { language } => commands::fonts::run(language, &config),
    }
}
