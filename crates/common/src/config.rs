//! Application configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BurnError, BurnResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default rendering parameters.
    pub output: OutputDefaults,

    /// Language to font table.
    pub fonts: FontCatalogConfig,

    /// Four-entry rendering palette.
    pub palette: PaletteConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Where a group of cues is anchored on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Position {
    Top,
    #[default]
    Bottom,
    /// Use each cue's own percentage layout origin.
    Source,
}

impl FromStr for Position {
    type Err = BurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "source" => Ok(Self::Source),
            _ => Err(BurnError::UnknownPosition {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Position {
    type Error = BurnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Source => "source",
        })
    }
}

/// Horizontal alignment of lines inside a cue's text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl FromStr for Align {
    type Err = BurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(BurnError::UnknownAlignment {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Align {
    type Error = BurnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        })
    }
}

/// What to do with cues whose start was pushed onto their end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZeroDurationPolicy {
    /// Render them; they get an image and a zero-length timing entry.
    #[default]
    Keep,
    /// Remove them before images are numbered.
    Drop,
}

/// Compression used for TIFF subtitle frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TiffCompression {
    None,
    Lzw,
    #[default]
    Deflate,
    Packbits,
}

impl FromStr for TiffCompression {
    type Err = BurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "raw" => Ok(Self::None),
            "lzw" | "tiff_lzw" => Ok(Self::Lzw),
            "deflate" | "tiff_deflate" => Ok(Self::Deflate),
            "packbits" => Ok(Self::Packbits),
            other => Err(BurnError::config(format!(
                "Unknown TIFF compression: {other}"
            ))),
        }
    }
}

/// Default rendering parameters shared by every adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputDefaults {
    /// Canvas width in pixels.
    pub width: u32,

    /// Canvas height in pixels.
    pub height: u32,

    /// Frame rate used by frame-based timecodes and the overlap nudge.
    pub frame_rate: f64,

    /// Anchor mode.
    pub position: Position,

    /// Line alignment used when the font catalog has no override.
    pub align: Align,

    /// Push a group's start one frame past the previous end when they touch.
    pub avoid_same_next_start_prev_end: bool,

    /// Font pixel size as a fraction of canvas width.
    pub font_scale: f64,

    /// Handling of zero-length cues.
    pub zero_duration: ZeroDurationPolicy,

    /// Compression for TIFF frames.
    pub tiff_compression: TiffCompression,
}

impl Default for OutputDefaults {
    fn default() -> Self {
        Self {
            width: 720,
            height: 480,
            frame_rate: 25.0,
            position: Position::Bottom,
            align: Align::Center,
            avoid_same_next_start_prev_end: false,
            font_scale: 0.03,
            zero_duration: ZeroDurationPolicy::Keep,
            tiff_compression: TiffCompression::Deflate,
        }
    }
}

impl OutputDefaults {
    /// Reject values that would make every render fail later.
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
        if !(self.font_scale.is_finite() && self.font_scale > 0.0) {
            return Err(BurnError::config(format!(
                "Font scale must be positive, got {}",
                self.font_scale
            )));
        }
        Ok(())
    }
}

/// One row of the language to font table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontEntryConfig {
    /// BCP-47 language tag.
    pub tag: String,

    /// Font file, relative to the catalog directory unless absolute.
    pub file: PathBuf,

    /// Alignment forced for this language (e.g. right for RTL scripts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

impl FontEntryConfig {
    fn new(tag: &str, file: &str, align: Option<Align>) -> Self {
        Self {
            tag: tag.to_string(),
            file: PathBuf::from(file),
            align,
        }
    }
}

/// Font catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontCatalogConfig {
    /// Directory font files are resolved against.
    pub directory: PathBuf,

    /// Ordered entries; earlier entries win distance ties.
    pub entries: Vec<FontEntryConfig>,
}

impl Default for FontCatalogConfig {
    fn default() -> Self {
        let right = Some(Align::Right);
        Self {
            directory: default_fonts_dir(),
            entries: vec![
                FontEntryConfig::new("en", "NotoSansDisplay-Regular-Note-Math.ttf", None),
                FontEntryConfig::new("ru", "NotoSansDisplay-Regular-Note-Math.ttf", None),
                FontEntryConfig::new("ar", "NotoSansDisplay-RegularAndArabic.ttf", right),
                FontEntryConfig::new("he", "NotoSansHebrew-Regular.ttf", right),
                FontEntryConfig::new("hi", "NotoSansDevanagari-Regular.ttf", None),
                FontEntryConfig::new("ja-JP", "NotoSansJP+Math-Regular.ttf", None),
                FontEntryConfig::new("zh-TW", "NotoSansTC+Math-Regular.ttf", None),
                FontEntryConfig::new("zh-CN", "NotoSansSC+Math-Regular.ttf", None),
                FontEntryConfig::new("ko-KR", "NotoSansKR+Math-Regular.ttf", None),
                FontEntryConfig::new("th", "NotoSansThai-Regular.ttf", None),
            ],
        }
    }
}

impl FontCatalogConfig {
    /// Absolute path of an entry's font file.
    pub fn resolve_path(&self, entry: &FontEntryConfig) -> PathBuf {
        if entry.file.is_absolute() {
            entry.file.clone()
        } else {
            self.directory.join(&entry.file)
        }
    }
}

/// Palette colours as RGB triples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Letter body.
    pub fill: [u8; 3],
    /// Antialiasing between body and border.
    pub antialias: [u8; 3],
    /// Outline.
    pub border: [u8; 3],
    /// Background; becomes the transparency key.
    pub background: [u8; 3],
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            fill: [255, 255, 255],
            antialias: [190, 190, 190],
            border: [0, 0, 0],
            background: [0, 255, 0],
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "burnsub=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit file. Unlike [`AppConfig::load`] this fails loudly.
    pub fn load_from(path: impl AsRef<Path>) -> BurnResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.output.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(config_file_path())
    }

    /// Save config to an explicit file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    xdg_base("XDG_CONFIG_HOME", ".config")
        .join("burnsub")
        .join("config.json")
}

/// Default font directory.
fn default_fonts_dir() -> PathBuf {
    xdg_base("XDG_DATA_HOME", ".local/share")
        .join("burnsub")
        .join("fonts")
}

fn xdg_base(var: &str, home_fallback: &str) -> PathBuf {
    std::env::var(var).map(PathBuf::from).unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(home_fallback)
    })
}
