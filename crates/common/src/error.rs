//! Error types shared across Burnsub crates.

use std::fmt;

/// A character the selected font cannot render, with every cue start
/// (microseconds) that uses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingGlyph {
    pub character: char,
    pub cue_starts_us: Vec<i64>,
}

impl fmt::Display for MissingGlyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.character)
    }
}

/// Top-level error type for Burnsub operations.
///
/// Every variant is local to one write; nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum BurnError {
    #[error("Unsupported subtitles: overlapping cues with different end times at {start_us}us")]
    Overlap { start_us: i64 },

    #[error("Cannot find appropriate font for language {language}")]
    NoSuitableFont { language: String },

    #[error("Selected font was missing glyphs: {}", join_glyphs(.glyphs))]
    MissingGlyphs { glyphs: Vec<MissingGlyph> },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Unknown position: {value}. Supported: top,bottom,source")]
    UnknownPosition { value: String },

    #[error("Unknown alignment: {value}. Supported: left,center,right")]
    UnknownAlignment { value: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Font error: {message}")]
    Font { message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    #[error("Caption error: {message}")]
    Caption { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using BurnError.
pub type BurnResult<T> = Result<T, BurnError>;

fn join_glyphs(glyphs: &[MissingGlyph]) -> String {
    glyphs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

impl BurnError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn caption(msg: impl Into<String>) -> Self {
        Self::Caption {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_glyphs_message_lists_every_character() {
        let err = BurnError::MissingGlyphs {
            glyphs: vec![
                MissingGlyph {
                    character: 'ж',
                    cue_starts_us: vec![0],
                },
                MissingGlyph {
                    character: '中',
                    cue_starts_us: vec![1_000_000, 2_000_000],
                },
            ],
        };
        assert_eq!(err.to_string(), "Selected font was missing glyphs: ж 中");
    }

    #[test]
    fn test_overlap_message_names_start() {
        let err = BurnError::Overlap { start_us: 1_500_000 };
        assert!(err.to_string().contains("1500000us"));
    }
}
