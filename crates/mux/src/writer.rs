//! Caption set in, output bundle out.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use burnsub_caption_model::set::CaptionSet;
use burnsub_common::config::OutputDefaults;
use burnsub_common::error::{BurnError, BurnResult};
use burnsub_render_engine::{RenderOptions, Renderer};

use crate::adapter::MuxAdapter;
use crate::ass::AssAdapter;
use crate::bundle::OutputBundle;
use crate::concat::ConcatAdapter;
use crate::dvd::DvdAdapter;
use crate::filtergraph::FiltergraphAdapter;
use crate::ttml::TtmlAdapter;

/// Supported delivery formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuxFormat {
    Dvd,
    Concat,
    Filtergraph,
    Ttml,
    Ass,
}

impl MuxFormat {
    pub const ALL: [MuxFormat; 5] = [
        Self::Dvd,
        Self::Concat,
        Self::Filtergraph,
        Self::Ttml,
        Self::Ass,
    ];

    /// Adapter with default options, TIFF compression taken from `defaults`.
    pub fn adapter(self, defaults: &OutputDefaults) -> Box<dyn MuxAdapter> {
        match self {
            Self::Dvd => Box::new(DvdAdapter::new(defaults.tiff_compression)),
            Self::Concat => Box::new(ConcatAdapter::default()),
            Self::Filtergraph => Box::new(FiltergraphAdapter::default()),
            Self::Ttml => Box::new(TtmlAdapter::default()),
            Self::Ass => Box::new(AssAdapter::default()),
        }
    }
}

impl fmt::Display for MuxFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dvd => "dvd",
            Self::Concat => "concat",
            Self::Filtergraph => "filtergraph",
            Self::Ttml => "ttml",
            Self::Ass => "ass",
        };
        f.write_str(name)
    }
}

impl FromStr for MuxFormat {
    type Err = BurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dvd" | "scenarist" | "sst" => Ok(Self::Dvd),
            "concat" | "ffconcat" => Ok(Self::Concat),
            "filtergraph" => Ok(Self::Filtergraph),
            "ttml" | "imsc" => Ok(Self::Ttml),
            "ass" => Ok(Self::Ass),
            other => Err(BurnError::config(format!(
                "Unknown output format: {other}. Supported: dvd,concat,filtergraph,ttml,ass"
            ))),
        }
    }
}

/// Renders one language of a caption set and hands it to an adapter.
pub struct SubtitleWriter {
    renderer: Renderer,
    adapter: Box<dyn MuxAdapter>,
    options: RenderOptions,
}

impl SubtitleWriter {
    pub fn new(renderer: Renderer, adapter: Box<dyn MuxAdapter>, options: RenderOptions) -> Self {
        Self {
            renderer,
            adapter,
            options,
        }
    }

    pub fn adapter(&self) -> &dyn MuxAdapter {
        self.adapter.as_ref()
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render and mux. With `language` unset the set must hold exactly
    /// one language.
    pub fn write(&self, set: &CaptionSet, language: Option<&str>) -> BurnResult<OutputBundle> {
        let started = Instant::now();
        let language = select_language(set, language)?;

        let sequence = self.renderer.render_set(set, &language, &self.options)?;
        let bundle = self.adapter.mux(&sequence)?;

        tracing::info!(
            format = self.adapter.name(),
            language = %language,
            images = sequence.len(),
            files = bundle.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Wrote subtitles"
        );
        Ok(bundle)
    }
}

fn select_language(set: &CaptionSet, requested: Option<&str>) -> BurnResult<String> {
    if let Some(language) = requested {
        return Ok(language.to_string());
    }
    let languages: Vec<&str> = set.languages().collect();
    match languages.as_slice() {
        [only] => Ok(only.to_string()),
        [] => Err(BurnError::config("Caption set has no languages")),
        many => Err(BurnError::config(format!(
            "Caption set has several languages ({}); pick one",
            many.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnsub_caption_model::caption::{Caption, CaptionList};
    use std::collections::BTreeMap;

    #[test]
    fn test_format_parsing() {
        assert_eq!("DVD".parse::<MuxFormat>().unwrap(), MuxFormat::Dvd);
        assert_eq!("ffconcat".parse::<MuxFormat>().unwrap(), MuxFormat::Concat);
        assert!("srt".parse::<MuxFormat>().is_err());
        for format in MuxFormat::ALL {
            assert_eq!(format.to_string().parse::<MuxFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_adapter_names_match_formats() {
        let defaults = OutputDefaults::default();
        for format in MuxFormat::ALL {
            assert_eq!(format.adapter(&defaults).name(), format.to_string());
        }
    }

    #[test]
    fn test_single_language_is_implicit() {
        let set = CaptionSet::single("en", vec![Caption::from_text(0, 1, "x")]);
        assert_eq!(select_language(&set, None).unwrap(), "en");
        assert_eq!(select_language(&set, Some("fr")).unwrap(), "fr");
    }

    #[test]
    fn test_several_languages_need_a_choice() {
        let mut lists = BTreeMap::new();
        lists.insert("en".to_string(), CaptionList::default());
        lists.insert("fr".to_string(), CaptionList::default());
        let set = CaptionSet::new(lists);
        let err = select_language(&set, None).unwrap_err();
        assert!(matches!(err, BurnError::Config { .. }));
        assert!(err.to_string().contains("en, fr"));

        assert!(select_language(&CaptionSet::default(), None).is_err());
    }
}
