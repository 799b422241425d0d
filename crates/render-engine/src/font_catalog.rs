//! Language-aware font selection and glyph-coverage checks.
//!
//! The catalog is an ordered table of language tag -> font asset with an
//! optional alignment override. A request is matched against every entry
//! by language distance; the nearest related entry wins, earlier entries
//! win ties.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use burnsub_caption_model::grouping::CaptionGroup;
use burnsub_common::config::{Align, FontCatalogConfig};
use burnsub_common::error::{BurnError, BurnResult, MissingGlyph};
use unic_langid::LanguageIdentifier;

use crate::font::{GlyphFont, TrueTypeFont};

/// Distances at or above this mean "unrelated language".
pub const UNRELATED_DISTANCE: u32 = 100;

const LANGUAGE_MISMATCH: u32 = 134;
const SCRIPT_MISMATCH: u32 = 50;
const REGION_MISMATCH: u32 = 4;

/// Directional formatting characters that never need a glyph.
pub const BIDI_CONTROLS: [char; 7] = [
    '\u{202A}', // LRE
    '\u{202B}', // RLE
    '\u{202C}', // PDF
    '\u{202D}', // LRO
    '\u{202E}', // RLO
    '\u{200E}', // LRM
    '\u{200F}', // RLM
];

/// Where a catalog entry's font comes from.
#[derive(Clone)]
pub enum FontAsset {
    /// Loaded on demand.
    File(PathBuf),
    /// Already in memory.
    Loaded(Arc<dyn GlyphFont>),
}

impl FontAsset {
    pub fn load(&self) -> BurnResult<Arc<dyn GlyphFont>> {
        match self {
            Self::File(path) => Ok(Arc::new(TrueTypeFont::from_file(path)?)),
            Self::Loaded(font) => Ok(Arc::clone(font)),
        }
    }
}

impl fmt::Debug for FontAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Loaded(_) => f.write_str("Loaded(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FontEntry {
    pub tag: String,
    pub asset: FontAsset,
    pub align: Option<Align>,
}

/// Outcome of resolving a language against the catalog.
#[derive(Debug, Clone)]
pub struct ResolvedFont<'a> {
    pub entry: &'a FontEntry,
    pub distance: u32,
    /// Entry override, else the caller's default.
    pub align: Align,
}

#[derive(Debug, Clone, Default)]
pub struct FontCatalog {
    entries: Vec<FontEntry>,
}

impl FontCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog of on-disk fonts from configuration.
    pub fn from_config(config: &FontCatalogConfig) -> Self {
        let mut catalog = Self::new();
        for entry in &config.entries {
            catalog.push(
                entry.tag.clone(),
                FontAsset::File(config.resolve_path(entry)),
                entry.align,
            );
        }
        catalog
    }

    pub fn push(&mut self, tag: impl Into<String>, asset: FontAsset, align: Option<Align>) {
        self.entries.push(FontEntry {
            tag: tag.into(),
            asset,
            align,
        });
    }

    pub fn entries(&self) -> &[FontEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Related entries sorted by ascending distance (stable on ties).
    pub fn candidates(&self, language: &str) -> BurnResult<Vec<(u32, &FontEntry)>> {
        let requested = parse_tag(language).ok_or_else(|| BurnError::NoSuitableFont {
            language: language.to_string(),
        })?;

        let mut candidates: Vec<(u32, &FontEntry)> = self
            .entries
            .iter()
            .filter_map(|entry| match parse_tag(&entry.tag) {
                Some(tag) => Some((language_distance(&requested, &tag), entry)),
                None => {
                    tracing::warn!(tag = %entry.tag, "Skipping font entry with invalid language tag");
                    None
                }
            })
            .filter(|(distance, _)| *distance < UNRELATED_DISTANCE)
            .collect();

        candidates.sort_by_key(|(distance, _)| *distance);
        Ok(candidates)
    }

    /// Pick the nearest entry for `language`.
    pub fn resolve(&self, language: &str, default_align: Align) -> BurnResult<ResolvedFont<'_>> {
        let (distance, entry) = self
            .candidates(language)?
            .into_iter()
            .next()
            .ok_or_else(|| BurnError::NoSuitableFont {
                language: language.to_string(),
            })?;

        let align = entry.align.unwrap_or(default_align);
        tracing::info!(
            requested = language,
            chosen = %entry.tag,
            distance,
            align = %align,
            "Resolved font"
        );
        Ok(ResolvedFont {
            entry,
            distance,
            align,
        })
    }
}

fn parse_tag(tag: &str) -> Option<LanguageIdentifier> {
    tag.trim().replace('_', "-").parse().ok()
}

/// Distance between two language tags after filling in likely subtags.
///
/// 0 for identical, small values for regional variants, about 50 for a
/// different script, and at least [`UNRELATED_DISTANCE`] for a different
/// language.
pub fn language_distance(desired: &LanguageIdentifier, supported: &LanguageIdentifier) -> u32 {
    let mut desired = desired.clone();
    let mut supported = supported.clone();
    desired.maximize();
    supported.maximize();

    if desired.language != supported.language {
        return LANGUAGE_MISMATCH;
    }

    let mut distance = 0;
    if let (Some(a), Some(b)) = (desired.script, supported.script) {
        if a != b {
            distance += SCRIPT_MISMATCH;
        }
    }
    if let (Some(a), Some(b)) = (desired.region, supported.region) {
        if a != b {
            distance += REGION_MISMATCH;
        }
    }
    distance
}

/// Characters used by `groups` that `font` cannot draw, in code-point order,
/// each with the starts of the cues using it.
pub fn find_missing_glyphs(font: &dyn GlyphFont, groups: &[CaptionGroup]) -> Vec<MissingGlyph> {
    let mut used: BTreeMap<char, Vec<i64>> = BTreeMap::new();
    for caption in groups.iter().flat_map(|group| &group.captions) {
        for c in caption.text().chars().filter(|c| !c.is_whitespace()) {
            let starts = used.entry(c).or_default();
            if starts.last() != Some(&caption.start) {
                starts.push(caption.start);
            }
        }
    }

    used.into_iter()
        .filter(|(c, _)| !BIDI_CONTROLS.contains(c) && !font.has_glyph(*c))
        .map(|(character, cue_starts_us)| MissingGlyph {
            character,
            cue_starts_us,
        })
        .collect()
}

/// Fail with `MissingGlyphs` unless `font` covers every character in `groups`.
pub fn check_glyph_coverage(font: &dyn GlyphFont, groups: &[CaptionGroup]) -> BurnResult<()> {
    let glyphs = find_missing_glyphs(font, groups);
    if glyphs.is_empty() {
        tracing::debug!(groups = groups.len(), "Glyph coverage complete");
        return Ok(());
    }
    tracing::warn!(missing = glyphs.len(), "Selected font is missing glyphs");
    Err(BurnError::MissingGlyphs { glyphs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnsub_caption_model::caption::Caption;
    use burnsub_caption_model::grouping::group_captions;
    use image::{Rgb, RgbImage};

    struct AsciiFont;

    impl GlyphFont for AsciiFont {
        fn has_glyph(&self, c: char) -> bool {
            c.is_ascii()
        }
        fn line_height(&self, px: f32) -> u32 {
            px as u32
        }
        fn text_width(&self, px: f32, text: &str) -> u32 {
            (text.chars().count() as f32 * px * 0.5) as u32
        }
        fn draw_text(&self, _: &mut RgbImage, _: Rgb<u8>, _: i32, _: i32, _: f32, _: &str) {}
    }

    fn tag(s: &str) -> LanguageIdentifier {
        s.parse().unwrap()
    }

    fn ascii() -> FontAsset {
        FontAsset::Loaded(Arc::new(AsciiFont))
    }

    fn default_catalog() -> FontCatalog {
        FontCatalog::from_config(&FontCatalogConfig::default())
    }

    #[test]
    fn test_distance_identical_and_implied_subtags() {
        assert_eq!(language_distance(&tag("en"), &tag("en")), 0);
        assert_eq!(language_distance(&tag("ja"), &tag("ja-JP")), 0);
        assert_eq!(language_distance(&tag("zh"), &tag("zh-CN")), 0);
    }

    #[test]
    fn test_distance_region_and_script() {
        assert_eq!(language_distance(&tag("en-GB"), &tag("en")), REGION_MISMATCH);
        assert_eq!(language_distance(&tag("zh-HK"), &tag("zh-TW")), REGION_MISMATCH);
        assert!(language_distance(&tag("zh-HK"), &tag("zh-CN")) >= SCRIPT_MISMATCH);
        assert!(language_distance(&tag("fr"), &tag("en")) >= UNRELATED_DISTANCE);
    }

    #[test]
    fn test_resolve_default_table() {
        let catalog = default_catalog();

        let en = catalog.resolve("en-US", Align::Center).unwrap();
        assert_eq!(en.entry.tag, "en");
        assert_eq!(en.align, Align::Center);

        let he = catalog.resolve("he", Align::Center).unwrap();
        assert_eq!(he.align, Align::Right);

        let hk = catalog.resolve("zh-HK", Align::Left).unwrap();
        assert_eq!(hk.entry.tag, "zh-TW");

        let zh = catalog.resolve("zh", Align::Left).unwrap();
        assert_eq!(zh.entry.tag, "zh-CN");
    }

    #[test]
    fn test_resolve_unrelated_language_fails() {
        let err = default_catalog().resolve("pt-BR", Align::Center).unwrap_err();
        assert!(matches!(err, BurnError::NoSuitableFont { language } if language == "pt-BR"));
    }

    #[test]
    fn test_resolve_is_deterministic_and_ties_follow_catalog_order() {
        let mut catalog = FontCatalog::new();
        catalog.push("en", FontAsset::File("first.ttf".into()), None);
        catalog.push("en", FontAsset::File("second.ttf".into()), Some(Align::Left));
        for _ in 0..5 {
            let resolved = catalog.resolve("en", Align::Center).unwrap();
            assert!(matches!(&resolved.entry.asset, FontAsset::File(p) if p.ends_with("first.ttf")));
            assert_eq!(resolved.align, Align::Center);
        }
    }

    #[test]
    fn test_invalid_catalog_tags_are_skipped() {
        let mut catalog = FontCatalog::new();
        catalog.push("!!", ascii(), None);
        catalog.push("en", ascii(), None);
        assert_eq!(catalog.candidates("en").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_glyphs_listed_with_cue_starts() {
        let cues = vec![
            Caption::from_text(0, 1_000_000, "Привет"),
            Caption::from_text(2_000_000, 3_000_000, "Пока ok"),
        ];
        let groups = group_captions(&cues).unwrap();
        let missing = find_missing_glyphs(&AsciiFont, &groups);
        let p = missing.iter().find(|g| g.character == 'П').unwrap();
        assert_eq!(p.cue_starts_us, vec![0, 2_000_000]);
        assert!(missing.iter().all(|g| !g.character.is_ascii()));
    }

    #[test]
    fn test_bidi_controls_always_covered() {
        let text: String = BIDI_CONTROLS.iter().chain(['a'].iter()).collect();
        let groups = group_captions(&[Caption::from_text(0, 1, text)]).unwrap();
        assert!(check_glyph_coverage(&AsciiFont, &groups).is_ok());
    }

    #[test]
    fn test_coverage_error_names_every_character() {
        let groups = group_captions(&[Caption::from_text(0, 1, "a ж 中")]).unwrap();
        let err = check_glyph_coverage(&AsciiFont, &groups).unwrap_err();
        assert_eq!(err.to_string(), "Selected font was missing glyphs: ж 中");
    }
}
