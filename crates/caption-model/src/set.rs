//! Per-language caption collections and their maintenance operations.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use burnsub_common::timecode::Microseconds;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::caption::{Caption, CaptionError, CaptionList, StyleRules};
use crate::grouping::{gap_adjusted_start, group_indices_by_start, merge_group};
use crate::layout::Layout;

fn compile(pattern: &str, desc: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid {desc} regex: {err}"))
}

fn html_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| compile(r"<[^>]+>", "html tag"))
}

fn ass_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| compile(r"\{[^}]+\}", "ass override"))
}

/// Captions for every language, plus shared styles and layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionSet {
    /// Language tag -> cue list.
    #[serde(default)]
    captions: BTreeMap<String, CaptionList>,

    /// Selector -> rules.
    #[serde(default)]
    pub styles: BTreeMap<String, StyleRules>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

impl CaptionSet {
    pub fn new(captions: BTreeMap<String, CaptionList>) -> Self {
        Self {
            captions,
            ..Self::default()
        }
    }

    /// A set holding a single language.
    pub fn single(language: impl Into<String>, captions: impl Into<CaptionList>) -> Self {
        let mut set = Self::default();
        set.set_captions(language, captions.into());
        set
    }

    /// True when every language's list is empty.
    pub fn is_empty(&self) -> bool {
        self.captions.values().all(CaptionList::is_empty)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.captions.keys().map(String::as_str)
    }

    pub fn captions(&self, language: &str) -> Result<&CaptionList, CaptionError> {
        self.captions
            .get(language)
            .ok_or_else(|| CaptionError::UnknownLanguage {
                language: language.to_string(),
            })
    }

    pub fn set_captions(&mut self, language: impl Into<String>, captions: CaptionList) {
        self.captions.insert(language.into(), captions);
    }

    pub fn add_style(&mut self, selector: impl Into<String>, rules: StyleRules) {
        self.styles.insert(selector.into(), rules);
    }

    pub fn style(&self, selector: &str) -> Option<&StyleRules> {
        self.styles.get(selector)
    }

    /// Effective default layout for a language: the list's own, else the set's.
    pub fn layout_for(&self, language: &str) -> Option<Layout> {
        self.captions
            .get(language)
            .and_then(|list| list.layout)
            .or(self.layout)
    }

    fn lists_mut(&mut self) -> impl Iterator<Item = &mut CaptionList> {
        self.captions.values_mut()
    }

    /// Scale every timestamp by `rate_skew`, then shift by `offset_us`.
    /// Cues that end up starting before zero are dropped.
    pub fn adjust_caption_timing(&mut self, offset_us: Microseconds, rate_skew: f64) {
        let shift = |t: Microseconds| (t as f64 * rate_skew).round() as Microseconds + offset_us;
        for list in self.lists_mut() {
            list.captions = std::mem::take(&mut list.captions)
                .into_iter()
                .filter_map(|mut caption| {
                    caption.start = shift(caption.start);
                    caption.end = shift(caption.end);
                    (caption.start >= 0).then_some(caption)
                })
                .collect();
        }
    }

    /// Remove `<...>` markup from text nodes.
    pub fn strip_html_tags(&mut self) {
        self.replace_in_text(html_tag_pattern());
    }

    /// Remove `{...}` override blocks from text nodes.
    pub fn strip_ass_tags(&mut self) {
        self.replace_in_text(ass_tag_pattern());
    }

    fn replace_in_text(&mut self, pattern: &Regex) {
        for list in self.lists_mut() {
            for caption in &mut list.captions {
                for content in caption.text_contents_mut() {
                    if pattern.is_match(content) {
                        *content = pattern.replace_all(content, "").into_owned();
                    }
                }
            }
        }
    }

    /// Drop cues without any visible text.
    pub fn remove_empty_captions(&mut self) {
        for list in self.lists_mut() {
            list.captions.retain(Caption::has_visible_text);
        }
    }

    /// Clear every layout in the set.
    pub fn remove_layout_info(&mut self) {
        self.layout = None;
        for list in self.lists_mut() {
            list.layout = None;
            for caption in &mut list.captions {
                caption.clear_layout();
            }
        }
    }

    /// Convert every pixel layout to percentages of a `width` x `height`
    /// frame, optionally fitting origin + extent inside the frame.
    pub fn relativize(&mut self, width: u32, height: u32, fit_to_screen: bool) {
        let convert = |layout: &Layout| {
            let relative = layout.as_percentage_of(width, height);
            if fit_to_screen {
                relative.fit_to_screen()
            } else {
                relative
            }
        };
        self.layout = self.layout.as_ref().map(convert);
        for list in self.lists_mut() {
            list.layout = list.layout.as_ref().map(convert);
            for caption in &mut list.captions {
                caption.map_layouts(convert);
            }
        }
    }

    /// Apply `CaptionList::ensure_min_gap` to every language.
    pub fn ensure_min_gap(&mut self, min_gap_us: Microseconds) -> Result<(), CaptionError> {
        for list in self.lists_mut() {
            list.ensure_min_gap(min_gap_us)?;
        }
        Ok(())
    }

    /// Apply `CaptionList::merge_captions` to every language.
    pub fn merge_captions(&mut self) -> Result<(), CaptionError> {
        for list in self.lists_mut() {
            list.merge_captions()?;
        }
        Ok(())
    }
}

impl CaptionList {
    /// Push start times forward so each start-time group begins at least
    /// `min_gap_us` after the previous group ends. Members of a group move
    /// together; list order is untouched.
    ///
    /// A moved group stays strictly before the next group's final start, so
    /// the list regroups into the same buckets and a second call is a no-op.
    pub fn ensure_min_gap(&mut self, min_gap_us: Microseconds) -> Result<(), CaptionError> {
        let buckets = group_indices_by_start(&self.captions)?;
        let timing: Vec<(Microseconds, Microseconds)> = buckets
            .iter()
            .map(|members| {
                let first = &self.captions[members[0]];
                (first.start, first.end)
            })
            .collect();

        // Walk backwards so each group's cap is the next group's final start.
        let mut next_start: Option<Microseconds> = None;
        for (index, members) in buckets.iter().enumerate().rev() {
            let (start, end) = timing[index];
            let mut target = match index.checked_sub(1) {
                Some(prev) => gap_adjusted_start(timing[prev].1, start, end, min_gap_us)
                    .unwrap_or(start),
                None => start,
            };
            if let Some(next) = next_start {
                target = target.min(next - 1).max(start);
            }
            if target != start {
                for &i in members {
                    self.captions[i].start = target;
                }
            }
            next_start = Some(target);
        }
        Ok(())
    }

    /// Collapse cues sharing a start time into one cue per group. Each
    /// merged cue takes the list position of the group's first member.
    pub fn merge_captions(&mut self) -> Result<(), CaptionError> {
        let mut buckets = group_indices_by_start(&self.captions)?;
        buckets.sort_by_key(|members| members[0]);
        let merged = buckets
            .iter()
            .filter_map(|members| merge_group(members.iter().map(|&i| &self.captions[i])))
            .collect();
        self.captions = merged;
        Ok(())
    }
}
