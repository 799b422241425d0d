//! Cue and node types.
//!
//! Readers produce these values; timing and merge operations may mutate
//! them; the rendering pipeline only reads them.

use std::collections::BTreeMap;

use burnsub_common::error::BurnError;
use burnsub_common::timecode::{format_clock_millis, Microseconds};
use serde::{Deserialize, Serialize};

use crate::layout::Layout;

/// CSS-like styling rules (`property -> value`).
pub type StyleRules = BTreeMap<String, String>;

/// A single piece of cue content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaptionNode {
    /// Literal text.
    Text {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        layout: Option<Layout>,
    },

    /// Line break.
    Break {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        layout: Option<Layout>,
    },

    /// Opening or closing style span.
    Style {
        is_start: bool,
        #[serde(default)]
        content: StyleRules,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        layout: Option<Layout>,
    },
}

impl CaptionNode {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
            layout: None,
        }
    }

    pub fn text_with_layout(content: impl Into<String>, layout: Layout) -> Self {
        Self::Text {
            content: content.into(),
            layout: Some(layout),
        }
    }

    pub fn line_break() -> Self {
        Self::Break { layout: None }
    }

    pub fn style(is_start: bool, content: StyleRules) -> Self {
        Self::Style {
            is_start,
            content,
            layout: None,
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Self::Break { .. })
    }

    pub fn layout(&self) -> Option<&Layout> {
        match self {
            Self::Text { layout, .. } | Self::Break { layout } | Self::Style { layout, .. } => {
                layout.as_ref()
            }
        }
    }

    pub fn set_layout(&mut self, value: Option<Layout>) {
        match self {
            Self::Text { layout, .. } | Self::Break { layout } | Self::Style { layout, .. } => {
                *layout = value;
            }
        }
    }
}

/// A timed cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CaptionRepr")]
pub struct Caption {
    /// Start in microseconds.
    pub start: Microseconds,

    /// End in microseconds. `start >= end` is tolerated downstream.
    pub end: Microseconds,

    nodes: Vec<CaptionNode>,

    /// Cue-level styling rules.
    #[serde(default)]
    pub style: StyleRules,

    /// Cue-level positioning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

#[derive(Deserialize)]
struct CaptionRepr {
    start: Microseconds,
    end: Microseconds,
    nodes: Vec<CaptionNode>,
    #[serde(default)]
    style: StyleRules,
    #[serde(default)]
    layout: Option<Layout>,
}

impl TryFrom<CaptionRepr> for Caption {
    type Error = CaptionError;

    fn try_from(repr: CaptionRepr) -> Result<Self, Self::Error> {
        Caption::with_details(repr.start, repr.end, repr.nodes, repr.style, repr.layout)
    }
}

impl Caption {
    /// Create a cue without style or layout.
    pub fn new(
        start: Microseconds,
        end: Microseconds,
        nodes: Vec<CaptionNode>,
    ) -> Result<Self, CaptionError> {
        Self::with_details(start, end, nodes, StyleRules::new(), None)
    }

    /// Create a cue with every field.
    pub fn with_details(
        start: Microseconds,
        end: Microseconds,
        nodes: Vec<CaptionNode>,
        style: StyleRules,
        layout: Option<Layout>,
    ) -> Result<Self, CaptionError> {
        if nodes.is_empty() {
            return Err(CaptionError::EmptyNodes { start });
        }
        Ok(Self {
            start,
            end,
            nodes,
            style,
            layout,
        })
    }

    /// Convenience constructor for a single text node.
    pub fn from_text(start: Microseconds, end: Microseconds, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            nodes: vec![CaptionNode::text(text)],
            style: StyleRules::new(),
            layout: None,
        }
    }

    pub fn nodes(&self) -> &[CaptionNode] {
        &self.nodes
    }

    /// Mutable access to text node contents only, so the node list can
    /// never become empty through this handle.
    pub fn text_contents_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.nodes.iter_mut().filter_map(|node| match node {
            CaptionNode::Text { content, .. } => Some(content),
            _ => None,
        })
    }

    /// Append nodes from another cue, separated by a line break.
    pub(crate) fn append_with_break(&mut self, nodes: &[CaptionNode]) {
        self.nodes.push(CaptionNode::line_break());
        self.nodes.extend(nodes.iter().cloned());
    }

    /// Drop trailing line breaks, keeping at least one node.
    pub(crate) fn trim_trailing_breaks(&mut self) {
        while self.nodes.len() > 1 && self.nodes.last().is_some_and(CaptionNode::is_break) {
            self.nodes.pop();
        }
    }

    /// Clear cue and node layout.
    pub fn clear_layout(&mut self) {
        self.layout = None;
        for node in &mut self.nodes {
            node.set_layout(None);
        }
    }

    /// Rewrite the cue layout and every node layout that is set.
    pub fn map_layouts(&mut self, f: impl Fn(&Layout) -> Layout) {
        self.layout = self.layout.as_ref().map(&f);
        for node in &mut self.nodes {
            if let Some(layout) = node.layout().map(&f) {
                node.set_layout(Some(layout));
            }
        }
    }

    /// Rendered text: text nodes verbatim, breaks as `\n`, styles dropped,
    /// surrounding whitespace trimmed.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                CaptionNode::Text { content, .. } => out.push_str(content),
                CaptionNode::Break { .. } => out.push('\n'),
                CaptionNode::Style { .. } => {}
            }
        }
        out.trim().to_string()
    }

    /// Whether any text node has non-whitespace content.
    pub fn has_visible_text(&self) -> bool {
        self.nodes.iter().any(|node| match node {
            CaptionNode::Text { content, .. } => !content.trim().is_empty(),
            _ => false,
        })
    }

    /// Layout of the first node that carries one.
    pub fn first_node_layout(&self) -> Option<Layout> {
        self.nodes.iter().find_map(|node| node.layout().copied())
    }

    pub fn duration(&self) -> Microseconds {
        self.end - self.start
    }

    /// `HH:MM:SS.mmm` start time.
    pub fn format_start(&self) -> String {
        format_clock_millis(self.start)
    }

    /// `HH:MM:SS.mmm` end time.
    pub fn format_end(&self) -> String {
        format_clock_millis(self.end)
    }
}

/// An ordered cue list with an inherited default layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionList {
    pub captions: Vec<Caption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

impl CaptionList {
    pub fn new(captions: Vec<Caption>, layout: Option<Layout>) -> Self {
        Self { captions, layout }
    }

    pub fn len(&self) -> usize {
        self.captions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Caption> {
        self.captions.iter()
    }

    pub fn push(&mut self, caption: Caption) {
        self.captions.push(caption);
    }

    /// Concatenate two lists. Layouts must be equal, or the other list's unset.
    pub fn concat(mut self, other: CaptionList) -> Result<CaptionList, CaptionError> {
        let compatible = match (&self.layout, &other.layout) {
            (_, None) => true,
            (Some(mine), Some(theirs)) => mine == theirs,
            (None, Some(_)) => false,
        };
        if !compatible {
            return Err(CaptionError::LayoutMismatch);
        }
        self.captions.extend(other.captions);
        Ok(self)
    }
}

impl From<Vec<Caption>> for CaptionList {
    fn from(captions: Vec<Caption>) -> Self {
        Self::new(captions, None)
    }
}

impl<'a> IntoIterator for &'a CaptionList {
    type Item = &'a Caption;
    type IntoIter = std::slice::Iter<'a, Caption>;

    fn into_iter(self) -> Self::IntoIter {
        self.captions.iter()
    }
}

/// Errors raised by the caption model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptionError {
    #[error("Node list cannot be empty (cue starting at {start}us)")]
    EmptyNodes { start: Microseconds },

    #[error("Cannot concatenate caption lists with different layouts")]
    LayoutMismatch,

    #[error("Overlapping cues with different end times at {start}us")]
    Overlap { start: Microseconds },

    #[error("No captions for language {language}")]
    UnknownLanguage { language: String },
}

impl From<CaptionError> for BurnError {
    fn from(err: CaptionError) -> Self {
        match err {
            CaptionError::Overlap { start } => BurnError::Overlap { start_us: start },
            other => BurnError::caption(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_nodes_rejected() {
        assert_eq!(
            Caption::new(0, 1, vec![]),
            Err(CaptionError::EmptyNodes { start: 0 })
        );
    }

    #[test]
    fn test_text_joins_breaks_and_skips_styles() {
        let caption = Caption::new(
            0,
            1_000_000,
            vec![
                CaptionNode::style(true, StyleRules::new()),
                CaptionNode::text("  Hello"),
                CaptionNode::line_break(),
                CaptionNode::text("world  "),
                CaptionNode::style(false, StyleRules::new()),
            ],
        )
        .unwrap();
        assert_eq!(caption.text(), "Hello\nworld");
    }

    #[test]
    fn test_format_timestamps() {
        let caption = Caption::from_text(0, 1_000_000, "x");
        assert_eq!(caption.format_start(), "00:00:00.000");
        assert_eq!(caption.format_end(), "00:00:01.000");
    }

    #[test]
    fn test_concat_layout_compatibility() {
        let layout = Layout::at_percent(10.0, 10.0);
        let a = CaptionList::new(vec![Caption::from_text(0, 1, "a")], Some(layout));
        let b = CaptionList::new(vec![Caption::from_text(1, 2, "b")], None);
        let joined = a.clone().concat(b).unwrap();
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.layout, Some(layout));

        let c = CaptionList::new(vec![], Some(Layout::at_percent(50.0, 50.0)));
        assert_eq!(a.concat(c), Err(CaptionError::LayoutMismatch));
    }

    #[test]
    fn test_concat_unset_with_set_is_rejected() {
        let a = CaptionList::new(vec![], None);
        let b = CaptionList::new(vec![], Some(Layout::at_percent(1.0, 1.0)));
        assert_eq!(a.concat(b), Err(CaptionError::LayoutMismatch));
    }

    #[test]
    fn test_deserialize_validates_nodes() {
        let ok: Caption = serde_json::from_str(
            r#"{"start":0,"end":5,"nodes":[{"type":"text","content":"hi"}]}"#,
        )
        .unwrap();
        assert_eq!(ok.text(), "hi");

        let bad = serde_json::from_str::<Caption>(r#"{"start":0,"end":5,"nodes":[]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_overlap_converts_to_burn_error() {
        let err: BurnError = CaptionError::Overlap { start: 42 }.into();
        assert!(matches!(err, BurnError::Overlap { start_us: 42 }));
    }

    #[test]
    fn test_clear_layout_reaches_nodes() {
        let layout = Layout::at_percent(5.0, 5.0);
        let mut caption = Caption::with_details(
            0,
            1,
            vec![CaptionNode::text_with_layout("a", layout)],
            StyleRules::new(),
            Some(layout),
        )
        .unwrap();
        caption.clear_layout();
        assert_eq!(caption.layout, None);
        assert_eq!(caption.first_node_layout(), None);
    }
}
