//! Start-time grouping shared by cue merging and rendering.
//!
//! Cues sharing a start time are shown together. Within a group every cue
//! must also share the end time; anything else is an overlap we cannot
//! express with a single image per interval.

use std::collections::HashMap;

use burnsub_common::timecode::Microseconds;

use crate::caption::{Caption, CaptionError};

/// Anything with a display interval.
pub trait Timed {
    fn start(&self) -> Microseconds;
    fn end(&self) -> Microseconds;
}

impl Timed for Caption {
    fn start(&self) -> Microseconds {
        self.start
    }

    fn end(&self) -> Microseconds {
        self.end
    }
}

impl<T: Timed + ?Sized> Timed for &T {
    fn start(&self) -> Microseconds {
        (**self).start()
    }

    fn end(&self) -> Microseconds {
        (**self).end()
    }
}

/// Group item indices by identical start time.
///
/// Buckets keep first-seen order; buckets are sorted by start. A bucket
/// whose members disagree on the end time yields `CaptionError::Overlap`.
pub fn group_indices_by_start<T: Timed>(items: &[T]) -> Result<Vec<Vec<usize>>, CaptionError> {
    let mut buckets: Vec<(Microseconds, Vec<usize>)> = Vec::new();
    let mut by_start: HashMap<Microseconds, usize> = HashMap::new();

    for (index, item) in items.iter().enumerate() {
        let start = item.start();
        match by_start.get(&start) {
            Some(&bucket) => buckets[bucket].1.push(index),
            None => {
                by_start.insert(start, buckets.len());
                buckets.push((start, vec![index]));
            }
        }
    }

    buckets.sort_by_key(|(start, _)| *start);

    for (start, members) in &buckets {
        let first_end = items[members[0]].end();
        if members.iter().any(|&i| items[i].end() != first_end) {
            return Err(CaptionError::Overlap { start: *start });
        }
    }

    Ok(buckets.into_iter().map(|(_, members)| members).collect())
}

/// New start for an interval that begins at or before `prev_end`.
///
/// Returns `None` when no adjustment is needed. The start never moves
/// past the interval's own end, and never moves backwards.
pub fn gap_adjusted_start(
    prev_end: Microseconds,
    start: Microseconds,
    end: Microseconds,
    min_gap: Microseconds,
) -> Option<Microseconds> {
    if start > prev_end {
        return None;
    }
    let target = (prev_end + min_gap.max(0)).min(end).max(start);
    (target != start).then_some(target)
}

/// Cues sharing one start time, with the interval they are displayed for.
///
/// `start`/`end` begin as the members' shared timing; gap enforcement may
/// move `start` later without touching the members.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionGroup {
    pub start: Microseconds,
    pub end: Microseconds,
    pub captions: Vec<Caption>,
}

impl CaptionGroup {
    pub fn len(&self) -> usize {
        self.captions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    pub fn is_zero_duration(&self) -> bool {
        self.start >= self.end
    }

    /// Collapse the group into one cue.
    pub fn merged(&self) -> Option<Caption> {
        merge_group(self.captions.iter())
    }
}

impl Timed for CaptionGroup {
    fn start(&self) -> Microseconds {
        self.start
    }

    fn end(&self) -> Microseconds {
        self.end
    }
}

/// Group cues for simultaneous display.
pub fn group_captions(captions: &[Caption]) -> Result<Vec<CaptionGroup>, CaptionError> {
    let buckets = group_indices_by_start(captions)?;
    Ok(buckets
        .into_iter()
        .map(|members| {
            let first = &captions[members[0]];
            CaptionGroup {
                start: first.start,
                end: first.end,
                captions: members.into_iter().map(|i| captions[i].clone()).collect(),
            }
        })
        .collect())
}

/// Advance group starts so each begins at least `min_gap` after the
/// previous group's end. Groups must be sorted by start.
///
/// Returns the number of groups adjusted.
pub fn ensure_min_gap(groups: &mut [CaptionGroup], min_gap: Microseconds) -> usize {
    let mut adjusted = 0;
    for i in 1..groups.len() {
        let prev_end = groups[i - 1].end;
        let group = &mut groups[i];
        if let Some(start) = gap_adjusted_start(prev_end, group.start, group.end, min_gap) {
            group.start = start;
            adjusted += 1;
        }
    }
    adjusted
}

/// Merge cues into the first one, joining node lists with line breaks.
///
/// The result keeps the first cue's timing and style. Its layout is the
/// first cue's own layout, else the first node layout found.
pub fn merge_group<'a>(mut captions: impl Iterator<Item = &'a Caption>) -> Option<Caption> {
    let mut merged = captions.next()?.clone();
    for other in captions {
        merged.append_with_break(other.nodes());
    }
    merged.trim_trailing_breaks();
    if merged.layout.is_none() {
        merged.layout = merged.first_node_layout();
    }
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption::CaptionNode;
    use crate::layout::Layout;

    fn cue(start: i64, end: i64, text: &str) -> Caption {
        Caption::from_text(start, end, text)
    }

    #[test]
    fn test_groups_sorted_and_first_seen_order_kept() {
        let cues = vec![
            cue(3_000_000, 4_000_000, "c"),
            cue(1_000_000, 2_000_000, "a"),
            cue(3_000_000, 4_000_000, "d"),
            cue(1_000_000, 2_000_000, "b"),
        ];
        let buckets = group_indices_by_start(&cues).unwrap();
        assert_eq!(buckets, vec![vec![1, 3], vec![0, 2]]);
    }

    #[test]
    fn test_overlap_reports_start() {
        let cues = vec![cue(0, 1_000_000, "a"), cue(0, 2_000_000, "b")];
        assert_eq!(
            group_indices_by_start(&cues),
            Err(CaptionError::Overlap { start: 0 })
        );
    }

    #[test]
    fn test_identical_intervals_form_one_group() {
        let cues = vec![
            cue(1_000_000, 4_000_000, "top"),
            cue(1_000_000, 4_000_000, "bottom"),
        ];
        let groups = group_captions(&cues).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
        assert_eq!((groups[0].start, groups[0].end), (1_000_000, 4_000_000));
    }

    #[test]
    fn test_empty_input() {
        let cues: Vec<Caption> = Vec::new();
        assert!(group_captions(&cues).unwrap().is_empty());
    }

    #[test]
    fn test_gap_adjusted_start() {
        assert_eq!(gap_adjusted_start(100, 200, 300, 40), None);
        assert_eq!(gap_adjusted_start(100, 100, 300, 40), Some(140));
        assert_eq!(gap_adjusted_start(100, 50, 300, 40), Some(140));
        // never past its own end
        assert_eq!(gap_adjusted_start(100, 50, 120, 40), Some(120));
        // never backwards
        assert_eq!(gap_adjusted_start(100, 90, 80, 40), None);
    }

    #[test]
    fn test_ensure_min_gap_on_back_to_back_groups() {
        let cues = vec![
            cue(0, 3_000_000, "First"),
            cue(3_000_000, 6_000_000, "Second"),
        ];
        let mut groups = group_captions(&cues).unwrap();
        assert_eq!(ensure_min_gap(&mut groups, 40_000), 1);
        assert_eq!(groups[1].start, 3_040_000);
        // members keep their original timing
        assert_eq!(groups[1].captions[0].start, 3_000_000);
    }

    #[test]
    fn test_ensure_min_gap_can_produce_zero_duration() {
        let cues = vec![cue(0, 3_000_000, "a"), cue(2_990_000, 3_010_000, "b")];
        let mut groups = group_captions(&cues).unwrap();
        ensure_min_gap(&mut groups, 40_000);
        assert_eq!(groups[1].start, 3_010_000);
        assert!(groups[1].is_zero_duration());
    }

    #[test]
    fn test_merge_joins_with_break() {
        let cues = vec![cue(0, 1, "one"), cue(0, 1, "two")];
        let merged = merge_group(cues.iter()).unwrap();
        assert_eq!(merged.text(), "one\ntwo");
        assert_eq!(merged.nodes().len(), 3);
    }

    #[test]
    fn test_merge_drops_trailing_break() {
        let a = Caption::new(0, 1, vec![CaptionNode::text("a")]).unwrap();
        let b = Caption::new(0, 1, vec![CaptionNode::line_break()]).unwrap();
        let merged = merge_group([a, b].iter()).unwrap();
        assert!(!merged.nodes().last().unwrap().is_break());
        assert_eq!(merged.nodes().len(), 1);
    }

    #[test]
    fn test_merge_takes_node_layout_when_cue_has_none() {
        let layout = Layout::at_percent(10.0, 80.0);
        let a = Caption::new(0, 1, vec![CaptionNode::text_with_layout("a", layout)]).unwrap();
        let merged = merge_group([a].iter()).unwrap();
        assert_eq!(merged.layout, Some(layout));
    }

    #[test]
    fn test_merge_empty_iterator() {
        let none: Vec<Caption> = Vec::new();
        assert!(merge_group(none.iter()).is_none());
    }
}
