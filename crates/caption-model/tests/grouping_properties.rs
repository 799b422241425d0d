use burnsub_caption_model::{
    ensure_min_gap, group_captions, group_indices_by_start, Caption, CaptionError, CaptionList,
};
use proptest::prelude::*;

/// Cues drawn from a handful of start slots so collisions are common.
/// Each slot has one fixed end, so grouping never fails.
fn consistent_cues() -> impl Strategy<Value = Vec<Caption>> {
    prop::collection::vec((0i64..8, "[a-z]{1,6}"), 0..24).prop_map(|items| {
        items
            .into_iter()
            .map(|(slot, text)| {
                let start = slot * 1_000_000;
                Caption::from_text(start, start + 1_500_000, text)
            })
            .collect()
    })
}

/// Like `consistent_cues`, but slot durations vary and some are zero, so a
/// moved group can reach a later group's start.
fn mixed_duration_cues() -> impl Strategy<Value = Vec<Caption>> {
    prop::collection::vec((0i64..10, "[a-z]{1,6}"), 0..24).prop_map(|items| {
        items
            .into_iter()
            .map(|(slot, text)| {
                let start = slot * 500_000;
                let duration = (slot * 7 % 4) * 700_000;
                Caption::from_text(start, start + duration, text)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn grouping_preserves_count_and_bucket_order(cues in consistent_cues()) {
        let buckets = group_indices_by_start(&cues).unwrap();

        let flattened: usize = buckets.iter().map(Vec::len).sum();
        prop_assert_eq!(flattened, cues.len());

        for members in &buckets {
            prop_assert!(members.windows(2).all(|w| w[0] < w[1]));
            let start = cues[members[0]].start;
            prop_assert!(members.iter().all(|&i| cues[i].start == start));
        }

        let starts: Vec<i64> = buckets.iter().map(|m| cues[m[0]].start).collect();
        prop_assert!(starts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn differing_end_on_shared_start_is_an_overlap(
        start in 0i64..10_000_000,
        end_a in 1i64..5_000_000,
        delta in 1i64..5_000_000,
    ) {
        let cues = vec![
            Caption::from_text(start, start + end_a, "a"),
            Caption::from_text(start, start + end_a + delta, "b"),
        ];
        prop_assert_eq!(
            group_indices_by_start(&cues),
            Err(CaptionError::Overlap { start })
        );
    }

    #[test]
    fn ensure_min_gap_is_idempotent(cues in consistent_cues(), gap in 0i64..2_000_000) {
        let mut once = group_captions(&cues).unwrap();
        ensure_min_gap(&mut once, gap);

        let mut twice = once.clone();
        ensure_min_gap(&mut twice, gap);

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn list_ensure_min_gap_is_idempotent(cues in mixed_duration_cues(), gap in 0i64..2_000_000) {
        let mut once = CaptionList::from(cues);
        prop_assert!(once.ensure_min_gap(gap).is_ok());

        let mut twice = once.clone();
        prop_assert!(twice.ensure_min_gap(gap).is_ok());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn list_ensure_min_gap_keeps_groups_apart(cues in mixed_duration_cues(), gap in 0i64..2_000_000) {
        let before = group_indices_by_start(&cues).unwrap();
        let mut list = CaptionList::from(cues);
        list.ensure_min_gap(gap).unwrap();
        let after = group_indices_by_start(&list.captions).unwrap();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn ensure_min_gap_never_passes_own_end(cues in consistent_cues(), gap in 0i64..2_000_000) {
        let mut groups = group_captions(&cues).unwrap();
        let before = groups.clone();
        ensure_min_gap(&mut groups, gap);
        for (after, original) in groups.iter().zip(&before) {
            prop_assert!(after.start >= original.start);
            prop_assert!(after.start <= original.end.max(original.start));
            prop_assert_eq!(after.end, original.end);
        }
    }

    #[test]
    fn merge_leaves_no_trailing_break(cues in consistent_cues()) {
        let mut list = CaptionList::from(cues.clone());
        list.merge_captions().unwrap();

        let groups = group_captions(&cues).unwrap();
        prop_assert_eq!(list.len(), groups.len());
        for caption in list.iter() {
            prop_assert!(!caption.nodes().is_empty());
            prop_assert!(!caption.nodes().last().unwrap().is_break());
        }
    }
}
