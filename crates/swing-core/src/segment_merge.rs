//! Merging of swing segments across windows.

use swingcut_pose_model::time::Segment;

/// Accumulates segments as they are emitted and merges near neighbors.
///
/// Appending merges into the last segment when the new one starts no earlier
/// and the gap is at most `merge_gap_ms`. Earlier segments are pushed as is;
/// [`SegmentMerger::finish`] sorts and sweeps once more to place them.
#[derive(Debug, Clone)]
pub struct SegmentMerger {
    merge_gap_ms: u64,
    segments: Vec<Segment>,
    appended: usize,
}

impl SegmentMerger {
    pub fn new(merge_gap_ms: u64) -> Self {
        Self {
            merge_gap_ms,
            segments: vec![],
            appended: 0,
        }
    }

    /// Append one segment, extending the last one if it is close enough.
    pub fn append(&mut self, segment: Segment) {
        self.appended += 1;
        match self.segments.last_mut() {
            Some(last)
                if segment.start_ms >= last.start_ms
                    && last.is_within_gap(&segment, self.merge_gap_ms) =>
            {
                last.end_ms = last.end_ms.max(segment.end_ms);
            }
            _ => self.segments.push(segment),
        }
    }

    /// Segments accumulated so far (streaming rule only).
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments appended, before any merging.
    pub fn appended(&self) -> usize {
        self.appended
    }

    /// Sort by start and run one adjacent-merge sweep.
    pub fn finish(self) -> Vec<Segment> {
        let mut sorted = self.segments;
        sorted.sort_by_key(|s| (s.start_ms, s.end_ms));

        let mut merged: Vec<Segment> = Vec::with_capacity(sorted.len());
        for segment in sorted {
            match merged.last_mut() {
                Some(last) if last.is_within_gap(&segment, self.merge_gap_ms) => {
                    last.end_ms = last.end_ms.max(segment.end_ms);
                }
                _ => merged.push(segment),
            }
        }
        merged
    }

    /// Merge a batch of raw segments.
    pub fn merge(merge_gap_ms: u64, raw: impl IntoIterator<Item = Segment>) -> Vec<Segment> {
        let mut merger = Self::new(merge_gap_ms);
        for segment in raw {
            merger.append(segment);
        }
        merger.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seg(start: u64, end: u64) -> Segment {
        Segment::new(start, end).unwrap()
    }

    #[test]
    fn test_gap_larger_than_threshold_stays_distinct() {
        let merged = SegmentMerger::merge(150, [seg(0, 1_000), seg(1_100, 2_000)]);
        assert_eq!(merged, vec![seg(0, 1_000), seg(1_100, 2_000)]);
    }

    #[test]
    fn test_gap_within_threshold_merges() {
        let merged = SegmentMerger::merge(150, [seg(0, 1_000), seg(1_120, 2_000)]);
        assert_eq!(merged, vec![seg(0, 2_000)]);
    }

    #[test]
    fn test_gap_exactly_at_threshold_merges() {
        let merged = SegmentMerger::merge(150, [seg(0, 1_000), seg(1_150, 2_000)]);
        assert_eq!(merged, vec![seg(0, 2_000)]);
    }

    #[test]
    fn test_out_of_order_segments_merged_in_final_sweep() {
        let mut merger = SegmentMerger::new(150);
        merger.append(seg(0, 1_000));
        merger.append(seg(3_000, 4_000));
        // starts before the last segment, so it is kept apart until the sweep
        merger.append(seg(1_100, 1_500));
        merger.append(seg(6_000, 7_000));
        assert_eq!(merger.appended(), 4);
        assert_eq!(
            merger.segments(),
            &[
                seg(0, 1_000),
                seg(3_000, 4_000),
                seg(1_100, 1_500),
                seg(6_000, 7_000)
            ]
        );

        assert_eq!(
            merger.finish(),
            vec![seg(0, 1_500), seg(3_000, 4_000), seg(6_000, 7_000)]
        );
    }

    #[test]
    fn test_earlier_segment_does_not_bridge_large_gap() {
        let merged = SegmentMerger::merge(150, [seg(5_000, 6_000), seg(0, 1_000)]);
        assert_eq!(merged, vec![seg(0, 1_000), seg(5_000, 6_000)]);
    }

    #[test]
    fn test_earlier_overlapping_segment_merges_in_final_sweep() {
        let mut merger = SegmentMerger::new(150);
        merger.append(seg(1_000, 2_000));
        merger.append(seg(500, 1_200));
        assert_eq!(merger.segments(), &[seg(1_000, 2_000), seg(500, 1_200)]);
        assert_eq!(merger.finish(), vec![seg(500, 2_000)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(SegmentMerger::merge(150, []).is_empty());
    }

    proptest! {
        #[test]
        fn prop_output_sorted_with_gaps_above_threshold(
            raw in prop::collection::vec((0u64..20_000, 1u64..3_000), 0..30),
            gap in 0u64..500,
        ) {
            let segments: Vec<Segment> = raw.iter().map(|(s, d)| seg(*s, s + d)).collect();
            let merged = SegmentMerger::merge(gap, segments.clone());

            for pair in merged.windows(2) {
                prop_assert!(pair[0].start_ms < pair[1].start_ms);
                prop_assert!(pair[1].start_ms > pair[0].end_ms + gap);
            }
            // every input is covered by some output segment
            for s in &segments {
                prop_assert!(
                    merged.iter().any(|m| m.start_ms <= s.start_ms && s.end_ms <= m.end_ms)
                );
            }
        }

        #[test]
        fn prop_matches_sorted_adjacent_merge(
            raw in prop::collection::vec((0u64..20_000, 1u64..3_000), 0..30),
            gap in 0u64..500,
        ) {
            let mut sorted: Vec<Segment> = raw.iter().map(|(s, d)| seg(*s, s + d)).collect();
            let merged = SegmentMerger::merge(gap, sorted.clone());

            sorted.sort_by_key(|s| (s.start_ms, s.end_ms));
            let mut expected: Vec<Segment> = vec![];
            for s in sorted {
                match expected.last_mut() {
                    Some(last) if s.start_ms <= last.end_ms + gap => {
                        last.end_ms = last.end_ms.max(s.end_ms);
                    }
                    _ => expected.push(s),
                }
            }
            prop_assert_eq!(merged, expected);
        }
    }
}
