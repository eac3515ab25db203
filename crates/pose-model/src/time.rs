//! Time intervals on the video timeline.
//!
//! All timestamps are milliseconds from the start of the video.

use serde::{Deserialize, Serialize};

/// Milliseconds since the start of the video.
pub type TimestampMs = u64;

/// A candidate interval flagged by the coarse motion scan.
///
/// Invariant: `start_ms < end_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_ms: TimestampMs,
    pub end_ms: TimestampMs,
}

impl TimeWindow {
    /// Create a window; `None` if the interval is empty or inverted.
    pub fn new(start_ms: TimestampMs, end_ms: TimestampMs) -> Option<Self> {
        (start_ms < end_ms).then_some(Self { start_ms, end_ms })
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Inclusive on both ends.
    pub fn contains(&self, t: TimestampMs) -> bool {
        t >= self.start_ms && t <= self.end_ms
    }
}

/// A detected swing clip.
///
/// Invariant: `end_ms > start_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub start_ms: TimestampMs,
    pub end_ms: TimestampMs,
}

impl Segment {
    /// Create a segment; `None` if the interval is empty or inverted.
    pub fn new(start_ms: TimestampMs, end_ms: TimestampMs) -> Option<Self> {
        (start_ms < end_ms).then_some(Self { start_ms, end_ms })
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Whether `next` starts no later than `gap_ms` after this segment ends.
    pub fn is_within_gap(&self, next: &Segment, gap_ms: u64) -> bool {
        next.start_ms <= self.end_ms.saturating_add(gap_ms)
    }
}

impl From<TimeWindow> for Segment {
    fn from(window: TimeWindow) -> Self {
        Self {
            start_ms: window.start_ms,
            end_ms: window.end_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_rejects_empty() {
        assert!(TimeWindow::new(100, 100).is_none());
        assert!(TimeWindow::new(200, 100).is_none());
        let w = TimeWindow::new(100, 400).unwrap();
        assert_eq!(w.duration_ms(), 300);
        assert!(w.contains(100));
        assert!(w.contains(400));
        assert!(!w.contains(401));
    }

    #[test]
    fn test_segment_gap() {
        let a = Segment::new(0, 1_000).unwrap();
        assert!(a.is_within_gap(&Segment::new(1_120, 2_000).unwrap(), 150));
        assert!(a.is_within_gap(&Segment::new(1_150, 2_000).unwrap(), 150));
        assert!(!a.is_within_gap(&Segment::new(1_151, 2_000).unwrap(), 150));
        // overlapping segments are always within the gap
        assert!(a.is_within_gap(&Segment::new(500, 2_000).unwrap(), 0));
    }

    #[test]
    fn test_segment_json_shape() {
        let json = serde_json::to_string(&Segment::new(300, 3_500).unwrap()).unwrap();
        assert_eq!(json, r#"{"start_ms":300,"end_ms":3500}"#);
    }
}
