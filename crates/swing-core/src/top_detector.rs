//! Backswing top detection.
//!
//! The top of a backswing is where the hands are highest, i.e. a local
//! minimum of the normalized wrist y coordinate (smaller y is higher in the
//! frame). A five-sample sliding window trades two samples of lag for
//! robustness against single-frame jitter.

use std::collections::VecDeque;

/// Number of samples the detector compares.
pub const TOP_WINDOW: usize = 5;

const MIDDLE: usize = TOP_WINDOW / 2;

/// Sliding-window strict local minimum detector.
#[derive(Debug, Clone)]
pub struct RingTopDetector {
    samples: VecDeque<(u64, f32)>,
}

impl Default for RingTopDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RingTopDetector {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(TOP_WINDOW),
        }
    }

    /// Push a sample; returns the timestamp of the window's middle sample
    /// when it is a strict minimum of the window.
    ///
    /// Ties with any neighbor suppress detection, so a flat bottom such as
    /// `[5, 4, 3, 3, 5]` never reports a top. Non-finite values are ignored
    /// and do not enter the window.
    pub fn add_sample(&mut self, timestamp_ms: u64, value: f32) -> Option<u64> {
        if !value.is_finite() {
            return None;
        }

        if self.samples.len() == TOP_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back((timestamp_ms, value));

        if self.samples.len() < TOP_WINDOW {
            return None;
        }

        let (mid_t, mid_v) = self.samples[MIDDLE];
        let is_strict_min = self
            .samples
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != MIDDLE)
            .all(|(_, (_, v))| v.is_finite() && mid_v < *v);

        is_strict_min.then_some(mid_t)
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}
