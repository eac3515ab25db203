//! Whole-clip activity segmentation.
//!
//! A coarser alternative to the swing tracker for short clips that hold a
//! single swing: the segment spans from the first to the last frame whose
//! keypoint displacement is a sizable fraction of the peak.

use serde::{Deserialize, Serialize};
use swingcut_pose_model::keypoints::PoseKeypoints;
use swingcut_pose_model::sample::FrameSample;
use swingcut_pose_model::time::Segment;

/// Activity segmentation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Peak activity below this means nothing moved (normalized units).
    pub min_activity: f32,

    /// Frames count as active above this fraction of the peak.
    pub peak_ratio: f32,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            min_activity: 0.015,
            peak_ratio: 0.35,
        }
    }
}

/// Finds the active span of a clip from per-frame poses.
#[derive(Debug, Clone, Default)]
pub struct ActivitySegmenter {
    config: ActivityConfig,
}

impl ActivitySegmenter {
    pub fn new(config: ActivityConfig) -> Self {
        Self { config }
    }

    /// Detect the active span. Frames without a pose are ignored.
    pub fn detect(&self, samples: &[FrameSample]) -> Vec<Segment> {
        let posed: Vec<(&FrameSample, &PoseKeypoints)> = samples
            .iter()
            .filter_map(|s| s.pose.as_ref().map(|pose| (s, pose)))
            .collect();
        if posed.len() < 2 {
            return vec![];
        }

        let mut activity = vec![0.0f32; posed.len()];
        for i in 1..posed.len() {
            activity[i] = displacement(posed[i - 1].1, posed[i].1);
        }

        let peak = activity.iter().copied().fold(0.0f32, f32::max);
        if peak < self.config.min_activity {
            tracing::debug!(peak, "no activity above floor");
            return vec![];
        }
        let threshold = self.config.min_activity.max(peak * self.config.peak_ratio);

        let Some(first) = (1..activity.len()).find(|&i| activity[i] >= threshold) else {
            return vec![];
        };
        let last = (first..activity.len())
            .rev()
            .find(|&i| activity[i] >= threshold)
            .unwrap_or(first);

        let start = posed[first].0;
        let end = posed[last].0;
        tracing::debug!(
            peak,
            threshold,
            start_frame = start.frame_index,
            end_frame = end.frame_index,
            "activity span"
        );

        Segment::new(start.timestamp_ms, end.timestamp_ms)
            .into_iter()
            .collect()
    }
}

/// Sum of absolute x and y displacement over the keypoints both poses share.
fn displacement(prev: &PoseKeypoints, curr: &PoseKeypoints) -> f32 {
    prev.points
        .iter()
        .zip(curr.points.iter())
        .filter(|(p, c)| p.is_finite() && c.is_finite())
        .map(|(p, c)| (c.x - p.x).abs() + (c.y - p.y).abs())
        .sum()
}
