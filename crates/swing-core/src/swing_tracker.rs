//! Per-window swing state machine.
//!
//! Tracks the reference wrist against the shoulders and hips of a single
//! golfer and recognizes the impact of a swing: a fast downward crossing of
//! the wrist into the hip band shortly after a backswing top.
//!
//! ```text
//! AwaitingTop --(top seen 120..1400ms ago)--> TopSeen --(impact)--> Cooldown
//!      ^                                                               |
//!      +---------------------------(cooldown elapsed)------------------+
//! ```
//!
//! The states are implicit in `last_top_ms` and `cooldown_until_ms`; the top
//! detector keeps running through all of them.

use serde::{Deserialize, Serialize};
use swingcut_common::config::{SwingTrackerConfig, TrackedHand};
use swingcut_pose_model::frame::FrameSize;
use swingcut_pose_model::keypoints::{BodyJoint, Keypoint, PoseKeypoints};
use swingcut_pose_model::sample::PoseSample;
use swingcut_pose_model::time::{Segment, TimeWindow};

use crate::top_detector::RingTopDetector;

/// Implicit phase of the state machine at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerPhase {
    AwaitingTop,
    TopSeen,
    Cooldown,
}

/// Last accepted, fully valid sample.
#[derive(Debug, Clone, Copy)]
struct PreviousSample {
    timestamp_ms: u64,
    wrist_offset_px: f32,
    wrist_y_px: f32,
    wrist_y: f32,
}

/// Everything derived from one sample before any state is touched.
#[derive(Debug, Clone, Copy)]
struct Measurement {
    wrist_y: f32,
    wrist_offset_px: f32,
    wrist_y_px: f32,
    mid_hip_y: f32,
    /// `(vx_px, vy_px)` relative to the previous sample, px/s.
    velocity: Option<(f32, f32)>,
}

/// Swing state machine for one candidate window.
#[derive(Debug, Clone)]
pub struct SwingStateTracker {
    config: SwingTrackerConfig,
    window: TimeWindow,
    long_edge_px: f32,
    min_down_speed_px: f32,
    top_detector: RingTopDetector,
    last_top_ms: Option<u64>,
    previous: Option<PreviousSample>,
    cooldown_until_ms: u64,
    mirrored: Option<bool>,
}

impl SwingStateTracker {
    /// Create a tracker for `window` on frames of `frame_size`.
    pub fn new(config: &SwingTrackerConfig, window: TimeWindow, frame_size: FrameSize) -> Self {
        let long_edge_px = frame_size.long_edge() as f32;
        let min_down_speed_px = config
            .min_down_speed_px
            .max(config.down_speed_long_edge_ratio * long_edge_px);

        Self {
            config: config.clone(),
            window,
            long_edge_px,
            min_down_speed_px,
            top_detector: RingTopDetector::new(),
            last_top_ms: None,
            previous: None,
            cooldown_until_ms: 0,
            mirrored: None,
        }
    }

    /// Feed one pose sample. Returns a segment when an impact is recognized.
    ///
    /// Samples that arrive out of order, closer than the inference step to
    /// the last accepted one, or with missing or non-finite landmarks are
    /// dropped without changing any state.
    pub fn step(&mut self, sample: &PoseSample) -> Option<Segment> {
        let t = sample.timestamp_ms;

        if let Some(prev) = &self.previous {
            if t <= prev.timestamp_ms || t - prev.timestamp_ms < self.config.inference_step_ms {
                tracing::trace!(t, last = prev.timestamp_ms, "sample too close, dropped");
                return None;
            }
        }

        let Some(m) = self.measure(sample) else {
            tracing::trace!(t, "incomplete or non-finite pose, dropped");
            return None;
        };

        if let Some(top_ms) = self.top_detector.add_sample(t, m.wrist_y) {
            tracing::debug!(top_ms, wrist_y = m.wrist_y, "backswing top");
            self.last_top_ms = Some(top_ms);
        }
        self.mirrored = Some(sample.mirrored);

        let segment = self.check_impact(t, &m);

        self.previous = Some(PreviousSample {
            timestamp_ms: t,
            wrist_offset_px: m.wrist_offset_px,
            wrist_y_px: m.wrist_y_px,
            wrist_y: m.wrist_y,
        });

        segment
    }

    /// Feed the estimator output for timestamp `t`; `None` means no pose.
    pub fn observe(&mut self, t: u64, keypoints: Option<&PoseKeypoints>) -> Option<Segment> {
        let keypoints = keypoints?;
        self.step(&PoseSample::new(t, keypoints.clone()))
    }

    /// Phase of the state machine at time `t`.
    pub fn phase(&self, t: u64) -> TrackerPhase {
        if t < self.cooldown_until_ms {
            return TrackerPhase::Cooldown;
        }
        match self.last_top_ms {
            Some(top) if self.top_is_recent(t, top) => TrackerPhase::TopSeen,
            _ => TrackerPhase::AwaitingTop,
        }
    }

    /// Timestamp of the most recently recognized top.
    pub fn last_top_ms(&self) -> Option<u64> {
        self.last_top_ms
    }

    /// Mirror orientation of the last accepted sample.
    pub fn mirrored(&self) -> Option<bool> {
        self.mirrored
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    fn top_is_recent(&self, t: u64, top_ms: u64) -> bool {
        t.checked_sub(top_ms).is_some_and(|since| {
            (self.config.recent_top_min_ms..=self.config.recent_top_max_ms).contains(&since)
        })
    }

    fn measure(&self, sample: &PoseSample) -> Option<Measurement> {
        let kp = &sample.keypoints;
        let wrist_joint = match self.config.tracked_hand {
            TrackedHand::Left => BodyJoint::LeftWrist,
            TrackedHand::Right => BodyJoint::RightWrist,
        };

        let mut wrist = kp.get(wrist_joint)?;
        let mut left_shoulder = kp.get(BodyJoint::LeftShoulder)?;
        let mut right_shoulder = kp.get(BodyJoint::RightShoulder)?;
        let left_hip = kp.get(BodyJoint::LeftHip)?;
        let right_hip = kp.get(BodyJoint::RightHip)?;

        if sample.mirrored {
            for point in [&mut wrist, &mut left_shoulder, &mut right_shoulder] {
                *point = Keypoint::new(1.0 - point.x, point.y);
            }
        }

        let mid_shoulder_x = (left_shoulder.x + right_shoulder.x) / 2.0;
        let mid_hip_y = (left_hip.y + right_hip.y) / 2.0;

        let wrist_offset_px = (wrist.x - mid_shoulder_x) * self.long_edge_px;
        let wrist_y_px = wrist.y * self.long_edge_px;

        let velocity = self.previous.map(|prev| {
            let dt = (sample.timestamp_ms - prev.timestamp_ms) as f32 / 1000.0;
            (
                (wrist_offset_px - prev.wrist_offset_px) / dt,
                (wrist_y_px - prev.wrist_y_px) / dt,
            )
        });

        let finite = [wrist.y, mid_hip_y, wrist_offset_px, wrist_y_px]
            .iter()
            .all(|v| v.is_finite())
            && velocity.map_or(true, |(vx, vy)| vx.is_finite() && vy.is_finite());
        if !finite {
            return None;
        }

        Some(Measurement {
            wrist_y: wrist.y,
            wrist_offset_px,
            wrist_y_px,
            mid_hip_y,
            velocity,
        })
    }

    fn check_impact(&mut self, t: u64, m: &Measurement) -> Option<Segment> {
        if t < self.cooldown_until_ms {
            return None;
        }
        let top_ms = self.last_top_ms?;
        if !self.top_is_recent(t, top_ms) {
            return None;
        }
        let prev = self.previous?;
        let (vx_px, vy_px) = m.velocity?;

        let tol = self.config.hip_band_tol;
        let band_top = m.mid_hip_y - tol;
        let band_bottom = m.mid_hip_y + tol;
        let was_above_band = prev.wrist_y < band_top;
        let in_band = (band_top..=band_bottom).contains(&m.wrist_y);
        if !(was_above_band && in_band && vy_px > self.min_down_speed_px) {
            return None;
        }

        self.cooldown_until_ms = t.saturating_add(self.config.cooldown_ms);

        let start = self
            .window
            .start_ms
            .max(t.saturating_sub(self.config.pre_impact_ms));
        let end = self
            .window
            .end_ms
            .min(t.saturating_add(self.config.post_impact_ms));

        tracing::debug!(t, top_ms, vy_px, vx_px, start, end, "impact");
        Segment::new(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swingcut_pose_model::keypoints::KeypointLayout;

    fn pose(wrist_y: f32) -> PoseKeypoints {
        let layout = KeypointLayout::MediaPipe33;
        let mut kp = PoseKeypoints::new(
            layout,
            vec![Keypoint::new(0.5, 0.5); layout.keypoint_count()],
        );
        kp.set(BodyJoint::LeftShoulder, Keypoint::new(0.45, 0.30));
        kp.set(BodyJoint::RightShoulder, Keypoint::new(0.55, 0.30));
        kp.set(BodyJoint::LeftHip, Keypoint::new(0.47, 0.55));
        kp.set(BodyJoint::RightHip, Keypoint::new(0.53, 0.55));
        kp.set(BodyJoint::LeftWrist, Keypoint::new(0.5, wrist_y));
        kp.set(BodyJoint::RightWrist, Keypoint::new(0.5, wrist_y));
        kp
    }

    fn tracker() -> SwingStateTracker {
        SwingStateTracker::new(
            &SwingTrackerConfig::default(),
            TimeWindow::new(0, 5_000).unwrap(),
            FrameSize::new(1920, 1080),
        )
    }

    #[test]
    fn test_speed_threshold_scales_with_long_edge() {
        let config = SwingTrackerConfig::default();
        let window = TimeWindow::new(0, 1_000).unwrap();
        let small = SwingStateTracker::new(&config, window, FrameSize::new(640, 360));
        let large = SwingStateTracker::new(&config, window, FrameSize::new(960, 1920));
        assert!((small.min_down_speed_px - 220.0).abs() < 1e-3);
        assert!((large.min_down_speed_px - 0.22 * 1920.0).abs() < 1e-3);
    }

    #[test]
    fn test_rejects_non_increasing_and_close_samples() {
        let mut t = tracker();
        assert_eq!(t.observe(1_000, Some(&pose(0.3))), None);
        assert_eq!(t.previous.map(|p| p.timestamp_ms), Some(1_000));

        t.observe(1_000, Some(&pose(0.4)));
        t.observe(900, Some(&pose(0.4)));
        t.observe(1_050, Some(&pose(0.4)));
        assert_eq!(t.previous.map(|p| p.timestamp_ms), Some(1_000));
        assert_eq!(t.top_detector.len(), 1);

        t.observe(1_067, Some(&pose(0.4)));
        assert_eq!(t.previous.map(|p| p.timestamp_ms), Some(1_067));
    }

    #[test]
    fn test_missing_pose_leaves_state_untouched() {
        let mut t = tracker();
        t.observe(0, Some(&pose(0.3)));
        assert_eq!(t.observe(100, None), None);

        let mut broken = pose(0.3);
        broken.set(BodyJoint::LeftHip, Keypoint::new(0.4, f32::NAN));
        t.observe(200, Some(&broken));

        let short = PoseKeypoints::new(
            KeypointLayout::MediaPipe33,
            vec![Keypoint::new(0.5, 0.5); 17],
        );
        t.observe(300, Some(&short));

        assert_eq!(t.top_detector.len(), 1);
        assert_eq!(t.previous.map(|p| p.timestamp_ms), Some(0));
    }

    #[test]
    fn test_phase_follows_top_and_cooldown() {
        let mut t = tracker();
        assert_eq!(t.phase(0), TrackerPhase::AwaitingTop);

        t.last_top_ms = Some(1_000);
        assert_eq!(t.phase(1_050), TrackerPhase::AwaitingTop);
        assert_eq!(t.phase(1_120), TrackerPhase::TopSeen);
        assert_eq!(t.phase(2_400), TrackerPhase::TopSeen);
        assert_eq!(t.phase(2_401), TrackerPhase::AwaitingTop);

        t.cooldown_until_ms = 2_000;
        assert_eq!(t.phase(1_500), TrackerPhase::Cooldown);
        assert_eq!(t.phase(2_000), TrackerPhase::TopSeen);
    }

    #[test]
    fn test_left_hand_tracking_reads_left_wrist() {
        let config = SwingTrackerConfig {
            tracked_hand: TrackedHand::Left,
            ..Default::default()
        };
        let mut t = SwingStateTracker::new(
            &config,
            TimeWindow::new(0, 5_000).unwrap(),
            FrameSize::new(1920, 1080),
        );
        let mut kp = pose(0.3);
        kp.set(BodyJoint::LeftWrist, Keypoint::new(0.5, 0.2));
        t.observe(0, Some(&kp));
        assert_eq!(t.previous.map(|p| p.wrist_y), Some(0.2));
    }

    #[test]
    fn test_mirrored_sample_flips_offsets() {
        let mut plain = tracker();
        let mut mirrored = tracker();

        let mut kp = pose(0.3);
        kp.set(BodyJoint::RightWrist, Keypoint::new(0.7, 0.3));
        plain.observe(0, Some(&kp));
        mirrored.observe(0, Some(&kp.flipped_horizontally()));

        assert_eq!(plain.mirrored(), Some(false));
        assert_eq!(mirrored.mirrored(), Some(true));
        let a = plain.previous.map(|p| p.wrist_offset_px).unwrap();
        let b = mirrored.previous.map(|p| p.wrist_offset_px).unwrap();
        assert!((a - b).abs() < 1e-3);
        assert!(a > 0.0);
    }
}
