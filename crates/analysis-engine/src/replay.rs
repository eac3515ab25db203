//! Replay of recording bundles through the analysis pipeline.
//!
//! A recording bundle stores the motion grids and per-frame poses extracted
//! from a video. [`ReplayVideo`] serves them back as a [`VideoSource`] and
//! [`RecordedPoseEstimator`] hands out the stored keypoints, so the full
//! pipeline runs without a decoder or a model.

use swingcut_common::clock::RateController;
use swingcut_common::error::{SwingcutError, SwingcutResult};
use swingcut_pose_model::frame::FrameSize;
use swingcut_pose_model::grid::{MotionGrid, MotionRecord};
use swingcut_pose_model::keypoints::{KeypointLayout, PoseKeypoints};
use swingcut_pose_model::recording::LoadedRecording;
use swingcut_pose_model::sample::PoseRecord;
use swingcut_pose_model::time::TimeWindow;

use crate::source::{DecodedFrame, FrameStream, PoseEstimator, VideoSource};

/// Motion grids further than this from the requested time count as undecodable.
const GRID_TOLERANCE_MS: u64 = 250;

/// A replayed frame: the pose stored for its timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFrame {
    pub timestamp_ms: u64,
    pub keypoints: Option<PoseKeypoints>,
}

/// Video source backed by the signals of a recording bundle.
#[derive(Debug, Clone)]
pub struct ReplayVideo {
    duration_ms: u64,
    frame_size: FrameSize,
    layout: KeypointLayout,
    poses: Vec<PoseRecord>,
    motion: Vec<MotionRecord>,
}

impl ReplayVideo {
    pub fn new(
        duration_ms: u64,
        frame_size: FrameSize,
        layout: KeypointLayout,
        mut poses: Vec<PoseRecord>,
        mut motion: Vec<MotionRecord>,
    ) -> Self {
        poses.sort_by_key(|p| p.timestamp_ms);
        motion.sort_by_key(|m| m.timestamp_ms);
        Self {
            duration_ms,
            frame_size,
            layout,
            poses,
            motion,
        }
    }

    /// Load the pose and motion streams of a recording.
    pub fn from_recording(recording: &LoadedRecording) -> SwingcutResult<Self> {
        let (header, poses) = recording
            .load_poses()
            .map_err(|e| SwingcutError::recording(e.to_string()))?;
        let motion = recording
            .load_motion()
            .map_err(|e| SwingcutError::recording(e.to_string()))?;

        tracing::debug!(
            root = %recording.root.display(),
            poses = poses.len(),
            grids = motion.len(),
            layout = header.layout.name(),
            "Loaded recording for replay"
        );

        Ok(Self::new(
            recording.meta.video.duration_ms,
            recording.meta.video.frame_size(),
            header.layout,
            poses,
            motion,
        ))
    }

    pub fn layout(&self) -> KeypointLayout {
        self.layout
    }

    pub fn pose_count(&self) -> usize {
        self.poses.len()
    }

    pub fn grid_count(&self) -> usize {
        self.motion.len()
    }

    /// All stored poses as timestamped keypoints.
    pub fn poses(&self) -> impl Iterator<Item = (u64, Option<PoseKeypoints>)> + '_ {
        self.poses.iter().map(|p| (p.timestamp_ms, p.to_pose(self.layout)))
    }

    fn nearest_grid(&self, t: u64) -> Option<&MotionRecord> {
        let idx = self.motion.partition_point(|m| m.timestamp_ms < t);
        let after = self.motion.get(idx);
        let before = idx.checked_sub(1).and_then(|i| self.motion.get(i));

        let nearest = match (before, after) {
            (Some(b), Some(a)) => {
                if t - b.timestamp_ms <= a.timestamp_ms - t {
                    b
                } else {
                    a
                }
            }
            (Some(b), None) => b,
            (None, Some(a)) => a,
            (None, None) => return None,
        };

        (nearest.timestamp_ms.abs_diff(t) <= GRID_TOLERANCE_MS).then_some(nearest)
    }
}

impl VideoSource for ReplayVideo {
    type Frame = ReplayFrame;

    fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    fn sample_grid(&mut self, t: u64, grid_width: u32, grid_height: u32) -> Option<MotionGrid> {
        let record = self.nearest_grid(t)?;
        let grid = &record.grid;
        if grid.width == grid_width && grid.height == grid_height {
            return Some(grid.clone());
        }
        match MotionGrid::downsample(
            grid.width,
            grid.height,
            &grid.pixels,
            grid_width,
            grid_height,
        ) {
            Ok(resampled) => Some(resampled),
            Err(e) => {
                tracing::debug!(t, error = %e, "Stored grid cannot be resampled");
                None
            }
        }
    }

    fn decode(
        &mut self,
        window: TimeWindow,
        step_ms: u64,
    ) -> SwingcutResult<FrameStream<'_, ReplayFrame>> {
        if window.start_ms >= self.duration_ms {
            return Err(SwingcutError::frame_source(format!(
                "window {}..{}ms starts past the end of the video ({}ms)",
                window.start_ms, window.end_ms, self.duration_ms
            )));
        }

        let layout = self.layout;
        let mut gate = RateController::new(step_ms);
        let frames = self
            .poses
            .iter()
            .filter(move |p| window.contains(p.timestamp_ms))
            .filter(move |p| gate.should_tick(p.timestamp_ms))
            .map(move |p| {
                Ok(DecodedFrame::new(
                    p.timestamp_ms,
                    ReplayFrame {
                        timestamp_ms: p.timestamp_ms,
                        keypoints: p.to_pose(layout),
                    },
                ))
            });

        Ok(Box::new(frames))
    }
}

/// Estimator that returns the keypoints stored in a [`ReplayFrame`].
#[derive(Debug, Clone, Default)]
pub struct RecordedPoseEstimator {
    calls: u64,
    closed: bool,
}

impl RecordedPoseEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `detect` calls served.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl PoseEstimator<ReplayFrame> for RecordedPoseEstimator {
    fn detect(
        &mut self,
        frame: &ReplayFrame,
        timestamp_ms: u64,
    ) -> SwingcutResult<Option<PoseKeypoints>> {
        if frame.timestamp_ms != timestamp_ms {
            return Err(SwingcutError::estimator(format!(
                "frame at {}ms requested as {timestamp_ms}ms",
                frame.timestamp_ms
            )));
        }
        self.calls += 1;
        Ok(frame.keypoints.clone())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
