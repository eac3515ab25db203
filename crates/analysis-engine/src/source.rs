//! Collaborator interfaces for video decoding and pose estimation.
//!
//! The analysis engine never decodes video or runs a model itself. A
//! [`VideoSource`] hands out motion grids and decoded frames; a
//! [`PoseEstimator`] turns a frame into keypoints.

use swingcut_common::error::SwingcutResult;
use swingcut_pose_model::frame::FrameSize;
use swingcut_pose_model::grid::MotionGrid;
use swingcut_pose_model::keypoints::PoseKeypoints;
use swingcut_pose_model::time::TimeWindow;

/// A frame decoded at a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame<F> {
    pub timestamp_ms: u64,
    pub frame: F,
}

impl<F> DecodedFrame<F> {
    pub fn new(timestamp_ms: u64, frame: F) -> Self {
        Self {
            timestamp_ms,
            frame,
        }
    }
}

/// Lazy, finite sequence of frames. Each item may fail on its own.
pub type FrameStream<'a, F> = Box<dyn Iterator<Item = SwingcutResult<DecodedFrame<F>>> + 'a>;

/// Trait for a decodable video.
///
/// Implementations wrap a platform decoder or replay pre-extracted data.
pub trait VideoSource {
    /// Decoded frame type handed to the estimator.
    type Frame;

    /// Video duration in milliseconds. Zero for unreadable media.
    fn duration_ms(&self) -> u64;

    /// Native frame dimensions.
    fn frame_size(&self) -> FrameSize;

    /// Downsampled RGB grid of the frame nearest to `t`.
    ///
    /// Returns `None` when no frame can be decoded there.
    fn sample_grid(&mut self, t: u64, grid_width: u32, grid_height: u32) -> Option<MotionGrid>;

    /// Decode `window` at most once every `step_ms`.
    ///
    /// Timestamps are non-decreasing and at least `step_ms` apart. Failing
    /// to open the stream is an error; failing on a single frame yields an
    /// `Err` item and the stream continues.
    fn decode(
        &mut self,
        window: TimeWindow,
        step_ms: u64,
    ) -> SwingcutResult<FrameStream<'_, Self::Frame>>;
}

/// Trait for a pose estimation backend.
pub trait PoseEstimator<F> {
    /// Estimate the pose in `frame`. `Ok(None)` means no person was found.
    fn detect(&mut self, frame: &F, timestamp_ms: u64) -> SwingcutResult<Option<PoseKeypoints>>;

    /// Release backend resources. Safe to call more than once.
    fn close(&mut self) {}
}
