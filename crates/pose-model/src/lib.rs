//! SwingCut Pose Model
//!
//! Defines the data contracts shared by the detection pipeline:
//! - **Time:** windows from the motion scan and detected swing segments
//! - **Grids:** downsampled frames used for coarse motion detection
//! - **Keypoints:** backend-agnostic pose estimates and their native layouts
//! - **Recordings:** on-disk bundles of replayable pose and motion signals
//!
//! All keypoint coordinates are normalized to `[0.0, 1.0]` relative to the
//! frame, with `(0, 0)` at the top-left. Timestamps are milliseconds from
//! the start of the video.

pub mod frame;
pub mod grid;
pub mod keypoints;
pub mod recording;
pub mod sample;
pub mod time;

pub use frame::*;
pub use grid::*;
pub use keypoints::*;
pub use recording::*;
pub use sample::*;
pub use time::*;
