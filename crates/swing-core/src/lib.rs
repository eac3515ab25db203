//! SwingCut Swing Core: swing event detection
//!
//! Turns coarse motion and pose keypoints into swing segments:
//! - **Motion scan:** Find candidate windows from downsampled frame differences
//! - **Top detection:** Recognize the backswing apex of the tracked wrist
//! - **Swing tracking:** Recognize impact and emit a padded segment
//! - **Merging:** Collapse overlapping and adjacent segments
//!
//! This crate is pure computation with no I/O, decoding, or inference.
//! All inputs are data; all outputs are data.

pub mod activity;
pub mod motion_scan;
pub mod segment_merge;
pub mod swing_tracker;
pub mod top_detector;

pub use activity::{ActivityConfig, ActivitySegmenter};
pub use motion_scan::MotionWindowScanner;
pub use segment_merge::SegmentMerger;
pub use swing_tracker::{SwingStateTracker, TrackerPhase};
pub use top_detector::RingTopDetector;
