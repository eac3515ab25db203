//! SwingCut Analysis Engine
//!
//! Runs swing detection over a whole video. Decoding and pose estimation
//! stay behind the [`VideoSource`] and [`PoseEstimator`] traits; the engine
//! only orders the work and collects the results.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  SwingAnalyzer                    │
//! │                                                   │
//! │  VideoSource ──grids──▶ MotionWindowScanner       │
//! │       │                        │ windows          │
//! │       │ frames                 ▼                  │
//! │       └────▶ PoseEstimator ──▶ SwingStateTracker  │
//! │                                │ segments         │
//! │                                ▼                  │
//! │                          SegmentMerger            │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod driver;
pub mod replay;
pub mod source;
pub mod synthetic;

pub use driver::{AnalysisReport, AnalysisStats, CancelToken, ProgressReporter, SwingAnalyzer};
pub use replay::{RecordedPoseEstimator, ReplayFrame, ReplayVideo};
pub use source::{DecodedFrame, FrameStream, PoseEstimator, VideoSource};
pub use synthetic::{SyntheticRecording, SyntheticSwing};
