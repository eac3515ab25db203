//! The two-stage analysis pipeline.
//!
//! 1. Scan the whole video for motion windows on cheap downsampled grids.
//! 2. Decode each window at the inference rate, estimate poses, and run a
//!    fresh swing tracker over them.
//! 3. Merge the segments of all windows.
//!
//! Windows run strictly in order and never share tracker state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use swingcut_common::clock::{LatencyMeter, LatencyStats};
use swingcut_common::config::DetectorConfig;
use swingcut_common::error::{SwingcutError, SwingcutResult};
use swingcut_pose_model::recording::SwingReport;
use swingcut_pose_model::time::{Segment, TimeWindow};
use swingcut_swing_core::motion_scan::MotionWindowScanner;
use swingcut_swing_core::segment_merge::SegmentMerger;
use swingcut_swing_core::swing_tracker::SwingStateTracker;

use crate::source::{PoseEstimator, VideoSource};

/// Share of the progress range spent on the motion scan, in percent.
const SCAN_PROGRESS_PERCENT: u64 = 20;

/// Cooperative cancellation flag, checked at every sample boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once [`CancelToken::cancel`] has been called.
    pub fn check(&self) -> SwingcutResult<()> {
        if self.is_cancelled() {
            Err(SwingcutError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Forwards only strictly increasing progress values to a callback.
pub struct ProgressReporter<P> {
    callback: P,
    total_ms: u64,
    last_ms: Option<u64>,
}

impl<P: FnMut(u64, u64)> ProgressReporter<P> {
    pub fn new(total_ms: u64, callback: P) -> Self {
        Self {
            callback,
            total_ms,
            last_ms: None,
        }
    }

    /// Report `processed_ms` (clamped to the total) if it moved forward.
    pub fn report(&mut self, processed_ms: u64) {
        let processed_ms = processed_ms.min(self.total_ms);
        if self.last_ms.map_or(true, |last| processed_ms > last) {
            self.last_ms = Some(processed_ms);
            (self.callback)(processed_ms, self.total_ms);
        }
    }

    pub fn last_reported(&self) -> Option<u64> {
        self.last_ms
    }
}

/// Counters collected during one analysis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStats {
    /// Motion windows that were decoded.
    pub windows: usize,

    /// Frames delivered to the estimator.
    pub frames_decoded: u64,

    /// Frames the source failed to decode.
    pub frames_skipped: u64,

    /// Frames with a detected pose.
    pub poses_detected: u64,

    /// Estimator calls that failed and were treated as "no pose".
    pub estimator_failures: u64,

    /// Segments emitted by trackers before merging.
    pub raw_segments: usize,

    /// Segments after merging.
    pub segments: usize,

    /// Estimator call latency over recent frames.
    pub estimator_latency: LatencyStats,
}

impl AnalysisStats {
    /// Share of decoded frames with a pose, in percent.
    pub fn detection_rate(&self) -> f64 {
        if self.frames_decoded == 0 {
            return 0.0;
        }
        self.poses_detected as f64 / self.frames_decoded as f64 * 100.0
    }
}

/// Outcome of a completed analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub duration_ms: u64,
    pub windows: Vec<TimeWindow>,
    pub segments: Vec<Segment>,
    pub stats: AnalysisStats,
}

impl AnalysisReport {
    fn empty(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            windows: vec![],
            segments: vec![],
            stats: AnalysisStats::default(),
        }
    }

    /// True when the analysis completed and found no swings.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The persisted form written to a recording bundle.
    pub fn to_swing_report(&self) -> SwingReport {
        SwingReport::new(self.duration_ms, self.windows.clone(), self.segments.clone())
    }
}

/// Drives motion scan, pose tracking, and merging over one video.
#[derive(Debug, Clone)]
pub struct SwingAnalyzer {
    config: DetectorConfig,
    cancel: CancelToken,
}

impl SwingAnalyzer {
    /// Create an analyzer, rejecting invalid configuration.
    pub fn new(config: DetectorConfig) -> SwingcutResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: DetectorConfig::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Share an externally owned cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run the coarse motion scan only.
    pub fn scan_windows<V: VideoSource>(&self, video: &mut V) -> SwingcutResult<Vec<TimeWindow>> {
        let duration_ms = video.duration_ms();
        let mut progress = ProgressReporter::new(duration_ms, |_, _| {});
        self.scan(video, duration_ms, &mut progress)
    }

    /// Analyze a whole video.
    ///
    /// `progress` receives strictly increasing `(processed_ms, total_ms)`
    /// pairs. The estimator is closed before returning, whatever the outcome.
    pub fn analyze<V, E, P>(
        &self,
        video: &mut V,
        estimator: &mut E,
        progress: P,
    ) -> SwingcutResult<AnalysisReport>
    where
        V: VideoSource,
        E: PoseEstimator<V::Frame>,
        P: FnMut(u64, u64),
    {
        let started = Instant::now();
        let result = self.run(video, estimator, progress);
        estimator.close();

        match &result {
            Ok(report) => tracing::info!(
                duration_ms = report.duration_ms,
                windows = report.windows.len(),
                segments = report.segments.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Analysis complete"
            ),
            Err(SwingcutError::Cancelled) => tracing::info!("Analysis cancelled"),
            Err(e) => tracing::error!(error = %e, "Analysis failed"),
        }
        result
    }

    fn run<V, E, P>(
        &self,
        video: &mut V,
        estimator: &mut E,
        progress: P,
    ) -> SwingcutResult<AnalysisReport>
    where
        V: VideoSource,
        E: PoseEstimator<V::Frame>,
        P: FnMut(u64, u64),
    {
        let duration_ms = video.duration_ms();
        if duration_ms == 0 {
            tracing::warn!("Video has zero duration; nothing to analyze");
            return Ok(AnalysisReport::empty(0));
        }

        let mut progress = ProgressReporter::new(duration_ms, progress);
        let windows = self.scan(video, duration_ms, &mut progress)?;
        let scan_share = duration_ms * SCAN_PROGRESS_PERCENT / 100;
        progress.report(scan_share);

        let frame_size = video.frame_size().fit_long_edge(self.config.max_long_edge);
        let step_ms = self.config.tracker.inference_step_ms;
        let total_window_ms: u64 = windows.iter().map(TimeWindow::duration_ms).sum();
        let window_progress = |done_ms: u64| -> u64 {
            if total_window_ms == 0 {
                return duration_ms;
            }
            let remaining = (duration_ms - scan_share) as u128;
            scan_share + (done_ms as u128 * remaining / total_window_ms as u128) as u64
        };

        tracing::info!(
            windows = windows.len(),
            window_ms = total_window_ms,
            width = frame_size.width,
            height = frame_size.height,
            "Tracking swings in motion windows"
        );

        let mut stats = AnalysisStats {
            windows: windows.len(),
            ..Default::default()
        };
        let mut latency = LatencyMeter::default();
        let mut merger = SegmentMerger::new(self.config.merge.merge_gap_ms);
        let mut done_window_ms = 0u64;

        for window in &windows {
            self.cancel.check()?;

            let mut tracker = SwingStateTracker::new(&self.config.tracker, *window, frame_size);
            let frames = video.decode(*window, step_ms)?;

            for item in frames {
                self.cancel.check()?;

                let decoded = match item {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        stats.frames_skipped += 1;
                        tracing::debug!(error = %e, "Skipping undecodable frame");
                        continue;
                    }
                };
                stats.frames_decoded += 1;
                let t = decoded.timestamp_ms;

                let call_started = Instant::now();
                let keypoints = match estimator.detect(&decoded.frame, t) {
                    Ok(keypoints) => keypoints,
                    Err(e) => {
                        stats.estimator_failures += 1;
                        tracing::warn!(
                            t,
                            error = %e,
                            "Pose estimation failed; treating as no pose"
                        );
                        None
                    }
                };
                latency.push(call_started.elapsed().as_secs_f64() * 1_000.0);
                if keypoints.is_some() {
                    stats.poses_detected += 1;
                }

                if let Some(segment) = tracker.observe(t, keypoints.as_ref()) {
                    tracing::info!(
                        t,
                        start_ms = segment.start_ms,
                        end_ms = segment.end_ms,
                        "Swing detected"
                    );
                    stats.raw_segments += 1;
                    merger.append(segment);
                }

                let within = t.clamp(window.start_ms, window.end_ms) - window.start_ms;
                progress.report(window_progress(done_window_ms + within));
            }

            done_window_ms += window.duration_ms();
            progress.report(window_progress(done_window_ms));
        }

        let segments = merger.finish();
        progress.report(duration_ms);

        stats.segments = segments.len();
        stats.estimator_latency = latency.snapshot();

        Ok(AnalysisReport {
            duration_ms,
            windows,
            segments,
            stats,
        })
    }

    fn scan<V, P>(
        &self,
        video: &mut V,
        duration_ms: u64,
        progress: &mut ProgressReporter<P>,
    ) -> SwingcutResult<Vec<TimeWindow>>
    where
        V: VideoSource,
        P: FnMut(u64, u64),
    {
        let scan = &self.config.scan;
        let mut scanner = MotionWindowScanner::new(scan.clone(), duration_ms);
        let times: Vec<u64> = scanner.sample_times().collect();
        let mut missing = 0usize;

        for t in times {
            self.cancel.check()?;
            let grid = video.sample_grid(t, scan.grid_width, scan.grid_height);
            if grid.is_none() {
                missing += 1;
            }
            scanner.push(t, grid);
            progress.report(t * SCAN_PROGRESS_PERCENT / 100);
        }

        if missing > 0 {
            tracing::debug!(missing, "Motion scan ticks without a decodable frame");
        }
        Ok(scanner.finish())
    }
}
