//! Coarse motion scan: the cheap first pass over a video.
//!
//! # Algorithm
//!
//! 1. **Sample** a downsampled grid every `sampling_interval_ms` from 0 to the duration.
//! 2. **Diff** each grid against the previous one of identical size: the
//!    motion ratio is the fraction of cells with any channel changed by more
//!    than `pixel_diff_threshold`.
//! 3. **Open** a window one sample back when the ratio exceeds `diff_threshold`.
//! 4. **Close** it once two sampling intervals pass without motion; drop
//!    windows shorter than `min_window_ms`, pad the rest by `pad_window_ms`.
//! 5. **Merge** windows separated by at most `merge_gap_ms`.
//!
//! A tick whose grid could not be produced contributes nothing: it neither
//! signals motion nor counts towards closing a window.

use swingcut_common::config::MotionScanConfig;
use swingcut_pose_model::grid::MotionGrid;
use swingcut_pose_model::time::TimeWindow;

/// Incremental motion window scanner for one video.
#[derive(Debug)]
pub struct MotionWindowScanner {
    config: MotionScanConfig,
    duration_ms: u64,
    previous: Option<MotionGrid>,
    in_motion: bool,
    window_start_ms: u64,
    last_motion_ms: Option<u64>,
    windows: Vec<TimeWindow>,
}

impl MotionWindowScanner {
    /// Create a scanner for a video of `duration_ms`.
    pub fn new(config: MotionScanConfig, duration_ms: u64) -> Self {
        Self {
            config,
            duration_ms,
            previous: None,
            in_motion: false,
            window_start_ms: 0,
            last_motion_ms: None,
            windows: vec![],
        }
    }

    /// Timestamps at which the scan samples the video.
    pub fn sample_times(&self) -> impl Iterator<Item = u64> {
        let step = self.config.sampling_interval_ms.max(1) as usize;
        (0..=self.duration_ms).step_by(step)
    }

    /// Feed the grid sampled at `t` (`None` if it could not be decoded).
    ///
    /// Returns the motion ratio computed for this tick, if any.
    pub fn push(&mut self, t: u64, grid: Option<MotionGrid>) -> Option<f32> {
        let grid = grid?;

        let ratio = self
            .previous
            .as_ref()
            .and_then(|prev| grid.motion_ratio(prev, self.config.pixel_diff_threshold))
            .unwrap_or(0.0);
        let interval = self.config.sampling_interval_ms;

        if ratio > self.config.diff_threshold {
            if !self.in_motion {
                self.in_motion = true;
                self.window_start_ms = t.saturating_sub(interval);
                tracing::trace!(t, ratio, "motion window opened");
            }
            self.last_motion_ms = Some(t);
        } else if self.in_motion {
            if let Some(last) = self.last_motion_ms {
                if t.saturating_sub(last) >= interval * 2 {
                    self.close_window(self.window_start_ms, last);
                    self.in_motion = false;
                    self.last_motion_ms = None;
                }
            }
        }

        self.previous = Some(grid);
        Some(ratio)
    }

    /// Close any open window and return the merged, time-ordered windows.
    pub fn finish(mut self) -> Vec<TimeWindow> {
        if self.in_motion {
            let raw_end = self.last_motion_ms.unwrap_or(self.duration_ms);
            self.close_window(self.window_start_ms, raw_end);
        }

        let merged = merge_windows(self.windows, self.config.merge_gap_ms);
        tracing::debug!(
            windows = merged.len(),
            duration_ms = self.duration_ms,
            "motion scan finished"
        );
        merged
    }

    fn close_window(&mut self, raw_start: u64, raw_end: u64) {
        if raw_end.saturating_sub(raw_start) < self.config.min_window_ms {
            tracing::trace!(raw_start, raw_end, "motion window too short, dropped");
            return;
        }

        let start = raw_start.saturating_sub(self.config.pad_window_ms);
        let end = raw_end
            .saturating_add(self.config.pad_window_ms)
            .min(self.duration_ms);
        if let Some(window) = TimeWindow::new(start, end) {
            self.windows.push(window);
        }
    }
}

/// Scan a whole video, pulling grids from `frame_provider`.
pub fn scan(
    config: &MotionScanConfig,
    duration_ms: u64,
    mut frame_provider: impl FnMut(u64) -> Option<MotionGrid>,
) -> Vec<TimeWindow> {
    let mut scanner = MotionWindowScanner::new(config.clone(), duration_ms);
    let times: Vec<u64> = scanner.sample_times().collect();
    for t in times {
        scanner.push(t, frame_provider(t));
    }
    scanner.finish()
}

/// Sort windows by start and merge those separated by at most `merge_gap_ms`.
pub fn merge_windows(mut windows: Vec<TimeWindow>, merge_gap_ms: u64) -> Vec<TimeWindow> {
    windows.sort_by_key(|w| w.start_ms);

    let mut merged: Vec<TimeWindow> = Vec::with_capacity(windows.len());
    for candidate in windows {
        match merged.last_mut() {
            Some(current) if candidate.start_ms <= current.end_ms.saturating_add(merge_gap_ms) => {
                current.end_ms = current.end_ms.max(candidate.end_ms);
            }
            _ => merged.push(candidate),
        }
    }
    merged
}
