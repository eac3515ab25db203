//! Timing utilities for frame sampling and latency bookkeeping.
//!
//! All SwingCut timestamps are milliseconds from the start of the video.

use std::collections::VecDeque;

/// Convert milliseconds to fractional seconds.
pub fn ms_to_secs(ms: u64) -> f64 {
    ms as f64 / 1_000.0
}

/// Rate gate for frame delivery.
///
/// Accepts a timestamp when it is strictly later than the last accepted one
/// and at least one interval after it. The first timestamp is always accepted.
#[derive(Debug, Clone)]
pub struct RateController {
    interval_ms: u64,
    last_tick_ms: Option<u64>,
}

impl RateController {
    /// Create a controller that accepts at most one tick per `interval_ms`.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_tick_ms: None,
        }
    }

    /// Create a controller targeting the given rate.
    pub fn from_hz(target_hz: u32) -> Self {
        let hz = target_hz.max(1) as f64;
        Self::new(((1_000.0 / hz).round() as u64).max(1))
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    pub fn should_tick(&mut self, current_ms: u64) -> bool {
        match self.last_tick_ms {
            None => {
                self.last_tick_ms = Some(current_ms);
                true
            }
            Some(last) if current_ms > last && current_ms - last >= self.interval_ms => {
                self.last_tick_ms = Some(current_ms);
                true
            }
            _ => false,
        }
    }

    /// Target interval in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Forget the last accepted tick.
    pub fn reset(&mut self) {
        self.last_tick_ms = None;
    }
}

/// Summary of the samples held by a [`LatencyMeter`].
///
/// Both figures are NaN while the meter is empty.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct LatencyStats {
    pub avg_ms: f64,
    pub p95_ms: f64,
    pub count: usize,
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self {
            avg_ms: f64::NAN,
            p95_ms: f64::NAN,
            count: 0,
        }
    }
}

/// Bounded ring of recent latency samples.
#[derive(Debug, Clone)]
pub struct LatencyMeter {
    capacity: usize,
    samples: VecDeque<f64>,
}

impl Default for LatencyMeter {
    fn default() -> Self {
        Self::new(240)
    }
}

impl LatencyMeter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Record one latency in milliseconds. Negative or non-finite values are ignored.
    pub fn push(&mut self, latency_ms: f64) {
        if !latency_ms.is_finite() || latency_ms < 0.0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(latency_ms);
    }

    /// Average and linearly interpolated 95th percentile of held samples.
    pub fn snapshot(&self) -> LatencyStats {
        if self.samples.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);

        let avg_ms = sorted.iter().sum::<f64>() / sorted.len() as f64;
        LatencyStats {
            avg_ms,
            p95_ms: percentile(&sorted, 0.95),
            count: sorted.len(),
        }
    }
}

fn percentile(sorted: &[f64], q: f64) -> f64 {
    let last = (sorted.len() - 1) as f64;
    let pos = (q * last).clamp(0.0, last);
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let t = pos - lo as f64;
    sorted[lo] * (1.0 - t) + sorted[hi] * t
}
