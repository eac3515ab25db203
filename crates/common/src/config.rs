//! Application and detector configuration.
//!
//! Every threshold the detection pipeline uses lives in [`DetectorConfig`]
//! and is handed to each component at construction, so tests and the CLI
//! can override single values without touching global state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{SwingcutError, SwingcutResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Detection pipeline thresholds.
    pub detector: DetectorConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// All tunables of the swing detection pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Coarse motion scan.
    pub scan: MotionScanConfig,

    /// Per-window swing state machine.
    pub tracker: SwingTrackerConfig,

    /// Final segment merge.
    pub merge: MergeConfig,

    /// Frames are scaled down to this long edge (pixels) before inference.
    pub max_long_edge: u32,
}

/// Coarse motion scan parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionScanConfig {
    /// Distance between grid samples (ms). 200ms = 5Hz.
    pub sampling_interval_ms: u64,

    /// Downsampled grid width in cells.
    pub grid_width: u32,

    /// Downsampled grid height in cells.
    pub grid_height: u32,

    /// Per-channel intensity difference (0-255) above which a cell counts as changed.
    pub pixel_diff_threshold: u8,

    /// Fraction of changed cells above which a tick counts as motion.
    pub diff_threshold: f32,

    /// Raw windows shorter than this are discarded (ms).
    pub min_window_ms: u64,

    /// Padding added to both ends of a kept window (ms).
    pub pad_window_ms: u64,

    /// Windows separated by at most this gap are merged (ms).
    pub merge_gap_ms: u64,
}

/// Which wrist the tracker follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrackedHand {
    Left,
    #[default]
    Right,
}

/// Swing state machine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwingTrackerConfig {
    /// Minimum spacing between accepted samples (ms). 67ms ~ 15fps.
    pub inference_step_ms: u64,

    /// Half-height of the hip band (normalized units).
    pub hip_band_tol: f32,

    /// Segment starts this long before impact (ms).
    pub pre_impact_ms: u64,

    /// Segment ends this long after impact (ms).
    pub post_impact_ms: u64,

    /// No second impact is recognized within this time of the first (ms).
    pub cooldown_ms: u64,

    /// Earliest impact after a recognized top (ms).
    pub recent_top_min_ms: u64,

    /// Latest impact after a recognized top (ms).
    pub recent_top_max_ms: u64,

    /// Absolute floor for the downward wrist speed (px/s).
    pub min_down_speed_px: f32,

    /// Downward wrist speed as a fraction of the long edge per second.
    pub down_speed_long_edge_ratio: f32,

    /// Reference wrist.
    pub tracked_hand: TrackedHand,
}

/// Segment merge parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Segments separated by at most this gap are merged (ms).
    pub merge_gap_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "swingcut=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            scan: MotionScanConfig::default(),
            tracker: SwingTrackerConfig::default(),
            merge: MergeConfig::default(),
            max_long_edge: 960,
        }
    }
}

impl Default for MotionScanConfig {
    fn default() -> Self {
        Self {
            sampling_interval_ms: 200,
            grid_width: 160,
            grid_height: 90,
            pixel_diff_threshold: 15,
            diff_threshold: 0.08,
            min_window_ms: 500,
            pad_window_ms: 400,
            merge_gap_ms: 600,
        }
    }
}

impl Default for SwingTrackerConfig {
    fn default() -> Self {
        Self {
            inference_step_ms: 67,
            hip_band_tol: 0.10,
            pre_impact_ms: 1_000,
            post_impact_ms: 2_200,
            cooldown_ms: 900,
            recent_top_min_ms: 120,
            recent_top_max_ms: 1_400,
            min_down_speed_px: 220.0,
            down_speed_long_edge_ratio: 0.22,
            tracked_hand: TrackedHand::Right,
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self { merge_gap_ms: 150 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl DetectorConfig {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> SwingcutResult<()> {
        if self.scan.sampling_interval_ms == 0 {
            return Err(SwingcutError::config("scan.sampling_interval_ms must be > 0"));
        }
        if self.scan.grid_width == 0 || self.scan.grid_height == 0 {
            return Err(SwingcutError::config("scan grid dimensions must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.scan.diff_threshold) {
            return Err(SwingcutError::config(format!(
                "scan.diff_threshold must be within [0, 1], got {}",
                self.scan.diff_threshold
            )));
        }
        if self.tracker.inference_step_ms == 0 {
            return Err(SwingcutError::config("tracker.inference_step_ms must be > 0"));
        }
        if !self.tracker.hip_band_tol.is_finite() || self.tracker.hip_band_tol < 0.0 {
            return Err(SwingcutError::config(
                "tracker.hip_band_tol must be a finite, non-negative value",
            ));
        }
        if self.tracker.recent_top_min_ms > self.tracker.recent_top_max_ms {
            return Err(SwingcutError::config(format!(
                "tracker.recent_top_min_ms ({}) exceeds recent_top_max_ms ({})",
                self.tracker.recent_top_min_ms, self.tracker.recent_top_max_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.tracker.down_speed_long_edge_ratio) {
            return Err(SwingcutError::config(
                "tracker.down_speed_long_edge_ratio must be within [0, 1]",
            ));
        }
        if self.max_long_edge == 0 {
            return Err(SwingcutError::config("max_long_edge must be > 0"));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("swingcut").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        DetectorConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let raw = r#"{ "detector": { "tracker": { "cooldown_ms": 1200 } } }"#;
        let parsed: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.detector.tracker.cooldown_ms, 1200);
        assert_eq!(parsed.detector.tracker.pre_impact_ms, 1_000);
        assert_eq!(parsed.detector.scan.sampling_interval_ms, 200);
        assert_eq!(parsed.detector.merge.merge_gap_ms, 150);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn test_tracked_hand_serializes_snake_case() {
        let json = serde_json::to_string(&TrackedHand::Left).unwrap();
        assert_eq!(json, "\"left\"");
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = DetectorConfig::default();
        config.scan.sampling_interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(SwingcutError::Config { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_top_bounds() {
        let mut config = DetectorConfig::default();
        config.tracker.recent_top_min_ms = 2_000;
        assert!(config.validate().is_err());
    }
}
