//! Recording bundles.
//!
//! A recording bundle holds the signals extracted from one video so the
//! detection pipeline can be replayed without a decoder or a pose model:
//!
//! ```text
//! <root>/meta/recording.json   RecordingMeta
//! <root>/meta/poses.jsonl      pose stream (header + one record per frame)
//! <root>/meta/motion.jsonl     downsampled motion grids
//! <root>/meta/segments.json    SwingReport written by analysis
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::frame::FrameSize;
use crate::grid::{parse_motion_records, serialize_motion_records, MotionRecord};
use crate::keypoints::KeypointLayout;
use crate::sample::{
    parse_pose_stream, serialize_pose_stream, PoseRecord, PoseStreamError, PoseStreamHeader,
};
use crate::time::{Segment, TimeWindow};

const META_DIR: &str = "meta";
const RECORDING_FILE: &str = "recording.json";
const POSES_FILE: &str = "poses.jsonl";
const MOTION_FILE: &str = "motion.jsonl";
const REPORT_FILE: &str = "segments.json";

/// Top-level recording file (`recording.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMeta {
    /// Schema version.
    pub version: String,

    /// Human-readable recording name.
    pub name: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Source video properties.
    pub video: VideoInfo,

    /// Native order of the keypoints in `poses.jsonl`.
    #[serde(default)]
    pub layout: KeypointLayout,
}

/// Properties of the source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Total duration in milliseconds.
    pub duration_ms: u64,

    /// Decoded frame size in pixels.
    pub width: u32,
    pub height: u32,

    /// Nominal frame rate.
    #[serde(default)]
    pub fps: u32,

    /// Original video file, if known.
    #[serde(default)]
    pub source: Option<String>,
}

impl VideoInfo {
    pub fn frame_size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }
}

impl RecordingMeta {
    /// Create recording metadata with defaults.
    pub fn new(
        name: impl Into<String>,
        duration_ms: u64,
        width: u32,
        height: u32,
        layout: KeypointLayout,
    ) -> Self {
        Self {
            version: "1.0".to_string(),
            name: name.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            video: VideoInfo {
                duration_ms,
                width,
                height,
                fps: 30,
                source: None,
            },
            layout,
        }
    }
}

/// Analysis output stored alongside a recording (`segments.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwingReport {
    /// When the analysis finished (ISO 8601).
    pub generated_at: String,

    /// Duration of the analyzed video.
    pub duration_ms: u64,

    /// Candidate windows from the motion scan.
    pub windows: Vec<TimeWindow>,

    /// Final, merged swing segments.
    pub segments: Vec<Segment>,
}

impl SwingReport {
    pub fn new(duration_ms: u64, windows: Vec<TimeWindow>, segments: Vec<Segment>) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            duration_ms,
            windows,
            segments,
        }
    }
}

/// A recording bundle opened from disk.
#[derive(Debug, Clone)]
pub struct LoadedRecording {
    /// Filesystem path to the recording directory.
    pub root: PathBuf,

    /// Recording metadata.
    pub meta: RecordingMeta,
}

impl LoadedRecording {
    /// Load a recording from a directory.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, RecordingError> {
        let root = root.as_ref().to_path_buf();
        let meta_path = root.join(META_DIR).join(RECORDING_FILE);

        let content = read_file(&meta_path)?;
        let meta: RecordingMeta =
            serde_json::from_str(&content).map_err(|e| RecordingError::ParseError {
                path: meta_path,
                source: e,
            })?;

        Ok(Self { root, meta })
    }

    /// Create a new recording on disk with the standard directory structure.
    pub fn create(root: impl AsRef<Path>, meta: RecordingMeta) -> Result<Self, RecordingError> {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(META_DIR);
        std::fs::create_dir_all(&meta_dir).map_err(|e| RecordingError::IoError {
            path: meta_dir.clone(),
            source: e,
        })?;

        let loaded = Self { root, meta };
        loaded.save()?;
        Ok(loaded)
    }

    /// Save `recording.json`.
    pub fn save(&self) -> Result<(), RecordingError> {
        let path = self.meta_path(RECORDING_FILE);
        write_json(&path, &self.meta)
    }

    pub fn poses_path(&self) -> PathBuf {
        self.meta_path(POSES_FILE)
    }

    pub fn motion_path(&self) -> PathBuf {
        self.meta_path(MOTION_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.meta_path(REPORT_FILE)
    }

    /// Read `poses.jsonl`.
    ///
    /// A header whose layout disagrees with `recording.json` is rejected.
    pub fn load_poses(&self) -> Result<(PoseStreamHeader, Vec<PoseRecord>), RecordingError> {
        let path = self.poses_path();
        let content = read_file(&path)?;
        let (header, records) =
            parse_pose_stream(&content).map_err(|e| RecordingError::PoseStream {
                path: path.clone(),
                source: e,
            })?;

        if header.layout != self.meta.layout {
            return Err(RecordingError::ValidationError {
                message: format!(
                    "pose stream layout {} does not match recording layout {}",
                    header.layout.name(),
                    self.meta.layout.name()
                ),
            });
        }

        Ok((header, records))
    }

    /// Write `poses.jsonl`.
    pub fn write_poses(
        &self,
        header: &PoseStreamHeader,
        records: &[PoseRecord],
    ) -> Result<(), RecordingError> {
        let path = self.poses_path();
        let content =
            serialize_pose_stream(header, records).map_err(|e| RecordingError::ParseError {
                path: path.clone(),
                source: e,
            })?;
        write_file(&path, content)
    }

    /// Read `motion.jsonl`.
    pub fn load_motion(&self) -> Result<Vec<MotionRecord>, RecordingError> {
        let path = self.motion_path();
        let content = read_file(&path)?;
        parse_motion_records(&content).map_err(|e| RecordingError::ParseError { path, source: e })
    }

    /// Write `motion.jsonl`.
    pub fn write_motion(&self, records: &[MotionRecord]) -> Result<(), RecordingError> {
        let path = self.motion_path();
        let content =
            serialize_motion_records(records).map_err(|e| RecordingError::ParseError {
                path: path.clone(),
                source: e,
            })?;
        write_file(&path, content)
    }

    /// Write `segments.json`.
    pub fn save_report(&self, report: &SwingReport) -> Result<(), RecordingError> {
        write_json(&self.report_path(), report)
    }

    /// Read `segments.json`, if an analysis has been saved.
    pub fn load_report(&self) -> Result<Option<SwingReport>, RecordingError> {
        let path = self.report_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = read_file(&path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| RecordingError::ParseError { path, source: e })
    }

    /// Check that the bundle is usable for analysis.
    pub fn validate_sources(&self) -> Vec<String> {
        let mut errors = vec![];

        if self.meta.video.width == 0 || self.meta.video.height == 0 {
            errors.push(format!(
                "Frame size is empty: {}x{}",
                self.meta.video.width, self.meta.video.height
            ));
        }
        if self.meta.video.duration_ms == 0 {
            errors.push("Video duration is zero".to_string());
        }
        if !self.poses_path().exists() {
            errors.push(format!("Pose stream missing: {META_DIR}/{POSES_FILE}"));
        }
        if !self.motion_path().exists() {
            errors.push(format!("Motion grids missing: {META_DIR}/{MOTION_FILE}"));
        }

        errors
    }

    fn meta_path(&self, file: &str) -> PathBuf {
        self.root.join(META_DIR).join(file)
    }
}

/// Errors that can occur when working with recordings.
#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid pose stream {path}: {source}")]
    PoseStream {
        path: PathBuf,
        source: PoseStreamError,
    },

    #[error("Invalid recording: {message}")]
    ValidationError { message: String },
}

fn read_file(path: &Path) -> Result<String, RecordingError> {
    std::fs::read_to_string(path).map_err(|e| RecordingError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_file(path: &Path, content: String) -> Result<(), RecordingError> {
    std::fs::write(path, content).map_err(|e| RecordingError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), RecordingError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| RecordingError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_file(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MotionGrid;
    use crate::keypoints::Keypoint;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_meta_serialization() {
        let meta = RecordingMeta::new(
            "Range session",
            12_000,
            1920,
            1080,
            KeypointLayout::MoveNet17,
        );
        let json = serde_json::to_string_pretty(&meta).unwrap();
        let parsed: RecordingMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, "Range session");
        assert_eq!(parsed.version, "1.0");
        assert_eq!(parsed.video.frame_size(), FrameSize::new(1920, 1080));
    }

    #[test]
    fn test_meta_defaults_layout_for_legacy_files() {
        let mut value = serde_json::to_value(RecordingMeta::new(
            "Legacy",
            1_000,
            640,
            480,
            KeypointLayout::MoveNet17,
        ))
        .unwrap();
        value.as_object_mut().unwrap().remove("layout");
        let parsed: RecordingMeta = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.layout, KeypointLayout::MediaPipe33);
    }

    #[test]
    fn test_create_load_and_streams() {
        let dir = temp_root("swingcut_test_recording");
        let meta = RecordingMeta::new("Integration", 2_000, 1280, 720, KeypointLayout::MoveNet17);
        let created = LoadedRecording::create(&dir, meta).unwrap();

        let header = PoseStreamHeader::new(KeypointLayout::MoveNet17, 1280, 720, 15);
        let poses = vec![
            PoseRecord::detected(0, vec![Keypoint::new(0.5, 0.5); 17]),
            PoseRecord::missing(67),
        ];
        created.write_poses(&header, &poses).unwrap();
        created
            .write_motion(&[MotionRecord {
                timestamp_ms: 0,
                grid: MotionGrid::filled(4, 3, [10, 20, 30]),
            }])
            .unwrap();

        let loaded = LoadedRecording::load(&dir).unwrap();
        assert_eq!(loaded.meta.name, "Integration");
        assert!(loaded.validate_sources().is_empty());

        let (_, parsed) = loaded.load_poses().unwrap();
        assert_eq!(parsed, poses);
        assert_eq!(loaded.load_motion().unwrap().len(), 1);
        assert!(loaded.load_report().unwrap().is_none());

        let report = SwingReport::new(2_000, vec![], vec![Segment::new(300, 1_800).unwrap()]);
        loaded.save_report(&report).unwrap();
        assert_eq!(loaded.load_report().unwrap(), Some(report));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_layout_mismatch_is_rejected() {
        let dir = temp_root("swingcut_test_layout_mismatch");
        let meta = RecordingMeta::new("Mismatch", 1_000, 640, 480, KeypointLayout::MediaPipe33);
        let recording = LoadedRecording::create(&dir, meta).unwrap();
        let header = PoseStreamHeader::new(KeypointLayout::MoveNet17, 640, 480, 15);
        recording.write_poses(&header, &[]).unwrap();

        assert!(matches!(
            recording.load_poses(),
            Err(RecordingError::ValidationError { .. })
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_validate_sources_reports_missing() {
        let dir = temp_root("swingcut_test_validate");
        let meta = RecordingMeta::new("Validate", 0, 640, 480, KeypointLayout::MediaPipe33);
        let recording = LoadedRecording::create(&dir, meta).unwrap();

        let errors = recording.validate_sources();
        assert!(errors.iter().any(|e| e.contains("duration is zero")));
        assert!(errors.iter().any(|e| e.contains("Pose stream missing")));
        assert!(errors.iter().any(|e| e.contains("Motion grids missing")));

        std::fs::remove_dir_all(&dir).ok();
    }
}
