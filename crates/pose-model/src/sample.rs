//! Pose samples and the `poses.jsonl` stream format.
//!
//! A pose stream is append-only JSONL. The first line is a `#`-prefixed
//! header naming the keypoint layout; every following line holds the
//! keypoints estimated for one frame, or `null` when no person was found.

use serde::{Deserialize, Serialize};

use crate::keypoints::{BodyJoint, Keypoint, KeypointLayout, PoseKeypoints};
use crate::time::TimestampMs;

/// One pose estimate fed to the swing tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSample {
    pub timestamp_ms: TimestampMs,
    pub keypoints: PoseKeypoints,
    /// Subject faces the camera reversed (right shoulder left of left shoulder).
    pub mirrored: bool,
}

impl PoseSample {
    /// Build a sample, inferring `mirrored` from the shoulder order.
    pub fn new(timestamp_ms: TimestampMs, keypoints: PoseKeypoints) -> Self {
        let mirrored = match (
            keypoints.get(BodyJoint::LeftShoulder),
            keypoints.get(BodyJoint::RightShoulder),
        ) {
            (Some(left), Some(right)) => right.x < left.x,
            _ => false,
        };
        Self {
            timestamp_ms,
            keypoints,
            mirrored,
        }
    }
}

/// A frame with an optional pose, as consumed by the activity segmenter.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSample {
    pub frame_index: usize,
    pub timestamp_ms: TimestampMs,
    pub pose: Option<PoseKeypoints>,
}

/// Header line of `poses.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseStreamHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Native order of every keypoint list in the stream.
    pub layout: KeypointLayout,

    /// Frame dimensions the estimates were made on, in pixels.
    pub frame_width: u32,
    pub frame_height: u32,

    /// Nominal estimation rate.
    #[serde(default)]
    pub fps: u32,
}

impl PoseStreamHeader {
    pub fn new(layout: KeypointLayout, frame_width: u32, frame_height: u32, fps: u32) -> Self {
        Self {
            schema_version: "1.0".to_string(),
            layout,
            frame_width,
            frame_height,
            fps,
        }
    }
}

/// One line of `poses.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    /// `None` when the estimator found no person in the frame.
    pub keypoints: Option<Vec<Keypoint>>,
}

impl PoseRecord {
    pub fn detected(timestamp_ms: TimestampMs, points: Vec<Keypoint>) -> Self {
        Self {
            timestamp_ms,
            keypoints: Some(points),
        }
    }

    pub fn missing(timestamp_ms: TimestampMs) -> Self {
        Self {
            timestamp_ms,
            keypoints: None,
        }
    }

    /// Attach the stream layout to this record's keypoints.
    pub fn to_pose(&self, layout: KeypointLayout) -> Option<PoseKeypoints> {
        self.keypoints
            .as_ref()
            .map(|points| PoseKeypoints::new(layout, points.clone()))
    }
}

/// Errors reading a pose stream.
#[derive(Debug, thiserror::Error)]
pub enum PoseStreamError {
    #[error("pose stream header is missing")]
    MissingHeader,

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
}

/// Parse a full pose stream (header plus records).
pub fn parse_pose_stream(
    content: &str,
) -> Result<(PoseStreamHeader, Vec<PoseRecord>), PoseStreamError> {
    let mut header = None;
    let mut records = vec![];

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix('#') {
            if header.is_none() {
                let parsed = serde_json::from_str(comment.trim()).map_err(|source| {
                    PoseStreamError::Parse {
                        line: index + 1,
                        source,
                    }
                })?;
                header = Some(parsed);
            }
            continue;
        }
        let record = serde_json::from_str(trimmed).map_err(|source| PoseStreamError::Parse {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }

    let header = header.ok_or(PoseStreamError::MissingHeader)?;
    Ok((header, records))
}

/// Serialize a pose stream to JSONL, header first.
pub fn serialize_pose_stream(
    header: &PoseStreamHeader,
    records: &[PoseRecord],
) -> Result<String, serde_json::Error> {
    let mut output = format!("# {}\n", serde_json::to_string(header)?);
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}
