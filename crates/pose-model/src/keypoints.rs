//! Backend-agnostic pose keypoints.
//!
//! Pose backends emit keypoints in their native order. [`KeypointLayout`]
//! records which order a list uses and maps the handful of joints the swing
//! detector reads onto native indices, so nothing downstream depends on a
//! particular model.

use serde::{Deserialize, Serialize};

/// A normalized body-landmark estimate. `(0, 0)` is the top-left of the frame.
///
/// Serialized as a two-element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f32, f32)", into = "(f32, f32)")]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
}

impl Keypoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Keypoint {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<Keypoint> for (f32, f32) {
    fn from(k: Keypoint) -> Self {
        (k.x, k.y)
    }
}

/// Joints the swing detector consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyJoint {
    LeftShoulder,
    RightShoulder,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
}

/// Native keypoint order of a pose backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum KeypointLayout {
    /// 17 COCO keypoints (MoveNet and most single-person models).
    #[serde(rename = "movenet17")]
    MoveNet17,
    /// 33 BlazePose landmarks (MediaPipe Pose).
    #[default]
    #[serde(rename = "mediapipe33")]
    MediaPipe33,
}

impl KeypointLayout {
    /// Number of keypoints a complete pose has in this layout.
    pub fn keypoint_count(self) -> usize {
        match self {
            Self::MoveNet17 => 17,
            Self::MediaPipe33 => 33,
        }
    }

    /// Native index of `joint`.
    pub fn index_of(self, joint: BodyJoint) -> usize {
        match self {
            Self::MoveNet17 => match joint {
                BodyJoint::LeftShoulder => 5,
                BodyJoint::RightShoulder => 6,
                BodyJoint::LeftWrist => 9,
                BodyJoint::RightWrist => 10,
                BodyJoint::LeftHip => 11,
                BodyJoint::RightHip => 12,
            },
            Self::MediaPipe33 => match joint {
                BodyJoint::LeftShoulder => 11,
                BodyJoint::RightShoulder => 12,
                BodyJoint::LeftWrist => 15,
                BodyJoint::RightWrist => 16,
                BodyJoint::LeftHip => 23,
                BodyJoint::RightHip => 24,
            },
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::MoveNet17 => "movenet17",
            Self::MediaPipe33 => "mediapipe33",
        }
    }
}

/// Keypoints of one detected person in a backend's native order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseKeypoints {
    pub layout: KeypointLayout,
    pub points: Vec<Keypoint>,
}

impl PoseKeypoints {
    pub fn new(layout: KeypointLayout, points: Vec<Keypoint>) -> Self {
        Self { layout, points }
    }

    /// Whether the list holds every keypoint of its layout.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= self.layout.keypoint_count()
    }

    /// Keypoint of `joint`, or `None` if the pose is incomplete.
    pub fn get(&self, joint: BodyJoint) -> Option<Keypoint> {
        if !self.is_complete() {
            return None;
        }
        self.points.get(self.layout.index_of(joint)).copied()
    }

    /// Overwrite the keypoint of `joint`, growing the list if needed.
    pub fn set(&mut self, joint: BodyJoint, point: Keypoint) {
        let index = self.layout.index_of(joint);
        let len = self.points.len().max(self.layout.keypoint_count());
        self.points.resize(len, Keypoint::new(f32::NAN, f32::NAN));
        self.points[index] = point;
    }

    /// A copy with every x coordinate flipped (`x' = 1 - x`).
    pub fn flipped_horizontally(&self) -> Self {
        Self {
            layout: self.layout,
            points: self
                .points
                .iter()
                .map(|k| Keypoint::new(1.0 - k.x, k.y))
                .collect(),
        }
    }
}
