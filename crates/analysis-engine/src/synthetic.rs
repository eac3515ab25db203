//! Synthetic swing recordings.
//!
//! Renders deterministic pose streams and motion grids for a golfer who
//! stands at address and makes a swing at each requested impact time. Used
//! by `swingcut synth` and by the pipeline tests.

use std::path::Path;

use swingcut_pose_model::frame::FrameSize;
use swingcut_pose_model::grid::{MotionGrid, MotionRecord};
use swingcut_pose_model::keypoints::{BodyJoint, Keypoint, KeypointLayout, PoseKeypoints};
use swingcut_pose_model::recording::{LoadedRecording, RecordingError, RecordingMeta};
use swingcut_pose_model::sample::{PoseRecord, PoseStreamHeader};

use crate::replay::ReplayVideo;

/// Wrist height at address, inside the hip band.
const ADDRESS_Y: f32 = 0.58;
const TOP_Y: f32 = 0.20;
const IMPACT_Y: f32 = 0.55;
const LOW_POINT_Y: f32 = 0.62;
const FINISH_Y: f32 = 0.25;

/// Phase boundaries relative to impact (ms).
const BACKSWING_START: i64 = -1_300;
const TOP: i64 = -300;
const LOW_POINT: i64 = 150;
const FINISH: i64 = 800;
const SETTLED: i64 = 3_800;

/// Time span a swing occupies around its impact.
pub const SWING_SPAN_MS: (u64, u64) = ((-BACKSWING_START) as u64, SETTLED as u64);

/// Parameters of a synthetic recording.
#[derive(Debug, Clone)]
pub struct SyntheticSwing {
    pub name: String,
    pub duration_ms: u64,
    pub impacts_ms: Vec<u64>,
    pub fps: u32,
    pub frame_size: FrameSize,
    pub layout: KeypointLayout,
    /// Flip every x coordinate, as a selfie camera would.
    pub mirrored: bool,
    /// Drop the pose of every n-th frame.
    pub missing_every: Option<usize>,
    pub grid_width: u32,
    pub grid_height: u32,
    pub grid_interval_ms: u64,
}

impl Default for SyntheticSwing {
    fn default() -> Self {
        Self {
            name: "synthetic".to_string(),
            duration_ms: 8_000,
            impacts_ms: vec![3_000],
            fps: 30,
            frame_size: FrameSize::new(1920, 1080),
            layout: KeypointLayout::MediaPipe33,
            mirrored: false,
            missing_every: None,
            grid_width: 32,
            grid_height: 18,
            grid_interval_ms: 100,
        }
    }
}

/// Rendered signals of a synthetic recording.
#[derive(Debug, Clone)]
pub struct SyntheticRecording {
    pub meta: RecordingMeta,
    pub header: PoseStreamHeader,
    pub poses: Vec<PoseRecord>,
    pub motion: Vec<MotionRecord>,
}

impl SyntheticSwing {
    /// `count` swings spaced `spacing_ms` apart, with lead-in and tail.
    pub fn with_swings(count: usize, spacing_ms: u64) -> Self {
        let first = 2_000;
        let impacts_ms: Vec<u64> = (0..count as u64).map(|i| first + i * spacing_ms).collect();
        let last = impacts_ms.last().copied().unwrap_or(0);
        Self {
            duration_ms: last + SWING_SPAN_MS.1 + 1_000,
            impacts_ms,
            ..Default::default()
        }
    }

    /// Normalized wrist height at `t`.
    pub fn wrist_y(&self, t: u64) -> f32 {
        self.impacts_ms
            .iter()
            .find_map(|&impact| swing_wrist_y(t as i64 - impact as i64))
            .unwrap_or(ADDRESS_Y)
    }

    fn pose_at(&self, t: u64) -> PoseKeypoints {
        let wrist_y = self.wrist_y(t);
        // the hands travel away from the body as they rise
        let wrist_x = 0.50 - (ADDRESS_Y - wrist_y) * 0.4;

        let mut pose = PoseKeypoints::new(
            self.layout,
            vec![Keypoint::new(0.5, 0.4); self.layout.keypoint_count()],
        );
        pose.set(BodyJoint::LeftShoulder, Keypoint::new(0.44, 0.30));
        pose.set(BodyJoint::RightShoulder, Keypoint::new(0.56, 0.30));
        pose.set(BodyJoint::LeftHip, Keypoint::new(0.46, 0.55));
        pose.set(BodyJoint::RightHip, Keypoint::new(0.54, 0.55));
        pose.set(BodyJoint::LeftWrist, Keypoint::new(wrist_x - 0.02, wrist_y));
        pose.set(BodyJoint::RightWrist, Keypoint::new(wrist_x, wrist_y));

        if self.mirrored {
            pose.flipped_horizontally()
        } else {
            pose
        }
    }

    /// Cells of the golfer's half of the frame take a pattern keyed by the
    /// quantized wrist position, so any hand movement repaints them.
    fn grid_at(&self, t: u64) -> MotionGrid {
        let quantized = (self.wrist_y(t) * 200.0).round() as u32;
        let mut grid = MotionGrid::filled(self.grid_width, self.grid_height, [60, 72, 60]);
        for y in 0..self.grid_height {
            for x in self.grid_width / 4..self.grid_width * 3 / 4 {
                let v = pattern(x, y, quantized);
                grid.set_cell(x, y, [v, v.wrapping_add(40), v / 2]);
            }
        }
        grid
    }

    /// Render poses at `fps` and grids every `grid_interval_ms`.
    pub fn render(&self) -> SyntheticRecording {
        let fps = self.fps.max(1) as u64;
        let poses = (0..)
            .map(|i: u64| (i, (i * 1_000 + fps / 2) / fps))
            .take_while(|(_, t)| *t <= self.duration_ms)
            .map(|(i, t)| match self.missing_every {
                Some(n) if n > 0 && (i as usize) % n == n - 1 => PoseRecord::missing(t),
                _ => PoseRecord::detected(t, self.pose_at(t).points),
            })
            .collect();

        let interval = self.grid_interval_ms.max(1) as usize;
        let motion = (0..=self.duration_ms)
            .step_by(interval)
            .map(|t| MotionRecord {
                timestamp_ms: t,
                grid: self.grid_at(t),
            })
            .collect();

        let mut meta = RecordingMeta::new(
            self.name.clone(),
            self.duration_ms,
            self.frame_size.width,
            self.frame_size.height,
            self.layout,
        );
        meta.video.fps = self.fps;
        meta.video.source = Some("synthetic".to_string());

        SyntheticRecording {
            meta,
            header: PoseStreamHeader::new(
                self.layout,
                self.frame_size.width,
                self.frame_size.height,
                self.fps,
            ),
            poses,
            motion,
        }
    }
}

impl SyntheticRecording {
    /// Write the recording bundle to `root`.
    pub fn write_to(&self, root: impl AsRef<Path>) -> Result<LoadedRecording, RecordingError> {
        let recording = LoadedRecording::create(root, self.meta.clone())?;
        recording.write_poses(&self.header, &self.poses)?;
        recording.write_motion(&self.motion)?;
        Ok(recording)
    }

    /// Serve the rendered signals directly, without touching disk.
    pub fn to_replay_video(&self) -> ReplayVideo {
        ReplayVideo::new(
            self.meta.video.duration_ms,
            self.meta.video.frame_size(),
            self.header.layout,
            self.poses.clone(),
            self.motion.clone(),
        )
    }
}

/// Wrist height at `dt` ms from impact, or `None` outside the swing.
fn swing_wrist_y(dt: i64) -> Option<f32> {
    let lerp = |from: f32, to: f32, start: i64, end: i64| {
        let p = (dt - start) as f32 / (end - start) as f32;
        from + (to - from) * p
    };

    match dt {
        _ if dt < BACKSWING_START => None,
        _ if dt < TOP => Some(lerp(ADDRESS_Y, TOP_Y, BACKSWING_START, TOP)),
        _ if dt < 0 => Some(lerp(TOP_Y, IMPACT_Y, TOP, 0)),
        _ if dt < LOW_POINT => Some(lerp(IMPACT_Y, LOW_POINT_Y, 0, LOW_POINT)),
        _ if dt < FINISH => Some(lerp(LOW_POINT_Y, FINISH_Y, LOW_POINT, FINISH)),
        _ if dt < SETTLED => Some(lerp(FINISH_Y, ADDRESS_Y, FINISH, SETTLED)),
        _ => None,
    }
}

fn pattern(x: u32, y: u32, seed: u32) -> u8 {
    let mut h = x
        .wrapping_mul(73_856_093)
        ^ y.wrapping_mul(19_349_663)
        ^ seed.wrapping_mul(83_492_791);
    h ^= h >> 13;
    h = h.wrapping_mul(0x5bd1_e995);
    h ^= h >> 15;
    (h & 0xff) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrist_profile_hits_key_points() {
        let swing = SyntheticSwing::default();
        assert_eq!(swing.wrist_y(0), ADDRESS_Y);
        assert!((swing.wrist_y(2_700) - TOP_Y).abs() < 1e-6);
        assert!((swing.wrist_y(3_000) - IMPACT_Y).abs() < 1e-6);
        assert!((swing.wrist_y(3_800) - FINISH_Y).abs() < 1e-6);
        assert_eq!(swing.wrist_y(7_000), ADDRESS_Y);
    }

    #[test]
    fn test_render_produces_frames_and_grids() {
        let swing = SyntheticSwing {
            missing_every: Some(10),
            ..Default::default()
        };
        let rendered = swing.render();

        assert_eq!(rendered.poses.len(), 241);
        assert_eq!(rendered.poses.last().map(|p| p.timestamp_ms), Some(8_000));
        assert_eq!(rendered.poses.iter().filter(|p| p.keypoints.is_none()).count(), 24);
        assert_eq!(rendered.motion.len(), 81);
        assert_eq!(rendered.meta.layout, KeypointLayout::MediaPipe33);
    }

    #[test]
    fn test_static_grids_do_not_change() {
        let swing = SyntheticSwing::default();
        let a = swing.grid_at(0);
        let b = swing.grid_at(500);
        assert_eq!(a.motion_ratio(&b, 15), Some(0.0));

        let moving = swing.grid_at(2_200);
        assert!(moving.motion_ratio(&a, 15).unwrap() > 0.2);
    }

    #[test]
    fn test_mirrored_render_flips_shoulders() {
        let swing = SyntheticSwing {
            mirrored: true,
            ..Default::default()
        };
        let pose = swing.pose_at(0);
        let left = pose.get(BodyJoint::LeftShoulder).unwrap();
        let right = pose.get(BodyJoint::RightShoulder).unwrap();
        assert!(right.x < left.x);
    }

    #[test]
    fn test_write_to_creates_loadable_bundle() {
        let root = std::env::temp_dir().join(format!("swingcut-synth-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);

        let rendered = SyntheticSwing::default().render();
        let written = rendered.write_to(&root).unwrap();
        assert!(written.validate_sources().is_empty());

        let loaded = LoadedRecording::load(&root).unwrap();
        let (_, poses) = loaded.load_poses().unwrap();
        assert_eq!(poses.len(), rendered.poses.len());

        std::fs::remove_dir_all(&root).ok();
    }
}
