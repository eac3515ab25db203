pub mod activity;
pub mod analyze;
pub mod config;
pub mod info;
pub mod init;
pub mod scan;
pub mod synth;
pub mod validate;

use std::path::Path;

use swingcut_common::clock::ms_to_secs;
use swingcut_common::config::TrackedHand;
use swingcut_pose_model::keypoints::KeypointLayout;
use swingcut_pose_model::recording::LoadedRecording;
use swingcut_pose_model::time::Segment;

pub fn parse_layout(name: &str) -> anyhow::Result<KeypointLayout> {
    match name.to_ascii_lowercase().as_str() {
        "mediapipe33" | "mediapipe" => Ok(KeypointLayout::MediaPipe33),
        "movenet17" | "movenet" => Ok(KeypointLayout::MoveNet17),
        other => {
            anyhow::bail!("Unknown keypoint layout '{other}' (expected mediapipe33 or movenet17)")
        }
    }
}

pub fn parse_hand(name: &str) -> anyhow::Result<TrackedHand> {
    match name.to_ascii_lowercase().as_str() {
        "left" => Ok(TrackedHand::Left),
        "right" => Ok(TrackedHand::Right),
        other => anyhow::bail!("Unknown hand '{other}' (expected left or right)"),
    }
}

pub fn load_recording(path: &Path) -> anyhow::Result<LoadedRecording> {
    LoadedRecording::load(path).map_err(|e| anyhow::anyhow!("Failed to load recording: {e}"))
}

pub fn print_segments(segments: &[Segment]) {
    for (i, segment) in segments.iter().enumerate() {
        println!(
            "  #{:<3} {:>8.2}s - {:>8.2}s  ({:.2}s)",
            i + 1,
            ms_to_secs(segment.start_ms),
            ms_to_secs(segment.end_ms),
            ms_to_secs(segment.duration_ms())
        );
    }
}
