//! Find the active span of a clip holding a single swing.

use std::path::PathBuf;

use swingcut_analysis_engine::replay::ReplayVideo;
use swingcut_pose_model::sample::FrameSample;
use swingcut_swing_core::activity::ActivitySegmenter;

use super::{load_recording, print_segments};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let recording = load_recording(&path)?;
    let video = ReplayVideo::from_recording(&recording)?;

    let samples: Vec<FrameSample> = video
        .poses()
        .enumerate()
        .map(|(frame_index, (timestamp_ms, pose))| FrameSample {
            frame_index,
            timestamp_ms,
            pose,
        })
        .collect();

    let spans = ActivitySegmenter::default().detect(&samples);

    println!("Activity: {}", recording.meta.name);
    println!(
        "  Frames: {} ({} with a pose)",
        samples.len(),
        samples.iter().filter(|s| s.pose.is_some()).count()
    );
    if spans.is_empty() {
        println!("  No activity found.");
    } else {
        print_segments(&spans);
    }

    Ok(())
}
