//! Create a new, empty recording bundle.

use std::path::PathBuf;

use swingcut_pose_model::recording::{LoadedRecording, RecordingMeta};
use swingcut_pose_model::sample::PoseStreamHeader;

use super::parse_layout;

pub fn run(
    name: String,
    output: PathBuf,
    duration_ms: u64,
    width: u32,
    height: u32,
    layout: &str,
) -> anyhow::Result<()> {
    let layout = parse_layout(layout)?;
    let root = output.join(&name);

    if root.exists() {
        anyhow::bail!("Directory already exists: {}", root.display());
    }

    let meta = RecordingMeta::new(name.clone(), duration_ms, width, height, layout);
    let recording = LoadedRecording::create(&root, meta)
        .map_err(|e| anyhow::anyhow!("Failed to create recording: {e}"))?;

    let header = PoseStreamHeader::new(layout, width, height, recording.meta.video.fps);
    recording
        .write_poses(&header, &[])
        .map_err(|e| anyhow::anyhow!("Failed to write pose stream: {e}"))?;
    recording
        .write_motion(&[])
        .map_err(|e| anyhow::anyhow!("Failed to write motion grids: {e}"))?;

    println!("Created recording: {}", root.display());
    println!("  meta/recording.json");
    println!("  meta/poses.jsonl");
    println!("  meta/motion.jsonl");
    println!();
    println!("Fill the pose and motion streams, then run:");
    println!("  swingcut analyze {}", root.display());

    Ok(())
}
