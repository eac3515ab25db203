//! Render a synthetic recording with evenly spaced swings.

use std::path::PathBuf;

use swingcut_analysis_engine::synthetic::SyntheticSwing;
use swingcut_common::clock::ms_to_secs;

use super::parse_layout;

#[allow(clippy::too_many_arguments)]
pub fn run(
    name: String,
    output: PathBuf,
    swings: usize,
    spacing_ms: u64,
    fps: u32,
    layout: &str,
    mirrored: bool,
    missing_every: Option<usize>,
) -> anyhow::Result<()> {
    if fps == 0 {
        anyhow::bail!("fps must be positive");
    }
    let root = output.join(&name);
    if root.exists() {
        anyhow::bail!("Directory already exists: {}", root.display());
    }

    let swing = SyntheticSwing {
        name,
        fps,
        layout: parse_layout(layout)?,
        mirrored,
        missing_every,
        ..SyntheticSwing::with_swings(swings, spacing_ms)
    };

    let rendered = swing.render();
    rendered
        .write_to(&root)
        .map_err(|e| anyhow::anyhow!("Failed to write recording: {e}"))?;

    println!("Synthetic recording: {}", root.display());
    println!("  Duration: {:.1}s", ms_to_secs(swing.duration_ms));
    println!("  Layout: {}", swing.layout.name());
    println!("  Mirrored: {mirrored}");
    println!(
        "  Poses: {} ({} missing)",
        rendered.poses.len(),
        rendered.poses.iter().filter(|p| p.keypoints.is_none()).count()
    );
    println!("  Motion grids: {}", rendered.motion.len());
    println!("  Impacts:");
    for impact in &swing.impacts_ms {
        println!("    {:.2}s", ms_to_secs(*impact));
    }

    Ok(())
}
