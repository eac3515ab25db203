//! Show recording information.

use std::path::PathBuf;

use swingcut_common::clock::ms_to_secs;

use super::{load_recording, print_segments};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let recording = load_recording(&path)?;
    let meta = &recording.meta;

    println!("Recording: {}", meta.name);
    println!("  Version: {}", meta.version);
    println!("  Created: {}", meta.created_at);
    println!("  Layout: {}", meta.layout.name());
    println!();

    println!("Video:");
    println!(
        "  Resolution: {}x{} @ {}fps",
        meta.video.width, meta.video.height, meta.video.fps
    );
    println!("  Duration: {:.1}s", ms_to_secs(meta.video.duration_ms));
    if let Some(ref source) = meta.video.source {
        println!("  Source: {source}");
    }
    println!();

    println!("Signals:");
    match recording.load_poses() {
        Ok((header, poses)) => {
            let detected = poses.iter().filter(|p| p.keypoints.is_some()).count();
            println!(
                "  Poses: {} frames, {} with a pose ({})",
                poses.len(),
                detected,
                header.layout.name()
            );
        }
        Err(e) => println!("  Poses: unavailable ({e})"),
    }
    match recording.load_motion() {
        Ok(grids) => {
            let size = grids
                .first()
                .map(|g| format!(" ({}x{})", g.grid.width, g.grid.height))
                .unwrap_or_default();
            println!("  Motion grids: {}{size}", grids.len());
        }
        Err(e) => println!("  Motion grids: unavailable ({e})"),
    }
    println!();

    match recording.load_report() {
        Ok(Some(report)) => {
            println!("Last analysis ({}):", report.generated_at);
            println!("  Windows: {}", report.windows.len());
            println!("  Segments: {}", report.segments.len());
            print_segments(&report.segments);
        }
        Ok(None) => println!("Not analyzed yet."),
        Err(e) => println!("Saved analysis unreadable: {e}"),
    }

    Ok(())
}
