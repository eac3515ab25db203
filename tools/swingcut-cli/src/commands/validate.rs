//! Validate a SwingCut recording bundle.

use std::path::PathBuf;

use super::load_recording;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating recording at: {}", path.display());

    let recording = load_recording(&path)?;

    println!("  Name: {}", recording.meta.name);
    println!("  Version: {}", recording.meta.version);
    println!(
        "  Resolution: {}x{}",
        recording.meta.video.width, recording.meta.video.height
    );
    println!("  Duration: {}ms", recording.meta.video.duration_ms);

    let mut errors = recording.validate_sources();

    // Present streams must also parse
    if recording.poses_path().exists() {
        // layout mismatches surface here as well
        if let Err(e) = recording.load_poses() {
            errors.push(e.to_string());
        }
    }
    if recording.motion_path().exists() {
        if let Err(e) = recording.load_motion() {
            errors.push(e.to_string());
        }
    }

    if errors.is_empty() {
        println!("  Sources: All present");
        println!("\nRecording is valid.");
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        println!(
            "\n{} issue(s) found. Recording may not be fully usable.",
            errors.len()
        );
    }

    Ok(())
}
