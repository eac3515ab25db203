//! Run the coarse motion scan on a recording.

use std::path::PathBuf;

use swingcut_analysis_engine::driver::SwingAnalyzer;
use swingcut_analysis_engine::replay::ReplayVideo;
use swingcut_common::clock::ms_to_secs;
use swingcut_common::config::DetectorConfig;

use super::load_recording;

pub fn run(path: PathBuf, config: DetectorConfig) -> anyhow::Result<()> {
    let recording = load_recording(&path)?;
    let mut video = ReplayVideo::from_recording(&recording)?;
    let analyzer = SwingAnalyzer::new(config)?;

    println!("Scanning: {}", recording.meta.name);
    println!(
        "  Grid: {}x{} every {}ms, threshold {:.3}",
        analyzer.config().scan.grid_width,
        analyzer.config().scan.grid_height,
        analyzer.config().scan.sampling_interval_ms,
        analyzer.config().scan.diff_threshold
    );

    let windows = analyzer.scan_windows(&mut video)?;
    let covered: u64 = windows.iter().map(|w| w.duration_ms()).sum();

    println!();
    if windows.is_empty() {
        println!("No motion windows found.");
        return Ok(());
    }

    println!("Motion windows ({}):", windows.len());
    for (i, window) in windows.iter().enumerate() {
        println!(
            "  #{:<3} {:>8.2}s - {:>8.2}s",
            i + 1,
            ms_to_secs(window.start_ms),
            ms_to_secs(window.end_ms)
        );
    }
    let duration = recording.meta.video.duration_ms.max(1);
    println!(
        "\nCoverage: {:.1}% of {:.1}s",
        covered as f64 * 100.0 / duration as f64,
        ms_to_secs(recording.meta.video.duration_ms)
    );

    Ok(())
}
