//! Detect swing segments in a recording.
//!
//! Analysis runs on a blocking worker; Ctrl+C cancels it through the
//! analyzer's cancel token and nothing is written.

use std::path::PathBuf;

use swingcut_analysis_engine::driver::{AnalysisReport, SwingAnalyzer};
use swingcut_analysis_engine::replay::{RecordedPoseEstimator, ReplayVideo};
use swingcut_common::config::DetectorConfig;
use swingcut_common::error::SwingcutResult;

use super::{load_recording, print_segments};

/// Progress is logged in steps of this many percent.
const PROGRESS_LOG_STEP: u64 = 10;

pub async fn run(
    path: PathBuf,
    config: DetectorConfig,
    json: bool,
    save: bool,
) -> anyhow::Result<()> {
    let recording = load_recording(&path)?;
    let analyzer = SwingAnalyzer::new(config)?;
    let cancel = analyzer.cancel_token();

    if !json {
        println!("Analyzing: {}", recording.meta.name);
        println!("Press Ctrl+C to cancel.");
    }

    let mut task = tokio::task::spawn_blocking(move || -> SwingcutResult<_> {
        let mut video = ReplayVideo::from_recording(&recording)?;
        let mut estimator = RecordedPoseEstimator::new();
        let mut next_log = PROGRESS_LOG_STEP;

        let report = analyzer.analyze(&mut video, &mut estimator, |done, total| {
            let percent = done * 100 / total.max(1);
            if percent >= next_log {
                tracing::info!(percent, "Analysis progress");
                next_log = (percent / PROGRESS_LOG_STEP + 1) * PROGRESS_LOG_STEP;
            }
        })?;
        Ok((recording, report))
    });

    let result = tokio::select! {
        joined = &mut task => joined?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received, cancelling analysis");
            cancel.cancel();
            task.await?
        }
    };

    let (recording, report) = match result {
        Ok(done) => done,
        Err(e) if e.is_cancelled() => {
            anyhow::bail!("Analysis cancelled; no results written")
        }
        Err(e) => return Err(anyhow::anyhow!("Analysis failed: {e}")),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if save {
        recording
            .save_report(&report.to_swing_report())
            .map_err(|e| anyhow::anyhow!("Failed to save report: {e}"))?;
        if !json {
            println!("\nSaved: {}", recording.report_path().display());
        }
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    let stats = &report.stats;

    println!();
    println!("Motion windows: {}", report.windows.len());
    println!(
        "Frames: {} decoded, {} skipped, {} with a pose ({:.0}%)",
        stats.frames_decoded,
        stats.frames_skipped,
        stats.poses_detected,
        stats.detection_rate()
    );
    if stats.estimator_failures > 0 {
        println!("Estimator failures: {}", stats.estimator_failures);
    }
    if stats.estimator_latency.avg_ms.is_finite() {
        println!(
            "Estimator latency: {:.2}ms mean, {:.2}ms p95",
            stats.estimator_latency.avg_ms, stats.estimator_latency.p95_ms
        );
    }
    println!();

    if report.is_empty() {
        println!("No swings detected.");
        return;
    }

    println!(
        "Swings ({}, from {} raw):",
        report.segments.len(),
        stats.raw_segments
    );
    print_segments(&report.segments);
}
