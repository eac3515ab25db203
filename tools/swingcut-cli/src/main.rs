//! SwingCut CLI: command-line interface for swing detection on recordings.
//!
//! Usage:
//!   swingcut init <NAME>         Create an empty recording bundle
//!   swingcut synth <NAME>        Render a synthetic recording with swings
//!   swingcut info <PATH>         Show recording information
//!   swingcut validate <PATH>     Validate a recording bundle
//!   swingcut scan <PATH>         Run the coarse motion scan only
//!   swingcut analyze <PATH>      Detect swing segments
//!   swingcut activity <PATH>     Find the active span of a single-swing clip
//!   swingcut config              Show the effective configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use swingcut_common::config::{AppConfig, DetectorConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "swingcut",
    about = "Golf swing detection and clipping from pose recordings",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Detector overrides shared by `scan` and `analyze`.
#[derive(Args, Debug, Clone, Default)]
struct DetectorArgs {
    /// Fraction of changed grid cells that counts as motion
    #[arg(long)]
    diff_threshold: Option<f32>,

    /// Motion scan sampling interval (ms)
    #[arg(long)]
    sampling_interval_ms: Option<u64>,

    /// Half-height of the hip band (normalized)
    #[arg(long)]
    hip_band_tol: Option<f32>,

    /// Minimum time between two impacts (ms)
    #[arg(long)]
    cooldown_ms: Option<u64>,

    /// Segments closer than this are merged (ms)
    #[arg(long)]
    merge_gap_ms: Option<u64>,

    /// Reference wrist: left|right
    #[arg(long)]
    hand: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty recording bundle
    Init {
        /// Recording name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Video duration (ms)
        #[arg(long, default_value = "0")]
        duration_ms: u64,

        /// Frame width
        #[arg(long, default_value = "1920")]
        width: u32,

        /// Frame height
        #[arg(long, default_value = "1080")]
        height: u32,

        /// Keypoint layout: mediapipe33|movenet17
        #[arg(long, default_value = "mediapipe33")]
        layout: String,
    },

    /// Render a synthetic recording with evenly spaced swings
    Synth {
        /// Recording name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Number of swings
        #[arg(long, default_value = "3")]
        swings: usize,

        /// Time between impacts (ms)
        #[arg(long, default_value = "6000")]
        spacing_ms: u64,

        /// Pose frame rate
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Keypoint layout: mediapipe33|movenet17
        #[arg(long, default_value = "mediapipe33")]
        layout: String,

        /// Mirror the camera horizontally
        #[arg(long)]
        mirrored: bool,

        /// Drop the pose of every n-th frame
        #[arg(long)]
        missing_every: Option<usize>,
    },

    /// Show recording information
    Info {
        /// Path to the recording directory
        path: PathBuf,
    },

    /// Validate a recording bundle
    Validate {
        /// Path to the recording directory
        path: PathBuf,
    },

    /// Run the coarse motion scan and print candidate windows
    Scan {
        /// Path to the recording directory
        path: PathBuf,

        #[command(flatten)]
        detector: DetectorArgs,
    },

    /// Detect swing segments in a recording
    Analyze {
        /// Path to the recording directory
        path: PathBuf,

        #[command(flatten)]
        detector: DetectorArgs,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Do not write meta/segments.json
        #[arg(long)]
        no_save: bool,
    },

    /// Find the active span of a clip holding a single swing
    Activity {
        /// Path to the recording directory
        path: PathBuf,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        write_defaults: bool,
    },
}

impl DetectorArgs {
    fn apply(&self, mut config: DetectorConfig) -> anyhow::Result<DetectorConfig> {
        if let Some(v) = self.diff_threshold {
            config.scan.diff_threshold = v;
        }
        if let Some(v) = self.sampling_interval_ms {
            config.scan.sampling_interval_ms = v;
        }
        if let Some(v) = self.hip_band_tol {
            config.tracker.hip_band_tol = v;
        }
        if let Some(v) = self.cooldown_ms {
            config.tracker.cooldown_ms = v;
        }
        if let Some(v) = self.merge_gap_ms {
            config.merge.merge_gap_ms = v;
        }
        if let Some(hand) = &self.hand {
            config.tracker.tracked_hand = commands::parse_hand(hand)?;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load();

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    swingcut_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Init {
            name,
            output,
            duration_ms,
            width,
            height,
            layout,
        } => commands::init::run(name, output, duration_ms, width, height, &layout),
        Commands::Synth {
            name,
            output,
            swings,
            spacing_ms,
            fps,
            layout,
            mirrored,
            missing_every,
        } => commands::synth::run(
            name,
            output,
            swings,
            spacing_ms,
            fps,
            &layout,
            mirrored,
            missing_every,
        ),
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Scan { path, detector } => {
            commands::scan::run(path, detector.apply(config.detector)?)
        }
        Commands::Analyze {
            path,
            detector,
            json,
            no_save,
        } => commands::analyze::run(path, detector.apply(config.detector)?, json, !no_save).await,
        Commands::Activity { path } => commands::activity::run(path),
        Commands::Config { write_defaults } => commands::config::run(&config, write_defaults),
    }
}
