//! SwingCut Common Utilities
//!
//! Shared infrastructure for all SwingCut crates:
//! - Error types and result aliases
//! - Detector and application configuration
//! - Frame-rate gating and latency bookkeeping
//! - Tracing/logging initialization

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
