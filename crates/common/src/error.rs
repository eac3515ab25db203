//! Error types shared across SwingCut crates.

use std::path::PathBuf;

/// Top-level error type for SwingCut operations.
///
/// Per-sample failures (an undecodable frame, a failed pose estimate, a
/// non-finite landmark) never surface as this type; they are skipped where
/// they happen. What reaches the caller is either fatal for the whole
/// analysis or an explicit cancellation.
#[derive(Debug, thiserror::Error)]
pub enum SwingcutError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Frame source error: {message}")]
    FrameSource { message: String },

    #[error("Pose estimator error: {message}")]
    Estimator { message: String },

    #[error("Recording error: {message}")]
    Recording { message: String },

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using SwingcutError.
pub type SwingcutResult<T> = Result<T, SwingcutError>;

impl SwingcutError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn frame_source(msg: impl Into<String>) -> Self {
        Self::FrameSource {
            message: msg.into(),
        }
    }

    pub fn estimator(msg: impl Into<String>) -> Self {
        Self::Estimator {
            message: msg.into(),
        }
    }

    pub fn recording(msg: impl Into<String>) -> Self {
        Self::Recording {
            message: msg.into(),
        }
    }

    /// Whether this error is the cooperative-cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            SwingcutError::config("sampling interval must be > 0").to_string(),
            "Configuration error: sampling interval must be > 0"
        );
        assert_eq!(SwingcutError::Cancelled.to_string(), "Analysis cancelled");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(SwingcutError::Cancelled.is_cancelled());
        assert!(!SwingcutError::estimator("model missing").is_cancelled());
    }
}
