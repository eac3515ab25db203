//! Frame dimensions.

use serde::{Deserialize, Serialize};

/// Pixel dimensions of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn long_edge(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Scale down (never up) so the long edge is at most `max_long_edge`.
    ///
    /// Each side is rounded and bumped to the next even number, as hardware
    /// decoders and YUV conversion expect even dimensions.
    pub fn fit_long_edge(&self, max_long_edge: u32) -> FrameSize {
        let width = self.width.max(1);
        let height = self.height.max(1);
        let long_edge = width.max(height);
        let scale = (max_long_edge.max(1) as f64 / long_edge as f64).min(1.0);

        let even = |v: u32| if v % 2 != 0 { v + 1 } else { v };
        let target_w = ((width as f64 * scale).round() as u32).max(1);
        let target_h = ((height as f64 * scale).round() as u32).max(1);

        FrameSize::new(even(target_w), even(target_h))
    }
}
