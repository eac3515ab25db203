//! Downsampled RGB grids used for coarse motion detection.

use serde::{Deserialize, Serialize};

use crate::time::TimestampMs;

/// A low-resolution RGB sample of one video frame.
///
/// `pixels` holds packed RGB triples in row-major order, so
/// `pixels.len() == width * height * 3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionGrid {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Errors constructing a grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid {width}x{height} needs {expected} bytes, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("grid dimensions must be non-zero")]
    Empty,
}

impl MotionGrid {
    /// Build a grid from packed RGB bytes.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(GridError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A grid with every cell set to `rgb`.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let cells = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(cells * 3);
        for _ in 0..cells {
            pixels.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Box-filter a full RGB frame down to `grid_width x grid_height`.
    pub fn downsample(
        frame_width: u32,
        frame_height: u32,
        rgb: &[u8],
        grid_width: u32,
        grid_height: u32,
    ) -> Result<Self, GridError> {
        let source = Self::new(frame_width, frame_height, rgb.to_vec())?;
        if grid_width == 0 || grid_height == 0 {
            return Err(GridError::Empty);
        }

        let mut pixels = Vec::with_capacity(grid_width as usize * grid_height as usize * 3);
        for gy in 0..grid_height {
            let y0 = (gy as u64 * frame_height as u64 / grid_height as u64) as u32;
            let y1 = (((gy + 1) as u64 * frame_height as u64 / grid_height as u64) as u32)
                .max(y0 + 1);
            for gx in 0..grid_width {
                let x0 = (gx as u64 * frame_width as u64 / grid_width as u64) as u32;
                let x1 =
                    (((gx + 1) as u64 * frame_width as u64 / grid_width as u64) as u32).max(x0 + 1);

                let mut sum = [0u64; 3];
                let mut count = 0u64;
                for y in y0..y1.min(frame_height) {
                    for x in x0..x1.min(frame_width) {
                        let cell = source.cell(x, y);
                        sum[0] += cell[0] as u64;
                        sum[1] += cell[1] as u64;
                        sum[2] += cell[2] as u64;
                        count += 1;
                    }
                }
                let count = count.max(1);
                pixels.extend(sum.iter().map(|s| (s / count) as u8));
            }
        }

        Self::new(grid_width, grid_height, pixels)
    }

    /// RGB value of the cell at `(x, y)`.
    ///
    /// Panics if the coordinates are outside the grid.
    pub fn cell(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    /// Overwrite the cell at `(x, y)`. Out-of-range coordinates are ignored.
    pub fn set_cell(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[i..i + 3].copy_from_slice(&rgb);
    }

    pub fn same_dimensions(&self, other: &MotionGrid) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Fraction of cells whose value changed relative to `previous`.
    ///
    /// A cell counts as changed when any channel differs by more than
    /// `pixel_threshold`. Returns `None` when the grids differ in size.
    pub fn motion_ratio(&self, previous: &MotionGrid, pixel_threshold: u8) -> Option<f32> {
        if !self.same_dimensions(previous) || self.pixels.len() != previous.pixels.len() {
            return None;
        }

        let total = self.pixels.len() / 3;
        if total == 0 {
            return Some(0.0);
        }

        let changed = self
            .pixels
            .chunks_exact(3)
            .zip(previous.pixels.chunks_exact(3))
            .filter(|(curr, prev)| {
                curr.iter()
                    .zip(prev.iter())
                    .any(|(c, p)| c.abs_diff(*p) > pixel_threshold)
            })
            .count();

        Some(changed as f32 / total as f32)
    }
}

/// One line of `motion.jsonl`: a grid sampled at a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionRecord {
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    #[serde(flatten)]
    pub grid: MotionGrid,
}

/// Parse motion records from JSONL content, skipping blank and `#` lines.
pub fn parse_motion_records(jsonl: &str) -> Result<Vec<MotionRecord>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize motion records to JSONL.
pub fn serialize_motion_records(records: &[MotionRecord]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_size() {
        assert!(MotionGrid::new(2, 2, vec![0; 12]).is_ok());
        assert_eq!(
            MotionGrid::new(2, 2, vec![0; 11]),
            Err(GridError::SizeMismatch {
                width: 2,
                height: 2,
                expected: 12,
                actual: 11
            })
        );
        assert_eq!(MotionGrid::new(0, 2, vec![]), Err(GridError::Empty));
    }

    #[test]
    fn test_motion_ratio_counts_any_channel() {
        let prev = MotionGrid::filled(2, 2, [100, 100, 100]);
        let mut curr = prev.clone();
        curr.set_cell(0, 0, [116, 100, 100]); // red changed by 16 > 15
        curr.set_cell(1, 0, [100, 115, 100]); // green changed by exactly 15: not counted
        curr.set_cell(0, 1, [100, 100, 80]); // blue changed by 20

        let ratio = curr.motion_ratio(&prev, 15).unwrap();
        assert!((ratio - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_motion_ratio_requires_same_dimensions() {
        let a = MotionGrid::filled(2, 2, [0, 0, 0]);
        let b = MotionGrid::filled(3, 2, [0, 0, 0]);
        assert_eq!(a.motion_ratio(&b, 15), None);
    }

    #[test]
    fn test_downsample_averages_blocks() {
        // 4x2 frame: left half black, right half white
        let mut rgb = vec![];
        for _y in 0..2 {
            for x in 0..4 {
                let v = if x < 2 { 0 } else { 255 };
                rgb.extend_from_slice(&[v, v, v]);
            }
        }
        let grid = MotionGrid::downsample(4, 2, &rgb, 2, 1).unwrap();
        assert_eq!(grid.cell(0, 0), [0, 0, 0]);
        assert_eq!(grid.cell(1, 0), [255, 255, 255]);
    }

    proptest::proptest! {
        #[test]
        fn prop_motion_ratio_is_a_fraction(
            prev in proptest::collection::vec(proptest::num::u8::ANY, 48),
            curr in proptest::collection::vec(proptest::num::u8::ANY, 48),
            threshold in proptest::num::u8::ANY,
        ) {
            let prev = MotionGrid::new(4, 4, prev).unwrap();
            let curr = MotionGrid::new(4, 4, curr).unwrap();
            let ratio = curr.motion_ratio(&prev, threshold).unwrap();
            proptest::prop_assert!((0.0..=1.0).contains(&ratio));
            proptest::prop_assert_eq!(curr.motion_ratio(&curr, threshold), Some(0.0));
        }
    }

    #[test]
    fn test_motion_record_jsonl_roundtrip() {
        let records = vec![
            MotionRecord {
                timestamp_ms: 0,
                grid: MotionGrid::filled(1, 1, [1, 2, 3]),
            },
            MotionRecord {
                timestamp_ms: 200,
                grid: MotionGrid::filled(1, 1, [4, 5, 6]),
            },
        ];
        let jsonl = serialize_motion_records(&records).unwrap();
        assert!(jsonl.starts_with(r#"{"t":0,"width":1,"height":1,"pixels":[1,2,3]}"#));
        assert_eq!(parse_motion_records(&jsonl).unwrap(), records);
    }
}
