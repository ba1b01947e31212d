//! Target crop geometry for 9:16 vertical output.

use serde::{Deserialize, Serialize};

/// Width/height ratio of the vertical output.
pub const VERTICAL_ASPECT: f64 = 9.0 / 16.0;

/// Fallback crop width when source resolution cannot be determined.
pub const DEFAULT_CROP_WIDTH: u32 = 607;
/// Fallback crop height when source resolution cannot be determined.
pub const DEFAULT_CROP_HEIGHT: u32 = 1080;

/// Dimensions of the crop window every segment must use.
///
/// Height follows the source height so the output keeps full vertical
/// resolution; width is derived from the 9:16 aspect and clamped to the
/// source width for unusually narrow inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropTarget {
    /// Crop width in source pixels
    pub width: u32,
    /// Crop height in source pixels
    pub height: u32,
}

impl Default for CropTarget {
    fn default() -> Self {
        Self {
            width: DEFAULT_CROP_WIDTH,
            height: DEFAULT_CROP_HEIGHT,
        }
    }
}

impl CropTarget {
    /// Compute the target for a known source resolution.
    pub fn for_source(source_width: u32, source_height: u32) -> Self {
        let width = (source_height as f64 * VERTICAL_ASPECT).round() as u32;
        Self {
            width: width.min(source_width),
            height: source_height,
        }
    }

    /// Compute the target, falling back to 607x1080 when the resolution is
    /// unknown.
    pub fn from_resolution(resolution: Option<(u32, u32)>) -> Self {
        match resolution {
            Some((w, h)) => Self::for_source(w, h),
            None => Self::default(),
        }
    }

    /// Largest X offset keeping the crop window inside the source.
    pub fn max_crop_x(&self, source_width: u32) -> u32 {
        source_width.saturating_sub(self.width)
    }
}
