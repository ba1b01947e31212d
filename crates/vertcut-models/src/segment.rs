//! Crop segment: one time range of the source with a fixed crop rectangle.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A contiguous time range of the source video associated with one crop
/// rectangle in source-pixel coordinates.
///
/// This is the atomic unit of a crop plan and the wire format of both the
/// model response and the persisted JSON artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CropSegment {
    /// Start of the time range in seconds (inclusive)
    pub start_time: f64,
    /// End of the time range in seconds (exclusive), must exceed `start_time`
    pub end_time: f64,
    /// X coordinate of the crop rectangle's top-left corner
    pub crop_x: u32,
    /// Y coordinate of the crop rectangle's top-left corner
    pub crop_y: u32,
    /// Crop rectangle width in source pixels
    pub crop_width: u32,
    /// Crop rectangle height in source pixels
    pub crop_height: u32,
    /// Short framing rationale from the model, kept for artifact inspection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CropSegment {
    /// Create a segment without a framing rationale.
    pub fn new(
        start_time: f64,
        end_time: f64,
        crop_x: u32,
        crop_y: u32,
        crop_width: u32,
        crop_height: u32,
    ) -> Self {
        Self {
            start_time,
            end_time,
            crop_x,
            crop_y,
            crop_width,
            crop_height,
            reason: None,
        }
    }

    /// Duration of the segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Check that the crop rectangle lies inside a source of the given size.
    pub fn fits_within(&self, source_width: u32, source_height: u32) -> bool {
        self.crop_width > 0
            && self.crop_height > 0
            && self.crop_x.saturating_add(self.crop_width) <= source_width
            && self.crop_y.saturating_add(self.crop_height) <= source_height
    }

    /// FFmpeg crop filter expression for this segment.
    pub fn crop_filter(&self) -> String {
        format!(
            "crop={}:{}:{}:{}",
            self.crop_width, self.crop_height, self.crop_x, self.crop_y
        )
    }
}
