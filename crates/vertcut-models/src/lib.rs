//! Shared data models for the vertcut pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Crop segments and crop plans (with repair/validation)
//! - Target crop geometry for 9:16 output
//! - Encoding configuration

pub mod crop;
pub mod encoding;
pub mod plan;
pub mod segment;

// Re-export common types
pub use crop::{CropTarget, DEFAULT_CROP_HEIGHT, DEFAULT_CROP_WIDTH, VERTICAL_ASPECT};
pub use encoding::EncodingConfig;
pub use plan::{CropPlan, PlanValidationError};
pub use segment::CropSegment;
