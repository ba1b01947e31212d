#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for the vertcut rendering pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - FFprobe source inspection with graceful resolution fallback
//! - The segment renderer: frame-accurate crop-and-concatenate

pub mod command;
pub mod error;
pub mod fs_utils;
pub mod probe;
pub mod render;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_source, try_probe_resolution, SourceInfo};
pub use render::{render_plan, RenderError, RenderResult};
