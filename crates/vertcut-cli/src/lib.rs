//! Batch pipeline: probe, plan, and render vertical crops for a directory
//! of source videos.

pub mod batch;
pub mod config;
pub mod error;
pub mod paths;

pub use batch::{process_video, run_batch, run_single, BatchSummary, RenderJob, VideoOutcome};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use paths::{discover_videos, output_video_path};
