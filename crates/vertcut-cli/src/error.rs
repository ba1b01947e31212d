//! Pipeline error type for the batch binary.

use std::path::PathBuf;

use thiserror::Error;

use vertcut_media::{MediaError, RenderError};
use vertcut_planner::PlannerError;

pub type AppResult<T> = Result<T, AppError>;

/// Error from processing a single video.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("probe failed: {0}")]
    Media(#[from] MediaError),

    #[error("planning failed: {0}")]
    Planner(#[from] PlannerError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("input directory not found: {0}")]
    InputDirNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
