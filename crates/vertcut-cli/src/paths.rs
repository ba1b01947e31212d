//! Input discovery and output naming.

use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Suffix of the rendered vertical output file.
const OUTPUT_SUFFIX: &str = "_vertical_crop_w_framing_pipeline.mp4";

/// Extensions treated as source videos during directory scans.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm", "avi"];

/// Deterministic output path for a source video.
pub fn output_video_path(output_dir: &Path, source: &Path) -> PathBuf {
    let base = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    output_dir.join(format!("{}{}", base, OUTPUT_SUFFIX))
}

/// List source videos in the input directory, sorted by name.
///
/// Only first-level files with a known video extension are picked up;
/// rendered outputs dropped into the same directory are skipped via the
/// output suffix so reruns never re-process their own results.
pub fn discover_videos(input_dir: &Path) -> AppResult<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(AppError::InputDirNotFound(input_dir.to_path_buf()));
    }

    let mut videos = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
            continue;
        }
        if path
            .file_name()
            .map(|n| n.to_string_lossy().ends_with(OUTPUT_SUFFIX))
            .unwrap_or(false)
        {
            continue;
        }
        videos.push(path);
    }

    videos.sort();
    Ok(videos)
}
