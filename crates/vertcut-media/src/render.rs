//! Segment-based crop-and-concatenate renderer.
//!
//! # Strategy
//!
//! For every segment of the crop plan we cut the matching time range out of
//! the source, apply that segment's crop rectangle, and re-encode the
//! sub-clip to a temp file. The sub-clips are then joined with the concat
//! demuxer using stream copy, so the final join introduces no second
//! generation loss; if the copy join fails (codec parameter mismatch across
//! sub-clips), we fall back once to a re-encoding concat.
//!
//! # Frame accuracy
//!
//! Cutting with stream copy snaps to keyframes and duplicates or drops
//! frames at segment boundaries. Extraction therefore re-encodes, using
//! two-pass seeking: a fast input seek to shortly before the segment start,
//! then an accurate output seek for the remainder. Audio is trimmed to the
//! same range by the shared `-t` duration.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use vertcut_models::{CropPlan, CropSegment, EncodingConfig};

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::move_file;

/// How far before the segment start the fast input seek lands.
const FAST_SEEK_MARGIN_SECS: f64 = 5.0;

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors from the segment renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("plan is not monotonic at segment {index}")]
    InvalidPlan { index: usize },

    #[error("segment {index} ({start_time:.3}s..{end_time:.3}s) failed: {source}")]
    Segment {
        index: usize,
        start_time: f64,
        end_time: f64,
        #[source]
        source: MediaError,
    },

    #[error("concatenation failed: {0}")]
    Concat(#[source] MediaError),

    #[error("could not finalize output at {dest}: {source}")]
    Finalize {
        dest: PathBuf,
        #[source]
        source: MediaError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render a crop plan against a source video into a single vertical output.
///
/// Sub-clips are extracted strictly in order into a scoped temp directory
/// that is removed on every exit path. The concatenated result is written
/// inside the temp directory first and only moved to `dest` on success, so
/// no partial file is ever visible at the destination.
pub async fn render_plan(
    source: impl AsRef<Path>,
    plan: &CropPlan,
    dest: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> RenderResult<()> {
    let source = source.as_ref();
    let dest = dest.as_ref();

    check_monotonic(plan)?;

    info!(
        "Rendering {} segments: {} -> {}",
        plan.len(),
        source.display(),
        dest.display()
    );

    let temp_dir = tempfile::Builder::new()
        .prefix(&temp_prefix(source))
        .tempdir()?;

    let mut segment_paths = Vec::with_capacity(plan.len());
    for (index, seg) in plan.segments().iter().enumerate() {
        let seg_path = temp_dir.path().join(segment_file_name(index));

        debug!(
            segment = index,
            start_time = seg.start_time,
            end_time = seg.end_time,
            crop = %seg.crop_filter(),
            "Extracting segment"
        );

        extract_cropped_segment(source, &seg_path, seg, encoding)
            .await
            .map_err(|source| RenderError::Segment {
                index,
                start_time: seg.start_time,
                end_time: seg.end_time,
                source,
            })?;

        segment_paths.push(seg_path);
    }

    // Concatenate into the temp dir, then move into place.
    let concat_list = temp_dir.path().join("concat.txt");
    fs::write(&concat_list, concat_list_content(&segment_paths)).await?;

    let combined = temp_dir.path().join("combined.mp4");
    concatenate(&concat_list, &combined, encoding).await?;

    move_file(&combined, dest)
        .await
        .map_err(|source| RenderError::Finalize {
            dest: dest.to_path_buf(),
            source,
        })?;

    info!("Render complete: {}", dest.display());
    Ok(())
}

/// Extract one cropped, re-encoded sub-clip.
async fn extract_cropped_segment(
    input: &Path,
    output: &Path,
    seg: &CropSegment,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let (fast_seek, accurate_seek) = split_seek(seg.start_time);

    FfmpegCommand::new(input, output)
        .input_seek(fast_seek)
        .output_seek(accurate_seek)
        .duration(seg.duration())
        .video_filter(seg.crop_filter())
        .output_args(encoding.to_ffmpeg_args())
        .avoid_negative_ts()
        .run()
        .await
}

/// Join the extracted sub-clips, preferring stream copy.
async fn concatenate(
    concat_list: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> RenderResult<()> {
    let copy_cmd = FfmpegCommand::new(concat_list, output)
        .concat_demuxer()
        .codec_copy()
        .faststart();

    match copy_cmd.run().await {
        Ok(()) => Ok(()),
        Err(copy_err) => {
            // Codec parameters can differ across sub-clips (rare, but e.g.
            // SAR changes mid-source). Re-encode the join once.
            warn!(
                "Stream-copy concat failed ({}), retrying with re-encode",
                copy_err
            );
            FfmpegCommand::new(concat_list, output)
                .concat_demuxer()
                .output_args(encoding.to_ffmpeg_args())
                .faststart()
                .run()
                .await
                .map_err(RenderError::Concat)
        }
    }
}

/// Reject plans whose segments are not strictly ordered.
///
/// `CropPlan` construction already guarantees this; the renderer re-checks
/// because it consumes the plan segment by segment and a violation here
/// would silently reorder the output.
fn check_monotonic(plan: &CropPlan) -> RenderResult<()> {
    let segments = plan.segments();
    for index in 1..segments.len() {
        if segments[index].start_time < segments[index - 1].end_time {
            return Err(RenderError::InvalidPlan { index });
        }
    }
    Ok(())
}

/// Split a segment start into (fast input seek, accurate output seek).
fn split_seek(start_time: f64) -> (f64, f64) {
    let fast = (start_time - FAST_SEEK_MARGIN_SECS).max(0.0);
    (fast, start_time - fast)
}

/// Temp directory prefix, namespaced by source base name.
fn temp_prefix(source: &Path) -> String {
    let base = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    format!("vertcut_{}_", base)
}

/// File name for the nth extracted sub-clip.
fn segment_file_name(index: usize) -> String {
    format!("segment_{:03}.mp4", index)
}

/// Concat demuxer list file content.
fn concat_list_content(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("file '{}'\n", p.display()))
        .collect()
}
