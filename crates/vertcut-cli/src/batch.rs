//! Batch orchestration over a directory of source videos.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use vertcut_media::{probe_source, render_plan};
use vertcut_models::CropPlan;
use vertcut_planner::{generate_plan, plan_artifact_path, PlanProvider};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::paths::{discover_videos, output_video_path};

/// One unit of rendering work: a source, its accepted plan, and where the
/// output goes. Lives only for the duration of the render.
#[derive(Debug)]
pub struct RenderJob {
    pub source: PathBuf,
    pub plan: CropPlan,
    pub dest: PathBuf,
}

/// Outcome of one video in a batch run.
#[derive(Debug)]
pub enum VideoOutcome {
    /// Output rendered to this path
    Rendered(PathBuf),
    /// Output already existed and was left untouched
    Skipped(PathBuf),
}

/// Aggregated results of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub rendered: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, AppError)>,
}

impl BatchSummary {
    pub fn is_all_ok(&self) -> bool {
        self.failed.is_empty()
    }

    /// Log one line per outcome plus totals.
    pub fn log(&self) {
        for path in &self.rendered {
            info!("Rendered: {}", path.display());
        }
        for path in &self.skipped {
            info!("Skipped (output exists): {}", path.display());
        }
        for (path, err) in &self.failed {
            error!("Failed: {}: {}", path.display(), err);
        }
        info!(
            "Batch complete: {} rendered, {} skipped, {} failed",
            self.rendered.len(),
            self.skipped.len(),
            self.failed.len()
        );
    }
}

/// Process a single named video, with the same error boundary as a batch.
pub async fn run_single<P: PlanProvider + ?Sized>(
    config: &AppConfig,
    provider: &P,
    source: &Path,
) -> AppResult<BatchSummary> {
    tokio::fs::create_dir_all(&config.output_dir).await?;

    let mut summary = BatchSummary::default();
    match process_video(config, provider, source).await {
        Ok(VideoOutcome::Rendered(dest)) => summary.rendered.push(dest),
        Ok(VideoOutcome::Skipped(dest)) => summary.skipped.push(dest),
        Err(e) => {
            error!("Error processing {}: {}", source.display(), e);
            summary.failed.push((source.to_path_buf(), e));
        }
    }
    Ok(summary)
}

/// Process every video in the input directory.
///
/// Each video runs inside its own error boundary: a failed probe, plan, or
/// render is recorded in the summary and the batch moves on to the next
/// video.
pub async fn run_batch<P: PlanProvider + ?Sized>(
    config: &AppConfig,
    provider: &P,
) -> AppResult<BatchSummary> {
    let videos = discover_videos(&config.input_dir)?;
    if videos.is_empty() {
        warn!("No videos found in {}", config.input_dir.display());
        return Ok(BatchSummary::default());
    }

    tokio::fs::create_dir_all(&config.output_dir).await?;

    info!("Processing {} video(s)", videos.len());
    let mut summary = BatchSummary::default();
    for video in videos {
        match process_video(config, provider, &video).await {
            Ok(VideoOutcome::Rendered(dest)) => summary.rendered.push(dest),
            Ok(VideoOutcome::Skipped(dest)) => summary.skipped.push(dest),
            Err(e) => {
                error!("Error processing {}: {}", video.display(), e);
                summary.failed.push((video, e));
            }
        }
    }

    Ok(summary)
}

/// Probe, plan, and render one video.
pub async fn process_video<P: PlanProvider + ?Sized>(
    config: &AppConfig,
    provider: &P,
    source: &Path,
) -> AppResult<VideoOutcome> {
    let dest = output_video_path(&config.output_dir, source);
    if config.skip_existing && dest.exists() {
        return Ok(VideoOutcome::Skipped(dest));
    }

    let source_info = probe_source(source).await?;
    info!(
        duration = source_info.duration,
        width = source_info.width,
        height = source_info.height,
        "Probed {}",
        source.display()
    );

    let artifact = plan_artifact_path(&config.output_dir, source);
    let plan = generate_plan(
        provider,
        source,
        source_info.duration,
        source_info.resolution(),
        &artifact,
    )
    .await?;
    info!("Accepted plan with {} segment(s)", plan.len());

    let job = RenderJob {
        source: source.to_path_buf(),
        plan,
        dest,
    };
    render_plan(&job.source, &job.plan, &job.dest, &config.encoding).await?;
    Ok(VideoOutcome::Rendered(job.dest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use vertcut_models::{CropSegment, CropTarget};
    use vertcut_planner::PlannerResult;

    /// Provider that must never be reached.
    struct UnreachableProvider;

    #[async_trait]
    impl PlanProvider for UnreachableProvider {
        async fn propose(
            &self,
            _video: &Path,
            _target: CropTarget,
            _duration: f64,
        ) -> PlannerResult<Vec<CropSegment>> {
            panic!("provider should not be called");
        }

        fn name(&self) -> &'static str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn test_existing_output_is_skipped_before_probing() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("in");
        let output_dir = dir.path().join("out");
        std::fs::create_dir_all(&input_dir).unwrap();
        std::fs::create_dir_all(&output_dir).unwrap();

        let source = input_dir.join("clip.mp4");
        std::fs::write(&source, b"x").unwrap();
        let dest = output_video_path(&output_dir, &source);
        std::fs::write(&dest, b"already rendered").unwrap();

        let config = AppConfig {
            input_dir,
            output_dir,
            ..AppConfig::default()
        };

        let outcome = process_video(&config, &UnreachableProvider, &source)
            .await
            .unwrap();
        assert!(matches!(outcome, VideoOutcome::Skipped(_)));
    }

    #[tokio::test]
    async fn test_batch_continues_past_failing_video() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("in");
        let output_dir = dir.path().join("out");
        std::fs::create_dir_all(&input_dir).unwrap();
        std::fs::create_dir_all(&output_dir).unwrap();

        // One unreadable source that fails at probe, one pre-rendered source
        let bad = input_dir.join("bad.mp4");
        std::fs::write(&bad, b"not a real video").unwrap();
        let done = input_dir.join("done.mp4");
        std::fs::write(&done, b"x").unwrap();
        std::fs::write(output_video_path(&output_dir, &done), b"rendered").unwrap();

        let config = AppConfig {
            input_dir,
            output_dir,
            ..AppConfig::default()
        };

        let summary = run_batch(&config, &UnreachableProvider).await.unwrap();
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.failed.len(), 1);
        assert!(!summary.is_all_ok());
    }

    #[tokio::test]
    async fn test_batch_missing_input_dir() {
        let config = AppConfig {
            input_dir: PathBuf::from("/nonexistent/input"),
            ..AppConfig::default()
        };
        let result = run_batch(&config, &UnreachableProvider).await;
        assert!(matches!(result, Err(AppError::InputDirNotFound(_))));
    }
}
