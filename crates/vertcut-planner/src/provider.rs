//! The plan-provider seam and the full plan-generation operation.

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use vertcut_models::{CropPlan, CropSegment, CropTarget};

use crate::artifact::write_plan_artifact;
use crate::error::PlannerResult;

/// Source of raw crop-segment proposals for a video.
///
/// This is the only interface the rest of the pipeline sees; the Gemini
/// client implements it, and tests substitute synthetic providers so the
/// renderer and repair logic run without any network service.
#[async_trait]
pub trait PlanProvider: Send + Sync {
    /// Propose crop segments for the video.
    ///
    /// The returned segments are raw: they may be out of order, overlap, or
    /// leave gaps. [`generate_plan`] repairs and validates them.
    async fn propose(
        &self,
        video: &Path,
        target: CropTarget,
        duration: f64,
    ) -> PlannerResult<Vec<CropSegment>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Generate, repair, validate, and persist a crop plan for one video.
///
/// The crop target is derived from the source resolution, falling back to
/// the 607x1080 default when the resolution is unknown. The accepted plan is
/// written to `artifact_path` as a JSON array for later inspection; that
/// side effect does not alter the returned plan.
pub async fn generate_plan<P: PlanProvider + ?Sized>(
    provider: &P,
    video: &Path,
    duration: f64,
    resolution: Option<(u32, u32)>,
    artifact_path: &Path,
) -> PlannerResult<CropPlan> {
    let target = CropTarget::from_resolution(resolution);

    info!(
        provider = provider.name(),
        target_width = target.width,
        target_height = target.height,
        "Requesting crop plan for {}",
        video.display()
    );

    let segments = provider.propose(video, target, duration).await?;
    info!("Provider returned {} raw segments", segments.len());

    let plan = CropPlan::repair(segments, duration, resolution)?;

    write_plan_artifact(artifact_path, &plan).await?;

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;

    /// Provider returning a canned segment list.
    struct FixedProvider {
        segments: Vec<CropSegment>,
    }

    #[async_trait]
    impl PlanProvider for FixedProvider {
        async fn propose(
            &self,
            _video: &Path,
            _target: CropTarget,
            _duration: f64,
        ) -> PlannerResult<Vec<CropSegment>> {
            Ok(self.segments.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    /// Provider that always fails the model call.
    struct FailingProvider;

    #[async_trait]
    impl PlanProvider for FailingProvider {
        async fn propose(
            &self,
            _video: &Path,
            _target: CropTarget,
            _duration: f64,
        ) -> PlannerResult<Vec<CropSegment>> {
            Err(PlannerError::generation("model unreachable"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_generate_plan_repairs_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("clip_crop_data_framing_temp.json");

        // Raw proposal with a gap between 5s and 7s
        let provider = FixedProvider {
            segments: vec![
                CropSegment::new(0.0, 5.0, 0, 0, 608, 1080),
                CropSegment::new(7.0, 10.0, 640, 0, 608, 1080),
            ],
        };

        let plan = generate_plan(
            &provider,
            Path::new("clip.mp4"),
            10.0,
            Some((1920, 1080)),
            &artifact,
        )
        .await
        .unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.segments()[0].end_time, 7.0);
        assert!((plan.total_duration() - 10.0).abs() < 1e-6);

        // Artifact was written and parses back to the same plan
        let written = std::fs::read_to_string(&artifact).unwrap();
        let parsed: Vec<CropSegment> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, plan.segments());
    }

    #[tokio::test]
    async fn test_generate_plan_default_target_without_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("clip_crop_data_framing_temp.json");

        let provider = FixedProvider {
            segments: vec![CropSegment::new(0.0, 10.0, 0, 0, 607, 1080)],
        };

        // Unknown resolution: bounds are unchecked, default target applies
        let plan = generate_plan(&provider, Path::new("clip.mp4"), 10.0, None, &artifact)
            .await
            .unwrap();
        assert_eq!(plan.segments()[0].crop_width, 607);
    }

    #[tokio::test]
    async fn test_generate_plan_surfaces_generation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("clip_crop_data_framing_temp.json");

        let result = generate_plan(
            &FailingProvider,
            Path::new("clip.mp4"),
            10.0,
            None,
            &artifact,
        )
        .await;

        assert!(matches!(result, Err(PlannerError::Generation(_))));
        assert!(!artifact.exists(), "no artifact on failure");
    }

    #[tokio::test]
    async fn test_generate_plan_rejects_empty_proposal() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("clip_crop_data_framing_temp.json");

        let provider = FixedProvider { segments: vec![] };
        let result =
            generate_plan(&provider, Path::new("clip.mp4"), 10.0, None, &artifact).await;

        assert!(matches!(result, Err(PlannerError::Invariants(_))));
    }
}
