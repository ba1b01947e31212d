//! Persisted crop-plan JSON artifact.
//!
//! The accepted plan for each video is written next to the final output as a
//! bare JSON array of segments, keyed by the source base name, so reruns of
//! different videos never collide and a bad render can be diagnosed from the
//! plan that produced it.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use vertcut_models::{CropPlan, CropSegment};

use crate::error::{PlannerError, PlannerResult};

/// Suffix of the crop-plan artifact file.
const ARTIFACT_SUFFIX: &str = "_crop_data_framing_temp.json";

/// Deterministic artifact path for a source video.
pub fn plan_artifact_path(output_dir: &Path, source: &Path) -> PathBuf {
    let base = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    output_dir.join(format!("{}{}", base, ARTIFACT_SUFFIX))
}

/// Write the plan artifact, creating parent directories as needed.
pub async fn write_plan_artifact(path: &Path, plan: &CropPlan) -> PlannerResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let json = serde_json::to_vec_pretty(plan)
        .map_err(|e| PlannerError::validation(format!("could not serialize plan: {}", e)))?;
    fs::write(path, json).await?;

    debug!("Wrote crop plan artifact: {}", path.display());
    Ok(())
}

/// Read an artifact back into a validated plan.
pub async fn read_plan_artifact(
    path: &Path,
    duration: Option<f64>,
    resolution: Option<(u32, u32)>,
) -> PlannerResult<CropPlan> {
    let bytes = fs::read(path).await?;
    let segments: Vec<CropSegment> = serde_json::from_slice(&bytes)
        .map_err(|e| PlannerError::validation(format!("invalid artifact JSON: {}", e)))?;
    Ok(CropPlan::from_segments(segments, duration, resolution)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_path_from_base_name() {
        let path = plan_artifact_path(Path::new("/out"), Path::new("/in/episode_01.mp4"));
        assert_eq!(
            path,
            PathBuf::from("/out/episode_01_crop_data_framing_temp.json")
        );
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = plan_artifact_path(dir.path(), Path::new("clip.mp4"));

        let plan = CropPlan::repair(
            vec![
                CropSegment::new(0.0, 5.0, 0, 0, 608, 1080),
                CropSegment::new(5.0, 10.0, 640, 0, 608, 1080),
            ],
            10.0,
            Some((1920, 1080)),
        )
        .unwrap();

        write_plan_artifact(&path, &plan).await.unwrap();
        let read_back = read_plan_artifact(&path, Some(10.0), Some((1920, 1080)))
            .await
            .unwrap();

        assert_eq!(read_back, plan);
    }

    #[tokio::test]
    async fn test_read_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, b"not json").await.unwrap();

        let result = read_plan_artifact(&path, None, None).await;
        assert!(matches!(result, Err(PlannerError::Validation(_))));
    }
}
