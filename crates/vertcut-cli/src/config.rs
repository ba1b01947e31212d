//! Pipeline configuration.

use std::path::PathBuf;

use vertcut_models::EncodingConfig;

/// Batch pipeline configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory scanned for source videos
    pub input_dir: PathBuf,
    /// Directory for rendered outputs and plan artifacts
    pub output_dir: PathBuf,
    /// Encoder settings for the segment re-encode
    pub encoding: EncodingConfig,
    /// Skip videos whose output file already exists
    pub skip_existing: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input_videos"),
            output_dir: PathBuf::from("output_videos"),
            encoding: EncodingConfig::default(),
            skip_existing: true,
        }
    }
}

impl AppConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut encoding = EncodingConfig::default();
        if let Some(crf) = std::env::var("VERTCUT_CRF").ok().and_then(|s| s.parse().ok()) {
            encoding = encoding.with_crf(crf);
        }
        if let Ok(preset) = std::env::var("VERTCUT_PRESET") {
            encoding = encoding.with_preset(preset);
        }

        Self {
            input_dir: std::env::var("INPUT_VIDEOS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("input_videos")),
            output_dir: std::env::var("OUTPUT_VIDEOS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output_videos")),
            encoding,
            skip_existing: std::env::var("VERTCUT_SKIP_EXISTING")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
        }
    }
}
