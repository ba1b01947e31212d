//! Gemini API client for crop-window proposals.
//!
//! The video is uploaded inline (base64) together with a prompt that pins
//! down the coordinate system, the fixed crop dimensions, and the JSON
//! schema of the expected response. Several models are tried in order until
//! one returns a parseable proposal.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vertcut_models::{CropSegment, CropTarget};

use crate::error::{PlannerError, PlannerResult};
use crate::provider::PlanProvider;

/// Default Gemini API endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Models to try, in order of preference.
const DEFAULT_MODELS: &[&str] = &["gemini-2.5-flash", "gemini-2.5-flash-lite", "gemini-2.5-pro"];

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key
    pub api_key: String,
    /// Base URL (overridable for tests)
    pub base_url: String,
    /// Model fallback list
    pub models: Vec<String>,
    /// Request timeout (video analysis is slow)
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> PlannerResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| PlannerError::generation("GEMINI_API_KEY not set"))?;

        Ok(Self {
            api_key,
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            timeout: Duration::from_secs(
                std::env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
        })
    }
}

/// Plan provider backed by the Gemini API.
pub struct GeminiPlanner {
    http: Client,
    config: GeminiConfig,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inline_data")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mime_type")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiPlanner {
    /// Create a new planner.
    pub fn new(config: GeminiConfig) -> PlannerResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PlannerError::generation(format!("HTTP client build failed: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> PlannerResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Build the analysis prompt for the given target and source geometry.
    fn build_prompt(&self, target: CropTarget, duration: f64) -> String {
        let schema = schemars::schema_for!(Vec<CropSegment>);
        let schema_json = serde_json::to_string_pretty(&schema)
            .unwrap_or_else(|_| "[]".to_string());

        format!(
            r#"You are a video analysis engine generating crop windows for converting a video into a vertically oriented 9:16 format.

Analyze the entire video ({duration:.2} seconds). For every segment, identify the single most important point of focus (primary speaker, key action, significant object) and place a {width}x{height} pixel crop window around it.

COORDINATE SYSTEM:
- Origin is the top-left corner (0, 0); all values are absolute source pixels.
- Every segment must use crop_width={width} and crop_height={height}, with crop_y=0 for full-height crops.
- crop_x selects the horizontal window position.

FRAMING GUIDELINES:
- Rule of thirds: align the point of interest with the vertical third lines of the crop, not always dead center.
- Headroom: keep adequate but not excessive space above a subject's head.
- Lookroom: when a subject looks or moves strongly sideways, bias the crop in that direction.
- Stability: keep the crop steady in static scenes; move it only on a clear change of focus. Do not shift the window frequently.
- Multiple subjects: follow whoever is most central to the action at that moment.

OUTPUT REQUIREMENTS:
- Return ONLY a JSON array of segment objects and nothing else.
- Segments must be ordered by start_time, must not overlap, and together must cover 0 to {duration:.2} seconds without gaps.
- Times are numeric seconds. Include a short "reason" per segment.

The response must conform to this JSON schema:
{schema_json}
"#,
            duration = duration,
            width = target.width,
            height = target.height,
        )
    }

    /// Call one model and parse its proposal.
    async fn call_model(&self, model: &str, prompt: &str, video_b64: &str) -> PlannerResult<Vec<CropSegment>> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, model, self.config.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "video/mp4".to_string(),
                            data: video_b64.to_string(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PlannerError::generation(format!("Gemini API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PlannerError::generation(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            PlannerError::generation(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| PlannerError::generation("No content in Gemini response"))?;

        parse_segments(text)
    }
}

#[async_trait]
impl PlanProvider for GeminiPlanner {
    async fn propose(
        &self,
        video: &Path,
        target: CropTarget,
        duration: f64,
    ) -> PlannerResult<Vec<CropSegment>> {
        let bytes = tokio::fs::read(video).await?;
        let video_b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let prompt = self.build_prompt(target, duration);

        let mut last_error = None;
        for model in &self.config.models {
            info!("Attempting Gemini API with model: {}", model);
            match self.call_model(model, &prompt, &video_b64).await {
                Ok(segments) => {
                    info!("Got {} segments from {}", segments.len(), model);
                    return Ok(segments);
                }
                Err(e) => {
                    warn!("Failed with model {}: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| PlannerError::generation("No Gemini models configured")))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Parse a model response text into segments, tolerating markdown fences.
fn parse_segments(text: &str) -> PlannerResult<Vec<CropSegment>> {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);

    serde_json::from_str(text.trim())
        .map_err(|e| PlannerError::validation(format!("Failed to parse segments JSON: {}", e)))
}
