//! Crop-plan generation.
//!
//! A [`PlanProvider`] proposes raw crop segments for a video; this crate
//! repairs the proposal into a validated [`vertcut_models::CropPlan`] and
//! persists it as a JSON artifact next to the rendered output. The shipped
//! provider is [`GeminiPlanner`], which sends the video inline to the Gemini
//! API and asks for a schema-conforming JSON response.

pub mod artifact;
pub mod client;
pub mod error;
pub mod provider;

pub use artifact::{plan_artifact_path, read_plan_artifact, write_plan_artifact};
pub use client::{GeminiConfig, GeminiPlanner};
pub use error::{PlannerError, PlannerResult};
pub use provider::{generate_plan, PlanProvider};
