use std::sync::Arc;

use crate::llm_client::TextGenerator;
use crate::render::DocumentRenderer;
use crate::tailoring::pipeline::PipelineSettings;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no LLM credential is configured; tailoring requests then
    /// fail with `MissingCredential`.
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub settings: PipelineSettings,
}
