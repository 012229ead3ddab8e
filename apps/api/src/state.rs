use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::GenerationService;

/// Shared application state injected into all route handlers via Axum
/// extractors. Nothing here is mutable — each submission is a pure pipeline
/// over its own request.
#[derive(Clone)]
pub struct AppState {
    /// Generation-service seam. Production: `LlmClient`; tests swap in mocks.
    pub llm: Arc<dyn GenerationService>,
    pub config: Config,
}
