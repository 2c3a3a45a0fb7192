use metrics_exporter_prometheus::PrometheusHandle;
use rubric_studio::config::SuggestionConfig;
use rubric_studio::error::AppError;
use rubric_studio::rubric::{
    GeminiClient, GenerationError, InMemoryRubricRepository, RubricApi, RubricAssistant,
    RubricDocument, RubricLibraryService, SuggestionService,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type StudioApi = RubricApi<InMemoryRubricRepository>;

/// Wires the in-memory library and, when a key is configured, the Gemini backend.
pub(crate) fn build_api(
    repository: Arc<InMemoryRubricRepository>,
    suggestions: &SuggestionConfig,
) -> Result<Arc<StudioApi>, AppError> {
    let assistant = match GeminiClient::from_config(suggestions) {
        Ok(client) => {
            info!(model = %suggestions.model, "generative suggestions enabled");
            let service: Arc<dyn SuggestionService> = Arc::new(client);
            Some(RubricAssistant::new(service))
        }
        Err(GenerationError::Unconfigured) => {
            warn!("GEMINI_API_KEY not set; suggestion endpoints will answer 503");
            None
        }
        Err(err) => return Err(err.into()),
    };

    Ok(Arc::new(RubricApi::new(
        RubricLibraryService::new(repository),
        assistant,
    )))
}

pub(crate) fn read_document(path: &Path) -> Result<RubricDocument, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
