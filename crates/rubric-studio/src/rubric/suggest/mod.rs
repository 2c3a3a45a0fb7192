//! Generative suggestions for criteria and level descriptions.
//!
//! The backend only proposes raw titles and text. Ids, scale alignment and
//! label matching are resolved here so every backend yields well-formed rows.

mod gemini;
mod matching;
mod prompt;

pub use gemini::GeminiClient;
pub use matching::{assemble_rows, match_label, PENDING_DESCRIPTION};
pub use prompt::{criteria_prompt, criteria_schema, levels_prompt, levels_schema, SYSTEM_INSTRUCTION};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{new_id, AttachedFile, Criterion, GridLayout, RubricDocument, RubricType};
use super::weights::distribute_equally;

/// Number of criteria requested per generation.
pub const SUGGESTED_CRITERIA_COUNT: usize = 5;

/// Title sent in place of criteria when describing a holistic rubric.
pub const HOLISTIC_CRITERION_TITLE: &str = "Overall Performance";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedCriterion {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedLevel {
    pub level_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedRow {
    pub criterion_title: String,
    #[serde(default)]
    pub levels: Vec<SuggestedLevel>,
}

/// Inputs for criteria generation, captured from a document snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaRequest {
    pub topic: String,
    pub course_name: String,
    pub outcomes: Vec<String>,
    pub context_material: String,
    pub attached_file: Option<AttachedFile>,
    pub rubric_type: RubricType,
    pub scale: Vec<String>,
}

impl CriteriaRequest {
    pub fn from_document(document: &RubricDocument) -> Self {
        Self {
            topic: document.topic.clone(),
            course_name: document.course_name.clone(),
            outcomes: document
                .outcomes
                .iter()
                .map(|outcome| outcome.text.clone())
                .collect(),
            context_material: document.context_material.clone(),
            attached_file: document.attached_file.clone(),
            rubric_type: document.rubric_type,
            scale: document.scale.clone(),
        }
    }
}

/// Inputs for level generation. Holistic rubrics send a single synthetic
/// criterion describing overall performance.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelsRequest {
    pub topic: String,
    pub course_name: String,
    pub criteria: Vec<SuggestedCriterion>,
    pub scale: Vec<String>,
    pub context_material: String,
    pub attached_file: Option<AttachedFile>,
    pub rubric_type: RubricType,
}

impl LevelsRequest {
    pub fn from_document(document: &RubricDocument) -> Self {
        let criteria = match document.layout() {
            GridLayout::Holistic => vec![SuggestedCriterion {
                title: HOLISTIC_CRITERION_TITLE.to_string(),
                description: document.topic.clone(),
            }],
            GridLayout::Standard => document
                .criteria
                .iter()
                .map(|criterion| SuggestedCriterion {
                    title: criterion.title.clone(),
                    description: criterion.description.clone(),
                })
                .collect(),
        };

        Self {
            topic: document.topic.clone(),
            course_name: document.course_name.clone(),
            criteria,
            scale: document.scale.clone(),
            context_material: document.context_material.clone(),
            attached_file: document.attached_file.clone(),
            rubric_type: document.rubric_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("generation failed: {0}")]
    Failed(String),
    #[error("generation returned an unusable response: {0}")]
    Malformed(String),
    #[error("generation returned no suggestions")]
    Empty,
    #[error("add at least one criterion before generating levels")]
    MissingCriteria,
    #[error("generation is not configured")]
    Unconfigured,
}

impl GenerationError {
    /// Failures worth offering a retry for; configuration and input problems
    /// will not resolve by asking again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::Failed(_) | GenerationError::Malformed(_) | GenerationError::Empty
        )
    }
}

/// Generative backend proposing raw criteria and level descriptions.
pub trait SuggestionService: Send + Sync {
    fn suggest_criteria(
        &self,
        request: &CriteriaRequest,
    ) -> Result<Vec<SuggestedCriterion>, GenerationError>;

    fn suggest_levels(&self, request: &LevelsRequest) -> Result<Vec<SuggestedRow>, GenerationError>;
}

/// Applies suggestions to documents. On any failure the caller keeps its
/// original document; nothing partial is returned.
pub struct RubricAssistant<S: ?Sized> {
    service: Arc<S>,
}

impl<S: ?Sized> Clone for RubricAssistant<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S> RubricAssistant<S>
where
    S: SuggestionService + ?Sized,
{
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Replaces the criteria with fresh suggestions. Rows are cleared and,
    /// when weighting was on, the new criteria share 100 equally.
    pub fn generate_criteria(
        &self,
        document: &RubricDocument,
    ) -> Result<RubricDocument, GenerationError> {
        let request = CriteriaRequest::from_document(document);
        let suggestions = self.service.suggest_criteria(&request).inspect_err(|err| {
            warn!(error = %err, topic = %document.topic, "criteria generation failed");
        })?;

        let criteria: Vec<Criterion> = suggestions
            .into_iter()
            .filter(|suggestion| !suggestion.title.trim().is_empty())
            .map(|suggestion| Criterion {
                id: new_id("crit"),
                title: suggestion.title.trim().to_string(),
                description: suggestion.description.trim().to_string(),
                weight: None,
            })
            .collect();
        if criteria.is_empty() {
            return Err(GenerationError::Empty);
        }

        let criteria = if document.weights_enabled() {
            distribute_equally(&criteria)
        } else {
            criteria
        };
        info!(count = criteria.len(), topic = %document.topic, "criteria generated");

        Ok(RubricDocument {
            criteria,
            rows: Vec::new(),
            ..document.clone()
        })
    }

    /// Replaces the rows with generated descriptions aligned to the scale.
    pub fn generate_levels(
        &self,
        document: &RubricDocument,
    ) -> Result<RubricDocument, GenerationError> {
        if document.layout() == GridLayout::Standard && document.criteria.is_empty() {
            return Err(GenerationError::MissingCriteria);
        }

        let request = LevelsRequest::from_document(document);
        let suggestions = self.service.suggest_levels(&request).inspect_err(|err| {
            warn!(error = %err, topic = %document.topic, "level generation failed");
        })?;
        if suggestions.is_empty() {
            return Err(GenerationError::Empty);
        }

        let rows = assemble_rows(document, &suggestions);
        info!(rows = rows.len(), topic = %document.topic, "levels generated");

        Ok(document.with_rows(rows))
    }
}
