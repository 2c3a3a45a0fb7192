use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::rubric::domain::{
    Criterion, LearningOutcome, OwnerId, PerformanceLevel, RubricDocument, RubricId, RubricRow,
    RubricType, ShareToken, HOLISTIC_CRITERION_ID,
};
use crate::rubric::library::{
    InMemoryRubricRepository, RepositoryError, RubricLibraryService, RubricPatch,
    RubricRepository,
};
use crate::rubric::router::{rubric_router, RubricApi};
use crate::rubric::suggest::{
    CriteriaRequest, GenerationError, LevelsRequest, RubricAssistant, SuggestedCriterion,
    SuggestedLevel, SuggestedRow, SuggestionService,
};

pub(super) fn owner() -> OwnerId {
    OwnerId("prof-hopper".to_string())
}

pub(super) fn other_owner() -> OwnerId {
    OwnerId("prof-lovelace".to_string())
}

pub(super) fn criterion(id: &str, title: &str, weight: Option<f64>) -> Criterion {
    Criterion {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{title} is assessed."),
        weight,
    }
}

pub(super) fn filled_row(criterion_id: &str, scale: &[String]) -> RubricRow {
    RubricRow {
        id: format!("row-{criterion_id}"),
        criterion_id: criterion_id.to_string(),
        levels: scale
            .iter()
            .enumerate()
            .map(|(index, label)| PerformanceLevel {
                id: format!("lvl-{criterion_id}-{index}"),
                title: label.clone(),
                score: index as u32 + 1,
                description: format!("{label} work on {criterion_id}."),
            })
            .collect(),
    }
}

fn outcome(id: &str, text: &str) -> LearningOutcome {
    LearningOutcome {
        id: id.to_string(),
        text: text.to_string(),
    }
}

/// Analytic essay rubric satisfying every checklist item.
pub(super) fn analytic_document() -> RubricDocument {
    let base = RubricDocument::new();
    let criteria = vec![
        criterion("crit1", "Thesis Clarity", Some(34.0)),
        criterion("crit2", "Use of Evidence", Some(33.0)),
        criterion("crit3", "Organization", Some(33.0)),
    ];
    let rows = criteria
        .iter()
        .map(|criterion| filled_row(&criterion.id, &base.scale))
        .collect();

    RubricDocument {
        topic: "Research Essay".to_string(),
        course_name: "HIST 210".to_string(),
        outcomes: vec![
            outcome("o1", "Construct an argument"),
            outcome("o2", "Evaluate primary sources"),
            outcome("o3", "Cite sources correctly"),
        ],
        criteria,
        rows,
        student_instructions: "Submit 2,000 words.".to_string(),
        grader_instructions: "Calibrate on the anchor essays first.".to_string(),
        ..base
    }
}

/// Holistic rubric over a three-level scale.
pub(super) fn holistic_document() -> RubricDocument {
    let scale: Vec<String> = ["Weak", "Average", "Strong"]
        .iter()
        .map(|label| label.to_string())
        .collect();
    let mut row = filled_row(HOLISTIC_CRITERION_ID, &scale);
    row.levels[0].description = "Little evidence of understanding.".to_string();
    row.levels[1].description = "Adequate understanding with gaps.".to_string();
    row.levels[2].description = "Thorough, insightful understanding.".to_string();

    RubricDocument {
        topic: "Lab Report".to_string(),
        course_name: "CHEM 101".to_string(),
        rubric_type: RubricType::Holistic,
        scale,
        rows: vec![row],
        ..RubricDocument::new()
    }
}

pub(super) fn library_service() -> (
    RubricLibraryService<InMemoryRubricRepository>,
    Arc<InMemoryRubricRepository>,
) {
    let repository = Arc::new(InMemoryRubricRepository::new());
    (RubricLibraryService::new(repository.clone()), repository)
}

pub(super) struct UnavailableRepository;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl RubricRepository for UnavailableRepository {
    fn create(&self, _document: RubricDocument, _owner: &OwnerId) -> Result<RubricId, RepositoryError> {
        offline()
    }

    fn update(&self, _id: &RubricId, _patch: RubricPatch) -> Result<(), RepositoryError> {
        offline()
    }

    fn get(&self, _id: &RubricId) -> Result<Option<RubricDocument>, RepositoryError> {
        offline()
    }

    fn list_by_owner(&self, _owner: &OwnerId) -> Result<Vec<RubricDocument>, RepositoryError> {
        offline()
    }

    fn delete(&self, _id: &RubricId) -> Result<(), RepositoryError> {
        offline()
    }

    fn enable_sharing(&self, _id: &RubricId) -> Result<ShareToken, RepositoryError> {
        offline()
    }

    fn disable_sharing(&self, _id: &RubricId) -> Result<(), RepositoryError> {
        offline()
    }

    fn get_by_share_token(&self, _token: &ShareToken) -> Result<Option<RubricDocument>, RepositoryError> {
        offline()
    }
}

/// Suggestion backend replaying canned answers and recording requests.
#[derive(Default)]
pub(super) struct ScriptedSuggestions {
    pub(super) criteria: Vec<SuggestedCriterion>,
    pub(super) rows: Vec<SuggestedRow>,
    pub(super) level_requests: Mutex<Vec<LevelsRequest>>,
}

impl ScriptedSuggestions {
    pub(super) fn recorded_level_requests(&self) -> Vec<LevelsRequest> {
        self.level_requests
            .lock()
            .expect("request mutex poisoned")
            .clone()
    }
}

impl SuggestionService for ScriptedSuggestions {
    fn suggest_criteria(
        &self,
        _request: &CriteriaRequest,
    ) -> Result<Vec<SuggestedCriterion>, GenerationError> {
        Ok(self.criteria.clone())
    }

    fn suggest_levels(&self, request: &LevelsRequest) -> Result<Vec<SuggestedRow>, GenerationError> {
        self.level_requests
            .lock()
            .expect("request mutex poisoned")
            .push(request.clone());
        Ok(self.rows.clone())
    }
}

pub(super) struct FailingSuggestions;

impl SuggestionService for FailingSuggestions {
    fn suggest_criteria(
        &self,
        _request: &CriteriaRequest,
    ) -> Result<Vec<SuggestedCriterion>, GenerationError> {
        Err(GenerationError::Failed("upstream 500".to_string()))
    }

    fn suggest_levels(&self, _request: &LevelsRequest) -> Result<Vec<SuggestedRow>, GenerationError> {
        Err(GenerationError::Failed("upstream 500".to_string()))
    }
}

pub(super) fn suggested_criterion(title: &str) -> SuggestedCriterion {
    SuggestedCriterion {
        title: title.to_string(),
        description: format!("Assesses {title}."),
    }
}

pub(super) fn suggested_row(criterion_title: &str, levels: &[(&str, &str)]) -> SuggestedRow {
    SuggestedRow {
        criterion_title: criterion_title.to_string(),
        levels: levels
            .iter()
            .map(|(name, description)| SuggestedLevel {
                level_name: name.to_string(),
                description: description.to_string(),
            })
            .collect(),
    }
}

pub(super) fn router_with(
    repository: Arc<InMemoryRubricRepository>,
    suggestions: Option<Arc<dyn SuggestionService>>,
) -> axum::Router {
    let api = RubricApi::new(
        RubricLibraryService::new(repository),
        suggestions.map(RubricAssistant::new),
    );
    rubric_router(Arc::new(api))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
