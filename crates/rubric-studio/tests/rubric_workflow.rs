use std::sync::Arc;

use rubric_studio::rubric::suggest::{CriteriaRequest, LevelsRequest};
use rubric_studio::rubric::{
    ChecklistItemId, ExportMode, GenerationError, GridProjection, InMemoryRubricRepository,
    OwnerId, QualityBand, RubricAssistant, RubricDocument, RubricLibraryService,
    SuggestedCriterion, SuggestedLevel, SuggestedRow, SuggestionService, WizardState, WizardStep,
};

struct EssayBackend;

fn essay_criteria() -> Vec<SuggestedCriterion> {
    [
        ("Thesis Clarity", "States a clear, arguable claim."),
        ("Use of Evidence", "Supports the claim with sources."),
        ("Organization", "Orders ideas logically."),
    ]
    .iter()
    .map(|(title, description)| SuggestedCriterion {
        title: title.to_string(),
        description: description.to_string(),
    })
    .collect()
}

impl SuggestionService for EssayBackend {
    fn suggest_criteria(
        &self,
        request: &CriteriaRequest,
    ) -> Result<Vec<SuggestedCriterion>, GenerationError> {
        assert_eq!(request.topic, "Research Essay");
        Ok(essay_criteria())
    }

    fn suggest_levels(&self, request: &LevelsRequest) -> Result<Vec<SuggestedRow>, GenerationError> {
        Ok(request
            .criteria
            .iter()
            .map(|criterion| SuggestedRow {
                criterion_title: criterion.title.clone(),
                levels: request
                    .scale
                    .iter()
                    .map(|label| SuggestedLevel {
                        level_name: label.clone(),
                        description: format!("{label} {}", criterion.title.to_lowercase()),
                    })
                    .collect(),
            })
            .collect())
    }
}

#[test]
fn essay_rubric_goes_from_blank_to_shared() {
    let assistant = RubricAssistant::new(Arc::new(EssayBackend));
    let wizard = WizardState::new();

    let document = RubricDocument::new()
        .with_context("Research Essay", "HIST 210")
        .add_outcome("Construct an argument")
        .add_outcome("Evaluate primary sources")
        .add_outcome("Cite sources correctly");
    let wizard = wizard.advance(&document).expect("context complete");
    assert_eq!(wizard.current, WizardStep::Criteria);

    let document = assistant
        .generate_criteria(&document)
        .expect("criteria generated")
        .set_weighting(true);
    let weights: Vec<Option<f64>> = document.criteria.iter().map(|c| c.weight).collect();
    assert_eq!(weights, vec![Some(34.0), Some(33.0), Some(33.0)]);
    let wizard = wizard.advance(&document).expect("criteria present");

    let document = assistant
        .generate_levels(&document)
        .expect("levels generated");
    assert_eq!(document.rows.len(), 3, "one row per criterion");
    assert!(
        document.structural_issues().is_empty(),
        "generated rows line up with the scale"
    );
    let wizard = wizard.advance(&document).expect("rows present");
    assert_eq!(wizard.current, WizardStep::Review);

    let draft = document.quality();
    assert!(!draft.is_satisfied(ChecklistItemId::GraderInstructions));

    let document = document.with_instructions(
        "Submit 2,000 words.",
        "Calibrate on the anchor essays first.",
    );
    let report = document.quality();
    assert_eq!(report.score, 100);
    assert_eq!(report.band, QualityBand::Strong);

    match document.project_grid() {
        GridProjection::Standard(grid) => {
            assert_eq!(grid.columns.len(), 4);
            assert_eq!(grid.rows[0].header.title, "Thesis Clarity");
            assert_eq!(grid.rows[0].header.weight, Some(34.0));
            assert_eq!(grid.rows[2].cells[3].description, "Mastery organization");
        }
        GridProjection::Holistic(_) => panic!("analytic rubric projects a standard grid"),
    }

    let student_copy = rubric_studio::rubric::render_html(&document, ExportMode::Student);
    assert!(student_copy.contains("Submit 2,000 words."));
    assert!(!student_copy.contains("Calibrate on the anchor essays first."));

    let repository = Arc::new(InMemoryRubricRepository::new());
    let library = RubricLibraryService::new(repository.clone());
    let owner = OwnerId("prof-hopper".to_string());
    let stored = library.save(&owner, &document).expect("rubric saved");
    let id = stored.meta.id.clone().expect("store assigns an id");

    let token = library
        .set_sharing(&owner, &id, true)
        .expect("sharing toggled")
        .expect("token issued");
    let shared = library.shared(&token).expect("shared rubric resolves");
    assert_eq!(shared.criteria, document.criteria);
    assert_eq!(shared.rows, document.rows);

    let reopened = library.open_for_edit(&owner, &id).expect("owner reopens");
    assert_eq!(
        WizardState::resume_at_review().current,
        WizardStep::Review,
        "saved rubrics reopen on the review step"
    );
    assert_eq!(reopened.topic, "Research Essay");
}

#[test]
fn failed_generation_leaves_draft_untouched() {
    struct Offline;

    impl SuggestionService for Offline {
        fn suggest_criteria(
            &self,
            _request: &CriteriaRequest,
        ) -> Result<Vec<SuggestedCriterion>, GenerationError> {
            Err(GenerationError::Failed("connection reset".to_string()))
        }

        fn suggest_levels(
            &self,
            _request: &LevelsRequest,
        ) -> Result<Vec<SuggestedRow>, GenerationError> {
            Err(GenerationError::Failed("connection reset".to_string()))
        }
    }

    let assistant = RubricAssistant::new(Arc::new(Offline));
    let draft = RubricDocument::new()
        .with_context("Research Essay", "HIST 210")
        .add_criterion("Thesis Clarity", "States a clear claim.");
    let before = draft.clone();

    let err = assistant.generate_levels(&draft).expect_err("backend offline");
    assert!(err.is_retryable());
    assert_eq!(draft, before);
}
