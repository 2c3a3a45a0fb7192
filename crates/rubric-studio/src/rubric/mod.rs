//! Rubric authoring: the document model, the engines deriving views from it,
//! and the collaborators for generation, ingestion and persistence.

pub mod domain;
pub mod edit;
pub mod export;
pub mod grid;
pub mod ingest;
pub mod library;
pub mod quality;
pub mod router;
pub mod suggest;
pub mod weights;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    AnchorExample, AttachedFile, Criterion, DocumentMeta, GridLayout, LearningOutcome, OwnerId,
    PerformanceLevel, RubricDocument, RubricId, RubricRow, RubricType, ShareToken,
    StructuralIssue, UnknownRubricType, HOLISTIC_CRITERION_ID, MAX_SCALE_LEVELS,
    MIN_SCALE_LEVELS,
};
pub use edit::{CriterionField, EditError};
pub use export::{
    export_file_name, render_html, to_json, ExportFormat, ExportMode, ExportSections, ExportView,
    UnknownExportFormat, UnknownExportMode,
};
pub use grid::{GridProjection, HolisticGrid, StandardGrid, MISSING_CRITERION_LABEL};
pub use ingest::{classify, FileKind, IncomingFile, IMPORT_SEPARATOR};
pub use library::{
    InMemoryRubricRepository, LibraryError, LibraryFilters, RepositoryError, RubricLibraryService,
    RubricPatch, RubricRepository, RubricSummary, SortKey, SortOrder,
};
pub use quality::{ChecklistItemId, ChecklistPriority, QualityBand, QualityReport};
pub use router::{rubric_router, RubricAnalysis, RubricApi, OWNER_HEADER};
pub use suggest::{
    GeminiClient, GenerationError, RubricAssistant, SuggestedCriterion, SuggestedLevel,
    SuggestedRow, SuggestionService, PENDING_DESCRIPTION,
};
pub use weights::{equal_shares, WeightSummary};
pub use wizard::{StepGate, WizardState, WizardStep};
