use serde::{Deserialize, Serialize};

use super::super::domain::{
    AnchorExample, AttachedFile, Criterion, LearningOutcome, OwnerId, RubricDocument, RubricId,
    RubricRow, RubricType, ShareToken,
};

/// Document store contract. Implementations stamp timestamps and mint ids
/// and share tokens; callers never set persistence metadata themselves.
pub trait RubricRepository: Send + Sync {
    fn create(&self, document: RubricDocument, owner: &OwnerId) -> Result<RubricId, RepositoryError>;
    fn update(&self, id: &RubricId, patch: RubricPatch) -> Result<(), RepositoryError>;
    fn get(&self, id: &RubricId) -> Result<Option<RubricDocument>, RepositoryError>;
    fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<RubricDocument>, RepositoryError>;
    fn delete(&self, id: &RubricId) -> Result<(), RepositoryError>;
    /// Makes the rubric public, reusing an existing token when one was issued before.
    fn enable_sharing(&self, id: &RubricId) -> Result<ShareToken, RepositoryError>;
    fn disable_sharing(&self, id: &RubricId) -> Result<(), RepositoryError>;
    /// Only public documents resolve.
    fn get_by_share_token(&self, token: &ShareToken) -> Result<Option<RubricDocument>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Partial content update. Absent fields are left as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_material: Option<String>,
    /// `Some(None)` detaches the stored file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_file: Option<Option<AttachedFile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubric_type: Option<RubricType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<Vec<LearningOutcome>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Vec<Criterion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<RubricRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grader_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_feedback_section: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_examples: Option<Vec<AnchorExample>>,
}

impl RubricPatch {
    /// Full content patch carrying every editable field of `document`.
    pub fn from_document(document: &RubricDocument) -> Self {
        Self {
            topic: Some(document.topic.clone()),
            course_name: Some(document.course_name.clone()),
            context_material: Some(document.context_material.clone()),
            attached_file: Some(document.attached_file.clone()),
            rubric_type: Some(document.rubric_type),
            outcomes: Some(document.outcomes.clone()),
            criteria: Some(document.criteria.clone()),
            rows: Some(document.rows.clone()),
            scale: Some(document.scale.clone()),
            student_instructions: Some(document.student_instructions.clone()),
            grader_instructions: Some(document.grader_instructions.clone()),
            include_feedback_section: Some(document.include_feedback_section),
            anchor_examples: Some(document.anchor_examples.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `document` with the present fields replaced. Metadata is untouched.
    pub fn apply_to(&self, document: &RubricDocument) -> RubricDocument {
        let current = document.clone();
        RubricDocument {
            topic: self.topic.clone().unwrap_or(current.topic),
            course_name: self.course_name.clone().unwrap_or(current.course_name),
            context_material: self
                .context_material
                .clone()
                .unwrap_or(current.context_material),
            attached_file: self.attached_file.clone().unwrap_or(current.attached_file),
            rubric_type: self.rubric_type.unwrap_or(current.rubric_type),
            outcomes: self.outcomes.clone().unwrap_or(current.outcomes),
            criteria: self.criteria.clone().unwrap_or(current.criteria),
            rows: self.rows.clone().unwrap_or(current.rows),
            scale: self.scale.clone().unwrap_or(current.scale),
            student_instructions: self
                .student_instructions
                .clone()
                .unwrap_or(current.student_instructions),
            grader_instructions: self
                .grader_instructions
                .clone()
                .unwrap_or(current.grader_instructions),
            include_feedback_section: self
                .include_feedback_section
                .unwrap_or(current.include_feedback_section),
            anchor_examples: self
                .anchor_examples
                .clone()
                .unwrap_or(current.anchor_examples),
            meta: current.meta,
        }
    }
}
