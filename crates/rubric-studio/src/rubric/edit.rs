//! Whole-field editing operations.
//!
//! Each method borrows the current document and returns a new one; nested
//! sequences are rebuilt rather than patched in place so that previously
//! handed-out snapshots never observe a partial edit.

use super::domain::{
    is_blank, level_id, new_id, ordinal, AnchorExample, Criterion, GridLayout, LearningOutcome,
    PerformanceLevel, RubricDocument, RubricRow, RubricType, MAX_SCALE_LEVELS, MIN_SCALE_LEVELS,
};

/// Rejected edit. The input document is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("the {0} scale is fixed and cannot be edited")]
    ScaleLocked(RubricType),
    #[error("scale must have between {min} and {max} levels, got {actual}")]
    ScaleLength {
        min: usize,
        max: usize,
        actual: usize,
    },
    #[error("scale labels must not be blank")]
    BlankScaleLabel,
    #[error("criterion '{0}' not found")]
    CriterionNotFound(String),
    #[error("row '{0}' not found")]
    RowNotFound(String),
    #[error("row '{row_id}' has no level at index {index}")]
    LevelOutOfRange { row_id: String, index: usize },
    #[error("'{0}' is not a level of this rubric's scale")]
    UnknownLevel(String),
}

/// Editable text field of a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionField {
    Title,
    Description,
}

impl RubricDocument {
    pub fn with_context(&self, topic: impl Into<String>, course_name: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            course_name: course_name.into(),
            ..self.clone()
        }
    }

    pub fn with_context_material(&self, material: impl Into<String>) -> Self {
        Self {
            context_material: material.into(),
            ..self.clone()
        }
    }

    /// Appends a trimmed outcome. Blank text leaves the document unchanged.
    pub fn add_outcome(&self, text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return self.clone();
        }
        let mut outcomes = self.outcomes.clone();
        outcomes.push(LearningOutcome {
            id: new_id("outcome"),
            text: text.to_string(),
        });
        Self {
            outcomes,
            ..self.clone()
        }
    }

    pub fn remove_outcome(&self, outcome_id: &str) -> Self {
        Self {
            outcomes: self
                .outcomes
                .iter()
                .filter(|outcome| outcome.id != outcome_id)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Appends a criterion. When the grid already has rows, a blank row aligned
    /// to the current scale is appended alongside it. Under weighting the new
    /// criterion starts at zero.
    pub fn add_criterion(&self, title: &str, description: &str) -> Self {
        let criterion = Criterion {
            id: new_id("crit"),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            weight: self.weights_enabled().then_some(0.0),
        };

        let mut rows = self.rows.clone();
        if self.layout() == GridLayout::Standard && !rows.is_empty() {
            rows.push(RubricRow::blank(&criterion.id, &self.scale));
        }

        let mut criteria = self.criteria.clone();
        criteria.push(criterion);

        Self {
            criteria,
            rows,
            ..self.clone()
        }
    }

    /// Drops the criterion together with any row and anchor tied to it.
    pub fn remove_criterion(&self, criterion_id: &str) -> Self {
        Self {
            criteria: self
                .criteria
                .iter()
                .filter(|criterion| criterion.id != criterion_id)
                .cloned()
                .collect(),
            rows: self
                .rows
                .iter()
                .filter(|row| row.criterion_id != criterion_id)
                .cloned()
                .collect(),
            anchor_examples: self
                .anchor_examples
                .iter()
                .filter(|anchor| anchor.criterion_id.as_deref() != Some(criterion_id))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    pub fn update_criterion(
        &self,
        criterion_id: &str,
        field: CriterionField,
        value: &str,
    ) -> Result<Self, EditError> {
        if self.criterion(criterion_id).is_none() {
            return Err(EditError::CriterionNotFound(criterion_id.to_string()));
        }

        let criteria = self
            .criteria
            .iter()
            .map(|criterion| {
                if criterion.id != criterion_id {
                    return criterion.clone();
                }
                match field {
                    CriterionField::Title => Criterion {
                        title: value.to_string(),
                        ..criterion.clone()
                    },
                    CriterionField::Description => Criterion {
                        description: value.to_string(),
                        ..criterion.clone()
                    },
                }
            })
            .collect();

        Ok(Self {
            criteria,
            ..self.clone()
        })
    }

    pub fn with_criteria(&self, criteria: Vec<Criterion>) -> Self {
        Self {
            criteria,
            ..self.clone()
        }
    }

    pub fn with_rows(&self, rows: Vec<RubricRow>) -> Self {
        Self {
            rows,
            ..self.clone()
        }
    }

    /// Switches the rubric type. The scale resets to the type's default and
    /// existing rows are discarded since they no longer line up.
    pub fn with_rubric_type(&self, rubric_type: RubricType) -> Self {
        if rubric_type == self.rubric_type {
            return self.clone();
        }
        Self {
            rubric_type,
            scale: rubric_type.default_scale(),
            rows: Vec::new(),
            ..self.clone()
        }
    }

    /// Replaces the scale labels and re-aligns every row: descriptions are kept
    /// by ordinal, new ordinals start blank.
    pub fn with_scale(&self, labels: &[String]) -> Result<Self, EditError> {
        if !self.rubric_type.scale_editable() {
            return Err(EditError::ScaleLocked(self.rubric_type));
        }
        if !(MIN_SCALE_LEVELS..=MAX_SCALE_LEVELS).contains(&labels.len()) {
            return Err(EditError::ScaleLength {
                min: MIN_SCALE_LEVELS,
                max: MAX_SCALE_LEVELS,
                actual: labels.len(),
            });
        }
        if labels.iter().any(|label| is_blank(label)) {
            return Err(EditError::BlankScaleLabel);
        }

        let scale: Vec<String> = labels.iter().map(|label| label.trim().to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| realign_row(row, &scale))
            .collect();

        Ok(Self {
            scale,
            rows,
            ..self.clone()
        })
    }

    pub fn with_instructions(
        &self,
        student_instructions: impl Into<String>,
        grader_instructions: impl Into<String>,
    ) -> Self {
        Self {
            student_instructions: student_instructions.into(),
            grader_instructions: grader_instructions.into(),
            ..self.clone()
        }
    }

    pub fn with_feedback_section(&self, include: bool) -> Self {
        Self {
            include_feedback_section: include,
            ..self.clone()
        }
    }

    /// Adds an anchor example tagged with one of the scale's levels.
    pub fn add_anchor_example(
        &self,
        level_title: &str,
        content: &str,
        criterion_id: Option<&str>,
    ) -> Result<Self, EditError> {
        let level_title = self
            .scale_label(level_title)
            .ok_or_else(|| EditError::UnknownLevel(level_title.to_string()))?
            .to_string();
        if let Some(id) = criterion_id {
            if self.criterion(id).is_none() {
                return Err(EditError::CriterionNotFound(id.to_string()));
            }
        }

        let mut anchor_examples = self.anchor_examples.clone();
        anchor_examples.push(AnchorExample {
            id: new_id("anchor"),
            level_title,
            content: content.trim().to_string(),
            criterion_id: criterion_id.map(str::to_string),
        });

        Ok(Self {
            anchor_examples,
            ..self.clone()
        })
    }

    pub fn remove_anchor_example(&self, anchor_id: &str) -> Self {
        Self {
            anchor_examples: self
                .anchor_examples
                .iter()
                .filter(|anchor| anchor.id != anchor_id)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    pub fn detach_file(&self) -> Self {
        Self {
            attached_file: None,
            ..self.clone()
        }
    }
}

fn realign_row(row: &RubricRow, scale: &[String]) -> RubricRow {
    let levels = scale
        .iter()
        .enumerate()
        .map(|(index, label)| PerformanceLevel {
            id: level_id(&row.criterion_id, index),
            title: label.clone(),
            score: ordinal(index),
            description: row
                .levels
                .get(index)
                .map(|level| level.description.clone())
                .unwrap_or_default(),
        })
        .collect();

    RubricRow {
        levels,
        ..row.clone()
    }
}
