use serde::{Deserialize, Serialize};

use super::super::domain::{is_blank, RubricDocument};
use super::super::weights::weights_valid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistPriority {
    Required,
    Recommended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistItemId {
    RubricType,
    CourseName,
    Outcomes,
    Criteria,
    Weights,
    StudentInstructions,
    GraderInstructions,
    Descriptors,
}

/// One best-practice rule evaluated against a document.
#[derive(Clone, Copy)]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    pub label: &'static str,
    pub priority: ChecklistPriority,
    check: fn(&RubricDocument) -> bool,
}

impl ChecklistItem {
    pub fn is_satisfied(&self, document: &RubricDocument) -> bool {
        (self.check)(document)
    }
}

impl std::fmt::Debug for ChecklistItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecklistItem")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

pub const MIN_RECOMMENDED_OUTCOMES: usize = 3;
pub const MIN_RECOMMENDED_CRITERIA: usize = 3;

/// Fixed, ordered checklist. Order is part of the report contract.
pub const CHECKLIST: [ChecklistItem; 8] = [
    ChecklistItem {
        id: ChecklistItemId::RubricType,
        label: "Rubric type selected",
        priority: ChecklistPriority::Required,
        check: rubric_type_selected,
    },
    ChecklistItem {
        id: ChecklistItemId::CourseName,
        label: "Course name provided",
        priority: ChecklistPriority::Required,
        check: course_name_provided,
    },
    ChecklistItem {
        id: ChecklistItemId::Outcomes,
        label: "At least 3 learning outcomes",
        priority: ChecklistPriority::Recommended,
        check: enough_outcomes,
    },
    ChecklistItem {
        id: ChecklistItemId::Criteria,
        label: "At least 3 criteria",
        priority: ChecklistPriority::Recommended,
        check: enough_criteria,
    },
    ChecklistItem {
        id: ChecklistItemId::Weights,
        label: "Weights assigned (if criteria > 1)",
        priority: ChecklistPriority::Recommended,
        check: weights_assigned,
    },
    ChecklistItem {
        id: ChecklistItemId::StudentInstructions,
        label: "Student instructions provided",
        priority: ChecklistPriority::Recommended,
        check: student_instructions_provided,
    },
    ChecklistItem {
        id: ChecklistItemId::GraderInstructions,
        label: "Grader instructions provided",
        priority: ChecklistPriority::Recommended,
        check: grader_instructions_provided,
    },
    ChecklistItem {
        id: ChecklistItemId::Descriptors,
        label: "All descriptors filled",
        priority: ChecklistPriority::Required,
        check: descriptors_filled,
    },
];

// The type is always present on a typed document; the item stays so the
// denominator matches the published checklist.
fn rubric_type_selected(_document: &RubricDocument) -> bool {
    true
}

fn course_name_provided(document: &RubricDocument) -> bool {
    !is_blank(&document.course_name)
}

fn enough_outcomes(document: &RubricDocument) -> bool {
    document.outcomes.len() >= MIN_RECOMMENDED_OUTCOMES
}

fn enough_criteria(document: &RubricDocument) -> bool {
    document.criteria.len() >= MIN_RECOMMENDED_CRITERIA
}

fn weights_assigned(document: &RubricDocument) -> bool {
    weights_valid(&document.criteria)
}

fn student_instructions_provided(document: &RubricDocument) -> bool {
    !is_blank(&document.student_instructions)
}

fn grader_instructions_provided(document: &RubricDocument) -> bool {
    !is_blank(&document.grader_instructions)
}

fn descriptors_filled(document: &RubricDocument) -> bool {
    !document.rows.is_empty()
        && document
            .rows
            .iter()
            .all(|row| row.levels.iter().all(|level| !is_blank(&level.description)))
}
