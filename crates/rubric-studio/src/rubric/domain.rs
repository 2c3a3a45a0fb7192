use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Criterion id carried by the single row of a holistic rubric.
pub const HOLISTIC_CRITERION_ID: &str = "holistic-overall";

pub const MIN_SCALE_LEVELS: usize = 2;
pub const MAX_SCALE_LEVELS: usize = 5;

/// Identifier assigned by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RubricId(pub String);

/// Identifier of the user owning a stored rubric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

/// Opaque token granting read-only public access to one rubric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareToken(pub String);

impl fmt::Display for RubricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningOutcome {
    pub id: String,
    pub text: String,
}

/// One assessed dimension of a rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Percentage share, present only while weighting is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// One cell of a rubric row. `score` is the 1-based ordinal within the scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceLevel {
    pub id: String,
    pub title: String,
    pub score: u32,
    #[serde(default)]
    pub description: String,
}

impl PerformanceLevel {
    pub fn blank(criterion_id: &str, index: usize, label: &str) -> Self {
        Self {
            id: level_id(criterion_id, index),
            title: label.to_string(),
            score: ordinal(index),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricRow {
    pub id: String,
    pub criterion_id: String,
    pub levels: Vec<PerformanceLevel>,
}

impl RubricRow {
    /// Row aligned to `scale` with every description left empty.
    pub fn blank(criterion_id: &str, scale: &[String]) -> Self {
        Self {
            id: row_id(criterion_id),
            criterion_id: criterion_id.to_string(),
            levels: scale
                .iter()
                .enumerate()
                .map(|(index, label)| PerformanceLevel::blank(criterion_id, index, label))
                .collect(),
        }
    }
}

/// Binary material attached for generation context, kept as base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedFile {
    pub name: String,
    pub mime_type: String,
    pub data: String,
}

/// Sample response illustrating one performance level, used for grader calibration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorExample {
    pub id: String,
    pub level_title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criterion_id: Option<String>,
}

/// The two presentational shapes a rubric grid can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridLayout {
    Standard,
    Holistic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RubricType {
    #[default]
    Analytic,
    Holistic,
    SinglePoint,
    Developmental,
    Checklist,
    CriterionReferenced,
    NormReferenced,
    TaskSpecific,
}

impl RubricType {
    pub const ALL: [RubricType; 8] = [
        RubricType::Analytic,
        RubricType::Holistic,
        RubricType::SinglePoint,
        RubricType::Developmental,
        RubricType::Checklist,
        RubricType::CriterionReferenced,
        RubricType::NormReferenced,
        RubricType::TaskSpecific,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            RubricType::Analytic => "Analytic",
            RubricType::Holistic => "Holistic",
            RubricType::SinglePoint => "Single-Point",
            RubricType::Developmental => "Developmental",
            RubricType::Checklist => "Checklist",
            RubricType::CriterionReferenced => "Criterion-Referenced",
            RubricType::NormReferenced => "Norm-Referenced",
            RubricType::TaskSpecific => "Task-Specific",
        }
    }

    pub const fn summary(self) -> &'static str {
        match self {
            RubricType::Analytic => "Scores each criterion separately across every performance level.",
            RubricType::Holistic => "Scores overall performance with one description per level.",
            RubricType::SinglePoint => "Describes the target standard and records concerns or evidence of exceeding it.",
            RubricType::Developmental => "Tracks growth across a fixed five-stage progression.",
            RubricType::Checklist => "Records whether each criterion is met.",
            RubricType::CriterionReferenced => "Judges work against fixed standards rather than peers.",
            RubricType::NormReferenced => "Places work relative to the performance of the cohort.",
            RubricType::TaskSpecific => "Describes performance on one particular task.",
        }
    }

    pub const fn default_scale_labels(self) -> &'static [&'static str] {
        match self {
            RubricType::Analytic => &["Emerging", "Developing", "Proficient", "Mastery"],
            RubricType::Holistic => &["Beginning", "Developing", "Proficient", "Exemplary"],
            RubricType::SinglePoint => &["Concerns", "Target", "Exceeding"],
            RubricType::Developmental => &[
                "Beginning",
                "Emerging",
                "Developing",
                "Proficient",
                "Advanced",
            ],
            RubricType::Checklist => &["Not Met", "Met"],
            RubricType::CriterionReferenced => &["Does Not Meet", "Approaching", "Meets", "Exceeds"],
            RubricType::NormReferenced => &["Below Average", "Average", "Above Average", "Exceptional"],
            RubricType::TaskSpecific => &["Incomplete", "Partial", "Complete", "Exemplary"],
        }
    }

    pub fn default_scale(self) -> Vec<String> {
        self.default_scale_labels()
            .iter()
            .map(|label| (*label).to_string())
            .collect()
    }

    /// SinglePoint, Checklist and Developmental scales are fixed by their format.
    pub const fn scale_editable(self) -> bool {
        match self {
            RubricType::SinglePoint | RubricType::Checklist | RubricType::Developmental => false,
            RubricType::Analytic
            | RubricType::Holistic
            | RubricType::CriterionReferenced
            | RubricType::NormReferenced
            | RubricType::TaskSpecific => true,
        }
    }

    pub const fn layout(self) -> GridLayout {
        match self {
            RubricType::Holistic => GridLayout::Holistic,
            RubricType::Analytic
            | RubricType::SinglePoint
            | RubricType::Developmental
            | RubricType::Checklist
            | RubricType::CriterionReferenced
            | RubricType::NormReferenced
            | RubricType::TaskSpecific => GridLayout::Standard,
        }
    }

    /// Whether rendered column headers carry a point value.
    pub const fn shows_points(self) -> bool {
        !matches!(self, RubricType::Checklist)
    }
}

impl fmt::Display for RubricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rubric type '{0}'")]
pub struct UnknownRubricType(pub String);

impl FromStr for RubricType {
    type Err = UnknownRubricType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        RubricType::ALL
            .into_iter()
            .find(|kind| {
                let name = format!("{kind:?}").to_ascii_lowercase();
                name == normalized
            })
            .ok_or_else(|| UnknownRubricType(value.to_string()))
    }
}

/// Persistence metadata. Stamped by the document store, never edited by the engines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RubricId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<OwnerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_id: Option<ShareToken>,
}

/// Canonical in-memory rubric. Every edit produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RubricDocument {
    pub topic: String,
    pub course_name: String,
    pub context_material: String,
    pub attached_file: Option<AttachedFile>,
    pub rubric_type: RubricType,
    pub outcomes: Vec<LearningOutcome>,
    pub criteria: Vec<Criterion>,
    pub rows: Vec<RubricRow>,
    pub scale: Vec<String>,
    pub student_instructions: String,
    pub grader_instructions: String,
    pub include_feedback_section: bool,
    pub anchor_examples: Vec<AnchorExample>,
    #[serde(flatten)]
    pub meta: DocumentMeta,
}

impl Default for RubricDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl RubricDocument {
    pub fn new() -> Self {
        let rubric_type = RubricType::default();
        Self {
            topic: String::new(),
            course_name: String::new(),
            context_material: String::new(),
            attached_file: None,
            rubric_type,
            outcomes: Vec::new(),
            criteria: Vec::new(),
            rows: Vec::new(),
            scale: rubric_type.default_scale(),
            student_instructions: String::new(),
            grader_instructions: String::new(),
            include_feedback_section: false,
            anchor_examples: Vec::new(),
            meta: DocumentMeta::default(),
        }
    }

    pub fn id(&self) -> Option<&RubricId> {
        self.meta.id.as_ref()
    }

    pub fn layout(&self) -> GridLayout {
        self.rubric_type.layout()
    }

    pub fn criterion(&self, criterion_id: &str) -> Option<&Criterion> {
        self.criteria
            .iter()
            .find(|criterion| criterion.id == criterion_id)
    }

    pub fn row(&self, row_id: &str) -> Option<&RubricRow> {
        self.rows.iter().find(|row| row.id == row_id)
    }

    /// Resolves a label against `scale`, ignoring case and surrounding whitespace.
    pub fn scale_label(&self, label: &str) -> Option<&str> {
        let wanted = label.trim().to_lowercase();
        self.scale
            .iter()
            .find(|entry| entry.trim().to_lowercase() == wanted)
            .map(String::as_str)
    }

    /// Advisory check of the structural invariants. Never fails; an empty
    /// result means the document is consistent.
    pub fn structural_issues(&self) -> Vec<StructuralIssue> {
        let mut issues = Vec::new();

        match self.layout() {
            GridLayout::Holistic => {
                if !self.rows.is_empty() && self.rows.len() != 1 {
                    issues.push(StructuralIssue::RowCount {
                        expected: 1,
                        actual: self.rows.len(),
                    });
                }
                for row in &self.rows {
                    if row.criterion_id != HOLISTIC_CRITERION_ID {
                        issues.push(StructuralIssue::DanglingCriterion {
                            row_id: row.id.clone(),
                            criterion_id: row.criterion_id.clone(),
                        });
                    }
                }
            }
            GridLayout::Standard => {
                if !self.rows.is_empty() && self.rows.len() != self.criteria.len() {
                    issues.push(StructuralIssue::RowCount {
                        expected: self.criteria.len(),
                        actual: self.rows.len(),
                    });
                }
                for row in &self.rows {
                    if self.criterion(&row.criterion_id).is_none() {
                        issues.push(StructuralIssue::DanglingCriterion {
                            row_id: row.id.clone(),
                            criterion_id: row.criterion_id.clone(),
                        });
                    }
                }
            }
        }

        for row in &self.rows {
            if row.levels.len() != self.scale.len() {
                issues.push(StructuralIssue::LevelCount {
                    row_id: row.id.clone(),
                    expected: self.scale.len(),
                    actual: row.levels.len(),
                });
            }
            for (index, level) in row.levels.iter().enumerate() {
                if level.score != ordinal(index) {
                    issues.push(StructuralIssue::ScoreOrdinal {
                        row_id: row.id.clone(),
                        index,
                        score: level.score,
                    });
                }
            }
        }

        if !(MIN_SCALE_LEVELS..=MAX_SCALE_LEVELS).contains(&self.scale.len()) {
            issues.push(StructuralIssue::ScaleLength {
                actual: self.scale.len(),
            });
        }

        issues
    }
}

/// Invariant violation reported by [`RubricDocument::structural_issues`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralIssue {
    #[error("expected {expected} row(s), found {actual}")]
    RowCount { expected: usize, actual: usize },
    #[error("row '{row_id}' has {actual} level(s) but the scale has {expected}")]
    LevelCount {
        row_id: String,
        expected: usize,
        actual: usize,
    },
    #[error("row '{row_id}' level {index} carries score {score}")]
    ScoreOrdinal {
        row_id: String,
        index: usize,
        score: u32,
    },
    #[error("row '{row_id}' references unknown criterion '{criterion_id}'")]
    DanglingCriterion { row_id: String, criterion_id: String },
    #[error("scale has {actual} level(s); expected between 2 and 5")]
    ScaleLength { actual: usize },
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub(crate) fn ordinal(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

pub(crate) fn row_id(criterion_id: &str) -> String {
    format!("row-{criterion_id}")
}

pub(crate) fn level_id(criterion_id: &str, index: usize) -> String {
    format!("lvl-{criterion_id}-{index}")
}

pub(crate) fn new_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &raw[..12])
}
