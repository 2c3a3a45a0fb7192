//! Export mode filtering and the JSON/HTML renderings built on it.

mod html;
mod json;

pub use html::{escape_html, render_html};
pub use json::{export_file_name, to_json, ExportFormat, UnknownExportFormat};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{is_blank, GridLayout, RubricDocument};
use super::grid::GridProjection;

/// Audience of an export pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    #[default]
    Full,
    Student,
    Grader,
}

impl ExportMode {
    pub const fn label(self) -> &'static str {
        match self {
            ExportMode::Full => "full",
            ExportMode::Student => "student",
            ExportMode::Grader => "grader",
        }
    }

    pub const fn includes_student_text(self) -> bool {
        matches!(self, ExportMode::Full | ExportMode::Student)
    }

    pub const fn includes_grader_text(self) -> bool {
        matches!(self, ExportMode::Full | ExportMode::Grader)
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown export mode '{0}' (expected full, student or grader)")]
pub struct UnknownExportMode(pub String);

impl FromStr for ExportMode {
    type Err = UnknownExportMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(ExportMode::Full),
            "student" => Ok(ExportMode::Student),
            "grader" => Ok(ExportMode::Grader),
            _ => Err(UnknownExportMode(value.to_string())),
        }
    }
}

/// Which optional sections a rendering pass includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportSections {
    pub student_instructions: bool,
    pub grader_instructions: bool,
    pub feedback: bool,
    pub anchor_examples: bool,
}

impl ExportSections {
    pub fn resolve(document: &RubricDocument, mode: ExportMode) -> Self {
        Self {
            student_instructions: mode.includes_student_text()
                && !is_blank(&document.student_instructions),
            grader_instructions: mode.includes_grader_text()
                && !is_blank(&document.grader_instructions),
            feedback: document.include_feedback_section
                && document.layout() == GridLayout::Standard,
            anchor_examples: !document.anchor_examples.is_empty(),
        }
    }
}

/// Anchor example as displayed, with its criterion resolved to a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorExampleView {
    pub level_title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criterion: Option<String>,
}

/// Blank annotation row appended under a standard grid; one empty cell per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRow {
    pub label: &'static str,
    pub cells: Vec<String>,
}

pub const FEEDBACK_ROW_LABEL: &str = "Feedback";

/// Read-only projection of a document for one audience. The source document
/// is borrowed and never altered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportView<'a> {
    pub mode: ExportMode,
    pub sections: ExportSections,
    pub topic: &'a str,
    pub course_name: &'a str,
    pub rubric_type: &'static str,
    pub outcomes: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_instructions: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grader_instructions: Option<&'a str>,
    pub grid: GridProjection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_row: Option<FeedbackRow>,
    pub anchor_examples: Vec<AnchorExampleView>,
    pub shows_points: bool,
}

impl<'a> ExportView<'a> {
    pub fn build(document: &'a RubricDocument, mode: ExportMode) -> Self {
        let sections = ExportSections::resolve(document, mode);

        let feedback_row = sections.feedback.then(|| FeedbackRow {
            label: FEEDBACK_ROW_LABEL,
            cells: vec![String::new(); document.scale.len()],
        });

        let anchor_examples = if sections.anchor_examples {
            document
                .anchor_examples
                .iter()
                .map(|anchor| AnchorExampleView {
                    level_title: anchor.level_title.clone(),
                    content: anchor.content.clone(),
                    criterion: anchor.criterion_id.as_deref().map(|id| {
                        document
                            .criterion(id)
                            .map(|criterion| criterion.title.clone())
                            .unwrap_or_else(|| id.to_string())
                    }),
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            mode,
            sections,
            topic: &document.topic,
            course_name: &document.course_name,
            rubric_type: document.rubric_type.label(),
            outcomes: document
                .outcomes
                .iter()
                .map(|outcome| outcome.text.as_str())
                .collect(),
            student_instructions: sections
                .student_instructions
                .then_some(document.student_instructions.as_str()),
            grader_instructions: sections
                .grader_instructions
                .then_some(document.grader_instructions.as_str()),
            grid: document.project_grid(),
            feedback_row,
            anchor_examples,
            shows_points: document.rubric_type.shows_points(),
        }
    }
}

impl RubricDocument {
    pub fn export_view(&self, mode: ExportMode) -> ExportView<'_> {
        ExportView::build(self, mode)
    }
}
