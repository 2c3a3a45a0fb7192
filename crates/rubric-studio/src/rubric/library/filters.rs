use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::{RubricDocument, RubricId, RubricType, ShareToken};
use super::super::quality::QualityReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    UpdatedAt,
    CreatedAt,
    Topic,
}

/// Unparseable listing parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} '{value}'")]
pub struct InvalidFilter {
    pub field: &'static str,
    pub value: String,
}

impl FromStr for SortKey {
    type Err = InvalidFilter;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "updatedat" | "updated" => Ok(SortKey::UpdatedAt),
            "createdat" | "created" => Ok(SortKey::CreatedAt),
            "topic" | "title" => Ok(SortKey::Topic),
            _ => Err(InvalidFilter {
                field: "sort_by",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = InvalidFilter;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(InvalidFilter {
                field: "order",
                value: value.to_string(),
            }),
        }
    }
}

/// Library listing controls. Defaults to most recently updated first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryFilters {
    pub search: Option<String>,
    pub rubric_type: Option<RubricType>,
    pub sort_by: SortKey,
    pub order: SortOrder,
}

impl LibraryFilters {
    /// Case-insensitive search over topic and course name plus the type filter.
    pub fn matches(&self, document: &RubricDocument) -> bool {
        if let Some(kind) = self.rubric_type {
            if document.rubric_type != kind {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                document.topic.to_lowercase().contains(&term)
                    || document.course_name.to_lowercase().contains(&term)
            }
        }
    }

    fn compare(&self, a: &RubricDocument, b: &RubricDocument) -> Ordering {
        let ordering = match self.sort_by {
            SortKey::UpdatedAt => a.meta.updated_at.cmp(&b.meta.updated_at),
            SortKey::CreatedAt => a.meta.created_at.cmp(&b.meta.created_at),
            SortKey::Topic => a.topic.to_lowercase().cmp(&b.topic.to_lowercase()),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Filters then sorts. The sort is stable so ties keep store order.
    pub fn apply(&self, documents: Vec<RubricDocument>) -> Vec<RubricDocument> {
        let mut selected: Vec<RubricDocument> = documents
            .into_iter()
            .filter(|document| self.matches(document))
            .collect();
        selected.sort_by(|a, b| self.compare(a, b));
        selected
    }
}

/// Library card view of a stored rubric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubricSummary {
    pub id: Option<RubricId>,
    pub topic: String,
    pub course_name: String,
    pub rubric_type: RubricType,
    pub criteria_count: usize,
    pub quality_score: u8,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_id: Option<ShareToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RubricSummary {
    pub fn from_document(document: &RubricDocument) -> Self {
        Self {
            id: document.meta.id.clone(),
            topic: document.topic.clone(),
            course_name: document.course_name.clone(),
            rubric_type: document.rubric_type,
            criteria_count: document.criteria.len(),
            quality_score: QualityReport::assess(document).score,
            is_public: document.meta.is_public,
            share_id: document.meta.share_id.clone(),
            created_at: document.meta.created_at,
            updated_at: document.meta.updated_at,
        }
    }
}
