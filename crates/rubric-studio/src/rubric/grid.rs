//! Level-grid projection.
//!
//! The editor and every export render the same matrix, in one of two shapes
//! picked by the rubric type: a per-criterion grid, or the transposed
//! score list used by holistic rubrics.

use serde::Serialize;

use super::domain::{GridLayout, PerformanceLevel, RubricDocument, RubricRow};
use super::edit::EditError;

/// Header label used when a row points at a criterion that no longer exists.
pub const MISSING_CRITERION_LABEL: &str = "Criterion";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum GridProjection {
    Standard(StandardGrid),
    Holistic(HolisticGrid),
}

impl GridProjection {
    pub fn project(document: &RubricDocument) -> Self {
        match document.layout() {
            GridLayout::Standard => Self::Standard(StandardGrid::project(document)),
            GridLayout::Holistic => Self::Holistic(HolisticGrid::project(document)),
        }
    }

    pub fn layout(&self) -> GridLayout {
        match self {
            Self::Standard(_) => GridLayout::Standard,
            Self::Holistic(_) => GridLayout::Holistic,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::Standard(grid) => grid.rows.len(),
            Self::Holistic(grid) => grid.rows.len(),
        }
    }
}

/// Column heading over a standard grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaleColumn {
    pub title: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionHeader {
    pub title: String,
    pub description: String,
    /// Rendered as a badge; only present for a positive weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub level_id: String,
    pub title: String,
    pub score: u32,
    pub description: String,
}

impl From<&PerformanceLevel> for GridCell {
    fn from(level: &PerformanceLevel) -> Self {
        Self {
            level_id: level.id.clone(),
            title: level.title.clone(),
            score: level.score,
            description: level.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardGridRow {
    pub row_id: String,
    pub criterion_id: String,
    pub header: CriterionHeader,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardGrid {
    pub columns: Vec<ScaleColumn>,
    pub rows: Vec<StandardGridRow>,
}

impl StandardGrid {
    pub fn project(document: &RubricDocument) -> Self {
        let columns = document
            .scale
            .iter()
            .enumerate()
            .map(|(index, title)| ScaleColumn {
                title: title.clone(),
                score: super::domain::ordinal(index),
            })
            .collect();

        let rows = document
            .rows
            .iter()
            .map(|row| StandardGridRow {
                row_id: row.id.clone(),
                criterion_id: row.criterion_id.clone(),
                header: criterion_header(document, row),
                cells: row.levels.iter().map(GridCell::from).collect(),
            })
            .collect();

        Self { columns, rows }
    }
}

fn criterion_header(document: &RubricDocument, row: &RubricRow) -> CriterionHeader {
    match document.criterion(&row.criterion_id) {
        Some(criterion) => CriterionHeader {
            title: criterion.title.clone(),
            description: criterion.description.clone(),
            weight: criterion.weight.filter(|weight| *weight > 0.0),
        },
        None => CriterionHeader {
            title: MISSING_CRITERION_LABEL.to_string(),
            description: String::new(),
            weight: None,
        },
    }
}

/// One score level of a holistic rubric, rendered as a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolisticGridRow {
    pub level_id: String,
    pub title: String,
    pub score: u32,
    pub header: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolisticGrid {
    pub row_id: Option<String>,
    pub rows: Vec<HolisticGridRow>,
}

impl HolisticGrid {
    /// Transposes the sole row: one output row per level, read in order.
    pub fn project(document: &RubricDocument) -> Self {
        let Some(row) = document.rows.first() else {
            return Self {
                row_id: None,
                rows: Vec::new(),
            };
        };

        Self {
            row_id: Some(row.id.clone()),
            rows: row
                .levels
                .iter()
                .map(|level| HolisticGridRow {
                    level_id: level.id.clone(),
                    title: level.title.clone(),
                    score: level.score,
                    header: format!("{} ({} pts)", level.title, level.score),
                    content: level.description.clone(),
                })
                .collect(),
        }
    }
}

impl RubricDocument {
    pub fn project_grid(&self) -> GridProjection {
        GridProjection::project(self)
    }

    /// Replaces the description of one cell. Every other row and level is
    /// carried over unchanged.
    pub fn edit_cell(
        &self,
        row_id: &str,
        level_index: usize,
        text: impl Into<String>,
    ) -> Result<Self, EditError> {
        let row = self
            .row(row_id)
            .ok_or_else(|| EditError::RowNotFound(row_id.to_string()))?;
        if level_index >= row.levels.len() {
            return Err(EditError::LevelOutOfRange {
                row_id: row_id.to_string(),
                index: level_index,
            });
        }

        let text = text.into();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                if row.id != row_id {
                    return row.clone();
                }
                let levels = row
                    .levels
                    .iter()
                    .enumerate()
                    .map(|(index, level)| {
                        if index == level_index {
                            PerformanceLevel {
                                description: text.clone(),
                                ..level.clone()
                            }
                        } else {
                            level.clone()
                        }
                    })
                    .collect();
                RubricRow {
                    levels,
                    ..row.clone()
                }
            })
            .collect();

        Ok(Self {
            rows,
            ..self.clone()
        })
    }
}
