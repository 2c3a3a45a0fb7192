use super::common::*;
use crate::rubric::domain::{GridLayout, RubricType};
use crate::rubric::edit::EditError;
use crate::rubric::grid::{GridProjection, MISSING_CRITERION_LABEL};

#[test]
fn standard_projection_has_one_row_per_criterion() {
    let document = analytic_document();
    let GridProjection::Standard(grid) = document.project_grid() else {
        panic!("analytic rubrics use the standard grid");
    };

    assert_eq!(grid.columns.len(), 4);
    assert_eq!(grid.columns[3].title, "Mastery");
    assert_eq!(grid.columns[3].score, 4);
    assert_eq!(grid.rows.len(), 3);

    let first = &grid.rows[0];
    assert_eq!(first.header.title, "Thesis Clarity");
    assert_eq!(first.header.weight, Some(34.0));
    assert_eq!(first.cells.len(), 4);
    assert_eq!(first.cells[1].description, "Developing work on crit1.");
}

#[test]
fn zero_weight_has_no_badge_and_missing_criterion_degrades() {
    let mut document = analytic_document();
    document.criteria[0].weight = Some(0.0);
    document.rows[2].criterion_id = "deleted".to_string();

    let GridProjection::Standard(grid) = document.project_grid() else {
        panic!("standard grid expected");
    };
    assert_eq!(grid.rows[0].header.weight, None);
    assert_eq!(grid.rows[2].header.title, MISSING_CRITERION_LABEL);
}

#[test]
fn holistic_projection_transposes_levels_into_rows() {
    let document = holistic_document();
    let projection = document.project_grid();
    assert_eq!(projection.layout(), GridLayout::Holistic);

    let GridProjection::Holistic(grid) = projection else {
        panic!("holistic grid expected");
    };
    assert_eq!(grid.rows.len(), 3);
    let headers: Vec<&str> = grid.rows.iter().map(|row| row.header.as_str()).collect();
    assert_eq!(headers, vec!["Weak (1 pts)", "Average (2 pts)", "Strong (3 pts)"]);
    assert_eq!(grid.rows[2].content, "Thorough, insightful understanding.");
}

#[test]
fn holistic_projection_is_idempotent() {
    let document = holistic_document();
    assert_eq!(document.project_grid(), document.project_grid());
}

#[test]
fn holistic_without_rows_projects_empty() {
    let document = crate::rubric::domain::RubricDocument::new()
        .with_rubric_type(RubricType::Holistic);
    assert_eq!(document.project_grid().row_count(), 0);
}

#[test]
fn edit_cell_replaces_only_the_target_description() {
    let document = analytic_document();
    let edited = document
        .edit_cell("row-crit1", 1, "Meets expectations")
        .expect("cell exists");

    let row = edited.row("row-crit1").expect("row kept");
    let before = document.row("row-crit1").expect("row exists");
    assert_eq!(row.levels[1].description, "Meets expectations");
    assert_eq!(row.levels[1].id, before.levels[1].id);
    assert_eq!(row.levels[0], before.levels[0]);
    assert_eq!(row.levels[2], before.levels[2]);
    assert_eq!(row.levels[3], before.levels[3]);
    assert_eq!(edited.rows[1..], document.rows[1..]);
    assert_eq!(edited.criteria, document.criteria);
}

#[test]
fn edit_cell_rejects_unknown_targets() {
    let document = analytic_document();
    assert_eq!(
        document.edit_cell("row-missing", 0, "x"),
        Err(EditError::RowNotFound("row-missing".to_string()))
    );
    assert_eq!(
        document.edit_cell("row-crit1", 4, "x"),
        Err(EditError::LevelOutOfRange {
            row_id: "row-crit1".to_string(),
            index: 4
        })
    );
}

#[test]
fn holistic_cell_edit_is_visible_in_projection() {
    let document = holistic_document()
        .edit_cell("row-holistic-overall", 0, "Minimal effort.")
        .expect("holistic row exists");
    let GridProjection::Holistic(grid) = document.project_grid() else {
        panic!("holistic grid expected");
    };
    assert_eq!(grid.rows[0].content, "Minimal effort.");
    assert_eq!(grid.rows[1].content, "Adequate understanding with gaps.");
}
