use std::fmt::Write as _;

use super::super::domain::RubricDocument;
use super::super::grid::{GridProjection, HolisticGrid, StandardGrid};
use super::{ExportMode, ExportView, FeedbackRow};

const PRINT_CSS: &str = "body{font-family:Georgia,serif;margin:2rem;color:#111}\
table{border-collapse:collapse;width:100%;margin:1rem 0}\
th,td{border:1px solid #444;padding:0.5rem;vertical-align:top}\
th{background:#f1f1f1}\
.pts{display:block;font-size:0.8em;font-weight:normal}\
.weight{font-size:0.8em;color:#555}\
.instructions{border-left:3px solid #888;padding-left:0.75rem}\
.comments{min-height:6rem;border:1px solid #444}\
@page{margin:1.5cm}";

/// Renders the document as a standalone HTML page for the given audience.
pub fn render_html(document: &RubricDocument, mode: ExportMode) -> String {
    let view = document.export_view(mode);
    let mut html = String::new();

    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>",
        escape_html(&page_title(&view)),
        PRINT_CSS
    );
    render_header(&mut html, &view);
    render_instructions(&mut html, &view);

    match &view.grid {
        GridProjection::Standard(grid) => {
            render_standard_grid(&mut html, grid, view.shows_points, view.feedback_row.as_ref())
        }
        GridProjection::Holistic(grid) => render_holistic_grid(&mut html, grid),
    }

    if view.sections.feedback {
        html.push_str("<h2>Overall Comments</h2><div class=\"comments\"></div>");
    }
    render_anchor_examples(&mut html, &view);

    html.push_str("</body></html>");
    html
}

fn page_title(view: &ExportView<'_>) -> String {
    if view.topic.trim().is_empty() {
        "Rubric".to_string()
    } else {
        format!("{} Rubric", view.topic.trim())
    }
}

fn render_header(html: &mut String, view: &ExportView<'_>) {
    let _ = write!(html, "<h1>{}</h1>", escape_html(view.topic));
    if !view.course_name.trim().is_empty() {
        let _ = write!(html, "<p><strong>{}</strong></p>", escape_html(view.course_name));
    }
    let _ = write!(html, "<p>{} Rubric</p>", escape_html(view.rubric_type));

    if !view.outcomes.is_empty() {
        html.push_str("<h2>Learning Outcomes</h2><ul>");
        for outcome in &view.outcomes {
            let _ = write!(html, "<li>{}</li>", escape_html(outcome));
        }
        html.push_str("</ul>");
    }
}

fn render_instructions(html: &mut String, view: &ExportView<'_>) {
    if let Some(text) = view.student_instructions {
        let _ = write!(
            html,
            "<section class=\"instructions\"><h2>Student Instructions</h2>{}</section>",
            paragraphs(text)
        );
    }
    if let Some(text) = view.grader_instructions {
        let _ = write!(
            html,
            "<section class=\"instructions\"><h2>Grader Instructions</h2>{}</section>",
            paragraphs(text)
        );
    }
}

fn render_standard_grid(
    html: &mut String,
    grid: &StandardGrid,
    shows_points: bool,
    feedback_row: Option<&FeedbackRow>,
) {
    html.push_str("<table><thead><tr><th>Criteria</th>");
    for column in &grid.columns {
        if shows_points {
            let _ = write!(
                html,
                "<th>{}<span class=\"pts\">{} pts</span></th>",
                escape_html(&column.title),
                column.score
            );
        } else {
            let _ = write!(html, "<th>{}</th>", escape_html(&column.title));
        }
    }
    html.push_str("</tr></thead><tbody>");

    for row in &grid.rows {
        let _ = write!(html, "<tr><th>{}", escape_html(&row.header.title));
        if let Some(weight) = row.header.weight {
            let _ = write!(html, " <span class=\"weight\">({weight}%)</span>");
        }
        if !row.header.description.trim().is_empty() {
            let _ = write!(html, "<p>{}</p>", escape_html(&row.header.description));
        }
        html.push_str("</th>");
        for cell in &row.cells {
            let _ = write!(html, "<td>{}</td>", escape_html(&cell.description));
        }
        html.push_str("</tr>");
    }

    if let Some(feedback) = feedback_row {
        let _ = write!(html, "<tr><th>{}</th>", feedback.label);
        for _ in &feedback.cells {
            html.push_str("<td></td>");
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
}

fn render_holistic_grid(html: &mut String, grid: &HolisticGrid) {
    html.push_str("<table><thead><tr><th>Level</th><th>Description</th></tr></thead><tbody>");
    for row in &grid.rows {
        let _ = write!(
            html,
            "<tr><th>{}</th><td>{}</td></tr>",
            escape_html(&row.header),
            escape_html(&row.content)
        );
    }
    html.push_str("</tbody></table>");
}

fn render_anchor_examples(html: &mut String, view: &ExportView<'_>) {
    if view.anchor_examples.is_empty() {
        return;
    }
    html.push_str("<h2>Anchor Examples</h2>");
    for anchor in &view.anchor_examples {
        let _ = write!(html, "<article><h3>{}", escape_html(&anchor.level_title));
        if let Some(criterion) = &anchor.criterion {
            let _ = write!(html, " &middot; {}", escape_html(criterion));
        }
        let _ = write!(html, "</h3>{}</article>", paragraphs(&anchor.content));
    }
}

fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| format!("<p>{}</p>", escape_html(paragraph).replace('\n', "<br>")))
        .collect()
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
