use crate::report::quality_summary;
use clap::Args;
use rubric_studio::error::AppError;
use rubric_studio::rubric::{
    export_file_name, render_html, ExportFormat, ExportMode, GridProjection,
    InMemoryRubricRepository, OwnerId, RubricDocument, RubricLibraryService, RubricRow,
    WizardState,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Audience for the rendered export at the end of the demo
    #[arg(long, default_value = "student")]
    pub(crate) mode: ExportMode,
    /// Print the full HTML export instead of a size summary
    #[arg(long)]
    pub(crate) print_html: bool,
}

const DEMO_OWNER: &str = "demo-instructor";

const DESCRIPTORS: [(&str, [&str; 4]); 3] = [
    (
        "Thesis Clarity",
        [
            "Claim is missing or unclear.",
            "Claim is present but broad.",
            "Claim is clear and arguable.",
            "Claim is precise, arguable and framed by context.",
        ],
    ),
    (
        "Use of Evidence",
        [
            "Few or irrelevant sources.",
            "Sources support some points.",
            "Sources support each point.",
            "Sources are weighed against each other.",
        ],
    ),
    (
        "Organization",
        [
            "Ideas appear in no clear order.",
            "Sections exist but transitions are abrupt.",
            "Paragraphs follow a logical sequence.",
            "Structure builds the argument step by step.",
        ],
    ),
];

/// Sample essay rubric assembled through the editing operations.
pub(crate) fn sample_rubric() -> Result<RubricDocument, AppError> {
    let mut document = RubricDocument::new()
        .with_context("Research Essay", "HIST 210")
        .add_outcome("Construct an evidence-based argument")
        .add_outcome("Evaluate primary sources")
        .add_outcome("Cite sources correctly");

    for (title, _) in DESCRIPTORS {
        document = document.add_criterion(title, &format!("{title} across the essay."));
    }
    let document = document.set_weighting(true);

    let rows: Vec<RubricRow> = document
        .criteria
        .iter()
        .map(|criterion| RubricRow::blank(&criterion.id, &document.scale))
        .collect();
    let mut document = document.with_rows(rows);

    let row_ids: Vec<String> = document.rows.iter().map(|row| row.id.clone()).collect();
    for (row_id, (_, descriptions)) in row_ids.iter().zip(DESCRIPTORS.iter()) {
        for (level_index, text) in descriptions.iter().enumerate() {
            document = document
                .edit_cell(row_id, level_index, *text)
                .map_err(|err| AppError::Internal(err.to_string()))?;
        }
    }

    let first_criterion = document.criteria.first().map(|criterion| criterion.id.clone());
    document
        .with_instructions(
            "Submit 2,000 words with Chicago-style citations.",
            "Calibrate on the anchor essay before scoring.",
        )
        .with_feedback_section(true)
        .add_anchor_example(
            "Mastery",
            "The essay argues that tariff policy, not war debt, drove the 1930s slowdown.",
            first_criterion.as_deref(),
        )
        .map_err(|err| AppError::Internal(err.to_string()))
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Rubric Studio demo");

    let document = sample_rubric()?;
    let mut wizard = WizardState::new();
    while let Ok(next) = wizard.advance(&document) {
        println!("- Step {} complete", wizard.current.label());
        wizard = next;
    }
    println!("- Reached {}", wizard.current.label());

    println!("\nWeights");
    for share in document.weight_summary().shares {
        println!("  - {}: {:.0}%", share.title, share.weight.unwrap_or(0.0));
    }

    println!("\nQuality");
    for line in quality_summary(&document).lines() {
        println!("  {line}");
    }

    println!("\nGrid");
    match document.project_grid() {
        GridProjection::Standard(grid) => {
            let columns: Vec<String> = grid
                .columns
                .iter()
                .map(|column| format!("{} ({})", column.title, column.score))
                .collect();
            println!("  Columns: {}", columns.join(" | "));
            for row in &grid.rows {
                println!("  - {}: {} cells", row.header.title, row.cells.len());
            }
        }
        GridProjection::Holistic(grid) => {
            for row in &grid.rows {
                println!("  - {}", row.header);
            }
        }
    }

    println!("\nLibrary");
    let repository = Arc::new(InMemoryRubricRepository::new());
    let library = RubricLibraryService::new(repository);
    let owner = OwnerId(DEMO_OWNER.to_string());
    let stored = library.save(&owner, &document)?;
    let id = stored
        .meta
        .id
        .clone()
        .ok_or_else(|| AppError::Internal("store returned no id".to_string()))?;
    println!("- Saved rubric {id}");

    match library.set_sharing(&owner, &id, true)? {
        Some(token) => {
            let shared = library.shared(&token)?;
            println!("- Shared as /api/v1/shared/{token} ({})", shared.topic);
        }
        None => println!("- Sharing returned no token"),
    }
    let copy = library.duplicate(&owner, &id)?;
    println!("- Duplicated as \"{}\"", copy.topic);

    println!("\nExport ({} mode)", args.mode);
    let html = render_html(&stored, args.mode);
    if args.print_html {
        println!("{html}");
    } else {
        println!(
            "- {} ({} bytes)",
            export_file_name(&stored, ExportFormat::Html),
            html.len()
        );
    }

    Ok(())
}
