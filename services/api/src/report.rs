use crate::infra::read_document;
use clap::Args;
use rubric_studio::error::AppError;
use rubric_studio::rubric::{
    render_html, to_json, ChecklistPriority, ExportFormat, ExportMode, RubricDocument,
};
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct QualityArgs {
    /// Rubric document saved as JSON
    pub(crate) file: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Rubric document saved as JSON
    pub(crate) file: PathBuf,
    /// Output format: json or html (doc, word and pdf map to html)
    #[arg(long, default_value = "html")]
    pub(crate) format: ExportFormat,
    /// Audience: full, student or grader
    #[arg(long, default_value = "full")]
    pub(crate) mode: ExportMode,
    /// Write to this path instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_quality(args: QualityArgs) -> Result<(), AppError> {
    let document = read_document(&args.file)?;
    print!("{}", quality_summary(&document));
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let document = read_document(&args.file)?;
    let body = render_export(&document, args.format, args.mode)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, body)?;
            println!(
                "Wrote {} export ({} mode) to {}",
                args.format.extension(),
                args.mode,
                path.display()
            );
        }
        None => println!("{body}"),
    }
    Ok(())
}

pub(crate) fn render_export(
    document: &RubricDocument,
    format: ExportFormat,
    mode: ExportMode,
) -> Result<String, AppError> {
    match format {
        ExportFormat::Json => Ok(to_json(document)?),
        ExportFormat::Html => Ok(render_html(document, mode)),
    }
}

/// Plain-text checklist report, one line per item.
pub(crate) fn quality_summary(document: &RubricDocument) -> String {
    let report = document.quality();
    let mut out = String::new();

    let topic = if document.topic.trim().is_empty() {
        "Untitled rubric"
    } else {
        document.topic.as_str()
    };
    let _ = writeln!(out, "{topic} ({})", document.rubric_type);
    let _ = writeln!(
        out,
        "Quality score: {}% ({}) | {}/{} items",
        report.score,
        report.band.label(),
        report.satisfied,
        report.total
    );

    for item in &report.items {
        let mark = if item.satisfied { "x" } else { " " };
        let priority = match item.priority {
            ChecklistPriority::Required => " (required)",
            ChecklistPriority::Recommended => "",
        };
        let _ = writeln!(out, "  [{mark}] {}{priority}", item.label);
    }

    if report.required_satisfied {
        let _ = writeln!(out, "All required items satisfied.");
    } else {
        let missing: Vec<&str> = report
            .missing_required()
            .iter()
            .map(|item| item.label)
            .collect();
        let _ = writeln!(out, "Missing required: {}", missing.join(", "));
    }

    let weights = document.weight_summary();
    if weights.enabled {
        let _ = writeln!(
            out,
            "Weights total {:.0}%{}",
            weights.total,
            if weights.balanced { "" } else { " (must equal 100%)" }
        );
    }

    for issue in document.structural_issues() {
        let _ = writeln!(out, "Warning: {issue}");
    }
    out
}
