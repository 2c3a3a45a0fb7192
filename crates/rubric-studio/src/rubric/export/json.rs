use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::super::domain::RubricDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Json,
    Html,
}

impl ExportFormat {
    pub fn content_type(self) -> mime::Mime {
        match self {
            ExportFormat::Json => mime::APPLICATION_JSON,
            ExportFormat::Html => mime::TEXT_HTML_UTF_8,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown export format '{0}' (expected json or html)")]
pub struct UnknownExportFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownExportFormat;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "html" | "doc" | "word" | "pdf" => Ok(ExportFormat::Html),
            _ => Err(UnknownExportFormat(value.to_string())),
        }
    }
}

/// Pretty-printed camelCase serialisation of the full document.
pub fn to_json(document: &RubricDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

/// `<topic>_rubric.<ext>`. Anything in the topic outside ASCII letters, digits
/// and `-` becomes a single `_` separator, so the name is always a valid
/// quoted-string header value.
pub fn export_file_name(document: &RubricDocument, format: ExportFormat) -> String {
    let cleaned: String = document
        .topic
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' { ch } else { '_' })
        .collect();
    let stem = cleaned
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let stem = if stem.is_empty() { "untitled" } else { stem.as_str() };
    format!("{stem}_rubric.{}", format.extension())
}
