//! Context file ingestion: text is merged into the context material, anything
//! else becomes the single attachment.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::domain::{AttachedFile, RubricDocument};

pub const IMPORT_SEPARATOR: &str = "\n\n--- Imported Content ---\n";

const TEXT_EXTENSIONS: [&str; 4] = ["md", "txt", "csv", "json"];

/// A file selected or dropped by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingFile {
    pub name: String,
    /// Type reported by the client; may be empty.
    #[serde(default)]
    pub declared_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            bytes,
        }
    }

    /// Builds a file from a base64 payload as sent over the wire.
    pub fn from_base64(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        data: &str,
    ) -> Result<Self, base64::DecodeError> {
        Ok(Self::new(name, declared_type, STANDARD.decode(data.trim())?))
    }

    fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }

    pub fn kind(&self) -> FileKind {
        classify(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileKind {
    Text,
    Attachment { mime_type: String },
}

/// A declared PDF or `text/*` type wins. Otherwise a text extension
/// (`txt`, `md`, `csv`, `json`) makes the file text even when some other type
/// was declared; everything else is kept as an attachment under the declared
/// type, or a type guessed from the name when none was sent.
pub fn classify(file: &IncomingFile) -> FileKind {
    let declared = file.declared_type.trim().to_ascii_lowercase();

    if declared == mime::APPLICATION_PDF.essence_str() {
        return FileKind::Attachment {
            mime_type: declared,
        };
    }
    if declared.starts_with("text/") {
        return FileKind::Text;
    }
    if let Some(ext) = file.extension() {
        if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            return FileKind::Text;
        }
    }

    let mime_type = if declared.is_empty() {
        mime_guess::from_path(&file.name)
            .first()
            .map(|guess| guess.essence_str().to_string())
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.essence_str().to_string())
    } else {
        declared
    };
    FileKind::Attachment { mime_type }
}

impl RubricDocument {
    /// Merges one incoming file into the document. A new attachment replaces
    /// any previous one.
    pub fn ingest(&self, file: &IncomingFile) -> Self {
        match classify(file) {
            FileKind::Text => {
                let text = String::from_utf8_lossy(&file.bytes);
                let separator = if self.context_material.is_empty() {
                    ""
                } else {
                    IMPORT_SEPARATOR
                };
                let merged = format!("{}{separator}{text}", self.context_material);
                Self {
                    context_material: merged.trim().to_string(),
                    ..self.clone()
                }
            }
            FileKind::Attachment { mime_type } => Self {
                attached_file: Some(AttachedFile {
                    name: file.name.clone(),
                    mime_type,
                    data: STANDARD.encode(&file.bytes),
                }),
                ..self.clone()
            },
        }
    }
}
