use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::super::domain::AttachedFile;
use super::prompt::{criteria_prompt, criteria_schema, levels_prompt, levels_schema, SYSTEM_INSTRUCTION};
use super::{
    CriteriaRequest, GenerationError, LevelsRequest, SuggestedCriterion, SuggestedRow,
    SuggestionService,
};
use crate::config::SuggestionConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Blocking client for the Gemini `generateContent` REST endpoint.
///
/// Calls block the current thread; async callers should go through
/// `tokio::task::spawn_blocking`. The HTTP client is built per call so the
/// value itself can be created and dropped on an async thread.
pub struct GeminiClient {
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns `Unconfigured` when no API key is present.
    pub fn from_config(config: &SuggestionConfig) -> Result<Self, GenerationError> {
        let api_key = config.api_key.clone().ok_or(GenerationError::Unconfigured)?;
        Ok(Self::new(api_key, config.model.clone(), config.endpoint.clone()))
    }

    pub fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn generate<T: DeserializeOwned>(
        &self,
        prompt: String,
        attachment: Option<&AttachedFile>,
        schema: Value,
    ) -> Result<T, GenerationError> {
        let body = GenerateContentRequest::new(prompt, attachment, schema);
        debug!(model = %self.model, attachment = attachment.is_some(), "calling generateContent");

        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| GenerationError::Failed(err.to_string()))?;
        let response = http
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|err| GenerationError::Failed(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(GenerationError::Failed(format!("{status}: {detail}")));
        }

        let payload: GenerateContentResponse = response
            .json()
            .map_err(|err| GenerationError::Malformed(err.to_string()))?;
        let text = payload.text();
        if text.trim().is_empty() {
            return Err(GenerationError::Empty);
        }

        serde_json::from_str(&text).map_err(|err| GenerationError::Malformed(err.to_string()))
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl SuggestionService for GeminiClient {
    fn suggest_criteria(
        &self,
        request: &CriteriaRequest,
    ) -> Result<Vec<SuggestedCriterion>, GenerationError> {
        self.generate(
            criteria_prompt(request),
            request.attached_file.as_ref(),
            criteria_schema(),
        )
    }

    fn suggest_levels(&self, request: &LevelsRequest) -> Result<Vec<SuggestedRow>, GenerationError> {
        self.generate(
            levels_prompt(request),
            request.attached_file.as_ref(),
            levels_schema(),
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn new(prompt: String, attachment: Option<&AttachedFile>, schema: Value) -> Self {
        let mut parts = vec![Part::Text { text: prompt }];
        if let Some(file) = attachment {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: file.mime_type.clone(),
                    data: file.data.clone(),
                },
            });
        }

        Self {
            contents: vec![Content { parts }],
            system_instruction: Content {
                parts: vec![Part::Text {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: mime::APPLICATION_JSON.essence_str().to_string(),
                response_schema: schema,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Other(Value),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| match part {
                        Part::Text { text } => Some(text.as_str()),
                        Part::InlineData { .. } | Part::Other(_) => None,
                    })
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
