use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{OwnerId, RubricDocument, RubricId, RubricType, ShareToken, StructuralIssue};
use super::export::{export_file_name, render_html, to_json, ExportFormat, ExportMode};
use super::grid::GridProjection;
use super::ingest::IncomingFile;
use super::library::{
    LibraryFilters, RubricLibraryService, RubricPatch, RubricRepository, RubricSummary, SortKey,
    SortOrder,
};
use super::quality::QualityReport;
use super::suggest::{GenerationError, RubricAssistant, SuggestionService};
use super::weights::WeightSummary;
use crate::error::AppError;

/// Header carrying the caller's identity. Authentication happens upstream.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Shared state behind the rubric routes.
pub struct RubricApi<R> {
    pub library: RubricLibraryService<R>,
    /// Absent when no generative backend is configured.
    pub assistant: Option<RubricAssistant<dyn SuggestionService>>,
}

impl<R> RubricApi<R>
where
    R: RubricRepository + 'static,
{
    pub fn new(
        library: RubricLibraryService<R>,
        assistant: Option<RubricAssistant<dyn SuggestionService>>,
    ) -> Self {
        Self { library, assistant }
    }
}

/// Router builder exposing the library, analysis, export and suggestion endpoints.
pub fn rubric_router<R>(api: Arc<RubricApi<R>>) -> Router
where
    R: RubricRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/rubrics",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/v1/rubrics/analysis", post(analysis_handler))
        .route("/api/v1/rubrics/export", post(export_handler))
        .route("/api/v1/rubrics/ingest", post(ingest_handler))
        .route(
            "/api/v1/rubrics/:rubric_id",
            get(get_handler::<R>)
                .put(update_handler::<R>)
                .patch(patch_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/rubrics/:rubric_id/duplicate",
            post(duplicate_handler::<R>),
        )
        .route(
            "/api/v1/rubrics/:rubric_id/share",
            post(share_handler::<R>).delete(unshare_handler::<R>),
        )
        .route("/api/v1/shared/:token", get(shared_handler::<R>))
        .route("/api/v1/shared/:token/html", get(shared_html_handler::<R>))
        .route(
            "/api/v1/suggestions/criteria",
            post(suggest_criteria_handler::<R>),
        )
        .route("/api/v1/suggestions/levels", post(suggest_levels_handler::<R>))
        .with_state(api)
}

pub(crate) fn owner_from(headers: &HeaderMap) -> Result<OwnerId, AppError> {
    headers
        .get(OWNER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| OwnerId(value.to_string()))
        .ok_or(AppError::MissingOwner)
}

pub(crate) async fn create_handler<R>(
    State(api): State<Arc<RubricApi<R>>>,
    headers: HeaderMap,
    Json(document): Json<RubricDocument>,
) -> Response
where
    R: RubricRepository + 'static,
{
    let owner = match owner_from(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };
    match api.library.save(&owner, &document) {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    search: Option<String>,
    rubric_type: Option<String>,
    sort_by: Option<String>,
    order: Option<String>,
}

impl ListQuery {
    fn into_filters(self) -> Result<LibraryFilters, AppError> {
        let invalid = |err: &dyn std::fmt::Display| AppError::InvalidRequest(err.to_string());

        let rubric_type = match self.rubric_type.as_deref().map(str::trim) {
            None | Some("") | Some("all") | Some("All") => None,
            Some(value) => Some(value.parse::<RubricType>().map_err(|err| invalid(&err))?),
        };
        let sort_by = match self.sort_by.as_deref() {
            None => SortKey::default(),
            Some(value) => value.parse::<SortKey>().map_err(|err| invalid(&err))?,
        };
        let order = match self.order.as_deref() {
            None => SortOrder::default(),
            Some(value) => value.parse::<SortOrder>().map_err(|err| invalid(&err))?,
        };

        Ok(LibraryFilters {
            search: self.search,
            rubric_type,
            sort_by,
            order,
        })
    }
}

pub(crate) async fn list_handler<R>(
    State(api): State<Arc<RubricApi<R>>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: RubricRepository + 'static,
{
    let owner = match owner_from(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };
    let filters = match query.into_filters() {
        Ok(filters) => filters,
        Err(err) => return err.into_response(),
    };
    match api.library.list(&owner, &filters) {
        Ok(documents) => {
            let summaries: Vec<RubricSummary> =
                documents.iter().map(RubricSummary::from_document).collect();
            (StatusCode::OK, Json(summaries)).into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn get_handler<R>(
    State(api): State<Arc<RubricApi<R>>>,
    headers: HeaderMap,
    Path(rubric_id): Path<String>,
) -> Response
where
    R: RubricRepository + 'static,
{
    let owner = match owner_from(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };
    match api.library.open_for_edit(&owner, &RubricId(rubric_id)) {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn update_handler<R>(
    State(api): State<Arc<RubricApi<R>>>,
    headers: HeaderMap,
    Path(rubric_id): Path<String>,
    Json(mut document): Json<RubricDocument>,
) -> Response
where
    R: RubricRepository + 'static,
{
    let owner = match owner_from(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };
    document.meta.id = Some(RubricId(rubric_id));
    match api.library.save(&owner, &document) {
        Ok(stored) => (StatusCode::OK, Json(stored)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn patch_handler<R>(
    State(api): State<Arc<RubricApi<R>>>,
    headers: HeaderMap,
    Path(rubric_id): Path<String>,
    Json(patch): Json<RubricPatch>,
) -> Response
where
    R: RubricRepository + 'static,
{
    let owner = match owner_from(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };
    match api.library.patch(&owner, &RubricId(rubric_id), patch) {
        Ok(stored) => (StatusCode::OK, Json(stored)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn delete_handler<R>(
    State(api): State<Arc<RubricApi<R>>>,
    headers: HeaderMap,
    Path(rubric_id): Path<String>,
) -> Response
where
    R: RubricRepository + 'static,
{
    let owner = match owner_from(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };
    match api.library.delete(&owner, &RubricId(rubric_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn duplicate_handler<R>(
    State(api): State<Arc<RubricApi<R>>>,
    headers: HeaderMap,
    Path(rubric_id): Path<String>,
) -> Response
where
    R: RubricRepository + 'static,
{
    let owner = match owner_from(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };
    match api.library.duplicate(&owner, &RubricId(rubric_id)) {
        Ok(copy) => (StatusCode::CREATED, Json(copy)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn share_handler<R>(
    State(api): State<Arc<RubricApi<R>>>,
    headers: HeaderMap,
    Path(rubric_id): Path<String>,
) -> Response
where
    R: RubricRepository + 'static,
{
    toggle_sharing(&api, &headers, rubric_id, true)
}

pub(crate) async fn unshare_handler<R>(
    State(api): State<Arc<RubricApi<R>>>,
    headers: HeaderMap,
    Path(rubric_id): Path<String>,
) -> Response
where
    R: RubricRepository + 'static,
{
    toggle_sharing(&api, &headers, rubric_id, false)
}

fn toggle_sharing<R>(api: &RubricApi<R>, headers: &HeaderMap, rubric_id: String, enabled: bool) -> Response
where
    R: RubricRepository + 'static,
{
    let owner = match owner_from(headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };
    match api.library.set_sharing(&owner, &RubricId(rubric_id), enabled) {
        Ok(token) => {
            let payload = json!({
                "isPublic": enabled,
                "shareId": token,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn shared_handler<R>(
    State(api): State<Arc<RubricApi<R>>>,
    Path(token): Path<String>,
) -> Response
where
    R: RubricRepository + 'static,
{
    match api.library.shared(&ShareToken(token)) {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExportQuery {
    format: Option<String>,
    mode: Option<String>,
}

impl ExportQuery {
    fn resolve(&self) -> Result<(ExportFormat, ExportMode), AppError> {
        let format = match self.format.as_deref() {
            None => ExportFormat::default(),
            Some(value) => value
                .parse::<ExportFormat>()
                .map_err(|err| AppError::InvalidRequest(err.to_string()))?,
        };
        let mode = match self.mode.as_deref() {
            None => ExportMode::default(),
            Some(value) => value
                .parse::<ExportMode>()
                .map_err(|err| AppError::InvalidRequest(err.to_string()))?,
        };
        Ok((format, mode))
    }
}

pub(crate) async fn shared_html_handler<R>(
    State(api): State<Arc<RubricApi<R>>>,
    Path(token): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Response
where
    R: RubricRepository + 'static,
{
    let (_, mode) = match query.resolve() {
        Ok(resolved) => resolved,
        Err(err) => return err.into_response(),
    };
    match api.library.shared(&ShareToken(token)) {
        Ok(document) => export_response(&document, ExportFormat::Html, mode),
        Err(err) => AppError::from(err).into_response(),
    }
}

/// Everything the review step shows next to the grid.
#[derive(Debug, Serialize)]
pub struct RubricAnalysis {
    pub quality: QualityReport,
    pub grid: GridProjection,
    pub weights: WeightSummary,
    pub issues: Vec<StructuralIssue>,
}

impl RubricAnalysis {
    pub fn of(document: &RubricDocument) -> Self {
        Self {
            quality: document.quality(),
            grid: document.project_grid(),
            weights: document.weight_summary(),
            issues: document.structural_issues(),
        }
    }
}

pub(crate) async fn analysis_handler(Json(document): Json<RubricDocument>) -> Response {
    (StatusCode::OK, Json(RubricAnalysis::of(&document))).into_response()
}

pub(crate) async fn export_handler(
    Query(query): Query<ExportQuery>,
    Json(document): Json<RubricDocument>,
) -> Response {
    match query.resolve() {
        Ok((format, mode)) => export_response(&document, format, mode),
        Err(err) => err.into_response(),
    }
}

fn export_response(document: &RubricDocument, format: ExportFormat, mode: ExportMode) -> Response {
    let body = match format {
        ExportFormat::Json => match to_json(document) {
            Ok(body) => body,
            Err(err) => return AppError::from(err).into_response(),
        },
        ExportFormat::Html => render_html(document, mode),
    };
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(document, format)
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IngestRequest {
    document: RubricDocument,
    file: IngestFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IngestFile {
    name: String,
    #[serde(default)]
    declared_type: String,
    /// Base64 payload.
    data: String,
}

pub(crate) async fn ingest_handler(Json(request): Json<IngestRequest>) -> Response {
    let file = match IncomingFile::from_base64(
        request.file.name,
        request.file.declared_type,
        &request.file.data,
    ) {
        Ok(file) => file,
        Err(err) => {
            return AppError::InvalidRequest(format!("file data is not valid base64: {err}"))
                .into_response()
        }
    };
    (StatusCode::OK, Json(request.document.ingest(&file))).into_response()
}

#[derive(Debug, Clone, Copy)]
enum SuggestionKind {
    Criteria,
    Levels,
}

pub(crate) async fn suggest_criteria_handler<R>(
    State(api): State<Arc<RubricApi<R>>>,
    Json(document): Json<RubricDocument>,
) -> Response
where
    R: RubricRepository + 'static,
{
    run_suggestion(&api, document, SuggestionKind::Criteria).await
}

pub(crate) async fn suggest_levels_handler<R>(
    State(api): State<Arc<RubricApi<R>>>,
    Json(document): Json<RubricDocument>,
) -> Response
where
    R: RubricRepository + 'static,
{
    run_suggestion(&api, document, SuggestionKind::Levels).await
}

/// Generation blocks on the network, so it runs on the blocking pool.
async fn run_suggestion<R>(
    api: &RubricApi<R>,
    document: RubricDocument,
    kind: SuggestionKind,
) -> Response
where
    R: RubricRepository + 'static,
{
    let Some(assistant) = api.assistant.clone() else {
        return AppError::from(GenerationError::Unconfigured).into_response();
    };

    let outcome = tokio::task::spawn_blocking(move || match kind {
        SuggestionKind::Criteria => assistant.generate_criteria(&document),
        SuggestionKind::Levels => assistant.generate_levels(&document),
    })
    .await;

    match outcome {
        Ok(Ok(updated)) => (StatusCode::OK, Json(updated)).into_response(),
        Ok(Err(err)) => AppError::from(err).into_response(),
        Err(join) => AppError::Internal(join.to_string()).into_response(),
    }
}
