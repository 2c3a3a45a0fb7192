use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    Json,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::rubric::domain::RubricDocument;
use crate::rubric::library::{InMemoryRubricRepository, RubricLibraryService};
use crate::rubric::router::{
    create_handler, get_handler, rubric_router, RubricApi, OWNER_HEADER,
};
use crate::rubric::suggest::SuggestionService;

fn api() -> Arc<RubricApi<InMemoryRubricRepository>> {
    let repository = Arc::new(InMemoryRubricRepository::new());
    Arc::new(RubricApi::new(RubricLibraryService::new(repository), None))
}

fn owner_headers(owner: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(OWNER_HEADER, HeaderValue::from_str(owner).expect("valid header"));
    headers
}

fn json_request(method: &str, uri: &str, owner: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(owner) = owner {
        builder = builder.header(OWNER_HEADER, owner);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn empty_request(method: &str, uri: &str, owner: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(owner) = owner {
        builder = builder.header(OWNER_HEADER, owner);
    }
    builder.body(Body::empty()).expect("request builds")
}

fn document_json(document: &RubricDocument) -> Value {
    serde_json::to_value(document).expect("document serializes")
}

#[tokio::test]
async fn create_requires_owner_header() {
    let response = create_handler(State(api()), HeaderMap::new(), Json(analytic_document())).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json_body(response).await;
    assert_eq!(body["retryable"], Value::Bool(false));
}

#[tokio::test]
async fn create_then_get_returns_stored_document() {
    let api = api();
    let created = create_handler(
        State(api.clone()),
        owner_headers("prof-hopper"),
        Json(analytic_document()),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = read_json_body(created).await;
    let id = body["id"].as_str().expect("id assigned").to_string();
    assert_eq!(body["userId"], "prof-hopper");
    assert_eq!(body["isPublic"], false);

    let fetched = get_handler(
        State(api.clone()),
        owner_headers("prof-hopper"),
        Path(id.clone()),
    )
    .await;
    assert_eq!(fetched.status(), StatusCode::OK);
    let fetched = read_json_body(fetched).await;
    assert_eq!(fetched["topic"], "Research Essay");
    assert_eq!(fetched["criteria"].as_array().map(Vec::len), Some(3));

    let foreign = get_handler(State(api.clone()), owner_headers("prof-lovelace"), Path(id)).await;
    assert_eq!(foreign.status(), StatusCode::FORBIDDEN);

    let missing = get_handler(
        State(api),
        owner_headers("prof-hopper"),
        Path("no-such-rubric".to_string()),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_applies_query_filters() {
    let repository = Arc::new(InMemoryRubricRepository::new());
    let app = rubric_router(Arc::new(RubricApi::new(
        RubricLibraryService::new(repository.clone()),
        None,
    )));

    for document in [analytic_document(), holistic_document()] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/rubrics",
                Some("prof-hopper"),
                document_json(&document),
            ))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    assert_eq!(repository.len(), 2);

    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            "/api/v1/rubrics?rubric_type=holistic&sort_by=topic&order=asc",
            Some("prof-hopper"),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let summaries = read_json_body(response).await;
    let summaries = summaries.as_array().expect("array of summaries");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["topic"], "Lab Report");

    let bad = app
        .oneshot(empty_request(
            "GET",
            "/api/v1/rubrics?order=sideways",
            Some("prof-hopper"),
        ))
        .await
        .expect("router responds");
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_and_delete_round_trip() {
    let repository = Arc::new(InMemoryRubricRepository::new());
    let app = router_with(repository.clone(), None);

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/rubrics",
            Some("prof-hopper"),
            document_json(&analytic_document()),
        ))
        .await
        .expect("router responds");
    let id = read_json_body(created).await["id"]
        .as_str()
        .expect("id assigned")
        .to_string();

    let patched = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/rubrics/{id}"),
            Some("prof-hopper"),
            json!({ "topic": "Policy Memo" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(patched.status(), StatusCode::OK);
    let patched = read_json_body(patched).await;
    assert_eq!(patched["topic"], "Policy Memo");
    assert_eq!(patched["courseName"], "HIST 210");

    let deleted = app
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/v1/rubrics/{id}"),
            Some("prof-hopper"),
        ))
        .await
        .expect("router responds");
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert!(repository.is_empty());
}

#[tokio::test]
async fn shared_rubric_is_public_until_unshared() {
    let repository = Arc::new(InMemoryRubricRepository::new());
    let app = router_with(repository, None);

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/rubrics",
            Some("prof-hopper"),
            document_json(&analytic_document()),
        ))
        .await
        .expect("router responds");
    let id = read_json_body(created).await["id"]
        .as_str()
        .expect("id assigned")
        .to_string();

    let shared = app
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/rubrics/{id}/share"),
            Some("prof-hopper"),
        ))
        .await
        .expect("router responds");
    assert_eq!(shared.status(), StatusCode::OK);
    let shared = read_json_body(shared).await;
    assert_eq!(shared["isPublic"], true);
    let token = shared["shareId"].as_str().expect("token issued").to_string();

    let public = app
        .clone()
        .oneshot(empty_request("GET", &format!("/api/v1/shared/{token}"), None))
        .await
        .expect("router responds");
    assert_eq!(public.status(), StatusCode::OK);
    assert_eq!(read_json_body(public).await["topic"], "Research Essay");

    let html = app
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/api/v1/shared/{token}/html?mode=student"),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(html.status(), StatusCode::OK);
    let page = read_text_body(html).await;
    assert!(page.contains("Student Instructions"));
    assert!(!page.contains("Grader Instructions"));

    let copied = app
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/rubrics/{id}/duplicate"),
            Some("prof-lovelace"),
        ))
        .await
        .expect("router responds");
    assert_eq!(copied.status(), StatusCode::CREATED);
    assert_eq!(read_json_body(copied).await["userId"], "prof-lovelace");

    let unshared = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/v1/rubrics/{id}/share"),
            Some("prof-hopper"),
        ))
        .await
        .expect("router responds");
    assert_eq!(read_json_body(unshared).await["isPublic"], false);

    let gone = app
        .oneshot(empty_request("GET", &format!("/api/v1/shared/{token}"), None))
        .await
        .expect("router responds");
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_sets_download_headers() {
    let app = router_with(Arc::new(InMemoryRubricRepository::new()), None);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/rubrics/export?format=html&mode=grader",
            None,
            document_json(&analytic_document()),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Research_Essay_rubric.html\""
    );
    let page = read_text_body(response).await;
    assert!(page.contains("Grader Instructions"));
    assert!(!page.contains("Student Instructions"));

    let json_export = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/rubrics/export",
            None,
            document_json(&analytic_document()),
        ))
        .await
        .expect("router responds");
    assert_eq!(
        json_export.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(read_json_body(json_export).await["courseName"], "HIST 210");

    let unknown = app
        .oneshot(json_request(
            "POST",
            "/api/v1/rubrics/export?format=xlsx",
            None,
            document_json(&analytic_document()),
        ))
        .await
        .expect("router responds");
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_headers_survive_unusual_topics() {
    let app = router_with(Arc::new(InMemoryRubricRepository::new()), None);

    let quoted = analytic_document().with_context("Essay on \"Hamlet\"", "ENG 200");
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/rubrics/export",
            None,
            document_json(&quoted),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Essay_on_Hamlet_rubric.json\""
    );

    let control = analytic_document().with_context("Essay\u{1}Draft", "ENG 200");
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/rubrics/export?format=html",
            None,
            document_json(&control),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Essay_Draft_rubric.html\""
    );
}

#[tokio::test]
async fn analysis_reports_quality_grid_and_weights() {
    let app = router_with(Arc::new(InMemoryRubricRepository::new()), None);
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/rubrics/analysis",
            None,
            document_json(&analytic_document()),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    assert_eq!(body["quality"]["score"], 100);
    assert_eq!(body["grid"]["layout"], "standard");
    assert_eq!(body["grid"]["rows"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["weights"]["balanced"], true);
    assert_eq!(body["issues"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn ingest_merges_text_and_rejects_bad_base64() {
    let app = router_with(Arc::new(InMemoryRubricRepository::new()), None);

    let payload = json!({
        "document": document_json(&RubricDocument::new()),
        "file": {
            "name": "notes.md",
            "declaredType": "",
            "data": STANDARD.encode("Focus on primary sources."),
        }
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/rubrics/ingest", None, payload))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json_body(response).await["contextMaterial"],
        "Focus on primary sources."
    );

    let broken = json!({
        "document": document_json(&RubricDocument::new()),
        "file": { "name": "notes.md", "data": "%%%" }
    });
    let response = app
        .oneshot(json_request("POST", "/api/v1/rubrics/ingest", None, broken))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn suggestions_need_a_configured_backend() {
    let app = router_with(Arc::new(InMemoryRubricRepository::new()), None);
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/suggestions/criteria",
            None,
            document_json(&analytic_document()),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(read_json_body(response).await["retryable"], false);
}

#[tokio::test]
async fn suggestions_replace_criteria() {
    let scripted: Arc<dyn SuggestionService> = Arc::new(ScriptedSuggestions {
        criteria: vec![
            suggested_criterion("Argument"),
            suggested_criterion("Sources"),
        ],
        ..ScriptedSuggestions::default()
    });
    let app = router_with(Arc::new(InMemoryRubricRepository::new()), Some(scripted));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/suggestions/criteria",
            None,
            document_json(&analytic_document()),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let criteria = body["criteria"].as_array().expect("criteria array");
    assert_eq!(criteria.len(), 2);
    assert_eq!(criteria[0]["title"], "Argument");
    assert_eq!(criteria[0]["weight"], 50.0);
    assert_eq!(body["rows"].as_array().map(Vec::len), Some(0));

    let no_criteria = analytic_document().with_criteria(Vec::new());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/suggestions/levels",
            None,
            document_json(&no_criteria),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn failing_backend_is_bad_gateway() {
    let failing: Arc<dyn SuggestionService> = Arc::new(FailingSuggestions);
    let app = router_with(Arc::new(InMemoryRubricRepository::new()), Some(failing));
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/suggestions/levels",
            None,
            document_json(&analytic_document()),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(read_json_body(response).await["retryable"], true);
}

#[tokio::test]
async fn store_outage_maps_to_service_unavailable() {
    let api = Arc::new(RubricApi::new(
        RubricLibraryService::new(Arc::new(UnavailableRepository)),
        None,
    ));
    let app = rubric_router(api);
    let response = app
        .oneshot(empty_request("GET", "/api/v1/rubrics", Some("prof-hopper")))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(read_json_body(response).await["retryable"], true);
}
