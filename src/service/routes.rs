//! Axum routes for the snippet service.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::classifier::ErrorEnvelope;
use crate::error::SnippetError;
use crate::gateway::CompletionClient;
use crate::store::SnippetStore;
use crate::types::{format_timestamp, SnippetList, SnippetResponse};
use crate::validation::{parse_create_request, validate_snippet_id};

use super::middleware::with_security_headers;
use super::openapi::{openapi_document, API_DOCS_PATH};
use super::state::ServiceState;

// ============================================================================
// Response Types
// ============================================================================

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"OK"`.
    pub status: String,
    /// Time of the check.
    pub timestamp: String,
}

/// Readiness response with dependency status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the store answered.
    pub ready: bool,
    /// Failure detail when not ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Resolve the raw body extraction.
///
/// A non-JSON content type is read as an empty object, so the schema check
/// reports the missing field. Any other rejection is a malformed body.
fn request_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ErrorEnvelope> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(Value::Object(Map::new())),
        Err(rejection) => Err(malformed_body(rejection)),
    }
}

/// Envelope for a body that never became a typed request.
///
/// Handled here, before the classifier chain, because no typed failure
/// exists yet at this layer.
fn malformed_body(rejection: JsonRejection) -> ErrorEnvelope {
    let error = SnippetError::MalformedRequest(rejection.body_text());
    tracing::warn!(
        kind = error.kind(),
        error = %error,
        status = 400u16,
        "Request body rejected"
    );
    ErrorEnvelope::malformed_request()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Create a snippet and its summary.
async fn create_snippet_handler<S, C>(
    State(state): State<Arc<ServiceState<S, C>>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorEnvelope>
where
    S: SnippetStore + 'static,
    C: CompletionClient + 'static,
{
    let body = request_body(body)?;
    let classify = |e: SnippetError| state.classifier.classify(&e);

    let request = parse_create_request(&body).map_err(classify)?;
    let snippet = state.snippets.create(&request.text).await.map_err(classify)?;

    let location = format!("/snippets/{}", snippet.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(snippet),
    ))
}

/// Fetch one snippet by id.
async fn get_snippet_handler<S, C>(
    State(state): State<Arc<ServiceState<S, C>>>,
    Path(id): Path<String>,
) -> Result<Json<SnippetResponse>, ErrorEnvelope>
where
    S: SnippetStore + 'static,
    C: CompletionClient + 'static,
{
    let classify = |e: SnippetError| state.classifier.classify(&e);

    validate_snippet_id(&id).map_err(classify)?;
    let snippet = state.snippets.get_by_id(&id).await.map_err(classify)?;
    Ok(Json(snippet))
}

/// List all snippets, newest first.
async fn list_snippets_handler<S, C>(
    State(state): State<Arc<ServiceState<S, C>>>,
) -> Result<Json<SnippetList>, ErrorEnvelope>
where
    S: SnippetStore + 'static,
    C: CompletionClient + 'static,
{
    state
        .snippets
        .list_all()
        .await
        .map(Json)
        .map_err(|e| state.classifier.classify(&e))
}

/// Health check endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: format_timestamp(&chrono::Utc::now()),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 if the store answers, 503 otherwise.
async fn readiness_handler<S, C>(
    State(state): State<Arc<ServiceState<S, C>>>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)>
where
    S: SnippetStore + 'static,
    C: CompletionClient + 'static,
{
    if state.snippets.store().is_healthy().await {
        Ok(Json(ReadinessResponse {
            ready: true,
            details: None,
        }))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                ready: false,
                details: Some("Store connection failed".to_string()),
            }),
        ))
    }
}

/// OpenAPI document for the API.
async fn api_docs_handler() -> Json<Value> {
    Json(openapi_document())
}

/// Any path no route matches.
async fn route_not_found_handler(method: Method, uri: Uri) -> ErrorEnvelope {
    ErrorEnvelope::route_not_found(method.as_str(), uri.path())
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the snippet service.
///
/// Every response carries the baseline security headers.
pub fn create_router<S, C>(state: ServiceState<S, C>) -> Router
where
    S: SnippetStore + 'static,
    C: CompletionClient + 'static,
{
    let state = Arc::new(state);

    let router = Router::new()
        .route(
            "/snippets",
            get(list_snippets_handler::<S, C>).post(create_snippet_handler::<S, C>),
        )
        .route("/snippets/:id", get(get_snippet_handler::<S, C>))
        .route("/health", get(health_handler))
        .route("/health/ready", get(readiness_handler::<S, C>))
        .route(API_DOCS_PATH, get(api_docs_handler))
        .fallback(route_not_found_handler)
        .with_state(state);

    with_security_headers(router)
}
