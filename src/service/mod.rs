//! Snippet REST Service
//!
//! Exposes snippet creation and retrieval as a JSON API.
//!
//! ## Endpoints
//!
//! - `POST /snippets` - Summarize and store a snippet (201 + `Location`)
//! - `GET /snippets/:id` - Fetch one snippet
//! - `GET /snippets` - List all snippets, newest first
//! - `GET /health` - Liveness check
//! - `GET /health/ready` - Readiness probe (store reachability)
//! - `GET /api-docs` - OpenAPI 3.0 document
//!
//! Every failure is answered with the classifier's
//! `{error, message, statusCode, timestamp}` envelope.

pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use middleware::{
    normalize_path, request_logging_middleware, with_security_headers, REQUEST_ID_HEADER,
    SECURITY_HEADERS,
};
pub use openapi::{openapi_document, API_DOCS_PATH};
pub use routes::{create_router, HealthResponse, ReadinessResponse};
pub use state::ServiceState;
