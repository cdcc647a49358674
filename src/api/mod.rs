//! HTTP API Handlers and Routes
//!
//! Built on the Axum web framework.
//!
//! # API Endpoints
//!
//! - `GET /` - Liveness message
//! - `GET /health` - Plain-text health check
//! - `POST /ask` - `{prompt}` → `{prompt, response}`
//! - `POST /ask_rag` - `{prompt}` → `{prompt, response, context_used}`
//!
//! Failures return `{"error": "<fixed message>"}`; internal detail is logged
//! only. There is no authentication.
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

use utoipa::OpenApi;

/// Request handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

pub use routes::create_router;

/// OpenAPI description of the HTTP surface
#[derive(OpenApi)]
#[openapi(
    paths(handlers::health::root, handlers::ask::ask, handlers::ask::ask_rag),
    components(schemas(
        crate::types::PromptRequest,
        crate::types::AskResponse,
        crate::types::RagAskResponse,
        crate::types::WelcomeResponse
    )),
    tags(
        (name = "ask", description = "Question answering"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_endpoints() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/ask"));
        assert!(paths.iter().any(|p| p.as_str() == "/ask_rag"));
        assert!(paths.iter().any(|p| p.as_str() == "/"));
    }
}
