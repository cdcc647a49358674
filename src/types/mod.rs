use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

// ============= API Request/Response Types =============

/// Body accepted by `/ask` and `/ask_rag`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromptRequest {
    pub prompt: String,
}

/// Response of `/ask`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AskResponse {
    pub prompt: String,
    pub response: String,
}

/// Response of `/ask_rag`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RagAskResponse {
    pub prompt: String,
    pub response: String,
    /// The context block that was actually handed to the model
    pub context_used: String,
}

/// Liveness message returned by `GET /`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
}

// ============= RAG Types =============

/// One delimiter-separated unit of the knowledge corpus.
///
/// Chunks are created once when the corpus is loaded and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the source corpus, starting at 0
    pub index: usize,
    /// Raw chunk text, untouched
    pub text: String,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Knowledge base file not found: {}", .0.display())]
    KnowledgeBaseNotFound(PathBuf),

    #[error("Embedding service unavailable: {0}")]
    RetrievalUnavailable(String),

    #[error("LLM error: {0}")]
    Generation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Fixed client-facing messages. Internal detail only goes to the log.
pub const KNOWLEDGE_BASE_NOT_FOUND_MESSAGE: &str = "Knowledge base file not found.";
pub const RETRIEVAL_UNAVAILABLE_MESSAGE: &str =
    "Internal Server Error: Could not reach the embedding service.";
pub const GENERATION_FAILED_MESSAGE: &str = "Internal Server Error: Could not connect to the LLM.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message) = match &self {
            AppError::KnowledgeBaseNotFound(path) => {
                tracing::error!(path = %path.display(), "Knowledge base file is missing");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    KNOWLEDGE_BASE_NOT_FOUND_MESSAGE.to_string(),
                )
            }
            AppError::RetrievalUnavailable(detail) => {
                tracing::error!(error = %detail, "Error calling the embedding service");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RETRIEVAL_UNAVAILABLE_MESSAGE.to_string(),
                )
            }
            AppError::Generation(detail) => {
                tracing::error!(error = %detail, "Error calling the LLM");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERATION_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Configuration(detail) | AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
