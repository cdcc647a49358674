use crate::{
    AppState,
    llm::generate_with_optional_system,
    types::{AskResponse, PromptRequest, RagAskResponse, Result},
};
use axum::{Json, extract::State};
use std::time::Instant;

/// Ask the LLM directly, without retrieval
#[utoipa::path(
    post,
    path = "/ask",
    request_body = PromptRequest,
    responses(
        (status = 200, description = "Generated answer", body = AskResponse),
        (status = 500, description = "The LLM could not be reached")
    ),
    tag = "ask"
)]
pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<PromptRequest>,
) -> Result<Json<AskResponse>> {
    let start = Instant::now();
    tracing::info!(prompt_len = payload.prompt.len(), "Received prompt for /ask");

    let config = state.config_manager.config();
    let response = generate_with_optional_system(
        state.llm.as_ref(),
        Some(config.llm.system_prompt.as_str()),
        &payload.prompt,
    )
    .await?;

    tracing::info!(
        model = state.llm.model_name(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Answered /ask"
    );

    Ok(Json(AskResponse {
        prompt: payload.prompt,
        response,
    }))
}

/// Answer from the knowledge base (retrieval-augmented generation)
#[utoipa::path(
    post,
    path = "/ask_rag",
    request_body = PromptRequest,
    responses(
        (status = 200, description = "Answer with the context that was used", body = RagAskResponse),
        (status = 500, description = "Knowledge base missing, or the embedding service or LLM could not be reached")
    ),
    tag = "ask"
)]
pub async fn ask_rag(
    State(state): State<AppState>,
    Json(payload): Json<PromptRequest>,
) -> Result<Json<RagAskResponse>> {
    tracing::info!(prompt_len = payload.prompt.len(), "Received prompt for /ask_rag");

    let answer = state.rag_pipeline().answer(&payload.prompt).await?;

    Ok(Json(RagAskResponse {
        prompt: payload.prompt,
        response: answer.response,
        context_used: answer.retrieval.context,
    }))
}
