use std::sync::Arc;
use std::time::Instant;

use crate::llm::{LLMClient, generate_with_optional_system};
use crate::rag::knowledge::KnowledgeStore;
use crate::rag::prompt;
use crate::rag::search::{RetrievalResult, Retriever, SearchStrategy};
use crate::types::{AppError, Result};

/// Outcome of one RAG request
#[derive(Debug, Clone)]
pub struct RagAnswer {
    /// Generated text
    pub response: String,
    /// What was retrieved; `retrieval.context` is what the model saw
    pub retrieval: RetrievalResult,
    /// The composed prompt sent to the generator
    pub prompt: String,
}

/// Retriever → PromptComposer → Generator, over one knowledge store.
///
/// Cheap to build: every field is shared, so callers make one per request
/// from the current configuration.
#[derive(Clone)]
pub struct RagPipeline {
    knowledge: Arc<KnowledgeStore>,
    retriever: Retriever,
    llm: Arc<dyn LLMClient>,
    system_prompt: Option<String>,
    fallback_to_keyword: bool,
}

impl RagPipeline {
    pub fn new(knowledge: Arc<KnowledgeStore>, retriever: Retriever, llm: Arc<dyn LLMClient>) -> Self {
        Self {
            knowledge,
            retriever,
            llm,
            system_prompt: None,
            fallback_to_keyword: false,
        }
    }

    /// System instruction placed before the composed prompt
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt;
        self
    }

    /// Retry with keyword matching when the embedding service is down
    pub fn with_keyword_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_keyword = enabled;
        self
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Load the corpus (first call only) and select chunks for `query`.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalResult> {
        let chunks = self.knowledge.chunks().await?;

        match self.retriever.retrieve(query, &chunks).await {
            Err(AppError::RetrievalUnavailable(detail))
                if self.fallback_to_keyword
                    && self.retriever.strategy() == SearchStrategy::Similarity =>
            {
                tracing::warn!(
                    error = %detail,
                    "Embedding service unavailable, falling back to keyword retrieval"
                );
                Retriever::keyword().retrieve(query, &chunks).await
            }
            other => other,
        }
    }

    /// Answer `query` from the knowledge base.
    pub async fn answer(&self, query: &str) -> Result<RagAnswer> {
        let start = Instant::now();

        let retrieval = self.retrieve(query).await?;
        let composed = prompt::compose(query, &retrieval.context);

        let response =
            generate_with_optional_system(self.llm.as_ref(), self.system_prompt.as_deref(), &composed)
                .await?;

        tracing::info!(
            strategy = %self.retriever.strategy(),
            chunks_used = retrieval.chunks.len(),
            model = self.llm.model_name(),
            duration_ms = start.elapsed().as_millis() as u64,
            "RAG answer generated"
        );

        Ok(RagAnswer {
            response,
            retrieval,
            prompt: composed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::embeddings::EmbeddingClient;
    use crate::rag::knowledge::split_chunks;
    use crate::rag::prompt::FALLBACK_INSTRUCTION;
    use crate::rag::search::NO_RELEVANT_INFORMATION;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Records every prompt it receives and echoes a canned answer.
    #[derive(Default)]
    struct RecordingLlm {
        calls: Mutex<Vec<(Option<String>, String)>>,
    }

    #[async_trait]
    impl LLMClient for RecordingLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.lock().push((None, prompt.to_string()));
            Ok("answer".to_string())
        }

        async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
            self.calls
                .lock()
                .push((Some(system.to_string()), prompt.to_string()));
            Ok("answer".to_string())
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    struct DownEmbedder;

    #[async_trait]
    impl EmbeddingClient for DownEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(AppError::RetrievalUnavailable("connection refused".to_string()))
        }

        fn model_name(&self) -> &str {
            "down"
        }
    }

    fn store() -> Arc<KnowledgeStore> {
        Arc::new(KnowledgeStore::from_chunks(
            "policies.txt",
            split_chunks("Vacation policy: 20 days.\n\nRemote work: allowed 2 days/week."),
        ))
    }

    #[tokio::test]
    async fn test_answer_composes_prompt_from_retrieved_context() {
        let llm = Arc::new(RecordingLlm::default());
        let pipeline = RagPipeline::new(store(), Retriever::keyword(), llm.clone());

        let answer = pipeline.answer("remote work").await.unwrap();

        assert_eq!(answer.response, "answer");
        assert_eq!(answer.retrieval.context, "Remote work: allowed 2 days/week.");

        let calls = llm.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, None);
        assert_eq!(calls[0].1, answer.prompt);
        assert!(answer.prompt.contains("Remote work: allowed 2 days/week."));
        assert!(!answer.prompt.contains("Vacation"));
    }

    #[tokio::test]
    async fn test_answer_with_no_match_still_instructs_fallback() {
        let llm = Arc::new(RecordingLlm::default());
        let pipeline = RagPipeline::new(store(), Retriever::keyword(), llm);

        let answer = pipeline.answer("parking").await.unwrap();

        assert_eq!(answer.retrieval.context, NO_RELEVANT_INFORMATION);
        assert!(answer.prompt.contains(FALLBACK_INSTRUCTION));
    }

    #[tokio::test]
    async fn test_system_prompt_is_forwarded() {
        let llm = Arc::new(RecordingLlm::default());
        let pipeline = RagPipeline::new(store(), Retriever::keyword(), llm.clone())
            .with_system_prompt(Some("You are an HR assistant.".to_string()));

        pipeline.answer("vacation").await.unwrap();

        let calls = llm.calls.lock();
        assert_eq!(calls[0].0.as_deref(), Some("You are an HR assistant."));
    }

    #[tokio::test]
    async fn test_embedding_outage_is_surfaced_by_default() {
        let llm = Arc::new(RecordingLlm::default());
        let retriever = Retriever::similarity(Arc::new(DownEmbedder), 0.6);
        let pipeline = RagPipeline::new(store(), retriever, llm.clone());

        let err = pipeline.answer("remote").await.unwrap_err();
        assert!(matches!(err, AppError::RetrievalUnavailable(_)));
        assert!(llm.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_embedding_outage_falls_back_when_enabled() {
        let llm = Arc::new(RecordingLlm::default());
        let retriever = Retriever::similarity(Arc::new(DownEmbedder), 0.6);
        let pipeline =
            RagPipeline::new(store(), retriever, llm).with_keyword_fallback(true);

        let retrieval = pipeline.retrieve("remote").await.unwrap();
        assert_eq!(retrieval.context, "Remote work: allowed 2 days/week.");
    }

    #[tokio::test]
    async fn test_missing_corpus_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let knowledge = Arc::new(KnowledgeStore::new(dir.path().join("missing.txt")));
        let llm = Arc::new(RecordingLlm::default());
        let pipeline = RagPipeline::new(knowledge, Retriever::keyword(), llm);

        let err = pipeline.answer("anything").await.unwrap_err();
        assert!(matches!(err, AppError::KnowledgeBaseNotFound(_)));
    }
}
