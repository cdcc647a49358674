//! Mock implementations for testing.
//!
//! Mock LLM and embedding clients shared by the integration tests, so no
//! test needs a running Ollama server.

use askrag::llm::LLMClient;
use askrag::rag::embeddings::EmbeddingClient;
use askrag::types::{AppError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Mock LLM client with a canned response.
///
/// Every prompt it receives is recorded, together with the system
/// instruction if there was one, so tests can assert on what the pipeline
/// actually sent.
///
/// # Examples
///
/// ```ignore
/// let client = MockLLMClient::new("Hello, world!");
/// let client = MockLLMClient::failing();
/// ```
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// One call made to [`MockLLMClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub system: Option<String>,
    pub prompt: String,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    fn respond(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        self.calls.lock().push(RecordedCall {
            system: system.map(str::to_string),
            prompt: prompt.to_string(),
        });

        if self.should_fail {
            return Err(AppError::Generation(
                "Mock LLM failure: connection refused".to_string(),
            ));
        }
        Ok(self.response.clone())
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.respond(None, prompt)
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.respond(Some(system), prompt)
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Mock embedding client backed by a lookup table.
///
/// Texts missing from the table embed to a zero vector of the same
/// dimension, which never clears a positive threshold.
#[derive(Clone, Default)]
pub struct MockEmbedder {
    table: HashMap<String, Vec<f32>>,
    dimension: usize,
    should_fail: bool,
}

impl MockEmbedder {
    pub fn new(entries: &[(&str, Vec<f32>)]) -> Self {
        let dimension = entries.first().map(|(_, v)| v.len()).unwrap_or(0);
        Self {
            table: entries
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.clone()))
                .collect(),
            dimension,
            should_fail: false,
        }
    }

    /// An embedder whose service is always unreachable
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl EmbeddingClient for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.should_fail {
            return Err(AppError::RetrievalUnavailable(
                "Mock embedding failure: connection refused".to_string(),
            ));
        }
        Ok(self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![0.0; self.dimension]))
    }

    fn model_name(&self) -> &str {
        "mock-embedder"
    }
}
