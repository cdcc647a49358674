//! LLM client abstraction and provider selection
//!
//! The rest of the crate only talks to [`LLMClient`]. Concrete clients are
//! built once at startup from a [`Provider`] and handed to whoever needs them,
//! so tests can pass a double instead.

use crate::types::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Generic LLM client trait for provider abstraction
///
/// This is the generator boundary of the RAG pipeline: it receives a finished
/// prompt and returns generated text.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a single user message
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with a system instruction preceding the user message
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Send `prompt` with `system` when one is given, bare otherwise.
pub async fn generate_with_optional_system(
    client: &dyn LLMClient,
    system: Option<&str>,
    prompt: &str,
) -> Result<String> {
    match system {
        Some(system) if !system.trim().is_empty() => {
            client.generate_with_system(system, prompt).await
        }
        _ => client.generate(prompt).await,
    }
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama3".to_string(),
    /// };
    /// ```
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider was compiled out or the base URL
    /// cannot be parsed.
    pub fn create_client(&self) -> Result<Arc<dyn LLMClient>> {
        match self {
            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Arc::new(
                super::ollama::OllamaClient::new(base_url, model.clone())?,
            )),

            #[cfg(not(feature = "ollama"))]
            Provider::Ollama { model, .. } => Err(crate::types::AppError::Configuration(format!(
                "Ollama support is not compiled in (requested model '{}'). \
                 Rebuild with `--features ollama`.",
                model
            ))),
        }
    }

    /// Check if this provider is available in the current build
    pub fn is_implemented(&self) -> bool {
        match self {
            Provider::Ollama { .. } => cfg!(feature = "ollama"),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// The model this provider was configured with
    pub fn model(&self) -> &str {
        match self {
            Provider::Ollama { model, .. } => model,
        }
    }
}
