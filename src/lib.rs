//! # askrag
//!
//! A small question-answering server in front of a locally hosted LLM
//! (Ollama), with a naive retrieval-augmented generation endpoint over a
//! flat text knowledge base.
//!
//! ## Overview
//!
//! askrag can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `askrag-server` binary
//! 2. **As a library** - Use the RAG pipeline in your own Rust project
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use askrag::llm::Provider;
//! use askrag::rag::{KnowledgeStore, RagPipeline, Retriever};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let llm = Provider::Ollama {
//!         base_url: "http://localhost:11434".to_string(),
//!         model: "llama3".to_string(),
//!     }
//!     .create_client()?;
//!
//!     let store = Arc::new(KnowledgeStore::new("knowledge_base.txt"));
//!     let pipeline = RagPipeline::new(store, Retriever::keyword(), llm);
//!
//!     let answer = pipeline.answer("What is the remote work policy?").await?;
//!     println!("{}", answer.response);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `swagger-ui` | Interactive API docs at `/swagger-ui` |
//!
//! ## Modules
//!
//! - [`api`] - HTTP handlers and routes
//! - [`cli`] - Command-line interface
//! - [`llm`] - LLM client abstraction and Ollama client
//! - [`rag`] - Knowledge store, retrieval, prompt composition
//! - [`types`] - Request/response types and error handling
//! - [`utils`] - Configuration and logging

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration and logging utilities.
pub mod utils;

// Re-export commonly used types
pub use llm::{LLMClient, Provider};
pub use rag::{KnowledgeStore, RagPipeline, Retriever, SearchStrategy};
pub use types::{AppError, Result};
pub use utils::toml_config::{AskragConfig, AskragConfigManager};

use crate::rag::embeddings::{EmbeddingClient, OllamaEmbedder};
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<AskragConfigManager>,
    /// Knowledge base, loaded on first use and read-only afterwards
    pub knowledge: Arc<KnowledgeStore>,
    /// Generator
    pub llm: Arc<dyn LLMClient>,
    /// Embedding client for the similarity strategy
    pub embedder: Option<Arc<dyn EmbeddingClient>>,
}

impl AppState {
    /// Build the clients described by the current configuration.
    pub fn from_config(config_manager: Arc<AskragConfigManager>) -> Result<Self> {
        let config = config_manager.config();

        let llm = Provider::Ollama {
            base_url: config.llm.base_url.clone(),
            model: config.llm.model.clone(),
        }
        .create_client()?;

        let embedder: Arc<dyn EmbeddingClient> = Arc::new(OllamaEmbedder::new(
            config.rag.embedding_url(&config.llm),
            config.rag.embedding_model.clone(),
            Duration::from_secs(config.rag.embedding_timeout_secs),
        )?);

        let knowledge = Arc::new(KnowledgeStore::new(config.rag.knowledge_base.clone()));

        Ok(Self {
            config_manager,
            knowledge,
            llm,
            embedder: Some(embedder),
        })
    }

    /// A pipeline reflecting the configuration as it is right now.
    ///
    /// The knowledge base path is fixed at startup; strategy, threshold,
    /// system prompt and fallback follow hot reloads.
    pub fn rag_pipeline(&self) -> RagPipeline {
        let config = self.config_manager.config();
        let retriever = Retriever::new(
            config.rag.strategy,
            config.rag.similarity_threshold,
            self.embedder.clone(),
        );

        RagPipeline::new(self.knowledge.clone(), retriever, self.llm.clone())
            .with_system_prompt(config.rag.system_prompt.clone())
            .with_keyword_fallback(config.rag.fallback_to_keyword)
    }
}
