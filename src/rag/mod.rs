//! Retrieval Augmented Generation (RAG) Pipeline
//!
//! A deliberately small pipeline over a flat text knowledge base.
//!
//! # Module Structure
//!
//! - [`rag::knowledge`](crate::rag::knowledge) - Corpus loading and chunking
//! - [`rag::embeddings`](crate::rag::embeddings) - Embedding client (Ollama)
//! - [`rag::search`](crate::rag::search) - Keyword and similarity retrieval
//! - [`rag::prompt`](crate::rag::prompt) - Final prompt template
//! - [`rag::pipeline`](crate::rag::pipeline) - Retrieve, compose, generate
//!
//! # RAG Pipeline
//!
//! 1. **Load** - The corpus file is split on blank lines, once
//! 2. **Retrieval** - Chunks matching the query are selected, in corpus order
//! 3. **Composition** - Selected chunks become the context of a fixed template
//! 4. **Generation** - The LLM answers from that prompt
//!
//! # Example
//!
//! ```ignore
//! use askrag::rag::{knowledge::KnowledgeStore, pipeline::RagPipeline, search::Retriever};
//!
//! let store = Arc::new(KnowledgeStore::new("knowledge_base.txt"));
//! let pipeline = RagPipeline::new(store, Retriever::keyword(), llm);
//! let answer = pipeline.answer("How many vacation days do I get?").await?;
//! println!("{}", answer.response);
//! ```

pub mod embeddings;
pub mod knowledge;
pub mod pipeline;
pub mod prompt;
pub mod search;

pub use knowledge::KnowledgeStore;
pub use pipeline::{RagAnswer, RagPipeline};
pub use search::{NO_RELEVANT_INFORMATION, RetrievalResult, Retriever, SearchStrategy};
