//! LLM Provider Clients and Abstractions
//!
//! The generator side of the service. Everything else works against the
//! [`LLMClient`] trait; [`Provider`] builds the concrete client from config.
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server (default)
//!
//! # Example
//!
//! ```ignore
//! use askrag::llm::Provider;
//!
//! let client = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3".to_string(),
//! }
//! .create_client()?;
//!
//! let answer = client.generate("What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use client::{LLMClient, Provider, generate_with_optional_system};
