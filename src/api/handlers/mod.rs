//! API request handlers.

/// `/ask` and `/ask_rag`.
pub mod ask;
/// Liveness endpoints.
pub mod health;
