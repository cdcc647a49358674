//! Final prompt assembly for the RAG endpoint.

/// Opening instruction of every composed prompt
pub const ANSWER_INSTRUCTION: &str =
    "Based on the following information, answer the user's question.";

/// What the model is told to say when the context does not cover the question
pub const FALLBACK_INSTRUCTION: &str = "If the information does not contain the answer, say \"I could not find the answer in the provided context.\"";

/// Wrap `context` and `query` in the fixed answer template.
///
/// Pure: identical arguments always give byte-identical output.
pub fn compose(query: &str, context: &str) -> String {
    format!(
        "{ANSWER_INSTRUCTION}\n{FALLBACK_INSTRUCTION}\n\nContext:\n{context}\n\nQuestion:\n{query}\n"
    )
}
