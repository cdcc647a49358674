//! Flat-file knowledge base.
//!
//! The corpus is one UTF-8 text file. Chunks are separated by a single blank
//! line (`"\n\n"`); a chunk's own line breaks are kept.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::types::{AppError, Chunk, Result};

/// Delimiter between two chunks of the corpus
pub const CHUNK_DELIMITER: &str = "\n\n";

/// Split corpus text into chunks.
///
/// Leading and trailing whitespace of the whole text is stripped first.
/// Consecutive delimiters produce empty chunks, which are kept as-is.
pub fn split_chunks(text: &str) -> Vec<Chunk> {
    text.trim()
        .split(CHUNK_DELIMITER)
        .enumerate()
        .map(|(index, text)| Chunk {
            index,
            text: text.to_string(),
        })
        .collect()
}

/// Read the corpus at `path` and split it into chunks.
///
/// # Errors
///
/// [`AppError::KnowledgeBaseNotFound`] when the file does not exist, and
/// [`AppError::Internal`] for any other read failure (permissions, invalid
/// UTF-8). Nothing is retried.
pub async fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Chunk>> {
    let path = path.as_ref();

    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            AppError::KnowledgeBaseNotFound(path.to_path_buf())
        } else {
            AppError::Internal(format!(
                "Failed to read knowledge base {}: {}",
                path.display(),
                e
            ))
        }
    })?;

    let chunks = split_chunks(&text);
    tracing::debug!(path = %path.display(), chunks = chunks.len(), "Knowledge base loaded");
    Ok(chunks)
}

/// A knowledge base loaded once and shared read-only afterwards.
///
/// The first successful [`chunks`](Self::chunks) call reads the file; every
/// later caller gets the same `Arc`. A failed load is not remembered, so a
/// corpus that shows up after startup is picked up by the next request.
#[derive(Debug)]
pub struct KnowledgeStore {
    path: PathBuf,
    chunks: OnceCell<Arc<[Chunk]>>,
}

impl KnowledgeStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            chunks: OnceCell::new(),
        }
    }

    /// Build a store that is already loaded (useful for testing)
    pub fn from_chunks<P: Into<PathBuf>>(path: P, chunks: Vec<Chunk>) -> Self {
        Self {
            path: path.into(),
            chunks: OnceCell::new_with(Some(Arc::from(chunks))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the corpus has been read successfully
    pub fn is_loaded(&self) -> bool {
        self.chunks.initialized()
    }

    /// The corpus chunks, loading them on first use.
    pub async fn chunks(&self) -> Result<Arc<[Chunk]>> {
        self.chunks
            .get_or_try_init(|| async {
                let chunks = load(&self.path).await?;
                tracing::info!(
                    path = %self.path.display(),
                    chunks = chunks.len(),
                    "Knowledge base ready"
                );
                Ok::<_, AppError>(Arc::from(chunks))
            })
            .await
            .cloned()
    }

    /// Read the file again, bypassing the loaded copy.
    pub async fn reload(&self) -> Result<Arc<[Chunk]>> {
        Ok(Arc::from(load(&self.path).await?))
    }
}
