//! Error types shared by the normalizer, the embedder seam, and the scorer.

use thiserror::Error;

/// Failure reported by an [`Embedder`](crate::embedding::Embedder).
///
/// Backends distinguish "not ready" (model not loaded, provider disabled,
/// credentials missing) from "the call itself failed" so the scorer can
/// surface the right condition to callers.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding backend unavailable: {0}")]
    Unavailable(String),

    #[error("embedding call failed: {0}")]
    Failed(String),
}

/// Errors produced while preparing resources or scoring two documents.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Language resources or the embedding backend are not ready.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// The embedding backend failed for one chunk. No partial score is kept.
    #[error("failed to embed chunk {chunk} of document {document}: {message}")]
    Embedding {
        document: usize,
        chunk: usize,
        message: String,
    },
}

impl ScoreError {
    pub(crate) fn from_embed(err: EmbedError, document: usize, chunk: usize) -> Self {
        match err {
            EmbedError::Unavailable(message) => ScoreError::ResourceUnavailable(message),
            EmbedError::Failed(message) => ScoreError::Embedding {
                document,
                chunk,
                message,
            },
        }
    }
}
