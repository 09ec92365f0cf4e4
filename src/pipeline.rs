//! Startup-time construction of the shared comparison pipeline.
//!
//! Language resources and the embedding backend are loaded once, before the
//! first request, and wrapped in an immutable [`DocumentComparer`] that every
//! request shares. Any resource that cannot be loaded stops startup; there
//! is no degraded mode.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use docsim_core::compare::DocumentComparer;
use docsim_core::error::ScoreError;
use docsim_core::language::{LanguageResources, StopWordSet};
use docsim_core::normalize::Normalizer;
use docsim_core::score::SimilarityScorer;

use crate::config::{Config, LanguageConfig};
use crate::embedding::create_embedder;

/// Load the tokenizer, lemmatizer, and stopword set.
///
/// # Errors
///
/// [`ScoreError::ResourceUnavailable`] if the configured stopword file
/// cannot be read or contains no words.
pub fn load_language_resources(config: &LanguageConfig) -> Result<LanguageResources, ScoreError> {
    match &config.stopwords_path {
        None => Ok(LanguageResources::english()),
        Some(path) => Ok(LanguageResources::with_stopwords(read_stopwords(path)?)),
    }
}

fn read_stopwords(path: &Path) -> Result<StopWordSet, ScoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ScoreError::ResourceUnavailable(format!(
            "cannot read stopword list {}: {}",
            path.display(),
            e
        ))
    })?;
    StopWordSet::parse(&content)
}

/// Build the shared comparer. Blocks while a local model loads.
pub fn build_comparer(config: &Config) -> Result<Arc<DocumentComparer>> {
    let resources =
        load_language_resources(&config.language).context("Failed to load language resources")?;
    let embedder =
        create_embedder(&config.embedding).context("Failed to create embedding provider")?;

    if !config.embedding.is_enabled() {
        tracing::warn!("embedding provider is disabled; similarity requests will fail");
    }
    tracing::info!(
        provider = %config.embedding.provider,
        model = embedder.model_name(),
        dims = embedder.dims(),
        "embedding provider ready"
    );

    Ok(Arc::new(DocumentComparer::new(
        Normalizer::new(resources),
        SimilarityScorer::new(embedder),
    )))
}

/// [`build_comparer`] on a blocking thread, for use from async code.
pub async fn build_comparer_blocking(config: &Config) -> Result<Arc<DocumentComparer>> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || build_comparer(&config)).await?
}
