//! `docsim compare` and `docsim normalize`.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::pipeline::{build_comparer_blocking, load_language_resources};
use docsim_core::normalize::Normalizer;

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))
}

/// Score two local files and print the result.
///
/// With `json`, prints the same `{"similarityScore": ...}` shape the HTTP
/// endpoint returns, plus the chunk diagnostics.
pub async fn run_compare(config: &Config, file1: &Path, file2: &Path, json: bool) -> Result<()> {
    let document1 = read_document(file1)?;
    let document2 = read_document(file2)?;

    let comparer = build_comparer_blocking(config).await?;
    let result = tokio::task::spawn_blocking(move || comparer.compare(&document1, &document2))
        .await??;

    if json {
        let out = serde_json::json!({
            "similarityScore": result.percentage(),
            "chunks": [result.comparison.chunks_a, result.comparison.chunks_b],
            "similarPairs": result.comparison.similar_pairs,
            "totalPairs": result.comparison.total_pairs,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("similarity: {:.2}", result.percentage());
        println!(
            "chunks: {} x {} ({} similar of {} pairs)",
            result.comparison.chunks_a,
            result.comparison.chunks_b,
            result.comparison.similar_pairs,
            result.comparison.total_pairs
        );
    }

    Ok(())
}

/// Print the normalized form of a file. Needs no embedding backend.
pub fn run_normalize(config: &Config, file: &Path) -> Result<()> {
    let document = read_document(file)?;
    let resources = load_language_resources(&config.language)?;
    println!("{}", Normalizer::new(resources).normalize(&document));
    Ok(())
}
