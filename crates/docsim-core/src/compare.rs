//! Document-to-document comparison: normalize both, then score.

use serde::Serialize;

use crate::error::ScoreError;
use crate::normalize::Normalizer;
use crate::score::{Comparison, SimilarityScorer};

/// Outcome of [`DocumentComparer::compare`].
#[derive(Debug, Clone, Serialize)]
pub struct DocumentComparison {
    pub normalized_a: String,
    pub normalized_b: String,
    #[serde(flatten)]
    pub comparison: Comparison,
}

impl DocumentComparison {
    /// The score on a 0–100 scale, as returned to HTTP clients.
    pub fn percentage(&self) -> f64 {
        self.comparison.score * 100.0
    }
}

/// The full per-request pipeline. Built once at startup and shared.
#[derive(Clone)]
pub struct DocumentComparer {
    normalizer: Normalizer,
    scorer: SimilarityScorer,
}

impl DocumentComparer {
    pub fn new(normalizer: Normalizer, scorer: SimilarityScorer) -> Self {
        Self { normalizer, scorer }
    }

    pub fn compare(&self, doc_a: &str, doc_b: &str) -> Result<DocumentComparison, ScoreError> {
        let normalized_a = self.normalizer.normalize(doc_a);
        let normalized_b = self.normalizer.normalize(doc_b);
        let comparison = self.scorer.compare(&normalized_a, &normalized_b)?;

        Ok(DocumentComparison {
            normalized_a,
            normalized_b,
            comparison,
        })
    }
}
