//! Chunk-wise similarity scoring.
//!
//! Both normalized texts are split into [`CHUNK_CHARS`]-character chunks,
//! every chunk is embedded, and every cross-document pair of chunks is
//! compared by cosine similarity. The score is the fraction of pairs whose
//! similarity is strictly above [`SIMILARITY_THRESHOLD`]:
//!
//! ```text
//!          |{ (a, b) ∈ A × B : cos(a, b) > 0.5 }|
//! score = ───────────────────────────────────────
//!                      |A| × |B|
//! ```
//!
//! This is a hit-rate, not a mean: pairs at 0.49 contribute nothing, and a
//! single strong match among many weak pairs contributes proportionally.
//!
//! Empty chunks (from empty normalized text) are never sent to the
//! embedder; they embed as the zero vector, whose similarity with anything
//! is `0.0`. Identical chunk texts are embedded once per comparison.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::chunk::{split_chunks, CHUNK_CHARS};
use crate::embedding::{cosine_similarity, Embedder};
use crate::error::ScoreError;

/// A chunk pair counts as similar when its cosine similarity is strictly
/// greater than this value.
pub const SIMILARITY_THRESHOLD: f32 = 0.5;

/// Result of comparing two normalized texts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Number of chunks the first text was split into.
    pub chunks_a: usize,
    /// Number of chunks the second text was split into.
    pub chunks_b: usize,
    /// Pairs whose similarity exceeded [`SIMILARITY_THRESHOLD`].
    pub similar_pairs: usize,
    /// `chunks_a × chunks_b`.
    pub total_pairs: usize,
    /// `similar_pairs / total_pairs`, always in `[0, 1]`.
    pub score: f64,
}

/// Scores pairs of normalized texts with a shared embedder.
#[derive(Clone)]
pub struct SimilarityScorer {
    embedder: Arc<dyn Embedder>,
    chunk_chars: usize,
}

impl SimilarityScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self::with_chunk_chars(embedder, CHUNK_CHARS)
    }

    /// Scorer with a non-default chunk size.
    pub fn with_chunk_chars(embedder: Arc<dyn Embedder>, chunk_chars: usize) -> Self {
        Self {
            embedder,
            chunk_chars,
        }
    }

    /// The similarity ratio of two normalized texts, in `[0, 1]`.
    pub fn score(&self, a: &str, b: &str) -> Result<f64, ScoreError> {
        Ok(self.compare(a, b)?.score)
    }

    /// Compare two normalized texts and report how the score was reached.
    ///
    /// # Errors
    ///
    /// The first embedder failure aborts the comparison:
    /// [`ScoreError::ResourceUnavailable`] when the backend is not ready,
    /// [`ScoreError::Embedding`] when a call fails.
    pub fn compare(&self, a: &str, b: &str) -> Result<Comparison, ScoreError> {
        let chunks_a = split_chunks(a, self.chunk_chars);
        let chunks_b = split_chunks(b, self.chunk_chars);

        let mut store = ChunkEmbeddings::new(self.embedder.as_ref());
        let ids_a = store.embed_all(&chunks_a, 1)?;
        let ids_b = store.embed_all(&chunks_b, 2)?;

        let mut similar_pairs = 0usize;
        for (i, &id_a) in ids_a.iter().enumerate() {
            for (j, &id_b) in ids_b.iter().enumerate() {
                let similarity = cosine_similarity(store.vector(id_a), store.vector(id_b));
                debug!(chunk_a = i, chunk_b = j, similarity, "chunk pair similarity");
                if similarity > SIMILARITY_THRESHOLD {
                    similar_pairs += 1;
                }
            }
        }

        let total_pairs = chunks_a.len() * chunks_b.len();

        Ok(Comparison {
            chunks_a: chunks_a.len(),
            chunks_b: chunks_b.len(),
            similar_pairs,
            total_pairs,
            score: similar_pairs as f64 / total_pairs as f64,
        })
    }
}

/// Request-scoped embedding memo keyed by chunk text.
struct ChunkEmbeddings<'a> {
    embedder: &'a dyn Embedder,
    ids: HashMap<&'a str, usize>,
    vectors: Vec<Vec<f32>>,
}

impl<'a> ChunkEmbeddings<'a> {
    fn new(embedder: &'a dyn Embedder) -> Self {
        Self {
            embedder,
            ids: HashMap::new(),
            vectors: Vec::new(),
        }
    }

    fn embed_all(&mut self, chunks: &[&'a str], document: usize) -> Result<Vec<usize>, ScoreError> {
        chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| self.embed(*chunk, document, index))
            .collect()
    }

    fn embed(&mut self, chunk: &'a str, document: usize, index: usize) -> Result<usize, ScoreError> {
        if let Some(&id) = self.ids.get(chunk) {
            return Ok(id);
        }

        let vector = if chunk.is_empty() {
            vec![0.0; self.embedder.dims()]
        } else {
            self.embedder
                .embed(chunk)
                .map_err(|e| ScoreError::from_embed(e, document, index))?
        };

        let id = self.vectors.len();
        self.vectors.push(vector);
        self.ids.insert(chunk, id);
        Ok(id)
    }

    fn vector(&self, id: usize) -> &[f32] {
        &self.vectors[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmbedError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// One dimension per known word; unknown words share the last one.
    struct VocabEmbedder {
        vocab: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl VocabEmbedder {
        fn new(vocab: &[&'static str]) -> Self {
            Self {
                vocab: vocab.to_vec(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Embedder for VocabEmbedder {
        fn model_name(&self) -> &str {
            "vocab"
        }

        fn dims(&self) -> usize {
            self.vocab.len() + 1
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            assert!(!text.is_empty(), "empty chunks must not reach the embedder");
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut v = vec![0.0; self.dims()];
            for word in text.split_whitespace() {
                let slot = self
                    .vocab
                    .iter()
                    .position(|w| *w == word)
                    .unwrap_or(self.vocab.len());
                v[slot] += 1.0;
            }
            Ok(v)
        }
    }

    /// Embeds every text to the same fixed vector.
    struct ConstantEmbedder(Vec<f32>);

    impl Embedder for ConstantEmbedder {
        fn model_name(&self) -> &str {
            "constant"
        }
        fn dims(&self) -> usize {
            self.0.len()
        }
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            Ok(self.0.clone())
        }
    }

    struct FailingEmbedder(fn(String) -> EmbedError);

    impl Embedder for FailingEmbedder {
        fn model_name(&self) -> &str {
            "failing"
        }
        fn dims(&self) -> usize {
            4
        }
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            Err((self.0)(format!("cannot embed {:?}", text)))
        }
    }

    const VOCAB: &[&str] = &[
        "cat",
        "sat",
        "mat",
        "quantum",
        "entanglement",
        "superconducting",
        "qubit",
        "chef",
        "prepared",
        "delicious",
        "lasagna",
    ];

    fn vocab_scorer() -> (Arc<VocabEmbedder>, SimilarityScorer) {
        let embedder = Arc::new(VocabEmbedder::new(VOCAB));
        let scorer = SimilarityScorer::new(embedder.clone());
        (embedder, scorer)
    }

    #[test]
    fn test_identical_texts_score_one() {
        let (_, scorer) = vocab_scorer();
        let cmp = scorer.compare("cat sat mat", "cat sat mat").unwrap();
        assert_eq!(cmp.total_pairs, 1);
        assert_eq!(cmp.similar_pairs, 1);
        assert_eq!(cmp.score, 1.0);
    }

    #[test]
    fn test_unrelated_texts_score_zero() {
        let (_, scorer) = vocab_scorer();
        let score = scorer
            .score(
                "quantum entanglement superconducting qubit",
                "chef prepared delicious lasagna",
            )
            .unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_score_is_symmetric() {
        let (_, scorer) = vocab_scorer();
        let a = "cat sat mat quantum qubit ".repeat(60);
        let b = "cat chef lasagna mat ".repeat(45);
        let ab = scorer.compare(&a, &b).unwrap();
        let ba = scorer.compare(&b, &a).unwrap();
        assert_eq!(ab.score, ba.score);
        assert_eq!(ab.similar_pairs, ba.similar_pairs);
        assert_eq!(ab.total_pairs, ba.total_pairs);
    }

    #[test]
    fn test_score_is_deterministic() {
        let (_, scorer) = vocab_scorer();
        let a = "cat sat mat quantum ".repeat(50);
        let b = "qubit cat delicious ".repeat(70);
        assert_eq!(
            scorer.compare(&a, &b).unwrap(),
            scorer.compare(&a, &b).unwrap()
        );
    }

    #[test]
    fn test_hit_rate_not_mean() {
        let (_, scorer) = vocab_scorer();
        let scorer = SimilarityScorer::with_chunk_chars(scorer.embedder.clone(), 4);
        // a = ["cat ", "mat "] ; b = ["cat "]
        let cmp = scorer.compare("cat mat ", "cat ").unwrap();
        assert_eq!(cmp.chunks_a, 2);
        assert_eq!(cmp.chunks_b, 1);
        assert_eq!(cmp.similar_pairs, 1);
        assert_eq!(cmp.score, 0.5);
    }

    #[test]
    fn test_threshold_is_strict() {
        // cos([1, 0, 0, 0], [1, 1, 1, 1]) is exactly 0.5
        struct Split;
        impl Embedder for Split {
            fn model_name(&self) -> &str {
                "split"
            }
            fn dims(&self) -> usize {
                4
            }
            fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
                Ok(if text == "a" {
                    vec![1.0, 0.0, 0.0, 0.0]
                } else {
                    vec![1.0, 1.0, 1.0, 1.0]
                })
            }
        }
        let scorer = SimilarityScorer::new(Arc::new(Split));
        assert_eq!(
            cosine_similarity(&[1.0, 0.0, 0.0, 0.0], &[1.0, 1.0, 1.0, 1.0]),
            0.5
        );
        assert_eq!(scorer.score("a", "b").unwrap(), 0.0);
    }

    #[test]
    fn test_uniform_moderate_similarity_scores_zero() {
        struct Moderate;
        impl Embedder for Moderate {
            fn model_name(&self) -> &str {
                "moderate"
            }
            fn dims(&self) -> usize {
                2
            }
            fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
                // cos between the two directions is 0.49
                Ok(if text.starts_with('a') {
                    vec![1.0, 0.0]
                } else {
                    vec![0.49, (1.0f32 - 0.49 * 0.49).sqrt()]
                })
            }
        }
        let scorer = SimilarityScorer::with_chunk_chars(Arc::new(Moderate), 2);
        let cmp = scorer.compare("aaaaaa", "bbbb").unwrap();
        assert_eq!(cmp.total_pairs, 6);
        assert_eq!(cmp.score, 0.0);
    }

    #[test]
    fn test_empty_text_scores_zero_without_embedding_it() {
        let (embedder, scorer) = vocab_scorer();
        let cmp = scorer.compare("", "cat sat mat").unwrap();
        assert_eq!(cmp.chunks_a, 1);
        assert_eq!(cmp.chunks_b, 1);
        assert_eq!(cmp.score, 0.0);
        assert_eq!(embedder.calls(), 1);

        assert_eq!(scorer.score("", "").unwrap(), 0.0);
    }

    #[test]
    fn test_duplicate_chunks_embedded_once() {
        let (embedder, _) = vocab_scorer();
        let scorer = SimilarityScorer::with_chunk_chars(embedder.clone(), 4);
        // a = ["cat ", "cat ", "cat "], b = ["cat ", "mat "]
        let cmp = scorer.compare("cat cat cat ", "cat mat ").unwrap();
        assert_eq!(cmp.total_pairs, 6);
        assert_eq!(cmp.similar_pairs, 3);
        assert_eq!(embedder.calls(), 2);
    }

    #[test]
    fn test_score_bounds_with_constant_embedder() {
        let scorer =
            SimilarityScorer::with_chunk_chars(Arc::new(ConstantEmbedder(vec![0.3, 0.4])), 3);
        let cmp = scorer.compare("abcdefghij", "klmnop").unwrap();
        assert_eq!(cmp.chunks_a, 4);
        assert_eq!(cmp.chunks_b, 2);
        assert_eq!(cmp.similar_pairs, cmp.total_pairs);
        assert_eq!(cmp.score, 1.0);
    }

    #[test]
    fn test_embed_failure_aborts() {
        let scorer = SimilarityScorer::new(Arc::new(FailingEmbedder(EmbedError::Failed)));
        let err = scorer.score("cat", "mat").unwrap_err();
        match err {
            ScoreError::Embedding {
                document, chunk, ..
            } => {
                assert_eq!(document, 1);
                assert_eq!(chunk, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unavailable_backend_maps_to_resource_unavailable() {
        let scorer = SimilarityScorer::new(Arc::new(FailingEmbedder(EmbedError::Unavailable)));
        let err = scorer.score("cat", "mat").unwrap_err();
        assert!(matches!(err, ScoreError::ResourceUnavailable(_)));
    }

    #[test]
    fn test_comparison_serializes() {
        let (_, scorer) = vocab_scorer();
        let cmp = scorer.compare("cat", "cat").unwrap();
        let json = serde_json::to_value(&cmp).unwrap();
        assert_eq!(json["similar_pairs"], 1);
        assert_eq!(json["score"], 1.0);
    }
}
