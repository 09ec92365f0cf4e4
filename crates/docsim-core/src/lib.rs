//! # docsim core
//!
//! Pure scoring logic for docsim: language capabilities, normalization,
//! character chunking, the embedding trait, and chunk-wise similarity
//! scoring.
//!
//! This crate contains no tokio, HTTP, filesystem I/O, or model runtime.
//! Every external capability (tokenizer, lemmatizer, stopwords, embedder)
//! is injected, so the whole pipeline runs against fakes in tests.
//!
//! ```rust
//! use std::sync::Arc;
//! use docsim_core::compare::DocumentComparer;
//! use docsim_core::embedding::Embedder;
//! use docsim_core::error::EmbedError;
//! use docsim_core::language::LanguageResources;
//! use docsim_core::normalize::Normalizer;
//! use docsim_core::score::SimilarityScorer;
//!
//! struct Ones;
//! impl Embedder for Ones {
//!     fn model_name(&self) -> &str { "ones" }
//!     fn dims(&self) -> usize { 3 }
//!     fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
//!         Ok(vec![1.0; 3])
//!     }
//! }
//!
//! let comparer = DocumentComparer::new(
//!     Normalizer::new(LanguageResources::english()),
//!     SimilarityScorer::new(Arc::new(Ones)),
//! );
//! let result = comparer.compare("The cat sat on the mat.", "A cat sat on a mat.").unwrap();
//! assert_eq!(result.percentage(), 100.0);
//! ```

pub mod chunk;
pub mod compare;
pub mod embedding;
pub mod error;
pub mod language;
pub mod normalize;
pub mod score;
