//! Text normalization.
//!
//! Turns a raw document into a canonical string of lemmas:
//!
//! 1. Lowercase the whole text.
//! 2. Tokenize.
//! 3. Keep tokens made only of alphabetic characters that are not stopwords.
//! 4. Lemmatize each kept token, dropping lemmas that are themselves
//!    stopwords (`cans` -> `can`).
//! 5. Join with single spaces, preserving source order.
//!
//! # Example
//!
//! ```rust
//! use docsim_core::language::LanguageResources;
//! use docsim_core::normalize::Normalizer;
//!
//! let normalizer = Normalizer::new(LanguageResources::english());
//! assert_eq!(normalizer.normalize("The cats sat on the mat."), "cat sat mat");
//! ```

use crate::language::LanguageResources;

/// Normalizes documents with a fixed set of language resources.
#[derive(Clone)]
pub struct Normalizer {
    resources: LanguageResources,
}

impl Normalizer {
    pub fn new(resources: LanguageResources) -> Self {
        Self { resources }
    }

    /// Normalize one document. Never fails; text with no surviving token
    /// normalizes to the empty string.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();

        self.resources
            .tokenizer
            .tokenize(&lowered)
            .into_iter()
            .filter(|token| self.keep(token))
            .map(|token| self.resources.lemmatizer.lemmatize(&token))
            .filter(|lemma| self.keep(lemma))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn keep(&self, token: &str) -> bool {
        is_alphabetic(token) && !self.resources.stopwords.is_stopword(token)
    }
}

fn is_alphabetic(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}
