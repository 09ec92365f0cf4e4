//! Language capabilities consumed by the normalizer.
//!
//! The normalizer only depends on three narrow traits ([`Tokenizer`],
//! [`Lemmatizer`], [`StopWords`]) so tests can swap in fixed fakes. The
//! default English implementations live here as well:
//!
//! | Capability | Default |
//! |------------|---------|
//! | tokenize | [`TreebankTokenizer`] |
//! | lemmatize | [`MorphyLemmatizer`] (noun forms) |
//! | stopwords | [`StopWordSet::english`] |
//!
//! All of them expect lowercase input.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ScoreError;

/// Splits text into word and punctuation tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Reduces a token to its dictionary form.
pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, token: &str) -> String;
}

/// Membership test for high-frequency words excluded from comparison.
pub trait StopWords: Send + Sync {
    fn is_stopword(&self, token: &str) -> bool;
}

/// The language capabilities a [`Normalizer`](crate::normalize::Normalizer)
/// runs with. Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct LanguageResources {
    pub tokenizer: Arc<dyn Tokenizer>,
    pub lemmatizer: Arc<dyn Lemmatizer>,
    pub stopwords: Arc<dyn StopWords>,
}

impl LanguageResources {
    /// Default English resources with the built-in stopword list.
    pub fn english() -> Self {
        Self::with_stopwords(StopWordSet::english())
    }

    /// Default English tokenizer and lemmatizer with a custom stopword set.
    pub fn with_stopwords(stopwords: StopWordSet) -> Self {
        Self {
            tokenizer: Arc::new(TreebankTokenizer),
            lemmatizer: Arc::new(MorphyLemmatizer),
            stopwords: Arc::new(stopwords),
        }
    }
}

// ============ Tokenizer ============

/// Clitics split off the end of a word, checked in order.
const CLITICS: &[&str] = &["n't", "'s", "'re", "'ve", "'ll", "'d", "'m"];

/// Punctuation that always forms its own token, wherever it appears.
fn is_separator(c: char) -> bool {
    matches!(
        c,
        ',' | ';' | ':' | '!' | '?' | '"' | '(' | ')' | '[' | ']' | '{' | '}' | '<' | '>' | '…'
            | '“' | '”'
    )
}

/// Penn-Treebank-style word tokenizer.
///
/// Splits on whitespace, separates punctuation from words, and splits
/// English clitics (`don't` → `do n't`, `cat's` → `cat 's`). Punctuation
/// inside a word (`e-mail`, `u.s`) stays attached.
pub struct TreebankTokenizer;

impl Tokenizer for TreebankTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();

        for word in text.split_whitespace() {
            let word = word.replace('\u{2019}', "'");
            let mut segment = String::new();
            for c in word.chars() {
                if is_separator(c) {
                    split_segment(&segment, &mut tokens);
                    segment.clear();
                    tokens.push(c.to_string());
                } else {
                    segment.push(c);
                }
            }
            split_segment(&segment, &mut tokens);
        }

        tokens
    }
}

/// Peel leading and trailing punctuation off a separator-free segment,
/// then split clitics off the remaining word.
fn split_segment(segment: &str, out: &mut Vec<String>) {
    let mut rest = segment;

    while let Some(c) = rest.chars().next() {
        if c.is_alphanumeric() || (c == '\'' && starts_with_clitic(rest)) {
            break;
        }
        out.push(c.to_string());
        rest = &rest[c.len_utf8()..];
    }

    let mut trailing = Vec::new();
    while let Some(c) = rest.chars().next_back() {
        if c.is_alphanumeric() {
            break;
        }
        trailing.push(c.to_string());
        rest = &rest[..rest.len() - c.len_utf8()];
    }

    if !rest.is_empty() {
        split_clitics(rest, out);
    }
    out.extend(trailing.into_iter().rev());
}

fn starts_with_clitic(s: &str) -> bool {
    CLITICS.iter().any(|clitic| s == *clitic)
}

fn split_clitics(word: &str, out: &mut Vec<String>) {
    if word == "cannot" {
        out.push("can".to_string());
        out.push("not".to_string());
        return;
    }

    for clitic in CLITICS {
        if let Some(stem) = word.strip_suffix(clitic) {
            if !stem.is_empty() {
                out.push(stem.to_string());
                out.push((*clitic).to_string());
                return;
            }
        }
    }

    out.push(word.to_string());
}

// ============ Lemmatizer ============

/// Irregular plurals resolved before any suffix rule.
const NOUN_EXCEPTIONS: &[(&str, &str)] = &[
    ("analyses", "analysis"),
    ("children", "child"),
    ("cookies", "cookie"),
    ("crises", "crisis"),
    ("criteria", "criterion"),
    ("data", "datum"),
    ("dice", "die"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("halves", "half"),
    ("indices", "index"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("lice", "louse"),
    ("lives", "life"),
    ("loaves", "loaf"),
    ("matrices", "matrix"),
    ("men", "man"),
    ("mice", "mouse"),
    ("movies", "movie"),
    ("oxen", "ox"),
    ("people", "person"),
    ("phenomena", "phenomenon"),
    ("pies", "pie"),
    ("quizzes", "quiz"),
    ("selves", "self"),
    ("shelves", "shelf"),
    ("teeth", "tooth"),
    ("theses", "thesis"),
    ("thieves", "thief"),
    ("ties", "tie"),
    ("wives", "wife"),
    ("wolves", "wolf"),
    ("women", "woman"),
];

/// Words that end in `s` or `men` but are already in dictionary form.
const INVARIANT_NOUNS: &[&str] = &[
    "abdomen",
    "acumen",
    "always",
    "amen",
    "economics",
    "lens",
    "mathematics",
    "news",
    "omen",
    "perhaps",
    "physics",
    "politics",
    "ramen",
    "regimen",
    "semen",
    "series",
    "species",
    "specimen",
    "stamen",
    "whereas",
];

/// Dictionary forms ending in `s` whose plural adds `es` (`bus` → `buses`).
/// Gates the `ses` → `s` rule; any other `-ses` word drops only the `s`.
const S_STEM_NOUNS: &[&str] = &[
    "alias",
    "apparatus",
    "atlas",
    "bias",
    "bonus",
    "bus",
    "cactus",
    "campus",
    "canvas",
    "caucus",
    "census",
    "chorus",
    "circus",
    "consensus",
    "corpus",
    "focus",
    "gas",
    "genus",
    "iris",
    "lens",
    "lotus",
    "minus",
    "nexus",
    "octopus",
    "plus",
    "prospectus",
    "sinus",
    "status",
    "surplus",
    "syllabus",
    "thesaurus",
    "virus",
    "walrus",
];

/// Unconditional detachment rules, longest suffix first.
const NOUN_SUFFIX_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("ies", "y"),
    ("men", "man"),
    ("s", ""),
];

/// WordNet-morphy-style noun lemmatizer.
///
/// Applies the exception table, then the gated `ses` and `zes` rules, then
/// the first matching suffix rule. Tokens of three characters or fewer,
/// invariant nouns, and tokens ending in `ss`, `us` or `is` are returned
/// unchanged.
pub struct MorphyLemmatizer;

impl MorphyLemmatizer {
    fn detach(token: &str) -> Option<String> {
        if let Some(stem) = token.strip_suffix("es") {
            if stem.ends_with('s') && S_STEM_NOUNS.contains(&stem) {
                return Some(stem.to_string());
            }
        }

        // waltzes -> waltz, but sizes -> size
        if let Some(stem) = token.strip_suffix("zes") {
            if stem.chars().last().is_some_and(is_consonant) {
                return Some(format!("{}z", stem));
            }
        }

        NOUN_SUFFIX_RULES.iter().find_map(|(suffix, replacement)| {
            token
                .strip_suffix(suffix)
                .map(|stem| format!("{}{}", stem, replacement))
        })
    }
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

impl Lemmatizer for MorphyLemmatizer {
    fn lemmatize(&self, token: &str) -> String {
        if let Some((_, lemma)) = NOUN_EXCEPTIONS.iter().find(|(form, _)| *form == token) {
            return (*lemma).to_string();
        }

        if token.chars().count() <= 3
            || INVARIANT_NOUNS.contains(&token)
            || token.ends_with("ss")
            || token.ends_with("us")
            || token.ends_with("is")
        {
            return token.to_string();
        }

        Self::detach(token).unwrap_or_else(|| token.to_string())
    }
}

// ============ Stopwords ============

/// Built-in English stopword list.
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// A fixed set of stopwords, loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct StopWordSet {
    words: HashSet<String>,
}

impl StopWordSet {
    /// The built-in English list.
    pub fn english() -> Self {
        Self::from_words(ENGLISH_STOPWORDS.iter().copied())
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Parse a newline-separated stopword list. Blank lines and lines
    /// starting with `#` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::ResourceUnavailable`] if the list contains no
    /// words.
    pub fn parse(list: &str) -> Result<Self, ScoreError> {
        let set = Self::from_words(
            list.lines()
                .map(str::trim)
                .filter(|line| !line.starts_with('#')),
        );
        if set.is_empty() {
            return Err(ScoreError::ResourceUnavailable(
                "stopword list is empty".to_string(),
            ));
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl StopWords for StopWordSet {
    fn is_stopword(&self, token: &str) -> bool {
        self.words.contains(token)
    }
}
