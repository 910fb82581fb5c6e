//! Suffix-stripping stemmer.
//!
//! Vocabulary names and document tokens must reduce to the same root for the
//! signature lookup to connect them ("hypotonia" / "hypotonic" → "hypoton").
//! The stemmer is a pure function applied identically at index-build time and
//! at query time, and it is applied **twice** so that compound suffix chains
//! collapse ("impulsivity" → "impulsiv" on the first pass, stable on the
//! second; "abnormalities" arrives here already lemmatized to "abnormality"
//! and loses "ity").

/// A deterministic word-to-root reduction.
///
/// Implementations must be pure: the same input always yields the same
/// output, with no external state. Anything fancier than suffix stripping
/// (a trained morphological analyzer, say) plugs in through this trait.
pub trait Stemmer: Send + Sync {
    /// Reduce a single lowercase word to its root.
    fn stem(&self, word: &str) -> String;
}

/// Apply a stemmer twice, collapsing compound suffix chains.
///
/// Stripping one suffix can expose another strippable suffix; a second pass
/// picks it up. Two passes are enough for the suffix inventory used here and
/// keep the function trivially idempotent in practice.
pub fn double_stem(stemmer: &dyn Stemmer, word: &str) -> String {
    stemmer.stem(&stemmer.stem(word))
}

/// Longest-matching suffixes, tried in order. Ordering by length makes the
/// strip deterministic: "comfortable" loses "able", not just "e".
const SUFFIXES: &[&str] = &["able", "ity", "ing", "ic", "ia", "al", "ly", "e"];

/// Default stemmer: strips one inflectional/derivational suffix per pass.
///
/// Words shorter than the eligibility threshold are returned unchanged, which
/// protects short clinical roots ("delay", "gait") from mangling.
#[derive(Debug, Clone)]
pub struct SuffixStemmer {
    min_len: usize,
}

impl SuffixStemmer {
    /// Default minimum word length eligible for stemming.
    pub const DEFAULT_MIN_LEN: usize = 7;

    /// Create a stemmer with the default eligibility threshold.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_len: Self::DEFAULT_MIN_LEN,
        }
    }

    /// Create a stemmer with a custom eligibility threshold.
    #[must_use]
    pub fn with_min_len(min_len: usize) -> Self {
        Self { min_len }
    }
}

impl Default for SuffixStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stemmer for SuffixStemmer {
    fn stem(&self, word: &str) -> String {
        if word.chars().count() < self.min_len {
            return word.to_string();
        }
        for suffix in SUFFIXES {
            if let Some(root) = word.strip_suffix(suffix) {
                if !root.is_empty() {
                    return root.to_string();
                }
            }
        }
        word.to_string()
    }
}
