//! Tokenization: the `Token` record, the `Tokenizer` collaborator trait, and
//! a self-contained default implementation.
//!
//! The matching engine only consumes the fields on [`Token`]; anything that
//! can produce them (a statistical tagger, a clinical NLP pipeline) can stand
//! in for [`SimpleTokenizer`] behind the [`Tokenizer`] trait.
//!
//! One deliberate quirk inherited from the clinical domain: a handful of
//! words that ordinary stop lists drop ("no", "under", "left", "more", ...)
//! are **not** stop words here, because controlled-vocabulary names use them
//! as content words ("Absent speech", "Overlapping toe", "Low-set ears").

use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// One token of a chunk, with offsets relative to that chunk.
///
/// Offsets are byte offsets into the chunk text; tokens never split a UTF-8
/// character, so slicing the chunk with them is always valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface text exactly as it appears in the chunk.
    pub text: String,
    /// Normalized dictionary form (lowercased, light inflection stripping).
    pub lemma: String,
    /// Start byte offset within the chunk.
    pub start: usize,
    /// End byte offset within the chunk (exclusive).
    pub end: usize,
    /// Whether this token is a stop word.
    pub is_stop: bool,
    /// Whether this token is punctuation.
    pub is_punct: bool,
    /// Position within the tokenized chunk (0-based).
    pub index: usize,
}

impl Token {
    /// Whether this token carries content usable in a stem signature.
    #[must_use]
    pub fn is_content(&self) -> bool {
        !self.is_stop && !self.is_punct
    }
}

/// Collaborator contract: split text into ordered, offset-annotated tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize a chunk of text.
    ///
    /// Returned tokens are ordered by `start` and carry chunk-relative
    /// offsets. Implementations backed by an external model should return
    /// [`crate::Error::DependencyUnavailable`] when the model cannot be
    /// loaded rather than silently yielding no tokens.
    fn tokenize(&self, text: &str) -> Result<Vec<Token>>;

    /// Normalize a single word to its dictionary form.
    ///
    /// Used by the extractor to re-lemmatize a token after spelling
    /// correction replaced its surface form.
    fn lemma(&self, word: &str) -> String {
        word.to_lowercase()
    }

    /// Maximum input length this tokenizer accepts, if any.
    ///
    /// The extractor keeps chunks below this bound.
    fn max_input_len(&self) -> Option<usize> {
        None
    }
}

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    // words (with internal apostrophes), numbers, or single punctuation marks
    Regex::new(r"[A-Za-z]+(?:'[A-Za-z]+)*|\d+(?:\.\d+)?|[^\sA-Za-z0-9]")
        .expect("Failed to compile token pattern")
});

/// Words excluded from the stop list because vocabulary names use them as
/// content words. Keep in sync with the curated list below.
const STOP_EXCEPTIONS: &[&str] = &[
    "first", "second", "third", "fourth", "fifth", "under", "over", "front", "back", "behind",
    "above", "below", "without", "no", "not", "out", "up", "side", "right", "left", "more", "less",
    "during", "than", "take", "move", "full",
];

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let words: &[&str] = &[
        "a", "an", "the", "and", "or", "nor", "but", "if", "then", "else", "when", "while",
        "because", "although", "though", "since", "until", "unless", "of", "in", "on", "at", "by",
        "for", "with", "to", "from", "as", "is", "are", "was", "were", "be", "been", "being", "am",
        "do", "does", "did", "done", "doing", "will", "would", "could", "should", "shall", "may",
        "might", "must", "can", "cannot", "this", "that", "these", "those", "it", "its", "itself",
        "he", "she", "his", "her", "hers", "him", "himself", "herself", "they", "them", "their",
        "theirs", "themselves", "we", "us", "our", "ours", "ourselves", "you", "your", "yours",
        "yourself", "i", "me", "my", "mine", "myself", "there", "here", "where", "which", "who",
        "whom", "whose", "what", "why", "how", "all", "any", "each", "every", "both", "few",
        "many", "much", "most", "some", "such", "own", "same", "so", "too", "very", "just", "also",
        "about", "into", "through", "between", "among", "after", "before", "again", "further",
        "once", "other", "only", "had", "has", "have", "having",
    ];
    let set: HashSet<&'static str> = words.iter().copied().collect();
    debug_assert!(STOP_EXCEPTIONS.iter().all(|w| !set.contains(w)));
    set
});

/// Whether a lowercase word is on the default stop list.
#[must_use]
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Light rule-based lemmatization: lowercase plus plural/past/progressive
/// stripping. Both the index builder and the query path use the same rules,
/// so consistency matters more than linguistic accuracy.
#[must_use]
pub fn naive_lemma(word: &str) -> String {
    let w = word.to_lowercase();
    if let Some(base) = w.strip_suffix("'s") {
        return base.to_string();
    }
    let n = w.len();
    if n > 4 && w.ends_with("ies") {
        return format!("{}y", &w[..n - 3]);
    }
    if n >= 6 && w.ends_with("ing") {
        return w[..n - 3].to_string();
    }
    if n >= 6 && w.ends_with("ed") {
        return w[..n - 2].to_string();
    }
    if n > 3 && w.ends_with('s') && !w.ends_with("ss") && !w.ends_with("us") && !w.ends_with("is")
    {
        return w[..n - 1].to_string();
    }
    w
}

/// Default tokenizer: regex word/number/punctuation scanner with the curated
/// stop list and [`naive_lemma`] normalization.
///
/// Suitable for tests and lightweight deployments. Real deployments wanting
/// POS-aware lemmatization implement [`Tokenizer`] over their own pipeline.
#[derive(Debug, Clone, Default)]
pub struct SimpleTokenizer;

impl SimpleTokenizer {
    /// Create a new default tokenizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        for (index, m) in TOKEN_RE.find_iter(text).enumerate() {
            let surface = m.as_str();
            let is_punct = !surface.chars().next().is_some_and(|c| c.is_alphanumeric());
            let lower = surface.to_lowercase();
            let is_stop = !is_punct && is_stop_word(&lower);
            let lemma = if is_punct { lower } else { naive_lemma(surface) };
            tokens.push(Token {
                text: surface.to_string(),
                lemma,
                start: m.start(),
                end: m.end(),
                is_stop,
                is_punct,
                index,
            });
        }
        Ok(tokens)
    }

    fn lemma(&self, word: &str) -> String {
        naive_lemma(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_slice_back_to_surface() {
        let text = "Mild hypotonia, developmental delay.";
        let tokens = SimpleTokenizer::new().tokenize(text).unwrap();
        for t in &tokens {
            assert_eq!(&text[t.start..t.end], t.text);
        }
    }

    #[test]
    fn punctuation_flagged() {
        let tokens = SimpleTokenizer::new().tokenize("word, hypotonia").unwrap();
        assert_eq!(tokens[1].text, ",");
        assert!(tokens[1].is_punct);
        assert!(!tokens[0].is_punct);
    }

    #[test]
    fn clinical_words_are_not_stops() {
        for w in ["no", "not", "without", "under", "left", "more", "less"] {
            assert!(!is_stop_word(w), "{w} must stay a content word");
        }
        assert!(is_stop_word("the"));
        assert!(is_stop_word("and"));
    }

    #[test]
    fn naive_lemma_rules() {
        assert_eq!(naive_lemma("Delayed"), "delay");
        assert_eq!(naive_lemma("seizures"), "seizure");
        assert_eq!(naive_lemma("anomalies"), "anomaly");
        assert_eq!(naive_lemma("speech"), "speech"); // no false plural strip
        assert_eq!(naive_lemma("glass"), "glass");
    }

    #[test]
    fn sequence_indices_are_dense() {
        let tokens = SimpleTokenizer::new()
            .tokenize("no speech, and no words")
            .unwrap();
        for (i, t) in tokens.iter().enumerate() {
            assert_eq!(t.index, i);
        }
    }
}
