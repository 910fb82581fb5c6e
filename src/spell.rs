//! Spelling correction for noisy input.
//!
//! Clinical notes carry typos ("hyptonic" for "hypotonic") that would defeat
//! exact stem lookup. The default corrector is a frequency-ranked edit-
//! distance model: known words pass through, unknown words are replaced by
//! the most frequent vocabulary word within edit distance 1, then 2, and
//! left unchanged when nothing is close. Short words and stop words are
//! never touched — edit distance over four letters rewrites too eagerly.
//!
//! Correction happens per token inside the extractor, so reported spans
//! always index the original input, not the corrected form.

use crate::tokenize::is_stop_word;
use std::collections::{HashMap, HashSet};

/// Words shorter than this are never corrected.
pub const MIN_CORRECTABLE_LEN: usize = 5;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Collaborator contract: spelling correction of a single word.
pub trait SpellCorrector: Send + Sync {
    /// Corrected form of `word`, or the word itself when no correction
    /// applies. Input is lowercase.
    fn correct(&self, word: &str) -> String;
}

/// Whether the extractor should offer this token to the corrector at all.
#[must_use]
pub fn is_correctable(word: &str) -> bool {
    word.len() >= MIN_CORRECTABLE_LEN
        && word.chars().all(|c| c.is_ascii_alphabetic())
        && !is_stop_word(word)
}

/// Frequency-ranked edit-distance corrector.
///
/// Candidate ladder per unknown word: vocabulary hits at edit distance 1,
/// else at distance 2, else the word unchanged. Among hits the most frequent
/// wins; frequency ties break on lexicographic order so correction is
/// deterministic across runs.
#[derive(Debug, Clone, Default)]
pub struct FrequencyCorrector {
    vocab: HashMap<String, u64>,
}

impl FrequencyCorrector {
    /// Build from explicit word → frequency pairs.
    #[must_use]
    pub fn new(vocab: HashMap<String, u64>) -> Self {
        Self {
            vocab: vocab
                .into_iter()
                .map(|(w, n)| (w.to_lowercase(), n))
                .collect(),
        }
    }

    /// Build by counting occurrences over a word stream, e.g. the tokenized
    /// names of a vocabulary.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab: HashMap<String, u64> = HashMap::new();
        for w in words {
            *vocab.entry(w.as_ref().to_lowercase()).or_insert(0) += 1;
        }
        Self { vocab }
    }

    /// Number of distinct known words.
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    fn known<'w>(&self, words: impl IntoIterator<Item = &'w String>) -> Vec<&'w String> {
        words
            .into_iter()
            .filter(|w| self.vocab.contains_key(*w))
            .collect()
    }

    fn best(&self, candidates: Vec<&String>) -> Option<String> {
        candidates
            .into_iter()
            // ties on frequency resolve to the lexicographically smallest
            .max_by_key(|w| (self.vocab[*w], std::cmp::Reverse((*w).clone())))
            .cloned()
    }
}

/// All strings one edit away: deletions, transpositions, replacements,
/// insertions.
fn edits1(word: &str) -> HashSet<String> {
    let bytes = word.as_bytes();
    let n = bytes.len();
    let mut out = HashSet::new();

    for i in 0..n {
        // deletion
        let mut w = Vec::with_capacity(n - 1);
        w.extend_from_slice(&bytes[..i]);
        w.extend_from_slice(&bytes[i + 1..]);
        out.insert(String::from_utf8_lossy(&w).into_owned());

        // transposition
        if i + 1 < n {
            let mut w = bytes.to_vec();
            w.swap(i, i + 1);
            out.insert(String::from_utf8_lossy(&w).into_owned());
        }

        // replacement
        for &c in ALPHABET {
            let mut w = bytes.to_vec();
            w[i] = c;
            out.insert(String::from_utf8_lossy(&w).into_owned());
        }
    }

    // insertion
    for i in 0..=n {
        for &c in ALPHABET {
            let mut w = Vec::with_capacity(n + 1);
            w.extend_from_slice(&bytes[..i]);
            w.push(c);
            w.extend_from_slice(&bytes[i..]);
            out.insert(String::from_utf8_lossy(&w).into_owned());
        }
    }

    out
}

impl SpellCorrector for FrequencyCorrector {
    fn correct(&self, word: &str) -> String {
        if self.vocab.contains_key(word) {
            return word.to_string();
        }

        let e1 = edits1(word);
        if let Some(best) = self.best(self.known(e1.iter())) {
            return best;
        }

        let e2: HashSet<String> = e1.iter().flat_map(|w| edits1(w)).collect();
        if let Some(best) = self.best(self.known(e2.iter())) {
            return best;
        }

        word.to_string()
    }
}
