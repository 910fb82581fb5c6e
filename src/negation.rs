//! Negation filtering.
//!
//! An occurrence is negated when a negation cue in its context places any of
//! the matched tokens inside a negation scope — unless the cue itself sits
//! inside the matched phrase. A term like "Absent speech" contains its own
//! cue word and must never negate itself, while that same cue may still
//! negate co-occurring matches ("absent speech and seizures" negates the
//! seizure mention, not the speech one). To support that distinction the
//! detector reports each cue's position alongside its scope.

use crate::types::Occurrence;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// One detected negation: a cue and the tokens it negates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negation {
    /// Byte span of the cue word within the analyzed text.
    pub cue_start: usize,
    /// End byte offset of the cue (exclusive).
    pub cue_end: usize,
    /// Lowercased token strings inside the cue's scope. Never contains the
    /// cue itself.
    pub tokens: HashSet<String>,
}

/// Collaborator contract: negation-scope detection over a context window.
pub trait NegationDetector: Send + Sync {
    /// Every negation in `context`, with cue positions.
    fn negations(&self, context: &str) -> Vec<Negation>;

    /// Union of all negated token strings, without cue positions.
    fn negated_tokens(&self, context: &str) -> HashSet<String> {
        self.negations(context)
            .into_iter()
            .flat_map(|n| n.tokens)
            .collect()
    }
}

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9']+").expect("Failed to compile word pattern"));

const DEFAULT_CUES: &[&str] = &[
    "no", "not", "without", "never", "absent", "absence", "negative", "denies", "denied",
];

/// Delimiters that terminate a negation scope.
const SCOPE_BREAKERS: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Default detector: a fixed cue list with a bounded forward scope.
///
/// The scope of a cue runs over the following words until a clause delimiter
/// or the scope-length bound, whichever comes first.
#[derive(Debug, Clone)]
pub struct CueScopeDetector {
    cues: HashSet<String>,
    scope_len: usize,
}

impl CueScopeDetector {
    /// Default number of words a cue's scope extends over.
    pub const DEFAULT_SCOPE_LEN: usize = 6;

    /// Create a detector with the default cue list and scope length.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cues: DEFAULT_CUES.iter().map(|c| c.to_string()).collect(),
            scope_len: Self::DEFAULT_SCOPE_LEN,
        }
    }

    /// Replace the cue list.
    #[must_use]
    pub fn with_cues<I, S>(mut self, cues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cues = cues.into_iter().map(|c| c.into().to_lowercase()).collect();
        self
    }

    /// Replace the scope length.
    #[must_use]
    pub fn with_scope_len(mut self, scope_len: usize) -> Self {
        self.scope_len = scope_len;
        self
    }
}

impl Default for CueScopeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl NegationDetector for CueScopeDetector {
    fn negations(&self, context: &str) -> Vec<Negation> {
        let words: Vec<(usize, usize, String)> = WORD_RE
            .find_iter(context)
            .map(|m| (m.start(), m.end(), m.as_str().to_lowercase()))
            .collect();

        let mut negations = Vec::new();
        for (i, (cue_start, cue_end, word)) in words.iter().enumerate() {
            if !self.cues.contains(word) {
                continue;
            }
            let mut tokens = HashSet::new();
            let mut prev_end = *cue_end;
            for (start, end, scoped) in words.iter().skip(i + 1).take(self.scope_len) {
                // a clause delimiter between words closes the scope
                if context[prev_end..*start].contains(SCOPE_BREAKERS) {
                    break;
                }
                tokens.insert(scoped.clone());
                prev_end = *end;
            }
            if !tokens.is_empty() {
                negations.push(Negation {
                    cue_start: *cue_start,
                    cue_end: *cue_end,
                    tokens,
                });
            }
        }
        negations
    }
}

/// Applies a [`NegationDetector`] to an occurrence list.
pub struct NegationFilter<'a> {
    detector: &'a dyn NegationDetector,
}

impl<'a> NegationFilter<'a> {
    /// Create a filter over a detector.
    #[must_use]
    pub fn new(detector: &'a dyn NegationDetector) -> Self {
        Self { detector }
    }

    /// Set the `negated` flag on every occurrence, without removing any.
    ///
    /// Cues whose span lies inside the occurrence's own matched span are
    /// ignored for that occurrence.
    pub fn mark(&self, occurrences: &mut [Occurrence]) {
        for occ in occurrences.iter_mut() {
            let Some(context) = occ.context_text.as_deref() else {
                continue;
            };
            let Some((ctx_start, _)) = occ.context_span else {
                continue;
            };
            let match_rel = (occ.start - ctx_start, occ.end - ctx_start);

            occ.negated = self.detector.negations(context).iter().any(|neg| {
                let cue_inside_match =
                    neg.cue_start >= match_rel.0 && neg.cue_end <= match_rel.1;
                !cue_inside_match
                    && occ
                        .matched_tokens
                        .iter()
                        .any(|t| neg.tokens.contains(t))
            });
        }
    }

    /// Mark and drop negated occurrences.
    #[must_use]
    pub fn filter(&self, mut occurrences: Vec<Occurrence>) -> Vec<Occurrence> {
        self.mark(&mut occurrences);
        occurrences.retain(|o| !o.negated);
        occurrences
    }
}
