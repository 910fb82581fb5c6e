//! Conflict resolution for ambiguous matches.
//!
//! A surface form can map to several term ids (shared synonyms, collapsed
//! stems). The resolver scores each candidate id against the occurrence's
//! context and eliminates the weakest, one per iteration, until a single id
//! remains. Elimination is deterministic: on a tied minimum the
//! highest-indexed tied id is dropped, so a fully tied list keeps its first
//! id — which is the index bucket's insertion order, itself stable.
//!
//! When no similarity oracle is installed the resolver leaves id lists
//! untouched and logs a warning once per call: availability over precision,
//! chosen explicitly rather than by accident.

use crate::types::Occurrence;
use crate::vocab::OntologySource;
use std::collections::BTreeMap;
use std::collections::HashSet;

/// Collaborator contract: how well does a term fit a context?
///
/// Higher is better. Scores only compete within one occurrence, so any
/// monotone scale works.
pub trait ContextScorer: Send + Sync {
    /// Score `term_id` given the surrounding context text.
    fn score(&self, term_id: &str, context: &str) -> f64;
}

/// Shrinks multi-id occurrences to a single best-supported id.
pub struct ConflictResolver<'a> {
    scorer: Option<&'a dyn ContextScorer>,
}

impl<'a> ConflictResolver<'a> {
    /// Create a resolver over an optional similarity oracle.
    #[must_use]
    pub fn new(scorer: Option<&'a dyn ContextScorer>) -> Self {
        Self { scorer }
    }

    /// Resolve every ambiguous occurrence in place.
    ///
    /// Single-id occurrences are untouched; the occurrence list is never
    /// reordered. An occurrence with no context is scored against the empty
    /// string, which degenerates to keeping the first id.
    pub fn resolve(&self, occurrences: &mut [Occurrence]) {
        let Some(scorer) = self.scorer else {
            if occurrences.iter().any(|o| o.term_ids.len() > 1) {
                log::warn!(
                    "no context-similarity oracle installed; leaving ambiguous id lists unresolved"
                );
            }
            return;
        };

        for occ in occurrences.iter_mut().filter(|o| o.term_ids.len() > 1) {
            let context = occ.context_text.as_deref().unwrap_or("");
            let mut scores: Vec<f64> = occ
                .term_ids
                .iter()
                .map(|id| scorer.score(id, context))
                .collect();
            while occ.term_ids.len() > 1 {
                // lowest score loses; `<=` lets later ties claim the drop
                // slot so earlier ids survive a full tie
                let mut drop = 0;
                for i in 1..scores.len() {
                    if scores[i] <= scores[drop] {
                        drop = i;
                    }
                }
                occ.term_ids.remove(drop);
                scores.remove(drop);
            }
        }
    }
}

/// Default similarity oracle: word-overlap (Jaccard) between the term's
/// canonical name and the context, after stop-word removal.
///
/// Crude but dependency-free; deployments with a trained similarity model
/// implement [`ContextScorer`] over it instead.
#[derive(Debug, Clone, Default)]
pub struct LexicalOverlapScorer {
    names: BTreeMap<String, String>,
}

impl LexicalOverlapScorer {
    /// Build from explicit id → canonical-name pairs.
    #[must_use]
    pub fn new(names: BTreeMap<String, String>) -> Self {
        Self { names }
    }

    /// Build from an ontology source's canonical names.
    pub fn from_source(source: &dyn OntologySource) -> crate::Result<Self> {
        let names = source
            .terms()?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();
        Ok(Self { names })
    }

    fn content_words(text: &str) -> HashSet<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .filter(|w| !crate::tokenize::is_stop_word(w))
            .collect()
    }
}

impl ContextScorer for LexicalOverlapScorer {
    fn score(&self, term_id: &str, context: &str) -> f64 {
        let Some(name) = self.names.get(term_id) else {
            return 0.0;
        };
        let a = Self::content_words(name);
        let b = Self::content_words(context);
        let union = a.union(&b).count();
        if union == 0 {
            return 0.0;
        }
        a.intersection(&b).count() as f64 / union as f64
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn resolution_always_leaves_one_id(scores in proptest::collection::vec(0.0f64..1.0, 2..6)) {
            struct VecScorer(Vec<f64>);
            impl ContextScorer for VecScorer {
                fn score(&self, term_id: &str, _context: &str) -> f64 {
                    let i: usize = term_id.parse().unwrap_or(0);
                    self.0.get(i).copied().unwrap_or(0.0)
                }
            }
            let ids: Vec<String> = (0..scores.len()).map(|i| i.to_string()).collect();
            let mut occs = vec![Occurrence {
                term_ids: ids,
                start: 0,
                end: 1,
                matched_text: String::new(),
                context_text: Some("ctx".into()),
                negated: false,
                context_span: None,
                matched_tokens: Vec::new(),
            }];
            let scorer = VecScorer(scores);
            ConflictResolver::new(Some(&scorer)).resolve(&mut occs);
            prop_assert_eq!(occs[0].term_ids.len(), 1);
        }
    }
}
