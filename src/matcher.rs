//! The matcher: candidate position subsets in, raw occurrences out.
//!
//! Each candidate subset is reduced to its stem signature and looked up in
//! the index with one exact probe. A miss is ordinary ("no match for this
//! candidate"), never an error. On a hit the matcher copies the bucket's id
//! list — never aliases it — so downstream conflict resolution can shrink
//! occurrence id lists without corrupting the shared index.

use crate::candidates::CandidateGenerator;
use crate::index::{sorted_signature, VocabularyIndex};
use crate::tokenize::Token;
use crate::types::Occurrence;
use std::collections::{BTreeSet, HashSet};

/// Per-chunk inputs the matcher works over.
pub struct MatchContext<'a> {
    /// Tokens of the chunk, in order.
    pub tokens: &'a [Token],
    /// Double-stemmed lemma per token, parallel to `tokens`.
    pub stems: &'a [String],
    /// The chunk text itself (tokens' offsets index into it).
    pub chunk_text: &'a str,
    /// Byte offset of the chunk within the original input.
    pub base_offset: usize,
    /// Tokens of context to capture on each side of a match.
    pub context_window: usize,
}

/// Confirms candidate subsets against a [`VocabularyIndex`].
pub struct Matcher<'a> {
    index: &'a VocabularyIndex,
}

impl<'a> Matcher<'a> {
    /// Create a matcher over an index.
    #[must_use]
    pub fn new(index: &'a VocabularyIndex) -> Self {
        Self { index }
    }

    /// Token positions whose stem appears anywhere in the index.
    #[must_use]
    pub fn probe_positions(&self, ctx: &MatchContext<'_>) -> Vec<usize> {
        ctx.stems
            .iter()
            .enumerate()
            .filter(|(_, stem)| self.index.contains_stem(stem))
            .map(|(i, _)| i)
            .collect()
    }

    /// Run candidate generation and confirm every subset, deduplicated.
    #[must_use]
    pub fn find_matches(
        &self,
        generator: &CandidateGenerator,
        ctx: &MatchContext<'_>,
    ) -> Vec<Occurrence> {
        let positions = self.probe_positions(ctx);
        if positions.is_empty() {
            return Vec::new();
        }
        self.confirm(&generator.candidates(&positions), ctx)
    }

    /// Confirm a prepared candidate set against the index.
    #[must_use]
    pub fn confirm(
        &self,
        candidates: &BTreeSet<Vec<usize>>,
        ctx: &MatchContext<'_>,
    ) -> Vec<Occurrence> {
        let mut occurrences = Vec::new();
        let mut seen: HashSet<(usize, usize, Vec<String>)> = HashSet::new();

        for candidate in candidates {
            // drop filler positions that slipped into the span
            let content: Vec<usize> = candidate
                .iter()
                .copied()
                .filter(|&p| ctx.tokens[p].is_content())
                .collect();
            let Some(&first) = content.first() else {
                continue;
            };

            let stems: Vec<String> = content.iter().map(|&p| ctx.stems[p].clone()).collect();
            let signature = sorted_signature(&stems);
            let Some(ids) = self.index.lookup(&ctx.stems[first], stems.len(), &signature) else {
                continue;
            };

            // surface extent uses the unstripped subset, so interleaved
            // filler words stay part of the matched text
            let lo = &ctx.tokens[*candidate.first().expect("candidate non-empty")];
            let hi = &ctx.tokens[*candidate.last().expect("candidate non-empty")];
            let start = ctx.base_offset + lo.start;
            let end = ctx.base_offset + hi.end;

            let key = (start, end, ids.to_vec());
            if !seen.insert(key) {
                continue;
            }

            let (context_text, context_span) = self.context_window(ctx, lo.index, hi.index);

            occurrences.push(Occurrence {
                term_ids: ids.to_vec(),
                start,
                end,
                matched_text: ctx.chunk_text[lo.start..hi.end].to_string(),
                context_text,
                negated: false,
                context_span,
                matched_tokens: candidate
                    .iter()
                    .map(|&p| ctx.tokens[p].text.to_lowercase())
                    .collect(),
            });
        }

        occurrences
    }

    /// Context window of `context_window` tokens either side, clipped to the
    /// chunk. `None` when no window is configured.
    fn context_window(
        &self,
        ctx: &MatchContext<'_>,
        lo_index: usize,
        hi_index: usize,
    ) -> (Option<String>, Option<(usize, usize)>) {
        if ctx.context_window == 0 {
            return (None, None);
        }
        let first = lo_index.saturating_sub(ctx.context_window);
        let last = (hi_index + ctx.context_window).min(ctx.tokens.len() - 1);
        let start = ctx.tokens[first].start;
        let end = ctx.tokens[last].end;
        (
            Some(ctx.chunk_text[start..end].to_string()),
            Some((ctx.base_offset + start, ctx.base_offset + end)),
        )
    }
}
