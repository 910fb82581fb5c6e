//! The extraction pipeline.
//!
//! [`Extractor`] wires the collaborators together: chunk the input, tokenize
//! and stem each chunk, probe the index, generate and confirm candidate
//! spans, then run the configured post-passes (conflict resolution, negation
//! marking, overlap resolution) over the accumulated occurrences. All
//! reported offsets index the original input text, whatever correction or
//! chunking happened on the way.
//!
//! An extractor is immutable after construction and shares its collaborators
//! behind [`Arc`], so one instance serves concurrent callers without locks.

use crate::candidates::{CandidateConfig, CandidateGenerator};
use crate::conflict::{ConflictResolver, ContextScorer, LexicalOverlapScorer};
use crate::error::{Error, Result};
use crate::index::{IndexBuilder, VocabularyIndex};
use crate::matcher::{MatchContext, Matcher};
use crate::negation::{CueScopeDetector, NegationDetector, NegationFilter};
use crate::overlap::resolve_overlaps;
use crate::spell::{is_correctable, FrequencyCorrector, SpellCorrector};
use crate::stem::{double_stem, Stemmer, SuffixStemmer};
use crate::tokenize::{SimpleTokenizer, Tokenizer};
use crate::types::ResultSet;
use crate::vocab::OntologySource;
use std::collections::BTreeMap;
use std::sync::Arc;

/// How input text is split before tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkStrategy {
    /// Split at phrase delimiters (`.;!?,:` and newline). Phrases that still
    /// exceed the length budget are sub-split by budget.
    #[default]
    Phrase,
    /// Split purely by the length budget, preferring whitespace cut points.
    MaxLength,
}

/// Extraction policy. All knobs have working defaults.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Run the spell corrector over eligible tokens before stemming.
    pub correct_spelling: bool,
    /// Shrink multi-id occurrences to a single id via the context scorer.
    pub resolve_conflicts: bool,
    /// Drop negated occurrences instead of only marking them.
    pub remove_negated: bool,
    /// Drop occurrences shadowed by a wider overlapping one.
    pub remove_overlapping: bool,
    /// Candidate fusion width; see [`CandidateConfig::max_neighbors`].
    pub max_neighbors: usize,
    /// Completeness floor for fused candidates, in `(0, 1]`.
    pub min_completeness: f64,
    /// Sub-combination expansion bound; see
    /// [`CandidateConfig::max_recombination`].
    pub max_recombination: usize,
    /// Maximum chunk length in bytes handed to the tokenizer.
    pub max_length: usize,
    /// Tokens of context captured either side of a match. Zero disables
    /// context capture (and with it negation detection).
    pub context_window: usize,
    /// Chunking strategy.
    pub chunk_by: ChunkStrategy,
    /// Extra synonyms injected at index build, id → phrases. Only honored by
    /// [`Extractor::from_source`], which builds an instance-private index.
    pub custom_synonyms: BTreeMap<String, Vec<String>>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            correct_spelling: true,
            resolve_conflicts: true,
            remove_negated: false,
            remove_overlapping: true,
            max_neighbors: 3,
            min_completeness: 0.20,
            max_recombination: 6,
            max_length: 10_000,
            context_window: 8,
            chunk_by: ChunkStrategy::Phrase,
            custom_synonyms: BTreeMap::new(),
        }
    }
}

impl ExtractorConfig {
    /// Toggle spelling correction.
    #[must_use]
    pub fn with_correct_spelling(mut self, on: bool) -> Self {
        self.correct_spelling = on;
        self
    }

    /// Toggle conflict resolution.
    #[must_use]
    pub fn with_resolve_conflicts(mut self, on: bool) -> Self {
        self.resolve_conflicts = on;
        self
    }

    /// Toggle removal of negated occurrences.
    #[must_use]
    pub fn with_remove_negated(mut self, on: bool) -> Self {
        self.remove_negated = on;
        self
    }

    /// Toggle overlap resolution.
    #[must_use]
    pub fn with_remove_overlapping(mut self, on: bool) -> Self {
        self.remove_overlapping = on;
        self
    }

    /// Set the candidate fusion width.
    #[must_use]
    pub fn with_max_neighbors(mut self, n: usize) -> Self {
        self.max_neighbors = n;
        self
    }

    /// Set the chunk length budget.
    #[must_use]
    pub fn with_max_length(mut self, n: usize) -> Self {
        self.max_length = n;
        self
    }

    /// Set the context window, in tokens per side.
    #[must_use]
    pub fn with_context_window(mut self, n: usize) -> Self {
        self.context_window = n;
        self
    }

    /// Set the chunking strategy.
    #[must_use]
    pub fn with_chunk_by(mut self, strategy: ChunkStrategy) -> Self {
        self.chunk_by = strategy;
        self
    }

    /// Add custom synonyms for one term id.
    #[must_use]
    pub fn with_custom_synonyms<I, S>(mut self, term_id: &str, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_synonyms
            .entry(term_id.to_string())
            .or_default()
            .extend(phrases.into_iter().map(Into::into));
        self
    }

    /// Fail fast on out-of-range knobs.
    pub fn validate(&self) -> Result<()> {
        if self.max_neighbors == 0 {
            return Err(Error::invalid_config("max_neighbors must be at least 1"));
        }
        if self.max_length == 0 {
            return Err(Error::invalid_config("max_length must be at least 1"));
        }
        if !(self.min_completeness > 0.0 && self.min_completeness <= 1.0) {
            return Err(Error::invalid_config(
                "min_completeness must be in (0, 1]",
            ));
        }
        if self.max_recombination == 0 {
            return Err(Error::invalid_config(
                "max_recombination must be at least 1",
            ));
        }
        Ok(())
    }

    fn candidate_config(&self) -> CandidateConfig {
        CandidateConfig {
            max_neighbors: self.max_neighbors,
            min_completeness: self.min_completeness,
            max_recombination: self.max_recombination,
        }
    }
}

/// Outcome of a vocabulary self check; see [`Extractor::self_check`].
#[derive(Debug, Clone, Default)]
pub struct SelfCheckReport {
    /// Term names attempted.
    pub total: usize,
    /// Names whose extraction recalled their own id.
    pub recalled: usize,
    /// Ids whose canonical name failed to recall them.
    pub missed: Vec<String>,
}

impl SelfCheckReport {
    /// Recall ratio in `[0, 1]`; 1.0 for an empty vocabulary.
    #[must_use]
    pub fn recall(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.recalled as f64 / self.total as f64
    }
}

/// Phrase-extraction engine over a [`VocabularyIndex`].
pub struct Extractor {
    index: Arc<VocabularyIndex>,
    config: ExtractorConfig,
    tokenizer: Arc<dyn Tokenizer>,
    stemmer: Arc<dyn Stemmer>,
    corrector: Option<Arc<dyn SpellCorrector>>,
    scorer: Option<Arc<dyn ContextScorer>>,
    detector: Option<Arc<dyn NegationDetector>>,
}

impl Extractor {
    /// Build an extractor from an ontology source with default collaborators.
    ///
    /// The index is instance-private: custom synonyms from `config` are
    /// baked in here and never observed by other extractors. Terms listed by
    /// the source's `root_ids` are masked out. The spell corrector's
    /// vocabulary and the context scorer are both derived from the source's
    /// term names.
    pub fn from_source(source: &dyn OntologySource, config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        let tokenizer = SimpleTokenizer::new();
        let stemmer = SuffixStemmer::new();

        let index = IndexBuilder::new(&tokenizer, &stemmer)
            .with_custom_synonyms(config.custom_synonyms.clone())
            .with_masked_ids(source.root_ids())
            .build(source)?;

        let terms = source.terms()?;
        let corrector = FrequencyCorrector::from_words(
            terms
                .iter()
                .flat_map(|t| std::iter::once(t.name.as_str()).chain(t.synonyms.iter().map(String::as_str)))
                .flat_map(|name| name.split(|c: char| !c.is_alphanumeric()))
                .filter(|w| !w.is_empty()),
        );
        let scorer = LexicalOverlapScorer::from_source(source)?;

        Ok(Self {
            index: Arc::new(index),
            config,
            tokenizer: Arc::new(tokenizer),
            stemmer: Arc::new(stemmer),
            corrector: Some(Arc::new(corrector)),
            scorer: Some(Arc::new(scorer)),
            detector: Some(Arc::new(CueScopeDetector::new())),
        })
    }

    /// Build an extractor over a prebuilt (possibly shared) index.
    ///
    /// No corrector or scorer is installed; add them with the `with_*`
    /// setters. Custom synonyms cannot be honored here — the index is
    /// already built — so a config carrying any is rejected.
    pub fn with_index(index: Arc<VocabularyIndex>, config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        if !config.custom_synonyms.is_empty() {
            return Err(Error::invalid_config(
                "custom synonyms require building the index from a source; use from_source",
            ));
        }
        Ok(Self {
            index,
            config,
            tokenizer: Arc::new(SimpleTokenizer::new()),
            stemmer: Arc::new(SuffixStemmer::new()),
            corrector: None,
            scorer: None,
            detector: Some(Arc::new(CueScopeDetector::new())),
        })
    }

    /// Replace the tokenizer.
    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Replace the stemmer.
    #[must_use]
    pub fn with_stemmer(mut self, stemmer: Arc<dyn Stemmer>) -> Self {
        self.stemmer = stemmer;
        self
    }

    /// Install or replace the spell corrector.
    #[must_use]
    pub fn with_corrector(mut self, corrector: Arc<dyn SpellCorrector>) -> Self {
        self.corrector = Some(corrector);
        self
    }

    /// Install or replace the context-similarity scorer.
    #[must_use]
    pub fn with_scorer(mut self, scorer: Arc<dyn ContextScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Install or replace the negation detector.
    #[must_use]
    pub fn with_detector(mut self, detector: Arc<dyn NegationDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// The index this extractor matches against.
    #[must_use]
    pub fn index(&self) -> &VocabularyIndex {
        &self.index
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract every vocabulary occurrence from `text`.
    ///
    /// Returns occurrences sorted by ascending `(start, end)`. An input with
    /// no matches yields an empty set, not an error.
    pub fn extract(&self, text: &str) -> Result<ResultSet> {
        let mut results = ResultSet::default();
        if text.trim().is_empty() {
            return Ok(results);
        }

        let budget = match self.tokenizer.max_input_len() {
            Some(limit) => self.config.max_length.min(limit),
            None => self.config.max_length,
        };
        let generator = CandidateGenerator::new(self.config.candidate_config());
        let matcher = Matcher::new(&self.index);

        for (offset, chunk) in self.chunks(text, budget) {
            let mut tokens = self.tokenizer.tokenize(chunk)?;
            if tokens.is_empty() {
                continue;
            }
            if self.config.correct_spelling {
                if let Some(corrector) = self.corrector.as_deref() {
                    for token in &mut tokens {
                        let lower = token.text.to_lowercase();
                        if !token.is_punct && !token.is_stop && is_correctable(&lower) {
                            let corrected = corrector.correct(&lower);
                            if corrected != lower {
                                log::debug!("corrected {lower:?} to {corrected:?}");
                                token.lemma = self.tokenizer.lemma(&corrected);
                            }
                        }
                    }
                }
            }
            let stems: Vec<String> = tokens
                .iter()
                .map(|t| double_stem(self.stemmer.as_ref(), &t.lemma))
                .collect();

            let ctx = MatchContext {
                tokens: &tokens,
                stems: &stems,
                chunk_text: chunk,
                base_offset: offset,
                context_window: self.config.context_window,
            };
            results.extend(matcher.find_matches(&generator, &ctx));
        }

        if self.config.resolve_conflicts {
            ConflictResolver::new(self.scorer.as_deref()).resolve(results.as_mut_slice());
        }
        if let Some(detector) = self.detector.as_deref() {
            NegationFilter::new(detector).mark(results.as_mut_slice());
            if self.config.remove_negated {
                results.retain(|o| !o.negated);
            }
        }
        if self.config.remove_overlapping {
            let resolved = resolve_overlaps(results.into_vec());
            let mut rebuilt = ResultSet::default();
            rebuilt.replace(resolved);
            results = rebuilt;
        }
        results.sort_by_span();
        Ok(results)
    }

    /// Run every term name in `source` back through extraction and report
    /// how many recall their own id. A smoke test for vocabulary drift:
    /// names that tokenize or stem into oblivion show up in `missed`.
    pub fn self_check(&self, source: &dyn OntologySource) -> Result<SelfCheckReport> {
        let mut report = SelfCheckReport::default();
        for term in source.terms()? {
            if !self.index.contains_term(&term.id) {
                continue; // masked or skipped at build
            }
            report.total += 1;
            let found = self.extract(&term.name)?;
            if found.term_ids().contains(&term.id.as_str()) {
                report.recalled += 1;
            } else {
                report.missed.push(term.id);
            }
        }
        log::info!(
            "self check: {}/{} names recalled their id",
            report.recalled,
            report.total
        );
        Ok(report)
    }

    /// Split `text` into `(byte_offset, chunk)` pairs per the configured
    /// strategy, each chunk within `budget` bytes.
    fn chunks<'t>(&self, text: &'t str, budget: usize) -> Vec<(usize, &'t str)> {
        match self.config.chunk_by {
            ChunkStrategy::Phrase => {
                let mut out = Vec::new();
                let mut start = 0;
                for (i, c) in text.char_indices() {
                    if matches!(c, '.' | ';' | '!' | '?' | ',' | ':' | '\n') {
                        push_within_budget(text, start, i, budget, &mut out);
                        start = i + c.len_utf8();
                    }
                }
                push_within_budget(text, start, text.len(), budget, &mut out);
                out
            }
            ChunkStrategy::MaxLength => {
                let mut out = Vec::new();
                push_within_budget(text, 0, text.len(), budget, &mut out);
                out
            }
        }
    }
}

/// Append `text[start..end]`, sub-splitting by `budget` bytes at whitespace
/// where possible. Empty and all-whitespace pieces are dropped.
fn push_within_budget<'t>(
    text: &'t str,
    start: usize,
    end: usize,
    budget: usize,
    out: &mut Vec<(usize, &'t str)>,
) {
    let mut lo = start;
    while lo < end {
        if text[lo..end].trim().is_empty() {
            return;
        }
        let mut hi = if end - lo <= budget { end } else { lo + budget };
        // never cut inside a UTF-8 sequence
        while hi < end && !text.is_char_boundary(hi) {
            hi -= 1;
        }
        if hi < end {
            // prefer the last whitespace before the cut
            if let Some(ws) = text[lo..hi].rfind(char::is_whitespace) {
                if ws > 0 {
                    hi = lo + ws;
                }
            }
        }
        if hi == lo {
            // a single unbreakable run longer than the budget: hard cut at
            // the next char boundary so progress is always made
            hi = lo + budget.min(end - lo);
            while hi < end && !text.is_char_boundary(hi) {
                hi += 1;
            }
        }
        let piece = &text[lo..hi];
        if !piece.trim().is_empty() {
            out.push((lo, piece));
        }
        lo = hi;
    }
}
