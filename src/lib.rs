//! # ontotag
//!
//! Controlled-vocabulary concept extraction from free text.
//!
//! `ontotag` finds mentions of vocabulary terms (symptoms, findings, any
//! curated phrase list) in noisy prose and reports them with byte-accurate
//! source offsets. Matching runs against a prebuilt **stemmed-signature
//! index**: every name variant of every term is reduced to the sorted stems
//! of its content words, so a single exact lookup recognizes a phrase under
//! word-order changes ("delay in development"), inflection ("delayed"), and
//! interleaved filler words — without fuzzy scoring at query time.
//!
//! ```text
//!   text ─ chunk ─ tokenize ─ [spell-correct] ─ stem ─┐
//!                                                     │ probe
//!   index: stem → len → signature → ids  ◄────────────┘
//!                                                     │ confirm
//!   occurrences ─ conflicts ─ negation ─ overlaps ─► ResultSet
//! ```
//!
//! ## Quick start
//!
//! ```
//! use ontotag::{Extractor, ExtractorConfig, InMemoryOntology, Term};
//!
//! let vocabulary = InMemoryOntology::new(vec![
//!     Term::new("HP:0001290", "Hypotonia"),
//!     Term::new("HP:0001263", "Developmental delay"),
//! ]);
//! let extractor = Extractor::from_source(&vocabulary, ExtractorConfig::default())?;
//!
//! let found = extractor.extract("Exam shows hypotonia and developmental delay.")?;
//! assert_eq!(found.len(), 2);
//! assert_eq!(found.as_slice()[0].term_ids, ["HP:0001290"]);
//! # Ok::<(), ontotag::Error>(())
//! ```
//!
//! ## Collaborators
//!
//! Every stage with a domain-specific default sits behind a trait, so a
//! deployment can swap in its own machinery without touching the engine:
//!
//! | Trait | Default | Concern |
//! |-------|---------|---------|
//! | [`Tokenizer`] | [`SimpleTokenizer`] | tokens, lemmas, stop words |
//! | [`Stemmer`] | [`SuffixStemmer`] | suffix stripping |
//! | [`SpellCorrector`] | [`FrequencyCorrector`] | typo repair |
//! | [`ContextScorer`] | [`LexicalOverlapScorer`] | ambiguous-id resolution |
//! | [`NegationDetector`] | [`CueScopeDetector`] | negation scopes |
//! | [`OntologySource`] | [`InMemoryOntology`] | vocabulary supply |
//!
//! An [`Extractor`] is immutable after construction and shares its state via
//! `Arc`, so one instance serves concurrent callers; two extractors never
//! share mutable state, so per-call options (custom synonyms included) can
//! never leak between instances.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod candidates;
pub mod conflict;
pub mod error;
pub mod extract;
pub mod index;
pub mod matcher;
pub mod negation;
pub mod overlap;
pub mod spell;
pub mod stem;
pub mod tokenize;
pub mod types;
pub mod vocab;

pub use candidates::{CandidateConfig, CandidateGenerator};
pub use conflict::{ConflictResolver, ContextScorer, LexicalOverlapScorer};
pub use error::{Error, Result};
pub use extract::{ChunkStrategy, Extractor, ExtractorConfig, SelfCheckReport};
pub use index::{build_index, IndexBuilder, VocabularyIndex};
pub use negation::{CueScopeDetector, Negation, NegationDetector, NegationFilter};
pub use overlap::resolve_overlaps;
pub use spell::{FrequencyCorrector, SpellCorrector};
pub use stem::{double_stem, Stemmer, SuffixStemmer};
pub use tokenize::{SimpleTokenizer, Token, Tokenizer};
pub use types::{Occurrence, ResultSet};
pub use vocab::{InMemoryOntology, OntologySource, Term};

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::extract::{ChunkStrategy, Extractor, ExtractorConfig};
    pub use crate::index::VocabularyIndex;
    pub use crate::types::{Occurrence, ResultSet};
    pub use crate::vocab::{InMemoryOntology, OntologySource, Term};
}
