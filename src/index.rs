//! The vocabulary index ("search tree"): `stem -> phrase length -> sorted
//! stem signature -> term ids`.
//!
//! Built once from an [`OntologySource`], immutable afterwards, and safe to
//! share across concurrent extraction calls behind an `Arc`. Every name
//! variant of every term is reduced to a *stem signature* — the
//! lexicographically sorted, space-joined stems of its content tokens — and
//! filed under each member stem. Word-order permutations of a phrase all
//! reduce to the same signature, which is what makes "delay developmental"
//! find "Developmental delay" with a single exact lookup.
//!
//! Determinism contract: building twice from the same inputs yields equal
//! structures, including the insertion order of ids within a bucket (ties
//! follow the source's term iteration order). All maps are `BTreeMap`s so the
//! serialized form is byte-stable too.

use crate::error::{Error, Result};
use crate::stem::{double_stem, Stemmer};
use crate::tokenize::Tokenizer;
use crate::vocab::OntologySource;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Lexical substitutions applied during variant expansion. Clinical text
/// often says "disorder" where the vocabulary says "abnormality".
const LEXICAL_SUBSTITUTIONS: &[(&str, &str)] =
    &[("Abnormality", "Disorder"), ("abnormality", "disorder")];

/// Immutable stemmed-signature index over a controlled vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyIndex {
    /// stem -> phrase length -> sorted signature -> term ids (insertion order).
    buckets: BTreeMap<String, BTreeMap<usize, BTreeMap<String, Vec<String>>>>,
    /// Every term id that contributed at least one entry.
    term_ids: BTreeSet<String>,
}

impl VocabularyIndex {
    /// Exact signature lookup. `None` is an ordinary miss, not an error.
    #[must_use]
    pub fn lookup(&self, stem: &str, len: usize, signature: &str) -> Option<&[String]> {
        self.buckets
            .get(stem)?
            .get(&len)?
            .get(signature)
            .map(Vec::as_slice)
    }

    /// Whether any indexed signature contains this stem.
    #[must_use]
    pub fn contains_stem(&self, stem: &str) -> bool {
        self.buckets.contains_key(stem)
    }

    /// Whether this term id contributed any entry.
    #[must_use]
    pub fn contains_term(&self, id: &str) -> bool {
        self.term_ids.contains(id)
    }

    /// Number of distinct indexed terms.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.term_ids.len()
    }

    /// Number of distinct root stems.
    #[must_use]
    pub fn stem_count(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the index holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Serialize to JSON. Round-tripping through [`Self::from_json`]
    /// reproduces identical lookup results.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON produced by [`Self::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the serialized index to a writer.
    pub fn save_to<W: std::io::Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Read an index previously written with [`Self::save_to`].
    pub fn load_from<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Idempotent bucket insert: appends `id` unless already present.
    fn insert(&mut self, stem: &str, len: usize, signature: &str, id: &str) {
        let ids = self
            .buckets
            .entry(stem.to_string())
            .or_default()
            .entry(len)
            .or_default()
            .entry(signature.to_string())
            .or_default();
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
        self.term_ids.insert(id.to_string());
    }
}

/// Builder for [`VocabularyIndex`].
///
/// Custom synonyms are a `BTreeMap` rather than a `HashMap` so merge order —
/// and with it the built structure — never depends on hasher state.
pub struct IndexBuilder<'a> {
    tokenizer: &'a dyn Tokenizer,
    stemmer: &'a dyn Stemmer,
    custom_synonyms: BTreeMap<String, Vec<String>>,
    masked_ids: BTreeSet<String>,
}

impl<'a> IndexBuilder<'a> {
    /// Create a builder over the given collaborators.
    pub fn new(tokenizer: &'a dyn Tokenizer, stemmer: &'a dyn Stemmer) -> Self {
        Self {
            tokenizer,
            stemmer,
            custom_synonyms: BTreeMap::new(),
            masked_ids: BTreeSet::new(),
        }
    }

    /// Merge extra synonyms into terms before indexing.
    ///
    /// Entries whose term id is masked or absent from the vocabulary are
    /// skipped silently; callers opt into extra recall, they do not extend
    /// the vocabulary itself.
    #[must_use]
    pub fn with_custom_synonyms(mut self, synonyms: BTreeMap<String, Vec<String>>) -> Self {
        self.custom_synonyms = synonyms;
        self
    }

    /// Exclude these term ids from indexing entirely.
    #[must_use]
    pub fn with_masked_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.masked_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Build the index.
    ///
    /// Either fully succeeds or propagates the underlying failure — a
    /// partial index is never returned. Individual name variants that reduce
    /// to an empty signature are skipped with a debug log.
    pub fn build(&self, source: &dyn OntologySource) -> Result<VocabularyIndex> {
        let terms = source.terms()?;
        let mut index = VocabularyIndex::default();
        let mut skipped_variants = 0usize;

        for term in &terms {
            if self.masked_ids.contains(&term.id) {
                continue;
            }
            let mut names: Vec<&str> = Vec::with_capacity(1 + term.synonyms.len());
            names.push(&term.name);
            names.extend(term.synonyms.iter().map(String::as_str));
            if let Some(extra) = self.custom_synonyms.get(&term.id) {
                names.extend(extra.iter().map(String::as_str));
            }

            for name in names {
                for variant in name_variants(name) {
                    match self.signature_stems(&variant) {
                        Ok(stems) => {
                            let signature = sorted_signature(&stems);
                            let mut seen = BTreeSet::new();
                            for stem in &stems {
                                if seen.insert(stem.as_str()) {
                                    index.insert(stem, stems.len(), &signature, &term.id);
                                }
                            }
                        }
                        Err(Error::MalformedVocabulary(_)) => {
                            skipped_variants += 1;
                            log::debug!("skipping unusable variant {variant:?} of {}", term.id);
                        }
                        Err(other) => return Err(other),
                    }
                }
            }
        }

        log::info!(
            "indexed {} terms into {} stem buckets ({} variants skipped)",
            index.term_count(),
            index.stem_count(),
            skipped_variants
        );
        Ok(index)
    }

    /// Content-token stems of one name variant, in surface order.
    fn signature_stems(&self, variant: &str) -> Result<Vec<String>> {
        let tokens = self.tokenizer.tokenize(variant)?;
        let stems: Vec<String> = tokens
            .iter()
            .filter(|t| t.is_content())
            .map(|t| double_stem(self.stemmer, &t.lemma))
            .collect();
        if stems.is_empty() {
            return Err(Error::malformed_vocabulary(format!(
                "no content tokens in {variant:?}"
            )));
        }
        Ok(stems)
    }
}

/// Build an index with default masking (the source's declared root concepts)
/// and no custom synonyms.
pub fn build_index(
    source: &dyn OntologySource,
    tokenizer: &dyn Tokenizer,
    stemmer: &dyn Stemmer,
) -> Result<VocabularyIndex> {
    IndexBuilder::new(tokenizer, stemmer)
        .with_masked_ids(source.root_ids())
        .build(source)
}

/// Sorted, space-joined signature over a stem list.
#[must_use]
pub fn sorted_signature(stems: &[String]) -> String {
    let mut sorted: Vec<&str> = stems.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join(" ")
}

/// Lexical-expansion variants of one name: the name itself, case variants,
/// comma removal, hyphen splitting, and domain substitutions. Order is
/// stable; duplicates are suppressed.
fn name_variants(name: &str) -> Vec<String> {
    let mut bases: Vec<String> = vec![name.to_string()];
    for (from, to) in LEXICAL_SUBSTITUTIONS {
        if name.contains(from) {
            bases.push(name.replace(from, to));
        }
    }

    let mut variants: Vec<String> = Vec::new();
    let mut push = |v: String| {
        if !v.trim().is_empty() && !variants.contains(&v) {
            variants.push(v);
        }
    };
    for base in &bases {
        push(base.clone());
        push(base.to_lowercase());
        push(capitalized(base));
        push(title_case(base));
        if base.contains(',') {
            push(base.replace(',', ""));
        }
        if base.contains('-') {
            push(base.replace('-', " "));
        }
    }
    variants
}

fn capitalized(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(capitalized)
        .collect::<Vec<_>>()
        .join(" ")
}
