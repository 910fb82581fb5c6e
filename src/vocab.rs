//! Vocabulary terms and the ontology-source collaborator.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One controlled-vocabulary concept.
///
/// Immutable once the index is built; the engine never mutates terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Opaque stable identifier, unique within the vocabulary.
    pub id: String,
    /// Canonical name.
    pub name: String,
    /// Synonyms, in vocabulary order. May be empty.
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl Term {
    /// Create a term with no synonyms.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            synonyms: Vec::new(),
        }
    }

    /// Attach synonyms.
    #[must_use]
    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }
}

/// Collaborator contract: supplies the vocabulary the index is built from.
///
/// Iteration order must be stable and repeatable; bucket id order (and with
/// it every deterministic tie-break downstream) derives from it.
pub trait OntologySource: Send + Sync {
    /// All terms, in a stable order.
    fn terms(&self) -> Result<Vec<Term>>;

    /// Identifiers of overly generic root concepts, masked from indexing by
    /// default. Empty when the vocabulary has no such roots.
    fn root_ids(&self) -> Vec<String> {
        Vec::new()
    }
}

/// In-memory ontology source, mainly for tests and small vocabularies.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOntology {
    terms: Vec<Term>,
    roots: Vec<String>,
}

impl InMemoryOntology {
    /// Create a source over a fixed term list. Order is preserved.
    #[must_use]
    pub fn new(terms: Vec<Term>) -> Self {
        Self {
            terms,
            roots: Vec::new(),
        }
    }

    /// Declare generic root concepts to mask by default.
    #[must_use]
    pub fn with_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roots = roots.into_iter().map(Into::into).collect();
        self
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the vocabulary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl OntologySource for InMemoryOntology {
    fn terms(&self) -> Result<Vec<Term>> {
        Ok(self.terms.clone())
    }

    fn root_ids(&self) -> Vec<String> {
        self.roots.clone()
    }
}
