//! Occurrence and result-set types.

use serde::{Deserialize, Serialize};

/// One confirmed concept mention.
///
/// `start`/`end` are byte offsets into the original input text (exclusive
/// end). `term_ids` holds one or more candidate identifiers; conflict
/// resolution may shrink the list in place but never reorders survivors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Candidate term identifiers, in index bucket order. At least one.
    pub term_ids: Vec<String>,
    /// Start byte offset in the original input.
    pub start: usize,
    /// End byte offset in the original input (exclusive).
    pub end: usize,
    /// Matched surface text, exactly as it appears in the input.
    pub matched_text: String,
    /// Context window around the match, when a window was configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_text: Option<String>,
    /// Set by the negation filter; inspectable before removal.
    #[serde(skip)]
    pub negated: bool,
    /// Absolute span of `context_text` in the input. Internal.
    #[serde(skip)]
    pub(crate) context_span: Option<(usize, usize)>,
    /// Lowercased surface forms of the matched tokens. Internal; used by the
    /// negation filter's intersection check.
    #[serde(skip)]
    pub(crate) matched_tokens: Vec<String>,
}

impl Occurrence {
    /// Width of the matched span in bytes.
    #[must_use]
    pub fn width(&self) -> usize {
        self.end - self.start
    }

    /// Whether this occurrence's span overlaps another's.
    #[must_use]
    pub fn overlaps(&self, other: &Occurrence) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }
}

/// Ordered collection of occurrences from one extraction call.
///
/// Sorted by ascending start offset (then end offset) before being returned;
/// owns its backing vector exclusively for the duration of the call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSet {
    occurrences: Vec<Occurrence>,
}

impl ResultSet {
    /// Number of occurrences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    /// Whether no occurrences were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Occurrences as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// Iterate over occurrences.
    pub fn iter(&self) -> std::slice::Iter<'_, Occurrence> {
        self.occurrences.iter()
    }

    /// Consume into the backing vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Occurrence> {
        self.occurrences
    }

    /// All term ids across all occurrences, in result order.
    #[must_use]
    pub fn term_ids(&self) -> Vec<&str> {
        self.occurrences
            .iter()
            .flat_map(|o| o.term_ids.iter().map(String::as_str))
            .collect()
    }

    pub(crate) fn push(&mut self, occurrence: Occurrence) {
        self.occurrences.push(occurrence);
    }

    pub(crate) fn extend(&mut self, occurrences: impl IntoIterator<Item = Occurrence>) {
        self.occurrences.extend(occurrences);
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Occurrence] {
        &mut self.occurrences
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&Occurrence) -> bool) {
        self.occurrences.retain(keep);
    }

    pub(crate) fn replace(&mut self, occurrences: Vec<Occurrence>) {
        self.occurrences = occurrences;
    }

    /// Stable sort by `(start, end)`.
    pub(crate) fn sort_by_span(&mut self) {
        self.occurrences.sort_by_key(|o| (o.start, o.end));
    }
}

impl IntoIterator for ResultSet {
    type Item = Occurrence;
    type IntoIter = std::vec::IntoIter<Occurrence>;

    fn into_iter(self) -> Self::IntoIter {
        self.occurrences.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Occurrence;
    type IntoIter = std::slice::Iter<'a, Occurrence>;

    fn into_iter(self) -> Self::IntoIter {
        self.occurrences.iter()
    }
}
