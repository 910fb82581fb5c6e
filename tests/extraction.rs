//! End-to-end extraction behavior over a small clinical vocabulary.

use ontotag::{
    build_index, Error, Extractor, ExtractorConfig, InMemoryOntology, Result, SimpleTokenizer,
    SuffixStemmer, Term, Token, Tokenizer,
};
use std::sync::Arc;

fn vocabulary() -> InMemoryOntology {
    InMemoryOntology::new(vec![
        Term::new("HP:0001290", "Hypotonia"),
        Term::new("HP:0001263", "Developmental delay"),
        Term::new("HP:0000750", "Speech delay"),
        Term::new("HP:0600001", "Severe speech delay"),
        Term::new("HP:0000347", "Absent speech"),
        Term::new("HP:0000256", "Macrocephaly").with_synonyms(["Large head"]),
        Term::new("HP:0001355", "Megalencephaly").with_synonyms(["Large head"]),
        Term::new("HP:0001250", "Seizure"),
    ])
}

fn extractor() -> Extractor {
    Extractor::from_source(&vocabulary(), ExtractorConfig::default()).unwrap()
}

fn extractor_with(config: ExtractorConfig) -> Extractor {
    Extractor::from_source(&vocabulary(), config).unwrap()
}

#[test]
fn single_token_term_with_exact_span() {
    let found = extractor().extract("hypotonia").unwrap();
    assert_eq!(found.len(), 1);
    let occ = &found.as_slice()[0];
    assert_eq!(occ.term_ids, ["HP:0001290"]);
    assert_eq!((occ.start, occ.end), (0, 9));
    assert_eq!(occ.matched_text, "hypotonia");
}

#[test]
fn word_order_does_not_matter() {
    let forward = extractor().extract("developmental delay").unwrap();
    let reversed = extractor().extract("delay developmental").unwrap();
    assert_eq!(forward.term_ids(), ["HP:0001263"]);
    assert_eq!(reversed.term_ids(), ["HP:0001263"]);
}

#[test]
fn inflection_does_not_matter() {
    for text in ["delayed development", "delays in development", "developmental delays"] {
        let found = extractor().extract(text).unwrap();
        assert_eq!(found.term_ids(), ["HP:0001263"], "failed on {text:?}");
    }
    // adjectival form of a single-token term
    let found = extractor().extract("hypotonic").unwrap();
    assert_eq!(found.term_ids(), ["HP:0001290"]);
}

#[test]
fn multiple_terms_reported_separately_in_order() {
    let text = "hypotonia, developmental delay";
    let found = extractor().extract(text).unwrap();
    assert_eq!(found.len(), 2);
    let occs = found.as_slice();
    assert_eq!(occs[0].term_ids, ["HP:0001290"]);
    assert_eq!(&text[occs[0].start..occs[0].end], "hypotonia");
    assert_eq!(occs[1].term_ids, ["HP:0001263"]);
    assert_eq!(&text[occs[1].start..occs[1].end], "developmental delay");
}

#[test]
fn negation_marks_but_does_not_remove_by_default() {
    let found = extractor().extract("no developmental delay").unwrap();
    assert_eq!(found.len(), 1);
    assert!(found.as_slice()[0].negated);
}

#[test]
fn negated_occurrences_removed_on_request() {
    let ex = extractor_with(ExtractorConfig::default().with_remove_negated(true));
    assert!(ex.extract("no developmental delay").unwrap().is_empty());
    // an unnegated mention in the same text survives
    let found = ex
        .extract("no developmental delay. hypotonia present")
        .unwrap();
    assert_eq!(found.term_ids(), ["HP:0001290"]);
}

#[test]
fn term_containing_its_own_cue_is_not_self_negated() {
    let found = extractor().extract("Absent speech").unwrap();
    assert_eq!(found.term_ids(), ["HP:0000347"]);
    assert!(!found.as_slice()[0].negated);
}

#[test]
fn in_phrase_cue_still_negates_neighboring_match() {
    let found = extractor().extract("absent speech and seizures").unwrap();
    assert_eq!(found.len(), 2);
    for occ in &found {
        match occ.term_ids[0].as_str() {
            "HP:0000347" => assert!(!occ.negated, "self-negated"),
            "HP:0001250" => assert!(occ.negated, "cue should reach the neighbor"),
            other => panic!("unexpected id {other}"),
        }
    }
}

#[test]
fn neighbor_fusion_bridges_interleaved_filler() {
    // "and" is a stop word between the two content tokens
    let text = "developmental and delay";

    let narrow = extractor_with(ExtractorConfig::default().with_max_neighbors(1));
    assert!(narrow.extract(text).unwrap().is_empty());

    let found = extractor().extract(text).unwrap();
    assert_eq!(found.term_ids(), ["HP:0001263"]);
    assert_eq!(found.as_slice()[0].matched_text, text);
}

#[test]
fn widest_overlapping_span_wins() {
    let found = extractor().extract("severe speech delay").unwrap();
    assert_eq!(found.term_ids(), ["HP:0600001"]);
}

#[test]
fn overlap_removal_can_be_disabled() {
    let ex = extractor_with(ExtractorConfig::default().with_remove_overlapping(false));
    let found = ex.extract("severe speech delay").unwrap();
    let mut ids = found.term_ids();
    ids.sort_unstable();
    assert_eq!(ids, ["HP:0000750", "HP:0600001"]);
}

#[test]
fn custom_synonyms_are_instance_private() {
    let with_synonym = extractor_with(
        ExtractorConfig::default().with_custom_synonyms("HP:0001290", ["floppy infant"]),
    );
    assert_eq!(
        with_synonym.extract("floppy infant").unwrap().term_ids(),
        ["HP:0001290"]
    );

    // a plain extractor built afterwards must not see the synonym
    assert!(extractor().extract("floppy infant").unwrap().is_empty());
}

#[test]
fn conflict_resolution_does_not_leak_across_instances() {
    // "Large head" is a synonym of two different terms
    let resolved = extractor().extract("large head").unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved.as_slice()[0].term_ids.len(), 1);

    let unresolved = extractor_with(ExtractorConfig::default().with_resolve_conflicts(false));
    let found = unresolved.extract("large head").unwrap();
    assert_eq!(found.as_slice()[0].term_ids.len(), 2);

    // and a third instance resolves again
    let resolved_again = extractor().extract("large head").unwrap();
    assert_eq!(resolved_again.as_slice()[0].term_ids.len(), 1);
}

#[test]
fn ambiguous_resolution_is_deterministic() {
    // lexical overlap ties on "large head"; the bucket's first id must win,
    // run after run
    let first = extractor().extract("large head").unwrap();
    for _ in 0..5 {
        let again = extractor().extract("large head").unwrap();
        assert_eq!(again.as_slice()[0].term_ids, first.as_slice()[0].term_ids);
    }
}

#[test]
fn typo_corrected_but_spans_index_original_text() {
    let text = "hyptonic infant";
    let found = extractor().extract(text).unwrap();
    assert_eq!(found.term_ids(), ["HP:0001290"]);
    let occ = &found.as_slice()[0];
    assert_eq!(occ.matched_text, "hyptonic");
    assert_eq!(&text[occ.start..occ.end], "hyptonic");
}

#[test]
fn spelling_correction_can_be_disabled() {
    let ex = extractor_with(ExtractorConfig::default().with_correct_spelling(false));
    assert!(ex.extract("hyptonic infant").unwrap().is_empty());
}

#[test]
fn no_match_is_empty_not_error() {
    let found = extractor().extract("entirely unrelated narrative text").unwrap();
    assert!(found.is_empty());
    assert_eq!(found.len(), 0);
}

#[test]
fn occurrences_serialize_with_offsets() {
    let found = extractor().extract("hypotonia").unwrap();
    let json = serde_json::to_string(&found).unwrap();
    assert!(json.contains("\"HP:0001290\""));
    assert!(json.contains("\"start\":0"));
    assert!(json.contains("\"end\":9"));
}

struct FailingTokenizer;

impl Tokenizer for FailingTokenizer {
    fn tokenize(&self, _text: &str) -> Result<Vec<Token>> {
        Err(Error::dependency("tokenizer model not loaded"))
    }
}

#[test]
fn collaborator_failure_propagates() {
    let tokenizer = SimpleTokenizer::new();
    let stemmer = SuffixStemmer::new();
    let index = build_index(&vocabulary(), &tokenizer, &stemmer).unwrap();
    let ex = Extractor::with_index(Arc::new(index), ExtractorConfig::default())
        .unwrap()
        .with_tokenizer(Arc::new(FailingTokenizer));
    match ex.extract("hypotonia") {
        Err(Error::DependencyUnavailable(_)) => {}
        other => panic!("expected dependency error, got {other:?}"),
    }
}
