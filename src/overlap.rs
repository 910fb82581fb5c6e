//! Overlap resolution.
//!
//! Partial phrases of a confirmed longer phrase are usually confirmed too
//! ("speech delay" inside "severe speech delay"). The policy is widest span
//! wins: build an ownership map from byte position to the widest occurrence
//! covering it (earliest start breaks width ties), then keep only the
//! occurrences that own every position they cover. A narrower match survives
//! only when no wider winner claims any of its bytes, so non-overlapping
//! mentions always pass through untouched.

use crate::types::Occurrence;
use std::collections::HashMap;

/// Drop occurrences shadowed by a wider overlapping occurrence.
///
/// Input order is preserved for the survivors.
#[must_use]
pub fn resolve_overlaps(occurrences: Vec<Occurrence>) -> Vec<Occurrence> {
    if occurrences.len() < 2 {
        return occurrences;
    }

    // position -> (width, index) of the winning occurrence
    let mut owner: HashMap<usize, (usize, usize)> = HashMap::new();
    for (i, occ) in occurrences.iter().enumerate() {
        let claim = (occ.width(), i);
        for pos in occ.start..occ.end {
            let held = owner.entry(pos).or_insert(claim);
            // wider wins; equal width keeps the earlier occurrence
            if claim.0 > held.0 {
                *held = claim;
            }
        }
    }

    occurrences
        .into_iter()
        .enumerate()
        .filter(|(i, occ)| (occ.start..occ.end).all(|pos| owner[&pos].1 == *i))
        .map(|(_, occ)| occ)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(id: &str, start: usize, end: usize) -> Occurrence {
        Occurrence {
            term_ids: vec![id.to_string()],
            start,
            end,
            matched_text: String::new(),
            context_text: None,
            negated: false,
            context_span: None,
            matched_tokens: Vec::new(),
        }
    }

    fn ids(occs: &[Occurrence]) -> Vec<&str> {
        occs.iter().map(|o| o.term_ids[0].as_str()).collect()
    }

    #[test]
    fn nested_narrower_match_dropped() {
        // "severe speech delay" shadows "speech delay"
        let kept = resolve_overlaps(vec![occ("wide", 0, 19), occ("narrow", 7, 19)]);
        assert_eq!(ids(&kept), ["wide"]);
    }

    #[test]
    fn disjoint_matches_all_survive() {
        let kept = resolve_overlaps(vec![occ("a", 0, 9), occ("b", 11, 30)]);
        assert_eq!(ids(&kept), ["a", "b"]);
    }

    #[test]
    fn equal_width_tie_keeps_earlier() {
        let kept = resolve_overlaps(vec![occ("first", 0, 10), occ("second", 5, 15)]);
        assert_eq!(ids(&kept), ["first"]);
    }

    #[test]
    fn touching_spans_do_not_conflict() {
        // exclusive end: [0,5) and [5,10) share no byte
        let kept = resolve_overlaps(vec![occ("a", 0, 5), occ("b", 5, 10)]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn chain_of_overlaps_resolved_by_width() {
        // c is widest and shadows both ends of the chain
        let kept = resolve_overlaps(vec![occ("a", 0, 6), occ("b", 4, 12), occ("c", 2, 20)]);
        assert_eq!(ids(&kept), ["c"]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn spans()(v in proptest::collection::vec((0usize..50, 1usize..12), 0..8)) -> Vec<Occurrence> {
            v.into_iter()
                .enumerate()
                .map(|(i, (start, width))| Occurrence {
                    term_ids: vec![format!("T:{i}")],
                    start,
                    end: start + width,
                    matched_text: String::new(),
                    context_text: None,
                    negated: false,
                    context_span: None,
                    matched_tokens: Vec::new(),
                })
                .collect()
        }
    }

    proptest! {
        #[test]
        fn resolution_never_grows_the_set(occs in spans()) {
            let before = occs.len();
            let kept = resolve_overlaps(occs);
            prop_assert!(kept.len() <= before);
        }

        #[test]
        fn survivors_never_overlap(occs in spans()) {
            let kept = resolve_overlaps(occs);
            for a in 0..kept.len() {
                for b in a + 1..kept.len() {
                    prop_assert!(!kept[a].overlaps(&kept[b]));
                }
            }
        }
    }
}
