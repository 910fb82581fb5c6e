//! Candidate-span generation.
//!
//! Given the positions of tokens whose stem appears anywhere in the index,
//! propose which position subsets are worth testing as a phrase match. The
//! matcher then confirms or rejects each subset with one exact signature
//! lookup, so this module is where word-order scrambling, interleaved stop
//! words, and partial mentions get their chance — without enumerating every
//! permutation over the whole document.
//!
//! Pipeline:
//! 1. partition the positions into maximal consecutive runs ("base groups");
//! 2. for every base group of size > 1, add leave-one-out variants (one
//!    interior word may be irrelevant, no deeper recursion);
//! 3. fuse up to `max_neighbors` of these groups, keeping a fusion only when
//!    its positions are disjoint and its completeness — included positions
//!    over the full spanned width — clears a floor, which prunes fusions
//!    across mostly-irrelevant text;
//! 4. expand each retained group into its sub-combinations up to a bounded
//!    size, so partial phrases are tested too.
//!
//! The output is a `BTreeSet` of sorted position vectors: duplicate-free and
//! with a deterministic iteration order, so downstream results never depend
//! on hasher state.

use std::collections::BTreeSet;

/// Tunable policy constants for candidate generation.
///
/// These are calibration knobs, not algorithmic invariants; defaults follow
/// the values that worked on clinical notes.
#[derive(Debug, Clone)]
pub struct CandidateConfig {
    /// Maximum number of base/leave-one-out groups a fused candidate may
    /// span. Must be at least 1; 1 disables fusion entirely.
    pub max_neighbors: usize,
    /// Minimum ratio of included positions to spanned width for a fused
    /// candidate. In `(0, 1]`.
    pub min_completeness: f64,
    /// Largest group size eligible for sub-combination expansion. Bounds the
    /// recombination step at `2^max_recombination` subsets per group.
    pub max_recombination: usize,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            max_neighbors: 3,
            min_completeness: 0.20,
            max_recombination: 6,
        }
    }
}

/// Generates candidate position subsets for the matcher.
#[derive(Debug, Clone, Default)]
pub struct CandidateGenerator {
    config: CandidateConfig,
}

impl CandidateGenerator {
    /// Create a generator with the given policy.
    #[must_use]
    pub fn new(config: CandidateConfig) -> Self {
        Self { config }
    }

    /// Propose candidate subsets for the given index-probed positions.
    ///
    /// `positions` must be strictly increasing (the extractor probes tokens
    /// in order). The result always contains every singleton position.
    #[must_use]
    pub fn candidates(&self, positions: &[usize]) -> BTreeSet<Vec<usize>> {
        let mut out: BTreeSet<Vec<usize>> = BTreeSet::new();
        if positions.is_empty() {
            return out;
        }

        for &p in positions {
            out.insert(vec![p]);
        }

        // base groups plus leave-one-out variants
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for run in group_sequence(positions) {
            if run.len() > 1 {
                for skip in 0..run.len() {
                    let mut variant = run.clone();
                    variant.remove(skip);
                    groups.push(variant);
                }
            }
            groups.push(run);
        }

        // every group stands alone as a candidate
        for g in &groups {
            out.insert(g.clone());
        }

        // fusion of 2..=max_neighbors groups
        let max_k = self.config.max_neighbors.min(groups.len());
        let mut chosen: Vec<usize> = Vec::new();
        for k in 2..=max_k {
            self.fuse(&groups, k, 0, &mut chosen, &mut out);
        }

        // sub-combination expansion of every retained candidate
        let expandable: Vec<Vec<usize>> = out
            .iter()
            .filter(|c| c.len() >= 3 && c.len() <= self.config.max_recombination)
            .cloned()
            .collect();
        for candidate in expandable {
            for r in 2..candidate.len() {
                combinations(&candidate, r, &mut out);
            }
        }

        out
    }

    /// Recursive k-combination enumeration over groups, in index order.
    fn fuse(
        &self,
        groups: &[Vec<usize>],
        k: usize,
        start: usize,
        chosen: &mut Vec<usize>,
        out: &mut BTreeSet<Vec<usize>>,
    ) {
        if chosen.len() == k {
            let mut merged: BTreeSet<usize> = BTreeSet::new();
            let mut total = 0usize;
            for &gi in chosen.iter() {
                total += groups[gi].len();
                merged.extend(groups[gi].iter().copied());
            }
            // a position duplicated across groups disqualifies the fusion
            if merged.len() != total {
                return;
            }
            let fused: Vec<usize> = merged.into_iter().collect();
            if completeness(&fused) >= self.config.min_completeness {
                out.insert(fused);
            }
            return;
        }
        for gi in start..groups.len() {
            chosen.push(gi);
            self.fuse(groups, k, gi + 1, chosen, out);
            chosen.pop();
        }
    }
}

/// Partition a strictly increasing sequence into maximal consecutive runs:
/// `[1,2,3,5,7,8]` → `[[1,2,3],[5],[7,8]]`.
#[must_use]
pub fn group_sequence(positions: &[usize]) -> Vec<Vec<usize>> {
    let mut grouped: Vec<Vec<usize>> = Vec::new();
    for &p in positions {
        match grouped.last_mut() {
            Some(run) if run.last() == Some(&(p.wrapping_sub(1))) => run.push(p),
            _ => grouped.push(vec![p]),
        }
    }
    grouped
}

/// Included positions over spanned width, in `(0, 1]` for non-empty input.
fn completeness(sorted_positions: &[usize]) -> f64 {
    match (sorted_positions.first(), sorted_positions.last()) {
        (Some(&lo), Some(&hi)) => sorted_positions.len() as f64 / (hi - lo + 1) as f64,
        _ => 0.0,
    }
}

/// All r-combinations of `items` (which is sorted), inserted into `out`.
fn combinations(items: &[usize], r: usize, out: &mut BTreeSet<Vec<usize>>) {
    fn rec(items: &[usize], r: usize, start: usize, acc: &mut Vec<usize>, out: &mut BTreeSet<Vec<usize>>) {
        if acc.len() == r {
            out.insert(acc.clone());
            return;
        }
        for i in start..items.len() {
            acc.push(items[i]);
            rec(items, r, i + 1, acc, out);
            acc.pop();
        }
    }
    let mut acc = Vec::with_capacity(r);
    rec(items, r, 0, &mut acc, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_sequence_splits_runs() {
        assert_eq!(
            group_sequence(&[1, 2, 3, 5, 7, 8]),
            vec![vec![1, 2, 3], vec![5], vec![7, 8]]
        );
        assert_eq!(group_sequence(&[0, 1, 3]), vec![vec![0, 1], vec![3]]);
        assert!(group_sequence(&[]).is_empty());
    }

    #[test]
    fn singletons_always_present() {
        let gen = CandidateGenerator::default();
        let cands = gen.candidates(&[0, 2, 9]);
        assert!(cands.contains(&vec![0]));
        assert!(cands.contains(&vec![2]));
        assert!(cands.contains(&vec![9]));
    }

    #[test]
    fn gap_spanning_fusion_requires_neighbors() {
        // "developmental and delay": probed positions 0 and 2
        let none = CandidateGenerator::new(CandidateConfig {
            max_neighbors: 1,
            ..CandidateConfig::default()
        });
        assert!(!none.candidates(&[0, 2]).contains(&vec![0, 2]));

        let fused = CandidateGenerator::new(CandidateConfig {
            max_neighbors: 2,
            ..CandidateConfig::default()
        });
        assert!(fused.candidates(&[0, 2]).contains(&vec![0, 2]));
    }

    #[test]
    fn leave_one_out_variants_generated() {
        let gen = CandidateGenerator::default();
        let cands = gen.candidates(&[4, 5, 6]);
        assert!(cands.contains(&vec![4, 5, 6]));
        assert!(cands.contains(&vec![4, 5]));
        assert!(cands.contains(&vec![5, 6]));
        assert!(cands.contains(&vec![4, 6])); // interior word skipped
    }

    #[test]
    fn sparse_fusions_pruned_by_completeness() {
        let gen = CandidateGenerator::new(CandidateConfig {
            max_neighbors: 2,
            min_completeness: 0.5,
            max_recombination: 6,
        });
        // positions 0 and 40: completeness 2/41, far below the floor
        assert!(!gen.candidates(&[0, 40]).contains(&vec![0, 40]));
    }

    #[test]
    fn raising_max_neighbors_only_adds_candidates() {
        let positions = [0, 2, 3, 7, 8, 11];
        let mut previous: BTreeSet<Vec<usize>> = BTreeSet::new();
        for n in 1..=4 {
            let gen = CandidateGenerator::new(CandidateConfig {
                max_neighbors: n,
                ..CandidateConfig::default()
            });
            let current = gen.candidates(&positions);
            assert!(previous.is_subset(&current), "shrank at max_neighbors={n}");
            previous = current;
        }
    }

    #[test]
    fn deterministic_output() {
        let gen = CandidateGenerator::default();
        let a = gen.candidates(&[0, 1, 3, 4, 8]);
        let b = gen.candidates(&[0, 1, 3, 4, 8]);
        assert_eq!(a, b);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn sorted_positions()(v in proptest::collection::btree_set(0usize..40, 0..10)) -> Vec<usize> {
            v.iter().copied().collect()
        }
    }

    proptest! {
        #[test]
        fn group_sequence_partitions_input(positions in sorted_positions()) {
            let groups = group_sequence(&positions);
            let flat: Vec<usize> = groups.iter().flatten().copied().collect();
            prop_assert_eq!(flat, positions);
        }

        #[test]
        fn candidates_are_sorted_and_duplicate_free(positions in sorted_positions()) {
            let gen = CandidateGenerator::default();
            for cand in gen.candidates(&positions) {
                let mut sorted = cand.clone();
                sorted.sort_unstable();
                sorted.dedup();
                prop_assert_eq!(&sorted, &cand);
                for p in &cand {
                    prop_assert!(positions.contains(p));
                }
            }
        }

        #[test]
        fn completeness_bounded(positions in sorted_positions()) {
            prop_assume!(!positions.is_empty());
            let c = completeness(&positions);
            prop_assert!(c > 0.0 && c <= 1.0);
        }
    }
}
