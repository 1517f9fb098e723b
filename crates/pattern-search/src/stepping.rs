//! Stepping policy (C6): max-relevance min-redundancy (mRMR) greedy
//! selection, grounded on `ValarrayMutualizer::getMaxRelMinRed`
//! (`original_source/libs/pasearchalgo/valarraymutualizer.h`).

use pattern_core::{is_degenerate_pf, CandidateResult, FactSet};
use pattern_stats::RedundancyCache;
use rust_decimal::Decimal;

use crate::counters::RunCounters;

/// Fixed redundancy-skip threshold: a candidate whose running-max
/// similarity against the selected set reaches this value is treated as a
/// duplicate of an already-selected trading footprint and skipped outright
/// (spec.md §4.5's `redundancyFilter` is referenced but not itself listed
/// among the enumerated `SearchConfig` fields; see DESIGN.md for this Open
/// Question's resolution).
pub const REDUNDANCY_SKIP_THRESHOLD: Decimal = Decimal::ONE;

pub struct SteppingPolicy<'a> {
    similarity: &'a [Vec<Decimal>],
    num_dates: usize,
    activity_multiplier: Decimal,
    step_redundancy_multiplier: Decimal,
    inverse_survival_filter: Option<Decimal>,
}

impl<'a> SteppingPolicy<'a> {
    pub fn new(
        similarity: &'a [Vec<Decimal>],
        num_dates: usize,
        activity_multiplier: Decimal,
        step_redundancy_multiplier: Decimal,
        inverse_survival_filter: Option<Decimal>,
    ) -> Self {
        Self {
            similarity,
            num_dates,
            activity_multiplier,
            step_redundancy_multiplier,
            inverse_survival_filter,
        }
    }

    /// `pass(step, maxDepth) -> Vec<FactSet>` of size `<= K` (spec.md §4.5).
    pub fn pass(
        &self,
        results: &[CandidateResult],
        step: u8,
        max_depth: u8,
        k: u32,
        counters: &mut RunCounters,
    ) -> Vec<FactSet> {
        let mut sorted: Vec<&CandidateResult> = results
            .iter()
            .filter(|r| {
                if is_degenerate_pf(r.stats.pf) {
                    counters.degenerate += 1;
                    return false;
                }
                if let Some(threshold) = self.inverse_survival_filter {
                    if r.stats.pf > threshold {
                        counters.degenerate += 1;
                        return false;
                    }
                }
                true
            })
            .collect();
        sorted.sort_by(|a, b| b.stats.pal_prof.cmp(&a.stats.pal_prof));

        let k_prime = beam_width(k, step, max_depth);
        if k_prime == 0 || sorted.is_empty() {
            return Vec::new();
        }

        let alpha = self.activity_multiplier;
        let rho = self.step_redundancy_multiplier;

        let mut cache = RedundancyCache::new(sorted.len());
        let mut taken = vec![false; sorted.len()];
        let mut selected: Vec<FactSet> = Vec::new();
        let mut selected_ids: Vec<Vec<u32>> = Vec::new();

        while selected.len() < k_prime as usize {
            let mut best_idx: Option<usize> = None;
            let mut best_score = Decimal::MIN;

            for (idx, candidate) in sorted.iter().enumerate() {
                if taken[idx] {
                    continue;
                }
                let redundancy_raw = cache.get(idx);
                if redundancy_raw >= REDUNDANCY_SKIP_THRESHOLD {
                    continue;
                }
                let relevance = candidate.stats.pal_prof;
                let activity = Decimal::from(candidate.stats.trades) * alpha
                    / Decimal::from(self.num_dates.max(1) as u64);
                let redundancy = redundancy_raw * rho;
                let score = relevance + activity - redundancy;

                if score > best_score {
                    best_score = score;
                    best_idx = Some(idx);
                }

                // The remaining sorted tail's relevance is monotone
                // non-increasing; once it can no longer beat the current
                // best by more than alpha/2 even with maximal activity and
                // zero redundancy, stop scanning (spec.md §4.5 "Break
                // once...").
                if relevance + alpha - Decimal::ZERO <= best_score - alpha / Decimal::TWO {
                    break;
                }
            }

            let Some(idx) = best_idx else { break };
            taken[idx] = true;
            let factset = sorted[idx].factset.clone();
            if selected.contains(&factset) {
                continue;
            }

            let ids = factset.ids().to_vec();
            for (other_idx, other) in sorted.iter().enumerate() {
                if taken[other_idx] {
                    continue;
                }
                let pair_max = RedundancyCache::pairwise_max_redundancy(
                    self.similarity,
                    &ids,
                    other.factset.ids(),
                );
                cache.update(other_idx, pair_max);
            }

            selected_ids.push(ids);
            selected.push(factset);
        }

        selected
    }
}

fn beam_width(k: u32, step: u8, max_depth: u8) -> u32 {
    if max_depth == 0 {
        return 0;
    }
    let fraction = Decimal::ONE - Decimal::from(step) / Decimal::from(max_depth);
    let scaled = Decimal::from(k) * fraction.max(Decimal::ZERO);
    scaled.floor().to_string().parse::<u32>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pattern_core::{CandidateStats, FactId};
    use rust_decimal_macros::dec;

    fn result(id: u32, ids: Vec<u32>, pal_prof: Decimal, trades: u32, pf: Decimal) -> CandidateResult {
        CandidateResult::new(
            id,
            FactSet::from_ids(ids.into_iter().map(FactId).collect()),
            CandidateStats {
                pf,
                payoff: dec!(1.5),
                pal_prof,
                trades,
                max_losers: 1,
                max_inactivity: 1,
            },
        )
    }

    #[test]
    fn beam_width_shrinks_toward_zero_at_final_depth() {
        assert_eq!(beam_width(100, 1, 4), 75);
        assert_eq!(beam_width(100, 4, 4), 0);
    }

    #[test]
    fn degenerate_candidates_are_excluded_and_counted() {
        let sim = vec![vec![Decimal::ONE; 1]; 1];
        let policy = SteppingPolicy::new(&sim, 100, dec!(1), dec!(1), None);
        let results = vec![result(0, vec![0], dec!(0.6), 10, pattern_core::PF_DEGENERATE)];
        let mut counters = RunCounters::new();
        let selected = policy.pass(&results, 1, 4, 5, &mut counters);
        assert!(selected.is_empty());
        assert_eq!(counters.degenerate, 1);
    }

    #[test]
    fn redundant_twin_is_skipped_once_threshold_reached() {
        let sim = vec![
            vec![dec!(1), dec!(1), dec!(0)],
            vec![dec!(1), dec!(1), dec!(0)],
            vec![dec!(0), dec!(0), dec!(1)],
        ];
        let policy = SteppingPolicy::new(&sim, 100, dec!(1), dec!(1), None);
        let results = vec![
            result(0, vec![0], dec!(0.9), 20, dec!(2)),
            result(1, vec![1], dec!(0.89), 20, dec!(2)),
            result(2, vec![2], dec!(0.5), 20, dec!(2)),
        ];
        let mut counters = RunCounters::new();
        let selected = policy.pass(&results, 1, 4, 10, &mut counters);
        // facts 0 and 1 are fully redundant (sim=1); only one may be picked
        // before its twin is skipped by the redundancy filter.
        let picked_ids: Vec<_> = selected.iter().map(|fs| fs.ids().to_vec()).collect();
        let has_0 = picked_ids.contains(&vec![FactId(0)]);
        let has_1 = picked_ids.contains(&vec![FactId(1)]);
        assert!(!(has_0 && has_1), "mutually redundant facts must not both survive");
    }
}
