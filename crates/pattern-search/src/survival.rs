//! Survival filter (C7), grounded on `DefaultSurvivalPolicy::filterSurvivors`
//! / `getUniqueSurvivors` (`original_source/libs/pasearchalgolib/SurvivalPolicy.h`).

use std::collections::HashSet;

use pattern_core::{CandidateResult, FactSet, RiskParameters, SearchConfig};

use crate::counters::RunCounters;
use crate::matrix::FactMatrix;

/// `filter(results) -> Vec<FactSet>` (unique) (spec.md §4.6). Criteria:
/// 1. `maxLosers <= maxConsecutiveLosers`
/// 2. `pf > profitFactorCriterion`
/// 3. `palProf > palSafetyFactor * PF/(PF+R)`
/// 4. `payoff > survivalFilterMultiplier * 0.95 * R` — spec.md §4.6's fixed
///    `0.95` coefficient scaled by the configured `survivalFilterMultiplier`
///    (`SearchConfig::survival_filter_multiplier`); a multiplier of `1.0`
///    reproduces spec.md's literal criterion exactly.
///
/// Survivors are first deduplicated by sorted FactSet, then by trading
/// footprint (spec.md §4.6 "Deduplication").
pub fn filter(
    results: &[CandidateResult],
    risk: &RiskParameters,
    cfg: &SearchConfig,
    matrix: &FactMatrix,
    counters: &mut RunCounters,
) -> Vec<FactSet> {
    let r = risk.r();
    let payoff_threshold = cfg.survival_filter_multiplier * rust_decimal::Decimal::new(95, 2) * r;
    let passing: Vec<&CandidateResult> = results
        .iter()
        .filter(|c| {
            c.stats.max_losers <= cfg.max_consecutive_losers
                && c.stats.pf > cfg.profit_factor_criterion
                && c.stats.pal_prof > cfg.pal_profitability_safety_factor * (c.stats.pf / (c.stats.pf + r))
                && c.stats.payoff > payoff_threshold
        })
        .collect();

    let mut seen_factsets: HashSet<Vec<u32>> = HashSet::new();
    let mut seen_footprints: HashSet<Vec<bool>> = HashSet::new();
    let mut survivors = Vec::new();

    for candidate in passing {
        let key: Vec<u32> = candidate.factset.ids().iter().map(|id| id.0).collect();
        if !seen_factsets.insert(key) {
            counters.duplicate_footprint += 1;
            continue;
        }
        let footprint = matrix.footprint(candidate.factset.ids());
        if !seen_footprints.insert(footprint) {
            counters.duplicate_footprint += 1;
            continue;
        }
        survivors.push(candidate.factset.clone());
    }

    survivors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::FactMatrix;
    use chrono::Utc;
    use pattern_core::{BacktestMethod, CandidateStats, SampleRange, SearchType, Side};
    use rust_decimal_macros::dec;

    fn cfg() -> SearchConfig {
        SearchConfig {
            max_depth: 2,
            min_trades: 1,
            max_inactivity_span: 1000,
            max_consecutive_losers: 3,
            passing_strat_num_per_round: 10,
            profit_factor_criterion: dec!(1.5),
            pal_profitability_safety_factor: dec!(0.9),
            activity_multiplier: dec!(1),
            step_redundancy_multiplier: dec!(1),
            survival_filter_multiplier: dec!(1),
            num_permutations: 100,
            search_type: SearchType::CloseOnly,
            side: Side::Long,
            sample_range: SampleRange::InSample { start: 0, end: 50 },
            backtest_method: BacktestMethod::PlainVanilla,
            inverse_survival_filter: None,
        }
    }

    fn matrix() -> FactMatrix {
        let bars: Vec<_> = (0..50)
            .map(|i| {
                let c = dec!(100) + rust_decimal::Decimal::from(i as u64);
                pattern_core::Bar {
                    t: Utc::now(),
                    o: c,
                    h: c,
                    l: c,
                    c,
                    v: 100,
                }
            })
            .collect();
        FactMatrix::build(&bars, 2, SearchType::CloseOnly)
    }

    #[test]
    fn rejects_candidates_failing_any_criterion() {
        let risk = RiskParameters::new(dec!(0.02), dec!(0.01)).unwrap();
        let m = matrix();
        let (id, _) = m.facts().iter().next().unwrap();
        let candidate = CandidateResult::new(
            0,
            FactSet::from_ids(vec![id]),
            CandidateStats {
                pf: dec!(1.2), // below profit_factor_criterion of 1.5
                payoff: dec!(2.5),
                pal_prof: dec!(0.95),
                trades: 20,
                max_losers: 1,
                max_inactivity: 1,
            },
        );
        let mut counters = RunCounters::new();
        let survivors = filter(&[candidate], &risk, &cfg(), &m, &mut counters);
        assert!(survivors.is_empty());
    }

    #[test]
    fn deduplicates_identical_factsets() {
        let risk = RiskParameters::new(dec!(0.02), dec!(0.01)).unwrap();
        let m = matrix();
        let (id, _) = m.facts().iter().next().unwrap();
        let stats = CandidateStats {
            pf: dec!(3.0),
            payoff: dec!(2.5),
            pal_prof: dec!(0.95),
            trades: 20,
            max_losers: 1,
            max_inactivity: 1,
        };
        let a = CandidateResult::new(0, FactSet::from_ids(vec![id]), stats);
        let b = CandidateResult::new(1, FactSet::from_ids(vec![id]), stats);
        let mut counters = RunCounters::new();
        let survivors = filter(&[a, b], &risk, &cfg(), &m, &mut counters);
        assert_eq!(survivors.len(), 1);
        assert_eq!(counters.duplicate_footprint, 1);
    }
}
