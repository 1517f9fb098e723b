//! Backtest processor (C5): runs C4 over a batch of candidate FactSets,
//! applies cheap pre-filters, and assigns dense ids deterministically.

use std::collections::HashMap;

use pattern_core::{BacktestMethod, CandidateResult, FactSet, SearchConfig};
use rayon::prelude::*;

use crate::backtester::backtest;
use crate::counters::RunCounters;
use crate::matrix::FactMatrix;
use crate::returns::BaseReturns;

/// `processResult(S) -> ()` / `getResults()` / `sortResults` / `clearAll()`
/// (spec.md §4.4). One processor instance lives for the duration of a
/// single depth in the forward-stepwise driver (C8); `clear_all` resets it
/// between depths.
#[derive(Debug, Default)]
pub struct BacktestProcessor {
    results: Vec<CandidateResult>,
    by_id: HashMap<u32, FactSet>,
}

impl BacktestProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs C4 over every candidate in parallel, applies the pre-filters
    /// (`trades >= minTrades`, `maxInactivity <= maxInactivitySpan`), then
    /// assigns dense ids in a deterministic order: candidates are sorted by
    /// their FactSet's lexicographic key before id assignment, so candidate
    /// *id* is reproducible regardless of which worker produced which
    /// result first (spec.md §5 "Ordering guarantees").
    pub fn process_batch(
        &mut self,
        candidates: Vec<FactSet>,
        matrix: &FactMatrix,
        base: &BaseReturns,
        method: BacktestMethod,
        cfg: &SearchConfig,
        counters: &mut RunCounters,
    ) {
        let min_trades = cfg.min_trades;
        let max_inactivity_span = cfg.max_inactivity_span;

        let mut evaluated: Vec<(FactSet, pattern_core::CandidateStats, bool)> = candidates
            .into_par_iter()
            .map(|factset| {
                let stats = backtest(matrix, base, &factset, method, min_trades);
                let passes =
                    stats.trades >= min_trades && stats.max_inactivity <= max_inactivity_span;
                (factset, stats, passes)
            })
            .collect();

        evaluated.sort_by(|a, b| a.0.ids().cmp(b.0.ids()));

        for (factset, stats, passes) in evaluated {
            if !passes {
                if stats.trades < min_trades {
                    counters.below_min_trades += 1;
                } else {
                    counters.inactive += 1;
                }
                continue;
            }
            let id = self.results.len() as u32;
            self.by_id.insert(id, factset.clone());
            self.results.push(CandidateResult::new(id, factset, stats));
        }
    }

    pub fn results(&self) -> &[CandidateResult] {
        &self.results
    }

    pub fn factset_for(&self, id: u32) -> Option<&FactSet> {
        self.by_id.get(&id)
    }

    pub fn sort_results_by<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&CandidateResult, &CandidateResult) -> std::cmp::Ordering,
    {
        self.results.sort_by(|a, b| cmp(a, b));
    }

    pub fn clear_all(&mut self) {
        self.results.clear();
        self.by_id.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::FactMatrix;
    use chrono::Utc;
    use pattern_core::{FactSet, RiskParameters, SampleRange, SearchType, Side};
    use rust_decimal_macros::dec;

    fn monotone_up(n: usize) -> Vec<pattern_core::Bar> {
        (0..n)
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
            .collect()
    }

    fn cfg() -> SearchConfig {
        SearchConfig {
            max_depth: 2,
            min_trades: 1,
            max_inactivity_span: 1000,
            max_consecutive_losers: 100,
            passing_strat_num_per_round: 10,
            profit_factor_criterion: dec!(1.0),
            pal_profitability_safety_factor: dec!(0.5),
            activity_multiplier: dec!(1),
            step_redundancy_multiplier: dec!(1),
            survival_filter_multiplier: dec!(1),
            num_permutations: 100,
            search_type: SearchType::CloseOnly,
            side: Side::Long,
            sample_range: SampleRange::InSample { start: 0, end: 300 },
            backtest_method: BacktestMethod::PlainVanilla,
            inverse_survival_filter: None,
        }
    }

    #[test]
    fn ids_are_assigned_in_lexicographic_factset_order() {
        let bars = monotone_up(50);
        let matrix = FactMatrix::build(&bars, 2, SearchType::CloseOnly);
        let risk = RiskParameters::new(dec!(0.01), dec!(0.01)).unwrap();
        let sample = SampleRange::InSample { start: 0, end: 50 };
        let base = BaseReturns::build(&bars, Side::Long, &risk, &sample);
        let ids: Vec<_> = matrix.facts().iter().map(|(id, _)| id).collect();
        let candidates: Vec<FactSet> = ids.iter().map(|&id| FactSet::from_ids(vec![id])).collect();

        let mut processor = BacktestProcessor::new();
        let mut counters = RunCounters::new();
        processor.process_batch(
            candidates,
            &matrix,
            &base,
            BacktestMethod::PlainVanilla,
            &cfg(),
            &mut counters,
        );

        let observed_order: Vec<_> = processor.results().iter().map(|r| r.factset.ids().to_vec()).collect();
        let mut expected = observed_order.clone();
        expected.sort();
        assert_eq!(observed_order, expected);
    }

    #[test]
    fn clear_all_resets_both_stores() {
        let mut processor = BacktestProcessor::new();
        let bars = monotone_up(20);
        let matrix = FactMatrix::build(&bars, 2, SearchType::CloseOnly);
        let risk = RiskParameters::new(dec!(0.01), dec!(0.01)).unwrap();
        let sample = SampleRange::InSample { start: 0, end: 20 };
        let base = BaseReturns::build(&bars, Side::Long, &risk, &sample);
        let (id, _) = matrix.facts().iter().next().unwrap();
        let mut counters = RunCounters::new();
        processor.process_batch(
            vec![FactSet::from_ids(vec![id])],
            &matrix,
            &base,
            BacktestMethod::PlainVanilla,
            &cfg(),
            &mut counters,
        );
        processor.clear_all();
        assert!(processor.results().is_empty());
        assert!(processor.factset_for(0).is_none());
    }
}
