//! Forward-stepwise driver (C8), grounded on `ForwardStepwiseSelector::step`
//! (`original_source/libs/pasearchalgolib/ForwardStepwiseSelector.h`).

use pattern_core::{BacktestMethod, FactId, FactSet, RiskParameters, SearchConfig};
use pattern_stats::similarity_matrix;
use tracing::info;

use crate::counters::RunCounters;
use crate::matrix::FactMatrix;
use crate::processor::BacktestProcessor;
use crate::returns::BaseReturns;
use crate::stepping::SteppingPolicy;
use crate::survival;

/// Every survivor FactSet accumulated across depths, in the order they
/// were produced (spec.md §3 "Lifecycle": survivors accumulate across
/// depths in a process-wide store for the run).
#[derive(Debug, Default)]
pub struct DriverOutput {
    pub survivors: Vec<FactSet>,
    pub counters: RunCounters,
}

/// Runs depth `1..=maxDepth`: seeds with pairs at depth 1, extends
/// mRMR-selected survivors by one fact per subsequent depth, backtests,
/// filters, and accumulates (spec.md §4.7 algorithm).
pub fn run(
    matrix: &FactMatrix,
    base: &BaseReturns,
    risk: &RiskParameters,
    cfg: &SearchConfig,
) -> DriverOutput {
    let mut output = DriverOutput::default();

    if matrix.facts().is_empty() {
        return output;
    }

    let num_facts = matrix.facts().len();
    let columns: Vec<Vec<bool>> = (0..num_facts as u32)
        .map(|i| matrix.column(FactId(i)).to_vec())
        .collect();
    let similarity = similarity_matrix(&columns);

    let mut processor = BacktestProcessor::new();
    let mut seed: Vec<FactSet> = Vec::new();

    for depth in 1..=cfg.max_depth {
        let candidates = if depth == 1 {
            pairwise_candidates(num_facts as u32)
        } else {
            extend_seed(&seed, num_facts as u32)
        };

        processor.process_batch(
            candidates,
            matrix,
            base,
            cfg.backtest_method,
            cfg,
            &mut output.counters,
        );

        let survivors = survival::filter(
            processor.results(),
            risk,
            cfg,
            matrix,
            &mut output.counters,
        );
        info!(depth, survivors = survivors.len(), "depth complete");
        output.survivors.extend(survivors);

        let policy = SteppingPolicy::new(
            &similarity,
            matrix.num_dates(),
            cfg.activity_multiplier,
            cfg.step_redundancy_multiplier,
            cfg.inverse_survival_filter,
        );
        seed = policy.pass(
            processor.results(),
            depth,
            cfg.max_depth,
            cfg.passing_strat_num_per_round,
            &mut output.counters,
        );

        processor.clear_all();

        if seed.is_empty() {
            break;
        }
    }

    output
}

/// `for all ordered pairs (i, j) with i != j` (spec.md §4.7) — as sets,
/// `{i,j} == {j,i}`, so only the unordered combinations need evaluating.
fn pairwise_candidates(num_facts: u32) -> Vec<FactSet> {
    let mut out = Vec::new();
    for i in 0..num_facts {
        for j in (i + 1)..num_facts {
            out.push(FactSet::from_ids(vec![FactId(i), FactId(j)]));
        }
    }
    out
}

/// `for each S in seed: for each c not in S: S ∪ {c}` (spec.md §4.7).
fn extend_seed(seed: &[FactSet], num_facts: u32) -> Vec<FactSet> {
    let mut out = Vec::new();
    for s in seed {
        for c in 0..num_facts {
            if let Some(extended) = s.extended(FactId(c)) {
                out.push(extended);
            }
        }
    }
    out
}
