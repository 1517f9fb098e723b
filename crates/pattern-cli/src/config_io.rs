//! Run configuration loading (spec.md §6 "Run configuration"): two
//! JSON-keyed records, deserialized and validated at construction.
//! Violations fail with `ConfigError` (fatal, spec.md §7).

use std::path::Path;

use pattern_core::{
    BacktestMethod, PatternError, PatternResult, RiskParameters, SampleRange, SearchConfig,
    SearchType, Side,
};
use rust_decimal::Decimal;
use serde::Deserialize;

/// The `<mcpt-config>` positional (spec.md §6): risk parameters plus the
/// Monte Carlo permutation test's own knobs (significance level, RNG seed)
/// and the run's symbol label, used for artifact naming.
#[derive(Debug, Clone, Deserialize)]
pub struct MctpConfigFile {
    pub profit_target_pct: Decimal,
    pub stop_loss_pct: Decimal,
    pub alpha: Decimal,
    pub seed: u64,
    pub symbol: String,
}

impl MctpConfigFile {
    pub fn load(path: &Path) -> PatternResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PatternError::Config(format!("reading {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| PatternError::Config(format!("parsing {}: {e}", path.display())))
    }

    pub fn risk_parameters(&self) -> PatternResult<RiskParameters> {
        RiskParameters::new(self.profit_target_pct, self.stop_loss_pct)
    }
}

/// The `<search-config>` positional (spec.md §6, §3 "Search configuration
/// (enumerated)"): every tunable knob of the forward-stepwise search except
/// the three the CLI already supplies positionally (search type, side,
/// sample range).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfigFile {
    pub lookback: u8,
    pub max_depth: u8,
    pub min_trades: u32,
    pub max_inactivity_span: u32,
    pub max_consecutive_losers: u32,
    pub passing_strat_num_per_round: u32,
    pub profit_factor_criterion: Decimal,
    pub pal_profitability_safety_factor: Decimal,
    pub activity_multiplier: Decimal,
    pub step_redundancy_multiplier: Decimal,
    pub survival_filter_multiplier: Decimal,
    pub num_permutations: u32,
    #[serde(default)]
    pub backtest_method: BacktestMethod,
    #[serde(default)]
    pub inverse_survival_filter: Option<Decimal>,
    /// Fraction of the series (by date index) treated as in-sample when
    /// `sample == IS|ISOOS`; the remainder is out-of-sample. Resolves an
    /// Open Question spec.md leaves unspecified (see DESIGN.md).
    #[serde(default = "default_in_sample_fraction")]
    pub in_sample_fraction: Decimal,
}

fn default_in_sample_fraction() -> Decimal {
    Decimal::new(70, 2) // 0.70
}

impl SearchConfigFile {
    pub fn load(path: &Path) -> PatternResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PatternError::Config(format!("reading {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| PatternError::Config(format!("parsing {}: {e}", path.display())))
    }

    /// Assembles the full [`SearchConfig`] for one (search type, side,
    /// sample range) combination, then validates it.
    pub fn build(
        &self,
        search_type: SearchType,
        side: Side,
        sample_range: SampleRange,
    ) -> PatternResult<SearchConfig> {
        SearchConfig {
            max_depth: self.max_depth,
            min_trades: self.min_trades,
            max_inactivity_span: self.max_inactivity_span,
            max_consecutive_losers: self.max_consecutive_losers,
            passing_strat_num_per_round: self.passing_strat_num_per_round,
            profit_factor_criterion: self.profit_factor_criterion,
            pal_profitability_safety_factor: self.pal_profitability_safety_factor,
            activity_multiplier: self.activity_multiplier,
            step_redundancy_multiplier: self.step_redundancy_multiplier,
            survival_filter_multiplier: self.survival_filter_multiplier,
            num_permutations: self.num_permutations,
            search_type,
            side,
            sample_range,
            backtest_method: self.backtest_method,
            inverse_survival_filter: self.inverse_survival_filter,
        }
        .validate()
    }

    /// Resolves the CLI's `{IS|OOS|ISOOS}` selector into date-index bounds
    /// over a series of `n` bars, splitting at `in_sample_fraction`.
    pub fn sample_range(&self, n: usize, sample: crate::args::SampleArg) -> SampleRange {
        use crate::args::SampleArg;
        let split = (Decimal::from(n as u64) * self.in_sample_fraction)
            .floor()
            .to_string()
            .parse::<usize>()
            .unwrap_or(0)
            .min(n);
        match sample {
            SampleArg::InSample => SampleRange::InSample { start: 0, end: split },
            SampleArg::OutOfSample => SampleRange::OutOfSample { start: split, end: n },
            SampleArg::Both => SampleRange::Both {
                is_start: 0,
                is_end: split,
                oos_start: split,
                oos_end: n,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_range_splits_at_configured_fraction() {
        let file = SearchConfigFile {
            lookback: 5,
            max_depth: 2,
            min_trades: 1,
            max_inactivity_span: 10,
            max_consecutive_losers: 5,
            passing_strat_num_per_round: 10,
            profit_factor_criterion: Decimal::new(15, 1),
            pal_profitability_safety_factor: Decimal::new(9, 1),
            activity_multiplier: Decimal::ONE,
            step_redundancy_multiplier: Decimal::ONE,
            survival_filter_multiplier: Decimal::ONE,
            num_permutations: 100,
            backtest_method: BacktestMethod::PlainVanilla,
            inverse_survival_filter: None,
            in_sample_fraction: Decimal::new(70, 2),
        };
        let range = file.sample_range(100, crate::args::SampleArg::InSample);
        assert_eq!(range, SampleRange::InSample { start: 0, end: 70 });
    }
}
