use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PatternError, PatternResult};

/// Which field universe a run's comparison generator enumerates over
/// (spec.md §4.1 "Search types"). `Extended` is the union of the other
/// four groups, recovered from `original_source/`'s sequential "run every
/// group, merge results" behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchType {
    CloseOnly,
    OpenClose,
    HighLow,
    Ohlc,
    Extended,
}

impl SearchType {
    /// Maps the CLI's `<search-type 0..4>` positional argument (§6).
    pub fn from_index(i: u8) -> PatternResult<Self> {
        match i {
            0 => Ok(SearchType::CloseOnly),
            1 => Ok(SearchType::OpenClose),
            2 => Ok(SearchType::HighLow),
            3 => Ok(SearchType::Ohlc),
            4 => Ok(SearchType::Extended),
            other => Err(PatternError::Config(format!(
                "search-type must be 0..4, got {other}"
            ))),
        }
    }

    /// Short label used in persisted artifact filenames (spec.md §6
    /// `<SYM>_<SEARCH>_<TS>_...`).
    pub fn label(&self) -> &'static str {
        match self {
            SearchType::CloseOnly => "CloseOnly",
            SearchType::OpenClose => "OpenClose",
            SearchType::HighLow => "HighLow",
            SearchType::Ohlc => "OHLC",
            SearchType::Extended => "Extended",
        }
    }
}

/// Trade direction for the base-return builder (C3). The original engine
/// runs long and short passes separately; both are exposed here so the CLI
/// can offer `{longonly|shortonly|longshort}` (§6, supplemented feature).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

/// In-sample / out-of-sample date partitioning (§6 `{IS|OOS|ISOOS}`,
/// recovered feature). `start`/`end` are date indices into the bar series;
/// dates outside the selected range are zeroed per spec.md §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleRange {
    InSample { start: usize, end: usize },
    OutOfSample { start: usize, end: usize },
    Both {
        is_start: usize,
        is_end: usize,
        oos_start: usize,
        oos_end: usize,
    },
}

impl SampleRange {
    /// Whether date index `d` falls inside an active window.
    pub fn includes(&self, d: usize) -> bool {
        match *self {
            SampleRange::InSample { start, end } => d >= start && d < end,
            SampleRange::OutOfSample { start, end } => d >= start && d < end,
            SampleRange::Both {
                is_start,
                is_end,
                oos_start,
                oos_end,
            } => (d >= is_start && d < is_end) || (d >= oos_start && d < oos_end),
        }
    }
}

/// Non-pyramiding vs pyramiding shortcut-backtest semantics (spec.md §4.3).
/// `PlainVanilla` is the driver's default path; `Pyramiding` is exposed as
/// an explicit selector per spec.md §9 ("include only if a configuration
/// flag selects it").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BacktestMethod {
    #[default]
    PlainVanilla,
    Pyramiding,
}

/// `{ profitTargetPct, stopLossPct }` and the derived `R` (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParameters {
    pub profit_target_pct: Decimal,
    pub stop_loss_pct: Decimal,
}

impl RiskParameters {
    pub fn new(profit_target_pct: Decimal, stop_loss_pct: Decimal) -> PatternResult<Self> {
        if profit_target_pct <= Decimal::ZERO {
            return Err(PatternError::Config(
                "profitTargetPct must be positive".into(),
            ));
        }
        if stop_loss_pct <= Decimal::ZERO {
            return Err(PatternError::Config("stopLossPct must be positive".into()));
        }
        Ok(Self {
            profit_target_pct,
            stop_loss_pct,
        })
    }

    /// `R = profitTargetPct / stopLossPct` (GLOSSARY).
    pub fn r(&self) -> Decimal {
        self.profit_target_pct / self.stop_loss_pct
    }
}

/// Every field enumerated in spec.md §3 "Search configuration". All
/// numeric fields must be positive; violations fail with `ConfigError` at
/// construction (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
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
    pub search_type: SearchType,
    pub side: Side,
    pub sample_range: SampleRange,
    pub backtest_method: BacktestMethod,
    /// Optional inverse-survival PF threshold (spec.md §4.5/§9 Open
    /// Question): when set, candidates with PF above this threshold are
    /// excluded from mRMR selection rather than the usual below-threshold
    /// exclusion, supporting a search for the complement of a profitable
    /// pattern. Never auto-inverted; the caller decides what to do with
    /// the resulting candidates.
    pub inverse_survival_filter: Option<Decimal>,
}

impl SearchConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn validate(self) -> PatternResult<Self> {
        if self.max_depth == 0 {
            return Err(PatternError::Config("maxDepth must be >= 1".into()));
        }
        if self.min_trades == 0 {
            return Err(PatternError::Config("minTrades must be >= 1".into()));
        }
        if self.passing_strat_num_per_round == 0 {
            return Err(PatternError::Config(
                "passingStratNumPerRound must be >= 1".into(),
            ));
        }
        if self.profit_factor_criterion <= Decimal::ZERO {
            return Err(PatternError::Config(
                "profitFactorCriterion must be positive".into(),
            ));
        }
        if self.pal_profitability_safety_factor <= Decimal::ZERO {
            return Err(PatternError::Config(
                "palProfitabilitySafetyFactor must be positive".into(),
            ));
        }
        if self.activity_multiplier <= Decimal::ZERO
            || self.step_redundancy_multiplier <= Decimal::ZERO
            || self.survival_filter_multiplier <= Decimal::ZERO
        {
            return Err(PatternError::Config(
                "mRMR multipliers must be positive".into(),
            ));
        }
        if self.num_permutations < 100 {
            return Err(PatternError::Config(
                "numPermutations must be >= 100".into(),
            ));
        }
        Ok(self)
    }
}
