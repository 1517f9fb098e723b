//! Data model shared by the pattern-discovery workspace: bars and their
//! addressable fields, canonicalized facts, candidate statistics, run
//! configuration, and the legacy text renderer.

pub mod candidate;
pub mod config;
pub mod decimal;
pub mod error;
pub mod fact;
pub mod price;
pub mod render;

pub use candidate::{CandidateResult, CandidateStats};
pub use config::{BacktestMethod, RiskParameters, SampleRange, SearchConfig, SearchType, Side};
pub use decimal::{is_degenerate_pf, DECIMAL_SCALE, PF_DEGENERATE, PF_NO_LOSERS_SENTINEL};
pub use error::{PatternError, PatternResult};
pub use fact::{Fact, FactId, FactSet, FactTable};
pub use price::{is_trivial_same_bar_pair, Bar, BarRef, PriceField};

/// The sole fixed-point numeric type used across the workspace (spec.md
/// §9 redesign note).
pub type Num = rust_decimal::Decimal;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar(o: Num, h: Num, l: Num, c: Num) -> Bar {
        Bar {
            t: chrono::Utc::now(),
            o,
            h,
            l,
            c,
            v: 1_000,
        }
    }

    #[test]
    fn fact_canonical_form_is_address_ordered() {
        let a = BarRef::new(0, PriceField::Close);
        let b = BarRef::new(1, PriceField::Close);
        let f1 = Fact::new(a, b).unwrap();
        let f2 = Fact::new(b, a).unwrap();
        assert_eq!(f1, f2);
        assert_eq!(f1.lhs(), a);
        assert_eq!(f1.rhs(), b);
    }

    #[test]
    fn trivial_same_bar_ohlc_pairs_are_excluded() {
        let h = BarRef::new(0, PriceField::High);
        let l = BarRef::new(0, PriceField::Low);
        assert!(Fact::new(h, l).is_none());
    }

    #[test]
    fn volume_same_bar_pair_is_not_trivial() {
        let c = BarRef::new(0, PriceField::Close);
        let v = BarRef::new(0, PriceField::Volume);
        assert!(Fact::new(c, v).is_some());
    }

    #[test]
    fn ibs_degenerate_bar_yields_neutral_ratio() {
        let flat = bar(dec!(10), dec!(10), dec!(10), dec!(10));
        assert_eq!(PriceField::Ibs1.eval(&flat), dec!(0.5));
        assert_eq!(PriceField::Ibs2.eval(&flat), dec!(0.5));
        assert_eq!(PriceField::Ibs3.eval(&flat), dec!(0.5));
    }

    #[test]
    fn ibs1_matches_classic_internal_bar_strength() {
        let b = bar(dec!(10), dec!(12), dec!(9), dec!(11));
        // (11 - 9) / (12 - 9) = 2/3
        assert_eq!(PriceField::Ibs1.eval(&b), dec!(2) / dec!(3));
    }

    #[test]
    fn fact_table_generate_excludes_trivial_pairs() {
        let table = FactTable::generate(2, &[PriceField::Open, PriceField::High]);
        // offsets {0,1} x fields {Open, High} = 4 addresses, C(4,2) = 6 pairs,
        // minus the 2 trivial same-bar OHLC pairs (offset 0 and offset 1).
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn factset_extended_rejects_duplicates() {
        let fs = FactSet::from_ids(vec![FactId(1), FactId(3)]);
        assert!(fs.extended(FactId(3)).is_none());
        let fs2 = fs.extended(FactId(2)).unwrap();
        assert_eq!(fs2.ids(), &[FactId(1), FactId(2), FactId(3)]);
    }

    #[test]
    fn search_config_rejects_non_positive_fields() {
        let cfg = SearchConfig {
            max_depth: 0,
            min_trades: 5,
            max_inactivity_span: 10,
            max_consecutive_losers: 5,
            passing_strat_num_per_round: 10,
            profit_factor_criterion: dec!(1.5),
            pal_profitability_safety_factor: dec!(0.9),
            activity_multiplier: dec!(1),
            step_redundancy_multiplier: dec!(1),
            survival_filter_multiplier: dec!(1),
            num_permutations: 100,
            search_type: SearchType::Ohlc,
            side: Side::Long,
            sample_range: SampleRange::InSample { start: 0, end: 10 },
            backtest_method: BacktestMethod::PlainVanilla,
            inverse_survival_filter: None,
        };
        assert!(cfg.validate().is_err());
    }
}
