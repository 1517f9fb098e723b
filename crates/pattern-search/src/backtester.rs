//! Shortcut backtester (C4): converts a conjunction of facts into a trade
//! stream and performance statistics without a full order-book simulator.

use pattern_core::{
    is_degenerate_pf, CandidateStats, FactSet, BacktestMethod, PF_DEGENERATE, PF_NO_LOSERS_SENTINEL,
};
use rust_decimal::Decimal;

use crate::matrix::FactMatrix;
use crate::returns::BaseReturns;

/// `backtest(S) -> Stats` (spec.md §4.3). `min_trades` only affects the
/// reported `pf` sentinel (`0` when `trades < minTrades`); the backtest
/// processor (C5) applies the authoritative pre-filter.
pub fn backtest(
    matrix: &FactMatrix,
    base: &BaseReturns,
    factset: &FactSet,
    method: BacktestMethod,
    min_trades: u32,
) -> CandidateStats {
    let n = matrix.num_dates();
    debug_assert_eq!(base.len(), n, "base returns must cover every date");

    let occurrences = matrix.footprint(factset.ids());
    debug_assert_eq!(
        occurrences.len(),
        n,
        "footprint length must equal N (programming error otherwise)"
    );

    let mut sum_winners = Decimal::ZERO;
    let mut sum_losers = Decimal::ZERO;
    let mut win_count: u32 = 0;
    let mut loss_count: u32 = 0;
    let mut consecutive_losers: u32 = 0;
    let mut max_consecutive_losers: u32 = 0;
    let mut inactivity: u32 = 0;
    let mut max_inactivity: u32 = 0;
    let mut position_end: usize = 0;

    for d in 0..n {
        if method == BacktestMethod::PlainVanilla && d < position_end {
            continue;
        }
        if !occurrences[d] || base.returns[d] == Decimal::ZERO {
            inactivity += 1;
            max_inactivity = max_inactivity.max(inactivity);
            continue;
        }

        inactivity = 0;
        let r = base.returns[d];
        if r > Decimal::ZERO {
            sum_winners += r;
            win_count += 1;
            consecutive_losers = 0;
        } else {
            sum_losers += -r;
            loss_count += 1;
            consecutive_losers += 1;
            max_consecutive_losers = max_consecutive_losers.max(consecutive_losers);
        }

        if method == BacktestMethod::PlainVanilla {
            position_end = d + base.bars_in_position[d] as usize;
        }
    }

    let trades = win_count + loss_count;

    let pf = if trades < min_trades || win_count == 0 {
        PF_DEGENERATE
    } else if loss_count == 0 {
        PF_NO_LOSERS_SENTINEL
    } else {
        sum_winners / sum_losers
    };

    let pal_prof = if trades == 0 {
        Decimal::ZERO
    } else {
        sum_winners / (sum_winners + sum_losers)
    };

    let payoff = if win_count == 0 {
        PF_DEGENERATE
    } else if loss_count == 0 {
        PF_NO_LOSERS_SENTINEL
    } else {
        let avg_win = sum_winners / Decimal::from(win_count);
        let avg_loss = sum_losers / Decimal::from(loss_count);
        avg_win / avg_loss
    };

    CandidateStats {
        pf,
        payoff,
        pal_prof,
        trades,
        max_losers: max_consecutive_losers,
        max_inactivity,
    }
}

pub fn is_degenerate(stats: &CandidateStats) -> bool {
    is_degenerate_pf(stats.pf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::FactMatrix;
    use chrono::Utc;
    use pattern_core::{BarRef, Fact, FactSet, PriceField, RiskParameters, SampleRange, SearchType, Side};
    use rust_decimal_macros::dec;

    fn alternating(n: usize) -> Vec<pattern_core::Bar> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    pattern_core::Bar {
                        t: Utc::now(),
                        o: dec!(10),
                        h: dec!(11),
                        l: dec!(10),
                        c: dec!(11),
                        v: 100,
                    }
                } else {
                    pattern_core::Bar {
                        t: Utc::now(),
                        o: dec!(11),
                        h: dec!(11),
                        l: dec!(10),
                        c: dec!(10),
                        v: 100,
                    }
                }
            })
            .collect()
    }

    #[test]
    fn plain_vanilla_skips_overlapping_signals() {
        let bars = alternating(60);
        let matrix = FactMatrix::build(&bars, 2, SearchType::OpenClose);
        let risk = RiskParameters::new(dec!(0.01), dec!(0.01)).unwrap();
        let sample = SampleRange::InSample { start: 0, end: 60 };
        let base = BaseReturns::build(&bars, Side::Long, &risk, &sample);

        let fact = Fact::new(
            BarRef::new(0, PriceField::Close),
            BarRef::new(0, PriceField::Open),
        )
        .unwrap();
        let id = matrix
            .facts()
            .iter()
            .find(|(_, f)| **f == fact)
            .map(|(id, _)| id)
            .unwrap();
        let factset = FactSet::from_ids(vec![id]);

        let stats = backtest(&matrix, &base, &factset, BacktestMethod::PlainVanilla, 1);
        assert!(stats.trades > 0);
    }

    #[test]
    fn degenerate_when_below_min_trades() {
        let bars = alternating(10);
        let matrix = FactMatrix::build(&bars, 2, SearchType::OpenClose);
        let risk = RiskParameters::new(dec!(0.01), dec!(0.01)).unwrap();
        let sample = SampleRange::InSample { start: 0, end: 10 };
        let base = BaseReturns::build(&bars, Side::Long, &risk, &sample);
        let (id, _) = matrix.facts().iter().next().unwrap();
        let factset = FactSet::from_ids(vec![id]);
        let stats = backtest(&matrix, &base, &factset, BacktestMethod::PlainVanilla, 1000);
        assert_eq!(stats.pf, PF_DEGENERATE);
    }
}
