//! Base return vector builder (C3).

use pattern_core::{Bar, RiskParameters, SampleRange, Side};
use rust_decimal::Decimal;

/// Forced-exit horizon in bars when neither target nor stop fires
/// (spec.md §4.2 "forced exit (e.g., 10-bar horizon)").
pub const FORCED_EXIT_HORIZON: u16 = 10;

/// `{ baseReturns: [Decimal; N], barsInPosition: [u16; N] }` (spec.md §4.2).
#[derive(Debug, Clone)]
pub struct BaseReturns {
    pub returns: Vec<Decimal>,
    pub bars_in_position: Vec<u16>,
}

impl BaseReturns {
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Simulates, for every date `d` (except the last), a single trade
    /// entered at `bars[d+1].o` with a symmetric target/stop, walking
    /// forward on the real price path until target, stop, or the forced
    /// horizon fires. Deterministic given the price series, side, and risk
    /// parameters (spec.md §4.2 "Guarantees"). Dates outside
    /// `sample_range` are zeroed.
    pub fn build(
        bars: &[Bar],
        side: Side,
        risk: &RiskParameters,
        sample_range: &SampleRange,
    ) -> Self {
        let n = bars.len();
        let mut returns = vec![Decimal::ZERO; n];
        let mut bars_in_position = vec![0u16; n];

        if n < 2 {
            return Self {
                returns,
                bars_in_position,
            };
        }

        for d in 0..n - 1 {
            if !sample_range.includes(d) {
                continue;
            }
            let entry_idx = d + 1;
            let entry = bars[entry_idx].o;
            let (target_price, stop_price) = match side {
                Side::Long => (
                    entry * (Decimal::ONE + risk.profit_target_pct),
                    entry * (Decimal::ONE - risk.stop_loss_pct),
                ),
                Side::Short => (
                    entry * (Decimal::ONE - risk.profit_target_pct),
                    entry * (Decimal::ONE + risk.stop_loss_pct),
                ),
            };

            let last_reachable = (entry_idx + FORCED_EXIT_HORIZON as usize - 1).min(n - 1);
            let mut exit_return = None;
            let mut held = 0u16;

            for i in entry_idx..=last_reachable {
                held += 1;
                let bar = &bars[i];
                let (hit_stop, hit_target) = match side {
                    Side::Long => (bar.l <= stop_price, bar.h >= target_price),
                    Side::Short => (bar.h >= stop_price, bar.l <= target_price),
                };
                // A bar touching both levels is resolved conservatively in
                // favor of the stop, matching a worst-case fill assumption.
                if hit_stop {
                    exit_return = Some(percent_move(entry, stop_price, side));
                    break;
                }
                if hit_target {
                    exit_return = Some(percent_move(entry, target_price, side));
                    break;
                }
            }

            let (ret, bars_held) = match exit_return {
                Some(r) => (r, held),
                None => {
                    let last_close = bars[last_reachable].c;
                    (percent_move(entry, last_close, side), held)
                }
            };

            returns[d] = ret;
            bars_in_position[d] = bars_held;
        }

        Self {
            returns,
            bars_in_position,
        }
    }
}

fn percent_move(entry: Decimal, exit: Decimal, side: Side) -> Decimal {
    let raw = (exit - entry) / entry;
    match side {
        Side::Long => raw,
        Side::Short => -raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn bar(o: Decimal, h: Decimal, l: Decimal, c: Decimal) -> Bar {
        Bar {
            t: Utc::now(),
            o,
            h,
            l,
            c,
            v: 100,
        }
    }

    #[test]
    fn long_trade_hits_target_before_horizon() {
        let bars = vec![
            bar(dec!(100), dec!(100), dec!(100), dec!(100)),
            bar(dec!(100), dec!(100), dec!(99), dec!(100)),
            bar(dec!(100), dec!(102), dec!(100), dec!(101)),
        ];
        let risk = RiskParameters::new(dec!(0.01), dec!(0.01)).unwrap();
        let sample = SampleRange::InSample { start: 0, end: 10 };
        let base = BaseReturns::build(&bars, Side::Long, &risk, &sample);
        assert_eq!(base.returns[0], dec!(0.01));
        assert_eq!(base.bars_in_position[0], 1);
    }

    #[test]
    fn short_trade_profits_on_decline() {
        let bars = vec![
            bar(dec!(100), dec!(100), dec!(100), dec!(100)),
            bar(dec!(100), dec!(100), dec!(98), dec!(99)),
        ];
        let risk = RiskParameters::new(dec!(0.01), dec!(0.01)).unwrap();
        let sample = SampleRange::InSample { start: 0, end: 10 };
        let base = BaseReturns::build(&bars, Side::Short, &risk, &sample);
        assert_eq!(base.returns[0], dec!(0.01));
    }

    #[test]
    fn dates_outside_sample_range_are_zeroed() {
        let bars = vec![
            bar(dec!(100), dec!(101), dec!(99), dec!(100)),
            bar(dec!(100), dec!(101), dec!(99), dec!(100)),
            bar(dec!(100), dec!(101), dec!(99), dec!(100)),
        ];
        let risk = RiskParameters::new(dec!(0.01), dec!(0.01)).unwrap();
        let sample = SampleRange::InSample { start: 5, end: 10 };
        let base = BaseReturns::build(&bars, Side::Long, &risk, &sample);
        assert!(base.returns.iter().all(|r| *r == Decimal::ZERO));
    }
}
