//! Bar buffer & comparison generator (C1) and sparse fact matrix (C2).
//!
//! The spec describes C1 as an incremental `pushBar` state machine over a
//! circular buffer; this implementation builds the same result in one pass
//! over a complete bar series, which is the shape every caller in this
//! workspace actually needs (a full historical run, not a streaming feed).
//! The per-date window used to evaluate each fact is exactly the one
//! `pushBar` would have produced after ingesting bars `0..=d`.

use pattern_core::{BarRef, Fact, FactId, FactTable, PriceField, SearchType};
use pattern_core::{Bar, PatternError, PatternResult};

/// Read-only result of comparison generation: the fact universe plus one
/// bit-vector (column) per `FactId`, each of length `N` (spec.md §4.1 "Matrix
/// materialization").
#[derive(Debug, Clone)]
pub struct FactMatrix {
    facts: FactTable,
    columns: Vec<Vec<bool>>,
    num_dates: usize,
}

impl FactMatrix {
    /// Builds the fact table and sparse matrix for `lookback` bars of
    /// history (`offset in 0..lookback`) over the field universe selected
    /// by `search_type`. Never fails: degenerate inputs (`bars.len() < 2`,
    /// `lookback == 0`, or an empty field set) yield an empty matrix
    /// (spec.md §4.1 "Failure semantics").
    pub fn build(bars: &[Bar], lookback: u8, search_type: SearchType) -> Self {
        let fields = PriceField::for_search_type(search_type);
        let n = bars.len();
        if n < 2 || lookback == 0 || fields.is_empty() {
            return Self {
                facts: FactTable::new(),
                columns: Vec::new(),
                num_dates: n,
            };
        }

        let facts = FactTable::generate(lookback, &fields);
        let mut columns = vec![vec![false; n]; facts.len()];

        for d in 0..n {
            let window = window_at(bars, d, lookback);
            for (id, fact) in facts.iter() {
                if let Some(true) = fact.eval(&window) {
                    columns[id.0 as usize][d] = true;
                }
            }
        }

        Self {
            facts,
            columns,
            num_dates: n,
        }
    }

    pub fn facts(&self) -> &FactTable {
        &self.facts
    }

    pub fn num_dates(&self) -> usize {
        self.num_dates
    }

    /// The bit-vector `M[f, ·]` for one fact. Panics if `f` is absent from
    /// the table (spec.md §4.3: an invariant violation here is a
    /// programming error).
    pub fn column(&self, f: FactId) -> &[bool] {
        &self.columns[f.0 as usize]
    }

    /// `footprint(S) = ⋀_{f∈S} M[f,·]` (spec.md §3 "Pattern footprint").
    /// Depends only on the set of facts, never their insertion order.
    pub fn footprint(&self, ids: &[FactId]) -> Vec<bool> {
        let mut out = vec![true; self.num_dates];
        for &id in ids {
            let col = self.column(id);
            debug_assert_eq!(col.len(), self.num_dates, "fact column length must equal N");
            for (o, c) in out.iter_mut().zip(col.iter()) {
                *o = *o && *c;
            }
        }
        out
    }

    pub fn validate_non_empty(&self) -> PatternResult<()> {
        if self.facts.is_empty() {
            return Err(PatternError::EmptyFactTable(
                "no facts were generated for the configured search type and window".into(),
            ));
        }
        Ok(())
    }
}

/// Builds the rolling window ending at date `d`: `window[i]` is the bar at
/// offset `i` (0 = most recent, i.e. `bars[d - i]`). Shorter than `lookback`
/// near the start of the series; addresses beyond the window simply fail
/// to resolve (see `BarRef::resolve`).
fn window_at(bars: &[Bar], d: usize, lookback: u8) -> Vec<Bar> {
    let span = (lookback as usize).min(d + 1);
    let mut window = Vec::with_capacity(span);
    for offset in 0..span {
        window.push(bars[d - offset].clone());
    }
    window
}

/// Renders a [`BarRef`] with a label independent from [`PriceField::label`],
/// kept here only to document the address shape C1 enumerates over.
pub fn address_count(lookback: u8, fields: &[PriceField]) -> usize {
    lookback as usize * fields.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pattern_core::{BarRef, Fact};
    use rust_decimal_macros::dec;

    fn flat_series(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|_| Bar {
                t: Utc::now(),
                o: dec!(1),
                h: dec!(1),
                l: dec!(1),
                c: dec!(1),
                v: 100,
            })
            .collect()
    }

    fn monotone_up(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let c = dec!(100) + rust_decimal::Decimal::from(i as u64);
                Bar {
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

    #[test]
    fn constant_series_has_zero_facts() {
        let bars = flat_series(300);
        let m = FactMatrix::build(&bars, 3, SearchType::Ohlc);
        assert_eq!(m.facts().len(), 0);
        assert!(m.validate_non_empty().is_err());
    }

    #[test]
    fn short_series_is_degenerate_but_does_not_fail() {
        let bars = flat_series(1);
        let m = FactMatrix::build(&bars, 3, SearchType::Ohlc);
        assert_eq!(m.facts().len(), 0);
    }

    #[test]
    fn monotone_series_close0_gt_close1_is_true_from_date_one() {
        let bars = monotone_up(300);
        let m = FactMatrix::build(&bars, 2, SearchType::CloseOnly);
        let fact = Fact::new(
            BarRef::new(0, PriceField::Close),
            BarRef::new(1, PriceField::Close),
        )
        .unwrap();
        let id = m
            .facts()
            .iter()
            .find(|(_, f)| **f == fact)
            .map(|(id, _)| id)
            .expect("fact must be present");
        let col = m.column(id);
        assert!(!col[0]);
        assert!(col[1..].iter().all(|&b| b));
    }

    #[test]
    fn footprint_is_order_independent() {
        let bars = monotone_up(50);
        let m = FactMatrix::build(&bars, 3, SearchType::Ohlc);
        let ids: Vec<FactId> = m.facts().iter().map(|(id, _)| id).take(3).collect();
        let mut reversed = ids.clone();
        reversed.reverse();
        assert_eq!(m.footprint(&ids), m.footprint(&reversed));
    }
}
