//! Bar ingestion gate (spec.md §6 "Bar ingestion (input to C1)"): callers
//! push `(timestamp, open, high, low, close, volume)` tuples in ascending
//! time order. Out-of-order or duplicate timestamps are rejected with
//! `DataOrderError` before they ever reach the comparison generator (C1).

use pattern_core::{Bar, PatternError, PatternResult};

/// Accumulates bars under a strict-ascending-timestamp invariant. Kept
/// separate from [`crate::matrix::FactMatrix`], which assumes its input
/// slice already satisfies that invariant.
#[derive(Debug, Default)]
pub struct BarIngest {
    bars: Vec<Bar>,
}

impl BarIngest {
    pub fn new() -> Self {
        Self { bars: Vec::new() }
    }

    /// Appends `bar`, rejecting it with `DataOrderError` if its timestamp
    /// does not strictly follow the last accepted bar's.
    pub fn push(&mut self, bar: Bar) -> PatternResult<()> {
        if let Some(last) = self.bars.last() {
            if bar.t <= last.t {
                return Err(PatternError::DataOrder(format!(
                    "bar timestamp {} is not strictly after the last ingested bar {}",
                    bar.t, last.t
                )));
            }
        }
        self.bars.push(bar);
        Ok(())
    }

    /// Ingests a full series in one pass, rejecting on the first ordering
    /// violation rather than partially updating state.
    pub fn push_all(&mut self, bars: impl IntoIterator<Item = Bar>) -> PatternResult<()> {
        for bar in bars {
            self.push(bar)?;
        }
        Ok(())
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bar(minute: i64) -> Bar {
        Bar {
            t: Utc.timestamp_opt(60 * minute, 0).unwrap(),
            o: dec!(1),
            h: dec!(1),
            l: dec!(1),
            c: dec!(1),
            v: 100,
        }
    }

    #[test]
    fn ascending_bars_are_accepted() {
        let mut ingest = BarIngest::new();
        ingest.push_all(vec![bar(1), bar(2), bar(3)]).unwrap();
        assert_eq!(ingest.bars().len(), 3);
    }

    #[test]
    fn duplicate_timestamp_is_rejected() {
        let mut ingest = BarIngest::new();
        ingest.push(bar(1)).unwrap();
        let err = ingest.push(bar(1));
        assert!(matches!(err, Err(PatternError::DataOrder(_))));
    }

    #[test]
    fn out_of_order_timestamp_is_rejected() {
        let mut ingest = BarIngest::new();
        ingest.push(bar(5)).unwrap();
        let err = ingest.push(bar(3));
        assert!(matches!(err, Err(PatternError::DataOrder(_))));
    }
}
