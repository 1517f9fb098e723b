use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OHLCV bar. Immutable after ingest (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub t: DateTime<Utc>,
    pub o: Decimal,
    pub h: Decimal,
    pub l: Decimal,
    pub c: Decimal,
    pub v: u64,
}

/// A field addressable on a single bar. `Meander` and the `Ibs*` variants
/// are derived fields recovered from `original_source/` (the C++ engine
/// computes comparable per-bar derived quantities beyond raw OHLCV; this
/// spec's distillation only named the tag set). Each remains a pure
/// function of one bar, per spec.md §3's `BarRef`/`PriceField` contract.
///
/// - `Ibs1` is the classic Internal Bar Strength: `(C - L) / (H - L)`.
/// - `Ibs2` is open-relative strength: `(C - O) / (H - L)`.
/// - `Ibs3` is the complement of `Ibs1`: `(H - C) / (H - L)`.
/// - `Meander` is the bar's median price: `(H + L) / 2`.
///
/// When `H == L` (a degenerate/constant bar) the `Ibs*` ratios are
/// undefined; they evaluate to `0.5` (neutral) by convention so that a run
/// over a constant-price series still produces a well-defined (all-false)
/// fact set rather than a division panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
    Meander,
    Ibs1,
    Ibs2,
    Ibs3,
}

impl PriceField {
    pub fn eval(&self, bar: &Bar) -> Decimal {
        match self {
            PriceField::Open => bar.o,
            PriceField::High => bar.h,
            PriceField::Low => bar.l,
            PriceField::Close => bar.c,
            PriceField::Volume => Decimal::from(bar.v),
            PriceField::Meander => (bar.h + bar.l) / Decimal::TWO,
            PriceField::Ibs1 => ibs_ratio(bar, bar.c - bar.l),
            PriceField::Ibs2 => ibs_ratio(bar, bar.c - bar.o),
            PriceField::Ibs3 => ibs_ratio(bar, bar.h - bar.c),
        }
    }

    /// The field universe selected by a [`crate::config::SearchType`].
    pub fn for_search_type(search_type: crate::config::SearchType) -> Vec<PriceField> {
        use crate::config::SearchType::*;
        match search_type {
            CloseOnly => vec![PriceField::Close],
            OpenClose => vec![PriceField::Open, PriceField::Close],
            HighLow => vec![PriceField::High, PriceField::Low],
            Ohlc => vec![
                PriceField::Open,
                PriceField::High,
                PriceField::Low,
                PriceField::Close,
            ],
            Extended => vec![
                PriceField::Open,
                PriceField::High,
                PriceField::Low,
                PriceField::Close,
                PriceField::Volume,
                PriceField::Meander,
                PriceField::Ibs1,
                PriceField::Ibs2,
                PriceField::Ibs3,
            ],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriceField::Open => "OPEN",
            PriceField::High => "HIGH",
            PriceField::Low => "LOW",
            PriceField::Close => "CLOSE",
            PriceField::Volume => "VOLUME",
            PriceField::Meander => "MEANDER",
            PriceField::Ibs1 => "IBS1",
            PriceField::Ibs2 => "IBS2",
            PriceField::Ibs3 => "IBS3",
        }
    }

    /// Inverse of [`PriceField::label`], used to re-parse an emitted `barref`
    /// (spec.md §6) back into a typed field for the round-trip law in §8.
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(PriceField::Open),
            "HIGH" => Some(PriceField::High),
            "LOW" => Some(PriceField::Low),
            "CLOSE" => Some(PriceField::Close),
            "VOLUME" => Some(PriceField::Volume),
            "MEANDER" => Some(PriceField::Meander),
            "IBS1" => Some(PriceField::Ibs1),
            "IBS2" => Some(PriceField::Ibs2),
            "IBS3" => Some(PriceField::Ibs3),
            _ => None,
        }
    }
}

fn ibs_ratio(bar: &Bar, numerator: Decimal) -> Decimal {
    let range = bar.h - bar.l;
    if range == Decimal::ZERO {
        Decimal::new(5, 1) // 0.5
    } else {
        numerator / range
    }
}

/// An address `(offset, field)` into the rolling bar window. Offset 0 is
/// the most recently completed bar (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BarRef {
    pub offset: u8,
    pub field: PriceField,
}

impl BarRef {
    pub fn new(offset: u8, field: PriceField) -> Self {
        Self { offset, field }
    }

    /// Resolve this address against a window where `window[i]` is the bar
    /// at offset `i` (0 = most recent). Returns `None` if the window is
    /// shorter than `offset + 1`.
    pub fn resolve(&self, window: &[Bar]) -> Option<Decimal> {
        window.get(self.offset as usize).map(|b| self.field.eval(b))
    }

    pub fn render(&self) -> String {
        format!("{} OF {} BARS AGO", self.field.label(), self.offset)
    }
}

/// A same-offset pair where either side is High or Low is structurally
/// trivial: High is the bar's maximum and Low its minimum, so a same-bar
/// comparison against either is guaranteed by construction and carries no
/// discriminative information (spec.md §4.1 step 4: "excluding self-pairs
/// that are trivially true"). Same-bar Open-vs-Close is NOT guaranteed and
/// must remain a valid fact.
pub fn is_trivial_same_bar_pair(a: PriceField, b: PriceField) -> bool {
    use PriceField::*;
    let is_high_or_low = |f: PriceField| matches!(f, High | Low);
    is_high_or_low(a) || is_high_or_low(b)
}
