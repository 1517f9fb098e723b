//! The single fixed-point numeric type used across the pattern-discovery
//! workspace, collapsing the teacher's `<class Decimal>` template parameter
//! (spec.md §9, "Template-heavy numeric types") into one concrete alias.

use rust_decimal::Decimal;

/// Number of fractional digits every stored [`Decimal`] is expected to carry.
/// `rust_decimal` itself supports up to 28-29 significant digits; this crate
/// only documents the precision floor the spec requires (>= 7).
pub const DECIMAL_SCALE: u32 = 7;

/// Sentinel profit factor reported when a candidate has winners but no
/// losers (spec.md §4.3: "+∞ (or ONE_HUNDRED) when no losers").
pub const PF_NO_LOSERS_SENTINEL: Decimal = Decimal::ONE_HUNDRED;

/// Profit factor reported when a candidate has no winners, or fewer trades
/// than `minTrades` (spec.md §4.3).
pub const PF_DEGENERATE: Decimal = Decimal::ZERO;

/// Returns true for the two profit-factor sentinels the mRMR stepping
/// policy and survival filter must exclude (spec.md §4.5 "Degenerate
/// results").
pub fn is_degenerate_pf(pf: Decimal) -> bool {
    pf == PF_DEGENERATE || pf == PF_NO_LOSERS_SENTINEL
}
