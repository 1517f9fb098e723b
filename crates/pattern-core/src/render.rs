use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::candidate::CandidateStats;
use crate::config::{RiskParameters, Side};
use crate::error::{PatternError, PatternResult};
use crate::fact::{Fact, FactSet, FactTable};
use crate::price::{BarRef, PriceField};

const SEPARATOR_WIDTH: usize = 130;

/// Renders one survivor as the legacy textual block (spec.md §6 "Emitted
/// pattern format"), recovered from `LogPalPattern.cpp`/`.h`. Pure function
/// of its inputs; round-tripping with a parser that re-canonicalizes the
/// `IF … >` clauses into a [`FactSet`] must reproduce the original set
/// (spec.md §8 "Fact rendering" law).
///
/// `pal_profitability_pct` and `profit_factor_pct` are the `PL`/`PS` fields
/// of the legacy header; they carry PAL-profitability and profit factor
/// respectively, each expressed as a percentage (see DESIGN.md for this
/// Open Question's resolution).
#[allow(clippy::too_many_arguments)]
pub fn render_survivor_block(
    facts: &FactTable,
    factset: &FactSet,
    stats: &CandidateStats,
    source: &str,
    index: u32,
    index_date: NaiveDate,
    side: Side,
    risk: &RiskParameters,
) -> String {
    let pal_prof_pct = stats.pal_prof * Decimal::ONE_HUNDRED;
    let pf_pct = stats.pf * Decimal::ONE_HUNDRED;

    let mut out = String::new();
    out.push_str(&format!(
        "{{File:{source}  Index:{index}  Index DATE:{}  PL:{pal_prof_pct}%  PS:{pf_pct}%  Trades:{}  CL:{}}}\n",
        index_date.format("%Y%m%d"),
        stats.trades,
        stats.max_losers,
    ));

    out.push_str("IF ");
    for (i, id) in factset.ids().iter().enumerate() {
        if i > 0 {
            out.push_str(" AND ");
        }
        let fact = facts
            .get(*id)
            .expect("FactSet references a FactId absent from the table");
        out.push_str(&fact.render());
    }
    out.push('\n');

    let action = match side {
        Side::Long => "BUY",
        Side::Short => "SELL",
    };
    out.push_str(&format!("THEN {action} NEXT BAR ON THE OPEN WITH\n"));
    out.push_str(&format!(
        "PROFIT TARGET AT ENTRY PRICE \u{00b1}{} %\n",
        risk.profit_target_pct
    ));
    out.push_str(&format!(
        "AND STOP LOSS AT ENTRY PRICE \u{2213}{} %\n",
        risk.stop_loss_pct
    ));
    out.push_str(&"-".repeat(SEPARATOR_WIDTH));
    out.push('\n');
    out
}

/// Parses one rendered `barref` (`<FIELD> OF <offset> BARS AGO`, spec.md
/// §6) back into a [`BarRef`].
pub fn parse_bar_ref(s: &str) -> PatternResult<BarRef> {
    let s = s.trim();
    let rest = s
        .strip_suffix(" BARS AGO")
        .ok_or_else(|| PatternError::DataRange(format!("malformed barref: {s}")))?;
    let (field_str, offset_str) = rest
        .split_once(" OF ")
        .ok_or_else(|| PatternError::DataRange(format!("malformed barref: {s}")))?;
    let field = PriceField::from_label(field_str)
        .ok_or_else(|| PatternError::DataRange(format!("unknown field in barref: {field_str}")))?;
    let offset: u8 = offset_str
        .parse()
        .map_err(|_| PatternError::DataRange(format!("malformed offset in barref: {offset_str}")))?;
    Ok(BarRef::new(offset, field))
}

/// Parses one `<barref> > <barref>` clause into its canonical [`Fact`].
pub fn parse_fact_clause(s: &str) -> PatternResult<Fact> {
    let (lhs, rhs) = s
        .split_once(" > ")
        .ok_or_else(|| PatternError::DataRange(format!("malformed comparison: {s}")))?;
    let a = parse_bar_ref(lhs)?;
    let b = parse_bar_ref(rhs)?;
    Fact::new(a, b).ok_or_else(|| PatternError::DataRange(format!("trivial comparison: {s}")))
}

/// Parses an emitted `IF <barref> > <barref> AND …` line back into the
/// [`FactSet`] it renders, resolving each clause's canonical [`Fact`]
/// against `facts` (spec.md §8 "Fact rendering" round-trip law). Returns
/// `DataRangeError` if a clause's fact was never interned in `facts`.
pub fn parse_if_line(line: &str, facts: &FactTable) -> PatternResult<FactSet> {
    let body = line
        .trim()
        .strip_prefix("IF ")
        .ok_or_else(|| PatternError::DataRange(format!("expected IF clause, got: {line}")))?;

    let mut ids = Vec::new();
    for clause in body.split(" AND ") {
        let fact = parse_fact_clause(clause)?;
        let id = facts
            .iter()
            .find(|(_, f)| **f == fact)
            .map(|(id, _)| id)
            .ok_or_else(|| {
                PatternError::DataRange(format!("fact not present in table: {}", fact.render()))
            })?;
        ids.push(id);
    }
    Ok(FactSet::from_ids(ids))
}
