use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fact::FactSet;

/// Performance statistics produced by the shortcut backtester (C4) for one
/// FactSet (spec.md §3 "Candidate result", minus the `factset`/`id` fields
/// which [`CandidateResult`] carries separately).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateStats {
    pub pf: Decimal,
    pub payoff: Decimal,
    pub pal_prof: Decimal,
    pub trades: u32,
    pub max_losers: u32,
    pub max_inactivity: u32,
}

/// `{ factset, stats, id }` — `id` is dense and assigned in creation order
/// (spec.md §3). Produced by the backtest processor (C5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub factset: FactSet,
    pub stats: CandidateStats,
    pub id: u32,
}

impl CandidateResult {
    pub fn new(id: u32, factset: FactSet, stats: CandidateStats) -> Self {
        Self { factset, stats, id }
    }
}
