//! Non-fatal exclusion counters surfaced in the run summary (spec.md §7:
//! `degenerate=<n>, below_min_trades=<n>, inactive=<n>, duplicate_footprint=<n>`).

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub degenerate: u32,
    pub below_min_trades: u32,
    pub inactive: u32,
    pub duplicate_footprint: u32,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: &RunCounters) {
        self.degenerate += other.degenerate;
        self.below_min_trades += other.below_min_trades;
        self.inactive += other.inactive;
        self.duplicate_footprint += other.duplicate_footprint;
    }
}

impl std::fmt::Display for RunCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "degenerate={}, below_min_trades={}, inactive={}, duplicate_footprint={}",
            self.degenerate, self.below_min_trades, self.inactive, self.duplicate_footprint
        )
    }
}
