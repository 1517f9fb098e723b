use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::price::{is_trivial_same_bar_pair, Bar, BarRef, PriceField};

/// Dense index into a [`FactTable`]. Kept distinct from `u32` so the bit
/// position in the sparse matrix (C2) can never be confused with an
/// arbitrary integer (spec.md §3 "FactId").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactId(pub u32);

/// An atomic comparison between two addressable bar fields. Canonical form
/// is fixed at construction by `(offset, field)` address order — `lhs` is
/// always the lexicographically smaller `BarRef` — never by which side
/// happens to be numerically larger on any given date. This keeps exactly
/// one direction of each unordered `{BarRef, BarRef}` pair in the fact
/// universe (spec.md §4.1 step 4), with the complementary "less than"
/// relation implicit (a date where `lhs <= rhs` simply clears the bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fact {
    lhs: BarRef,
    rhs: BarRef,
}

impl Fact {
    /// Builds the canonical form of a comparison between two addresses.
    /// Returns `None` for the trivial self-pair (`a == a`) and for same-bar
    /// OHLC pairs whose order is structurally guaranteed
    /// (see [`is_trivial_same_bar_pair`]).
    pub fn new(a: BarRef, b: BarRef) -> Option<Self> {
        if a == b {
            return None;
        }
        if a.offset == b.offset && is_trivial_same_bar_pair(a.field, b.field) {
            return None;
        }
        let (lhs, rhs) = if a < b { (a, b) } else { (b, a) };
        Some(Fact { lhs, rhs })
    }

    pub fn lhs(&self) -> BarRef {
        self.lhs
    }

    pub fn rhs(&self) -> BarRef {
        self.rhs
    }

    /// Evaluates `lhs > rhs` against a window where `window[i]` is the bar
    /// at offset `i` (0 = most recent). Returns `None` if the window does
    /// not reach back far enough to resolve both addresses.
    pub fn eval(&self, window: &[Bar]) -> Option<bool> {
        let l = self.lhs.resolve(window)?;
        let r = self.rhs.resolve(window)?;
        Some(l > r)
    }

    pub fn render(&self) -> String {
        format!("{} > {}", self.lhs.render(), self.rhs.render())
    }
}

/// A deduplicated, sorted collection of [`FactId`]s — a conjunction of
/// atomic comparisons that together define one candidate pattern
/// (spec.md §3 "FactSet").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSet(Vec<FactId>);

impl FactSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_ids(mut ids: Vec<FactId>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    pub fn contains(&self, id: FactId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Returns a new `FactSet` extended with `id`, or `self` unchanged (as
    /// `None`) if `id` is already present.
    pub fn extended(&self, id: FactId) -> Option<Self> {
        if self.contains(id) {
            return None;
        }
        let mut ids = self.0.clone();
        ids.push(id);
        ids.sort_unstable();
        Some(Self(ids))
    }

    pub fn ids(&self) -> &[FactId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Bidirectional registry of every [`Fact`] discovered during comparison
/// generation (C1), assigning each a dense [`FactId`] used as a bit
/// position by the sparse fact matrix (C2).
#[derive(Debug, Clone, Default)]
pub struct FactTable {
    facts: Vec<Fact>,
    index: HashMap<Fact, FactId>,
}

impl FactTable {
    pub fn new() -> Self {
        Self {
            facts: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registers `fact`, returning its (possibly newly assigned) `FactId`.
    pub fn intern(&mut self, fact: Fact) -> FactId {
        if let Some(id) = self.index.get(&fact) {
            return *id;
        }
        let id = FactId(self.facts.len() as u32);
        self.facts.push(fact);
        self.index.insert(fact, id);
        id
    }

    pub fn get(&self, id: FactId) -> Option<&Fact> {
        self.facts.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FactId, &Fact)> {
        self.facts
            .iter()
            .enumerate()
            .map(|(i, f)| (FactId(i as u32), f))
    }

    /// Enumerates the canonical fact universe for a rolling window of
    /// `depth` bars (offsets `0..depth`) over `fields`, per spec.md §4.1's
    /// comparison-generation algorithm: every unordered pair of distinct
    /// `(offset, field)` addresses, minus trivial same-bar OHLC pairs.
    pub fn generate(depth: u8, fields: &[PriceField]) -> Self {
        let mut table = Self::new();
        let mut addrs = Vec::with_capacity(depth as usize * fields.len());
        for offset in 0..depth {
            for &field in fields {
                addrs.push(BarRef::new(offset, field));
            }
        }
        for i in 0..addrs.len() {
            for j in (i + 1)..addrs.len() {
                if let Some(fact) = Fact::new(addrs[i], addrs[j]) {
                    table.intern(fact);
                }
            }
        }
        table
    }
}
