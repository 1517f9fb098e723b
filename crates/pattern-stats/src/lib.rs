//! Numeric helpers shared by the mRMR stepping policy (C6) and the
//! permutation validator (C9): plain statistics over `f64` slices in the
//! style of `analysis-core::adaptive`, plus the fact-similarity matrix and
//! its running-max redundancy cache recovered from
//! `ValarrayMutualizer` (`original_source/libs/pasearchalgo/valarraymutualizer.h`).

use rayon::prelude::*;
use rust_decimal::Decimal;
use statrs::distribution::{ContinuousCDF, Normal};

/// Arithmetic mean of a data slice. `0.0` on empty input.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample standard deviation. `0.0` when fewer than two observations.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    variance.sqrt()
}

/// Standard normal CDF, used to translate z-scores into p-values where the
/// permutation validator needs a parametric cross-check (statrs-backed,
/// matching `backtest-engine::statistical::normal_cdf`).
pub fn normal_cdf(z: f64) -> f64 {
    Normal::new(0.0, 1.0)
        .map(|n| n.cdf(z))
        .unwrap_or(0.5)
}

/// `1 − mean(|M[i,·] − M[j,·]|)` — the `[0,1]` trading-footprint overlap
/// score between two fact bit-vectors (spec.md §4.5 precomputation).
pub fn footprint_similarity(a: &[bool], b: &[bool]) -> Decimal {
    debug_assert_eq!(a.len(), b.len(), "fact vectors must share length N");
    if a.is_empty() {
        return Decimal::ONE;
    }
    let differing = a
        .iter()
        .zip(b.iter())
        .filter(|(x, y)| x != y)
        .count();
    let n = a.len() as u64;
    Decimal::ONE - Decimal::from(differing) / Decimal::from(n)
}

/// Symmetric `R[i, j] = footprint_similarity(M[i,·], M[j,·])` over every
/// FactId pair, computed once per run (spec.md §4.5). `vectors[k]` must be
/// the bit-vector for FactId `k`; the returned matrix is addressed the
/// same way. The upper triangle is computed in parallel and mirrored.
pub fn similarity_matrix(vectors: &[Vec<bool>]) -> Vec<Vec<Decimal>> {
    let n = vectors.len();
    let mut matrix = vec![vec![Decimal::ONE; n]; n];
    let rows: Vec<(usize, Vec<(usize, Decimal)>)> = (0..n)
        .into_par_iter()
        .map(|i| {
            let row: Vec<(usize, Decimal)> = (i + 1..n)
                .map(|j| (j, footprint_similarity(&vectors[i], &vectors[j])))
                .collect();
            (i, row)
        })
        .collect();
    for (i, row) in rows {
        for (j, sim) in row {
            matrix[i][j] = sim;
            matrix[j][i] = sim;
        }
    }
    matrix
}

/// Running-max redundancy cache, grounded on `ValarrayMutualizer`'s
/// `mIndexedSums`/`initRedundancyMax`/`getRedundancyMax` (spec.md §4.5): as
/// each candidate is added to the selected set, every remaining result's
/// cached maximum redundancy against the selected set is updated in
/// O(1) amortized per pair rather than recomputed from scratch, so scoring
/// one more candidate against `k` selected strategies costs O(1) instead of
/// O(k).
#[derive(Debug, Clone)]
pub struct RedundancyCache {
    /// `running_max[r]` = max similarity observed so far between result
    /// index `r` (a position in the sorted candidate list) and any
    /// already-selected result's facts.
    running_max: Vec<Decimal>,
}

impl RedundancyCache {
    pub fn new(len: usize) -> Self {
        Self {
            running_max: vec![Decimal::ZERO; len],
        }
    }

    pub fn get(&self, index: usize) -> Decimal {
        self.running_max[index]
    }

    /// Folds in the pairwise-max similarity between candidate `index` and a
    /// newly selected candidate's fact similarity `new_pair_max`, keeping
    /// the running maximum.
    pub fn update(&mut self, index: usize, new_pair_max: Decimal) {
        if new_pair_max > self.running_max[index] {
            self.running_max[index] = new_pair_max;
        }
    }

    /// `pairwiseMaxRed(A, B) = max_{a∈A, b∈B} R[a,b]` (spec.md §4.5).
    pub fn pairwise_max_redundancy(
        similarity: &[Vec<Decimal>],
        a: &[u32],
        b: &[u32],
    ) -> Decimal {
        a.iter()
            .flat_map(|&ai| b.iter().map(move |&bi| similarity[ai as usize][bi as usize]))
            .fold(Decimal::ZERO, Decimal::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn identical_vectors_are_fully_similar() {
        let a = vec![true, false, true, true];
        assert_eq!(footprint_similarity(&a, &a), Decimal::ONE);
    }

    #[test]
    fn fully_disjoint_vectors_have_zero_similarity() {
        let a = vec![true, true, false, false];
        let b = vec![false, false, true, true];
        assert_eq!(footprint_similarity(&a, &b), Decimal::ZERO);
    }

    #[test]
    fn redundancy_cache_tracks_running_maximum() {
        let mut cache = RedundancyCache::new(3);
        cache.update(1, dec!(0.2));
        cache.update(1, dec!(0.6));
        cache.update(1, dec!(0.4));
        assert_eq!(cache.get(1), dec!(0.6));
        assert_eq!(cache.get(0), Decimal::ZERO);
    }

    #[test]
    fn normal_cdf_is_monotone_and_centered() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-9);
        assert!(normal_cdf(-2.0) < normal_cdf(-1.0));
        assert!(normal_cdf(1.0) < normal_cdf(2.0));
    }
}
