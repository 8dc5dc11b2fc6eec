//! Coefficient enumeration over the box `[-L, L]^d`
//!
//! The enumerator is a lazy odometer: it keeps only the current coefficient
//! vector, so memory stays `O(d)` no matter how large `(2L+1)^d` is. Vectors
//! come out in lexicographic order with the first component most significant,
//! which is the order the point budget truncates against.

use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

/// Size of the coefficient box, `base^exponent` with `base = 2L + 1`.
///
/// Kept symbolic because `21^400` does not fit any machine integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationCount {
    /// Values per coordinate (`2L + 1`)
    pub base: u64,
    /// Number of coordinates (`d`)
    pub exponent: usize,
}

impl CombinationCount {
    /// Count for dimension `d` and sum limit `L`
    pub fn new(dimension: usize, sum_limit: u32) -> Self {
        CombinationCount {
            base: 2 * u64::from(sum_limit) + 1,
            exponent: dimension,
        }
    }

    /// Exact count if it fits in a `u128`.
    ///
    /// A zero-dimensional box enumerates nothing, so its count is zero.
    pub fn exact(&self) -> Option<u128> {
        if self.exponent == 0 {
            return Some(0);
        }
        let exponent = u32::try_from(self.exponent).ok()?;
        u128::from(self.base).checked_pow(exponent)
    }

    /// Whether the count is strictly greater than `n`
    pub fn exceeds(&self, n: usize) -> bool {
        match self.exact() {
            Some(count) => count > n as u128,
            None => true,
        }
    }

    /// Count clamped to `limit`
    pub fn min_with(&self, limit: usize) -> usize {
        match self.exact() {
            Some(count) if count < limit as u128 => count as usize,
            _ => limit,
        }
    }

    /// Decimal logarithm of the count
    pub fn log10(&self) -> f64 {
        if self.exponent == 0 {
            return f64::NEG_INFINITY;
        }
        self.exponent as f64 * (self.base as f64).log10()
    }
}

impl std::fmt::Display for CombinationCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.exact() {
            Some(count) => write!(f, "{}", count),
            None => write!(f, "{}^{}", self.base, self.exponent),
        }
    }
}

/// Lazy iterator over every integer vector in `[-L, L]^d`
#[derive(Debug, Clone)]
pub struct CoefficientEnumerator {
    current: Vec<i64>,
    limit: i64,
    exhausted: bool,
}

impl CoefficientEnumerator {
    /// Enumerate `[-L, L]^d`, starting at `(-L, ..., -L)`
    pub fn new(dimension: usize, sum_limit: u32) -> Self {
        let limit = i64::from(sum_limit);
        CoefficientEnumerator {
            current: vec![-limit; dimension],
            limit,
            exhausted: dimension == 0,
        }
    }

    /// Dimension of the produced vectors
    pub fn dimension(&self) -> usize {
        self.current.len()
    }

    /// Total size of the box being enumerated
    pub fn combination_count(&self) -> CombinationCount {
        CombinationCount::new(self.current.len(), self.limit as u32)
    }

    /// Advance the odometer; returns false once every digit wrapped
    fn advance(&mut self) -> bool {
        for digit in self.current.iter_mut().rev() {
            if *digit < self.limit {
                *digit += 1;
                return true;
            }
            *digit = -self.limit;
        }
        false
    }
}

impl Iterator for CoefficientEnumerator {
    type Item = Vec<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let item = self.current.clone();
        if !self.advance() {
            self.exhausted = true;
        }
        Some(item)
    }
}

impl FusedIterator for CoefficientEnumerator {}

/// Coefficient vector at position `index` of the enumeration order.
///
/// Decodes `index` as a mixed-radix number with the first component most
/// significant, so `coefficients_at(d, L, k)` equals the `k`-th item of
/// `CoefficientEnumerator::new(d, L)`.
pub fn coefficients_at(dimension: usize, sum_limit: u32, index: u64) -> Vec<i64> {
    let limit = i64::from(sum_limit);
    let base = 2 * u64::from(sum_limit) + 1;
    let mut remaining = index;
    let mut coefficients = vec![-limit; dimension];
    for slot in coefficients.iter_mut().rev() {
        if remaining == 0 {
            break;
        }
        *slot = (remaining % base) as i64 - limit;
        remaining /= base;
    }
    coefficients
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_full_enumeration_is_complete_and_distinct() {
        let all: Vec<Vec<i64>> = CoefficientEnumerator::new(3, 2).collect();
        assert_eq!(all.len(), 125);
        let unique: HashSet<_> = all.iter().cloned().collect();
        assert_eq!(unique.len(), 125);
        assert!(all.iter().flatten().all(|&c| (-2..=2).contains(&c)));
    }

    #[test]
    fn test_lexicographic_order() {
        let all: Vec<Vec<i64>> = CoefficientEnumerator::new(2, 1).collect();
        assert_eq!(all[0], vec![-1, -1]);
        assert_eq!(all[1], vec![-1, 0]);
        assert_eq!(all[2], vec![-1, 1]);
        assert_eq!(all[3], vec![0, -1]);
        assert_eq!(all[8], vec![1, 1]);
    }

    #[test]
    fn test_zero_limit_and_zero_dimension() {
        let zero_limit: Vec<Vec<i64>> = CoefficientEnumerator::new(4, 0).collect();
        assert_eq!(zero_limit, vec![vec![0, 0, 0, 0]]);
        assert_eq!(CoefficientEnumerator::new(0, 3).count(), 0);
    }

    #[test]
    fn test_early_termination_at_large_dimension() {
        let first: Vec<Vec<i64>> = CoefficientEnumerator::new(400, 10).take(5).collect();
        assert_eq!(first.len(), 5);
        assert_eq!(first[4][399], -6);
        assert!(first[4][..399].iter().all(|&c| c == -10));
    }

    #[test]
    fn test_coefficients_at_matches_iteration() {
        for (index, coeffs) in CoefficientEnumerator::new(3, 1).enumerate() {
            assert_eq!(coefficients_at(3, 1, index as u64), coeffs);
        }
    }

    #[test]
    fn test_combination_count() {
        let count = CombinationCount::new(3, 10);
        assert_eq!(count.exact(), Some(9261));
        assert!(count.exceeds(100));
        assert!(!count.exceeds(9261));
        assert_eq!(count.min_with(100), 100);
        assert_eq!(count.to_string(), "9261");

        let huge = CombinationCount::new(400, 10);
        assert_eq!(huge.exact(), None);
        assert!(huge.exceeds(usize::MAX));
        assert_eq!(huge.to_string(), "21^400");
        assert!((huge.log10() - 400.0 * 21f64.log10()).abs() < 1e-9);
    }
}
