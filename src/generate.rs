//! Lattice point generation
//!
//! Every coefficient vector `c` from the enumerator is mapped to the lattice
//! point `c · B`. Generation stops after the point budget; the report always
//! carries both the size of the coefficient box and how many points were
//! actually materialized, so truncation is never silent.

use crate::config::{EngineParams, DEFAULT_POINT_BUDGET};
use crate::core::error::{LatticeError, Result};
use crate::core::matrix::Matrix;
use crate::core::types::{LatticeVector, Point3};
use crate::enumerate::{CoefficientEnumerator, CombinationCount};
use crate::project::project_all;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// How a generation call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    /// Every coefficient vector was turned into a point
    Complete,
    /// The coefficient box was larger than the point budget; the first
    /// `point_budget` vectors in enumeration order were kept
    Capped,
    /// The time limit elapsed before the budget was reached
    TimedOut,
    /// The caller raised the cancellation flag
    Cancelled,
}

/// Result of one generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Lattice dimension
    pub dimension: usize,
    /// Sum limit used for enumeration
    pub sum_limit: u32,
    /// Budget in force for this call
    pub point_budget: usize,
    /// Size of the coefficient box before capping, `(2L+1)^d`
    pub count_before_cap: CombinationCount,
    /// Number of points actually produced
    pub materialized: usize,
    /// Why generation stopped
    pub status: BudgetStatus,
    /// The produced points, in enumeration order
    pub points: Vec<LatticeVector>,
}

impl GenerationReport {
    /// Whether fewer points were produced than the coefficient box holds
    pub fn is_truncated(&self) -> bool {
        self.status != BudgetStatus::Complete
    }

    /// Points projected to three components for display
    pub fn projected(&self) -> Vec<Point3> {
        project_all(&self.points)
    }
}

/// Parameters for point generation
#[derive(Debug, Clone)]
pub struct GeneratorParams {
    /// Maximum number of points to materialize
    pub point_budget: usize,
    /// Wall-clock budget for one call
    pub time_limit: Option<Duration>,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        GeneratorParams {
            point_budget: DEFAULT_POINT_BUDGET,
            time_limit: None,
        }
    }
}

impl From<&EngineParams> for GeneratorParams {
    fn from(params: &EngineParams) -> Self {
        GeneratorParams {
            point_budget: params.point_budget,
            time_limit: params.time_limit(),
        }
    }
}

impl GeneratorParams {
    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if self.point_budget == 0 {
            return Err(LatticeError::invalid_parameters(
                "Point budget must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Lattice point generator
#[derive(Debug, Clone, Default)]
pub struct LatticePointGenerator {
    params: GeneratorParams,
}

impl LatticePointGenerator {
    /// Create a generator with the default budget
    pub fn new() -> Self {
        Self::with_params(GeneratorParams::default())
    }

    /// Create a generator with custom parameters
    pub fn with_params(params: GeneratorParams) -> Self {
        LatticePointGenerator { params }
    }

    /// Generator parameters
    pub fn params(&self) -> &GeneratorParams {
        &self.params
    }

    /// Generate `{c · B : c ∈ [-L, L]^d}`, capped at the point budget
    pub fn generate(&self, basis: &Matrix, dimension: usize, sum_limit: u32) -> Result<GenerationReport> {
        let never = AtomicBool::new(false);
        self.generate_cancellable(basis, dimension, sum_limit, &never)
    }

    /// Like [`generate`](Self::generate), stopping early once `cancel` is set
    pub fn generate_cancellable(
        &self,
        basis: &Matrix,
        dimension: usize,
        sum_limit: u32,
        cancel: &AtomicBool,
    ) -> Result<GenerationReport> {
        self.params.validate()?;
        check_basis_shape(basis, dimension)?;

        let count_before_cap = CombinationCount::new(dimension, sum_limit);
        let budget = self.params.point_budget;
        let deadline = self.params.time_limit.map(|limit| Instant::now() + limit);

        log::info!(
            "Generating lattice points: d={}, L={}, combinations={}, budget={}",
            dimension,
            sum_limit,
            count_before_cap,
            budget
        );

        let mut points = Vec::with_capacity(count_before_cap.min_with(budget));
        let mut status = BudgetStatus::Complete;

        for coefficients in CoefficientEnumerator::new(dimension, sum_limit) {
            if points.len() >= budget {
                status = BudgetStatus::Capped;
                break;
            }
            if cancel.load(Ordering::Relaxed) {
                status = BudgetStatus::Cancelled;
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                status = BudgetStatus::TimedOut;
                break;
            }
            points.push(LatticeVector::new(combine_rows(&coefficients, basis)));
        }

        Ok(self.finish(dimension, sum_limit, count_before_cap, status, points))
    }

    /// Parallel generation over coefficient indices.
    ///
    /// Produces the same first-N points, in the same order, as the sequential
    /// path. A shared stop flag lets a timeout halt every worker.
    #[cfg(feature = "parallel")]
    pub fn generate_parallel(
        &self,
        basis: &Matrix,
        dimension: usize,
        sum_limit: u32,
    ) -> Result<GenerationReport> {
        use crate::enumerate::coefficients_at;
        use rayon::prelude::*;
        use std::sync::atomic::AtomicUsize;

        self.params.validate()?;
        check_basis_shape(basis, dimension)?;

        let count_before_cap = CombinationCount::new(dimension, sum_limit);
        let budget = self.params.point_budget;
        let target = count_before_cap.min_with(budget);
        let deadline = self.params.time_limit.map(|limit| Instant::now() + limit);
        let stop = AtomicBool::new(false);
        let produced = AtomicUsize::new(0);

        log::info!(
            "Generating lattice points in parallel: d={}, L={}, combinations={}, budget={}",
            dimension,
            sum_limit,
            count_before_cap,
            budget
        );

        let slots: Vec<Option<LatticeVector>> = (0..target as u64)
            .into_par_iter()
            .map(|index| {
                if stop.load(Ordering::Relaxed) {
                    return None;
                }
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    stop.store(true, Ordering::Relaxed);
                    return None;
                }
                let coefficients = coefficients_at(dimension, sum_limit, index);
                produced.fetch_add(1, Ordering::Relaxed);
                Some(LatticeVector::new(combine_rows(&coefficients, basis)))
            })
            .collect();

        log::debug!(
            "Parallel workers produced {} of {} points",
            produced.load(Ordering::Relaxed),
            target
        );

        // Keep the contiguous prefix so the first-N policy still holds after a timeout
        let points: Vec<LatticeVector> = slots.into_iter().map_while(|slot| slot).collect();
        let status = if points.len() < target {
            BudgetStatus::TimedOut
        } else if count_before_cap.exceeds(budget) {
            BudgetStatus::Capped
        } else {
            BudgetStatus::Complete
        };

        Ok(self.finish(dimension, sum_limit, count_before_cap, status, points))
    }

    fn finish(
        &self,
        dimension: usize,
        sum_limit: u32,
        count_before_cap: CombinationCount,
        status: BudgetStatus,
        points: Vec<LatticeVector>,
    ) -> GenerationReport {
        match status {
            BudgetStatus::Complete => {
                log::debug!("Generated all {} lattice points", points.len())
            }
            BudgetStatus::Capped => log::warn!(
                "Point budget exceeded: materialized {} of {} coefficient vectors",
                points.len(),
                count_before_cap
            ),
            BudgetStatus::TimedOut | BudgetStatus::Cancelled => log::warn!(
                "Generation stopped ({:?}) after {} of {} coefficient vectors",
                status,
                points.len(),
                count_before_cap
            ),
        }

        GenerationReport {
            dimension,
            sum_limit,
            point_budget: self.params.point_budget,
            count_before_cap,
            materialized: points.len(),
            status,
            points,
        }
    }
}

/// Lattice point `c · B` for a single coefficient vector
pub fn lattice_point(coefficients: &[i64], basis: &Matrix) -> Result<LatticeVector> {
    if coefficients.len() != basis.rows() {
        return Err(LatticeError::invalid_basis_shape(
            (basis.rows(), 1),
            (coefficients.len(), 1),
        ));
    }
    Ok(LatticeVector::new(combine_rows(coefficients, basis)))
}

fn check_basis_shape(basis: &Matrix, dimension: usize) -> Result<()> {
    if basis.dimension() != (dimension, dimension) {
        return Err(LatticeError::invalid_basis_shape(
            (dimension, dimension),
            basis.dimension(),
        ));
    }
    Ok(())
}

// point[j] = Σ_i c[i] * B[i][j]; callers have checked c.len() == B.rows()
fn combine_rows(coefficients: &[i64], basis: &Matrix) -> Vec<f64> {
    let mut point = vec![0.0; basis.cols()];
    for (&c, row) in coefficients.iter().zip(basis.row_iter()) {
        if c == 0 {
            continue;
        }
        let c = c as f64;
        for (p, &b) in point.iter_mut().zip(row) {
            *p += c * b;
        }
    }
    point
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(budget: usize) -> LatticePointGenerator {
        LatticePointGenerator::with_params(GeneratorParams {
            point_budget: budget,
            time_limit: None,
        })
    }

    #[test]
    fn test_scaled_basis_points() {
        let basis = Matrix::new(vec![vec![2.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let report = LatticePointGenerator::new().generate(&basis, 2, 1).unwrap();

        assert_eq!(report.status, BudgetStatus::Complete);
        assert_eq!(report.materialized, 9);
        assert_eq!(report.count_before_cap.exact(), Some(9));
        assert_eq!(report.points[0].as_slice(), &[-2.0, -1.0]);
        assert_eq!(report.points[4].as_slice(), &[0.0, 0.0]);
        assert_eq!(report.points[8].as_slice(), &[2.0, 1.0]);
    }

    #[test]
    fn test_budget_caps_in_enumeration_order() {
        let basis = Matrix::identity(3).unwrap();
        let report = generator(100).generate(&basis, 3, 10).unwrap();

        assert_eq!(report.status, BudgetStatus::Capped);
        assert!(report.is_truncated());
        assert_eq!(report.points.len(), 100);
        assert_eq!(report.materialized, 100);
        assert_eq!(report.count_before_cap.exact(), Some(9261));
        assert_eq!(report.points[0].as_slice(), &[-10.0, -10.0, -10.0]);
        assert_eq!(report.points[99].as_slice(), &[-10.0, -6.0, 5.0]);
    }

    #[test]
    fn test_budget_equal_to_count_is_complete() {
        let basis = Matrix::identity(2).unwrap();
        let report = generator(9).generate(&basis, 2, 1).unwrap();
        assert_eq!(report.status, BudgetStatus::Complete);
        assert_eq!(report.materialized, 9);
    }

    #[test]
    fn test_large_dimension_stays_within_budget() {
        let basis = Matrix::identity(400).unwrap();
        let report = generator(10).generate(&basis, 400, 10).unwrap();
        assert_eq!(report.materialized, 10);
        assert_eq!(report.count_before_cap.exact(), None);
        assert_eq!(report.projected()[0], [-10.0, -10.0, -10.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let basis = Matrix::identity(3).unwrap();
        let err = LatticePointGenerator::new().generate(&basis, 2, 1).unwrap_err();
        assert!(matches!(err, LatticeError::InvalidBasisShape { .. }));

        assert!(lattice_point(&[1, 2], &basis).is_err());
    }

    #[test]
    fn test_zero_time_limit_reports_timeout() {
        let basis = Matrix::identity(2).unwrap();
        let generator = LatticePointGenerator::with_params(GeneratorParams {
            point_budget: 100,
            time_limit: Some(Duration::ZERO),
        });
        let report = generator.generate(&basis, 2, 1).unwrap();
        assert_eq!(report.status, BudgetStatus::TimedOut);
        assert_eq!(report.materialized, 0);
        assert_eq!(report.count_before_cap.exact(), Some(9));
    }

    #[test]
    fn test_cancellation_flag() {
        let basis = Matrix::identity(2).unwrap();
        let cancel = AtomicBool::new(true);
        let report = LatticePointGenerator::new()
            .generate_cancellable(&basis, 2, 1, &cancel)
            .unwrap();
        assert_eq!(report.status, BudgetStatus::Cancelled);
        assert!(report.points.is_empty());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let basis = Matrix::identity(2).unwrap();
        assert!(generator(0).generate(&basis, 2, 1).is_err());
    }

    #[test]
    fn test_single_point() {
        let basis = Matrix::new(vec![vec![1.0, 1.0], vec![-1.0, 2.0]]).unwrap();
        let point = lattice_point(&[2, 3], &basis).unwrap();
        assert_eq!(point.as_slice(), &[-1.0, 8.0]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let basis = Matrix::new(vec![
            vec![1.0, 2.0, 0.5],
            vec![0.0, 1.0, 3.0],
            vec![2.0, 0.0, 1.0],
        ])
        .unwrap();
        let sequential = generator(500).generate(&basis, 3, 5).unwrap();
        let parallel = generator(500).generate_parallel(&basis, 3, 5).unwrap();
        assert_eq!(parallel.status, BudgetStatus::Capped);
        assert_eq!(sequential.points, parallel.points);
    }
}
