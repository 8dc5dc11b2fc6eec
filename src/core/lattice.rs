//! Lattice session state as an immutable value
//!
//! A [`LatticeConfig`] bundles the dimension, the basis and the sum limit.
//! Every edit returns a new value, and any edit touching the basis or the
//! dimension drops the cached dual basis, so a stale dual can never be
//! observed after an edit.

use crate::core::error::{LatticeError, Result};
use crate::core::matrix::Matrix;
use crate::core::types::{DEFAULT_SUM_LIMIT, MAX_DIMENSION, MIN_DIMENSION};
use crate::dual::DualBasisCalculator;
use serde::{Deserialize, Serialize};

/// Dimension, basis and sum limit for one lattice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLatticeConfig")]
pub struct LatticeConfig {
    basis: Matrix,
    sum_limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    dual: Option<Matrix>,
}

impl LatticeConfig {
    /// Identity basis of the given dimension with the default sum limit
    pub fn new(dimension: usize) -> Result<Self> {
        validate_dimension(dimension)?;
        Ok(LatticeConfig {
            basis: Matrix::identity(dimension)?,
            sum_limit: DEFAULT_SUM_LIMIT,
            dual: None,
        })
    }

    /// Build from an explicit basis; rows are the basis vectors
    pub fn from_basis(basis: Matrix, sum_limit: u32) -> Result<Self> {
        validate_basis(&basis)?;
        validate_sum_limit(sum_limit)?;
        Ok(LatticeConfig {
            basis,
            sum_limit,
            dual: None,
        })
    }

    /// Convenience constructor from nested rows
    pub fn from_rows(rows: Vec<Vec<f64>>, sum_limit: u32) -> Result<Self> {
        Self::from_basis(Matrix::new(rows)?, sum_limit)
    }

    /// Lattice dimension `d`
    pub fn dimension(&self) -> usize {
        self.basis.rows()
    }

    /// Basis matrix `B`
    pub fn basis(&self) -> &Matrix {
        &self.basis
    }

    /// Per-coordinate enumeration half-width `L`
    pub fn sum_limit(&self) -> u32 {
        self.sum_limit
    }

    /// Cached dual basis, present only after an explicit refresh
    pub fn dual(&self) -> Option<&Matrix> {
        self.dual.as_ref()
    }

    /// Change the dimension; the basis resets to the identity of the new size
    pub fn with_dimension(&self, dimension: usize) -> Result<Self> {
        validate_dimension(dimension)?;
        Ok(LatticeConfig {
            basis: Matrix::identity(dimension)?,
            sum_limit: self.sum_limit,
            dual: None,
        })
    }

    /// Edit a single basis cell
    pub fn with_basis_entry(&self, row: usize, col: usize, value: f64) -> Result<Self> {
        Ok(LatticeConfig {
            basis: self.basis.with_entry(row, col, value)?,
            sum_limit: self.sum_limit,
            dual: None,
        })
    }

    /// Replace the whole basis; it must match the current dimension
    pub fn with_basis(&self, basis: Matrix) -> Result<Self> {
        let d = self.dimension();
        if basis.dimension() != (d, d) {
            return Err(LatticeError::invalid_basis_shape((d, d), basis.dimension()));
        }
        Ok(LatticeConfig {
            basis,
            sum_limit: self.sum_limit,
            dual: None,
        })
    }

    /// Change the sum limit; the dual does not depend on it and is kept
    pub fn with_sum_limit(&self, sum_limit: u32) -> Result<Self> {
        validate_sum_limit(sum_limit)?;
        Ok(LatticeConfig {
            basis: self.basis.clone(),
            sum_limit,
            dual: self.dual.clone(),
        })
    }

    /// Compute and store the dual basis.
    ///
    /// On failure `self` is untouched and the error is returned.
    pub fn with_refreshed_dual(&self, calculator: &DualBasisCalculator) -> Result<Self> {
        let dual = calculator.compute(&self.basis)?;
        Ok(LatticeConfig {
            basis: self.basis.clone(),
            sum_limit: self.sum_limit,
            dual: Some(dual),
        })
    }

    /// Drop any cached dual basis
    pub fn without_dual(&self) -> Self {
        LatticeConfig {
            basis: self.basis.clone(),
            sum_limit: self.sum_limit,
            dual: None,
        }
    }
}

#[derive(Deserialize)]
struct RawLatticeConfig {
    basis: Matrix,
    sum_limit: u32,
}

// Deserialized sessions never trust a stored dual.
impl TryFrom<RawLatticeConfig> for LatticeConfig {
    type Error = LatticeError;

    fn try_from(raw: RawLatticeConfig) -> Result<Self> {
        LatticeConfig::from_basis(raw.basis, raw.sum_limit)
    }
}

fn validate_dimension(dimension: usize) -> Result<()> {
    if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&dimension) {
        return Err(LatticeError::InvalidDimension(dimension));
    }
    Ok(())
}

fn validate_basis(basis: &Matrix) -> Result<()> {
    if !basis.is_square() {
        return Err(LatticeError::invalid_basis_shape(
            (basis.rows(), basis.rows()),
            basis.dimension(),
        ));
    }
    validate_dimension(basis.rows())
}

fn validate_sum_limit(sum_limit: u32) -> Result<()> {
    if sum_limit == 0 {
        return Err(LatticeError::invalid_parameters(
            "Sum limit must be at least 1",
        ));
    }
    Ok(())
}

impl std::fmt::Display for LatticeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Lattice of dimension {} (sum limit {}):",
            self.dimension(),
            self.sum_limit
        )?;
        write!(f, "{}", self.basis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_identity() {
        let config = LatticeConfig::new(3).unwrap();
        assert_eq!(config.dimension(), 3);
        assert_eq!(config.basis(), &Matrix::identity(3).unwrap());
        assert_eq!(config.sum_limit(), DEFAULT_SUM_LIMIT);
        assert!(config.dual().is_none());
    }

    #[test]
    fn test_dimension_bounds() {
        assert!(matches!(
            LatticeConfig::new(1),
            Err(LatticeError::InvalidDimension(1))
        ));
        assert!(LatticeConfig::new(400).is_ok());
        assert!(LatticeConfig::new(401).is_err());
    }

    #[test]
    fn test_non_square_basis_rejected() {
        let err = LatticeConfig::from_rows(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]], 1)
            .unwrap_err();
        assert!(matches!(err, LatticeError::InvalidBasisShape { .. }));
    }

    #[test]
    fn test_edits_clear_dual() {
        let calculator = DualBasisCalculator::new();
        let config = LatticeConfig::from_rows(vec![vec![2.0, 0.0], vec![0.0, 1.0]], 1)
            .unwrap()
            .with_refreshed_dual(&calculator)
            .unwrap();
        assert!(config.dual().is_some());

        assert!(config.with_sum_limit(3).unwrap().dual().is_some());
        assert!(config.with_basis_entry(0, 1, 1.0).unwrap().dual().is_none());
        assert!(config.with_dimension(4).unwrap().dual().is_none());
        assert!(config.without_dual().dual().is_none());
    }

    #[test]
    fn test_with_dimension_resets_basis() {
        let config = LatticeConfig::from_rows(vec![vec![2.0, 1.0], vec![0.0, 1.0]], 2).unwrap();
        let grown = config.with_dimension(3).unwrap();
        assert_eq!(grown.basis(), &Matrix::identity(3).unwrap());
        assert_eq!(grown.sum_limit(), 2);
    }

    #[test]
    fn test_deserialize_validates() {
        let config: LatticeConfig =
            serde_json::from_str(r#"{"basis":[[2.0,0.0],[0.0,1.0]],"sum_limit":1}"#).unwrap();
        assert_eq!(config.dimension(), 2);
        assert!(serde_json::from_str::<LatticeConfig>(
            r#"{"basis":[[1.0,0.0,0.0],[0.0,1.0,0.0]],"sum_limit":1}"#
        )
        .is_err());
    }

    #[test]
    fn test_failed_refresh_keeps_original() {
        let calculator = DualBasisCalculator::new();
        let config = LatticeConfig::from_rows(vec![vec![1.0, 1.0], vec![1.0, 1.0]], 1).unwrap();
        assert!(config.with_refreshed_dual(&calculator).unwrap_err().is_singular());
        assert!(config.dual().is_none());
    }
}
