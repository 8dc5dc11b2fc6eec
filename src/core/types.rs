//! Core types for lattice operations

use crate::core::error::{LatticeError, Result};
use serde::{Deserialize, Serialize};

/// Smallest supported lattice dimension
pub const MIN_DIMENSION: usize = 2;

/// Largest supported lattice dimension
pub const MAX_DIMENSION: usize = 400;

/// Sum limit used when a session starts
pub const DEFAULT_SUM_LIMIT: u32 = 5;

/// A point handed to the renderer: exactly three components
pub type Point3 = [f64; 3];

/// Vector in lattice space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LatticeVector {
    data: Vec<f64>,
}

impl LatticeVector {
    /// Create a new lattice vector
    pub fn new(data: Vec<f64>) -> Self {
        LatticeVector { data }
    }

    /// Get the dimension
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Get element at index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.data.get(index).copied()
    }

    /// Get backing slice (read-only)
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Addition
    pub fn add(&self, other: &LatticeVector) -> Result<Self> {
        self.check_same_dimension(other)?;
        Ok(LatticeVector::new(
            self.data.iter().zip(&other.data).map(|(a, b)| a + b).collect(),
        ))
    }

    fn check_same_dimension(&self, other: &LatticeVector) -> Result<()> {
        if self.dimension() != other.dimension() {
            return Err(LatticeError::invalid_basis_shape(
                (self.dimension(), 1),
                (other.dimension(), 1),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for LatticeVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}]",
            self.data
                .iter()
                .map(|x| format!("{:.3}", x))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
