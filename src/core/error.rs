//! Core error types for lattice operations

use thiserror::Error;

/// Error types for lattice engine operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LatticeError {
    /// Basis matrix is not `d x d` for the declared dimension
    #[error("Invalid basis shape: expected {expected:?}, found {found:?}")]
    InvalidBasisShape {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Gram matrix not invertible within tolerance, or the computed dual
    /// fails the `B* · Bᵗ = I` check
    #[error("Singular basis: {measure} {value:e} is outside tolerance {tolerance:e}")]
    SingularBasis {
        measure: &'static str,
        value: f64,
        tolerance: f64,
    },

    /// Corner enumeration requested at a dimension where 2^d is infeasible
    #[error("Too many parallelepiped vertices: 2^{dimension} exceeds the limit of 2^{max_dimension}")]
    TooManyVertices {
        dimension: usize,
        max_dimension: usize,
    },

    /// Dimension outside the supported range
    #[error("Invalid dimension {0}: must be between 2 and 400")]
    InvalidDimension(usize),

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Numerical instability detected
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// JSON encoding or decoding error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for LatticeError {
    fn from(e: std::io::Error) -> Self {
        LatticeError::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for LatticeError {
    fn from(e: serde_json::Error) -> Self {
        LatticeError::Serialization(e.to_string())
    }
}

/// Result type for lattice operations
pub type Result<T> = std::result::Result<T, LatticeError>;

impl LatticeError {
    /// Create an invalid basis shape error
    pub fn invalid_basis_shape(expected: (usize, usize), found: (usize, usize)) -> Self {
        LatticeError::InvalidBasisShape { expected, found }
    }

    /// Create a singular basis error
    pub fn singular_basis(pivot: f64, tolerance: f64) -> Self {
        LatticeError::SingularBasis {
            measure: "pivot",
            value: pivot,
            tolerance,
        }
    }

    /// Create a singular basis error from a failed biorthogonality check
    pub fn singular_residual(residual: f64, bound: f64) -> Self {
        LatticeError::SingularBasis {
            measure: "residual",
            value: residual,
            tolerance: bound,
        }
    }

    /// Create a too-many-vertices error
    pub fn too_many_vertices(dimension: usize, max_dimension: usize) -> Self {
        LatticeError::TooManyVertices {
            dimension,
            max_dimension,
        }
    }

    /// Create an invalid parameters error
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        LatticeError::InvalidParameters(msg.into())
    }

    /// Create a numerical instability error
    pub fn numerical_instability(msg: impl Into<String>) -> Self {
        LatticeError::NumericalInstability(msg.into())
    }

    /// Create an I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        LatticeError::IoError(msg.into())
    }

    /// Whether this error came from the dual basis inversion
    pub fn is_singular(&self) -> bool {
        matches!(self, LatticeError::SingularBasis { .. })
    }
}
