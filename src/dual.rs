//! Dual (reciprocal) basis computation
//!
//! The dual of a square basis `B` is `B* = B · (Bᵗ·B)⁻¹`. For an invertible
//! `B` this satisfies `B* · Bᵗ = I`, and for an orthonormal `B` it returns `B`
//! itself.

use crate::core::error::{LatticeError, Result};
use crate::core::matrix::Matrix;

/// Per-dimension allowance for `‖B* · Bᵗ − I‖∞`
pub const DEFAULT_RESIDUAL_PER_DIMENSION: f64 = 1e-6;

/// Parameters for the dual basis computation
#[derive(Debug, Clone, Default)]
pub struct DualBasisParams {
    /// Pivot tolerance for inverting the Gram matrix.
    ///
    /// `None` uses `‖G‖_F · ε · d`, which scales with both the magnitude of
    /// the basis and its dimension.
    pub tolerance: Option<f64>,
    /// Largest accepted `‖B* · Bᵗ − I‖∞`; `None` uses `1e-6 · d`
    pub max_residual: Option<f64>,
}

impl DualBasisParams {
    /// Parameters with a fixed pivot tolerance
    pub fn with_tolerance(tolerance: f64) -> Self {
        DualBasisParams {
            tolerance: Some(tolerance),
            ..Default::default()
        }
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("Tolerance", self.tolerance), ("Max residual", self.max_residual)] {
            if let Some(value) = value {
                if !(value.is_finite() && value > 0.0) {
                    return Err(LatticeError::invalid_parameters(format!(
                        "{} must be finite and positive, got {}",
                        name, value
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Dual basis calculator
#[derive(Debug, Clone, Default)]
pub struct DualBasisCalculator {
    params: DualBasisParams,
}

impl DualBasisCalculator {
    /// Create a calculator with the adaptive tolerance
    pub fn new() -> Self {
        Self::with_params(DualBasisParams::default())
    }

    /// Create a calculator with custom parameters
    pub fn with_params(params: DualBasisParams) -> Self {
        DualBasisCalculator { params }
    }

    /// Tolerance that will be used for a given Gram matrix
    pub fn tolerance_for(&self, gram: &Matrix) -> f64 {
        match self.params.tolerance {
            Some(tolerance) => tolerance,
            None => default_tolerance(gram),
        }
    }

    /// Residual bound that will be used for a basis of dimension `d`
    pub fn max_residual_for(&self, dimension: usize) -> f64 {
        match self.params.max_residual {
            Some(bound) => bound,
            None => default_max_residual(dimension),
        }
    }

    /// Compute `B* = B · (Bᵗ·B)⁻¹`
    pub fn compute(&self, basis: &Matrix) -> Result<Matrix> {
        self.params.validate()?;

        if !basis.is_square() {
            return Err(LatticeError::invalid_basis_shape(
                (basis.rows(), basis.rows()),
                basis.dimension(),
            ));
        }

        let gram = basis.gram()?;
        let tolerance = self.tolerance_for(&gram);
        log::debug!(
            "Inverting {}x{} Gram matrix with tolerance {:e}",
            gram.rows(),
            gram.cols(),
            tolerance
        );

        let gram_inverse = gram.inverse(tolerance).map_err(|e| {
            if e.is_singular() {
                log::warn!("Basis of dimension {} is singular: {}", basis.rows(), e);
            }
            e
        })?;
        let dual = basis.mul(&gram_inverse)?;

        // pivots alone miss rank-deficient bases once BᵗB squares the
        // condition number; the dual must also be biorthogonal to B
        let bound = self.max_residual_for(basis.rows());
        let residual = if dual.to_flat_vec().iter().all(|v| v.is_finite()) {
            biorthogonality_residual(basis, &dual)?
        } else {
            f64::INFINITY
        };
        if !(residual <= bound) {
            log::warn!(
                "Dual basis of dimension {} rejected: residual {:e} exceeds {:e}",
                basis.rows(),
                residual,
                bound
            );
            return Err(LatticeError::singular_residual(residual, bound));
        }
        log::debug!("Dual basis residual {:e} within {:e}", residual, bound);

        Ok(dual)
    }
}

/// `‖G‖_F · ε · d`, the scale below which a Gram pivot is treated as zero
pub fn default_tolerance(gram: &Matrix) -> f64 {
    let scaled = gram.frobenius_norm() * f64::EPSILON * gram.rows() as f64;
    // an all-zero Gram matrix still has to be reported as singular
    scaled.max(f64::MIN_POSITIVE)
}

/// `1e-6 · d`, the default bound on `‖B* · Bᵗ − I‖∞`
pub fn default_max_residual(dimension: usize) -> f64 {
    DEFAULT_RESIDUAL_PER_DIMENSION * dimension.max(1) as f64
}

/// Largest entry of `|B* · Bᵗ − I|`
pub fn biorthogonality_residual(basis: &Matrix, dual: &Matrix) -> Result<f64> {
    let product = dual.mul(&basis.transpose())?;
    let identity = Matrix::identity(product.rows())?;
    Ok(product.sub(&identity)?.max_abs())
}
