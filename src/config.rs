//! Engine parameters
//!
//! Parameters are plain serde values with a `validate()` step, loadable from
//! JSON so the same settings can be shared between the CLI and tests.

use crate::core::error::{LatticeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default ceiling on materialized lattice points per generation call
pub const DEFAULT_POINT_BUDGET: usize = 50_000;

/// Default largest dimension for parallelepiped corner enumeration
pub const DEFAULT_MAX_CORNER_DIMENSION: usize = 20;

/// Hard ceiling for corner enumeration; 2^24 vertices is already 16M points
pub const MAX_CORNER_DIMENSION: usize = 24;

/// Parameters shared by every engine operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// Maximum number of lattice points materialized per generation call
    pub point_budget: usize,
    /// Pivot tolerance for the dual basis; `None` scales with the Gram matrix
    pub singular_tolerance: Option<f64>,
    /// Largest `d` for which all `2^d` cell corners are produced
    pub max_corner_dimension: usize,
    /// Wall-clock budget for one generation call, in milliseconds
    pub time_limit_ms: Option<u64>,
    /// Largest accepted `‖B* · Bᵗ − I‖∞` for a dual basis; `None` scales with `d`
    pub max_dual_residual: Option<f64>,
}

impl Default for EngineParams {
    fn default() -> Self {
        EngineParams {
            point_budget: DEFAULT_POINT_BUDGET,
            singular_tolerance: None,
            max_corner_dimension: DEFAULT_MAX_CORNER_DIMENSION,
            time_limit_ms: None,
            max_dual_residual: None,
        }
    }
}

impl EngineParams {
    /// Parameters with a custom point budget
    pub fn with_point_budget(point_budget: usize) -> Self {
        EngineParams {
            point_budget,
            ..Default::default()
        }
    }

    /// Time limit as a `Duration`
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if self.point_budget == 0 {
            return Err(LatticeError::invalid_parameters(
                "Point budget must be at least 1",
            ));
        }

        for (name, value) in [
            ("Singular tolerance", self.singular_tolerance),
            ("Max dual residual", self.max_dual_residual),
        ] {
            if let Some(value) = value {
                if !(value.is_finite() && value > 0.0) {
                    return Err(LatticeError::invalid_parameters(format!(
                        "{} must be finite and positive, got {}",
                        name, value
                    )));
                }
            }
        }

        if self.max_corner_dimension > MAX_CORNER_DIMENSION {
            return Err(LatticeError::invalid_parameters(format!(
                "Max corner dimension must be at most {}, got {}",
                MAX_CORNER_DIMENSION, self.max_corner_dimension
            )));
        }

        Ok(())
    }

    /// Parse and validate parameters from JSON
    pub fn from_json_str(input: &str) -> Result<Self> {
        let params: EngineParams = serde_json::from_str(input)?;
        params.validate()?;
        Ok(params)
    }

    /// Load and validate parameters from a JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LatticeError::io_error(format!(
                "Failed to read parameter file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }
}
