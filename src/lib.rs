//! lattice exploration engine: point enumeration, dual bases and cell sampling
//!
//! This crate computes everything a lattice viewer needs to draw, for bases
//! of dimension 2 to 400:
//! - Bounded enumeration of integer coefficient vectors in `[-L, L]^d`
//! - Lattice points `c · B` with an explicit point budget
//! - Dual (reciprocal) bases `B* = B · (Bᵗ·B)⁻¹`
//! - Fundamental parallelepiped corners and random interior points
//! - Projection of d-dimensional points to three display components
//! - Parallel point generation (optional, `parallel` feature)
//!
//! # Examples
//!
//! Points of a scaled plane lattice:
//! ```rust
//! use lattice_explorer::{LatticeConfig, LatticeEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LatticeConfig::from_rows(vec![
//!     vec![2.0, 0.0],
//!     vec![0.0, 1.0],
//! ], 1)?;
//!
//! let engine = LatticeEngine::new();
//! let report = engine.generate_points(&config)?;
//! assert_eq!(report.materialized, 9);
//! # Ok(())
//! # }
//! ```
//!
//! Dual basis with an explicit refresh:
//! ```rust
//! use lattice_explorer::{LatticeConfig, LatticeEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = LatticeEngine::new();
//! let config = LatticeConfig::new(3)?.with_basis_entry(0, 1, 2.0)?;
//! let with_dual = engine.refresh_dual(&config)?;
//! assert!(with_dual.dual().is_some());
//!
//! // editing the basis drops the cached dual
//! assert!(with_dual.with_basis_entry(2, 2, 5.0)?.dual().is_none());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod dual;
pub mod engine;
pub mod enumerate;
pub mod features;
pub mod generate;
pub mod parallelepiped;
pub mod project;
pub mod utils;

pub use config::EngineParams;
pub use self::core::*;
pub use dual::{DualBasisCalculator, DualBasisParams};
pub use engine::LatticeEngine;
pub use enumerate::{CoefficientEnumerator, CombinationCount};
pub use generate::{BudgetStatus, GenerationReport, GeneratorParams, LatticePointGenerator};
pub use parallelepiped::{ParallelepipedSampler, SamplerParams, SamplingMode};
pub use project::project_to_3d;

/// Log which optional features were compiled in
pub fn validate_features() -> Result<()> {
    log::info!("Feature status - Parallel: {}", features::parallel_available());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = LatticeConfig::new(2).unwrap();
        assert_eq!(config.dimension(), 2);
    }

    #[test]
    fn test_feature_detection() {
        assert_eq!(features::parallel_available(), cfg!(feature = "parallel"));
        assert!(validate_features().is_ok());
    }
}
