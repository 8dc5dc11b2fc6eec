//! Engine facade tying the session value to the individual algorithms
//!
//! The engine holds only parameters. Every call takes a [`LatticeConfig`] by
//! reference and treats it as immutable for the duration of the call, so
//! independent calls can run side by side on different threads.

use crate::config::EngineParams;
use crate::core::error::Result;
use crate::core::lattice::LatticeConfig;
use crate::core::matrix::Matrix;
use crate::core::types::Point3;
use crate::dual::{DualBasisCalculator, DualBasisParams};
use crate::generate::{GenerationReport, GeneratorParams, LatticePointGenerator};
use crate::parallelepiped::{ParallelepipedSampler, SamplerParams, SamplingMode};
use rand::Rng;
use std::sync::atomic::AtomicBool;

/// Lattice computation engine
#[derive(Debug, Clone)]
pub struct LatticeEngine {
    params: EngineParams,
    generator: LatticePointGenerator,
    dual_calculator: DualBasisCalculator,
    sampler: ParallelepipedSampler,
}

impl LatticeEngine {
    /// Engine with default parameters
    pub fn new() -> Self {
        Self::build(EngineParams::default())
    }

    /// Engine with validated custom parameters
    pub fn with_params(params: EngineParams) -> Result<Self> {
        params.validate()?;
        Ok(Self::build(params))
    }

    fn build(params: EngineParams) -> Self {
        LatticeEngine {
            generator: LatticePointGenerator::with_params(GeneratorParams::from(&params)),
            dual_calculator: DualBasisCalculator::with_params(DualBasisParams {
                tolerance: params.singular_tolerance,
                max_residual: params.max_dual_residual,
            }),
            sampler: ParallelepipedSampler::with_params(SamplerParams::from(&params)),
            params,
        }
    }

    /// Parameters in force
    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// The dual calculator, for use with [`LatticeConfig::with_refreshed_dual`]
    pub fn dual_calculator(&self) -> &DualBasisCalculator {
        &self.dual_calculator
    }

    /// Lattice points of the primal basis, capped at the point budget
    pub fn generate_points(&self, config: &LatticeConfig) -> Result<GenerationReport> {
        self.generator
            .generate(config.basis(), config.dimension(), config.sum_limit())
    }

    /// Lattice points of the primal basis, stopping when `cancel` is raised
    pub fn generate_points_cancellable(
        &self,
        config: &LatticeConfig,
        cancel: &AtomicBool,
    ) -> Result<GenerationReport> {
        self.generator.generate_cancellable(
            config.basis(),
            config.dimension(),
            config.sum_limit(),
            cancel,
        )
    }

    /// Parallel variant of [`generate_points`](Self::generate_points)
    #[cfg(feature = "parallel")]
    pub fn generate_points_parallel(&self, config: &LatticeConfig) -> Result<GenerationReport> {
        self.generator
            .generate_parallel(config.basis(), config.dimension(), config.sum_limit())
    }

    /// Primal points projected to three components
    pub fn projected_points(&self, config: &LatticeConfig) -> Result<Vec<Point3>> {
        Ok(self.generate_points(config)?.projected())
    }

    /// Dual basis of the config's basis, computed fresh
    pub fn dual_basis(&self, config: &LatticeConfig) -> Result<Matrix> {
        log::info!("Computing dual basis for dimension {}", config.dimension());
        self.dual_calculator.compute(config.basis())
    }

    /// Copy of `config` carrying a freshly computed dual basis
    pub fn refresh_dual(&self, config: &LatticeConfig) -> Result<LatticeConfig> {
        config.with_refreshed_dual(&self.dual_calculator)
    }

    /// Lattice points of the dual basis.
    ///
    /// Uses the cached dual when present, otherwise computes one without
    /// storing it.
    pub fn generate_dual_points(&self, config: &LatticeConfig) -> Result<GenerationReport> {
        let computed;
        let dual = match config.dual() {
            Some(dual) => dual,
            None => {
                computed = self.dual_basis(config)?;
                &computed
            }
        };
        self.generator
            .generate(dual, config.dimension(), config.sum_limit())
    }

    /// Projected vertices or interior sample of the fundamental cell
    pub fn sample_parallelepiped<R: Rng + ?Sized>(
        &self,
        config: &LatticeConfig,
        mode: &SamplingMode,
        rng: &mut R,
    ) -> Result<Vec<Point3>> {
        self.sampler
            .sample(config.basis(), config.sum_limit(), mode, rng)
    }
}

impl Default for LatticeEngine {
    fn default() -> Self {
        Self::new()
    }
}
