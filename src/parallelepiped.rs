//! Fundamental parallelepiped sampling
//!
//! Two modes are supported. Corner mode lists all `2^d` vertices
//! `o + Σ_{j ∈ m} B[j]` of the cell anchored at an integer offset `o`, and is
//! refused above a configurable dimension. Interior mode draws a single point
//! `o + Σ a_j B[j]` with every `a_j` uniform in `[0, 1)`, which costs `O(d)`
//! and works at any dimension. All output is projected to three components.

use crate::config::{EngineParams, DEFAULT_MAX_CORNER_DIMENSION, MAX_CORNER_DIMENSION};
use crate::core::error::{LatticeError, Result};
use crate::core::matrix::Matrix;
use crate::core::types::{LatticeVector, Point3};
use crate::project::project_to_3d;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which part of the cell to sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SamplingMode {
    /// All `2^d` corners; a random offset in `[-L, L]^d` is drawn when none is given
    Corners { offset: Option<Vec<i64>> },
    /// One uniformly weighted point of the cell; the offset defaults to the origin
    RandomInterior { offset: Option<Vec<f64>> },
}

impl Default for SamplingMode {
    fn default() -> Self {
        SamplingMode::Corners { offset: None }
    }
}

/// A single random point of the cell together with its cell coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct InteriorSample {
    /// Weights `a_j` in `[0, 1)`, zero for inactive basis rows
    pub weights: Vec<f64>,
    /// The full d-dimensional point
    pub point: LatticeVector,
}

/// Parameters for the sampler
#[derive(Debug, Clone)]
pub struct SamplerParams {
    /// Largest `d` for which corner mode runs
    pub max_corner_dimension: usize,
}

impl Default for SamplerParams {
    fn default() -> Self {
        SamplerParams {
            max_corner_dimension: DEFAULT_MAX_CORNER_DIMENSION,
        }
    }
}

impl From<&EngineParams> for SamplerParams {
    fn from(params: &EngineParams) -> Self {
        SamplerParams {
            max_corner_dimension: params.max_corner_dimension,
        }
    }
}

impl SamplerParams {
    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if self.max_corner_dimension > MAX_CORNER_DIMENSION {
            return Err(LatticeError::invalid_parameters(format!(
                "Max corner dimension must be at most {}, got {}",
                MAX_CORNER_DIMENSION, self.max_corner_dimension
            )));
        }
        Ok(())
    }
}

/// Parallelepiped sampler
#[derive(Debug, Clone, Default)]
pub struct ParallelepipedSampler {
    params: SamplerParams,
}

impl ParallelepipedSampler {
    /// Create a sampler with default parameters
    pub fn new() -> Self {
        Self::with_params(SamplerParams::default())
    }

    /// Create a sampler with custom parameters
    pub fn with_params(params: SamplerParams) -> Self {
        ParallelepipedSampler { params }
    }

    /// Sample the cell in the requested mode
    pub fn sample<R: Rng + ?Sized>(
        &self,
        basis: &Matrix,
        sum_limit: u32,
        mode: &SamplingMode,
        rng: &mut R,
    ) -> Result<Vec<Point3>> {
        self.params.validate()?;
        check_square(basis)?;
        let d = basis.rows();

        match mode {
            SamplingMode::Corners { offset } => {
                // refuse before drawing anything so a rejected call leaves the rng untouched
                self.check_corner_dimension(d)?;
                let offset = match offset {
                    Some(offset) => offset.clone(),
                    None => random_offset(d, sum_limit, rng),
                };
                log::debug!("Sampling {} cell corners from offset {:?}", 1u64 << d, offset);
                let offset: Vec<f64> = offset.iter().map(|&x| x as f64).collect();
                self.corners(basis, &offset)
            }
            SamplingMode::RandomInterior { offset } => {
                let origin;
                let offset = match offset {
                    Some(offset) => offset.as_slice(),
                    None => {
                        origin = vec![0.0; d];
                        origin.as_slice()
                    }
                };
                log::debug!("Sampling one interior point of a {}-dimensional cell", d);
                let sample = interior_point(basis, offset, rng)?;
                Ok(vec![project_to_3d(sample.point.as_slice())])
            }
        }
    }

    /// All `2^d` corners from `offset`, in mask order (bit `j` adds row `j`)
    pub fn corners(&self, basis: &Matrix, offset: &[f64]) -> Result<Vec<Point3>> {
        check_square(basis)?;
        let d = basis.rows();
        self.check_corner_dimension(d)?;
        check_offset(offset.len(), d)?;

        // truncation is linear, so corners can be accumulated in three components
        let rows: Vec<Point3> = basis.row_iter().map(project_to_3d).collect();
        let count = 1usize << d;
        let mut vertices = Vec::with_capacity(count);
        vertices.push(project_to_3d(offset));
        for mask in 1..count {
            let j = mask.trailing_zeros() as usize;
            let previous = vertices[mask & (mask - 1)];
            vertices.push([
                previous[0] + rows[j][0],
                previous[1] + rows[j][1],
                previous[2] + rows[j][2],
            ]);
        }
        Ok(vertices)
    }

    fn check_corner_dimension(&self, d: usize) -> Result<()> {
        if d > self.params.max_corner_dimension {
            return Err(LatticeError::too_many_vertices(
                d,
                self.params.max_corner_dimension,
            ));
        }
        Ok(())
    }
}

/// Integer offset with every component uniform in `[-L, L]`
pub fn random_offset<R: Rng + ?Sized>(dimension: usize, sum_limit: u32, rng: &mut R) -> Vec<i64> {
    let limit = i64::from(sum_limit);
    (0..dimension).map(|_| rng.random_range(-limit..=limit)).collect()
}

/// One point `offset + Σ a_j B[j]` with each `a_j` uniform in `[0, 1)`
pub fn interior_point<R: Rng + ?Sized>(
    basis: &Matrix,
    offset: &[f64],
    rng: &mut R,
) -> Result<InteriorSample> {
    let active = vec![true; basis.rows()];
    sample_face(basis, &active, offset, rng)
}

/// Random point on the face spanned by the active basis rows.
///
/// Inactive rows get weight zero and consume no randomness.
pub fn sample_face<R: Rng + ?Sized>(
    basis: &Matrix,
    active: &[bool],
    offset: &[f64],
    rng: &mut R,
) -> Result<InteriorSample> {
    check_square(basis)?;
    let d = basis.rows();
    check_offset(offset.len(), d)?;
    if active.len() != d {
        return Err(LatticeError::invalid_parameters(format!(
            "Face selector has {} entries, expected {}",
            active.len(),
            d
        )));
    }

    let mut point = offset.to_vec();
    let mut weights = vec![0.0; d];
    for ((weight, &is_active), row) in weights.iter_mut().zip(active).zip(basis.row_iter()) {
        if !is_active {
            continue;
        }
        *weight = rng.random::<f64>();
        for (p, &b) in point.iter_mut().zip(row) {
            *p += *weight * b;
        }
    }

    Ok(InteriorSample {
        weights,
        point: LatticeVector::new(point),
    })
}

fn check_square(basis: &Matrix) -> Result<()> {
    if !basis.is_square() {
        return Err(LatticeError::invalid_basis_shape(
            (basis.rows(), basis.rows()),
            basis.dimension(),
        ));
    }
    Ok(())
}

fn check_offset(len: usize, dimension: usize) -> Result<()> {
    if len != dimension {
        return Err(LatticeError::invalid_parameters(format!(
            "Offset has {} components, expected {}",
            len, dimension
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_unit_square_corners() {
        let basis = Matrix::identity(2).unwrap();
        let corners = ParallelepipedSampler::new().corners(&basis, &[0.0, 0.0]).unwrap();
        assert_eq!(
            corners,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]]
        );
    }

    #[test]
    fn test_corners_from_offset() {
        let basis = Matrix::new(vec![
            vec![1.0, 1.0, 0.0],
            vec![0.0, 2.0, 0.0],
            vec![0.0, 0.0, 3.0],
        ])
        .unwrap();
        let corners = ParallelepipedSampler::new()
            .corners(&basis, &[1.0, -1.0, 0.0])
            .unwrap();
        assert_eq!(corners.len(), 8);
        assert_eq!(corners[0], [1.0, -1.0, 0.0]);
        assert_eq!(corners[7], [2.0, 2.0, 3.0]);
    }

    #[test]
    fn test_corner_mode_refuses_large_dimension() {
        let basis = Matrix::identity(30).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let err = ParallelepipedSampler::new()
            .sample(&basis, 2, &SamplingMode::Corners { offset: None }, &mut rng)
            .unwrap_err();
        assert_eq!(err, LatticeError::too_many_vertices(30, DEFAULT_MAX_CORNER_DIMENSION));
    }

    #[test]
    fn test_random_offset_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let offset = random_offset(50, 3, &mut rng);
        assert_eq!(offset.len(), 50);
        assert!(offset.iter().all(|&x| (-3..=3).contains(&x)));
    }

    #[test]
    fn test_interior_point_is_inside_cell() {
        let basis = Matrix::new(vec![vec![2.0, 1.0], vec![0.0, 3.0]]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let sample = interior_point(&basis, &[0.0, 0.0], &mut rng).unwrap();
        assert!(sample.weights.iter().all(|&a| (0.0..1.0).contains(&a)));
        let expected_x = 2.0 * sample.weights[0];
        let expected_y = sample.weights[0] + 3.0 * sample.weights[1];
        assert!((sample.point.as_slice()[0] - expected_x).abs() < 1e-12);
        assert!((sample.point.as_slice()[1] - expected_y).abs() < 1e-12);
    }

    #[test]
    fn test_interior_is_reproducible_with_seed() {
        let basis = Matrix::identity(400).unwrap();
        let sampler = ParallelepipedSampler::new();
        let mode = SamplingMode::RandomInterior { offset: None };
        let a = sampler.sample(&basis, 1, &mode, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = sampler.sample(&basis, 1, &mode, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_face_sampling_zeroes_inactive_rows() {
        let basis = Matrix::identity(3).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let sample = sample_face(&basis, &[true, false, true], &[0.0; 3], &mut rng).unwrap();
        assert_eq!(sample.weights[1], 0.0);
        assert_eq!(sample.point.as_slice()[1], 0.0);
        assert!(sample_face(&basis, &[true], &[0.0; 3], &mut rng).is_err());
    }

    #[test]
    fn test_offset_length_checked() {
        let basis = Matrix::identity(2).unwrap();
        assert!(ParallelepipedSampler::new().corners(&basis, &[0.0]).is_err());
        let mut rng = StdRng::seed_from_u64(0);
        assert!(interior_point(&basis, &[0.0, 0.0, 0.0], &mut rng).is_err());
    }
}
