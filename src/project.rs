//! Projection of d-dimensional points to the three components a renderer draws

use crate::core::types::{LatticeVector, Point3};

/// Keep the first `min(d, 3)` coordinates and zero-fill the rest
pub fn project_to_3d(point: &[f64]) -> Point3 {
    let mut projected = [0.0; 3];
    for (slot, &value) in projected.iter_mut().zip(point) {
        *slot = value;
    }
    projected
}

/// Project every point of a sequence
pub fn project_all<'a, I>(points: I) -> Vec<Point3>
where
    I: IntoIterator<Item = &'a LatticeVector>,
{
    points
        .into_iter()
        .map(|p| project_to_3d(p.as_slice()))
        .collect()
}

/// Flatten projected points into `[x0, y0, z0, x1, ...]` for point-cloud buffers
pub fn flatten(points: &[Point3]) -> Vec<f64> {
    points.iter().flatten().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_higher_dimensions() {
        assert_eq!(project_to_3d(&[1.0, 2.0, 3.0, 4.0, 5.0]), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_zero_fills_lower_dimensions() {
        assert_eq!(project_to_3d(&[7.0, 9.0]), [7.0, 9.0, 0.0]);
        assert_eq!(project_to_3d(&[]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_project_all_and_flatten() {
        let points = vec![
            LatticeVector::new(vec![1.0, 2.0]),
            LatticeVector::new(vec![3.0, 4.0, 5.0, 6.0]),
        ];
        let projected = project_all(&points);
        assert_eq!(projected, vec![[1.0, 2.0, 0.0], [3.0, 4.0, 5.0]]);
        assert_eq!(flatten(&projected), vec![1.0, 2.0, 0.0, 3.0, 4.0, 5.0]);
    }
}
