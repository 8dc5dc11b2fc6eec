//! Utility functions for building bases and moving them in and out of files

use crate::core::error::{LatticeError, Result};
use crate::core::matrix::Matrix;
use std::path::Path;

/// Basis construction helpers
pub mod basis_utils {
    use super::*;

    /// Identity basis of dimension `n`
    pub fn identity_basis(n: usize) -> Result<Matrix> {
        Matrix::identity(n)
    }

    /// Random basis with entries uniform in `[-10, 10]`
    pub fn random_basis(n: usize, seed: Option<u64>) -> Result<Matrix> {
        use rand::rngs::StdRng;
        use rand::{rng, Rng, SeedableRng};

        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => {
                let mut entropy = rng();
                <StdRng as SeedableRng>::from_rng(&mut entropy)
            }
        };

        let data = (0..n)
            .map(|_| (0..n).map(|_| rng.random_range(-10.0..=10.0)).collect())
            .collect();
        Matrix::new(data)
    }

    /// Diagonally dominant random basis; always invertible and well conditioned
    pub fn well_conditioned_basis(n: usize, seed: Option<u64>) -> Result<Matrix> {
        let mut basis = random_basis(n, seed)?;
        for i in 0..n {
            let row_sum: f64 = basis.row(i)?.iter().map(|v| v.abs()).sum();
            basis.set(i, i, row_sum + 1.0)?;
        }
        Ok(basis)
    }

    /// 2D rotation by `theta` radians
    pub fn rotation_basis_2d(theta: f64) -> Result<Matrix> {
        givens_rotation(2, 0, 1, theta)
    }

    /// Rotation by `theta` in the plane of axes `i` and `j`, identity elsewhere
    pub fn givens_rotation(n: usize, i: usize, j: usize, theta: f64) -> Result<Matrix> {
        if i >= n || j >= n || i == j {
            return Err(LatticeError::invalid_parameters(format!(
                "Rotation axes ({}, {}) invalid for dimension {}",
                i, j, n
            )));
        }
        let (sin, cos) = theta.sin_cos();
        let mut rotation = Matrix::identity(n)?;
        rotation.set(i, i, cos)?;
        rotation.set(i, j, -sin)?;
        rotation.set(j, i, sin)?;
        rotation.set(j, j, cos)?;
        Ok(rotation)
    }

    /// Largest entry of `|M - I|`
    pub fn max_abs_deviation_from_identity(matrix: &Matrix) -> Result<f64> {
        if !matrix.is_square() {
            return Err(LatticeError::invalid_basis_shape(
                (matrix.rows(), matrix.rows()),
                matrix.dimension(),
            ));
        }
        Ok(matrix.sub(&Matrix::identity(matrix.rows())?)?.max_abs())
    }
}

/// Basis file I/O
pub mod io_utils {
    use super::*;

    /// Parse a basis from text.
    ///
    /// Supported formats:
    ///  1. JSON: `[[1, 0], [0, 1]]`
    ///  2. Plain rows of numbers separated by spaces, commas or semicolons,
    ///     optionally wrapped in brackets, with an optional `rows cols`
    ///     header line. Lines starting with `#` are comments.
    pub fn parse_basis(content: &str) -> Result<Matrix> {
        let trimmed = content.trim();

        if trimmed.starts_with('[') {
            if let Ok(data) = serde_json::from_str::<Vec<Vec<f64>>>(trimmed) {
                return Matrix::new(data);
            }
            // fall through to the text parser for bracketed plain text
        }

        let lines: Vec<&str> = trimmed
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();

        if lines.is_empty() {
            return Err(LatticeError::invalid_parameters(
                "Basis input is empty after stripping comments",
            ));
        }

        let mut rows = lines
            .iter()
            .enumerate()
            .map(|(i, line)| parse_row(line, i + 1))
            .collect::<Result<Vec<Vec<f64>>>>()?;

        // A leading "rows cols" line is a header only when the body agrees with it
        if let Some((expected_rows, expected_cols)) = parse_header(lines[0]) {
            let body = &rows[1..];
            if body.len() == expected_rows && body.iter().all(|r| r.len() == expected_cols) {
                rows.remove(0);
            }
        }

        Matrix::new(rows)
    }

    fn parse_header(line: &str) -> Option<(usize, usize)> {
        let mut tokens = line.split_whitespace();
        let rows = tokens.next()?.parse().ok()?;
        let cols = tokens.next()?.parse().ok()?;
        match tokens.next() {
            None => Some((rows, cols)),
            Some(_) => None,
        }
    }

    fn parse_row(line: &str, line_no: usize) -> Result<Vec<f64>> {
        let clean = line.trim_matches(|c: char| c == '[' || c == ']' || c.is_whitespace());

        let row = clean
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .filter(|t| !t.is_empty())
            .map(|tok| {
                tok.parse::<f64>().map_err(|e| {
                    LatticeError::invalid_parameters(format!(
                        "Failed to parse number at row {}: '{}': {}",
                        line_no, tok, e
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if row.is_empty() {
            return Err(LatticeError::invalid_parameters(format!(
                "Row {} has 0 entries",
                line_no
            )));
        }
        Ok(row)
    }

    /// Load a basis from a file in any format accepted by [`parse_basis`]
    pub fn load_basis_from_file(path: impl AsRef<Path>) -> Result<Matrix> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LatticeError::io_error(format!(
                "Failed to read basis file {}: {}",
                path.display(),
                e
            ))
        })?;
        parse_basis(&content)
    }

    /// Save a basis as JSON
    pub fn save_basis_to_file(path: impl AsRef<Path>, basis: &Matrix) -> Result<()> {
        let content = serde_json::to_string_pretty(basis)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

pub use basis_utils::*;
pub use io_utils::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_basis_is_seeded() {
        let a = random_basis(5, Some(42)).unwrap();
        let b = random_basis(5, Some(42)).unwrap();
        assert_eq!(a, b);
        assert!(a.max_abs() <= 10.0);
    }

    #[test]
    fn test_well_conditioned_basis_diagonal_dominates() {
        let basis = well_conditioned_basis(6, Some(3)).unwrap();
        for i in 0..6 {
            let row = basis.row(i).unwrap();
            let off: f64 = row.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, v)| v.abs()).sum();
            assert!(row[i] > off);
        }
    }

    #[test]
    fn test_rotation_is_orthonormal() {
        let r = givens_rotation(4, 1, 3, 0.7).unwrap();
        let product = r.mul(&r.transpose()).unwrap();
        assert!(max_abs_deviation_from_identity(&product).unwrap() < 1e-12);
        assert!(givens_rotation(3, 1, 1, 0.5).is_err());
    }

    #[test]
    fn test_parse_json_basis() {
        let basis = parse_basis("[[2, 0], [0, 1.5]]").unwrap();
        assert_eq!(basis.get(1, 1), Some(1.5));
    }

    #[test]
    fn test_parse_text_basis_with_header_and_comments() {
        let input = "# a scaled plane lattice\n2 2\n2 0\n0, 1\n";
        let basis = parse_basis(input).unwrap();
        assert_eq!(basis.to_vec(), vec![vec![2.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_parse_bracketed_text_basis() {
        let input = "[[1 0 0]\n [0 1 0]\n [0 0 1]]";
        let basis = parse_basis(input).unwrap();
        assert_eq!(basis, Matrix::identity(3).unwrap());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_basis("").is_err());
        assert!(parse_basis("1 x\n0 1").is_err());
        assert!(matches!(
            parse_basis("3 3\n1 0 0\n0 1 0"),
            Err(LatticeError::InvalidBasisShape { .. })
        ));
    }

    #[test]
    fn test_integer_first_row_is_not_mistaken_for_header() {
        let basis = parse_basis("2 0\n0 1").unwrap();
        assert_eq!(basis.to_vec(), vec![vec![2.0, 0.0], vec![0.0, 1.0]]);
    }
}
