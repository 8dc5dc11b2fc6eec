//! Dense real matrices and the linear algebra the engine needs

use crate::core::error::{LatticeError, Result};
use serde::{Deserialize, Serialize};

/// Matrix represented as a vector of vectors (row-major)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    data: Vec<Vec<f64>>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Create a new matrix from 2D vector
    pub fn new(data: Vec<Vec<f64>>) -> Result<Self> {
        if data.is_empty() || data[0].is_empty() {
            return Err(LatticeError::invalid_parameters("Matrix cannot be empty"));
        }

        let rows = data.len();
        let cols = data[0].len();

        for (i, row) in data.iter().enumerate() {
            if row.len() != cols {
                return Err(LatticeError::invalid_basis_shape(
                    (rows, cols),
                    (i + 1, row.len()),
                ));
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(LatticeError::invalid_parameters(format!(
                    "Entry ({}, {}) is not a finite number",
                    i, j
                )));
            }
        }

        Ok(Matrix { data, rows, cols })
    }

    /// Create an identity matrix
    pub fn identity(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(LatticeError::invalid_parameters("Dimension cannot be zero"));
        }

        let mut data = vec![vec![0.0; n]; n];
        for (i, row) in data.iter_mut().enumerate() {
            row[i] = 1.0;
        }

        Ok(Matrix { data, rows: n, cols: n })
    }

    /// Create from integer rows
    pub fn from_integer_rows(data: Vec<Vec<i64>>) -> Result<Self> {
        Matrix::new(
            data.into_iter()
                .map(|row| row.into_iter().map(|x| x as f64).collect())
                .collect(),
        )
    }

    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the dimension of the matrix
    pub fn dimension(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether rows == cols
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Get a specific element
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row)?.get(col).copied()
    }

    /// Set a specific element
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(LatticeError::invalid_basis_shape(
                (self.rows, self.cols),
                (row + 1, col + 1),
            ));
        }
        if !value.is_finite() {
            return Err(LatticeError::invalid_parameters(format!(
                "Entry ({}, {}) must be finite, got {}",
                row, col, value
            )));
        }

        self.data[row][col] = value;
        Ok(())
    }

    /// Copy of this matrix with a single entry replaced
    pub fn with_entry(&self, row: usize, col: usize, value: f64) -> Result<Self> {
        let mut copy = self.clone();
        copy.set(row, col, value)?;
        Ok(copy)
    }

    /// Borrow a row
    pub fn row(&self, row: usize) -> Result<&[f64]> {
        self.data.get(row).map(Vec::as_slice).ok_or_else(|| {
            LatticeError::invalid_basis_shape((self.rows, self.cols), (row + 1, self.cols))
        })
    }

    /// Iterate over the rows
    pub fn row_iter(&self) -> impl Iterator<Item = &[f64]> {
        self.data.iter().map(Vec::as_slice)
    }

    /// Transpose the matrix
    pub fn transpose(&self) -> Self {
        let mut data = vec![vec![0.0; self.rows]; self.cols];

        for (i, row) in self.data.iter().enumerate() {
            for (j, &val) in row.iter().enumerate() {
                data[j][i] = val;
            }
        }

        Matrix { data, rows: self.cols, cols: self.rows }
    }

    /// Matrix subtraction
    pub fn sub(&self, other: &Matrix) -> Result<Self> {
        if self.dimension() != other.dimension() {
            return Err(LatticeError::invalid_basis_shape(
                self.dimension(),
                other.dimension(),
            ));
        }

        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a.iter().zip(b).map(|(x, y)| x - y).collect())
            .collect();

        Ok(Matrix { data, rows: self.rows, cols: self.cols })
    }

    /// Matrix multiplication
    pub fn mul(&self, other: &Matrix) -> Result<Self> {
        if self.cols != other.rows {
            return Err(LatticeError::invalid_basis_shape(
                (self.rows, self.cols),
                (other.rows, other.cols),
            ));
        }

        let mut data = vec![vec![0.0; other.cols]; self.rows];

        // i-k-j order keeps the inner loop on contiguous rows
        for (i, out_row) in data.iter_mut().enumerate() {
            for (k, &a_ik) in self.data[i].iter().enumerate() {
                if a_ik == 0.0 {
                    continue;
                }
                for (out, &b_kj) in out_row.iter_mut().zip(&other.data[k]) {
                    *out += a_ik * b_kj;
                }
            }
        }

        Ok(Matrix { data, rows: self.rows, cols: other.cols })
    }

    /// Compute the Gram matrix (B^T * B)
    pub fn gram(&self) -> Result<Self> {
        self.transpose().mul(self)
    }

    /// Invert a square matrix with Gauss-Jordan elimination and partial pivoting.
    ///
    /// Fails with `SingularBasis` as soon as the best available pivot has
    /// magnitude at or below `tolerance`.
    pub fn inverse(&self, tolerance: f64) -> Result<Self> {
        if !self.is_square() {
            return Err(LatticeError::invalid_basis_shape(
                (self.rows, self.rows),
                (self.rows, self.cols),
            ));
        }

        let n = self.rows;
        let mut a = self.data.clone();
        let mut inv = Matrix::identity(n)?.data;

        for col in 0..n {
            let mut pivot_row = col;
            let mut pivot_abs = a[col][col].abs();
            for (r, row) in a.iter().enumerate().skip(col + 1) {
                if row[col].abs() > pivot_abs {
                    pivot_abs = row[col].abs();
                    pivot_row = r;
                }
            }

            if !(pivot_abs > tolerance) {
                return Err(LatticeError::singular_basis(pivot_abs, tolerance));
            }

            a.swap(col, pivot_row);
            inv.swap(col, pivot_row);

            let pivot = a[col][col];
            for j in 0..n {
                a[col][j] /= pivot;
                inv[col][j] /= pivot;
            }

            let pivot_a = a[col].clone();
            let pivot_inv = inv[col].clone();
            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = a[r][col];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..n {
                    a[r][j] -= factor * pivot_a[j];
                    inv[r][j] -= factor * pivot_inv[j];
                }
            }
        }

        if inv.iter().flatten().any(|v| !v.is_finite()) {
            return Err(LatticeError::numerical_instability(
                "Matrix inverse contains non-finite entries",
            ));
        }

        Ok(Matrix { data: inv, rows: n, cols: n })
    }

    /// Compute the Frobenius norm
    pub fn frobenius_norm(&self) -> f64 {
        self.data
            .iter()
            .flatten()
            .map(|v| v * v)
            .sum::<f64>()
            .sqrt()
    }

    /// Largest absolute entry
    pub fn max_abs(&self) -> f64 {
        self.data
            .iter()
            .flatten()
            .fold(0.0f64, |acc, v| acc.max(v.abs()))
    }

    /// Convert to Vec<Vec<f64>>
    pub fn to_vec(&self) -> Vec<Vec<f64>> {
        self.data.clone()
    }

    /// Convert to flat vector (row-major)
    pub fn to_flat_vec(&self) -> Vec<f64> {
        self.data.iter().flatten().copied().collect()
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = LatticeError;

    fn try_from(data: Vec<Vec<f64>>) -> Result<Self> {
        Matrix::new(data)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(matrix: Matrix) -> Self {
        matrix.data
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Matrix {}x{}:", self.rows, self.cols)?;
        for row in &self.data {
            writeln!(
                f,
                "[{}]",
                row.iter()
                    .map(|x| x.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
        }
        Ok(())
    }
}
