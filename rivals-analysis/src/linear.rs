//! Support for linear algebra.

use std::ops::{Index, IndexMut};

/// A dense, row-major matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}
impl Matrix {
    pub fn allocate(rows: usize, cols: usize) -> Self {
        let (len, overflow) = rows.overflowing_mul(cols);
        assert!(
            !overflow,
            "allocation of a {rows}x{cols} matrix failed due to overflow"
        );
        let data = vec![0.0; len];
        Self { data, rows, cols }
    }

    pub fn from_rows<R: AsRef<[f64]>>(cols: usize, rows: &[R]) -> Self {
        let mut matrix = Self::allocate(rows.len(), cols);
        for (row_index, row) in rows.iter().enumerate() {
            matrix.row_slice_mut(row_index).copy_from_slice(row.as_ref());
        }
        matrix
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row_slice(&self, row: usize) -> &[f64] {
        debug_assert!(self.validate_row_index(row));
        let row_start = row * self.cols;
        &self.data[row_start..(row_start + self.cols)]
    }

    pub fn row_slice_mut(&mut self, row: usize) -> &mut [f64] {
        debug_assert!(self.validate_row_index(row));
        let row_start = row * self.cols;
        &mut self.data[row_start..(row_start + self.cols)]
    }

    pub fn col(&self, col: usize) -> Vec<f64> {
        debug_assert!(self.validate_col_index(col));
        (0..self.rows).map(|row| self[(row, col)]).collect()
    }

    /// A new matrix comprising the given rows, in order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let mut selected = Self::allocate(rows.len(), self.cols);
        for (target, &source) in rows.iter().enumerate() {
            selected
                .row_slice_mut(target)
                .copy_from_slice(self.row_slice(source));
        }
        selected
    }

    fn validate_row_index(&self, row: usize) -> bool {
        assert!(
            row < self.rows,
            "invalid row index {row} for a {}x{} matrix",
            self.rows,
            self.cols
        );
        true
    }

    fn validate_col_index(&self, col: usize) -> bool {
        assert!(
            col < self.cols,
            "invalid column index {col} for a {}x{} matrix",
            self.rows,
            self.cols
        );
        true
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        let (row, col) = index;
        debug_assert!(self.validate_row_index(row));
        debug_assert!(self.validate_col_index(col));
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        let (row, col) = index;
        debug_assert!(self.validate_row_index(row));
        debug_assert!(self.validate_col_index(col));
        &mut self.data[row * self.cols + col]
    }
}

/// Solves `a · x = b` for a square `a` by Gaussian elimination with partial pivoting. Returns
/// `None` if `a` is singular.
pub fn solve(mut a: Matrix, mut b: Vec<f64>) -> Option<Vec<f64>> {
    const EPSILON: f64 = 1e-12;
    let n = a.rows();
    assert_eq!(n, a.cols(), "matrix must be square");
    assert_eq!(n, b.len(), "right-hand side must have {n} elements");

    for pivot in 0..n {
        let max_row = (pivot..n)
            .max_by(|&i, &j| a[(i, pivot)].abs().total_cmp(&a[(j, pivot)].abs()))?;
        if a[(max_row, pivot)].abs() < EPSILON {
            return None;
        }
        if max_row != pivot {
            for col in 0..n {
                let tmp = a[(pivot, col)];
                a[(pivot, col)] = a[(max_row, col)];
                a[(max_row, col)] = tmp;
            }
            b.swap(pivot, max_row);
        }
        for row in pivot + 1..n {
            let factor = a[(row, pivot)] / a[(pivot, pivot)];
            if factor == 0.0 {
                continue;
            }
            for col in pivot..n {
                a[(row, col)] -= factor * a[(pivot, col)];
            }
            b[row] -= factor * b[pivot];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let sum: f64 = (row + 1..n).map(|col| a[(row, col)] * x[col]).sum();
        x[row] = (b[row] - sum) / a[(row, row)];
    }
    Some(x)
}
