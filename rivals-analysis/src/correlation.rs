//! Pearson correlation between feature columns.

use crate::describe::mean;
use crate::linear::Matrix;

/// Pearson's correlation coefficient of two equal-length series. `NaN` if either is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "series lengths do not match");
    let (mean_x, mean_y) = (mean(x), mean(y));
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (&x, &y) in x.iter().zip(y) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// The symmetric matrix of pairwise correlations between the columns of `data`.
pub fn correlation_matrix(data: &Matrix) -> Matrix {
    let cols: Vec<_> = (0..data.cols()).map(|col| data.col(col)).collect();
    let mut matrix = Matrix::allocate(data.cols(), data.cols());
    for i in 0..cols.len() {
        matrix[(i, i)] = if data.rows() > 1 && pearson(&cols[i], &cols[i]).is_nan() {
            f64::NAN
        } else {
            1.0
        };
        for j in i + 1..cols.len() {
            let r = pearson(&cols[i], &cols[j]);
            matrix[(i, j)] = r;
            matrix[(j, i)] = r;
        }
    }
    matrix
}

/// Pairs of distinct columns `(i, j)`, `i < j`, whose correlation exceeds `threshold` in
/// magnitude.
pub fn strong_pairs(correlations: &Matrix, threshold: f64) -> Vec<(usize, usize, f64)> {
    let mut pairs = vec![];
    for i in 0..correlations.rows() {
        for j in i + 1..correlations.cols() {
            let r = correlations[(i, j)];
            if r.abs() > threshold {
                pairs.push((i, j, r));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;

    #[test]
    fn pearson_perfect_and_none() {
        assert_float_absolute_eq!(1.0, pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), 1e-12);
        assert_float_absolute_eq!(-1.0, pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), 1e-12);
        assert_float_absolute_eq!(0.0, pearson(&[1.0, 2.0, 3.0], &[1.0, 0.0, 1.0]), 1e-12);
        assert!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).is_nan());
    }

    #[test]
    fn pearson_partial() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 5.0, 4.0, 5.0]);
        assert_float_absolute_eq!(0.774_596_669_241_483_4, r, 1e-12);
    }

    #[test]
    fn matrix_and_strong_pairs() {
        let data = Matrix::from_rows(
            3,
            &[
                [1.0, 10.0, 3.0],
                [2.0, 20.0, 1.0],
                [3.0, 30.0, 2.0],
                [4.0, 40.5, 3.0],
            ],
        );
        let correlations = correlation_matrix(&data);
        assert_eq!(1.0, correlations[(0, 0)]);
        assert_eq!(correlations[(0, 1)], correlations[(1, 0)]);
        assert!(correlations[(0, 1)] > 0.99);

        let pairs = strong_pairs(&correlations, 0.8);
        assert_eq!(1, pairs.len());
        assert_eq!((0, 1), (pairs[0].0, pairs[0].1));
    }
}
