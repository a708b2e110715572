//! Standardisation of feature columns to zero mean and unit variance.

use crate::describe::{mean, population_std};
use crate::linear::Matrix;

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    /// Population standard deviation of each column; constant columns are recorded as 1.
    pub scales: Vec<f64>,
}
impl StandardScaler {
    pub fn fit(data: &Matrix) -> Self {
        let mut means = Vec::with_capacity(data.cols());
        let mut scales = Vec::with_capacity(data.cols());
        for col in 0..data.cols() {
            let values = data.col(col);
            let col_mean = mean(&values);
            let std = population_std(&values, col_mean);
            means.push(col_mean);
            scales.push(if std > 0.0 { std } else { 1.0 });
        }
        Self { means, scales }
    }

    pub fn transform(&self, data: &Matrix) -> Matrix {
        assert_eq!(self.means.len(), data.cols(), "column count does not match");
        let mut scaled = Matrix::allocate(data.rows(), data.cols());
        for row in 0..data.rows() {
            for col in 0..data.cols() {
                scaled[(row, col)] = (data[(row, col)] - self.means[col]) / self.scales[col];
            }
        }
        scaled
    }
}
