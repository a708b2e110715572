//! L2-penalised logistic regression, fitted by Newton–Raphson (iteratively reweighted least
//! squares).
//!
//! The minimised objective is `C · Σ wᵢ · loss(yᵢ, zᵢ) + ½ · ‖β‖²`, where `zᵢ = β · xᵢ + β₀` and
//! the intercept `β₀` is not penalised. With balanced class weights, each sample of class `k` is
//! weighted `n / (2 · nₖ)`.

use std::fmt::Display;

use anyhow::bail;
use thiserror::Error;
use tracing::{debug, warn};

use crate::linear::{solve, Matrix};

#[derive(Debug, Clone, PartialEq)]
pub struct LogisticOptions {
    /// Inverse of the regularisation strength.
    pub c: f64,
    pub balanced: bool,
    pub max_iterations: usize,
    /// Convergence is reached when no parameter moves by more than this in one step.
    pub tolerance: f64,
}
impl LogisticOptions {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.c > 0.0 && self.c.is_finite()) {
            bail!("regularisation inverse C must be positive and finite");
        }
        if self.max_iterations == 0 {
            bail!("maximum number of iterations must be positive");
        }
        if self.tolerance <= 0.0 {
            bail!("tolerance must be positive");
        }
        Ok(())
    }
}

impl Default for LogisticOptions {
    fn default() -> Self {
        Self {
            c: 1.0,
            balanced: true,
            max_iterations: 100,
            tolerance: 1e-8,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FitError {
    #[error("no samples to fit")]
    Empty,

    #[error("labels contain a single class")]
    SingleClass,

    #[error("Hessian is singular")]
    Singular,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub iterations: usize,
    pub converged: bool,
}

#[inline]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + eᶻ)` without overflow.
#[inline]
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

/// Per-sample weights; `1` everywhere unless `balanced`.
fn sample_weights(labels: &[bool], balanced: bool) -> Vec<f64> {
    let n = labels.len() as f64;
    let positives = labels.iter().filter(|&&label| label).count() as f64;
    let (w_pos, w_neg) = if balanced {
        (n / (2.0 * positives), n / (2.0 * (n - positives)))
    } else {
        (1.0, 1.0)
    };
    labels
        .iter()
        .map(|&label| if label { w_pos } else { w_neg })
        .collect()
}

/// Parameters are laid out as `[β₁ … βₚ, β₀]`.
struct Problem<'a> {
    data: &'a Matrix,
    labels: &'a [bool],
    weights: Vec<f64>,
    c: f64,
}
impl Problem<'_> {
    fn params(&self) -> usize {
        self.data.cols() + 1
    }

    fn z(&self, row: usize, theta: &[f64]) -> f64 {
        let features = self.data.cols();
        self.data
            .row_slice(row)
            .iter()
            .zip(&theta[..features])
            .map(|(x, beta)| x * beta)
            .sum::<f64>()
            + theta[features]
    }

    fn objective(&self, theta: &[f64]) -> f64 {
        let features = self.data.cols();
        let loss: f64 = (0..self.data.rows())
            .map(|row| {
                let z = self.z(row, theta);
                let y = if self.labels[row] { 1.0 } else { 0.0 };
                self.weights[row] * (softplus(z) - y * z)
            })
            .sum();
        let penalty: f64 = theta[..features].iter().map(|beta| beta * beta).sum();
        self.c * loss + 0.5 * penalty
    }

    fn gradient_and_hessian(&self, theta: &[f64]) -> (Vec<f64>, Matrix) {
        let features = self.data.cols();
        let params = self.params();
        let mut gradient = vec![0.0; params];
        let mut hessian = Matrix::allocate(params, params);
        let mut augmented = vec![1.0; params];
        for row in 0..self.data.rows() {
            augmented[..features].copy_from_slice(self.data.row_slice(row));
            let p = sigmoid(self.z(row, theta));
            let y = if self.labels[row] { 1.0 } else { 0.0 };
            let residual = self.c * self.weights[row] * (p - y);
            let curvature = self.c * self.weights[row] * p * (1.0 - p);
            for i in 0..params {
                gradient[i] += residual * augmented[i];
                for j in 0..=i {
                    hessian[(i, j)] += curvature * augmented[i] * augmented[j];
                }
            }
        }
        for i in 0..params {
            for j in 0..i {
                hessian[(j, i)] = hessian[(i, j)];
            }
        }
        for i in 0..features {
            gradient[i] += theta[i];
            hessian[(i, i)] += 1.0;
        }
        (gradient, hessian)
    }
}

impl LogisticModel {
    pub fn fit(
        data: &Matrix,
        labels: &[bool],
        options: &LogisticOptions,
    ) -> Result<Self, FitError> {
        assert_eq!(data.rows(), labels.len(), "one label is required per sample");
        if labels.is_empty() {
            return Err(FitError::Empty);
        }
        let positives = labels.iter().filter(|&&label| label).count();
        if positives == 0 || positives == labels.len() {
            return Err(FitError::SingleClass);
        }

        let problem = Problem {
            data,
            labels,
            weights: sample_weights(labels, options.balanced),
            c: options.c,
        };
        let mut theta = vec![0.0; problem.params()];
        let mut objective = problem.objective(&theta);
        let mut converged = false;
        let mut iterations = 0;
        while iterations < options.max_iterations {
            iterations += 1;
            let (gradient, hessian) = problem.gradient_and_hessian(&theta);
            let step = solve(hessian, gradient).ok_or(FitError::Singular)?;

            // halve the step until the objective does not increase
            let mut scale = 1.0;
            let mut candidate: Vec<_>;
            loop {
                candidate = theta
                    .iter()
                    .zip(&step)
                    .map(|(param, delta)| param - scale * delta)
                    .collect();
                let candidate_objective = problem.objective(&candidate);
                if candidate_objective <= objective || scale < 1e-10 {
                    objective = candidate_objective;
                    break;
                }
                scale *= 0.5;
            }
            let max_delta = step
                .iter()
                .map(|delta| (scale * delta).abs())
                .fold(0.0, f64::max);
            theta = candidate;
            debug!("iteration {iterations}: objective {objective:.9}, max step {max_delta:.3e}");
            if max_delta < options.tolerance {
                converged = true;
                break;
            }
        }
        if !converged {
            warn!("logistic regression did not converge in {iterations} iterations");
        }

        let intercept = theta.pop().unwrap_or_default();
        Ok(Self {
            coefficients: theta,
            intercept,
            iterations,
            converged,
        })
    }

    pub fn decision(&self, features: &[f64]) -> f64 {
        features
            .iter()
            .zip(&self.coefficients)
            .map(|(x, beta)| x * beta)
            .sum::<f64>()
            + self.intercept
    }

    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(self.decision(features))
    }

    pub fn predict_probas(&self, data: &Matrix) -> Vec<f64> {
        (0..data.rows())
            .map(|row| self.predict_proba(data.row_slice(row)))
            .collect()
    }

    /// Renders the fitted log-odds as an equation over the named features.
    pub fn equation<N: Display>(&self, names: &[N]) -> String {
        let mut equation = format!("logit(p) = {:.4}", self.intercept);
        for (name, coefficient) in names.iter().zip(&self.coefficients) {
            let sign = if *coefficient < 0.0 { '-' } else { '+' };
            equation.push_str(&format!(" {sign} {:.4}·{name}", coefficient.abs()));
        }
        equation
    }
}

#[cfg(test)]
mod tests;
