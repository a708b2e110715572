use assert_float_eq::*;
use tinyrand::{Rand, Seeded, Wyrand};

use super::*;

fn random_f64(rand: &mut impl Rand) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64
}

fn gradient_norm(data: &Matrix, labels: &[bool], options: &LogisticOptions, model: &LogisticModel) -> f64 {
    let problem = Problem {
        data,
        labels,
        weights: sample_weights(labels, options.balanced),
        c: options.c,
    };
    let mut theta = model.coefficients.clone();
    theta.push(model.intercept);
    let (gradient, _) = problem.gradient_and_hessian(&theta);
    gradient.iter().map(|g| g * g).sum::<f64>().sqrt()
}

#[test]
fn sigmoid_and_softplus() {
    assert_eq!(0.5, sigmoid(0.0));
    assert_float_absolute_eq!(0.731_058_578_630_004_9, sigmoid(1.0), 1e-12);
    assert_float_absolute_eq!(1.0 - sigmoid(3.0), sigmoid(-3.0), 1e-12);
    assert_eq!(1.0, sigmoid(800.0));
    assert_eq!(0.0, sigmoid(-800.0));
    assert_float_absolute_eq!(2.0f64.ln(), softplus(0.0), 1e-12);
    assert_eq!(800.0, softplus(800.0));
}

#[test]
fn sample_weights_balanced() {
    let labels = [true, false, false, false];
    assert_eq!(vec![2.0, 2.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0], sample_weights(&labels, true));
    assert_eq!(vec![1.0; 4], sample_weights(&labels, false));
}

#[test]
fn intercept_only_unbalanced() {
    let data = Matrix::allocate(4, 1);
    let labels = [true, false, false, false];
    let options = LogisticOptions {
        balanced: false,
        ..LogisticOptions::default()
    };
    let model = LogisticModel::fit(&data, &labels, &options).unwrap();
    assert!(model.converged);
    assert_eq!(vec![0.0], model.coefficients);
    assert_float_absolute_eq!((1.0f64 / 3.0).ln(), model.intercept, 1e-8);
    assert_float_absolute_eq!(0.25, model.predict_proba(&[0.0]), 1e-8);
}

#[test]
fn intercept_only_balanced() {
    let data = Matrix::allocate(4, 1);
    let labels = [true, false, false, false];
    let model = LogisticModel::fit(&data, &labels, &LogisticOptions::default()).unwrap();
    assert!(model.converged);
    assert_float_absolute_eq!(0.0, model.intercept, 1e-8);
}

#[test]
fn symmetric_data() {
    let data = Matrix::from_rows(1, &[[-2.0], [-1.0], [1.0], [2.0]]);
    let labels = [false, false, true, true];
    let options = LogisticOptions::default();
    let model = LogisticModel::fit(&data, &labels, &options).unwrap();
    assert!(model.converged);
    assert_float_absolute_eq!(0.0, model.intercept, 1e-8);
    assert!(model.coefficients[0] > 0.0);
    assert!(gradient_norm(&data, &labels, &options, &model) < 1e-6);
    assert!(model.predict_proba(&[2.0]) > 0.5);
    assert!(model.predict_proba(&[-2.0]) < 0.5);
}

#[test]
fn stronger_penalty_shrinks_coefficients() {
    let data = Matrix::from_rows(1, &[[-2.0], [-1.0], [1.0], [2.0]]);
    let labels = [false, false, true, true];
    let loose = LogisticModel::fit(&data, &labels, &LogisticOptions::default()).unwrap();
    let tight = LogisticModel::fit(
        &data,
        &labels,
        &LogisticOptions {
            c: 0.01,
            ..LogisticOptions::default()
        },
    )
    .unwrap();
    assert!(tight.coefficients[0] < loose.coefficients[0]);
    assert!(tight.coefficients[0] > 0.0);
}

#[test]
fn noisy_data() {
    let mut rand = Wyrand::seed(42);
    let samples = 400;
    let mut data = Matrix::allocate(samples, 2);
    let mut labels = Vec::with_capacity(samples);
    for row in 0..samples {
        let signal = random_f64(&mut rand) * 4.0 - 2.0;
        let noise = random_f64(&mut rand) * 4.0 - 2.0;
        data[(row, 0)] = signal;
        data[(row, 1)] = noise;
        labels.push(random_f64(&mut rand) < sigmoid(2.0 * signal - 0.5));
    }
    let options = LogisticOptions::default();
    let model = LogisticModel::fit(&data, &labels, &options).unwrap();
    assert!(model.converged);
    assert!(model.iterations < 20, "{}", model.iterations);
    assert!(model.coefficients[0] > 1.0, "{:?}", model.coefficients);
    assert!(model.coefficients[0].abs() > 3.0 * model.coefficients[1].abs());
    assert!(gradient_norm(&data, &labels, &options, &model) < 1e-6);
}

#[test]
fn degenerate_labels() {
    let data = Matrix::allocate(3, 2);
    assert_eq!(
        Err(FitError::SingleClass),
        LogisticModel::fit(&data, &[true, true, true], &LogisticOptions::default())
    );
    assert_eq!(
        Err(FitError::Empty),
        LogisticModel::fit(&Matrix::allocate(0, 2), &[], &LogisticOptions::default())
    );
}

#[test]
fn equation() {
    let model = LogisticModel {
        coefficients: vec![0.5, -1.25],
        intercept: -0.1,
        iterations: 1,
        converged: true,
    };
    assert_eq!(
        "logit(p) = -0.1000 + 0.5000·kills - 1.2500·deaths",
        model.equation(&["kills", "deaths"])
    );
}

#[test]
fn options_validation() {
    LogisticOptions::default().validate().unwrap();
    let options = LogisticOptions {
        c: 0.0,
        ..LogisticOptions::default()
    };
    assert!(options.validate().is_err());
    let options = LogisticOptions {
        max_iterations: 0,
        ..LogisticOptions::default()
    };
    assert!(options.validate().is_err());
}
