//! Per-role MVP analysis: descriptive statistics, feature correlation, and a logistic model of
//! the MVP outcome evaluated on a held-out split.

use anyhow::bail;
use ordinalizer::Ordinal;
use strum::IntoEnumIterator;
use thiserror::Error;
use tinyrand::{Seeded, Wyrand};
use tracing::{debug, info, warn};

use rivals::heroes::Role;

use crate::correlation::{correlation_matrix, strong_pairs};
use crate::dataset::{Dataset, DatasetError, Feature, RoleSet};
use crate::describe::Summary;
use crate::linear::Matrix;
use crate::logistic::{FitError, LogisticModel, LogisticOptions};
use crate::metrics::{roc_auc, Evaluation};
use crate::scale::StandardScaler;
use crate::split::{complement, stratified_folds, stratified_split};

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub seed: u64,
    pub folds: usize,
    pub test_fraction: f64,
    /// Feature pairs whose correlation exceeds this in magnitude are flagged.
    pub correlation_threshold: f64,
    pub logistic: LogisticOptions,
}
impl AnalysisOptions {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.folds < 2 {
            bail!("at least two cross-validation folds are required");
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            bail!("test fraction must lie in (0, 1)");
        }
        if !(0.0..=1.0).contains(&self.correlation_threshold) {
            bail!("correlation threshold must lie in [0, 1]");
        }
        self.logistic.validate()?;
        Ok(())
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            folds: 5,
            test_fraction: 0.3,
            correlation_threshold: 0.8,
            logistic: LogisticOptions::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("fit error: {0}")]
    Fit(#[from] FitError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrongPair {
    pub first: Feature,
    pub second: Feature,
    pub correlation: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleAnalysis {
    pub role: Role,
    pub samples: usize,
    pub positives: usize,
    pub summaries: Vec<(Feature, Summary)>,
    pub correlations: Matrix,
    pub strong_pairs: Vec<StrongPair>,
    pub train_samples: usize,
    pub test_samples: usize,
    pub scaler: StandardScaler,
    /// Fitted on standardised features.
    pub model: LogisticModel,
    /// ROC-AUC of each cross-validation fold that held both classes.
    pub cv_auc: Vec<f64>,
    pub evaluation: Evaluation,
}
impl RoleAnalysis {
    pub fn cv_auc_mean(&self) -> f64 {
        self.cv_auc.iter().sum::<f64>() / self.cv_auc.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoleOutcome {
    NoData,
    SingleClass { samples: usize },
    Fitted(Box<RoleAnalysis>),
}

/// Analyses each assigned role of the dataset in turn.
pub fn analyse(
    dataset: &Dataset,
    options: &AnalysisOptions,
) -> Result<Vec<(Role, RoleOutcome)>, AnalysisError> {
    let mut outcomes = Vec::with_capacity(Role::ASSIGNED.len());
    for role in Role::ASSIGNED {
        outcomes.push((role, analyse_role(&dataset.by_role(role), options)?));
    }
    Ok(outcomes)
}

pub fn analyse_role(set: &RoleSet, options: &AnalysisOptions) -> Result<RoleOutcome, AnalysisError> {
    if set.is_empty() {
        info!("role {}: no data", set.role);
        return Ok(RoleOutcome::NoData);
    }
    let positives = set.positives();
    if positives == 0 || positives == set.len() {
        warn!("role {}: only one outcome among {} samples", set.role, set.len());
        return Ok(RoleOutcome::SingleClass { samples: set.len() });
    }

    let summaries = Feature::iter()
        .map(|feature| (feature, Summary::of(&set.features.col(feature.ordinal()))))
        .collect();
    let correlations = correlation_matrix(&set.features);
    let strong_pairs = strong_pairs(&correlations, options.correlation_threshold)
        .into_iter()
        .map(|(first, second, correlation)| StrongPair {
            first: Feature::index(first),
            second: Feature::index(second),
            correlation,
        })
        .collect();

    let mut rand = Wyrand::seed(options.seed);
    let split = stratified_split(&set.labels, options.test_fraction, &mut rand);
    let train = set.features.select_rows(&split.train);
    let train_labels = select(&set.labels, &split.train);
    let test = set.features.select_rows(&split.test);
    let test_labels = select(&set.labels, &split.test);
    debug!(
        "role {}: {} training and {} test samples",
        set.role,
        split.train.len(),
        split.test.len()
    );

    let train_positives = train_labels.iter().filter(|&&label| label).count();
    if train_positives == 0 || train_positives == train_labels.len() {
        warn!("role {}: training split holds one outcome", set.role);
        return Ok(RoleOutcome::SingleClass { samples: set.len() });
    }

    let cv_auc = cross_validate(&train, &train_labels, options, &mut rand)?;
    let scaler = StandardScaler::fit(&train);
    let model = LogisticModel::fit(&scaler.transform(&train), &train_labels, &options.logistic)?;
    let probs = model.predict_probas(&scaler.transform(&test));
    let evaluation = Evaluation::of(&probs, &test_labels);
    info!(
        "role {}: fitted in {} iterations, test ROC-AUC {:.4}",
        set.role, model.iterations, evaluation.roc_auc
    );

    Ok(RoleOutcome::Fitted(Box::new(RoleAnalysis {
        role: set.role,
        samples: set.len(),
        positives,
        summaries,
        correlations,
        strong_pairs,
        train_samples: split.train.len(),
        test_samples: split.test.len(),
        scaler,
        model,
        cv_auc,
        evaluation,
    })))
}

fn select(labels: &[bool], indices: &[usize]) -> Vec<bool> {
    indices.iter().map(|&index| labels[index]).collect()
}

/// ROC-AUC of each stratified fold, scaling and fitting on the remaining folds. Folds that cannot
/// be fitted or scored for want of both classes are left out.
fn cross_validate(
    data: &Matrix,
    labels: &[bool],
    options: &AnalysisOptions,
    rand: &mut Wyrand,
) -> Result<Vec<f64>, FitError> {
    let parts = stratified_folds(labels, options.folds, rand);
    let mut aucs = Vec::with_capacity(parts.len());
    for (fold, validation) in parts.iter().enumerate() {
        let training = complement(&parts, fold);
        let fold_data = data.select_rows(&training);
        let scaler = StandardScaler::fit(&fold_data);
        let model = match LogisticModel::fit(
            &scaler.transform(&fold_data),
            &select(labels, &training),
            &options.logistic,
        ) {
            Ok(model) => model,
            Err(FitError::Singular) => return Err(FitError::Singular),
            Err(err) => {
                debug!("fold {fold} skipped: {err}");
                continue;
            }
        };
        let probs = model.predict_probas(&scaler.transform(&data.select_rows(validation)));
        let auc = roc_auc(&probs, &select(labels, validation));
        if auc.is_nan() {
            debug!("fold {fold} skipped: validation holds one outcome");
        } else {
            aucs.push(auc);
        }
    }
    Ok(aucs)
}
