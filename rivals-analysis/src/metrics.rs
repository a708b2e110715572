//! Discrimination and calibration metrics of a binary classifier.

/// Ranks `values` from 1, averaging the ranks of ties.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<_> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end + 1) as f64 / 2.0;
        for &index in &order[start..end] {
            ranks[index] = rank;
        }
        start = end;
    }
    ranks
}

fn class_counts(labels: &[bool]) -> (usize, usize) {
    let positives = labels.iter().filter(|&&label| label).count();
    (positives, labels.len() - positives)
}

/// Area under the ROC curve, computed as the normalised Mann–Whitney U statistic. `NaN` when
/// either class is absent.
pub fn roc_auc(scores: &[f64], labels: &[bool]) -> f64 {
    assert_eq!(scores.len(), labels.len(), "one label is required per score");
    let (positives, negatives) = class_counts(labels);
    if positives == 0 || negatives == 0 {
        return f64::NAN;
    }
    let ranks = average_ranks(scores);
    let positive_rank_sum: f64 = ranks
        .iter()
        .zip(labels)
        .filter(|(_, &label)| label)
        .map(|(rank, _)| rank)
        .sum();
    let (positives, negatives) = (positives as f64, negatives as f64);
    (positive_rank_sum - positives * (positives + 1.0) / 2.0) / (positives * negatives)
}

/// Points `(false positive rate, true positive rate)` of the ROC curve, from `(0, 0)` to `(1, 1)`,
/// with one point per distinct score.
pub fn roc_curve(scores: &[f64], labels: &[bool]) -> Vec<(f64, f64)> {
    assert_eq!(scores.len(), labels.len(), "one label is required per score");
    let (positives, negatives) = class_counts(labels);
    let mut order: Vec<_> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    let mut points = vec![(0.0, 0.0)];
    let (mut true_positives, mut false_positives) = (0, 0);
    for (position, &index) in order.iter().enumerate() {
        if labels[index] {
            true_positives += 1;
        } else {
            false_positives += 1;
        }
        let last_of_tie = order
            .get(position + 1)
            .map_or(true, |&next| scores[next] != scores[index]);
        if last_of_tie {
            points.push((
                rate(false_positives, negatives),
                rate(true_positives, positives),
            ));
        }
    }
    points
}

fn rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        f64::NAN
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Kolmogorov–Smirnov statistic: the greatest separation `TPR − FPR` over all thresholds.
pub fn ks_statistic(scores: &[f64], labels: &[bool]) -> f64 {
    roc_curve(scores, labels)
        .into_iter()
        .map(|(fpr, tpr)| tpr - fpr)
        .fold(f64::NAN, f64::max)
}

/// Mean squared difference between predicted probabilities and outcomes.
pub fn brier_score(probs: &[f64], labels: &[bool]) -> f64 {
    assert_eq!(probs.len(), labels.len(), "one label is required per probability");
    let sum: f64 = probs
        .iter()
        .zip(labels)
        .map(|(p, &label)| (p - if label { 1.0 } else { 0.0 }).powi(2))
        .sum();
    sum / probs.len() as f64
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}
impl ConfusionMatrix {
    /// Classifies a sample as positive when its probability is at least `threshold`.
    pub fn at_threshold(probs: &[f64], labels: &[bool], threshold: f64) -> Self {
        assert_eq!(probs.len(), labels.len(), "one label is required per probability");
        let mut matrix = Self::default();
        for (&p, &label) in probs.iter().zip(labels) {
            match (p >= threshold, label) {
                (true, true) => matrix.true_positives += 1,
                (true, false) => matrix.false_positives += 1,
                (false, false) => matrix.true_negatives += 1,
                (false, true) => matrix.false_negatives += 1,
            }
        }
        matrix
    }

    /// True positive rate (recall).
    pub fn sensitivity(&self) -> f64 {
        rate(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// True negative rate.
    pub fn specificity(&self) -> f64 {
        rate(self.true_negatives, self.true_negatives + self.false_positives)
    }

    pub fn precision(&self) -> f64 {
        rate(self.true_positives, self.true_positives + self.false_positives)
    }

    /// Harmonic mean of precision and recall; 0 when there are no true positives.
    pub fn f1(&self) -> f64 {
        let denominator = 2 * self.true_positives + self.false_positives + self.false_negatives;
        if denominator == 0 {
            0.0
        } else {
            (2 * self.true_positives) as f64 / denominator as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub mean_predicted: f64,
    pub observed_rate: f64,
}

/// Groups predictions into `bins` equal-width probability bins and compares the mean predicted
/// probability with the observed positive rate in each. Empty bins are omitted.
pub fn calibration(probs: &[f64], labels: &[bool], bins: usize) -> Vec<CalibrationBin> {
    assert!(bins > 0, "number of bins must be positive");
    assert_eq!(probs.len(), labels.len(), "one label is required per probability");
    let mut sums = vec![(0usize, 0.0, 0usize); bins];
    for (&p, &label) in probs.iter().zip(labels) {
        let bin = ((p * bins as f64) as usize).min(bins - 1);
        let (count, predicted, positives) = &mut sums[bin];
        *count += 1;
        *predicted += p;
        *positives += usize::from(label);
    }
    sums.into_iter()
        .enumerate()
        .filter(|(_, (count, _, _))| *count > 0)
        .map(|(bin, (count, predicted, positives))| CalibrationBin {
            lower: bin as f64 / bins as f64,
            upper: (bin + 1) as f64 / bins as f64,
            count,
            mean_predicted: predicted / count as f64,
            observed_rate: positives as f64 / count as f64,
        })
        .collect()
}

/// Test-set performance of a fitted classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub roc_auc: f64,
    pub ks: f64,
    pub brier: f64,
    pub confusion: ConfusionMatrix,
    pub calibration: Vec<CalibrationBin>,
}
impl Evaluation {
    pub const THRESHOLD: f64 = 0.5;
    pub const CALIBRATION_BINS: usize = 10;

    pub fn of(probs: &[f64], labels: &[bool]) -> Self {
        Self {
            roc_auc: roc_auc(probs, labels),
            ks: ks_statistic(probs, labels),
            brier: brier_score(probs, labels),
            confusion: ConfusionMatrix::at_threshold(probs, labels, Self::THRESHOLD),
            calibration: calibration(probs, labels, Self::CALIBRATION_BINS),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;

    #[test]
    fn ranks_with_ties() {
        assert_eq!(vec![1.0, 2.5, 2.5, 4.0], average_ranks(&[0.1, 0.4, 0.4, 0.9]));
        assert_eq!(vec![3.0, 1.0, 2.0], average_ranks(&[5.0, 1.0, 2.0]));
    }

    #[test]
    fn auc_perfect_random_and_inverted() {
        let labels = [false, false, true, true];
        assert_eq!(1.0, roc_auc(&[0.1, 0.2, 0.8, 0.9], &labels));
        assert_eq!(0.0, roc_auc(&[0.9, 0.8, 0.2, 0.1], &labels));
        assert_eq!(0.5, roc_auc(&[0.5, 0.5, 0.5, 0.5], &labels));
        assert!(roc_auc(&[0.1, 0.2], &[true, true]).is_nan());
    }

    #[test]
    fn auc_partial() {
        let labels = [false, true, false, true, true];
        let scores = [0.1, 0.4, 0.35, 0.8, 0.3];
        // pairs (pos, neg) ranked correctly: 0.4>0.1, 0.4>0.35, 0.8>both, 0.3>0.1 = 5 of 6
        assert_float_absolute_eq!(5.0 / 6.0, roc_auc(&scores, &labels), 1e-12);
    }

    #[test]
    fn curve_and_ks() {
        let labels = [false, false, true, true];
        let curve = roc_curve(&[0.1, 0.6, 0.4, 0.9], &labels);
        assert_eq!(
            vec![(0.0, 0.0), (0.0, 0.5), (0.5, 0.5), (0.5, 1.0), (1.0, 1.0)],
            curve
        );
        assert_eq!(0.5, ks_statistic(&[0.1, 0.6, 0.4, 0.9], &labels));
        assert_eq!(1.0, ks_statistic(&[0.1, 0.2, 0.8, 0.9], &labels));
    }

    #[test]
    fn curve_groups_ties() {
        let curve = roc_curve(&[0.5, 0.5, 0.2], &[true, false, false]);
        assert_eq!(vec![(0.0, 0.0), (0.5, 1.0), (1.0, 1.0)], curve);
    }

    #[test]
    fn brier() {
        assert_eq!(0.0, brier_score(&[1.0, 0.0], &[true, false]));
        let score = brier_score(&[0.5, 0.25, 1.0, 0.0], &[true, false, true, false]);
        assert_float_absolute_eq!(0.078_125, score, 1e-12);
    }

    #[test]
    fn confusion() {
        let probs = [0.9, 0.6, 0.4, 0.2, 0.7, 0.5];
        let labels = [true, false, true, false, true, false];
        let matrix = ConfusionMatrix::at_threshold(&probs, &labels, 0.5);
        assert_eq!(
            ConfusionMatrix {
                true_positives: 2,
                false_positives: 2,
                true_negatives: 1,
                false_negatives: 1,
            },
            matrix
        );
        assert_float_absolute_eq!(2.0 / 3.0, matrix.sensitivity(), 1e-12);
        assert_float_absolute_eq!(1.0 / 3.0, matrix.specificity(), 1e-12);
        assert_eq!(0.5, matrix.precision());
        assert_float_absolute_eq!(4.0 / 7.0, matrix.f1(), 1e-12);
        assert_eq!(0.0, ConfusionMatrix::default().f1());
    }

    #[test]
    fn calibration_bins() {
        let probs = [0.05, 0.08, 0.55, 0.95, 1.0];
        let labels = [false, true, true, false, true];
        let bins = calibration(&probs, &labels, 10);
        assert_eq!(3, bins.len());
        assert_eq!((0.0, 0.1, 2), (bins[0].lower, bins[0].upper, bins[0].count));
        assert_float_absolute_eq!(0.065, bins[0].mean_predicted, 1e-12);
        assert_eq!(0.5, bins[0].observed_rate);
        assert_eq!((0.5, 1), (bins[1].lower, bins[1].count));
        assert_eq!(0.9, bins[2].lower);
        assert_eq!(2, bins[2].count);
        assert_eq!(0.5, bins[2].observed_rate);
    }

    #[test]
    fn evaluation() {
        let probs = [0.1, 0.2, 0.8, 0.9];
        let labels = [false, false, true, true];
        let evaluation = Evaluation::of(&probs, &labels);
        assert_eq!(1.0, evaluation.roc_auc);
        assert_eq!(1.0, evaluation.ks);
        assert_eq!(1.0, evaluation.confusion.f1());
        assert_float_absolute_eq!(0.025, evaluation.brier, 1e-12);
    }
}
