//! Stratified partitioning of samples, preserving the label ratio in every part.

use tinyrand::Rand;

/// Indices of the training and test samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

fn shuffle(indices: &mut [usize], rand: &mut impl Rand) {
    for i in (1..indices.len()).rev() {
        let j = rand.next_lim_usize(i + 1);
        indices.swap(i, j);
    }
}

fn by_class(labels: &[bool], rand: &mut impl Rand) -> [Vec<usize>; 2] {
    let mut classes = [vec![], vec![]];
    for (index, &label) in labels.iter().enumerate() {
        classes[usize::from(label)].push(index);
    }
    for class in &mut classes {
        shuffle(class, rand);
    }
    classes
}

/// Assigns a `test_fraction` of each class, rounded to the nearest sample, to the test set and the
/// rest to the training set. Both sets are returned in ascending index order.
pub fn stratified_split(labels: &[bool], test_fraction: f64, rand: &mut impl Rand) -> Split {
    assert!(
        (0.0..=1.0).contains(&test_fraction),
        "test fraction must lie in [0, 1]"
    );
    let mut split = Split {
        train: vec![],
        test: vec![],
    };
    for class in by_class(labels, rand) {
        let test_len = (class.len() as f64 * test_fraction).round() as usize;
        split.test.extend_from_slice(&class[..test_len]);
        split.train.extend_from_slice(&class[test_len..]);
    }
    split.train.sort_unstable();
    split.test.sort_unstable();
    split
}

/// Partitions the samples into `folds` disjoint parts, dealing each class round-robin so that
/// class counts differ by at most one between parts. Each part is in ascending index order.
pub fn stratified_folds(labels: &[bool], folds: usize, rand: &mut impl Rand) -> Vec<Vec<usize>> {
    assert!(folds > 0, "number of folds must be positive");
    let mut parts = vec![vec![]; folds];
    let mut next = 0;
    for class in by_class(labels, rand) {
        for index in class {
            parts[next % folds].push(index);
            next += 1;
        }
    }
    for part in &mut parts {
        part.sort_unstable();
    }
    parts
}

/// The training split for the `fold`-th part: every index not in that part.
pub fn complement(parts: &[Vec<usize>], fold: usize) -> Vec<usize> {
    let mut indices: Vec<_> = parts
        .iter()
        .enumerate()
        .filter(|&(part, _)| part != fold)
        .flat_map(|(_, indices)| indices.iter().copied())
        .collect();
    indices.sort_unstable();
    indices
}
