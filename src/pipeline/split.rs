//! Stratified train/test split

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::target::CreditClass;

/// Row indices of the two halves of a split, each sorted ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split rows so every class keeps (to the nearest row) the same share in
/// the test set. Deterministic for a given `seed`.
pub fn stratified_split(labels: &[CreditClass], test_size: f64, seed: u64) -> SplitIndices {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for class in CreditClass::ALL {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == class)
            .map(|(i, _)| i)
            .collect();

        if members.is_empty() {
            continue;
        }

        members.shuffle(&mut rng);

        let n_test = ((members.len() as f64) * test_size).round() as usize;
        let n_test = n_test.min(members.len());

        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();

    SplitIndices { train, test }
}
