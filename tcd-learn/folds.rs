use rand::Rng;
use tcd_core::Label;

use crate::error::{LearnError, LearnResult};

/// Stratified k-fold partition of sample indices for binary labels.
///
/// The construction procedure is fixed:
/// 1. permute all indices with `n` uniformly chosen swap pairs,
/// 2. split the permuted order into class-0 and class-1 index lists,
/// 3. cut each class list at `((k+1)*n_class + folds/2) / folds` so fold
///    sizes deviate from perfect proportionality by at most one sample per
///    class,
/// 4. mix the two classes inside each fold with another round of swap pairs
///    local to that fold.
///
/// Folds are disjoint, collectively exhaustive and fixed once built.
#[derive(Debug, Clone)]
pub struct StratifiedFolds {
    folds: Vec<Vec<usize>>,
}

impl StratifiedFolds {
    pub fn build(labels: &[Label], fold_count: usize, rng: &mut impl Rng) -> LearnResult<Self> {
        let sample_count = labels.len();
        if sample_count == 0 {
            return Err(LearnError::InsufficientData);
        }
        if fold_count == 0 || fold_count > sample_count {
            return Err(LearnError::FoldCountTooLarge { fold_count, sample_count });
        }

        let mut sidx: Vec<usize> = (0..sample_count).collect();
        for _ in 0..sample_count {
            let i1 = rng.gen_range(0..sample_count);
            let i2 = rng.gen_range(0..sample_count);
            sidx.swap(i1, i2);
        }

        let mut idx0 = Vec::new();
        let mut idx1 = Vec::new();
        for &i in &sidx {
            if labels[i] == 0 {
                idx0.push(i);
            } else {
                idx1.push(i);
            }
        }

        let n0 = idx0.len();
        let n1 = idx1.len();
        let mut a0 = 0usize;
        let mut a1 = 0usize;
        let mut folds = Vec::with_capacity(fold_count);
        for k in 0..fold_count {
            let b0 = ((k + 1) * n0 + fold_count / 2) / fold_count;
            let b1 = ((k + 1) * n1 + fold_count / 2) / fold_count;

            let mut fold: Vec<usize> = Vec::with_capacity((b0 - a0) + (b1 - a1));
            fold.extend_from_slice(&idx0[a0..b0]);
            fold.extend_from_slice(&idx1[a1..b1]);
            if fold.is_empty() {
                return Err(LearnError::FoldCountTooLarge { fold_count, sample_count });
            }

            let len = fold.len();
            for _ in 0..len {
                let i1 = rng.gen_range(0..len);
                let i2 = rng.gen_range(0..len);
                fold.swap(i1, i2);
            }

            a0 = b0;
            a1 = b1;
            folds.push(fold);
        }

        Ok(Self { folds })
    }

    pub fn len(&self) -> usize {
        self.folds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    /// Indices held out by fold `k`.
    pub fn fold(&self, k: usize) -> &[usize] {
        &self.folds[k]
    }

    /// Union of all folds except `held_out`, in fold order.
    pub fn training_indices(&self, held_out: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for (k, fold) in self.folds.iter().enumerate() {
            if k != held_out {
                out.extend_from_slice(fold);
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<usize>> {
        self.folds.iter()
    }
}
