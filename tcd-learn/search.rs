use rand::Rng;
use tcd_core::{FeatureVector, Label};

use crate::error::{LearnError, LearnResult};
use crate::folds::StratifiedFolds;
use crate::stats::accuracy;

/// Opaque classifier collaborator.
///
/// The search only ever trains on features and labels and asks for
/// per-sample predictions; model internals are never inspected.
pub trait Classifier {
    type Params: Clone;
    type Model;

    fn train(&self, features: &[FeatureVector], labels: &[Label], params: &Self::Params) -> Self::Model;
    fn predict(&self, model: &Self::Model, features: &[FeatureVector]) -> Vec<Label>;
}

/// Winning configuration of a grid search, with the model retrained on the
/// full training set using those hyperparameters.
pub struct SearchOutcome<P, M> {
    pub params: P,
    pub mean_accuracy: f32,
    pub model: M,
}

/// Stratified k-fold grid search over hyperparameter combinations.
///
/// Every combination is scored by mean held-out accuracy over `fold_count`
/// train/evaluate rounds on folds built once up front. Only a strictly
/// higher mean replaces the incumbent, so ties go to the combination seen
/// first. The winner is retrained on the entire training set.
pub fn cross_validated_search<C: Classifier>(
    classifier: &C,
    features: &[FeatureVector],
    labels: &[Label],
    grid: &[C::Params],
    fold_count: usize,
    rng: &mut impl Rng,
) -> LearnResult<SearchOutcome<C::Params, C::Model>> {
    if features.is_empty() || features.len() != labels.len() {
        return Err(LearnError::InsufficientData);
    }
    if grid.is_empty() {
        return Err(LearnError::EmptyGrid);
    }

    let folds = StratifiedFolds::build(labels, fold_count, rng)?;

    let mut best_index = 0usize;
    let mut best_accuracy = f32::NEG_INFINITY;
    for (index, params) in grid.iter().enumerate() {
        let mut total = 0.0f32;
        for k in 0..folds.len() {
            let train_idx = folds.training_indices(k);
            let (train_features, train_labels) = gather(features, labels, &train_idx);
            let model = classifier.train(&train_features, &train_labels, params);

            let (held_features, held_labels) = gather(features, labels, folds.fold(k));
            let predictions = classifier.predict(&model, &held_features);
            total += accuracy(&predictions, &held_labels);
        }
        let mean = total / folds.len() as f32;
        if mean > best_accuracy {
            best_accuracy = mean;
            best_index = index;
        }
    }

    let params = grid[best_index].clone();
    let model = classifier.train(features, labels, &params);
    Ok(SearchOutcome { params, mean_accuracy: best_accuracy, model })
}

fn gather(
    features: &[FeatureVector],
    labels: &[Label],
    indices: &[usize],
) -> (Vec<FeatureVector>, Vec<Label>) {
    let mut out_features = Vec::with_capacity(indices.len());
    let mut out_labels = Vec::with_capacity(indices.len());
    for &i in indices {
        out_features.push(features[i].clone());
        out_labels.push(labels[i]);
    }
    (out_features, out_labels)
}
