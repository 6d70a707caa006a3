use rand::Rng;
use tcd_core::Label;

use crate::error::{LearnError, LearnResult};

/// Unweighted majority vote over per-model binary predictions.
///
/// `votes[m][s]` is model m's prediction for sample s. Label 1 wins a
/// sample only with a strict majority; an exact tie is broken by a uniform
/// random draw from {0, 1}.
pub fn majority(votes: &[Vec<Label>], rng: &mut impl Rng) -> LearnResult<Vec<Label>> {
    let sample_count = check_votes(votes)?;

    let mut out = Vec::with_capacity(sample_count);
    for s in 0..sample_count {
        let mut in_favor = 0usize;
        let mut against = 0usize;
        for model_votes in votes {
            if model_votes[s] == 1 {
                in_favor += 1;
            } else {
                against += 1;
            }
        }
        let label = if in_favor > against {
            1
        } else if against > in_favor {
            0
        } else {
            rng.gen_range(0..2)
        };
        out.push(label);
    }
    Ok(out)
}

/// Accuracy-weighted vote.
///
/// Each model's vote counts with its held-out accuracy as weight; a sample
/// gets label 1 when the weighted vote share exceeds 0.5.
pub fn weighted(votes: &[Vec<Label>], weights: &[f32]) -> LearnResult<Vec<Label>> {
    let sample_count = check_votes(votes)?;
    if weights.len() != votes.len() {
        return Err(LearnError::PredictionLengthMismatch {
            expected: votes.len(),
            actual: weights.len(),
        });
    }
    let weight_sum: f32 = weights.iter().sum();
    if weight_sum <= 0.0 {
        return Err(LearnError::ZeroWeightSum);
    }

    let mut out = Vec::with_capacity(sample_count);
    for s in 0..sample_count {
        let mut score = 0.0f32;
        for (model_votes, &weight) in votes.iter().zip(weights) {
            score += model_votes[s] as f32 * weight;
        }
        out.push(if score / weight_sum > 0.5 { 1 } else { 0 });
    }
    Ok(out)
}

fn check_votes(votes: &[Vec<Label>]) -> LearnResult<usize> {
    let first = votes.first().ok_or(LearnError::EmptyEnsemble)?;
    let sample_count = first.len();
    for model_votes in votes {
        if model_votes.len() != sample_count {
            return Err(LearnError::PredictionLengthMismatch {
                expected: sample_count,
                actual: model_votes.len(),
            });
        }
    }
    Ok(sample_count)
}
