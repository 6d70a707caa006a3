use tcd_core::{Label, LABEL_TEXTURED};

use crate::error::{LearnError, LearnResult};

/// Presentation-attack detection rates, all in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalReport {
    /// Correct classification rate
    pub ccr: f32,
    /// Attack presentations (textured) misclassified as bona fide
    pub apcer: f32,
    /// Bona fide presentations (clear) misclassified as attacks
    pub bpcer: f32,
}

impl std::fmt::Display for EvalReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CCR: {:.2}  APCER: {:.2}  BPCER: {:.2}",
            self.ccr, self.apcer, self.bpcer
        )
    }
}

/// Classification accuracy in percent: `100 - incorrect/total*100`.
pub fn accuracy(predicted: &[Label], truth: &[Label]) -> f32 {
    if truth.is_empty() {
        return 0.0;
    }
    let incorrect = predicted.iter().zip(truth).filter(|(p, t)| p != t).count();
    100.0 - (incorrect as f32 / truth.len() as f32) * 100.0
}

/// Compare predictions against ground truth.
///
/// A class absent from the truth yields a rate of 0 for that class rather
/// than a division by zero.
pub fn evaluate(predicted: &[Label], truth: &[Label]) -> LearnResult<EvalReport> {
    if truth.is_empty() {
        return Err(LearnError::InsufficientData);
    }
    if predicted.len() != truth.len() {
        return Err(LearnError::PredictionLengthMismatch {
            expected: truth.len(),
            actual: predicted.len(),
        });
    }

    let mut num_attack = 0usize;
    let mut num_bonafide = 0usize;
    let mut incorrect = 0usize;
    let mut missed_attacks = 0usize;
    let mut false_alarms = 0usize;
    for (&p, &t) in predicted.iter().zip(truth) {
        if t == LABEL_TEXTURED {
            num_attack += 1;
        } else {
            num_bonafide += 1;
        }
        if p != t {
            incorrect += 1;
            if t == LABEL_TEXTURED {
                missed_attacks += 1;
            } else {
                false_alarms += 1;
            }
        }
    }

    let ccr = 100.0 - (incorrect as f32 / truth.len() as f32) * 100.0;
    let apcer = missed_attacks as f32 / num_attack.max(1) as f32 * 100.0;
    let bpcer = false_alarms as f32 / num_bonafide.max(1) as f32 * 100.0;
    Ok(EvalReport { ccr, apcer, bpcer })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions_score_one_hundred() {
        let truth = vec![0, 1, 1, 0];
        let report = evaluate(&truth, &truth).unwrap();
        assert_eq!(report.ccr, 100.0);
        assert_eq!(report.apcer, 0.0);
        assert_eq!(report.bpcer, 0.0);
    }

    #[test]
    fn error_rates_split_by_class() {
        // 2 attacks (one missed), 2 bona fide (one false alarm)
        let truth = vec![1, 1, 0, 0];
        let predicted = vec![1, 0, 1, 0];
        let report = evaluate(&predicted, &truth).unwrap();
        assert_eq!(report.ccr, 50.0);
        assert_eq!(report.apcer, 50.0);
        assert_eq!(report.bpcer, 50.0);
    }

    #[test]
    fn missing_class_does_not_divide_by_zero() {
        let truth = vec![1, 1, 1];
        let predicted = vec![1, 0, 1];
        let report = evaluate(&predicted, &truth).unwrap();
        assert!(report.bpcer == 0.0);
        assert!((report.apcer - 100.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn accuracy_matches_fraction_correct() {
        let truth = vec![0, 0, 1, 1, 1];
        let predicted = vec![0, 1, 1, 1, 0];
        assert!((accuracy(&predicted, &truth) - 60.0).abs() < 1e-5);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let result = evaluate(&[0, 1], &[0, 1, 1]);
        assert!(matches!(result, Err(LearnError::PredictionLengthMismatch { .. })));
    }
}
