#[derive(Debug, Clone)]
pub enum LearnError {
    InsufficientData,
    FoldCountTooLarge { fold_count: usize, sample_count: usize },
    EmptyGrid,
    EmptyEnsemble,
    PredictionLengthMismatch { expected: usize, actual: usize },
    ZeroWeightSum,
}

impl std::fmt::Display for LearnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LearnError::InsufficientData => {
                write!(f, "Training set is empty or labels do not match samples")
            }
            LearnError::FoldCountTooLarge { fold_count, sample_count } => {
                write!(
                    f,
                    "Fold count {} leaves an empty held-out fold for {} samples",
                    fold_count, sample_count
                )
            }
            LearnError::EmptyGrid => write!(f, "Hyperparameter grid is empty"),
            LearnError::EmptyEnsemble => write!(f, "No model predictions to combine"),
            LearnError::PredictionLengthMismatch { expected, actual } => {
                write!(f, "Prediction length mismatch: expected {}, got {}", expected, actual)
            }
            LearnError::ZeroWeightSum => write!(f, "Vote weights sum to zero"),
        }
    }
}

impl std::error::Error for LearnError {}

pub type LearnResult<T> = Result<T, LearnError>;
