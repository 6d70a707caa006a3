pub mod error;
pub mod folds;
pub mod normalize;
pub mod search;
pub mod stats;
pub mod vote;

pub use error::{LearnError, LearnResult};
pub use folds::StratifiedFolds;
pub use normalize::{zscore, zscored};
pub use search::{cross_validated_search, Classifier, SearchOutcome};
pub use stats::{accuracy, evaluate, EvalReport};
pub use vote::{majority, weighted};
