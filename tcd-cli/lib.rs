pub mod backend;
pub mod config;
pub mod extract;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod splits;

pub use backend::{hyper_grid, CentroidBackend, CentroidModel, ClassifierKind, HyperParams};
pub use config::{ModelSpec, PipelineConfig, Segmentation, VotingScheme};
pub use model::{model_filename, SavedModel};
pub use pipeline::Pipeline;
pub use splits::{SampleRecord, SampleSet};

use tcd_bsif::BsifError;
use tcd_learn::LearnError;

#[derive(Debug)]
pub enum TcdError {
    Bsif(BsifError),
    Learn(LearnError),
    Io(std::io::Error),
    Json(serde_json::Error),
    TomlDe(toml::de::Error),
    TomlSer(toml::ser::Error),
    ImageLoad { path: String, source: image::ImageError },
    CropOutOfBounds { path: String, width: u32, height: u32 },
    SplitNotFound { path: String },
    FeatureFileNotFound { path: String },
    MissingFeatures { file: String, name: String },
    ModelNotFound { path: String },
    EmptyBatch,
    Config(String),
    Parse { path: String, line: usize, reason: String },
}

impl std::fmt::Display for TcdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TcdError::Bsif(e) => write!(f, "BSIF error: {}", e),
            TcdError::Learn(e) => write!(f, "Model selection error: {}", e),
            TcdError::Io(e) => write!(f, "I/O error: {}", e),
            TcdError::Json(e) => write!(f, "JSON error: {}", e),
            TcdError::TomlDe(e) => write!(f, "Config parse error: {}", e),
            TcdError::TomlSer(e) => write!(f, "Config serialize error: {}", e),
            TcdError::ImageLoad { path, source } => {
                write!(f, "Unable to read image {} for feature extraction: {}", path, source)
            }
            TcdError::CropOutOfBounds { path, width, height } => {
                write!(f, "Image {} is {}x{}, too small for the iris crop", path, width, height)
            }
            TcdError::SplitNotFound { path } => write!(f, "Sample split not found: {}", path),
            TcdError::FeatureFileNotFound { path } => {
                write!(f, "No features found at {}; run extraction first", path)
            }
            TcdError::MissingFeatures { file, name } => {
                write!(f, "Features for {} not present in {}", name, file)
            }
            TcdError::ModelNotFound { path } => write!(f, "Model \"{}\" not found", path),
            TcdError::EmptyBatch => write!(f, "Every image in the batch failed to extract"),
            TcdError::Config(reason) => write!(f, "Invalid configuration: {}", reason),
            TcdError::Parse { path, line, reason } => {
                write!(f, "Malformed record in {} at line {}: {}", path, line, reason)
            }
        }
    }
}

impl std::error::Error for TcdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TcdError::Bsif(e) => Some(e),
            TcdError::Learn(e) => Some(e),
            TcdError::Io(e) => Some(e),
            TcdError::Json(e) => Some(e),
            TcdError::TomlDe(e) => Some(e),
            TcdError::TomlSer(e) => Some(e),
            TcdError::ImageLoad { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<BsifError> for TcdError {
    fn from(err: BsifError) -> Self {
        TcdError::Bsif(err)
    }
}

impl From<LearnError> for TcdError {
    fn from(err: LearnError) -> Self {
        TcdError::Learn(err)
    }
}

impl From<std::io::Error> for TcdError {
    fn from(err: std::io::Error) -> Self {
        TcdError::Io(err)
    }
}

impl From<serde_json::Error> for TcdError {
    fn from(err: serde_json::Error) -> Self {
        TcdError::Json(err)
    }
}

impl From<toml::de::Error> for TcdError {
    fn from(err: toml::de::Error) -> Self {
        TcdError::TomlDe(err)
    }
}

impl From<toml::ser::Error> for TcdError {
    fn from(err: toml::ser::Error) -> Self {
        TcdError::TomlSer(err)
    }
}

pub type TcdResult<T> = Result<T, TcdError>;
