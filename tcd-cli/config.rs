use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tcd_bsif::{KERNEL_SIZES, MAX_BIT_DEPTH, MIN_BIT_DEPTH};

use crate::backend::ClassifierKind;
use crate::{TcdError, TcdResult};

/// How per-model predictions are combined at test time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingScheme {
    /// Report each model separately
    None,
    /// Unweighted majority with a random tie-break
    Majority,
    /// Votes weighted by held-out validation accuracy
    Weighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segmentation {
    /// Whole image
    #[serde(rename = "wi")]
    WholeImage,
    /// Fixed iris region crop
    #[serde(rename = "bg")]
    BestGuess,
}

impl std::fmt::Display for Segmentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segmentation::WholeImage => write!(f, "wi"),
            Segmentation::BestGuess => write!(f, "bg"),
        }
    }
}

/// One descriptor/classifier pairing to extract, train and test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Requested BSIF kernel size; even sizes are served by filtering a
    /// half-resolution image at half the size
    pub kernel_size: usize,
    pub bit_depth: usize,
    pub kind: ClassifierKind,
}

impl ModelSpec {
    /// Kernel size actually looked up in the filter bank, and whether the
    /// image must be decimated first.
    pub fn effective_kernel(&self) -> (usize, bool) {
        if self.kernel_size % 2 == 0 {
            (self.kernel_size / 2, true)
        } else {
            (self.kernel_size, false)
        }
    }
}

/// Complete immutable pipeline configuration.
///
/// Loaded once from a TOML file and passed by reference into every phase;
/// the components never consult global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Phase switches
    #[serde(default)]
    pub extract_features: bool,
    #[serde(default)]
    pub train_models: bool,
    #[serde(default)]
    pub test_images: bool,
    /// Testing split carries ground-truth labels
    #[serde(default)]
    pub test_set_has_labels: bool,
    #[serde(default = "default_voting")]
    pub voting: VotingScheme,
    #[serde(default = "default_segmentation")]
    pub segmentation: Segmentation,
    pub models: Vec<ModelSpec>,

    /// Inputs
    #[serde(default)]
    pub image_dir: PathBuf,
    #[serde(default)]
    pub split_dir: PathBuf,
    #[serde(default)]
    pub training_set: String,
    #[serde(default)]
    pub testing_set: String,
    /// Held-out split used to measure per-model weights for weighted voting
    #[serde(default)]
    pub validation_set: String,
    #[serde(default)]
    pub filter_pack: PathBuf,

    /// Outputs
    #[serde(default)]
    pub feature_dir: PathBuf,
    #[serde(default = "default_feature_base")]
    pub feature_base: String,
    #[serde(default)]
    pub model_dir: PathBuf,
    #[serde(default = "default_classification_file")]
    pub classification_file: PathBuf,

    /// Tuning
    #[serde(default = "default_fold_count")]
    pub fold_count: usize,
    #[serde(default = "default_threads")]
    pub n_threads: usize,
}

fn default_voting() -> VotingScheme {
    VotingScheme::None
}

fn default_segmentation() -> Segmentation {
    Segmentation::WholeImage
}

fn default_feature_base() -> String {
    "features".to_string()
}

fn default_classification_file() -> PathBuf {
    PathBuf::from("classifications.csv")
}

fn default_fold_count() -> usize {
    10
}

fn default_threads() -> usize {
    num_cpus::get().max(1)
}

impl PipelineConfig {
    pub fn load_toml<P: AsRef<Path>>(path: P) -> TcdResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> TcdResult<()> {
        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> TcdResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> TcdResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> TcdResult<()> {
        if !(self.extract_features || self.train_models || self.test_images) {
            return Err(TcdError::Config("no phase enabled".to_string()));
        }
        if self.models.is_empty() {
            return Err(TcdError::Config("no models configured".to_string()));
        }
        for spec in &self.models {
            let (size, _) = spec.effective_kernel();
            if !KERNEL_SIZES.contains(&size) {
                return Err(TcdError::Config(format!(
                    "kernel size {} has no filter bank entry",
                    spec.kernel_size
                )));
            }
            if spec.bit_depth < MIN_BIT_DEPTH || spec.bit_depth > MAX_BIT_DEPTH {
                return Err(TcdError::Config(format!(
                    "bit depth {} outside supported range {}..={}",
                    spec.bit_depth, MIN_BIT_DEPTH, MAX_BIT_DEPTH
                )));
            }
        }
        if (self.train_models || self.extract_features) && self.training_set.is_empty() {
            return Err(TcdError::Config(
                "please specify a list of images for training (training_set)".to_string(),
            ));
        }
        if self.test_images && self.testing_set.is_empty() {
            return Err(TcdError::Config(
                "please specify a list of images for testing (testing_set)".to_string(),
            ));
        }
        if self.train_models && self.fold_count < 2 {
            return Err(TcdError::Config("fold_count must be at least 2".to_string()));
        }
        if self.voting == VotingScheme::Weighted && self.validation_set.is_empty() {
            return Err(TcdError::Config(
                "weighted voting needs a validation_set to measure model weights".to_string(),
            ));
        }
        Ok(())
    }

    pub fn split_path(&self, filename: &str) -> PathBuf {
        self.split_dir.join(filename)
    }

    /// Human-readable configuration banner
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("=============\n");
        out.push_str("Configuration\n");
        out.push_str("=============\n");
        out.push_str("- Process:");
        if self.extract_features {
            out.push_str(" | Extract features |");
        }
        if self.train_models {
            out.push_str(" | Train models |");
        }
        if self.test_images {
            out.push_str(" | Test images |");
        }
        out.push('\n');
        if self.extract_features {
            out.push_str(&format!(
                "- Features will be stored in: {}\n",
                self.feature_dir.display()
            ));
        }
        if self.train_models {
            out.push_str(&format!(
                "- Training set: {}\n",
                self.split_path(&self.training_set).display()
            ));
        }
        if self.test_images {
            match self.voting {
                VotingScheme::Majority => {
                    out.push_str("- Majority voting will combine model results\n");
                    out.push_str("- In the case of a tie, a random decision will be made\n");
                }
                VotingScheme::Weighted => {
                    out.push_str("- Accuracy-weighted voting will combine model results\n");
                }
                VotingScheme::None => {
                    out.push_str("- Models will be tested separately\n");
                }
            }
            out.push_str(&format!(
                "- Testing set: {}\n",
                self.split_path(&self.testing_set).display()
            ));
        }
        out.push_str(&format!("- Segmentation: {}\n", self.segmentation));
        out.push_str("- Models:\n");
        for spec in &self.models {
            out.push_str(&format!(
                "   BSIF {}x{} at {} bits | {}\n",
                spec.kernel_size, spec.kernel_size, spec.bit_depth, spec.kind
            ));
        }
        out.push_str("=============");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> PipelineConfig {
        PipelineConfig {
            extract_features: true,
            train_models: true,
            test_images: true,
            test_set_has_labels: true,
            voting: VotingScheme::Majority,
            segmentation: Segmentation::WholeImage,
            models: vec![ModelSpec {
                kernel_size: 9,
                bit_depth: 8,
                kind: ClassifierKind::Rf,
            }],
            image_dir: PathBuf::from("images"),
            split_dir: PathBuf::from("splits"),
            training_set: "train.csv".to_string(),
            testing_set: "test.csv".to_string(),
            validation_set: String::new(),
            filter_pack: PathBuf::from("filters.bin"),
            feature_dir: PathBuf::from("features"),
            feature_base: "features".to_string(),
            model_dir: PathBuf::from("models"),
            classification_file: PathBuf::from("classifications.csv"),
            fold_count: 10,
            n_threads: 1,
        }
    }

    #[test]
    fn toml_round_trip_preserves_the_configuration() {
        let config = base_config();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: PipelineConfig = toml::from_str(&toml).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.models.len(), 1);
        assert_eq!(parsed.voting, VotingScheme::Majority);
        assert_eq!(parsed.segmentation, Segmentation::WholeImage);
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let toml = r#"
            extract_features = true
            training_set = "train.csv"

            [[models]]
            kernel_size = 3
            bit_depth = 5
            kind = "svm"
        "#;
        let parsed: PipelineConfig = toml::from_str(toml).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.fold_count, 10);
        assert_eq!(parsed.voting, VotingScheme::None);
        assert_eq!(parsed.feature_base, "features");
    }

    #[test]
    fn even_kernel_sizes_map_to_half_resolution() {
        let spec = ModelSpec { kernel_size: 6, bit_depth: 8, kind: ClassifierKind::Svm };
        assert_eq!(spec.effective_kernel(), (3, true));
        let spec = ModelSpec { kernel_size: 17, bit_depth: 8, kind: ClassifierKind::Svm };
        assert_eq!(spec.effective_kernel(), (17, false));
    }

    #[test]
    fn validation_rejects_inconsistent_configs() {
        let mut config = base_config();
        config.models.clear();
        assert!(matches!(config.validate(), Err(TcdError::Config(_))));

        let mut config = base_config();
        config.models[0].kernel_size = 21;
        assert!(matches!(config.validate(), Err(TcdError::Config(_))));

        let mut config = base_config();
        config.training_set.clear();
        assert!(matches!(config.validate(), Err(TcdError::Config(_))));

        let mut config = base_config();
        config.voting = VotingScheme::Weighted;
        assert!(matches!(config.validate(), Err(TcdError::Config(_))));
    }
}
