use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backend::{CentroidModel, ClassifierKind, HyperParams};
use crate::config::Segmentation;
use crate::{TcdError, TcdResult};

/// File name a trained model is stored under, unique per descriptor,
/// classifier family and segmentation mode.
pub fn model_filename(
    bit_depth: usize,
    kernel_size: usize,
    kind: ClassifierKind,
    segmentation: Segmentation,
) -> String {
    format!("BSIF-{}-{}-{}-{}.json", bit_depth, kernel_size, kind, segmentation)
}

/// A trained model plus everything needed to reuse and report it later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedModel {
    pub kind: ClassifierKind,
    pub kernel_size: usize,
    pub bit_depth: usize,
    pub params: HyperParams,
    /// Mean fold accuracy of the winning grid point, percent
    pub mean_cv_accuracy: f32,
    /// Held-out accuracy, measured only when weighted voting needs it
    pub validation_accuracy: Option<f32>,
    pub model: CentroidModel,
}

impl SavedModel {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> TcdResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> TcdResult<Self> {
        let display = path.as_ref().display().to_string();
        let json = std::fs::read_to_string(&path)
            .map_err(|_| TcdError::ModelNotFound { path: display })?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_encode_the_full_configuration() {
        assert_eq!(
            model_filename(8, 9, ClassifierKind::Rf, Segmentation::WholeImage),
            "BSIF-8-9-rf-wi.json"
        );
        assert_eq!(
            model_filename(12, 3, ClassifierKind::Svm, Segmentation::BestGuess),
            "BSIF-12-3-svm-bg.json"
        );
    }

    #[test]
    fn save_and_load_round_trip() {
        let saved = SavedModel {
            kind: ClassifierKind::Rf,
            kernel_size: 9,
            bit_depth: 8,
            params: HyperParams::Forest { max_depth: 10, min_sample_fraction: 1.5 },
            mean_cv_accuracy: 93.75,
            validation_accuracy: Some(90.0),
            model: CentroidModel {
                clear: Some(vec![0.5, -0.5]),
                textured: Some(vec![-0.25, 0.25]),
            },
        };
        let path = std::env::temp_dir()
            .join(format!("tcd-model-{}.json", std::process::id()));
        saved.save(&path).unwrap();
        let loaded = SavedModel::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.kind, ClassifierKind::Rf);
        assert_eq!(loaded.params, saved.params);
        assert_eq!(loaded.mean_cv_accuracy, 93.75);
        assert_eq!(loaded.model.clear, saved.model.clear);
    }

    #[test]
    fn missing_model_file_is_its_own_error() {
        let err = SavedModel::load("/nonexistent/BSIF-8-9-rf-wi.json").unwrap_err();
        assert!(matches!(err, TcdError::ModelNotFound { .. }));
    }
}
