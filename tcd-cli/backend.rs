use serde::{Deserialize, Serialize};
use tcd_core::{FeatureVector, Label, LABEL_CLEAR, LABEL_TEXTURED};
use tcd_learn::Classifier;

/// Classifier family attached to one descriptor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    Svm,
    Rf,
    Mlp,
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierKind::Svm => write!(f, "svm"),
            ClassifierKind::Rf => write!(f, "rf"),
            ClassifierKind::Mlp => write!(f, "mlp"),
        }
    }
}

impl std::str::FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "svm" => Ok(ClassifierKind::Svm),
            "rf" => Ok(ClassifierKind::Rf),
            "mlp" => Ok(ClassifierKind::Mlp),
            other => Err(format!("unknown classifier kind \"{}\"", other)),
        }
    }
}

/// One point of a classifier's hyperparameter grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum HyperParams {
    Svm { c: f32, gamma: f32 },
    Forest { max_depth: usize, min_sample_fraction: f32 },
    Mlp { hidden_multiplier: usize },
}

impl std::fmt::Display for HyperParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HyperParams::Svm { c, gamma } => write!(f, "C={} gamma={}", c, gamma),
            HyperParams::Forest { max_depth, min_sample_fraction } => {
                write!(f, "depth={} min_fraction={}", max_depth, min_sample_fraction)
            }
            HyperParams::Mlp { hidden_multiplier } => {
                write!(f, "hidden_multiplier={}", hidden_multiplier)
            }
        }
    }
}

/// Full hyperparameter grid searched for a classifier family.
pub fn hyper_grid(kind: ClassifierKind) -> Vec<HyperParams> {
    match kind {
        ClassifierKind::Svm => {
            let mut grid = Vec::new();
            for &c in &[0.1f32, 1.0, 10.0, 100.0] {
                for &gamma in &[0.01f32, 0.1, 1.0] {
                    grid.push(HyperParams::Svm { c, gamma });
                }
            }
            grid
        }
        ClassifierKind::Rf => {
            let mut grid = Vec::new();
            for &max_depth in &[1usize, 5, 10, 15, 20, 25] {
                for &min_sample_fraction in &[1.0f32, 1.5, 2.0, 2.5] {
                    grid.push(HyperParams::Forest { max_depth, min_sample_fraction });
                }
            }
            grid
        }
        ClassifierKind::Mlp => [1usize, 2, 4]
            .iter()
            .map(|&hidden_multiplier| HyperParams::Mlp { hidden_multiplier })
            .collect(),
    }
}

/// Class centroids in z-scored feature space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CentroidModel {
    pub clear: Option<FeatureVector>,
    pub textured: Option<FeatureVector>,
}

impl CentroidModel {
    fn classify(&self, sample: &[f32]) -> Label {
        let to_clear = self.clear.as_ref().map(|c| squared_distance(sample, c));
        let to_textured = self.textured.as_ref().map(|c| squared_distance(sample, c));
        match (to_clear, to_textured) {
            (Some(a), Some(b)) if b < a => LABEL_TEXTURED,
            (Some(_), _) => LABEL_CLEAR,
            (None, Some(_)) => LABEL_TEXTURED,
            (None, None) => LABEL_CLEAR,
        }
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = (x - y) as f64;
            d * d
        })
        .sum()
}

fn centroid(rows: &[&FeatureVector]) -> Option<FeatureVector> {
    let first = rows.first()?;
    let mut acc = vec![0.0f64; first.len()];
    for row in rows {
        for (slot, &value) in acc.iter_mut().zip(row.iter()) {
            *slot += value as f64;
        }
    }
    let n = rows.len() as f64;
    Some(acc.into_iter().map(|v| (v / n) as f32).collect())
}

/// Nearest-centroid backend behind the selection loop.
///
/// Ties in distance resolve to the clear class. The hyperparameter grid is
/// still walked so the selection machinery stays exercised end to end.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidBackend;

impl Classifier for CentroidBackend {
    type Params = HyperParams;
    type Model = CentroidModel;

    fn train(
        &self,
        features: &[FeatureVector],
        labels: &[Label],
        _params: &Self::Params,
    ) -> Self::Model {
        let clear: Vec<&FeatureVector> = features
            .iter()
            .zip(labels.iter())
            .filter(|(_, &l)| l == LABEL_CLEAR)
            .map(|(f, _)| f)
            .collect();
        let textured: Vec<&FeatureVector> = features
            .iter()
            .zip(labels.iter())
            .filter(|(_, &l)| l == LABEL_TEXTURED)
            .map(|(f, _)| f)
            .collect();
        CentroidModel { clear: centroid(&clear), textured: centroid(&textured) }
    }

    fn predict(&self, model: &Self::Model, features: &[FeatureVector]) -> Vec<Label> {
        features.iter().map(|sample| model.classify(sample)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grids_have_the_expected_shapes() {
        assert_eq!(hyper_grid(ClassifierKind::Svm).len(), 12);
        assert_eq!(hyper_grid(ClassifierKind::Rf).len(), 24);
        assert_eq!(hyper_grid(ClassifierKind::Mlp).len(), 3);
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in [ClassifierKind::Svm, ClassifierKind::Rf, ClassifierKind::Mlp] {
            let parsed: ClassifierKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("boost".parse::<ClassifierKind>().is_err());
    }

    #[test]
    fn centroids_separate_the_classes() {
        let backend = CentroidBackend;
        let features = vec![
            vec![0.0, 0.0],
            vec![0.2, -0.1],
            vec![1.0, 1.0],
            vec![0.9, 1.1],
        ];
        let labels = vec![0, 0, 1, 1];
        let params = HyperParams::Forest { max_depth: 5, min_sample_fraction: 1.0 };
        let model = backend.train(&features, &labels, &params);

        let predictions =
            backend.predict(&model, &[vec![0.1, 0.0], vec![1.05, 0.95]]);
        assert_eq!(predictions, vec![0, 1]);
    }

    #[test]
    fn single_class_training_predicts_that_class() {
        let backend = CentroidBackend;
        let features = vec![vec![1.0, 1.0], vec![1.1, 0.9]];
        let labels = vec![1, 1];
        let params = HyperParams::Mlp { hidden_multiplier: 1 };
        let model = backend.train(&features, &labels, &params);
        assert!(model.clear.is_none());
        assert_eq!(backend.predict(&model, &[vec![5.0, 5.0]]), vec![1]);
    }

    #[test]
    fn equidistant_sample_resolves_to_clear() {
        let model = CentroidModel {
            clear: Some(vec![-1.0, 0.0]),
            textured: Some(vec![1.0, 0.0]),
        };
        assert_eq!(model.classify(&[0.0, 0.0]), 0);
    }

    #[test]
    fn params_serialize_with_a_family_tag() {
        let params = HyperParams::Svm { c: 10.0, gamma: 0.1 };
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"family\":\"svm\""));
        let back: HyperParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
