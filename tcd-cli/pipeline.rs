use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use rand::thread_rng;
use tcd_bsif::FilterBank;
use tcd_core::Label;
use tcd_learn::{accuracy, cross_validated_search, evaluate, majority, weighted, Classifier};

use crate::backend::{hyper_grid, CentroidBackend};
use crate::config::{ModelSpec, PipelineConfig, VotingScheme};
use crate::extract::Extractor;
use crate::features::{feature_filename, load_features, write_features};
use crate::model::{model_filename, SavedModel};
use crate::splits::SampleSet;
use crate::{TcdError, TcdResult};

/// End-to-end detection pipeline: extraction, model selection and testing,
/// each phase gated by the configuration.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> TcdResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn run(&self) -> TcdResult<()> {
        println!("{}", self.config.summary());

        if self.config.extract_features {
            self.run_extraction()?;
        }
        if self.config.train_models {
            self.run_training()?;
        }
        if self.config.test_images {
            self.run_testing()?;
        }
        Ok(())
    }

    fn feature_path(&self, spec: &ModelSpec) -> PathBuf {
        self.config.feature_dir.join(feature_filename(
            &self.config.feature_base,
            spec.kernel_size,
            spec.bit_depth,
        ))
    }

    fn model_path(&self, spec: &ModelSpec) -> PathBuf {
        self.config.model_dir.join(model_filename(
            spec.bit_depth,
            spec.kernel_size,
            spec.kind,
            self.config.segmentation,
        ))
    }

    /// Every filename any enabled phase will ask features for, deduplicated
    /// with first occurrence kept.
    fn all_filenames(&self) -> TcdResult<Vec<String>> {
        let mut names = Vec::new();
        if !self.config.training_set.is_empty() {
            let set = SampleSet::load(self.config.split_path(&self.config.training_set), true)?;
            names.extend(set.filenames());
        }
        if !self.config.validation_set.is_empty() {
            let set = SampleSet::load(self.config.split_path(&self.config.validation_set), true)?;
            names.extend(set.filenames());
        }
        if !self.config.testing_set.is_empty() {
            let set = SampleSet::load(
                self.config.split_path(&self.config.testing_set),
                self.config.test_set_has_labels,
            )?;
            names.extend(set.filenames());
        }
        let mut seen = HashSet::new();
        names.retain(|name| seen.insert(name.clone()));
        Ok(names)
    }

    fn run_extraction(&self) -> TcdResult<()> {
        println!("Extracting features...");
        let bank = FilterBank::load(&self.config.filter_pack)?;
        std::fs::create_dir_all(&self.config.feature_dir)?;
        let filenames = self.all_filenames()?;

        let extractor =
            Extractor::new(&bank, &self.config.image_dir, self.config.segmentation);
        for spec in &self.config.models {
            println!(
                "  BSIF {}x{} at {} bits over {} images",
                spec.kernel_size,
                spec.kernel_size,
                spec.bit_depth,
                filenames.len()
            );
            let rows = extractor.extract_batch(spec, &filenames)?;
            write_features(&self.feature_path(spec), &rows)?;
        }
        Ok(())
    }

    fn run_training(&self) -> TcdResult<()> {
        println!("Training models...");
        std::fs::create_dir_all(&self.config.model_dir)?;
        let training =
            SampleSet::load(self.config.split_path(&self.config.training_set), true)?;
        let labels = training.labels();
        let validation = if self.config.voting == VotingScheme::Weighted {
            Some(SampleSet::load(
                self.config.split_path(&self.config.validation_set),
                true,
            )?)
        } else {
            None
        };

        let backend = CentroidBackend;
        let mut rng = thread_rng();
        for spec in &self.config.models {
            let features =
                load_features(&self.feature_path(spec), &training, spec.bit_depth)?;
            let grid = hyper_grid(spec.kind);
            let outcome = cross_validated_search(
                &backend,
                &features,
                &labels,
                &grid,
                self.config.fold_count,
                &mut rng,
            )?;
            println!(
                "  BSIF {}x{} at {} bits | {} | {} | mean CV accuracy {:.2}",
                spec.kernel_size,
                spec.kernel_size,
                spec.bit_depth,
                spec.kind,
                outcome.params,
                outcome.mean_accuracy
            );

            let validation_accuracy = match &validation {
                Some(set) => {
                    let held = load_features(&self.feature_path(spec), set, spec.bit_depth)?;
                    let predictions = backend.predict(&outcome.model, &held);
                    Some(accuracy(&predictions, &set.labels()))
                }
                None => None,
            };

            let saved = SavedModel {
                kind: spec.kind,
                kernel_size: spec.kernel_size,
                bit_depth: spec.bit_depth,
                params: outcome.params,
                mean_cv_accuracy: outcome.mean_accuracy,
                validation_accuracy,
                model: outcome.model,
            };
            saved.save(self.model_path(spec))?;
        }
        Ok(())
    }

    fn run_testing(&self) -> TcdResult<()> {
        println!("Testing images...");
        let testing = SampleSet::load(
            self.config.split_path(&self.config.testing_set),
            self.config.test_set_has_labels,
        )?;

        // Models that fail to load are reported and dropped from the
        // ensemble rather than aborting the run.
        let backend = CentroidBackend;
        let mut loaded: Vec<(&ModelSpec, SavedModel, Vec<Label>)> = Vec::new();
        for spec in &self.config.models {
            let path = self.model_path(spec);
            match SavedModel::load(&path) {
                Ok(saved) => {
                    let features =
                        load_features(&self.feature_path(spec), &testing, spec.bit_depth)?;
                    let predictions = backend.predict(&saved.model, &features);
                    loaded.push((spec, saved, predictions));
                }
                Err(err) => eprintln!("{}", err),
            }
        }
        if loaded.is_empty() {
            return Err(TcdError::Learn(tcd_learn::LearnError::EmptyEnsemble));
        }

        let votes: Vec<Vec<Label>> = loaded.iter().map(|(_, _, p)| p.clone()).collect();
        let out = std::fs::File::create(&self.config.classification_file)?;
        let mut out = std::io::BufWriter::new(out);

        match self.config.voting {
            VotingScheme::None => {
                for (spec, _, predictions) in &loaded {
                    writeln!(
                        out,
                        "{}",
                        model_filename(
                            spec.bit_depth,
                            spec.kernel_size,
                            spec.kind,
                            self.config.segmentation
                        )
                    )?;
                    write_predictions(&mut out, &testing, predictions)?;
                    writeln!(out, "------------------")?;
                    if self.config.test_set_has_labels {
                        let report = evaluate(predictions, &testing.labels())?;
                        println!(
                            "  BSIF {}x{} at {} bits | {} | {}",
                            spec.kernel_size, spec.kernel_size, spec.bit_depth, spec.kind, report
                        );
                    }
                }
            }
            VotingScheme::Majority => {
                let mut rng = thread_rng();
                let combined = majority(&votes, &mut rng)?;
                write_predictions(&mut out, &testing, &combined)?;
                if self.config.test_set_has_labels {
                    let report = evaluate(&combined, &testing.labels())?;
                    println!("  Majority vote | {}", report);
                }
            }
            VotingScheme::Weighted => {
                let weights: Vec<f32> = loaded
                    .iter()
                    .map(|(_, saved, _)| {
                        saved.validation_accuracy.unwrap_or(saved.mean_cv_accuracy)
                    })
                    .collect();
                let combined = weighted(&votes, &weights)?;
                write_predictions(&mut out, &testing, &combined)?;
                if self.config.test_set_has_labels {
                    let report = evaluate(&combined, &testing.labels())?;
                    println!("  Weighted vote | {}", report);
                }
            }
        }
        out.flush()?;
        Ok(())
    }
}

fn write_predictions(
    out: &mut impl Write,
    testing: &SampleSet,
    predictions: &[Label],
) -> TcdResult<()> {
    for (record, &label) in testing.records().iter().zip(predictions) {
        writeln!(out, "{},{}", record.filename, label)?;
    }
    Ok(())
}
