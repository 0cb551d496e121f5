//! Classifier wrapper
//!
//! Exactly one forest per process. If the configured artifact exists it is
//! loaded, checked against the live vocabulary and used as-is; otherwise a
//! forest is fitted from the training table on a seeded 80/20 split and the
//! held-out accuracy is logged.

use crate::config::{ForestParams, PredictorConfig};
use crate::data::TrainingTable;
use crate::encoder::{SymptomVector, SymptomVocabulary};
use crate::error::PredictorError;
use crate::forest::{train_test_split, RandomForest};
use crate::model_store::ModelArtifact;
use crate::types::Disease;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Where the live model came from
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    Artifact(PathBuf),
    Trained {
        train_rows: usize,
        test_rows: usize,
        /// None when nothing was held out
        test_accuracy: Option<f64>,
    },
}

#[derive(Debug, Clone)]
pub struct Classifier {
    vocabulary: SymptomVocabulary,
    forest: RandomForest,
    source: ModelSource,
}

impl Classifier {
    /// Load the artifact if present, otherwise train
    pub fn load_or_train(config: &PredictorConfig, training: &TrainingTable) -> Result<Self> {
        let vocabulary = SymptomVocabulary::new(training.symptoms().to_vec());
        let model_path = config.model_path();

        if model_path.exists() {
            tracing::info!("Loading model artifact {:?}", model_path);
            Self::from_artifact(&model_path, vocabulary)
        } else {
            tracing::info!("No model artifact at {:?}, training forest", model_path);
            Self::train(training, &config.forest)
        }
    }

    /// Load an artifact and require it to match `vocabulary` exactly
    pub fn from_artifact(path: &Path, vocabulary: SymptomVocabulary) -> Result<Self> {
        let artifact = ModelArtifact::load(path)?;
        artifact.ensure_compatible(&vocabulary)?;

        Ok(Self {
            vocabulary: artifact.vocabulary,
            forest: artifact.forest,
            source: ModelSource::Artifact(path.to_path_buf()),
        })
    }

    /// Fit on the training split and score the held-out rows
    pub fn train(training: &TrainingTable, params: &ForestParams) -> Result<Self> {
        let (train_idx, test_idx) =
            train_test_split(training.len(), params.test_fraction, params.random_state);

        let pick = |idx: &[usize]| -> (Vec<Vec<u8>>, Vec<String>) {
            idx.iter()
                .map(|&i| (training.rows()[i].clone(), training.labels()[i].clone()))
                .unzip()
        };
        let (x_train, y_train) = pick(&train_idx);
        let (x_test, y_test) = pick(&test_idx);

        let forest = RandomForest::fit(&x_train, &y_train, params)?;
        let test_accuracy = if x_test.is_empty() {
            None
        } else {
            Some(forest.accuracy(&x_test, &y_test)?)
        };

        tracing::info!(
            "Trained forest: {} trees, {} classes, {} train / {} test rows, held-out accuracy {}",
            forest.n_trees(),
            forest.classes().len(),
            x_train.len(),
            x_test.len(),
            test_accuracy.map_or_else(|| "n/a".to_string(), |a| format!("{:.3}", a))
        );

        Ok(Self {
            vocabulary: SymptomVocabulary::new(training.symptoms().to_vec()),
            forest,
            source: ModelSource::Trained {
                train_rows: x_train.len(),
                test_rows: x_test.len(),
                test_accuracy,
            },
        })
    }

    /// Most likely disease for a vector over this classifier's vocabulary
    pub fn predict(&self, vector: &SymptomVector) -> Result<Disease, PredictorError> {
        if vector.len() != self.vocabulary.len() {
            return Err(PredictorError::VectorLength {
                expected: self.vocabulary.len(),
                actual: vector.len(),
            });
        }
        let label = self.forest.predict(vector.as_slice())?;
        tracing::debug!("Predicted '{}' from {} active symptoms", label, vector.active_count());
        Ok(Disease::new(label))
    }

    /// Package the live model for writing to disk
    pub fn to_artifact(&self) -> ModelArtifact {
        ModelArtifact::new(self.vocabulary.clone(), self.forest.clone())
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.vocabulary
    }

    pub fn diseases(&self) -> &[String] {
        self.forest.classes()
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::SymptomEncoder;

    fn training() -> TrainingTable {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for _ in 0..5 {
            rows.push(vec![1, 0, 0]);
            labels.push("Flu".to_string());
            rows.push(vec![0, 1, 1]);
            labels.push("Malaria".to_string());
        }
        TrainingTable::from_rows(
            vec!["fever".into(), "chills".into(), "sweating".into()],
            rows,
            labels,
        )
        .unwrap()
    }

    fn params() -> ForestParams {
        ForestParams { n_estimators: 15, ..ForestParams::default() }
    }

    #[test]
    fn test_train_reports_split() {
        let classifier = Classifier::train(&training(), &params()).unwrap();
        match classifier.source() {
            ModelSource::Trained { train_rows, test_rows, test_accuracy } => {
                assert_eq!((*train_rows, *test_rows), (8, 2));
                assert!(test_accuracy.is_some());
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert_eq!(classifier.diseases(), ["Flu".to_string(), "Malaria".to_string()]);
    }

    #[test]
    fn test_predict_validates_length() {
        let classifier = Classifier::train(&training(), &params()).unwrap();
        let short = SymptomVector::from_values(vec![1, 0]);
        assert_eq!(
            classifier.predict(&short).unwrap_err(),
            PredictorError::VectorLength { expected: 3, actual: 2 }
        );

        let encoder = SymptomEncoder::new(classifier.vocabulary().clone());
        let disease = classifier.predict(&encoder.encode(&["Fever"])).unwrap();
        assert_eq!(disease.as_str(), "Flu");
    }

    #[test]
    fn test_artifact_preferred_and_checked() {
        let dir = tempfile::tempdir().unwrap();
        let config = PredictorConfig {
            forest: params(),
            ..PredictorConfig::with_data_dir(dir.path())
        };
        let table = training();

        let trained = Classifier::load_or_train(&config, &table).unwrap();
        assert!(matches!(trained.source(), ModelSource::Trained { .. }));
        trained.to_artifact().save(&config.model_path()).unwrap();

        let loaded = Classifier::load_or_train(&config, &table).unwrap();
        assert_eq!(loaded.source(), &ModelSource::Artifact(config.model_path()));

        let other_vocab = SymptomVocabulary::new(vec!["fever".into(), "cough".into(), "sweating".into()]);
        let err = Classifier::from_artifact(&config.model_path(), other_vocab).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PredictorError>(),
            Some(PredictorError::IncompatibleModel { .. })
        ));
    }
}
