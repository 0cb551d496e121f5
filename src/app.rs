//! Application context
//!
//! Everything loaded once at startup: the symptom encoder, the single
//! classifier instance and the four reference tables. Read-only after
//! construction; sessions borrow it.

use crate::aggregator::InfoAggregator;
use crate::classifier::Classifier;
use crate::config::PredictorConfig;
use crate::data::{ReferenceTables, TrainingTable};
use crate::encoder::{SymptomEncoder, SymptomVocabulary};
use crate::session::Session;
use crate::types::{Disease, InfoBundle};
use anyhow::{Context, Result};

pub struct AppContext {
    config: PredictorConfig,
    encoder: SymptomEncoder,
    classifier: Classifier,
    references: ReferenceTables,
}

impl AppContext {
    /// Load tables and obtain the classifier (artifact or freshly trained)
    pub fn load(config: PredictorConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!("Loading predictor data from {:?}", config.data_dir);

        let training = TrainingTable::load(&config.training_path(), &config.label_column)
            .with_context(|| "Failed to load training table")?;
        let references =
            ReferenceTables::load(&config).with_context(|| "Failed to load reference tables")?;
        let classifier = Classifier::load_or_train(&config, &training)?;

        Ok(Self::from_parts(config, classifier, references))
    }

    /// Assemble from already-built parts
    pub fn from_parts(config: PredictorConfig, classifier: Classifier, references: ReferenceTables) -> Self {
        let encoder = SymptomEncoder::new(classifier.vocabulary().clone());

        tracing::info!(
            "Predictor ready: {} symptoms, {} diseases, source {:?}",
            encoder.vocabulary().len(),
            classifier.diseases().len(),
            classifier.source()
        );

        Self {
            config,
            encoder,
            classifier,
            references,
        }
    }

    /// Fresh session with no prediction yet
    pub fn session(&self) -> Session<'_> {
        Session::new(self)
    }

    /// Reference info for any disease, no prediction needed
    pub fn info(&self, disease: &Disease) -> InfoBundle {
        InfoAggregator::new(&self.references).lookup(disease)
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary {
        self.encoder.vocabulary()
    }

    pub fn encoder(&self) -> &SymptomEncoder {
        &self.encoder
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn references(&self) -> &ReferenceTables {
        &self.references
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }
}
