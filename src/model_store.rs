//! Serialized classifier artifact
//!
//! The artifact carries the ordered symptom vocabulary the forest was fitted
//! on, so a stale artifact is rejected instead of silently misreading vectors.
//! Writes go through a temp file in the target directory and are persisted
//! with a rename.

use crate::encoder::SymptomVocabulary;
use crate::error::PredictorError;
use crate::forest::RandomForest;
use anyhow::{Context, Result};
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Tag written at the head of every artifact
pub const ARTIFACT_FORMAT: &str = "disease_predictor.forest.v1";

/// Upper bound on decoded size; a corrupt length prefix fails instead of allocating
const MAX_ARTIFACT_BYTES: u64 = 512 * 1024 * 1024;

fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_ARTIFACT_BYTES)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format: String,
    pub vocabulary: SymptomVocabulary,
    pub forest: RandomForest,
}

impl ModelArtifact {
    pub fn new(vocabulary: SymptomVocabulary, forest: RandomForest) -> Self {
        Self {
            format: ARTIFACT_FORMAT.to_string(),
            vocabulary,
            forest,
        }
    }

    /// Atomically write the artifact to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent_dir)
            .with_context(|| format!("Failed to create model directory: {:?}", parent_dir))?;

        let temp_file = NamedTempFile::new_in(parent_dir)
            .with_context(|| format!("Failed to create temp file in {:?}", parent_dir))?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            codec()
                .serialize_into(&mut writer, self)
                .with_context(|| "Failed to serialize model artifact")?;
            writer.flush().with_context(|| "Failed to flush model artifact")?;
        }

        temp_file
            .persist(path)
            .with_context(|| format!("Failed to persist model artifact: {:?}", path))?;

        tracing::info!(
            "Saved model artifact {:?} ({} trees, {} symptoms)",
            path,
            self.forest.n_trees(),
            self.vocabulary.len()
        );
        Ok(())
    }

    /// Read an artifact without checking it against any vocabulary
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open model artifact: {:?}", path))?;
        let artifact: ModelArtifact = codec()
            .deserialize_from(BufReader::new(file))
            .with_context(|| format!("Failed to decode model artifact: {:?}", path))?;

        if artifact.format != ARTIFACT_FORMAT {
            return Err(PredictorError::IncompatibleModel {
                reason: format!(
                    "artifact format '{}', expected '{}'",
                    artifact.format, ARTIFACT_FORMAT
                ),
            }
            .into());
        }
        Ok(artifact)
    }

    /// Reject the artifact unless it was fitted on exactly `live` in the same order
    pub fn ensure_compatible(&self, live: &SymptomVocabulary) -> Result<(), PredictorError> {
        if let Some(reason) = self.vocabulary.mismatch(live) {
            return Err(PredictorError::IncompatibleModel { reason });
        }
        if self.forest.n_features() != live.len() {
            return Err(PredictorError::IncompatibleModel {
                reason: format!(
                    "forest expects {} features, vocabulary has {}",
                    self.forest.n_features(),
                    live.len()
                ),
            });
        }
        Ok(())
    }
}
