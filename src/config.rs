//! Predictor configuration
//!
//! Fixed relative file names resolved against a data directory, plus the
//! random forest parameters. Loaded from an optional JSON file; any field
//! left out keeps its default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TRAINING_FILE: &str = "Filtered_Training.csv";
pub const DEFAULT_DESCRIPTION_FILE: &str = "description.csv";
pub const DEFAULT_PRECAUTIONS_FILE: &str = "precautions_df.csv";
pub const DEFAULT_DIET_FILE: &str = "diets.csv";
pub const DEFAULT_MEDICATIONS_FILE: &str = "medications.csv";
pub const DEFAULT_MODEL_FILE: &str = "medicine.bin";
pub const DEFAULT_LABEL_COLUMN: &str = "prognosis";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Directory the file names below are relative to
    pub data_dir: PathBuf,
    pub training_file: String,
    pub description_file: String,
    pub precautions_file: String,
    pub diet_file: String,
    pub medications_file: String,
    /// Optional serialized classifier; used instead of training when present
    pub model_file: String,
    /// Training table column holding the disease label
    pub label_column: String,
    pub forest: ForestParams,
}

/// Random forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub random_state: u64,
    /// Share of rows held out for evaluation
    pub test_fraction: f64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            random_state: 42,
            test_fraction: 0.2,
        }
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            training_file: DEFAULT_TRAINING_FILE.to_string(),
            description_file: DEFAULT_DESCRIPTION_FILE.to_string(),
            precautions_file: DEFAULT_PRECAUTIONS_FILE.to_string(),
            diet_file: DEFAULT_DIET_FILE.to_string(),
            medications_file: DEFAULT_MEDICATIONS_FILE.to_string(),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            forest: ForestParams::default(),
        }
    }
}

impl PredictorConfig {
    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: PredictorConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.forest.n_estimators == 0 {
            anyhow::bail!("forest.n_estimators must be at least 1");
        }
        if !(0.0..1.0).contains(&self.forest.test_fraction) {
            anyhow::bail!(
                "forest.test_fraction must be in [0, 1), got {}",
                self.forest.test_fraction
            );
        }
        if self.label_column.trim().is_empty() {
            anyhow::bail!("label_column must not be empty");
        }
        Ok(())
    }

    pub fn training_path(&self) -> PathBuf {
        self.data_dir.join(&self.training_file)
    }

    pub fn description_path(&self) -> PathBuf {
        self.data_dir.join(&self.description_file)
    }

    pub fn precautions_path(&self) -> PathBuf {
        self.data_dir.join(&self.precautions_file)
    }

    pub fn diet_path(&self) -> PathBuf {
        self.data_dir.join(&self.diet_file)
    }

    pub fn medications_path(&self) -> PathBuf {
        self.data_dir.join(&self.medications_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.data_dir.join(&self.model_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_fixed_file_names() {
        let config = PredictorConfig::with_data_dir("data");
        assert_eq!(config.training_path(), Path::new("data/Filtered_Training.csv"));
        assert_eq!(config.model_path(), Path::new("data/medicine.bin"));
        assert_eq!(config.forest, ForestParams::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "data_dir": "/srv/dx", "forest": {{ "n_estimators": 10 }} }}"#).unwrap();

        let config = PredictorConfig::load(file.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/dx"));
        assert_eq!(config.forest.n_estimators, 10);
        assert_eq!(config.forest.random_state, 42);
        assert_eq!(config.label_column, "prognosis");
    }

    #[test]
    fn test_rejects_bad_forest_params() {
        let mut config = PredictorConfig::default();
        config.forest.test_fraction = 1.0;
        assert!(config.validate().is_err());

        config.forest.test_fraction = 0.2;
        config.forest.n_estimators = 0;
        assert!(config.validate().is_err());
    }
}
