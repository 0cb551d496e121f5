//! Data Loading and Management
//!
//! Loads the training table and the four disease reference tables with Polars,
//! then copies them into plain typed structures. Everything here is built once
//! at startup and only read afterwards.

use crate::config::PredictorConfig;
use crate::utils::{is_index_header, keys_match, normalize_key};
use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashMap;
use std::path::Path;

/// Read a CSV with a header row
fn read_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to load CSV: {:?}", path))
}

/// Column names in file order
fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Column as owned strings, nulls kept as `None`
fn string_cells(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let casted = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as text", name))?;
    let values = casted
        .str()
        .with_context(|| format!("Column '{}' is not string type", name))?;

    Ok(values
        .into_iter()
        .map(|opt| opt.map(|s| s.to_string()))
        .collect())
}

// ============================================================================
// Training table
// ============================================================================

/// Symptom presence matrix plus disease labels
///
/// Column order of `symptoms` is the vocabulary order the classifier is fitted
/// against.
#[derive(Debug, Clone)]
pub struct TrainingTable {
    symptoms: Vec<String>,
    rows: Vec<Vec<u8>>,
    labels: Vec<String>,
}

impl TrainingTable {
    /// Build from in-memory rows, checking every row matches the symptom count
    pub fn from_rows(symptoms: Vec<String>, rows: Vec<Vec<u8>>, labels: Vec<String>) -> Result<Self> {
        if rows.len() != labels.len() {
            anyhow::bail!(
                "Training table has {} rows but {} labels",
                rows.len(),
                labels.len()
            );
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != symptoms.len() {
                anyhow::bail!(
                    "Training row {} has {} values, expected {}",
                    idx,
                    row.len(),
                    symptoms.len()
                );
            }
            if let Some(v) = row.iter().find(|&&v| v > 1) {
                anyhow::bail!("Training row {} holds non-binary value {}", idx, v);
            }
        }

        Ok(Self { symptoms, rows, labels })
    }

    /// Load training CSV: every column except `label_col` is a 0/1 symptom flag
    pub fn load(path: &Path, label_col: &str) -> Result<Self> {
        let df = read_csv(path)?;

        let names = column_names(&df);
        if !names.iter().any(|n| n == label_col) {
            anyhow::bail!("Label column '{}' not found in {:?}", label_col, path);
        }

        let symptoms: Vec<String> = names
            .into_iter()
            .filter(|n| n != label_col && !is_index_header(n))
            .collect();

        let height = df.height();
        let mut rows = vec![vec![0u8; symptoms.len()]; height];

        for (j, name) in symptoms.iter().enumerate() {
            let casted = df
                .column(name)
                .with_context(|| format!("Column '{}' not found", name))?
                .cast(&DataType::Int64)
                .with_context(|| format!("Symptom column '{}' is not numeric", name))?;
            let values = casted
                .i64()
                .with_context(|| format!("Symptom column '{}' is not integer type", name))?;

            for (i, value) in values.into_iter().enumerate() {
                rows[i][j] = match value {
                    Some(0) => 0,
                    Some(1) => 1,
                    Some(other) => anyhow::bail!(
                        "Symptom column '{}' row {} holds non-binary value {}",
                        name, i, other
                    ),
                    None => anyhow::bail!("Symptom column '{}' row {} is empty", name, i),
                };
            }
        }

        let labels = string_cells(&df, label_col)?
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                label
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .with_context(|| format!("Label missing in row {}", i))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            "Training table {:?}: {} rows, {} symptoms",
            path,
            height,
            symptoms.len()
        );

        Self::from_rows(symptoms, rows, labels)
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Reference tables
// ============================================================================

/// One row of a reference table
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRow {
    /// Key as spelled in the file
    pub key: String,
    /// Value cells in column order; `None` for empty cells
    pub values: Vec<Option<String>>,
}

/// Disease-keyed lookup table
///
/// Keys are matched after trim + lowercase. When two rows normalize to the
/// same key the first row in file order is the one returned.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    name: String,
    value_columns: Vec<String>,
    rows: Vec<ReferenceRow>,
    index: FxHashMap<String, usize>,
    duplicates: Vec<String>,
}

impl ReferenceTable {
    pub fn from_rows(name: &str, value_columns: Vec<String>, rows: Vec<ReferenceRow>) -> Self {
        let mut index = FxHashMap::default();
        let mut duplicates = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            let key = normalize_key(&row.key);
            if index.contains_key(&key) {
                if !duplicates.contains(&key) {
                    duplicates.push(key);
                }
            } else {
                index.insert(key, idx);
            }
        }

        if !duplicates.is_empty() {
            tracing::warn!(
                "Reference table '{}': {} duplicate disease keys, first row wins: {:?}",
                name,
                duplicates.len(),
                duplicates
            );
        }

        Self {
            name: name.to_string(),
            value_columns,
            rows,
            index,
            duplicates,
        }
    }

    /// Load reference CSV
    ///
    /// Key column is the one headed `Disease` (any case), else the first
    /// non-index column. Index columns (`Unnamed: 0`, blank) are skipped.
    pub fn load(name: &str, path: &Path) -> Result<Self> {
        let df = read_csv(path)?;

        let names: Vec<String> = column_names(&df)
            .into_iter()
            .filter(|n| !is_index_header(n))
            .collect();

        let key_col = names
            .iter()
            .find(|n| keys_match(n, "disease"))
            .or_else(|| names.first())
            .cloned()
            .with_context(|| format!("Reference table {:?} has no columns", path))?;

        let value_columns: Vec<String> = names.into_iter().filter(|n| *n != key_col).collect();

        let keys = string_cells(&df, &key_col)?;
        let columns = value_columns
            .iter()
            .map(|c| string_cells(&df, c))
            .collect::<Result<Vec<_>>>()?;

        let rows: Vec<ReferenceRow> = keys
            .into_iter()
            .enumerate()
            .filter_map(|(i, key)| {
                key.map(|key| ReferenceRow {
                    key,
                    values: columns.iter().map(|c| c[i].clone()).collect(),
                })
            })
            .collect();

        tracing::info!(
            "Reference table '{}' {:?}: {} rows, {} value columns",
            name,
            path,
            rows.len(),
            value_columns.len()
        );

        Ok(Self::from_rows(name, value_columns, rows))
    }

    /// First row whose key matches `disease` after normalization
    pub fn get(&self, disease: &str) -> Option<&ReferenceRow> {
        self.index
            .get(&normalize_key(disease))
            .map(|&idx| &self.rows[idx])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    /// Normalized keys that appear on more than one row
    pub fn duplicate_keys(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The four disease reference tables
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    pub description: ReferenceTable,
    pub precautions: ReferenceTable,
    pub diet: ReferenceTable,
    pub medications: ReferenceTable,
}

impl ReferenceTables {
    /// Load all four tables from the configured paths
    pub fn load(config: &PredictorConfig) -> Result<Self> {
        Ok(Self {
            description: ReferenceTable::load("description", &config.description_path())?,
            precautions: ReferenceTable::load("precautions", &config.precautions_path())?,
            diet: ReferenceTable::load("diet", &config.diet_path())?,
            medications: ReferenceTable::load("medications", &config.medications_path())?,
        })
    }
}
