//! Shared value types: disease labels and the aggregated info bundle

use crate::utils::{normalize_key, ListParseError};
use serde::Serialize;
use std::fmt;

/// Disease label as produced by the classifier
///
/// Display keeps the original spelling; `key()` is the normalized join key
/// used against the reference tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Disease(String);

impl Disease {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trimmed, lowercased join key
    pub fn key(&self) -> String {
        normalize_key(&self.0)
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Disease {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Text shown when the description table has no entry
pub const NO_DESCRIPTION: &str = "No description available.";

/// Recommendation fields whose cells hold encoded lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoField {
    Diet,
    Medications,
}

impl fmt::Display for InfoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoField::Diet => f.write_str("diet"),
            InfoField::Medications => f.write_str("medications"),
        }
    }
}

/// A field that was emptied because its cell could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationIssue {
    pub field: InfoField,
    /// Offending cell text
    pub cell: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: ListParseError,
}

impl fmt::Display for RecommendationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not parse recommendation data ({}): {}", self.field, self.error)
    }
}

fn serialize_display<T: fmt::Display, S: serde::Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

/// Everything known about one disease across the four reference tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoBundle {
    pub disease: Disease,
    pub description: String,
    pub precautions: Vec<String>,
    pub diet: Vec<String>,
    pub medications: Vec<String>,
    /// Decode failures; the affected field is left empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<RecommendationIssue>,
}

impl InfoBundle {
    /// Bundle for a disease missing from every table
    pub fn fallback(disease: Disease) -> Self {
        Self {
            disease,
            description: NO_DESCRIPTION.to_string(),
            precautions: Vec::new(),
            diet: Vec::new(),
            medications: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Same content, ignoring how the disease was spelled in the query
    pub fn same_content(&self, other: &InfoBundle) -> bool {
        self.description == other.description
            && self.precautions == other.precautions
            && self.diet == other.diet
            && self.medications == other.medications
            && self.issues == other.issues
    }
}
