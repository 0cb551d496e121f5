//! Info Aggregator
//!
//! Joins a disease against the description, precautions, diet and medication
//! tables. Every table lookup normalizes both sides (trim + lowercase) and
//! takes the first matching row. A missing row is never an error: description
//! falls back to a fixed sentence, list fields come back empty.
//!
//! Diet and medication cells hold encoded lists (`['a', 'b']`). They are
//! decoded with the strict list parser; a malformed cell empties its field and
//! is reported in `InfoBundle::issues`.

use crate::data::{ReferenceRow, ReferenceTable, ReferenceTables};
use crate::types::{Disease, InfoBundle, InfoField, RecommendationIssue, NO_DESCRIPTION};
use crate::utils::{looks_like_list, parse_list_literal};

pub struct InfoAggregator<'a> {
    tables: &'a ReferenceTables,
}

impl<'a> InfoAggregator<'a> {
    pub fn new(tables: &'a ReferenceTables) -> Self {
        Self { tables }
    }

    /// Aggregate all four tables for `disease`
    pub fn lookup(&self, disease: &Disease) -> InfoBundle {
        let mut issues = Vec::new();

        let description = description_of(&self.tables.description, disease);
        let precautions = flatten_row(self.tables.precautions.get(disease.as_str()));
        let diet = decode_row(
            self.tables.diet.get(disease.as_str()),
            InfoField::Diet,
            &mut issues,
        );
        let medications = decode_row(
            self.tables.medications.get(disease.as_str()),
            InfoField::Medications,
            &mut issues,
        );

        for issue in &issues {
            tracing::warn!("'{}': {}", disease, issue);
        }

        InfoBundle {
            disease: disease.clone(),
            description,
            precautions,
            diet,
            medications,
            issues,
        }
    }
}

/// First value column, or the fixed fallback
fn description_of(table: &ReferenceTable, disease: &Disease) -> String {
    table
        .get(disease.as_str())
        .and_then(|row| row.values.first().cloned().flatten())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

/// All non-empty value cells in column order
fn flatten_row(row: Option<&ReferenceRow>) -> Vec<String> {
    row.map(|row| row.values.iter().flatten().cloned().collect())
        .unwrap_or_default()
}

/// Decode every cell of a recommendation row
///
/// Encoded-list cells are expanded; other cells are single items. Any decode
/// failure empties the whole field.
fn decode_row(
    row: Option<&ReferenceRow>,
    field: InfoField,
    issues: &mut Vec<RecommendationIssue>,
) -> Vec<String> {
    let mut items = Vec::new();

    for cell in flatten_row(row) {
        if !looks_like_list(&cell) {
            items.push(cell);
            continue;
        }
        match parse_list_literal(&cell) {
            Ok(decoded) => items.extend(decoded),
            Err(error) => {
                issues.push(RecommendationIssue { field, cell, error });
                return Vec::new();
            }
        }
    }

    items
}
