//! Symptom Encoder
//!
//! Maps a user's selected symptom names onto the binary feature vector the
//! classifier was fitted on. Matching is case/whitespace-insensitive; names
//! outside the vocabulary contribute nothing and are reported separately.

use crate::utils::normalize_key;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Ordered symptom names the classifier expects, in fit order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomVocabulary {
    names: Vec<String>,
}

impl SymptomVocabulary {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Human-readable form of a raw column name (`skin_rash` -> `skin rash`)
    pub fn display_name(name: &str) -> String {
        name.trim().replace('_', " ")
    }

    /// Describe how `other` differs from this vocabulary, if at all
    pub fn mismatch(&self, other: &SymptomVocabulary) -> Option<String> {
        if self == other {
            return None;
        }
        if self.len() != other.len() {
            return Some(format!(
                "expected {} symptoms, found {}",
                self.len(),
                other.len()
            ));
        }
        self.names
            .iter()
            .zip(&other.names)
            .enumerate()
            .find(|(_, (a, b))| a != b)
            .map(|(idx, (a, b))| format!("position {}: expected '{}', found '{}'", idx, a, b))
    }
}

/// Binary presence vector aligned with a `SymptomVocabulary`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymptomVector(Vec<u8>);

impl SymptomVector {
    pub fn from_values(values: Vec<u8>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of positions set to 1
    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|&&v| v == 1).count()
    }
}

/// Encodes symptom selections against a fixed vocabulary
#[derive(Debug, Clone)]
pub struct SymptomEncoder {
    vocabulary: SymptomVocabulary,
    normalized: Vec<String>,
}

impl SymptomEncoder {
    pub fn new(vocabulary: SymptomVocabulary) -> Self {
        let normalized = vocabulary.names().iter().map(|n| normalize_key(n)).collect();
        Self { vocabulary, normalized }
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.vocabulary
    }

    /// Position i is 1 iff vocabulary entry i matches any selected name
    ///
    /// Unknown names are ignored. An empty selection yields the all-zero
    /// vector; callers reject that before predicting.
    pub fn encode<S: AsRef<str>>(&self, selected: &[S]) -> SymptomVector {
        let wanted: FxHashSet<String> = selected.iter().map(|s| normalize_key(s.as_ref())).collect();

        SymptomVector(
            self.normalized
                .iter()
                .map(|name| u8::from(wanted.contains(name)))
                .collect(),
        )
    }

    /// Selected names that match no vocabulary entry, in input order, deduplicated
    pub fn unrecognized<S: AsRef<str>>(&self, selected: &[S]) -> Vec<String> {
        let known: FxHashSet<&str> = self.normalized.iter().map(|s| s.as_str()).collect();
        let mut seen = FxHashSet::default();

        selected
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| {
                let key = normalize_key(s);
                !known.contains(key.as_str()) && seen.insert(key)
            })
            .map(|s| s.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> SymptomEncoder {
        SymptomEncoder::new(SymptomVocabulary::new(vec![
            "itching".to_string(),
            " skin_rash".to_string(),
            "High_Fever ".to_string(),
        ]))
    }

    #[test]
    fn test_encode_is_case_and_space_insensitive() {
        let v = encoder().encode(&["ITCHING", "high_fever"]);
        assert_eq!(v.as_slice(), &[1, 0, 1]);
        assert_eq!(v.active_count(), 2);
    }

    #[test]
    fn test_encode_deterministic_and_fixed_length() {
        let enc = encoder();
        let a = enc.encode(&["skin_rash", "itching"]);
        let b = enc.encode(&["itching", "skin_rash"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), enc.vocabulary().len());
    }

    #[test]
    fn test_unknown_symptoms_ignored_and_reported() {
        let enc = encoder();
        let v = enc.encode(&["itchng", "itching", "Itchng "]);
        assert_eq!(v.as_slice(), &[1, 0, 0]);
        assert_eq!(enc.unrecognized(&["itchng", "itching", "Itchng "]), vec!["itchng".to_string()]);
    }

    #[test]
    fn test_empty_selection_is_all_zero() {
        let empty: [&str; 0] = [];
        let v = encoder().encode(&empty);
        assert_eq!(v.as_slice(), &[0, 0, 0]);
        assert_eq!(v.active_count(), 0);
    }

    #[test]
    fn test_vocabulary_mismatch_reports_first_difference() {
        let a = SymptomVocabulary::new(vec!["fever".into(), "cough".into()]);
        let b = SymptomVocabulary::new(vec!["cough".into(), "fever".into()]);
        let c = SymptomVocabulary::new(vec!["fever".into()]);

        assert!(a.mismatch(&a.clone()).is_none());
        assert!(a.mismatch(&b).unwrap().contains("position 0"));
        assert!(a.mismatch(&c).unwrap().contains("expected 2 symptoms"));
        assert_eq!(SymptomVocabulary::display_name("skin_rash"), "skin rash");
    }
}
