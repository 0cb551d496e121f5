//! Per-user session state
//!
//! A session remembers the most recent prediction. Page lookups
//! (description, precautions, diet, medications) match on that state and
//! answer "predict first" until a prediction exists. Nothing clears it
//! except dropping the session.

use crate::app::AppContext;
use crate::error::PredictorError;
use crate::types::{Disease, InfoBundle};
use serde::Serialize;

/// Outcome of one successful prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub disease: Disease,
    /// Selected names that matched no known symptom
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unrecognized: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PredictionState {
    #[default]
    NoPrediction,
    Predicted(Prediction),
}

impl PredictionState {
    pub fn disease(&self) -> Option<&Disease> {
        match self {
            PredictionState::NoPrediction => None,
            PredictionState::Predicted(p) => Some(&p.disease),
        }
    }
}

pub struct Session<'a> {
    app: &'a AppContext,
    state: PredictionState,
}

impl<'a> Session<'a> {
    pub fn new(app: &'a AppContext) -> Self {
        Self {
            app,
            state: PredictionState::NoPrediction,
        }
    }

    /// Encode the selection, predict, and remember the result
    ///
    /// An empty selection is rejected before encoding. A failed prediction
    /// leaves the previous state untouched.
    pub fn select_symptoms<S: AsRef<str>>(&mut self, symptoms: &[S]) -> Result<Prediction, PredictorError> {
        if symptoms.iter().all(|s| s.as_ref().trim().is_empty()) {
            return Err(PredictorError::NoSymptomsSelected);
        }

        let encoder = self.app.encoder();
        let unrecognized = encoder.unrecognized(symptoms);
        if !unrecognized.is_empty() {
            tracing::warn!("Ignoring unrecognized symptoms: {:?}", unrecognized);
        }

        let vector = encoder.encode(symptoms);
        let disease = self.app.classifier().predict(&vector)?;
        tracing::info!("Predicted disease: {}", disease);

        let prediction = Prediction { disease, unrecognized };
        self.state = PredictionState::Predicted(prediction.clone());
        Ok(prediction)
    }

    /// Current state (`getPrediction`)
    pub fn prediction(&self) -> &PredictionState {
        &self.state
    }

    /// Info for an arbitrary disease (`getInfo`)
    pub fn info(&self, disease: &Disease) -> InfoBundle {
        self.app.info(disease)
    }

    /// Info for the predicted disease
    pub fn current_info(&self) -> Result<InfoBundle, PredictorError> {
        match &self.state {
            PredictionState::Predicted(p) => Ok(self.app.info(&p.disease)),
            PredictionState::NoPrediction => Err(PredictorError::NotYetPredicted),
        }
    }

    pub fn description(&self) -> Result<String, PredictorError> {
        self.current_info().map(|info| info.description)
    }

    pub fn precautions(&self) -> Result<Vec<String>, PredictorError> {
        self.current_info().map(|info| info.precautions)
    }

    pub fn diet(&self) -> Result<Vec<String>, PredictorError> {
        self.current_info().map(|info| info.diet)
    }

    pub fn medications(&self) -> Result<Vec<String>, PredictorError> {
        self.current_info().map(|info| info.medications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::config::{ForestParams, PredictorConfig};
    use crate::data::{ReferenceRow, ReferenceTable, ReferenceTables, TrainingTable};

    fn empty_table(name: &str) -> ReferenceTable {
        ReferenceTable::from_rows(name, vec!["Value".to_string()], Vec::new())
    }

    fn app() -> AppContext {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for _ in 0..5 {
            rows.push(vec![1, 1, 0]);
            labels.push("Flu".to_string());
            rows.push(vec![0, 0, 1]);
            labels.push("Acne".to_string());
        }
        let training = TrainingTable::from_rows(
            vec!["fever".into(), "cough".into(), "pimples".into()],
            rows,
            labels,
        )
        .unwrap();
        let params = ForestParams { n_estimators: 10, ..ForestParams::default() };
        let classifier = Classifier::train(&training, &params).unwrap();

        let references = ReferenceTables {
            description: ReferenceTable::from_rows(
                "description",
                vec!["Description".to_string()],
                vec![ReferenceRow {
                    key: "flu".to_string(),
                    values: vec![Some("Common viral infection".to_string())],
                }],
            ),
            precautions: empty_table("precautions"),
            diet: empty_table("diet"),
            medications: empty_table("medications"),
        };

        AppContext::from_parts(PredictorConfig::default(), classifier, references)
    }

    #[test]
    fn test_lookup_before_prediction_rejected() {
        let app = app();
        let session = app.session();
        assert_eq!(session.prediction(), &PredictionState::NoPrediction);
        assert_eq!(session.medications().unwrap_err(), PredictorError::NotYetPredicted);
        assert_eq!(session.description().unwrap_err(), PredictorError::NotYetPredicted);
    }

    #[test]
    fn test_empty_selection_rejected() {
        let app = app();
        let mut session = app.session();
        let none: [&str; 0] = [];
        assert_eq!(session.select_symptoms(&none).unwrap_err(), PredictorError::NoSymptomsSelected);
        assert_eq!(session.select_symptoms(&["  "]).unwrap_err(), PredictorError::NoSymptomsSelected);
        assert_eq!(session.prediction(), &PredictionState::NoPrediction);
    }

    #[test]
    fn test_predict_then_pages() {
        let app = app();
        let mut session = app.session();

        let prediction = session.select_symptoms(&["Fever", " COUGH", "cogh"]).unwrap();
        assert_eq!(prediction.disease.as_str(), "Flu");
        assert_eq!(prediction.unrecognized, vec!["cogh".to_string()]);

        assert_eq!(session.prediction().disease(), Some(&Disease::from("Flu")));
        assert_eq!(session.description().unwrap(), "Common viral infection");
        assert!(session.diet().unwrap().is_empty());

        // Later predictions replace the earlier one
        session.select_symptoms(&["pimples"]).unwrap();
        assert_eq!(session.prediction().disease(), Some(&Disease::from("Acne")));
        assert_eq!(session.description().unwrap(), "No description available.");
    }
}
