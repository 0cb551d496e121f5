//! Domain errors surfaced to callers of the predictor.
//!
//! Loading paths use `anyhow` with file context; these variants are the
//! failures a caller is expected to match on (and can `downcast_ref` out of an
//! `anyhow::Error` when raised during loading).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PredictorError {
    /// Prediction requested with an empty symptom selection
    #[error("please select at least one symptom")]
    NoSymptomsSelected,

    /// Page lookup attempted before any prediction in this session
    #[error("please predict a disease first")]
    NotYetPredicted,

    /// Vector does not line up with the classifier's vocabulary
    #[error("symptom vector has {actual} entries, model expects {expected}")]
    VectorLength { expected: usize, actual: usize },

    /// Serialized model was fitted on a different symptom vocabulary
    #[error("model incompatible with current symptom set: {reason}")]
    IncompatibleModel { reason: String },

    /// Forest voted for a class index it has no label for
    #[error("classifier produced unknown class index {0}")]
    UnknownLabelIndex(usize),
}
