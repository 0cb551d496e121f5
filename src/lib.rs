//! Disease Predictor
//!
//! Symptom-to-disease classification with reference-table lookups.
//!
//! - `data`: Training and reference tables loaded with Polars
//! - `encoder`: Symptom names -> binary vector over the training vocabulary
//! - `forest` / `classifier` / `model_store`: Random forest, its wrapper and
//!   the serialized artifact with a vocabulary check
//! - `aggregator`: Case-insensitive join across the four reference tables
//! - `app` / `session`: Startup context and per-session prediction state

pub mod utils;
pub mod config;
pub mod error;
pub mod types;
pub mod data;
pub mod encoder;
pub mod forest;
pub mod model_store;
pub mod classifier;
pub mod aggregator;
pub mod app;
pub mod session;

// Re-export commonly used types
pub use app::AppContext;
pub use classifier::{Classifier, ModelSource};
pub use config::{ForestParams, PredictorConfig};
pub use encoder::{SymptomEncoder, SymptomVector, SymptomVocabulary};
pub use error::PredictorError;
pub use session::{Prediction, PredictionState, Session};
pub use types::{Disease, InfoBundle, InfoField, RecommendationIssue, NO_DESCRIPTION};
