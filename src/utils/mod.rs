//! Utility modules shared by the encoder and the aggregator
//!
//! - Normalization: case/whitespace-insensitive join keys
//! - List literal: strict decoding of encoded recommendation lists

pub mod normalization;
pub mod list_literal;

// Re-export commonly used items
pub use normalization::{normalize_key, keys_match, is_index_header};
pub use list_literal::{parse_list_literal, looks_like_list, ListParseError, ListParseErrorKind};
