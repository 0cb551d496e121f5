//! Key normalization
//!
//! Source tables spell the same disease or symptom with inconsistent casing
//! and stray whitespace ("Malaria", "malaria ", " MALARIA"). Every join key
//! and every vocabulary comparison goes through `normalize_key`.

/// Trim surrounding whitespace and lowercase
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// True when two keys are equal after normalization
pub fn keys_match(a: &str, b: &str) -> bool {
    normalize_key(a) == normalize_key(b)
}

/// Header of a pandas-style index column (`Unnamed: 0` or blank)
pub fn is_index_header(header: &str) -> bool {
    let header = header.trim();
    header.is_empty() || header.starts_with("Unnamed:")
}
