//! Error types for ABI loading and calls

use thiserror::Error;

/// Failure while loading an ABI description
#[derive(Debug, Error)]
pub enum AbiLoadError {
    #[error("failed to parse ABI JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read ABI file: {0}")]
    Io(#[from] std::io::Error),

    #[error("{item} is missing required field `{field}`")]
    MissingField { item: String, field: &'static str },

    #[error("invalid type `{ty}`: {reason}")]
    InvalidType { ty: String, reason: String },

    #[error("method index {index} is used by both `{first}` and `{second}`")]
    DuplicateIndex {
        index: u64,
        first: String,
        second: String,
    },

    #[error("function `{0}` is declared more than once")]
    DuplicateFunction(String),

    #[error("custom type `{0}` is declared more than once")]
    DuplicateType(String),

    #[error("{item} declares `{name}` more than once")]
    DuplicateField { item: String, name: String },

    #[error("custom type `{ty}` declares no fields")]
    MissingFields { ty: String },

    #[error("custom type `{ty}` contains itself through plain fields and can never be constructed")]
    RecursiveType { ty: String },
}

/// Failure during a single contract call
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("argument {name} is required")]
    ArgumentMissing { name: String },

    #[error("param {path} should be {expected} - value {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("param {path}: type `{ty}` is not currently supported")]
    UnsupportedType { path: String, ty: String },

    #[error("{0}")]
    ResponseArity(String),

    #[error("{0}")]
    ResponseShape(String),

    #[error("method `{0}` is not declared in the ABI")]
    UnknownMethod(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error(transparent)]
    Transport(anyhow::Error),
}

impl AbiError {
    pub(crate) fn mismatch(path: &str, expected: impl Into<String>, found: impl ToString) -> Self {
        Self::TypeMismatch {
            path: path.to_string(),
            expected: expected.into(),
            found: found.to_string(),
        }
    }
}
