//! Error types for evalframe-core.

use thiserror::Error;

/// Why a single stream record could not be transformed.
///
/// These never abort a batch; the normalizer turns them into
/// `ProcessingFailed` output records.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transformed payload has no `{0}` field")]
    MissingField(String),
}

/// Failures reported by a parameter or blob store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("parameter not found: {0}")]
    ParameterNotFound(String),

    #[error("object not found: {bucket}/{key}")]
    NoSuchKey { bucket: String, key: String },

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("could not decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn decode(what: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failures of the evaluation driver.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("runMode is missing in the event")]
    MissingRunMode,

    #[error("invalid runMode: {0}. Expected 'benchmark' or 'validation'")]
    InvalidRunMode(String),

    #[error("invalid evaluation request: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("evaluator failed: {0}")]
    Evaluator(String),

    #[error("evaluator returned no scores for gt_id {0}")]
    EmptyScores(String),
}

impl EvalError {
    pub fn evaluator(msg: impl Into<String>) -> Self {
        Self::Evaluator(msg.into())
    }
}
