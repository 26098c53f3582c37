//! Field error types.
//!
//! Three families, never retried: configuration errors surface at
//! construction, sequencing errors mark pipeline-ordering bugs, data errors
//! reject a single request.

use thiserror::Error;

use crate::vocab::VocabError;

/// Field errors
#[derive(Debug, Error)]
pub enum FieldError {
    // configuration
    #[error("missing field parameter {0:?}: not given and absent from context")]
    MissingParameter(&'static str),

    #[error("unknown set name {0:?}, not present in vocab_from")]
    UnknownSetName(String),

    #[error("{field} requires a {expected} vocabulary")]
    IncompatibleVocab {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{0} requires a pretrained tokenizer")]
    IncompatibleTokenizer(&'static str),

    #[error("field vocabulary is not in the canonical vocabulary list")]
    VocabNotListed,

    // sequencing
    #[error("field content is already finalized")]
    AlreadyFinalized,

    #[error("field content is not finalized yet")]
    NotFinalized,

    // data
    #[error("sentences must not be empty")]
    EmptySentences,

    #[error("batch index {index} out of range ({len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("vocabulary error: {0}")]
    Vocab(#[from] VocabError),

    #[error("record serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FieldError {
    fn from(err: serde_json::Error) -> Self {
        FieldError::Serialization(err.to_string())
    }
}

/// Result type for field operations
pub type Result<T> = std::result::Result<T, FieldError>;
