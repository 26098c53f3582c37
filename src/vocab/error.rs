//! Vocabulary error types.

use thiserror::Error;

use crate::tokenizer::TokenId;

/// Vocabulary errors
#[derive(Debug, Error)]
pub enum VocabError {
    #[error("vocabulary is empty, no tokens were added before freezing")]
    Empty,

    #[error("cannot add tokens to a frozen vocabulary")]
    AlreadyBuilt,

    #[error("token id {0} out of range (vocabulary size {1})")]
    InvalidId(TokenId, usize),

    #[error("pad and unk special tokens must differ, both are {0:?}")]
    SpecialTokenClash(String),

    #[error("pretrained backend does not define token {0:?}")]
    MissingBackendToken(String),
}

/// Result type for vocabulary operations
pub type Result<T> = std::result::Result<T, VocabError>;
