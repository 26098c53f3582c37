//! Field Module
//!
//! A [`SentenceField`] describes, for one named column of a dataset, how
//! raw lines become hashed, tokenized, vocabulary-indexed, special-token
//! wrapped, length-cut id sequences, and how those are re-assembled into
//! padded batches. Fields are shared, stateless policy; per-split state
//! lives in the content accumulators:
//!
//! - [`Sentence`] - one line per record, closed vocabulary with distinct
//!   go/eos markers
//! - [`SubwordSentence`] - one line per record, pretrained vocabulary with
//!   a single boundary token at both ends
//! - [`Session`] - blank-line-delimited multi-turn records
//!
//! The ingestion protocol is two-phase: every content streams its split to
//! exhaustion and is finalized (hash, tokenize, hash again, register into
//! the shared vocabulary); only then is data queried, which freezes the
//! vocabulary and fixes every id.

mod batch;
mod content;
mod error;
mod sentence;
mod session;
mod subword;
mod traits;

pub use batch::{SentenceBatch, SessionBatch};
pub use content::{
    FieldContent, FieldData, SentenceContent, SentenceData, SessionContent, SessionData,
};
pub use error::{FieldError, Result};
pub use sentence::Sentence;
pub use session::Session;
pub use subword::SubwordSentence;
pub use traits::{default_vocab_from, ProcessOptions, RoleMap, SentenceField, SentenceInput};
