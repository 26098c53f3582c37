//! Multi-turn session field for dialogue corpora.

use std::sync::Arc;

use crate::context::{FieldContext, FieldParams};
use crate::tokenizer::{TokenId, Tokenizer};
use crate::vocab::{Vocab, VocabKind};

use super::batch::{assemble_session_batch, SessionBatch};
use super::content::SessionData;
use super::error::{FieldError, Result};
use super::sentence::{closed_add_special, closed_remove_special, closed_trim};
use super::traits::{resolve_params, ProcessOptions, RoleMap, SentenceField, SentenceInput};

/// A field for multi-turn sessions over a closed vocabulary.
///
/// A record is a blank-line-delimited group of turns; each turn goes
/// through the same tokenize/index/wrap/cut pipeline as a
/// [`Sentence`](super::Sentence) row, and batches come out as a
/// `[batch, turn, length]` cube.
pub struct Session {
    tokenizer: Arc<dyn Tokenizer>,
    vocab: Arc<dyn Vocab>,
    vocab_from: RoleMap,
    max_sent_length: Option<usize>,
    convert_to_lower_letter: bool,
}

impl Session {
    /// Create a session field; parameters missing from `params` are
    /// resolved from `context`.
    ///
    /// # Errors
    /// Fails when tokenizer or vocabulary are nowhere to be found, or when
    /// the resolved vocabulary is not a closed one.
    pub fn new(params: FieldParams, context: &FieldContext) -> Result<Self> {
        let resolved = resolve_params(params, context)?;
        if resolved.vocab.kind() != VocabKind::Closed {
            return Err(FieldError::IncompatibleVocab { field: "Session", expected: "closed" });
        }
        Ok(Self {
            tokenizer: resolved.tokenizer,
            vocab: resolved.vocab,
            vocab_from: resolved.vocab_from,
            max_sent_length: resolved.max_sent_length,
            convert_to_lower_letter: resolved.convert_to_lower_letter,
        })
    }

    /// Tokenize every turn of every session.
    #[must_use]
    pub fn tokenize_sessions(&self, sessions: &[Vec<String>]) -> Vec<Vec<Vec<String>>> {
        sessions.iter().map(|session| self.tokenize_sentences(session)).collect()
    }

    /// Turn sessions into per-turn id sequences.
    ///
    /// # Errors
    /// Rejects an empty session list or a session without turns.
    pub fn process_sessions(
        &self,
        sessions: &[Vec<Vec<String>>],
        options: ProcessOptions,
    ) -> Result<Vec<Vec<Vec<TokenId>>>> {
        if sessions.is_empty() {
            return Err(FieldError::EmptySentences);
        }
        sessions
            .iter()
            .map(|session| self.process_sentences(SentenceInput::Tokenized(session), options))
            .collect()
    }

    /// Assemble a padded `[batch, turn, length]` batch for `indexes`.
    ///
    /// # Errors
    /// Fails on out-of-range indexes.
    pub fn get_session_batch(
        &self,
        data: &SessionData,
        indexes: &[usize],
    ) -> Result<SessionBatch> {
        assemble_session_batch(self.vocab.as_ref(), data, indexes)
    }
}

impl SentenceField for Session {
    fn type_name(&self) -> &'static str {
        "Session"
    }

    fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    fn vocab(&self) -> &Arc<dyn Vocab> {
        &self.vocab
    }

    fn vocab_from(&self) -> &RoleMap {
        &self.vocab_from
    }

    fn max_sent_length(&self) -> Option<usize> {
        self.max_sent_length
    }

    fn convert_to_lower_letter(&self) -> bool {
        self.convert_to_lower_letter
    }

    fn add_special_to_ids(&self, ids: &[TokenId]) -> Result<Vec<TokenId>> {
        closed_add_special(self.vocab.as_ref(), ids)
    }

    fn trim_in_ids(&self, ids: &[TokenId]) -> Result<Vec<TokenId>> {
        closed_trim(self.vocab.as_ref(), ids)
    }

    fn remove_special_in_ids(
        &self,
        ids: &[TokenId],
        remove_special: bool,
        trim: bool,
    ) -> Result<Vec<TokenId>> {
        closed_remove_special(self.vocab.as_ref(), ids, remove_special, trim)
    }
}
