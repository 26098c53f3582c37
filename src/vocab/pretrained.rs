//! Vocabulary defined by a pretrained subword backend.

use std::sync::Arc;

use super::error::{Result, VocabError};
use super::traits::{Vocab, VocabKind, VocabRole};
use crate::tokenizer::{SubwordBackend, TokenId};

/// Vocabulary fixed by a pretrained subword backend.
///
/// Frozen from construction: the backend already assigned every id. There
/// is no frequent/rare split (the full vocabulary is used throughout), and
/// one boundary token serves as begin, end and padding.
pub struct PretrainedVocab {
    backend: Arc<dyn SubwordBackend>,
    unk_id: TokenId,
    boundary_id: TokenId,
}

impl PretrainedVocab {
    /// Build from a subword backend.
    ///
    /// # Errors
    /// Fails if the backend does not define its own unknown or boundary
    /// token.
    pub fn new(backend: Arc<dyn SubwordBackend>) -> Result<Self> {
        let unk_id = backend
            .token_to_id(backend.unk_token())
            .ok_or_else(|| VocabError::MissingBackendToken(backend.unk_token().to_string()))?;
        let boundary_id = backend
            .token_to_id(backend.boundary_token())
            .ok_or_else(|| VocabError::MissingBackendToken(backend.boundary_token().to_string()))?;
        Ok(Self { backend, unk_id, boundary_id })
    }

    /// The wrapped backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn SubwordBackend> {
        &self.backend
    }
}

impl Vocab for PretrainedVocab {
    fn kind(&self) -> VocabKind {
        VocabKind::Pretrained
    }

    /// The backend already registered every token; corpus statistics do not
    /// change the mapping.
    fn add_tokens(&self, _tokens: &[String], _role: VocabRole) -> Result<()> {
        Ok(())
    }

    fn convert_tokens_to_ids(
        &self,
        tokens: &[String],
        _only_frequent_word: bool,
    ) -> Result<Vec<TokenId>> {
        Ok(tokens
            .iter()
            .map(|token| self.backend.token_to_id(token).unwrap_or(self.unk_id))
            .collect())
    }

    fn convert_ids_to_tokens(&self, ids: &[TokenId]) -> Result<Vec<String>> {
        ids.iter()
            .map(|&id| {
                self.backend
                    .id_to_token(id)
                    .ok_or(VocabError::InvalidId(id, self.backend.vocab_size()))
            })
            .collect()
    }

    fn frequent_vocab_size(&self) -> Result<usize> {
        Ok(self.backend.vocab_size())
    }

    fn all_vocab_size(&self) -> Result<usize> {
        Ok(self.backend.vocab_size())
    }

    fn pad_id(&self) -> Result<TokenId> {
        Ok(self.boundary_id)
    }

    fn unk_id(&self) -> Result<TokenId> {
        Ok(self.unk_id)
    }

    fn go_id(&self) -> Result<TokenId> {
        Ok(self.boundary_id)
    }

    fn eos_id(&self) -> Result<TokenId> {
        Ok(self.boundary_id)
    }
}
