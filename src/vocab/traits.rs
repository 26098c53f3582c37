//! Vocabulary trait definition.

use serde::{Deserialize, Serialize};

use super::error::Result;
use crate::tokenizer::TokenId;

/// Which kind of dataset split a batch of tokens comes from.
///
/// The ordering doubles as role priority when ids are assigned: train
/// before test before extra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabRole {
    /// Tokens may enter the frequent vocabulary.
    Train,
    /// Tokens only extend full-vocabulary coverage.
    Test,
    /// Tokens only extend full-vocabulary coverage.
    Extra,
}

/// Special-token layout of a vocabulary implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabKind {
    /// Distinct pad / unk / go / eos ids, frequent/rare split.
    Closed,
    /// Backend-defined vocabulary, one boundary token for begin and end.
    Pretrained,
}

/// Vocabulary trait
///
/// A vocabulary accumulates token statistics tagged by [`VocabRole`] while
/// building, freezes into a token↔id table on first query, and converts
/// between tokens and ids thereafter. Handles are shared: many fields may
/// reference one vocabulary to build it together.
pub trait Vocab: Send + Sync {
    /// The special-token layout of this implementation.
    fn kind(&self) -> VocabKind;

    /// Accumulate frequency counts for `tokens` under `role`.
    ///
    /// Callable any number of times before the vocabulary freezes.
    ///
    /// # Errors
    /// Fails with `AlreadyBuilt` once the vocabulary is frozen.
    fn add_tokens(&self, tokens: &[String], role: VocabRole) -> Result<()>;

    /// Convert tokens to ids. Unknown tokens map to the unk id; with
    /// `only_frequent_word`, so does anything outside the frequent range.
    fn convert_tokens_to_ids(&self, tokens: &[String], only_frequent_word: bool)
        -> Result<Vec<TokenId>>;

    /// Convert ids back to tokens.
    ///
    /// # Errors
    /// Fails with `InvalidId` on ids outside the vocabulary.
    fn convert_ids_to_tokens(&self, ids: &[TokenId]) -> Result<Vec<String>>;

    /// Number of ids usable as generation targets (specials included).
    fn frequent_vocab_size(&self) -> Result<usize>;

    /// Total number of ids, rare section included.
    fn all_vocab_size(&self) -> Result<usize>;

    /// Padding id.
    fn pad_id(&self) -> Result<TokenId>;

    /// Unknown-token id.
    fn unk_id(&self) -> Result<TokenId>;

    /// Sequence-begin id (equals [`eos_id`](Vocab::eos_id) for pretrained
    /// vocabularies).
    fn go_id(&self) -> Result<TokenId>;

    /// Sequence-end id.
    fn eos_id(&self) -> Result<TokenId>;
}
