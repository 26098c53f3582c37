//! The shared sentence-field contract.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::context::{FieldContext, FieldParams};
use crate::hash::{dumps, sha256_hex};
use crate::tokenizer::{TokenId, Tokenizer};
use crate::vocab::{Vocab, VocabRole};

use super::batch::{assemble_sentence_batch, SentenceBatch};
use super::content::SentenceData;
use super::error::{FieldError, Result};

/// Set-name to split-role mapping of a field.
pub type RoleMap = BTreeMap<String, VocabRole>;

/// The default mapping from common set names to split roles.
#[must_use]
pub fn default_vocab_from() -> RoleMap {
    let mut map = RoleMap::new();
    for name in ["train", "training"] {
        map.insert(name.to_string(), VocabRole::Train);
    }
    for name in ["dev", "development", "valid", "validation", "test", "evaluation"] {
        map.insert(name.to_string(), VocabRole::Test);
    }
    map
}

/// Options for [`SentenceField::process_sentences`].
#[derive(Debug, Clone, Copy)]
pub struct ProcessOptions {
    /// Wrap each sequence with the variant's special tokens.
    pub add_special: bool,
    /// Cut each sequence to the field's maximum length.
    pub cut: bool,
    /// Map ids outside the frequent vocabulary to unk.
    pub only_frequent_word: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self { add_special: true, cut: true, only_frequent_word: false }
    }
}

impl ProcessOptions {
    /// Set special-token wrapping.
    #[must_use]
    pub fn with_add_special(mut self, add_special: bool) -> Self {
        self.add_special = add_special;
        self
    }

    /// Set length cutting.
    #[must_use]
    pub fn with_cut(mut self, cut: bool) -> Self {
        self.cut = cut;
        self
    }

    /// Set frequent-vocabulary masking.
    #[must_use]
    pub fn with_only_frequent_word(mut self, only_frequent_word: bool) -> Self {
        self.only_frequent_word = only_frequent_word;
        self
    }
}

/// Input accepted by [`SentenceField::process_sentences`].
#[derive(Debug, Clone, Copy)]
pub enum SentenceInput<'a> {
    /// Raw sentences, tokenized by the field.
    Raw(&'a [String]),
    /// Already tokenized sentences.
    Tokenized(&'a [Vec<String>]),
}

/// Field parameters after context resolution.
pub(crate) struct ResolvedParams {
    pub tokenizer: Arc<dyn Tokenizer>,
    pub vocab: Arc<dyn Vocab>,
    pub vocab_from: RoleMap,
    pub max_sent_length: Option<usize>,
    pub convert_to_lower_letter: bool,
}

pub(crate) fn resolve_params(params: FieldParams, context: &FieldContext) -> Result<ResolvedParams> {
    let FieldParams { tokenizer, vocab, vocab_from, max_sent_length, convert_to_lower_letter } =
        params;
    Ok(ResolvedParams {
        tokenizer: context
            .resolve(tokenizer, |frame| frame.tokenizer.clone())
            .ok_or(FieldError::MissingParameter("tokenizer"))?,
        vocab: context
            .resolve(vocab, |frame| frame.vocab.clone())
            .ok_or(FieldError::MissingParameter("vocab"))?,
        vocab_from: context
            .resolve(vocab_from, |frame| frame.vocab_from.clone())
            .unwrap_or_else(default_vocab_from),
        max_sent_length: context.resolve(max_sent_length, |frame| frame.max_sent_length),
        convert_to_lower_letter: context
            .resolve(convert_to_lower_letter, |frame| frame.convert_to_lower_letter)
            .unwrap_or(false),
    })
}

/// Cut `ids` before the first occurrence of `target`.
pub(crate) fn trim_before_target(ids: &[TokenId], target: TokenId) -> Vec<TokenId> {
    match ids.iter().position(|&id| id == target) {
        Some(at) => ids[..at].to_vec(),
        None => ids.to_vec(),
    }
}

/// Strip a leading `go` and a trailing `eos` if present.
pub(crate) fn strip_special_bounds(ids: &[TokenId], go: TokenId, eos: TokenId) -> Vec<TokenId> {
    if ids.is_empty() {
        return Vec::new();
    }
    let start = usize::from(ids[0] == go);
    let mut end = ids.len();
    if end > start && ids[end - 1] == eos {
        end -= 1;
    }
    ids[start..end].to_vec()
}

/// A field for sentences: shared, stateless policy for one dataset column.
///
/// Fields hold configuration only; per-split data lives in the content
/// types created through [`super::SentenceContent`]. One field object may
/// back any number of splits and datasets.
pub trait SentenceField: Send + Sync {
    /// Concrete field type name, part of the setting hash.
    fn type_name(&self) -> &'static str;

    /// The field's tokenizer.
    fn tokenizer(&self) -> &Arc<dyn Tokenizer>;

    /// The field's vocabulary.
    fn vocab(&self) -> &Arc<dyn Vocab>;

    /// Set-name to split-role mapping.
    fn vocab_from(&self) -> &RoleMap;

    /// Maximum sentence length, `None` for no cutting.
    fn max_sent_length(&self) -> Option<usize>;

    /// Whether tokens are lower-cased after tokenization.
    fn convert_to_lower_letter(&self) -> bool;

    /// Wrap `ids` with the variant's special tokens.
    fn add_special_to_ids(&self, ids: &[TokenId]) -> Result<Vec<TokenId>>;

    /// Cut `ids` at the variant's end marker (padding removed for closed
    /// vocabularies; a leading boundary token is preserved for subword
    /// vocabularies).
    fn trim_in_ids(&self, ids: &[TokenId]) -> Result<Vec<TokenId>>;

    /// Undo [`add_special_to_ids`](SentenceField::add_special_to_ids):
    /// optionally trim first, then strip the boundary specials.
    fn remove_special_in_ids(
        &self,
        ids: &[TokenId],
        remove_special: bool,
        trim: bool,
    ) -> Result<Vec<TokenId>>;

    /// Split role for a set name.
    fn role_for(&self, set_name: &str) -> Result<VocabRole> {
        self.vocab_from()
            .get(set_name)
            .copied()
            .ok_or_else(|| FieldError::UnknownSetName(set_name.to_string()))
    }

    /// Tokenize sentences, lower-casing afterwards when configured.
    fn tokenize_sentences(&self, sentences: &[String]) -> Vec<Vec<String>> {
        let tokenized = self.tokenizer().tokenize_sentences(sentences);
        if self.convert_to_lower_letter() {
            tokenized
                .into_iter()
                .map(|tokens| tokens.into_iter().map(|token| token.to_lowercase()).collect())
                .collect()
        } else {
            tokenized
        }
    }

    /// Convert tokens to ids, optionally wrapping with special tokens.
    fn convert_tokens_to_ids(
        &self,
        tokens: &[String],
        add_special: bool,
        only_frequent_word: bool,
    ) -> Result<Vec<TokenId>> {
        let ids = self.vocab().convert_tokens_to_ids(tokens, only_frequent_word)?;
        if add_special {
            self.add_special_to_ids(&ids)
        } else {
            Ok(ids)
        }
    }

    /// Convert ids back to tokens.
    fn convert_ids_to_tokens(
        &self,
        ids: &[TokenId],
        remove_special: bool,
        trim: bool,
    ) -> Result<Vec<String>> {
        let ids = self.remove_special_in_ids(ids, remove_special, trim)?;
        Ok(self.vocab().convert_ids_to_tokens(&ids)?)
    }

    /// Convert ids to a best-effort sentence string.
    fn convert_ids_to_sentence(
        &self,
        ids: &[TokenId],
        remove_special: bool,
        trim: bool,
    ) -> Result<String> {
        let tokens = self.convert_ids_to_tokens(ids, remove_special, trim)?;
        Ok(self.tokenizer().convert_tokens_to_sentence(&tokens))
    }

    /// Turn sentences into id sequences.
    ///
    /// Special tokens are added first, then the sequence is cut to
    /// [`max_sent_length`](SentenceField::max_sent_length); the cut can
    /// therefore drop the trailing end marker of an over-long sentence.
    /// That order is fixed for every variant. Cutting is not an error: the
    /// aggregate loss is reported through `tracing`.
    ///
    /// # Errors
    /// Rejects an empty sentence list.
    fn process_sentences(
        &self,
        input: SentenceInput<'_>,
        options: ProcessOptions,
    ) -> Result<Vec<Vec<TokenId>>> {
        let tokenized_owned: Vec<Vec<String>>;
        let tokenized: &[Vec<String>] = match input {
            SentenceInput::Raw(sentences) => {
                if sentences.is_empty() {
                    return Err(FieldError::EmptySentences);
                }
                tokenized_owned = self.tokenize_sentences(sentences);
                &tokenized_owned
            }
            SentenceInput::Tokenized(tokenized) => {
                if tokenized.is_empty() {
                    return Err(FieldError::EmptySentences);
                }
                tokenized
            }
        };

        let mut sentences: Vec<Vec<TokenId>> = tokenized
            .iter()
            .map(|tokens| {
                self.convert_tokens_to_ids(tokens, options.add_special, options.only_frequent_word)
            })
            .collect::<Result<_>>()?;

        if options.cut {
            if let Some(max_sent_length) = self.max_sent_length() {
                let before: usize = sentences.iter().map(Vec::len).sum();
                let longest = sentences.iter().map(Vec::len).max().unwrap_or(0);
                for sentence in &mut sentences {
                    sentence.truncate(max_sent_length);
                }
                let after: usize = sentences.iter().map(Vec::len).sum();
                if sentences.len() > 1 && before > 0 {
                    tracing::info!(
                        max_length = longest,
                        cut_percent = (before - after) as f64 / before as f64 * 100.0,
                        "cut sentences to maximum length"
                    );
                }
            }
        }

        Ok(sentences)
    }

    /// Recover a human-readable sentence from generated ids.
    fn recover_sentence(&self, ids: &[TokenId], remove_special: bool, trim: bool) -> Result<String> {
        let ids = self.remove_special_in_ids(ids, remove_special, trim)?;
        self.convert_ids_to_sentence(&ids, false, false)
    }

    /// Deterministic fingerprint of this field's configuration.
    ///
    /// Encodes the *index* of the field's vocabulary inside `vocabs` (the
    /// canonical list of every vocabulary in use), not the vocabulary's
    /// content: two fields sharing one vocabulary object hash differently
    /// from two fields using separate but identical vocabularies.
    fn setting_hash(&self, vocabs: &[Arc<dyn Vocab>]) -> Result<String> {
        let vocab_index = vocabs
            .iter()
            .position(|candidate| Arc::ptr_eq(candidate, self.vocab()))
            .ok_or(FieldError::VocabNotListed)?;
        let record = dumps(&(
            self.type_name(),
            self.tokenizer().setting_hash(),
            vocab_index,
            self.vocab_from(),
            self.max_sent_length(),
            self.convert_to_lower_letter(),
        ))?;
        Ok(sha256_hex(&record))
    }

    /// Assemble a padded batch for `indexes` from finalized data.
    fn get_batch(&self, data: &SentenceData, indexes: &[usize]) -> Result<SentenceBatch> {
        assemble_sentence_batch(self.vocab().as_ref(), data, indexes)
    }
}
