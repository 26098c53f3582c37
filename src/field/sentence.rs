//! Closed-vocabulary sentence field.

use std::sync::Arc;

use crate::context::{FieldContext, FieldParams};
use crate::tokenizer::{TokenId, Tokenizer};
use crate::vocab::{Vocab, VocabKind};

use super::error::{FieldError, Result};
use super::traits::{
    resolve_params, strip_special_bounds, trim_before_target, RoleMap, SentenceField,
};

pub(crate) fn closed_add_special(vocab: &dyn Vocab, ids: &[TokenId]) -> Result<Vec<TokenId>> {
    let mut wrapped = Vec::with_capacity(ids.len() + 2);
    wrapped.push(vocab.go_id()?);
    wrapped.extend_from_slice(ids);
    wrapped.push(vocab.eos_id()?);
    Ok(wrapped)
}

pub(crate) fn closed_trim(vocab: &dyn Vocab, ids: &[TokenId]) -> Result<Vec<TokenId>> {
    let mut ids = trim_before_target(ids, vocab.eos_id()?);
    let pad = vocab.pad_id()?;
    while ids.last() == Some(&pad) {
        ids.pop();
    }
    Ok(ids)
}

pub(crate) fn closed_remove_special(
    vocab: &dyn Vocab,
    ids: &[TokenId],
    remove_special: bool,
    trim: bool,
) -> Result<Vec<TokenId>> {
    let mut ids = if trim { closed_trim(vocab, ids)? } else { ids.to_vec() };
    if remove_special {
        ids = strip_special_bounds(&ids, vocab.go_id()?, vocab.eos_id()?);
    }
    Ok(ids)
}

/// A sentence field over a closed vocabulary.
///
/// Ids are wrapped as `[go, ..., eos]`; trimming for output cuts before
/// the first eos and strips trailing padding.
pub struct Sentence {
    tokenizer: Arc<dyn Tokenizer>,
    vocab: Arc<dyn Vocab>,
    vocab_from: RoleMap,
    max_sent_length: Option<usize>,
    convert_to_lower_letter: bool,
}

impl Sentence {
    /// Create a sentence field; parameters missing from `params` are
    /// resolved from `context`.
    ///
    /// # Errors
    /// Fails when tokenizer or vocabulary are nowhere to be found, or when
    /// the resolved vocabulary is not a closed one.
    pub fn new(params: FieldParams, context: &FieldContext) -> Result<Self> {
        let resolved = resolve_params(params, context)?;
        if resolved.vocab.kind() != VocabKind::Closed {
            return Err(FieldError::IncompatibleVocab { field: "Sentence", expected: "closed" });
        }
        Ok(Self {
            tokenizer: resolved.tokenizer,
            vocab: resolved.vocab,
            vocab_from: resolved.vocab_from,
            max_sent_length: resolved.max_sent_length,
            convert_to_lower_letter: resolved.convert_to_lower_letter,
        })
    }
}

impl SentenceField for Sentence {
    fn type_name(&self) -> &'static str {
        "Sentence"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::SimpleTokenizer;
    use crate::vocab::{GeneralVocab, VocabRole};

    fn field() -> Arc<Sentence> {
        let vocab = Arc::new(GeneralVocab::with_defaults().unwrap());
        let words: Vec<String> =
            ["I", "love", "NLP", "."].iter().map(|w| (*w).to_string()).collect();
        vocab.add_tokens(&words, VocabRole::Train).unwrap();
        let params = FieldParams::new()
            .with_tokenizer(Arc::new(SimpleTokenizer::punct()))
            .with_vocab(vocab);
        Arc::new(Sentence::new(params, &FieldContext::new()).unwrap())
    }

    #[test]
    fn test_missing_tokenizer_is_config_error() {
        let vocab = Arc::new(GeneralVocab::with_defaults().unwrap());
        let params = FieldParams::new().with_vocab(vocab);
        let result = Sentence::new(params, &FieldContext::new());
        assert!(matches!(result, Err(FieldError::MissingParameter("tokenizer"))));
    }

    #[test]
    fn test_pretrained_vocab_rejected() {
        use crate::tokenizer::pretrained_testing::ToyBackend;
        use crate::vocab::PretrainedVocab;

        let backend = Arc::new(ToyBackend::new(&["a"]));
        let vocab = Arc::new(PretrainedVocab::new(backend).unwrap());
        let params = FieldParams::new()
            .with_tokenizer(Arc::new(SimpleTokenizer::punct()))
            .with_vocab(vocab);
        let result = Sentence::new(params, &FieldContext::new());
        assert!(matches!(result, Err(FieldError::IncompatibleVocab { .. })));
    }

    #[test]
    fn test_ambient_parameters_from_context() {
        let vocab: Arc<dyn Vocab> = Arc::new(GeneralVocab::with_defaults().unwrap());
        let context = FieldContext::new();
        let _guard = context.scope(
            FieldParams::new()
                .with_tokenizer(Arc::new(SimpleTokenizer::punct()))
                .with_vocab(vocab)
                .with_max_sent_length(8),
        );
        let field = Sentence::new(FieldParams::new(), &context).unwrap();
        assert_eq!(field.max_sent_length(), Some(8));
    }

    #[test]
    fn test_special_token_roundtrip() {
        let field = field();
        let vocab = field.vocab().clone();
        let tokens: Vec<String> =
            ["I", "love", "NLP", "."].iter().map(|w| (*w).to_string()).collect();
        let ids = vocab.convert_tokens_to_ids(&tokens, false).unwrap();

        let wrapped = field.add_special_to_ids(&ids).unwrap();
        assert_eq!(wrapped.len(), ids.len() + 2);
        assert_eq!(wrapped[0], vocab.go_id().unwrap());
        assert_eq!(*wrapped.last().unwrap(), vocab.eos_id().unwrap());

        let restored = field.remove_special_in_ids(&wrapped, true, true).unwrap();
        assert_eq!(restored, ids);
    }

    #[test]
    fn test_trim_strips_padding_after_eos() {
        let field = field();
        let vocab = field.vocab().clone();
        let go = vocab.go_id().unwrap();
        let eos = vocab.eos_id().unwrap();
        let pad = vocab.pad_id().unwrap();

        let ids = vec![go, 4, 5, eos, pad, pad];
        assert_eq!(field.trim_in_ids(&ids).unwrap(), vec![go, 4, 5]);
    }

    #[test]
    fn test_trim_without_eos_strips_trailing_pads_only() {
        let field = field();
        let pad = field.vocab().pad_id().unwrap();
        let ids = vec![4, 5, pad];
        assert_eq!(field.trim_in_ids(&ids).unwrap(), vec![4, 5]);
    }

    #[test]
    fn test_unknown_set_name() {
        use super::super::content::SentenceContent;

        let field = field();
        assert!(matches!(
            SentenceContent::new(field, "nonexistent"),
            Err(FieldError::UnknownSetName(_))
        ));
    }
}
