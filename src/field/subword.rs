//! Subword/pretrained sentence field.

use std::sync::Arc;

use crate::context::{FieldContext, FieldParams};
use crate::tokenizer::{TokenId, Tokenizer};
use crate::vocab::{Vocab, VocabKind};

use super::error::{FieldError, Result};
use super::traits::{
    resolve_params, strip_special_bounds, trim_before_target, RoleMap, SentenceField,
};

/// A sentence field over a pretrained subword vocabulary.
///
/// One boundary token serves as both begin and end marker: ids are wrapped
/// as `[boundary, ..., boundary]`. Trimming must treat a boundary at
/// position 0 as the begin marker and search for the *next* occurrence as
/// the end marker; cutting at the first occurrence would always truncate
/// the sequence to nothing.
pub struct SubwordSentence {
    tokenizer: Arc<dyn Tokenizer>,
    vocab: Arc<dyn Vocab>,
    vocab_from: RoleMap,
    max_sent_length: Option<usize>,
    convert_to_lower_letter: bool,
}

impl SubwordSentence {
    /// Create a subword sentence field; parameters missing from `params`
    /// are resolved from `context`.
    ///
    /// # Errors
    /// Fails when tokenizer or vocabulary are nowhere to be found, when the
    /// resolved tokenizer is not pretrained, or when the resolved
    /// vocabulary is not a pretrained one.
    pub fn new(params: FieldParams, context: &FieldContext) -> Result<Self> {
        let resolved = resolve_params(params, context)?;
        if !resolved.tokenizer.is_pretrained() {
            return Err(FieldError::IncompatibleTokenizer("SubwordSentence"));
        }
        if resolved.vocab.kind() != VocabKind::Pretrained {
            return Err(FieldError::IncompatibleVocab {
                field: "SubwordSentence",
                expected: "pretrained",
            });
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

impl SentenceField for SubwordSentence {
    fn type_name(&self) -> &'static str {
        "SubwordSentence"
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
        let boundary = self.vocab.eos_id()?;
        let mut wrapped = Vec::with_capacity(ids.len() + 2);
        wrapped.push(boundary);
        wrapped.extend_from_slice(ids);
        wrapped.push(boundary);
        Ok(wrapped)
    }

    fn trim_in_ids(&self, ids: &[TokenId]) -> Result<Vec<TokenId>> {
        let boundary = self.vocab.eos_id()?;
        // a boundary in first position is the begin marker, not the end
        if ids.first() == Some(&boundary) {
            let mut trimmed = vec![boundary];
            trimmed.extend(trim_before_target(&ids[1..], boundary));
            Ok(trimmed)
        } else {
            Ok(trim_before_target(ids, boundary))
        }
    }

    fn remove_special_in_ids(
        &self,
        ids: &[TokenId],
        remove_special: bool,
        trim: bool,
    ) -> Result<Vec<TokenId>> {
        let boundary = self.vocab.eos_id()?;
        let mut ids = if trim { self.trim_in_ids(ids)? } else { ids.to_vec() };
        if remove_special {
            ids = strip_special_bounds(&ids, boundary, boundary);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::pretrained_testing::ToyBackend;
    use crate::tokenizer::{PretrainedTokenizer, SimpleTokenizer};
    use crate::vocab::{GeneralVocab, PretrainedVocab};

    fn field() -> Arc<SubwordSentence> {
        let backend = Arc::new(ToyBackend::new(&["I", "love", "NLP"]));
        let vocab = Arc::new(PretrainedVocab::new(backend.clone()).unwrap());
        let params = FieldParams::new()
            .with_tokenizer(Arc::new(PretrainedTokenizer::new(backend)))
            .with_vocab(vocab);
        Arc::new(SubwordSentence::new(params, &FieldContext::new()).unwrap())
    }

    #[test]
    fn test_plain_tokenizer_rejected() {
        let backend = Arc::new(ToyBackend::new(&["a"]));
        let vocab = Arc::new(PretrainedVocab::new(backend).unwrap());
        let params = FieldParams::new()
            .with_tokenizer(Arc::new(SimpleTokenizer::punct()))
            .with_vocab(vocab);
        let result = SubwordSentence::new(params, &FieldContext::new());
        assert!(matches!(result, Err(FieldError::IncompatibleTokenizer(_))));
    }

    #[test]
    fn test_closed_vocab_rejected() {
        let backend = Arc::new(ToyBackend::new(&["a"]));
        let vocab = Arc::new(GeneralVocab::with_defaults().unwrap());
        let params = FieldParams::new()
            .with_tokenizer(Arc::new(PretrainedTokenizer::new(backend)))
            .with_vocab(vocab);
        let result = SubwordSentence::new(params, &FieldContext::new());
        assert!(matches!(result, Err(FieldError::IncompatibleVocab { .. })));
    }

    #[test]
    fn test_wrap_uses_boundary_twice() {
        let field = field();
        let boundary = field.vocab().eos_id().unwrap();
        let wrapped = field.add_special_to_ids(&[1, 2]).unwrap();
        assert_eq!(wrapped, vec![boundary, 1, 2, boundary]);
        assert_eq!(field.vocab().go_id().unwrap(), boundary);
    }

    #[test]
    fn test_trim_disambiguates_leading_boundary() {
        let field = field();
        let boundary = field.vocab().eos_id().unwrap();
        let ids = vec![boundary, 1, 2, boundary];
        assert_eq!(field.trim_in_ids(&ids).unwrap(), vec![boundary, 1, 2]);
        assert_eq!(field.remove_special_in_ids(&ids, true, true).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_trim_without_leading_boundary() {
        let field = field();
        let boundary = field.vocab().eos_id().unwrap();
        let ids = vec![1, 2, boundary, 3];
        assert_eq!(field.trim_in_ids(&ids).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_trim_trailing_content_after_second_boundary() {
        let field = field();
        let boundary = field.vocab().eos_id().unwrap();
        let ids = vec![boundary, 1, boundary, 2, 3];
        assert_eq!(field.trim_in_ids(&ids).unwrap(), vec![boundary, 1]);
    }
}
