//! Pretrained subword tokenizer integration.
//!
//! The crate does not implement subword algorithms itself: an external
//! backend (a GPT-2 style BPE, a WordPiece implementation, ...) is plugged
//! in behind [`SubwordBackend`] and wrapped by [`PretrainedTokenizer`].

use std::sync::Arc;

use super::traits::{TokenId, Tokenizer};
use crate::hash::sha256_hex;

/// External pretrained tokenizer backend.
///
/// Implementations own a fixed vocabulary and a subword segmentation. The
/// pipeline only ever calls tokenize/detokenize/lookup; it never inspects
/// merge tables or model files.
pub trait SubwordBackend: Send + Sync {
    /// Identifier of the backend scheme, e.g. `"gpt2"`.
    fn backend_name(&self) -> &str;

    /// Segment one sentence into subword tokens.
    fn tokenize(&self, sentence: &str) -> Vec<String>;

    /// Join subword tokens back into a sentence.
    fn convert_tokens_to_sentence(&self, tokens: &[String]) -> String;

    /// Id of a token, if present in the backend vocabulary.
    fn token_to_id(&self, token: &str) -> Option<TokenId>;

    /// Token for an id, if the id is in range.
    fn id_to_token(&self, id: TokenId) -> Option<String>;

    /// Size of the backend vocabulary.
    fn vocab_size(&self) -> usize;

    /// Token standing in for unknown input.
    fn unk_token(&self) -> &str;

    /// Boundary token serving as both sequence begin and sequence end.
    fn boundary_token(&self) -> &str;
}

/// Tokenizer backed by a pretrained subword scheme.
#[derive(Clone)]
pub struct PretrainedTokenizer {
    backend: Arc<dyn SubwordBackend>,
    setting_hash: String,
}

impl PretrainedTokenizer {
    /// Wrap a subword backend.
    #[must_use]
    pub fn new(backend: Arc<dyn SubwordBackend>) -> Self {
        let mut settings = Vec::from(&b"PretrainedTokenizer\0"[..]);
        settings.extend_from_slice(backend.backend_name().as_bytes());
        settings.push(0);
        settings.extend_from_slice(backend.vocab_size().to_string().as_bytes());
        Self { setting_hash: sha256_hex(&settings), backend }
    }

    /// The wrapped backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn SubwordBackend> {
        &self.backend
    }
}

impl Tokenizer for PretrainedTokenizer {
    fn tokenize(&self, sentence: &str) -> Vec<String> {
        self.backend.tokenize(sentence)
    }

    fn convert_tokens_to_sentence(&self, tokens: &[String]) -> String {
        self.backend.convert_tokens_to_sentence(tokens)
    }

    fn setting_hash(&self) -> &str {
        &self.setting_hash
    }

    fn is_pretrained(&self) -> bool {
        true
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ToyBackend;
    use super::*;

    #[test]
    fn test_pretrained_delegates_tokenize() {
        let tokenizer = PretrainedTokenizer::new(Arc::new(ToyBackend::new(&["hello", "world"])));
        assert_eq!(tokenizer.tokenize("hello world"), vec!["hello", "world"]);
    }

    #[test]
    fn test_pretrained_is_pretrained() {
        let tokenizer = PretrainedTokenizer::new(Arc::new(ToyBackend::new(&[])));
        assert!(tokenizer.is_pretrained());
    }

    #[test]
    fn test_pretrained_setting_hash_covers_backend() {
        let small = PretrainedTokenizer::new(Arc::new(ToyBackend::new(&["a"])));
        let large = PretrainedTokenizer::new(Arc::new(ToyBackend::new(&["a", "b"])));
        assert_ne!(small.setting_hash(), large.setting_hash());
        let again = PretrainedTokenizer::new(Arc::new(ToyBackend::new(&["a"])));
        assert_eq!(small.setting_hash(), again.setting_hash());
    }

    #[test]
    fn test_pretrained_detokenize() {
        let tokenizer = PretrainedTokenizer::new(Arc::new(ToyBackend::new(&["hi"])));
        let tokens = vec!["hi".to_string(), "hi".to_string()];
        assert_eq!(tokenizer.convert_tokens_to_sentence(&tokens), "hi hi");
    }
}
