//! Tokenizer trait definition.

/// Token ID type
pub type TokenId = u32;

/// Tokenizer trait
///
/// Implementations turn raw sentences into token sequences and back. The
/// reverse direction is best-effort: callers must not assume it inverts
/// tokenization exactly, nor that tokens map 1:1 to characters.
pub trait Tokenizer: Send + Sync {
    /// Split one sentence into tokens.
    fn tokenize(&self, sentence: &str) -> Vec<String>;

    /// Tokenize a batch of sentences.
    fn tokenize_sentences(&self, sentences: &[String]) -> Vec<Vec<String>> {
        sentences.iter().map(|sentence| self.tokenize(sentence)).collect()
    }

    /// Join tokens back into a sentence (best effort).
    fn convert_tokens_to_sentence(&self, tokens: &[String]) -> String;

    /// Stable fingerprint of the tokenizer settings.
    ///
    /// Identical configuration yields an identical fingerprint across
    /// processes and machines.
    fn setting_hash(&self) -> &str;

    /// Whether this tokenizer is backed by a pretrained subword scheme.
    fn is_pretrained(&self) -> bool {
        false
    }
}
