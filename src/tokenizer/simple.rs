//! Rule-based tokenizer implementation.

use serde::{Deserialize, Serialize};

use super::traits::Tokenizer;
use crate::hash::sha256_hex;

/// Splitting rule used by [`SimpleTokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Split on whitespace only.
    Space,
    /// Split on whitespace, with punctuation runs as separate tokens.
    Punct,
}

/// Rule-based tokenizer (no learned state).
///
/// `Punct` mode emits maximal runs of word characters and maximal runs of
/// non-word, non-space characters, so `"I love NLP."` becomes
/// `["I", "love", "NLP", "."]`.
#[derive(Debug, Clone)]
pub struct SimpleTokenizer {
    mode: SplitMode,
    setting_hash: String,
}

impl SimpleTokenizer {
    /// Create a tokenizer with the given splitting rule.
    #[must_use]
    pub fn new(mode: SplitMode) -> Self {
        let mode_name = match mode {
            SplitMode::Space => "space",
            SplitMode::Punct => "punct",
        };
        let mut settings = Vec::from(&b"SimpleTokenizer\0"[..]);
        settings.extend_from_slice(mode_name.as_bytes());
        Self { mode, setting_hash: sha256_hex(&settings) }
    }

    /// Create a whitespace tokenizer.
    #[must_use]
    pub fn space() -> Self {
        Self::new(SplitMode::Space)
    }

    /// Create a whitespace-and-punctuation tokenizer.
    #[must_use]
    pub fn punct() -> Self {
        Self::new(SplitMode::Punct)
    }

    /// The splitting rule in use.
    #[must_use]
    pub fn mode(&self) -> SplitMode {
        self.mode
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, sentence: &str) -> Vec<String> {
        match self.mode {
            SplitMode::Space => sentence.split_whitespace().map(str::to_string).collect(),
            SplitMode::Punct => {
                let mut tokens = Vec::new();
                let mut current = String::new();
                let mut current_is_word = false;
                for ch in sentence.chars() {
                    if ch.is_whitespace() {
                        if !current.is_empty() {
                            tokens.push(std::mem::take(&mut current));
                        }
                        continue;
                    }
                    let word = is_word_char(ch);
                    if !current.is_empty() && word != current_is_word {
                        tokens.push(std::mem::take(&mut current));
                    }
                    current_is_word = word;
                    current.push(ch);
                }
                if !current.is_empty() {
                    tokens.push(current);
                }
                tokens
            }
        }
    }

    fn convert_tokens_to_sentence(&self, tokens: &[String]) -> String {
        match self.mode {
            SplitMode::Space => tokens.join(" "),
            SplitMode::Punct => {
                let mut sentence = String::new();
                for token in tokens {
                    let punct = token.chars().next().is_some_and(|ch| !is_word_char(ch));
                    if !sentence.is_empty() && !punct {
                        sentence.push(' ');
                    }
                    sentence.push_str(token);
                }
                sentence
            }
        }
    }

    fn setting_hash(&self) -> &str {
        &self.setting_hash
    }
}
