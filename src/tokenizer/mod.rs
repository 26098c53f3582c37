//! Tokenization Module
//!
//! Turns raw sentences into token sequences and back, behind one
//! [`Tokenizer`] capability. Implementations are either rule-based
//! ([`SimpleTokenizer`]) or backed by an external pretrained subword scheme
//! ([`PretrainedTokenizer`] over a [`SubwordBackend`]).
//!
//! Every tokenizer exposes a [`setting hash`](Tokenizer::setting_hash): a
//! stable fingerprint of its configuration that flows into the field-level
//! reproducibility fingerprints.

mod pretrained;
mod simple;
mod traits;

pub use pretrained::{PretrainedTokenizer, SubwordBackend};
#[cfg(test)]
pub(crate) use pretrained::testing as pretrained_testing;
pub use simple::{SimpleTokenizer, SplitMode};
pub use traits::{TokenId, Tokenizer};
