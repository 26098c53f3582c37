//! # preparar
//!
//! Reproducible dataset preparation for sequence and dialogue corpora.
//!
//! Raw line-oriented text goes in; hashed, tokenized, vocabulary-indexed,
//! special-token-wrapped, length-cut id sequences and padded batches come
//! out. Two independent runs over logically-identical data produce an
//! identical, order-independent content fingerprint, so different models
//! can be proven to have trained and evaluated on the same data.
//!
//! # Pipeline
//!
//! 1. A [`field::SentenceField`] declares policy for one dataset column:
//!    tokenizer, shared vocabulary, split-role mapping, length cut, casing.
//! 2. One content accumulator per (field, split) streams raw lines in.
//! 3. Finalizing a content hashes the raw records
//!    ([`hash::UnorderedSha256`], order-independent), tokenizes, hashes the
//!    tokenized form, and registers tokens into the vocabulary under the
//!    split's role.
//! 4. The first query freezes the vocabulary and fixes every id.
//! 5. Batches are padded rectangles with exact and frequent-masked id
//!    arrays side by side.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use preparar::context::{FieldContext, FieldParams};
//! use preparar::field::{FieldContent, FieldData, Sentence, SentenceContent, SentenceField};
//! use preparar::tokenizer::SimpleTokenizer;
//! use preparar::vocab::GeneralVocab;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let vocab = Arc::new(GeneralVocab::with_defaults()?);
//!     let context = FieldContext::new();
//!     let field = Arc::new(Sentence::new(
//!         FieldParams::new()
//!             .with_tokenizer(Arc::new(SimpleTokenizer::punct()))
//!             .with_vocab(vocab),
//!         &context,
//!     )?);
//!
//!     let mut content = SentenceContent::new(field.clone(), "train")?;
//!     let mut lines = ["I love NLP.", "Yes I do"].iter().map(|s| s.to_string());
//!     while content.read_next(&mut lines)? > 0 {}
//!     content.finalize()?;
//!
//!     let FieldData::Sentence(data) = content.data()? else { unreachable!() };
//!     let batch = field.get_batch(&data, &[0, 1])?;
//!     assert_eq!(batch.all_vocab_ids.nrows(), 2);
//!     println!("raw data hash: {}", content.raw_data_hash()?);
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod field;
pub mod hash;
pub mod tokenizer;
pub mod vocab;

pub use context::{ContextGuard, FieldContext, FieldParams};
pub use field::{
    default_vocab_from, FieldContent, FieldData, FieldError, ProcessOptions, RoleMap, Sentence,
    SentenceBatch, SentenceContent, SentenceData, SentenceField, SentenceInput, Session,
    SessionBatch, SessionContent, SessionData, SubwordSentence,
};
pub use hash::UnorderedSha256;
pub use tokenizer::{
    PretrainedTokenizer, SimpleTokenizer, SplitMode, SubwordBackend, TokenId, Tokenizer,
};
pub use vocab::{
    GeneralVocab, GeneralVocabConfig, PretrainedVocab, SpecialTokens, Vocab, VocabError, VocabKind,
    VocabRole,
};
