//! Vocabulary Module
//!
//! Accumulates token statistics tagged by split role, freezes into a
//! token↔id table on first query, and converts between tokens and ids with
//! the special-token conventions of the chosen variant:
//!
//! - [`GeneralVocab`] - closed vocabulary with distinct pad/unk/go/eos ids
//!   and a frequent/rare split driven by train-split frequencies
//! - [`PretrainedVocab`] - backend-defined vocabulary where one boundary
//!   token serves as begin, end and padding
//!
//! Handles are shared: several fields referencing one vocabulary build it
//! together before the first query freezes it.

mod error;
mod general;
mod pretrained;
mod traits;

pub use error::{Result, VocabError};
pub use general::{GeneralVocab, GeneralVocabConfig, SpecialTokens};
pub use pretrained::PretrainedVocab;
pub use traits::{Vocab, VocabKind, VocabRole};
