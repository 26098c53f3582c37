//! Scoped default resolution for field parameters.
//!
//! A dataset usually configures one tokenizer, one vocabulary and one
//! length policy for many fields. Instead of threading five optional
//! parameters through every constructor, callers push a frame of defaults
//! onto a [`FieldContext`] and construct fields inside that scope; explicit
//! per-field parameters still win over the ambient frame.
//!
//! The stack is strictly scope-shaped: [`FieldContext::scope`] returns a
//! guard that pops its frame on `Drop`, on every exit path. The context is
//! single-threaded (`RefCell`, `!Sync`); concurrent pipelines own one
//! context each.

use std::cell::RefCell;
use std::sync::Arc;

use crate::field::RoleMap;
use crate::tokenizer::Tokenizer;
use crate::vocab::Vocab;

/// Optional field parameters, used both as an ambient frame and as the
/// explicit argument set of field constructors.
#[derive(Clone, Default)]
pub struct FieldParams {
    /// Tokenizer handle.
    pub tokenizer: Option<Arc<dyn Tokenizer>>,
    /// Vocabulary handle.
    pub vocab: Option<Arc<dyn Vocab>>,
    /// Set-name to split-role mapping.
    pub vocab_from: Option<RoleMap>,
    /// Maximum sentence length; ids past it are cut.
    pub max_sent_length: Option<usize>,
    /// Lower-case tokens after tokenization.
    pub convert_to_lower_letter: Option<bool>,
}

impl FieldParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tokenizer.
    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Set the vocabulary.
    #[must_use]
    pub fn with_vocab(mut self, vocab: Arc<dyn Vocab>) -> Self {
        self.vocab = Some(vocab);
        self
    }

    /// Set the set-name to split-role mapping.
    #[must_use]
    pub fn with_vocab_from(mut self, vocab_from: RoleMap) -> Self {
        self.vocab_from = Some(vocab_from);
        self
    }

    /// Set the maximum sentence length.
    #[must_use]
    pub fn with_max_sent_length(mut self, max_sent_length: usize) -> Self {
        self.max_sent_length = Some(max_sent_length);
        self
    }

    /// Set the lower-casing flag.
    #[must_use]
    pub fn with_convert_to_lower_letter(mut self, convert: bool) -> Self {
        self.convert_to_lower_letter = Some(convert);
        self
    }
}

/// Stack-scoped resolver for ambient field parameters.
#[derive(Default)]
pub struct FieldContext {
    frames: RefCell<Vec<FieldParams>>,
}

impl FieldContext {
    /// Create a context with no active frames.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a frame of defaults; the returned guard pops it when dropped.
    #[must_use = "dropping the guard immediately closes the scope"]
    pub fn scope(&self, params: FieldParams) -> ContextGuard<'_> {
        self.frames.borrow_mut().push(params);
        ContextGuard { context: self }
    }

    /// Number of active frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Resolve one parameter: the explicit value wins, then the innermost
    /// frame that sets it. `None` means the caller's default applies (or,
    /// for required parameters, a configuration error).
    pub(crate) fn resolve<T>(
        &self,
        explicit: Option<T>,
        pick: impl Fn(&FieldParams) -> Option<T>,
    ) -> Option<T> {
        if explicit.is_some() {
            return explicit;
        }
        self.frames.borrow().iter().rev().find_map(|frame| pick(frame))
    }
}

/// Guard closing a [`FieldContext`] scope on drop.
pub struct ContextGuard<'a> {
    context: &'a FieldContext,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.context.frames.borrow_mut().pop();
    }
}
