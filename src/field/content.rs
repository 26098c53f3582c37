//! Per-split content accumulators.
//!
//! A content object is owned by exactly one (field, split) pair and moves
//! through two states: open (accepting ingestion) and finalized (data
//! queryable). Finalizing hashes the raw records, tokenizes them, hashes
//! the tokenized form and registers every token into the field's
//! vocabulary, in that order, exactly once.

use std::sync::Arc;

use crate::hash::{dumps, UnorderedSha256};
use crate::tokenizer::TokenId;
use crate::vocab::VocabRole;

use super::error::{FieldError, Result};
use super::session::Session;
use super::traits::{ProcessOptions, SentenceField, SentenceInput};

/// Finalized sentence data: id sequences plus the original strings.
#[derive(Debug, Clone)]
pub struct SentenceData {
    /// Id sequences, special tokens added and length cut applied.
    pub ids: Vec<Vec<TokenId>>,
    /// Original untokenized sentences, parallel to `ids`.
    pub strings: Vec<String>,
}

/// Finalized session data: per-turn id sequences plus original strings.
#[derive(Debug, Clone)]
pub struct SessionData {
    /// Per-session, per-turn id sequences.
    pub ids: Vec<Vec<Vec<TokenId>>>,
    /// Original untokenized turns, parallel to `ids`.
    pub strings: Vec<Vec<String>>,
}

/// Finalized data of any field content variant.
#[derive(Debug, Clone)]
pub enum FieldData {
    /// Data of a sentence field.
    Sentence(SentenceData),
    /// Data of a session field.
    Session(SessionData),
}

/// Content accumulator contract shared by every field variant.
pub trait FieldContent {
    /// Read the next logical record from `lines` and buffer it.
    ///
    /// Returns the number of lines consumed; `0` signals end of input (a
    /// missing or empty next record).
    ///
    /// # Errors
    /// Fails with a sequencing error after finalization.
    fn read_next(&mut self, lines: &mut dyn Iterator<Item = String>) -> Result<usize>;

    /// Hash, tokenize and register the buffered records. Runs exactly once.
    fn finalize(&mut self) -> Result<()>;

    /// Number of buffered records.
    fn data_count(&self) -> usize;

    /// Order-independent hash over the raw records.
    fn raw_data_hash(&self) -> Result<&str>;

    /// Order-independent hash over the tokenized records.
    fn data_hash(&self) -> Result<&str>;

    /// Finalized id/string data for batching.
    fn data(&self) -> Result<FieldData>;
}

struct FinalizedSentences {
    tokenized: Vec<Vec<String>>,
    raw_data_hash: String,
    data_hash: String,
}

/// Content of a sentence field: one record per line.
pub struct SentenceContent {
    field: Arc<dyn SentenceField>,
    role: VocabRole,
    original: Vec<String>,
    finalized: Option<FinalizedSentences>,
}

impl SentenceContent {
    /// Create an open content for `set_name`.
    ///
    /// # Errors
    /// Fails if `set_name` is not in the field's role mapping.
    pub fn new(field: Arc<dyn SentenceField>, set_name: &str) -> Result<Self> {
        let role = field.role_for(set_name)?;
        Ok(Self { field, role, original: Vec::new(), finalized: None })
    }

    /// The split role this content registers tokens under.
    #[must_use]
    pub fn role(&self) -> VocabRole {
        self.role
    }

    fn finalized(&self) -> Result<&FinalizedSentences> {
        self.finalized.as_ref().ok_or(FieldError::NotFinalized)
    }
}

impl FieldContent for SentenceContent {
    fn read_next(&mut self, lines: &mut dyn Iterator<Item = String>) -> Result<usize> {
        if self.finalized.is_some() {
            return Err(FieldError::AlreadyFinalized);
        }
        let Some(line) = lines.next() else {
            return Ok(0);
        };
        let sentence = line.trim_end().to_string();
        if sentence.is_empty() {
            return Ok(0);
        }
        self.original.push(sentence);
        Ok(1)
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized.is_some() {
            return Err(FieldError::AlreadyFinalized);
        }

        let mut raw_hash = UnorderedSha256::new();
        for sentence in &self.original {
            raw_hash.update_data(&dumps(sentence)?);
        }

        let tokenized = self.field.tokenize_sentences(&self.original);

        let mut data_hash = UnorderedSha256::new();
        for tokens in &tokenized {
            data_hash.update_data(&dumps(tokens)?);
        }

        let all_tokens: Vec<String> = tokenized.iter().flatten().cloned().collect();
        self.field.vocab().add_tokens(&all_tokens, self.role)?;

        self.finalized = Some(FinalizedSentences {
            tokenized,
            raw_data_hash: raw_hash.hexdigest(),
            data_hash: data_hash.hexdigest(),
        });
        Ok(())
    }

    fn data_count(&self) -> usize {
        self.original.len()
    }

    fn raw_data_hash(&self) -> Result<&str> {
        Ok(&self.finalized()?.raw_data_hash)
    }

    fn data_hash(&self) -> Result<&str> {
        Ok(&self.finalized()?.data_hash)
    }

    fn data(&self) -> Result<FieldData> {
        let finalized = self.finalized()?;
        let ids = self.field.process_sentences(
            SentenceInput::Tokenized(&finalized.tokenized),
            ProcessOptions::default(),
        )?;
        Ok(FieldData::Sentence(SentenceData { ids, strings: self.original.clone() }))
    }
}

struct FinalizedSessions {
    tokenized: Vec<Vec<Vec<String>>>,
    raw_data_hash: String,
    data_hash: String,
}

/// Content of a session field: one record per blank-line-delimited group.
pub struct SessionContent {
    field: Arc<Session>,
    role: VocabRole,
    original: Vec<Vec<String>>,
    finalized: Option<FinalizedSessions>,
}

impl SessionContent {
    /// Create an open content for `set_name`.
    ///
    /// # Errors
    /// Fails if `set_name` is not in the field's role mapping.
    pub fn new(field: Arc<Session>, set_name: &str) -> Result<Self> {
        let role = field.role_for(set_name)?;
        Ok(Self { field, role, original: Vec::new(), finalized: None })
    }

    /// The split role this content registers tokens under.
    #[must_use]
    pub fn role(&self) -> VocabRole {
        self.role
    }

    fn finalized(&self) -> Result<&FinalizedSessions> {
        self.finalized.as_ref().ok_or(FieldError::NotFinalized)
    }
}

impl FieldContent for SessionContent {
    fn read_next(&mut self, lines: &mut dyn Iterator<Item = String>) -> Result<usize> {
        if self.finalized.is_some() {
            return Err(FieldError::AlreadyFinalized);
        }
        let mut session = Vec::new();
        let mut consumed = 0;
        loop {
            let Some(line) = lines.next() else {
                break;
            };
            consumed += 1;
            let turn = line.trim_end();
            if turn.is_empty() {
                break;
            }
            session.push(turn.to_string());
        }
        if session.is_empty() {
            return Ok(0);
        }
        self.original.push(session);
        Ok(consumed)
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized.is_some() {
            return Err(FieldError::AlreadyFinalized);
        }

        let mut raw_hash = UnorderedSha256::new();
        for session in &self.original {
            raw_hash.update_data(&dumps(session)?);
        }

        let tokenized: Vec<Vec<Vec<String>>> = self
            .original
            .iter()
            .map(|session| self.field.tokenize_sentences(session))
            .collect();

        let mut data_hash = UnorderedSha256::new();
        for session in &tokenized {
            data_hash.update_data(&dumps(session)?);
        }

        let all_tokens: Vec<String> =
            tokenized.iter().flatten().flatten().cloned().collect();
        self.field.vocab().add_tokens(&all_tokens, self.role)?;

        self.finalized = Some(FinalizedSessions {
            tokenized,
            raw_data_hash: raw_hash.hexdigest(),
            data_hash: data_hash.hexdigest(),
        });
        Ok(())
    }

    fn data_count(&self) -> usize {
        self.original.len()
    }

    fn raw_data_hash(&self) -> Result<&str> {
        Ok(&self.finalized()?.raw_data_hash)
    }

    fn data_hash(&self) -> Result<&str> {
        Ok(&self.finalized()?.data_hash)
    }

    fn data(&self) -> Result<FieldData> {
        let finalized = self.finalized()?;
        let ids = finalized
            .tokenized
            .iter()
            .map(|session| {
                self.field
                    .process_sentences(SentenceInput::Tokenized(session), ProcessOptions::default())
            })
            .collect::<Result<_>>()?;
        Ok(FieldData::Session(SessionData { ids, strings: self.original.clone() }))
    }
}
