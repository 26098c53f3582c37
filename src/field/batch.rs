//! Padded batch assembly.
//!
//! Variable-length id sequences are copied left-aligned into rectangles
//! filled with the vocabulary's pad id. Every batch carries two id arrays:
//! `all_vocab_ids` keeps the exact ids for evaluation, `ids` replaces
//! everything at or beyond the frequent-vocabulary boundary with unk for
//! use as generation targets. For pretrained vocabularies the two are
//! identical (the frequent boundary equals the full size).

use ndarray::{Array1, Array2, Array3};

use crate::tokenizer::TokenId;
use crate::vocab::Vocab;

use super::content::{SentenceData, SessionData};
use super::error::{FieldError, Result};

/// A padded sentence batch.
#[derive(Debug, Clone)]
pub struct SentenceBatch {
    /// Frequent-masked ids, `[batch, length]`.
    pub ids: Array2<TokenId>,
    /// Exact ids, `[batch, length]`.
    pub all_vocab_ids: Array2<TokenId>,
    /// Unpadded length of each row.
    pub lengths: Array1<usize>,
    /// Original untokenized sentences for the same indexes.
    pub strings: Vec<String>,
}

/// A padded session batch.
#[derive(Debug, Clone)]
pub struct SessionBatch {
    /// Frequent-masked ids, `[batch, turn, length]`.
    pub ids: Array3<TokenId>,
    /// Exact ids, `[batch, turn, length]`.
    pub all_vocab_ids: Array3<TokenId>,
    /// Number of turns in each selected session.
    pub turn_lengths: Array1<usize>,
    /// Unpadded length of each turn, `[batch, turn]` (0 for absent turns).
    pub sent_lengths: Array2<usize>,
    /// Original untokenized turns for the same indexes.
    pub strings: Vec<Vec<String>>,
}

fn check_indexes(indexes: &[usize], len: usize) -> Result<()> {
    for &index in indexes {
        if index >= len {
            return Err(FieldError::IndexOutOfRange { index, len });
        }
    }
    Ok(())
}

fn mask_frequent(id: TokenId, frequent_size: usize, unk: TokenId) -> TokenId {
    if id as usize >= frequent_size {
        unk
    } else {
        id
    }
}

pub(crate) fn assemble_sentence_batch(
    vocab: &dyn Vocab,
    data: &SentenceData,
    indexes: &[usize],
) -> Result<SentenceBatch> {
    check_indexes(indexes, data.ids.len())?;
    let pad = vocab.pad_id()?;
    let unk = vocab.unk_id()?;
    let frequent_size = vocab.frequent_vocab_size()?;

    let lengths: Vec<usize> = indexes.iter().map(|&index| data.ids[index].len()).collect();
    let width = lengths.iter().copied().max().unwrap_or(0);

    let mut all_vocab_ids = Array2::from_elem((indexes.len(), width), pad);
    for (row, &index) in indexes.iter().enumerate() {
        for (col, &id) in data.ids[index].iter().enumerate() {
            all_vocab_ids[[row, col]] = id;
        }
    }
    let ids = all_vocab_ids.mapv(|id| mask_frequent(id, frequent_size, unk));

    Ok(SentenceBatch {
        ids,
        all_vocab_ids,
        lengths: Array1::from_vec(lengths),
        strings: indexes.iter().map(|&index| data.strings[index].clone()).collect(),
    })
}

pub(crate) fn assemble_session_batch(
    vocab: &dyn Vocab,
    data: &SessionData,
    indexes: &[usize],
) -> Result<SessionBatch> {
    check_indexes(indexes, data.ids.len())?;
    let pad = vocab.pad_id()?;
    let unk = vocab.unk_id()?;
    let frequent_size = vocab.frequent_vocab_size()?;

    let turn_lengths: Vec<usize> = indexes.iter().map(|&index| data.ids[index].len()).collect();
    let max_turns = turn_lengths.iter().copied().max().unwrap_or(0);
    let width = indexes
        .iter()
        .flat_map(|&index| data.ids[index].iter().map(Vec::len))
        .max()
        .unwrap_or(0);

    let mut all_vocab_ids = Array3::from_elem((indexes.len(), max_turns, width), pad);
    let mut sent_lengths = Array2::zeros((indexes.len(), max_turns));
    for (row, &index) in indexes.iter().enumerate() {
        for (turn, sentence) in data.ids[index].iter().enumerate() {
            sent_lengths[[row, turn]] = sentence.len();
            for (col, &id) in sentence.iter().enumerate() {
                all_vocab_ids[[row, turn, col]] = id;
            }
        }
    }
    let ids = all_vocab_ids.mapv(|id| mask_frequent(id, frequent_size, unk));

    Ok(SessionBatch {
        ids,
        all_vocab_ids,
        turn_lengths: Array1::from_vec(turn_lengths),
        sent_lengths,
        strings: indexes.iter().map(|&index| data.strings[index].clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{GeneralVocab, VocabRole};

    fn vocab_with(words: &[&str]) -> GeneralVocab {
        let vocab = GeneralVocab::with_defaults().unwrap();
        let tokens: Vec<String> = words.iter().map(|w| (*w).to_string()).collect();
        vocab.add_tokens(&tokens, VocabRole::Train).unwrap();
        vocab
    }

    #[test]
    fn test_sentence_batch_shapes_and_padding() {
        let vocab = vocab_with(&["a", "b", "c"]);
        let data = SentenceData {
            ids: vec![vec![2, 4, 5, 3], vec![2, 4, 3], vec![2, 6, 3]],
            strings: vec!["a b".to_string(), "a".to_string(), "c".to_string()],
        };

        let batch = assemble_sentence_batch(&vocab, &data, &[0, 1]).unwrap();
        assert_eq!(batch.all_vocab_ids.shape(), &[2, 4]);
        assert_eq!(batch.lengths.to_vec(), vec![4, 3]);
        assert_eq!(batch.all_vocab_ids.row(1).to_vec(), vec![2, 4, 3, 0]);
        assert_eq!(batch.strings, vec!["a b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_sentence_batch_frequent_masking() {
        let vocab = vocab_with(&["seen"]);
        vocab
            .add_tokens(&["rareword".to_string()], VocabRole::Test)
            .unwrap();
        let frequent_size = vocab.frequent_vocab_size().unwrap();
        let rare_id = vocab
            .convert_tokens_to_ids(&["rareword".to_string()], false)
            .unwrap()[0];
        assert!(rare_id as usize >= frequent_size);

        let data = SentenceData {
            ids: vec![vec![2, rare_id, 3]],
            strings: vec!["rareword".to_string()],
        };
        let batch = assemble_sentence_batch(&vocab, &data, &[0]).unwrap();
        assert_eq!(batch.all_vocab_ids[[0, 1]], rare_id);
        assert_eq!(batch.ids[[0, 1]], vocab.unk_id().unwrap());
        // ids inside the frequent range are untouched
        assert_eq!(batch.ids[[0, 0]], 2);
    }

    #[test]
    fn test_sentence_batch_out_of_range() {
        let vocab = vocab_with(&["a"]);
        let data = SentenceData { ids: vec![vec![2, 3]], strings: vec!["a".to_string()] };
        let result = assemble_sentence_batch(&vocab, &data, &[0, 7]);
        assert!(matches!(result, Err(FieldError::IndexOutOfRange { index: 7, len: 1 })));
    }

    #[test]
    fn test_sentence_batch_empty_indexes() {
        let vocab = vocab_with(&["a"]);
        let data = SentenceData { ids: vec![vec![2, 3]], strings: vec!["a".to_string()] };
        let batch = assemble_sentence_batch(&vocab, &data, &[]).unwrap();
        assert_eq!(batch.all_vocab_ids.shape(), &[0, 0]);
        assert!(batch.strings.is_empty());
    }

    #[test]
    fn test_sentence_batch_repeated_indexes() {
        let vocab = vocab_with(&["a"]);
        let data = SentenceData { ids: vec![vec![2, 4, 3]], strings: vec!["a".to_string()] };
        let batch = assemble_sentence_batch(&vocab, &data, &[0, 0]).unwrap();
        assert_eq!(batch.all_vocab_ids.row(0), batch.all_vocab_ids.row(1));
    }

    #[test]
    fn test_session_batch_cube() {
        let vocab = vocab_with(&["a", "b"]);
        let data = SessionData {
            ids: vec![
                vec![vec![2, 4, 3], vec![2, 5, 3]],
                vec![vec![2, 4, 5, 3]],
            ],
            strings: vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["a b".to_string()],
            ],
        };

        let batch = assemble_session_batch(&vocab, &data, &[0, 1]).unwrap();
        assert_eq!(batch.all_vocab_ids.shape(), &[2, 2, 4]);
        assert_eq!(batch.turn_lengths.to_vec(), vec![2, 1]);
        assert_eq!(batch.sent_lengths[[0, 0]], 3);
        assert_eq!(batch.sent_lengths[[1, 1]], 0);
        // second session has one turn; the absent turn is all padding
        let pad = vocab.pad_id().unwrap();
        for col in 0..4 {
            assert_eq!(batch.all_vocab_ids[[1, 1, col]], pad);
        }
    }
}
