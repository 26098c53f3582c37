//! Closed vocabulary built from corpus statistics.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::error::{Result, VocabError};
use super::traits::{Vocab, VocabKind, VocabRole};
use crate::tokenizer::TokenId;

/// Special tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    /// Padding token
    pub pad: String,
    /// Unknown token
    pub unk: String,
    /// Sequence begin token
    pub go: String,
    /// Sequence end token
    pub eos: String,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            pad: "<pad>".to_string(),
            unk: "<unk>".to_string(),
            go: "<go>".to_string(),
            eos: "<eos>".to_string(),
        }
    }
}

impl SpecialTokens {
    fn contains(&self, token: &str) -> bool {
        token == self.pad || token == self.unk || token == self.go || token == self.eos
    }
}

/// Closed-vocabulary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralVocabConfig {
    /// Minimum train-split count for a token to enter the frequent section
    pub min_frequent_count: usize,
    /// Minimum total count for a token to enter the rare section
    pub min_rare_count: usize,
    /// Special tokens
    pub special_tokens: SpecialTokens,
}

impl Default for GeneralVocabConfig {
    fn default() -> Self {
        Self { min_frequent_count: 0, min_rare_count: 0, special_tokens: SpecialTokens::default() }
    }
}

impl GeneralVocabConfig {
    /// Set the minimum train-split count for frequent membership.
    #[must_use]
    pub fn with_min_frequent_count(mut self, count: usize) -> Self {
        self.min_frequent_count = count;
        self
    }

    /// Set the minimum total count for rare membership.
    #[must_use]
    pub fn with_min_rare_count(mut self, count: usize) -> Self {
        self.min_rare_count = count;
        self
    }

    /// Replace the special tokens.
    #[must_use]
    pub fn with_special_tokens(mut self, special_tokens: SpecialTokens) -> Self {
        self.special_tokens = special_tokens;
        self
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct TokenStat {
    train: usize,
    test: usize,
    extra: usize,
}

impl TokenStat {
    fn count(&mut self, role: VocabRole) {
        match role {
            VocabRole::Train => self.train += 1,
            VocabRole::Test => self.test += 1,
            VocabRole::Extra => self.extra += 1,
        }
    }

    fn total(&self) -> usize {
        self.train + self.test + self.extra
    }

    fn best_role(&self) -> VocabRole {
        if self.train > 0 {
            VocabRole::Train
        } else if self.test > 0 {
            VocabRole::Test
        } else {
            VocabRole::Extra
        }
    }
}

#[derive(Debug)]
enum VocabState {
    Building(HashMap<String, TokenStat>),
    Frozen(FrozenVocab),
}

#[derive(Debug)]
struct FrozenVocab {
    list: Vec<String>,
    index: HashMap<String, TokenId>,
    frequent_size: usize,
}

const PAD_ID: TokenId = 0;
const UNK_ID: TokenId = 1;
const GO_ID: TokenId = 2;
const EOS_ID: TokenId = 3;

impl FrozenVocab {
    fn build(stats: &HashMap<String, TokenStat>, config: &GeneralVocabConfig) -> Result<Self> {
        if stats.is_empty() {
            return Err(VocabError::Empty);
        }

        let mut frequent: Vec<(&str, usize)> = stats
            .iter()
            .filter(|(_, stat)| stat.train > 0 && stat.train >= config.min_frequent_count)
            .map(|(token, stat)| (token.as_str(), stat.train))
            .collect();
        // frequency descending; lexicographic tie-break keeps id assignment
        // invariant under add_tokens call order
        frequent.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let frequent_set: std::collections::HashSet<&str> =
            frequent.iter().map(|(token, _)| *token).collect();
        let mut rare: Vec<(&str, VocabRole, usize)> = stats
            .iter()
            .filter(|(token, _)| !frequent_set.contains(token.as_str()))
            .filter(|(_, stat)| stat.total() >= config.min_rare_count)
            .map(|(token, stat)| (token.as_str(), stat.best_role(), stat.total()))
            .collect();
        rare.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| b.2.cmp(&a.2)).then_with(|| a.0.cmp(b.0)));

        let special = &config.special_tokens;
        let mut list: Vec<String> = vec![
            special.pad.clone(),
            special.unk.clone(),
            special.go.clone(),
            special.eos.clone(),
        ];
        let frequent_size = list.len() + frequent.len();
        list.extend(frequent.into_iter().map(|(token, _)| token.to_string()));
        list.extend(rare.into_iter().map(|(token, _, _)| token.to_string()));

        let index = list
            .iter()
            .enumerate()
            .map(|(id, token)| (token.clone(), id as TokenId))
            .collect();

        Ok(Self { list, index, frequent_size })
    }
}

/// Closed vocabulary with a frequent/rare split.
///
/// Shared between fields through `Arc`; interior state moves from
/// `Building` (frequency counters per split role) to `Frozen` (fixed
/// token↔id table) on the first query. Ids `0..4` are reserved for
/// pad/unk/go/eos; train-role tokens fill the frequent section, everything
/// else only the rare section.
#[derive(Debug)]
pub struct GeneralVocab {
    config: GeneralVocabConfig,
    state: Mutex<VocabState>,
}

impl GeneralVocab {
    /// Create an empty building-phase vocabulary.
    ///
    /// # Errors
    /// Fails if the configured pad and unk tokens collide.
    pub fn new(config: GeneralVocabConfig) -> Result<Self> {
        if config.special_tokens.pad == config.special_tokens.unk {
            return Err(VocabError::SpecialTokenClash(config.special_tokens.pad));
        }
        Ok(Self { config, state: Mutex::new(VocabState::Building(HashMap::new())) })
    }

    /// Create a vocabulary with default configuration.
    ///
    /// # Errors
    /// Never fails for the default special tokens; kept fallible for
    /// symmetry with [`GeneralVocab::new`].
    pub fn with_defaults() -> Result<Self> {
        Self::new(GeneralVocabConfig::default())
    }

    /// The configuration this vocabulary was created with.
    #[must_use]
    pub fn config(&self) -> &GeneralVocabConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, VocabState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Freeze on first query, then run `f` against the frozen table.
    fn with_frozen<R>(&self, f: impl FnOnce(&FrozenVocab) -> Result<R>) -> Result<R> {
        let mut state = self.state();
        let frozen = match &*state {
            VocabState::Building(stats) => Some(FrozenVocab::build(stats, &self.config)?),
            VocabState::Frozen(_) => None,
        };
        if let Some(frozen) = frozen {
            *state = VocabState::Frozen(frozen);
        }
        match &*state {
            VocabState::Frozen(frozen) => f(frozen),
            VocabState::Building(_) => unreachable!("state was just frozen"),
        }
    }
}

impl Vocab for GeneralVocab {
    fn kind(&self) -> VocabKind {
        VocabKind::Closed
    }

    fn add_tokens(&self, tokens: &[String], role: VocabRole) -> Result<()> {
        let mut state = self.state();
        match &mut *state {
            VocabState::Building(stats) => {
                for token in tokens {
                    if self.config.special_tokens.contains(token) {
                        continue;
                    }
                    stats.entry(token.clone()).or_default().count(role);
                }
                Ok(())
            }
            VocabState::Frozen(_) => Err(VocabError::AlreadyBuilt),
        }
    }

    fn convert_tokens_to_ids(
        &self,
        tokens: &[String],
        only_frequent_word: bool,
    ) -> Result<Vec<TokenId>> {
        self.with_frozen(|frozen| {
            Ok(tokens
                .iter()
                .map(|token| match frozen.index.get(token) {
                    Some(&id) if only_frequent_word && id as usize >= frozen.frequent_size => {
                        UNK_ID
                    }
                    Some(&id) => id,
                    None => UNK_ID,
                })
                .collect())
        })
    }

    fn convert_ids_to_tokens(&self, ids: &[TokenId]) -> Result<Vec<String>> {
        self.with_frozen(|frozen| {
            ids.iter()
                .map(|&id| {
                    frozen
                        .list
                        .get(id as usize)
                        .cloned()
                        .ok_or(VocabError::InvalidId(id, frozen.list.len()))
                })
                .collect()
        })
    }

    fn frequent_vocab_size(&self) -> Result<usize> {
        self.with_frozen(|frozen| Ok(frozen.frequent_size))
    }

    fn all_vocab_size(&self) -> Result<usize> {
        self.with_frozen(|frozen| Ok(frozen.list.len()))
    }

    fn pad_id(&self) -> Result<TokenId> {
        self.with_frozen(|_| Ok(PAD_ID))
    }

    fn unk_id(&self) -> Result<TokenId> {
        self.with_frozen(|_| Ok(UNK_ID))
    }

    fn go_id(&self) -> Result<TokenId> {
        self.with_frozen(|_| Ok(GO_ID))
    }

    fn eos_id(&self) -> Result<TokenId> {
        self.with_frozen(|_| Ok(EOS_ID))
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_tokens() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-d]{1,3}", 1..24)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_freeze_invariant_under_call_order(batches in prop::collection::vec(arb_tokens(), 1..5)) {
            let forward = GeneralVocab::with_defaults().unwrap();
            for batch in &batches {
                forward.add_tokens(batch, VocabRole::Train).unwrap();
            }

            let backward = GeneralVocab::with_defaults().unwrap();
            for batch in batches.iter().rev() {
                backward.add_tokens(batch, VocabRole::Train).unwrap();
            }

            let mut probe: Vec<String> = batches.concat();
            probe.sort();
            probe.dedup();
            prop_assert_eq!(
                forward.convert_tokens_to_ids(&probe, false).unwrap(),
                backward.convert_tokens_to_ids(&probe, false).unwrap()
            );
        }

        #[test]
        fn prop_all_ids_in_range(words in arb_tokens()) {
            let vocab = GeneralVocab::with_defaults().unwrap();
            vocab.add_tokens(&words, VocabRole::Train).unwrap();
            let ids = vocab.convert_tokens_to_ids(&words, false).unwrap();
            let size = vocab.all_vocab_size().unwrap();
            for id in ids {
                prop_assert!((id as usize) < size);
            }
        }
    }
}
