use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::{log10_to_ln, trim_delimiters, Scorer};
use crate::config::ScorerConfig;
use crate::decoder::Prefix;
use crate::lm::{conditional_log10, read_unigram_vocabulary, ArpaModel, LanguageModel, LmError};

/// Word n-gram scorer.
///
/// A word is scored when the delimiter that completes it is appended, and
/// once more at the end for an unterminated trailing word. Hypotheses whose
/// last partial word does not begin any known word are pruned.
pub struct WordLmScorer {
    lm: Box<dyn LanguageModel>,
    /// Valid word prefixes grouped by their length in characters.
    word_prefixes: HashMap<usize, HashSet<String>>,
    config: ScorerConfig,
}

impl WordLmScorer {
    pub fn from_arpa<P: AsRef<Path>>(path: P, config: ScorerConfig) -> Result<Self, LmError> {
        let lm = ArpaModel::from_file(path.as_ref())?;
        let words = read_unigram_vocabulary(path.as_ref())?;
        Ok(Self::new(Box::new(lm), words, config))
    }

    /// `words` seeds the valid-prefix index; out-of-vocabulary checks ask `lm`.
    pub fn new(lm: Box<dyn LanguageModel>, words: HashSet<String>, config: ScorerConfig) -> Self {
        let word_prefixes = build_word_prefixes(&words);
        log::debug!(
            "Word scorer ready: {} words, alpha={}, beta={}",
            words.len(),
            config.alpha,
            config.beta
        );
        Self {
            lm,
            word_prefixes,
            config,
        }
    }

    /// log10 probability of the last word of `words` given its predecessors,
    /// or the OOV penalty if any word in the LM window is unknown.
    pub fn cond_log_prob(&self, words: &[&str]) -> f32 {
        let window = &words[words.len().saturating_sub(self.lm.order())..];
        if window.iter().any(|w| !self.lm.contains(w)) {
            return self.config.oov_penalty;
        }
        conditional_log10(self.lm.as_ref(), window)
    }

    fn split_words<'v>(&self, value: &'v str) -> Vec<&'v str> {
        let delimiter = self.config.word_delimiter.as_str();
        trim_delimiters(value, delimiter).split(delimiter).collect()
    }

    fn weighted_score(&self, value: &str) -> f32 {
        let cond = self.cond_log_prob(&self.split_words(value));
        log10_to_ln(cond * self.config.alpha + self.config.beta)
    }

    fn ends_word(&self, prefix: &Prefix) -> bool {
        prefix.last_symbol.as_deref() == Some(self.config.word_delimiter.as_str())
    }
}

fn build_word_prefixes(words: &HashSet<String>) -> HashMap<usize, HashSet<String>> {
    let mut prefixes: HashMap<usize, HashSet<String>> = HashMap::new();
    for word in words {
        let mut len = 0;
        for (idx, c) in word.char_indices() {
            len += 1;
            prefixes
                .entry(len)
                .or_default()
                .insert(word[..idx + c.len_utf8()].to_string());
        }
    }
    prefixes
}

impl Scorer for WordLmScorer {
    fn score_prefix(&self, prefix: &Prefix) -> f32 {
        if self.ends_word(prefix) {
            self.weighted_score(&prefix.value)
        } else {
            0.0
        }
    }

    fn final_prefix_score(&self, prefix: &Prefix) -> f32 {
        if self.ends_word(prefix) {
            0.0
        } else {
            self.weighted_score(&prefix.value)
        }
    }

    fn is_valid_prefix(&self, value: &str) -> bool {
        let words = self.split_words(value);
        let last_word = words.last().copied().unwrap_or_default();
        self.word_prefixes
            .get(&last_word.chars().count())
            .is_some_and(|valid| valid.contains(last_word))
    }
}
