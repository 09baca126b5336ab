use std::path::Path;

use super::{log10_to_ln, trim_delimiters, Scorer};
use crate::config::ScorerConfig;
use crate::decoder::Prefix;
use crate::lm::{conditional_log10, ArpaModel, LanguageModel, LmError};

/// Character n-gram scorer over the characters of the current word.
///
/// Every appended non-delimiter symbol is scored character by character,
/// so the running score already covers a trailing partial word.
pub struct CharOfWordLmScorer {
    lm: Box<dyn LanguageModel>,
    config: ScorerConfig,
}

impl CharOfWordLmScorer {
    pub fn from_arpa<P: AsRef<Path>>(path: P, config: ScorerConfig) -> Result<Self, LmError> {
        let lm = ArpaModel::from_file(path)?;
        Ok(Self::new(Box::new(lm), config))
    }

    pub fn new(lm: Box<dyn LanguageModel>, config: ScorerConfig) -> Self {
        Self { lm, config }
    }
}

impl Scorer for CharOfWordLmScorer {
    fn score_prefix(&self, prefix: &Prefix) -> f32 {
        let delimiter = self.config.word_delimiter.as_str();
        let symbol = match prefix.last_symbol.as_deref() {
            Some(symbol) if symbol != delimiter => symbol,
            _ => return 0.0,
        };

        let last_word = trim_delimiters(&prefix.value, delimiter)
            .rsplit(delimiter)
            .next()
            .unwrap_or_default();
        let chars: Vec<String> = last_word.chars().map(String::from).collect();

        // A multi-character symbol appended several characters at once.
        let mut total = 0.0;
        for cut in 0..symbol.chars().count() {
            let part = &chars[..chars.len().saturating_sub(cut)];
            if part.is_empty() {
                break;
            }
            total += conditional_log10(self.lm.as_ref(), part) * self.config.alpha;
            total += self.config.beta;
        }
        log10_to_ln(total)
    }

    fn final_prefix_score(&self, _prefix: &Prefix) -> f32 {
        0.0
    }

    fn is_valid_prefix(&self, _value: &str) -> bool {
        true
    }
}
