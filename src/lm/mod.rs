//! n-gram language models queried by the LM scorers.

mod arpa;

pub use arpa::{read_unigram_vocabulary, ArpaModel};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LmError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Missing section {0}")]
    MissingSection(String),
    #[error("Model contains no unigrams")]
    Empty,
}

/// Context carried between successive `base_score` calls: the most recent
/// words, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LmState {
    pub words: Vec<String>,
}

/// Statistical language model over word (or character) units.
///
/// Scores are log10 probabilities.
pub trait LanguageModel: Send + Sync {
    fn order(&self) -> usize;

    /// State with no preceding context.
    fn null_context(&self) -> LmState {
        LmState::default()
    }

    /// `log10 P(word | in_state)`; writes the context following `word` into `out_state`.
    fn base_score(&self, in_state: &LmState, word: &str, out_state: &mut LmState) -> f32;

    fn contains(&self, word: &str) -> bool;
}

/// log10 probability of the last unit of `sequence` given the units before
/// it, using at most `order` units and starting from the null context.
pub fn conditional_log10<S: AsRef<str>>(lm: &dyn LanguageModel, sequence: &[S]) -> f32 {
    let window = &sequence[sequence.len().saturating_sub(lm.order())..];

    let mut in_state = lm.null_context();
    let mut out_state = LmState::default();
    let mut lm_prob = 0.0;

    for unit in window {
        lm_prob = lm.base_score(&in_state, unit.as_ref(), &mut out_state);
        std::mem::swap(&mut in_state, &mut out_state);
    }
    lm_prob
}
