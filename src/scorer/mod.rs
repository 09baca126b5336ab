//! External scorers that bias the beam search, e.g. n-gram language models.

mod char_of_word;
mod word;

pub use char_of_word::CharOfWordLmScorer;
pub use word::WordLmScorer;

use crate::decoder::Prefix;

/// Natural-log conversion for scores computed on log10 LM probabilities.
pub(crate) fn log10_to_ln(x: f32) -> f32 {
    x * std::f32::consts::LN_10
}

/// `value` without surrounding whitespace or word delimiters, so that a
/// trailing delimiter does not leave an empty last word behind.
pub(crate) fn trim_delimiters<'v>(value: &'v str, delimiter: &str) -> &'v str {
    let value = value.trim();
    if delimiter.is_empty() {
        return value;
    }
    value
        .trim_start_matches(delimiter)
        .trim_end_matches(delimiter)
        .trim()
}

/// Hook consulted by [`BeamState`](crate::decoder::BeamState) whenever a new
/// hypothesis is created and once more when decoding finishes.
///
/// Implementations must not keep decoding state between calls; a single
/// scorer is shared by every search running on the decoder.
pub trait Scorer: Send + Sync {
    /// Log-weight (base e) for the extension that produced `prefix`.
    fn score_prefix(&self, prefix: &Prefix) -> f32;

    /// Log-weight (base e) added once at the end of decoding, whether or not
    /// `score_prefix` already fired for this hypothesis.
    fn final_prefix_score(&self, prefix: &Prefix) -> f32;

    /// `false` prunes the hypothesis `value` before it is created.
    fn is_valid_prefix(&self, value: &str) -> bool;
}
