use ndarray::ArrayView2;

use super::prefix::PrefixSnapshot;
use super::search::{extend_with_symbol, run_search};
use super::{DecodeError, Decoder};
use crate::config::DecoderConfig;
use crate::scorer::Scorer;
use crate::vocab::Vocabulary;

/// Beam search for multi-character symbols that may overlap the hypothesis tail.
///
/// Besides the whole symbol, every non-empty suffix left after cutting
/// `i` leading characters is tried as an extension, e.g. hypothesis
/// `"hel"` with symbol `"llo"` also yields `"hel" + "lo"`. With
/// `only_repeating` the cut-off characters must match the end of the
/// hypothesis.
pub struct SubstringBeamSearchDecoder {
    vocab: Vocabulary,
    config: DecoderConfig,
    scorers: Vec<Box<dyn Scorer>>,
}

impl SubstringBeamSearchDecoder {
    pub fn new(vocab: Vocabulary, config: DecoderConfig) -> Self {
        Self::with_scorers(vocab, config, Vec::new())
    }

    pub fn with_scorers(
        vocab: Vocabulary,
        mut config: DecoderConfig,
        scorers: Vec<Box<dyn Scorer>>,
    ) -> Self {
        config.beam_width = config.beam_width.max(1);
        Self {
            vocab,
            config,
            scorers,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}

/// The whole symbol followed by each overlapping suffix allowed for `parent`.
pub(crate) fn partial_symbols<'s>(
    parent: &PrefixSnapshot,
    symbol: &'s str,
    only_repeating: bool,
) -> Vec<&'s str> {
    let mut partials = vec![symbol];
    if parent.last_symbol.is_none() {
        return partials;
    }

    for (cut, _) in symbol.char_indices().skip(1) {
        let (lead, rest) = symbol.split_at(cut);
        if !only_repeating || parent.value.ends_with(lead) {
            partials.push(rest);
        }
    }
    partials
}

impl Decoder for SubstringBeamSearchDecoder {
    fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    fn batch_workers(&self) -> usize {
        self.config.num_workers
    }

    fn decode(&self, probs: ArrayView2<f32>) -> Result<String, DecodeError> {
        let only_repeating = self.config.only_repeating;
        run_search(
            probs,
            &self.vocab,
            &self.config,
            &self.scorers,
            |state, parent, symbol, prob| {
                for partial in partial_symbols(parent, symbol, only_repeating) {
                    extend_with_symbol(state, parent, partial, prob);
                }
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Prefix;

    fn snapshot(value: &str, last: &str) -> PrefixSnapshot {
        let mut prefix = Prefix::root();
        for c in value.chars() {
            prefix = prefix.child(&c.to_string());
        }
        prefix.last_symbol = Some(last.to_string());
        prefix.snapshot()
    }

    #[test]
    fn repeating_mode_requires_overlap_with_tail() {
        let parent = snapshot("hel", "l");
        assert_eq!(partial_symbols(&parent, "llo", true), vec!["llo", "lo"]);
    }

    #[test]
    fn non_repeating_mode_takes_every_suffix() {
        let parent = snapshot("hel", "l");
        assert_eq!(partial_symbols(&parent, "llo", false), vec!["llo", "lo", "o"]);
    }

    #[test]
    fn root_hypothesis_only_takes_whole_symbol() {
        let parent = Prefix::root().snapshot();
        assert_eq!(partial_symbols(&parent, "llo", false), vec!["llo"]);
    }

    #[test]
    fn cuts_respect_char_boundaries() {
        let parent = snapshot("caf", "f");
        assert_eq!(partial_symbols(&parent, "fé", true), vec!["fé", "é"]);
    }
}
