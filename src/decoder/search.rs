use std::time::Instant;

use ndarray::{ArrayView1, ArrayView2};

use super::prefix::PrefixSnapshot;
use super::state::BeamState;
use super::{check_shape, DecodeError, Decoder};
use crate::config::DecoderConfig;
use crate::scorer::Scorer;
use crate::vocab::Vocabulary;

/// Candidate `(symbol index, log-probability)` pairs of one timestep,
/// sorted by descending probability.
///
/// Keeps the `cutoff_top_n` most likely symbols. When `cutoff_prob < 1.0`
/// the list is further cut once the accumulated linear probability mass
/// reaches `cutoff_prob`; the symbol crossing the threshold is kept.
pub fn prune_step(
    row: ArrayView1<f32>,
    cutoff_top_n: usize,
    cutoff_prob: f32,
) -> Vec<(usize, f32)> {
    let mut candidates: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();

    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates.truncate(cutoff_top_n.max(1));

    if cutoff_prob < 1.0 {
        let mut mass = 0.0f32;
        let mut keep = 0;
        for (_, log_prob) in &candidates {
            keep += 1;
            mass += log_prob.exp();
            if mass >= cutoff_prob {
                break;
            }
        }
        candidates.truncate(keep);
    }
    candidates
}

/// Applies the CTC merge rule for a non-blank `symbol` emitted after `parent`.
pub(crate) fn extend_with_symbol(
    state: &mut BeamState<'_>,
    parent: &PrefixSnapshot,
    symbol: &str,
    prob: f32,
) {
    let repeat = parent.is_repeat(symbol);

    // An immediate repeat collapses into the parent itself.
    if repeat {
        state.add_non_blank(&parent.value, prob + parent.p_non_blank_prev);
    }

    if let Some(extended) = state.get_or_create(&parent.value, symbol) {
        // Only paths ending in a blank may start a new copy of a repeated symbol.
        let incoming = if repeat {
            prob + parent.p_blank_prev
        } else {
            prob + parent.score
        };
        extended.add_p_non_blank(incoming);
    }
}

/// Timestep loop shared by the beam search decoders; `extend` handles
/// every non-blank `(parent, symbol, log-prob)` event.
pub(crate) fn run_search<F>(
    probs: ArrayView2<f32>,
    vocab: &Vocabulary,
    config: &DecoderConfig,
    scorers: &[Box<dyn Scorer>],
    mut extend: F,
) -> Result<String, DecodeError>
where
    F: FnMut(&mut BeamState<'_>, &PrefixSnapshot, &str, f32),
{
    check_shape(vocab, &probs)?;
    let start = Instant::now();

    let mut state = BeamState::new(config.beam_width, scorers)
        .with_overflow_capacity(config.overflow_capacity);

    for row in probs.outer_iter() {
        let candidates = prune_step(row, config.cutoff_top_n, config.cutoff_prob);
        let parents = state.snapshot();

        for (idx, prob) in candidates {
            for parent in &parents {
                if vocab.is_blank(idx) {
                    state.add_blank(&parent.value, prob + parent.score);
                } else {
                    extend(&mut state, parent, vocab.symbol(idx), prob);
                }
            }
        }

        state.advance();
    }

    state.finalize();

    let (text, score) = state
        .best()
        .map(|p| (p.value.clone(), p.score))
        .unwrap_or_default();

    log::debug!(
        "Beam search over {} frames (beam={}) finished in {:?}, best score {:.3}",
        probs.nrows(),
        config.beam_width,
        start.elapsed(),
        score
    );

    Ok(text)
}

/// Prefix beam search under CTC collapsing, optionally biased by scorers.
pub struct BeamSearchDecoder {
    vocab: Vocabulary,
    config: DecoderConfig,
    scorers: Vec<Box<dyn Scorer>>,
}

impl BeamSearchDecoder {
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

    pub fn scorers(&self) -> &[Box<dyn Scorer>] {
        &self.scorers
    }
}

impl Decoder for BeamSearchDecoder {
    fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    fn batch_workers(&self) -> usize {
        self.config.num_workers
    }

    fn decode(&self, probs: ArrayView2<f32>) -> Result<String, DecodeError> {
        run_search(
            probs,
            &self.vocab,
            &self.config,
            &self.scorers,
            extend_with_symbol,
        )
    }
}
