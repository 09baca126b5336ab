use ndarray::{Array2, ArrayView2};
use thiserror::Error;

use crate::vocab::Vocabulary;

mod best_path;
mod prefix;
mod search;
mod state;
mod substring;

pub use best_path::BestPathDecoder;
pub use prefix::{log_add_exp, Prefix, PrefixSnapshot};
pub use search::{prune_step, BeamSearchDecoder};
pub use state::BeamState;
pub use substring::SubstringBeamSearchDecoder;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Probability matrix has {actual} columns, vocabulary has {expected} symbols")]
    VocabularyMismatch { expected: usize, actual: usize },
    #[error("Decode workers exited after {received} of {expected} results")]
    WorkerDisconnected { received: usize, expected: usize },
}

/// Turns a `[timestep, symbol]` matrix of log-probabilities into a label string.
pub trait Decoder: Send + Sync {
    fn vocabulary(&self) -> &Vocabulary;

    fn decode(&self, probs: ArrayView2<f32>) -> Result<String, DecodeError>;

    /// Worker threads used by `decode_batch` when the caller does not pick
    /// a count; 0 means one per CPU.
    fn batch_workers(&self) -> usize {
        0
    }

    /// Decodes independent utterances on `num_workers` threads, falling back
    /// to [`batch_workers`](Self::batch_workers), and returns results in
    /// input order.
    fn decode_batch(
        &self,
        batch: &[Array2<f32>],
        num_workers: Option<usize>,
    ) -> Result<Vec<String>, DecodeError> {
        let workers = num_workers.unwrap_or_else(|| self.batch_workers());
        crate::batch::decode_batch(self, batch, workers)
    }
}

pub(crate) fn check_shape(
    vocab: &Vocabulary,
    probs: &ArrayView2<f32>,
) -> Result<(), DecodeError> {
    if probs.ncols() != vocab.len() && probs.nrows() > 0 {
        return Err(DecodeError::VocabularyMismatch {
            expected: vocab.len(),
            actual: probs.ncols(),
        });
    }
    Ok(())
}
