use ndarray::ArrayView2;

use super::{check_shape, DecodeError, Decoder};
use crate::vocab::Vocabulary;

/// Greedy baseline: most likely symbol per frame, repeats collapsed, blanks dropped.
pub struct BestPathDecoder {
    vocab: Vocabulary,
}

impl BestPathDecoder {
    pub fn new(vocab: Vocabulary) -> Self {
        Self { vocab }
    }
}

impl Decoder for BestPathDecoder {
    fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    fn decode(&self, probs: ArrayView2<f32>) -> Result<String, DecodeError> {
        check_shape(&self.vocab, &probs)?;

        let mut text = String::new();
        let mut last: Option<usize> = None;

        for row in probs.outer_iter() {
            let mut best_idx = 0;
            let mut best_score = f32::NEG_INFINITY;
            for (idx, &score) in row.iter().enumerate() {
                if score > best_score {
                    best_score = score;
                    best_idx = idx;
                }
            }

            if last != Some(best_idx) && !self.vocab.is_blank(best_idx) {
                text.push_str(self.vocab.symbol(best_idx));
            }
            last = Some(best_idx);
        }

        Ok(text)
    }
}
