use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VocabError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Blank symbol {0:?} is not in the vocabulary")]
    MissingBlank(String),
    #[error("Vocabulary is empty")]
    Empty,
}

/// Ordered label set of a CTC model, column `i` of a probability row
/// belongs to `symbols[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    symbols: Vec<String>,
    blank_idx: usize,
}

impl Vocabulary {
    pub fn new<I, S>(symbols: I, blank: &str) -> Result<Self, VocabError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let symbols: Vec<String> = symbols.into_iter().map(Into::into).collect();
        if symbols.is_empty() {
            return Err(VocabError::Empty);
        }
        let blank_idx = symbols
            .iter()
            .position(|s| s == blank)
            .ok_or_else(|| VocabError::MissingBlank(blank.to_string()))?;

        Ok(Self { symbols, blank_idx })
    }

    /// Loads a JSON array of symbols, e.g. `["_", " ", "a", "b"]`.
    pub fn from_json_file<P: AsRef<Path>>(path: P, blank: &str) -> Result<Self, VocabError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let symbols: Vec<String> = serde_json::from_str(&content)?;
        let vocab = Self::new(symbols, blank)?;
        log::debug!(
            "Loaded vocabulary with {} symbols from {}, blank {:?} at {}",
            vocab.len(),
            path.as_ref().display(),
            vocab.blank(),
            vocab.blank_idx
        );
        Ok(vocab)
    }

    pub fn symbol(&self, idx: usize) -> &str {
        &self.symbols[idx]
    }

    pub fn blank_idx(&self) -> usize {
        self.blank_idx
    }

    pub fn blank(&self) -> &str {
        &self.symbols[self.blank_idx]
    }

    #[inline]
    pub fn is_blank(&self, idx: usize) -> bool {
        idx == self.blank_idx
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
