use thiserror::Error;

use crate::config::ConfigError;
use crate::decoder::DecodeError;
use crate::lm::LmError;
use crate::vocab::VocabError;

/// Unified crate errors.
#[derive(Error, Debug)]
pub enum CtcError {
    #[error("Decode: {0}")]
    Decode(#[from] DecodeError),

    #[error("Language model: {0}")]
    Lm(#[from] LmError),

    #[error("Vocabulary: {0}")]
    Vocab(#[from] VocabError),

    #[error("Config: {0}")]
    Config(#[from] ConfigError),
}

impl CtcError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Decode(DecodeError::VocabularyMismatch { .. }) => {
                "The probability matrix does not match the decoder vocabulary."
            }
            Self::Decode(DecodeError::WorkerDisconnected { .. }) => {
                "A decode worker stopped before finishing its batch."
            }
            Self::Lm(LmError::Io(_)) => "The language model file could not be read.",
            Self::Lm(_) => "The language model file is not a valid ARPA model.",
            Self::Vocab(_) => "The vocabulary is missing, empty or has no blank symbol.",
            Self::Config(_) => "The decoder configuration is invalid.",
        }
    }
}
