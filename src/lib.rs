pub mod batch;
pub mod config;
pub mod decoder;
pub mod error;
pub mod lm;
pub mod scorer;
pub mod vocab;

pub use config::{ConfigError, DecoderConfig, ScorerConfig};
pub use decoder::{
    BeamSearchDecoder, BestPathDecoder, DecodeError, Decoder, SubstringBeamSearchDecoder,
};
pub use error::CtcError;
pub use scorer::{CharOfWordLmScorer, Scorer, WordLmScorer};
pub use vocab::{VocabError, Vocabulary};
