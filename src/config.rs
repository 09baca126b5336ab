use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "CTC_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Search parameters shared by the beam search decoders.
///
/// Probability matrices handed to the decoders hold log-probabilities.
/// `cutoff_prob` is the exception: it is a linear probability mass in
/// `(0, 1]`, and the pruning step exponentiates each row value before
/// accumulating it against the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub beam_width: usize,
    pub cutoff_prob: f32,
    pub cutoff_top_n: usize,
    /// Worker threads for batch decoding; 0 means one per available CPU.
    pub num_workers: usize,
    /// Substring decoder only: overlap a symbol with the hypothesis tail
    /// only when the tail repeats the symbol's leading characters.
    pub only_repeating: bool,
    /// Upper bound on hypotheses parked in overflow after each step.
    pub overflow_capacity: Option<usize>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            beam_width: 64,
            cutoff_prob: 1.0,
            cutoff_top_n: 40,
            num_workers: 4,
            only_repeating: true,
            overflow_capacity: None,
        }
    }
}

impl DecoderConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides(ENV_PREFIX);
        config
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_beam_width(mut self, beam_width: usize) -> Self {
        self.beam_width = beam_width.max(1);
        self
    }

    /// Clamps `beam_width` and rejects thresholds the pruning step cannot use.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.beam_width = self.beam_width.max(1);
        if !(self.cutoff_prob > 0.0 && self.cutoff_prob <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "cutoff_prob must be in (0, 1], got {}",
                self.cutoff_prob
            )));
        }
        if self.cutoff_top_n == 0 {
            return Err(ConfigError::Invalid(
                "cutoff_top_n must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self, prefix: &str) {
        let read_env = |suffix: &str| std::env::var(format!("{prefix}{suffix}")).ok();
        fn parse_or_warn<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Option<T> {
            let raw = raw?;
            match raw.parse::<T>() {
                Ok(v) => Some(v),
                Err(_) => {
                    log::warn!("Ignoring invalid {key} value '{raw}'");
                    None
                }
            }
        }

        if let Some(v) = parse_or_warn::<usize>("BEAM_WIDTH", read_env("BEAM_WIDTH")) {
            self.beam_width = v.max(1);
        }
        if let Some(v) = parse_or_warn::<f32>("CUTOFF_PROB", read_env("CUTOFF_PROB")) {
            if v > 0.0 && v <= 1.0 {
                self.cutoff_prob = v;
            } else {
                log::warn!("Ignoring out-of-range CUTOFF_PROB value {v}");
            }
        }
        if let Some(v) = parse_or_warn::<usize>("CUTOFF_TOP_N", read_env("CUTOFF_TOP_N")) {
            self.cutoff_top_n = v.max(1);
        }
        if let Some(v) = parse_or_warn::<usize>("NUM_WORKERS", read_env("NUM_WORKERS")) {
            self.num_workers = v;
        }
        if let Some(v) = parse_or_warn::<bool>("ONLY_REPEATING", read_env("ONLY_REPEATING")) {
            self.only_repeating = v;
        }
        if let Some(v) =
            parse_or_warn::<usize>("OVERFLOW_CAPACITY", read_env("OVERFLOW_CAPACITY"))
        {
            self.overflow_capacity = Some(v);
        }
    }
}

/// Weights for the language-model scorers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Scale on the LM log10 probability.
    pub alpha: f32,
    /// Additive bonus per scored unit, counteracting the LM's preference for short output.
    pub beta: f32,
    /// log10 score returned for a word the LM does not know.
    pub oov_penalty: f32,
    pub word_delimiter: String,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 0.0,
            oov_penalty: -1000.0,
            word_delimiter: " ".to_string(),
        }
    }
}

impl ScorerConfig {
    pub fn new(alpha: f32, beta: f32) -> Self {
        Self {
            alpha,
            beta,
            ..Default::default()
        }
    }
}
