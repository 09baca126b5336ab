use std::time::{SystemTime, UNIX_EPOCH};

use ctcdecode_lib::decoder::DecodeError;
use ctcdecode_lib::lm::LmError;
use ctcdecode_lib::{ConfigError, CtcError, DecoderConfig, ScorerConfig, VocabError, Vocabulary};

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "ctcdecode_{}_{}",
        name,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn defaults_match_documented_values() {
    let config = DecoderConfig::default();
    assert_eq!(config.beam_width, 64);
    assert_eq!(config.cutoff_prob, 1.0);
    assert_eq!(config.cutoff_top_n, 40);
    assert_eq!(config.num_workers, 4);
    assert!(config.only_repeating);
    assert_eq!(config.overflow_capacity, None);

    let scorer = ScorerConfig::default();
    assert_eq!(scorer.oov_penalty, -1000.0);
    assert_eq!(scorer.word_delimiter, " ");
}

#[test]
fn json_file_fills_missing_fields_with_defaults() {
    let path = temp_path("config.json");
    std::fs::write(&path, r#"{"beam_width": 16, "cutoff_prob": 0.99}"#).unwrap();

    let config = DecoderConfig::from_json_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.beam_width, 16);
    assert!((config.cutoff_prob - 0.99).abs() < 1e-6);
    assert_eq!(config.cutoff_top_n, 40);
}

#[test]
fn json_file_with_invalid_cutoff_is_rejected() {
    let path = temp_path("bad_config.json");
    std::fs::write(&path, r#"{"cutoff_prob": 1.5}"#).unwrap();

    let err = DecoderConfig::from_json_file(&path).unwrap_err();
    let _ = std::fs::remove_file(&path);
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn validate_clamps_beam_width() {
    let mut config = DecoderConfig {
        beam_width: 0,
        ..Default::default()
    };
    config.validate().unwrap();
    assert_eq!(config.beam_width, 1);

    config.cutoff_top_n = 0;
    assert!(config.validate().is_err());
}

#[test]
fn env_overrides_apply_and_ignore_garbage() {
    std::env::set_var("CTCTEST_BEAM_WIDTH", "12");
    std::env::set_var("CTCTEST_CUTOFF_PROB", "not-a-number");
    std::env::set_var("CTCTEST_ONLY_REPEATING", "false");
    std::env::set_var("CTCTEST_OVERFLOW_CAPACITY", "256");

    let mut config = DecoderConfig::default();
    config.apply_env_overrides("CTCTEST_");

    assert_eq!(config.beam_width, 12);
    assert_eq!(config.cutoff_prob, 1.0);
    assert!(!config.only_repeating);
    assert_eq!(config.overflow_capacity, Some(256));
}

#[test]
fn vocabulary_requires_blank() {
    assert!(matches!(
        Vocabulary::new(["a", "b"], "_"),
        Err(VocabError::MissingBlank(_))
    ));
    assert!(matches!(
        Vocabulary::new(Vec::<String>::new(), "_"),
        Err(VocabError::Empty)
    ));
}

#[test]
fn vocabulary_loads_from_json() {
    let path = temp_path("vocab.json");
    std::fs::write(&path, r#"["_", " ", "a", "b"]"#).unwrap();

    let vocab = Vocabulary::from_json_file(&path, "_").unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(vocab.len(), 4);
    assert_eq!(vocab.blank_idx(), 0);
    assert_eq!(vocab.symbol(1), " ");
}

#[test]
fn unified_error_wraps_each_area() {
    let errors: Vec<CtcError> = vec![
        DecodeError::VocabularyMismatch {
            expected: 3,
            actual: 4,
        }
        .into(),
        DecodeError::WorkerDisconnected {
            received: 1,
            expected: 2,
        }
        .into(),
        LmError::Empty.into(),
        LmError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).into(),
        VocabError::Empty.into(),
        ConfigError::Invalid("beam".to_string()).into(),
    ];

    for err in errors {
        assert!(!err.to_string().is_empty());
        assert!(!err.user_message().is_empty());
    }
}
