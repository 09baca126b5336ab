use ctcdecode_lib::{
    BeamSearchDecoder, BestPathDecoder, DecodeError, Decoder, DecoderConfig,
    SubstringBeamSearchDecoder, Vocabulary,
};
use ndarray::Array2;

fn vocab(symbols: &[&str]) -> Vocabulary {
    Vocabulary::new(symbols.iter().copied(), "_").expect("valid vocabulary")
}

/// Log-probability matrix from linear per-frame distributions.
fn log_matrix(rows: &[Vec<f32>]) -> Array2<f32> {
    let cols = rows[0].len();
    Array2::from_shape_fn((rows.len(), cols), |(t, v)| rows[t][v].ln())
}

/// One frame where `idx` holds `p` and the rest is spread evenly.
fn peaked(size: usize, idx: usize, p: f32) -> Vec<f32> {
    let rest = (1.0 - p) / (size - 1) as f32;
    (0..size).map(|i| if i == idx { p } else { rest }).collect()
}

fn beam(symbols: &[&str], beam_width: usize) -> BeamSearchDecoder {
    BeamSearchDecoder::new(
        vocab(symbols),
        DecoderConfig::default().with_beam_width(beam_width),
    )
}

#[test]
fn consecutive_repeats_collapse() {
    let symbols = ["_", "a", "b"];
    let probs = log_matrix(&[vec![0.05, 0.9, 0.05], vec![0.05, 0.9, 0.05]]);

    let best_path = BestPathDecoder::new(vocab(&symbols));
    assert_eq!(best_path.decode(probs.view()).unwrap(), "a");
    assert_eq!(beam(&symbols, 8).decode(probs.view()).unwrap(), "a");
}

#[test]
fn blank_separates_repeated_symbols() {
    let symbols = ["_", "a", "b"];
    let probs = log_matrix(&[
        vec![0.05, 0.9, 0.05],
        vec![0.9, 0.05, 0.05],
        vec![0.05, 0.9, 0.05],
    ]);

    let best_path = BestPathDecoder::new(vocab(&symbols));
    assert_eq!(best_path.decode(probs.view()).unwrap(), "aa");
    assert_eq!(beam(&symbols, 8).decode(probs.view()).unwrap(), "aa");
}

#[test]
fn output_never_contains_blank() {
    let symbols = ["_", "a", "b"];
    let probs = log_matrix(&[
        vec![0.8, 0.1, 0.1],
        vec![0.1, 0.1, 0.8],
        vec![0.8, 0.1, 0.1],
        vec![0.1, 0.8, 0.1],
    ]);

    let text = beam(&symbols, 4).decode(probs.view()).unwrap();
    assert_eq!(text, "ba");
    assert!(!text.contains('_'));
}

#[test]
fn beam_search_sums_paths_that_greedy_misses() {
    // Greedy picks blank at every frame, but "a" collects more total mass
    // across its many alignments.
    let symbols = ["_", "a", "b"];
    let probs = log_matrix(&[vec![0.4, 0.35, 0.25], vec![0.4, 0.35, 0.25]]);

    let best_path = BestPathDecoder::new(vocab(&symbols));
    assert_eq!(best_path.decode(probs.view()).unwrap(), "");
    assert_eq!(beam(&symbols, 8).decode(probs.view()).unwrap(), "a");
}

#[test]
fn width_one_without_scorers_matches_best_path() {
    let symbols = ["_", "a", "b", "c"];
    let best_path = BestPathDecoder::new(vocab(&symbols));
    let greedy_beam = beam(&symbols, 1);

    let mut seed: u32 = 12345;
    for _ in 0..20 {
        let rows: Vec<Vec<f32>> = (0..12)
            .map(|_| {
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
                let idx = ((seed >> 16) % symbols.len() as u32) as usize;
                peaked(symbols.len(), idx, 0.9)
            })
            .collect();
        let probs = log_matrix(&rows);

        assert_eq!(
            greedy_beam.decode(probs.view()).unwrap(),
            best_path.decode(probs.view()).unwrap()
        );
    }
}

#[test]
fn cutoff_top_n_limits_candidates() {
    let symbols = ["_", "a", "b"];
    let probs = log_matrix(&[vec![0.3, 0.45, 0.25]]);
    let config = DecoderConfig {
        cutoff_top_n: 1,
        ..DecoderConfig::default()
    };

    let decoder = BeamSearchDecoder::new(vocab(&symbols), config);
    assert_eq!(decoder.decode(probs.view()).unwrap(), "a");
}

#[test]
fn cutoff_prob_drops_unlikely_tail() {
    // Only "a" survives a 0.5 mass cutoff, so blank paths never form.
    let symbols = ["_", "a", "b"];
    let probs = log_matrix(&[vec![0.2, 0.7, 0.1], vec![0.2, 0.7, 0.1]]);
    let config = DecoderConfig {
        cutoff_prob: 0.5,
        ..DecoderConfig::default()
    };

    let decoder = BeamSearchDecoder::new(vocab(&symbols), config);
    assert_eq!(decoder.decode(probs.view()).unwrap(), "a");
}

#[test]
fn empty_input_decodes_to_empty_string() {
    let symbols = ["_", "a"];
    let probs = Array2::<f32>::zeros((0, 2));

    assert_eq!(beam(&symbols, 4).decode(probs.view()).unwrap(), "");
    let best_path = BestPathDecoder::new(vocab(&symbols));
    assert_eq!(best_path.decode(probs.view()).unwrap(), "");
}

#[test]
fn rejects_matrix_with_wrong_vocabulary_size() {
    let probs = Array2::<f32>::zeros((3, 5));
    let err = beam(&["_", "a", "b"], 4).decode(probs.view()).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::VocabularyMismatch {
            expected: 3,
            actual: 5
        }
    ));
}

#[test]
fn custom_blank_symbol_is_respected() {
    let vocab = Vocabulary::new(["a", "<blk>", "b"], "<blk>").unwrap();
    assert_eq!(vocab.blank_idx(), 1);

    let probs = log_matrix(&[
        vec![0.9, 0.05, 0.05],
        vec![0.05, 0.9, 0.05],
        vec![0.9, 0.05, 0.05],
    ]);
    let decoder = BeamSearchDecoder::new(vocab, DecoderConfig::default().with_beam_width(8));
    assert_eq!(decoder.decode(probs.view()).unwrap(), "aa");
}

#[test]
fn substring_decoder_matches_beam_for_single_char_symbols() {
    let symbols = ["_", "a", "b"];
    let probs = log_matrix(&[
        vec![0.1, 0.8, 0.1],
        vec![0.8, 0.1, 0.1],
        vec![0.1, 0.1, 0.8],
    ]);

    let substring = SubstringBeamSearchDecoder::new(
        vocab(&symbols),
        DecoderConfig::default().with_beam_width(8),
    );
    assert_eq!(substring.decode(probs.view()).unwrap(), "ab");
}

#[test]
fn substring_decoder_overlaps_multi_char_symbol() {
    let symbols = ["_", "h", "e", "l", "llo"];
    let probs = log_matrix(&[
        peaked(5, 1, 0.9),
        peaked(5, 2, 0.9),
        peaked(5, 3, 0.9),
        peaked(5, 4, 0.9),
    ]);

    let plain = beam(&symbols, 8).decode(probs.view()).unwrap();
    assert_eq!(plain, "helllo");

    // "hel" + "lo" ties with "hel" + "llo", and "he" + "llo" tips it.
    let substring = SubstringBeamSearchDecoder::new(
        vocab(&symbols),
        DecoderConfig::default().with_beam_width(8),
    );
    assert_eq!(substring.decode(probs.view()).unwrap(), "hello");
}
