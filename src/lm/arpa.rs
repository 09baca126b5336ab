use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Instant;

use regex::Regex;

use super::{LanguageModel, LmError, LmState};

/// log10 probability of a word missing from the model when it has no `<unk>` entry.
const DEFAULT_UNK_LOG10: f32 = -100.0;
const UNK: &str = "<unk>";

static SECTION_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^\\(\d+)-grams:$"));
static COUNT_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^ngram\s+(\d+)\s*=\s*(\d+)$"));

fn regex(re: &'static LazyLock<Result<Regex, regex::Error>>) -> Result<&'static Regex, LmError> {
    match &**re {
        Ok(re) => Ok(re),
        Err(e) => Err(LmError::Parse {
            line: 0,
            message: format!("invalid pattern: {e}"),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct NgramEntry {
    log10_prob: f32,
    backoff: f32,
}

enum Section {
    Preamble,
    Data,
    Ngrams(usize),
    End,
}

/// Backoff n-gram model read from the ARPA text format.
#[derive(Debug, Clone)]
pub struct ArpaModel {
    /// `tables[n - 1]` holds the n-grams, keyed by their space-joined words.
    tables: Vec<HashMap<String, NgramEntry>>,
    unk_log10: f32,
}

impl ArpaModel {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LmError> {
        let start = Instant::now();
        let file = File::open(path.as_ref())?;
        let model = Self::parse(BufReader::new(file))?;

        log::info!(
            "Loaded {}-gram ARPA model from {} ({} unigrams) in {:?}",
            model.order(),
            path.as_ref().display(),
            model.tables[0].len(),
            start.elapsed()
        );
        Ok(model)
    }

    pub fn from_arpa_str(text: &str) -> Result<Self, LmError> {
        Self::parse(text.as_bytes())
    }

    pub fn parse<R: BufRead>(reader: R) -> Result<Self, LmError> {
        let section_re = regex(&SECTION_RE)?;
        let count_re = regex(&COUNT_RE)?;

        let mut declared: HashMap<usize, usize> = HashMap::new();
        let mut tables: Vec<HashMap<String, NgramEntry>> = Vec::new();
        let mut section = Section::Preamble;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            let line_no = line_no + 1;

            if line.is_empty() {
                continue;
            }
            if line == "\\data\\" {
                section = Section::Data;
                continue;
            }
            if line == "\\end\\" {
                section = Section::End;
                break;
            }
            if let Some(caps) = section_re.captures(line) {
                let n: usize = caps[1].parse().map_err(|_| LmError::Parse {
                    line: line_no,
                    message: format!("bad section header {line:?}"),
                })?;
                if n == 0 || n > tables.len() + 1 {
                    return Err(LmError::Parse {
                        line: line_no,
                        message: format!("unexpected {n}-grams section"),
                    });
                }
                if n > tables.len() {
                    tables.push(HashMap::new());
                }
                section = Section::Ngrams(n);
                continue;
            }

            match section {
                Section::Preamble => {}
                Section::Data => {
                    let caps = count_re.captures(line).ok_or_else(|| LmError::Parse {
                        line: line_no,
                        message: format!("expected `ngram N=count`, got {line:?}"),
                    })?;
                    let parse_count = |s: &str| {
                        s.parse::<usize>().map_err(|_| LmError::Parse {
                            line: line_no,
                            message: format!("invalid n-gram count {s:?}"),
                        })
                    };
                    declared.insert(parse_count(&caps[1])?, parse_count(&caps[2])?);
                }
                Section::Ngrams(n) => {
                    let (key, entry) = parse_ngram_line(line, n, line_no)?;
                    tables[n - 1].insert(key, entry);
                }
                Section::End => break,
            }
        }

        if declared.is_empty() {
            return Err(LmError::MissingSection("\\data\\".to_string()));
        }
        if tables.first().map_or(true, HashMap::is_empty) {
            return Err(LmError::Empty);
        }
        if !matches!(section, Section::End) {
            log::warn!("ARPA model has no \\end\\ marker, using what was read");
        }
        for (n, table) in tables.iter().enumerate() {
            if let Some(&count) = declared.get(&(n + 1)) {
                if count != table.len() {
                    log::warn!(
                        "ARPA header declares {} {}-grams, read {}",
                        count,
                        n + 1,
                        table.len()
                    );
                }
            }
        }

        let unk_log10 = tables[0]
            .get(UNK)
            .map_or(DEFAULT_UNK_LOG10, |e| e.log10_prob);

        Ok(Self { tables, unk_log10 })
    }

    fn backoff_of(&self, history: &[String]) -> f32 {
        self.tables
            .get(history.len().wrapping_sub(1))
            .and_then(|t| t.get(&history.join(" ")))
            .map_or(0.0, |e| e.backoff)
    }
}

fn parse_ngram_line(
    line: &str,
    n: usize,
    line_no: usize,
) -> Result<(String, NgramEntry), LmError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != n + 1 && fields.len() != n + 2 {
        return Err(LmError::Parse {
            line: line_no,
            message: format!("expected {n}-gram entry, got {line:?}"),
        });
    }

    let parse_f32 = |s: &str| {
        s.parse::<f32>().map_err(|_| LmError::Parse {
            line: line_no,
            message: format!("invalid number {s:?}"),
        })
    };

    let log10_prob = parse_f32(fields[0])?;
    let backoff = match fields.get(n + 1) {
        Some(b) => parse_f32(b)?,
        None => 0.0,
    };

    Ok((fields[1..=n].join(" "), NgramEntry { log10_prob, backoff }))
}

impl LanguageModel for ArpaModel {
    fn order(&self) -> usize {
        self.tables.len()
    }

    fn base_score(&self, in_state: &LmState, word: &str, out_state: &mut LmState) -> f32 {
        let context = &in_state.words;
        let max_history = context.len().min(self.order().saturating_sub(1));

        let mut backoff = 0.0;
        let mut found = None;
        for h in (0..=max_history).rev() {
            let history = &context[context.len() - h..];
            let mut key = history.join(" ");
            if !key.is_empty() {
                key.push(' ');
            }
            key.push_str(word);

            if let Some(entry) = self.tables[h].get(&key) {
                found = Some(entry.log10_prob);
                break;
            }
            if h > 0 {
                backoff += self.backoff_of(history);
            }
        }

        out_state.words.clear();
        let keep = self.order().saturating_sub(1);
        if keep > 0 {
            let tail_start = (context.len() + 1).saturating_sub(keep);
            out_state
                .words
                .extend(context.iter().skip(tail_start).cloned());
            out_state.words.push(word.to_string());
        }

        found.unwrap_or(self.unk_log10) + backoff
    }

    fn contains(&self, word: &str) -> bool {
        self.tables[0].contains_key(word)
    }
}

/// Words listed in the `\1-grams:` section of an ARPA file.
///
/// Only the unigram block is scanned; the rest of the file is not read.
pub fn read_unigram_vocabulary<P: AsRef<Path>>(path: P) -> Result<HashSet<String>, LmError> {
    let file = File::open(path.as_ref())?;
    let mut words = HashSet::new();
    let mut in_unigrams = false;

    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();

        if line == "\\1-grams:" {
            in_unigrams = true;
        } else if line == "\\2-grams:" || line == "\\end\\" {
            break;
        } else if in_unigrams && !line.is_empty() {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() == 2 || parts.len() == 3 {
                words.insert(parts[1].to_string());
            }
        }
    }

    if !in_unigrams {
        return Err(LmError::MissingSection("\\1-grams:".to_string()));
    }
    log::debug!(
        "Read {} unigram words from {}",
        words.len(),
        path.as_ref().display()
    );
    Ok(words)
}
