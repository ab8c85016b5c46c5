//! Lexicon-based sentiment polarity.
//!
//! Polarity of a span is the mean polarity of the lexicon words it contains,
//! in `[-1, 1]`. A negation within the three preceding tokens flips and damps
//! a word (`* -0.5`), an intensifier directly before it scales it. Words that
//! miss the lexicon are retried by their English stem, so "benefits" finds
//! "benefit".

use std::collections::HashMap;
use std::path::Path;

use rust_stemmers::{Algorithm, Stemmer};

use super::{EnrichmentError, SentimentScorer};
use crate::error::AnalysisError;

const NEGATION_FACTOR: f64 = -0.5;
const NEGATION_REACH: usize = 3;

const NEGATIONS: &[&str] = &["not", "no", "never", "cannot", "without", "nor", "neither"];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("extremely", 1.5),
    ("really", 1.2),
    ("highly", 1.3),
    ("truly", 1.2),
    ("quite", 1.1),
    ("somewhat", 0.7),
    ("slightly", 0.5),
];

const DEFAULT_ENTRIES: &[(&str, f64)] = &[
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("best", 1.0),
    ("better", 0.5),
    ("positive", 0.23),
    ("beneficial", 0.6),
    ("benefit", 0.5),
    ("advantage", 0.5),
    ("useful", 0.3),
    ("helpful", 0.5),
    ("help", 0.3),
    ("important", 0.4),
    ("essential", 0.3),
    ("valuable", 0.5),
    ("effective", 0.6),
    ("efficient", 0.5),
    ("successful", 0.75),
    ("success", 0.6),
    ("happy", 0.8),
    ("enjoy", 0.4),
    ("healthy", 0.5),
    ("safe", 0.5),
    ("easy", 0.43),
    ("convenient", 0.4),
    ("improve", 0.4),
    ("opportunity", 0.3),
    ("fair", 0.7),
    ("right", 0.29),
    ("true", 0.35),
    ("wonderful", 1.0),
    ("interesting", 0.5),
    ("rich", 0.38),
    ("bad", -0.7),
    ("worse", -0.4),
    ("worst", -1.0),
    ("negative", -0.3),
    ("harmful", -0.6),
    ("harm", -0.5),
    ("dangerous", -0.6),
    ("disadvantage", -0.5),
    ("problem", -0.4),
    ("difficult", -0.5),
    ("hard", -0.29),
    ("poor", -0.4),
    ("unfair", -0.5),
    ("wrong", -0.5),
    ("false", -0.4),
    ("sad", -0.5),
    ("stress", -0.4),
    ("stressful", -0.5),
    ("unhealthy", -0.5),
    ("waste", -0.2),
    ("expensive", -0.5),
    ("risk", -0.3),
    ("crime", -0.5),
    ("violence", -0.6),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("lack", -0.3),
    ("lose", -0.3),
    ("fail", -0.5),
    ("failure", -0.5),
    ("pollution", -0.4),
    ("boring", -1.0),
];

/// Word polarities plus a stem index for inflected forms.
pub struct SentimentLexicon {
    words: HashMap<String, f64>,
    /// stem -> (owning word, polarity)
    stems: HashMap<String, (String, f64)>,
    stemmer: Stemmer,
}

impl SentimentLexicon {
    /// An empty lexicon; every text scores 0.0.
    pub fn new() -> Self {
        Self {
            words: HashMap::new(),
            stems: HashMap::new(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Adds or replaces a word. Polarity is clamped to `[-1, 1]`.
    ///
    /// Words sharing a stem share one stem entry, used for inflected forms
    /// missing from the lexicon. The entry belongs to the word equal to the
    /// stem if there is one, else to the first word inserted with that stem.
    pub fn insert(&mut self, word: &str, polarity: f64) {
        let word = word.to_lowercase();
        let polarity = polarity.clamp(-1.0, 1.0);
        let stem = self.stemmer.stem(&word).into_owned();
        match self.stems.get_mut(&stem) {
            Some((owner, value)) => {
                if *owner == word || (word == stem && *owner != stem) {
                    *owner = word.clone();
                    *value = polarity;
                }
            }
            None => {
                self.stems.insert(stem, (word.clone(), polarity));
            }
        }
        self.words.insert(word, polarity);
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Merges a `word<TAB>polarity` file into the lexicon. Empty lines and
    /// lines starting with `#` are ignored. Returns the number of entries read.
    pub fn load_tsv(&mut self, path: &Path) -> Result<usize, AnalysisError> {
        let lexicon_err = |message: String| AnalysisError::Lexicon {
            path: path.to_path_buf(),
            message,
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| lexicon_err(e.to_string()))?;

        let mut count = 0;
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| lexicon_err(e.to_string()))?;
            let (Some(word), Some(value)) = (record.get(0), record.get(1)) else {
                return Err(lexicon_err(format!(
                    "record {} needs a word and a polarity",
                    index + 1
                )));
            };
            let polarity: f64 = value.parse().map_err(|_| {
                lexicon_err(format!("record {}: invalid polarity {value:?}", index + 1))
            })?;
            self.insert(word, polarity);
            count += 1;
        }
        log::info!("Loaded {} lexicon entries from {}", count, path.display());
        Ok(count)
    }

    fn lookup(&self, word: &str) -> Option<f64> {
        if let Some(p) = self.words.get(word) {
            return Some(*p);
        }
        let stem = self.stemmer.stem(word);
        self.stems.get(&*stem).map(|(_, p)| *p)
    }

    /// Mean polarity of the sentiment-bearing words in `text`, or 0.0 when
    /// there are none.
    pub fn polarity(&self, text: &str) -> f64 {
        let mut sum = 0.0;
        let mut matched = 0usize;
        let mut negation_left = 0usize;
        let mut intensity = 1.0;

        let lower = text.to_lowercase();
        for token in lower
            .split(|c: char| !(c.is_alphabetic() || c == '\'' || c == '’'))
            .filter(|t| !t.is_empty())
        {
            if NEGATIONS.contains(&token) || token.ends_with("n't") || token.ends_with("n’t") {
                negation_left = NEGATION_REACH;
                intensity = 1.0;
                continue;
            }
            if let Some((_, factor)) = INTENSIFIERS.iter().find(|(w, _)| *w == token) {
                intensity = *factor;
                continue;
            }

            match self.lookup(token) {
                Some(p) => {
                    let mut value = p * intensity;
                    if negation_left > 0 {
                        value *= NEGATION_FACTOR;
                        negation_left = 0;
                    }
                    sum += value;
                    matched += 1;
                }
                None => negation_left = negation_left.saturating_sub(1),
            }
            intensity = 1.0;
        }

        if matched == 0 {
            return 0.0;
        }
        (sum / matched as f64).clamp(-1.0, 1.0)
    }
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        let mut lexicon = Self::new();
        for (word, polarity) in DEFAULT_ENTRIES {
            lexicon.insert(word, *polarity);
        }
        lexicon
    }
}

impl SentimentScorer for SentimentLexicon {
    fn score(&self, text: &str) -> Result<f64, EnrichmentError> {
        Ok(self.polarity(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn neutral_text_scores_zero() {
        let lexicon = SentimentLexicon::default();
        assert_eq!(lexicon.polarity("The meeting starts at noon"), 0.0);
        assert_eq!(lexicon.polarity(""), 0.0);
    }

    #[test]
    fn mean_of_matched_words() {
        let lexicon = SentimentLexicon::default();
        assert!(close(lexicon.polarity("This is a good idea"), 0.7));
        assert!(close(lexicon.polarity("good but dangerous"), (0.7 - 0.6) / 2.0));
    }

    #[test]
    fn negation_flips_and_damps() {
        let lexicon = SentimentLexicon::default();
        assert!(close(lexicon.polarity("This is not good"), -0.35));
        assert!(close(lexicon.polarity("It isn't a bad choice"), 0.35));
        // out of reach
        assert!(close(
            lexicon.polarity("not that it matters much here, good"),
            0.7
        ));
    }

    #[test]
    fn intensifiers_scale_next_word() {
        let lexicon = SentimentLexicon::default();
        assert!(close(lexicon.polarity("very good"), 0.7 * 1.3));
        assert!(close(lexicon.polarity("extremely terrible"), -1.0));
    }

    #[test]
    fn inflected_forms_match_by_stem() {
        let lexicon = SentimentLexicon::default();
        assert!(close(lexicon.polarity("It brings many benefits"), 0.5));
    }

    #[test]
    fn shared_stem_prefers_base_word_then_first_inserted() {
        // "successful" and "success" both stem to "success"
        for order in [
            [("successful", 0.75), ("success", 0.6)],
            [("success", 0.6), ("successful", 0.75)],
        ] {
            let mut lexicon = SentimentLexicon::new();
            for (word, polarity) in order {
                lexicon.insert(word, polarity);
            }
            assert!(close(lexicon.polarity("many successes"), 0.6));
            assert!(close(lexicon.polarity("successful"), 0.75));
        }
        assert!(close(SentimentLexicon::default().polarity("successes"), 0.6));

        // neither word is the stem "stress": the first one keeps it
        let mut lexicon = SentimentLexicon::new();
        lexicon.insert("stressful", -0.5);
        lexicon.insert("stressed", -0.2);
        assert!(close(lexicon.polarity("stressing"), -0.5));

        // re-inserting the owner updates the stem entry
        lexicon.insert("stressful", -0.8);
        assert!(close(lexicon.polarity("stressing"), -0.8));
    }

    #[test]
    fn loads_extra_entries_from_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.tsv");
        std::fs::write(&path, "# extra words\nsplendid\t0.9\n\ngood\t0.1\n").unwrap();

        let mut lexicon = SentimentLexicon::default();
        let n = lexicon.load_tsv(&path).unwrap();
        assert_eq!(n, 2);
        assert!(close(lexicon.polarity("splendid"), 0.9));
        assert!(close(lexicon.polarity("good"), 0.1));
    }

    #[test]
    fn rejects_malformed_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.tsv");
        std::fs::write(&path, "splendid\tvery\n").unwrap();

        let mut lexicon = SentimentLexicon::new();
        assert!(matches!(
            lexicon.load_tsv(&path),
            Err(AnalysisError::Lexicon { .. })
        ));
        assert!(lexicon.is_empty());
    }
}
