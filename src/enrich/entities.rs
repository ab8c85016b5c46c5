//! Rule-based named entity extraction.
//!
//! [`HeuristicEntityExtractor`] is the default entity capability: it groups
//! runs of capitalized tokens and types them with small gazetteers and
//! suffix rules, using spaCy-style tags (PERSON, NORP, GPE, ORG, FAC, DATE).
//! It is a stand-in, not a statistical model; plug a real recognizer in
//! through [`EntityExtractor`].

use std::collections::HashSet;

use super::{Entity, EntityExtractor, EnrichmentError};

const FUNCTION_WORDS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "i", "we", "you", "he", "she", "it",
    "they", "my", "our", "your", "his", "her", "its", "their", "in", "on", "at", "of", "for",
    "to", "from", "by", "with", "and", "or", "but", "if", "when", "while", "although",
    "because", "since", "as", "so", "however", "therefore", "moreover", "furthermore",
    "firstly", "secondly", "finally", "also", "there", "some", "many", "most", "all", "every",
    "no", "not", "is", "are", "was", "were", "be", "do", "does", "what", "which", "who",
    "how", "why", "another", "other", "one", "such", "thus", "hence", "besides", "nowadays",
    "today", "consequently", "overall", "clearly",
];

const HONORIFICS: &[&str] = &["mr", "mrs", "ms", "dr", "prof", "sir", "president", "minister"];

const MONTHS: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const NORP: &[&str] = &[
    "american", "americans", "british", "chinese", "japanese", "german", "germans", "french",
    "indian", "indians", "european", "europeans", "african", "africans", "asian", "asians",
    "russian", "italian", "spanish", "mexican", "canadian", "australian", "korean",
    "vietnamese", "arab", "arabs", "muslim", "muslims", "christian", "christians", "jewish",
    "jews", "hindu", "buddhist", "catholic", "democrats", "republicans", "western", "english",
];

const GPE: &[&str] = &[
    "america", "usa", "us", "uk", "england", "britain", "china", "japan", "germany", "france",
    "india", "russia", "italy", "spain", "canada", "australia", "brazil", "mexico", "korea",
    "vietnam", "singapore", "africa", "europe", "asia", "london", "paris", "berlin", "tokyo",
    "beijing", "new york", "washington", "sydney", "moscow", "dubai", "iran", "iraq",
    "egypt", "turkey", "sweden", "norway", "finland", "denmark", "netherlands", "switzerland",
    "pakistan", "indonesia", "thailand", "malaysia", "california", "texas",
];

const ORG_SUFFIXES: &[&str] = &[
    "university",
    "college",
    "school",
    "company",
    "corporation",
    "inc",
    "ltd",
    "organization",
    "organisation",
    "association",
    "institute",
    "ministry",
    "department",
    "bank",
    "party",
    "council",
    "agency",
    "union",
    "committee",
    "foundation",
];

const FAC_SUFFIXES: &[&str] = &[
    "airport", "bridge", "stadium", "hospital", "museum", "station", "tower", "highway",
    "library", "park", "palace", "temple", "cathedral",
];

/// Default entity capability built from fixed word lists.
#[derive(Debug, Clone)]
pub struct HeuristicEntityExtractor {
    function_words: HashSet<&'static str>,
    norp: HashSet<&'static str>,
    gpe: HashSet<&'static str>,
}

impl Default for HeuristicEntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicEntityExtractor {
    pub fn new() -> Self {
        Self {
            function_words: FUNCTION_WORDS.iter().copied().collect(),
            norp: NORP.iter().copied().collect(),
            gpe: GPE.iter().copied().collect(),
        }
    }

    /// Extracts entities from `text` in order of appearance.
    pub fn entities(&self, text: &str) -> Vec<Entity> {
        let mut out = Vec::new();
        let mut run: Vec<&str> = Vec::new();
        let mut run_sentence_initial = false;
        let mut sentence_start = true;

        for raw in text.split_whitespace() {
            let token = trim_token(raw);
            let ends_sentence = raw.ends_with(&['.', '!', '?'][..]) && !is_abbreviation(token);

            if token.is_empty() {
                self.flush(&mut run, run_sentence_initial, &mut out);
            } else if is_year(token) {
                self.flush(&mut run, run_sentence_initial, &mut out);
                out.push(Entity::new(token, "DATE"));
            } else if self.is_name_token(token, run.is_empty()) {
                if run.is_empty() {
                    run_sentence_initial = sentence_start;
                }
                run.push(token);
            } else {
                self.flush(&mut run, run_sentence_initial, &mut out);
            }

            // punctuation inside a run ends it: "Paris, London"
            if raw.ends_with(&[',', ';', ':'][..]) || ends_sentence {
                self.flush(&mut run, run_sentence_initial, &mut out);
            }
            sentence_start = ends_sentence;
        }
        self.flush(&mut run, run_sentence_initial, &mut out);
        out
    }

    fn is_name_token(&self, token: &str, starts_run: bool) -> bool {
        let mut chars = token.chars();
        let first_upper = chars.next().map(char::is_uppercase).unwrap_or(false);
        if !first_upper {
            return false;
        }
        if is_acronym(token) {
            return true;
        }
        // a run may not start with a function word ("The", "However")
        !(starts_run && self.function_words.contains(token.to_lowercase().as_str()))
    }

    fn flush(&self, run: &mut Vec<&str>, sentence_initial: bool, out: &mut Vec<Entity>) {
        if run.is_empty() {
            return;
        }
        let phrase = run.join(" ");
        if let Some(kind) = self.classify(run, sentence_initial) {
            out.push(Entity::new(&phrase, kind));
        }
        run.clear();
    }

    fn classify(&self, run: &[&str], sentence_initial: bool) -> Option<&'static str> {
        let lower: Vec<String> = run.iter().map(|t| t.to_lowercase()).collect();
        let phrase = lower.join(" ");
        let first = lower.first().map(String::as_str).unwrap_or_default();
        let last = lower.last().map(String::as_str).unwrap_or_default();

        if MONTHS.contains(&phrase.as_str()) {
            return Some("DATE");
        }
        if run.len() == 1 && self.norp.contains(phrase.as_str()) {
            return Some("NORP");
        }
        if self.gpe.contains(phrase.as_str()) {
            return Some("GPE");
        }
        if ORG_SUFFIXES.contains(&last) || (run.len() == 1 && is_acronym(run[0])) {
            return Some("ORG");
        }
        if FAC_SUFFIXES.contains(&last) && run.len() > 1 {
            return Some("FAC");
        }
        if HONORIFICS.contains(&first) && run.len() > 1 {
            return Some("PERSON");
        }
        if run.len() > 1 {
            return Some("PERSON");
        }
        // a lone capitalized word opening a sentence is usually not a name
        if sentence_initial || run[0] == "I" {
            return None;
        }
        Some("PERSON")
    }
}

impl EntityExtractor for HeuristicEntityExtractor {
    fn extract(&self, text: &str) -> Result<Vec<Entity>, EnrichmentError> {
        Ok(self.entities(text))
    }
}

fn trim_token(raw: &str) -> &str {
    let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
    token
        .strip_suffix("'s")
        .or_else(|| token.strip_suffix("’s"))
        .unwrap_or(token)
}

fn is_year(token: &str) -> bool {
    token.len() == 4
        && token.chars().all(|c| c.is_ascii_digit())
        && matches!(token.parse::<u16>(), Ok(1000..=2099))
}

fn is_acronym(token: &str) -> bool {
    let len = token.chars().count();
    (2..=6).contains(&len) && token.chars().all(|c| c.is_ascii_uppercase())
}

fn is_abbreviation(token: &str) -> bool {
    HONORIFICS.contains(&token.to_lowercase().as_str())
}
