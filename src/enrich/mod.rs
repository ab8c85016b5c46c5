//! Text enrichment strategies applied to annotation spans.
//!
//! Entity extraction and sentiment scoring are capabilities supplied from
//! outside the pipeline through [`EntityExtractor`] and [`SentimentScorer`];
//! the crate ships rule-based defaults. Topic categorization is computed
//! locally.

pub mod entities;
pub mod sentiment;
pub mod topic;

use std::collections::BTreeSet;

use thiserror::Error;

pub use entities::HeuristicEntityExtractor;
pub use sentiment::SentimentLexicon;
pub use topic::{TopicCategory, categorize_topic};

/// A named entity found in a span, with an open-ended type tag
/// (PERSON, ORG, GPE, NORP, FAC, DATE, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub kind: String,
}

impl Entity {
    pub fn new(text: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: kind.into(),
        }
    }
}

/// Failure reported by an enrichment capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EnrichmentError(pub String);

pub trait EntityExtractor {
    fn extract(&self, text: &str) -> Result<Vec<Entity>, EnrichmentError>;
}

pub trait SentimentScorer {
    /// Polarity in `[-1, 1]`.
    fn score(&self, text: &str) -> Result<f64, EnrichmentError>;
}

/// Allow-list of entity types kept after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFilter {
    kinds: BTreeSet<String>,
}

impl EntityFilter {
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            kinds: kinds
                .into_iter()
                .map(|k| k.as_ref().trim().to_uppercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Demographic-related types.
    pub fn demographic() -> Self {
        Self::new(["PERSON", "NORP", "GPE", "ORG", "FAC"])
    }

    /// People and nationality/religious/political groups.
    pub fn bias() -> Self {
        Self::new(["PERSON", "NORP"])
    }

    pub fn influence() -> Self {
        Self::new(["ORG", "PERSON", "GPE", "DATE"])
    }

    pub fn allows(&self, kind: &str) -> bool {
        self.kinds.contains(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().map(String::as_str)
    }
}

/// Result of enriching one span.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Entity(Entity),
    Sentiment(f64),
    Topic(TopicCategory),
}

/// The enrichment strategy applied to every annotation text.
pub enum Enrichment<'a> {
    Entities {
        extractor: &'a dyn EntityExtractor,
        filter: Option<EntityFilter>,
    },
    Sentiment(&'a dyn SentimentScorer),
    Topics,
}

impl Enrichment<'_> {
    /// Short name used for export file names and log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Enrichment::Entities { .. } => "entities",
            Enrichment::Sentiment(_) => "sentiment",
            Enrichment::Topics => "topics",
        }
    }

    /// Zero or more entity payloads, or exactly one scalar payload.
    pub fn apply(&self, text: &str) -> Result<Vec<Payload>, EnrichmentError> {
        match self {
            Enrichment::Entities { extractor, filter } => Ok(extractor
                .extract(text)?
                .into_iter()
                .filter(|e| filter.as_ref().map(|f| f.allows(&e.kind)).unwrap_or(true))
                .map(Payload::Entity)
                .collect()),
            Enrichment::Sentiment(scorer) => Ok(vec![Payload::Sentiment(scorer.score(text)?)]),
            Enrichment::Topics => Ok(vec![Payload::Topic(categorize_topic(text))]),
        }
    }
}
