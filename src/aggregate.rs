//! Builds the aggregated table: corpus order, then annotation order, then
//! entity order.

use std::fs;

use crate::annotation::load_annotations;
use crate::corpus::{Corpus, CorpusPair};
use crate::enrich::{Enrichment, Payload, TopicCategory, categorize_topic};
use crate::error::AnalysisError;

/// What to do when the enrichment capability fails on a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the run and return the error.
    #[default]
    Abort,
    /// Drop the rows of the failing file, record it and go on.
    SkipFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Entities,
    Sentiment,
    Topics,
}

/// One enrichment result for one annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub essay: String,
    /// Topic of the whole document, repeated on each of its rows.
    pub topic: Option<TopicCategory>,
    pub label: String,
    pub payload: Payload,
}

impl Row {
    pub fn entity_type(&self) -> Option<&str> {
        match &self.payload {
            Payload::Entity(e) => Some(&e.kind),
            _ => None,
        }
    }

    pub fn sentiment(&self) -> Option<f64> {
        match self.payload {
            Payload::Sentiment(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedTable {
    pub kind: TableKind,
    pub with_topic: bool,
    pub rows: Vec<Row>,
}

impl AggregatedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A file left out under [`FailurePolicy::SkipFile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub essay: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub table: AggregatedTable,
    pub failed_files: Vec<FailedFile>,
}

pub struct Aggregator<'a> {
    enrichment: &'a Enrichment<'a>,
    document_topic: bool,
    policy: FailurePolicy,
}

impl<'a> Aggregator<'a> {
    pub fn new(enrichment: &'a Enrichment<'a>) -> Self {
        Self {
            enrichment,
            document_topic: false,
            policy: FailurePolicy::Abort,
        }
    }

    /// Categorize each full document and carry the topic on its rows.
    pub fn with_document_topic(mut self, enabled: bool) -> Self {
        self.document_topic = enabled;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn table_kind(&self) -> TableKind {
        match self.enrichment {
            Enrichment::Entities { .. } => TableKind::Entities,
            Enrichment::Sentiment(_) => TableKind::Sentiment,
            Enrichment::Topics => TableKind::Topics,
        }
    }

    pub fn run(&self, corpus: &Corpus) -> Result<Aggregation, AnalysisError> {
        let mut rows = Vec::new();
        let mut failed_files = Vec::new();

        for pair in corpus.pairs() {
            match self.process_file(pair) {
                Ok(mut file_rows) => rows.append(&mut file_rows),
                Err(AnalysisError::Enrichment {
                    essay,
                    annotation,
                    message,
                }) if self.policy == FailurePolicy::SkipFile => {
                    log::warn!("Skipping {essay}: enrichment failed on {annotation}: {message}");
                    failed_files.push(FailedFile {
                        essay,
                        reason: format!("annotation {annotation}: {message}"),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "{} enrichment produced {} rows from {} files",
            self.enrichment.name(),
            rows.len(),
            corpus.len()
        );

        Ok(Aggregation {
            table: AggregatedTable {
                kind: self.table_kind(),
                with_topic: self.document_topic,
                rows,
            },
            failed_files,
        })
    }

    fn process_file(&self, pair: &CorpusPair) -> Result<Vec<Row>, AnalysisError> {
        let essay = pair.essay();
        let topic = if self.document_topic {
            let text =
                fs::read_to_string(&pair.text).map_err(|e| AnalysisError::file_access(&pair.text, e))?;
            Some(categorize_topic(&text))
        } else {
            None
        };

        let mut rows = Vec::new();
        for annotation in load_annotations(&pair.annotation)? {
            let payloads =
                self.enrichment
                    .apply(&annotation.text)
                    .map_err(|e| AnalysisError::Enrichment {
                        essay: essay.clone(),
                        annotation: annotation.id.clone(),
                        message: e.to_string(),
                    })?;
            rows.extend(payloads.into_iter().map(|payload| Row {
                essay: essay.clone(),
                topic,
                label: annotation.label.clone(),
                payload,
            }));
        }
        Ok(rows)
    }
}
