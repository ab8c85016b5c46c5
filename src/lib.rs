#![forbid(unsafe_code)]
//! # argument_analysis
//!
//! Entity, sentiment and topic analysis of argument components in essay
//! corpora annotated in brat standoff format (`essay.txt` + `essay.ann`).
//!
//! The pipeline runs in one pass:
//! [`corpus::discover`] → [`annotation::load_annotations`] →
//! [`enrich::Enrichment::apply`] → [`aggregate::Aggregator::run`], and the
//! resulting table is summarized by [`report`] and written by [`export`].
//!
//! ## Example
//! ```no_run
//! use std::path::Path;
//! use argument_analysis::{
//!     AnalysisOptions, Capabilities, HeuristicEntityExtractor, Mode, SentimentLexicon,
//!     analyze_corpus,
//! };
//!
//! let extractor = HeuristicEntityExtractor::new();
//! let lexicon = SentimentLexicon::default();
//! let caps = Capabilities { entities: &extractor, sentiment: &lexicon };
//! let opts = AnalysisOptions { mode: Mode::Sentiment, ..AnalysisOptions::default() };
//! let report = analyze_corpus(Path::new("brat-project"), &opts, &caps).unwrap();
//! println!("{}", report.summary);
//! ```

pub mod aggregate;
pub mod annotation;
pub mod corpus;
pub mod enrich;
pub mod error;
pub mod export;
pub mod report;

use std::path::{Path, PathBuf};

use clap::ValueEnum;

pub use aggregate::{AggregatedTable, Aggregator, FailedFile, FailurePolicy, Row, TableKind};
pub use annotation::{AnnotationRecord, Span, load_annotations, parse_annotations};
pub use corpus::{Corpus, CorpusPair, discover};
pub use enrich::{
    Enrichment, Entity, EntityExtractor, EntityFilter, EnrichmentError, HeuristicEntityExtractor,
    Payload, SentimentLexicon, SentimentScorer, TopicCategory, categorize_topic,
};
pub use error::AnalysisError;
pub use export::{ExportFormat, csv_safe_cell, export_table};

/// Which enrichment runs over the annotation texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Named entities per annotation, one row per entity.
    #[default]
    Entities,
    /// Sentiment polarity per annotation.
    Sentiment,
    /// Keyword topic per annotation.
    Topics,
}

/// Named entity type allow-lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityPreset {
    /// PERSON, NORP, GPE, ORG, FAC
    Demographic,
    /// PERSON, NORP
    Bias,
    /// ORG, PERSON, GPE, DATE
    Influence,
}

impl EntityPreset {
    pub fn filter(&self) -> EntityFilter {
        match self {
            EntityPreset::Demographic => EntityFilter::demographic(),
            EntityPreset::Bias => EntityFilter::bias(),
            EntityPreset::Influence => EntityFilter::influence(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub mode: Mode,
    /// Only for [`Mode::Entities`]; `None` keeps every type.
    pub entity_filter: Option<EntityFilter>,
    /// Add the topic of each full document as a column.
    pub document_topic: bool,
    pub failure_policy: FailurePolicy,
    pub export_format: ExportFormat,
    /// Export directory; `None` skips export.
    pub out_dir: Option<PathBuf>,
    /// Entries per summary section.
    pub top: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Entities,
            entity_filter: None,
            document_topic: false,
            failure_policy: FailurePolicy::Abort,
            export_format: ExportFormat::Txt,
            out_dir: None,
            top: 20,
        }
    }
}

/// Entity and sentiment capabilities, built once and shared by the run.
#[derive(Clone, Copy)]
pub struct Capabilities<'a> {
    pub entities: &'a dyn EntityExtractor,
    pub sentiment: &'a dyn SentimentScorer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub table: AggregatedTable,
    /// Files dropped under [`FailurePolicy::SkipFile`].
    pub failed_files: Vec<FailedFile>,
    /// Same text the CLI prints.
    pub summary: String,
    pub exported: Vec<PathBuf>,
}

/// Runs the full pipeline over the corpus at `root`.
pub fn analyze_corpus(
    root: &Path,
    opts: &AnalysisOptions,
    caps: &Capabilities,
) -> Result<AnalysisReport, AnalysisError> {
    let corpus = discover(root)?;

    let enrichment = match opts.mode {
        Mode::Entities => Enrichment::Entities {
            extractor: caps.entities,
            filter: opts.entity_filter.clone(),
        },
        Mode::Sentiment => Enrichment::Sentiment(caps.sentiment),
        Mode::Topics => Enrichment::Topics,
    };

    let aggregation = Aggregator::new(&enrichment)
        .with_document_topic(opts.document_topic)
        .with_failure_policy(opts.failure_policy)
        .run(&corpus)?;

    let summary = report::summary(&aggregation.table, opts.top);
    let exported = match &opts.out_dir {
        Some(dir) => export_table(
            &aggregation.table,
            enrichment.name(),
            dir,
            opts.export_format,
        )?,
        None => Vec::new(),
    };

    Ok(AnalysisReport {
        table: aggregation.table,
        failed_files: aggregation.failed_files,
        summary,
        exported,
    })
}

/// Prints files skipped during the run to stderr.
pub fn print_failed_files(failed: &[FailedFile]) {
    eprintln!("Skipped {} file(s):", failed.len());
    for f in failed {
        eprintln!("  {}: {}", f.essay, f.reason);
    }
}
