#![forbid(unsafe_code)]
//! # Argument Analysis CLI
//!
//! Command-line interface for the `argument_analysis` crate. Runs entity,
//! sentiment or topic analysis over the argument components of a brat
//! corpus directory and exports the aggregated table.
//!
//! ## Example
//! ```bash
//! cargo run --release -- path/to/brat-project --mode entities --preset demographic --export-format csv
//! ```
//!
//! See `--help` for all available options.

use std::path::{Path, PathBuf};
use std::process;

use argument_analysis::{
    AnalysisOptions, Capabilities, EntityFilter, EntityPreset, ExportFormat, FailurePolicy,
    HeuristicEntityExtractor, Mode, SentimentLexicon, analyze_corpus, print_failed_files,
};
use clap::Parser;
use log::{error, info};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Corpus directory containing .txt and .ann pairs
    path: PathBuf,

    /// Enrichment applied to each annotation
    #[arg(long, value_enum, default_value = "entities")]
    mode: Mode,

    /// Keep only these entity types (comma-separated, e.g. PERSON,NORP)
    #[arg(long, value_delimiter = ',')]
    entity_types: Vec<String>,

    /// Predefined entity type list; ignored when --entity-types is given
    #[arg(long, value_enum)]
    preset: Option<EntityPreset>,

    /// Add the topic of each whole essay as a column
    #[arg(long, default_value_t = false)]
    document_topic: bool,

    /// Skip essays whose enrichment fails instead of aborting the run
    #[arg(long, default_value_t = false)]
    skip_failed_files: bool,

    /// Extra sentiment lexicon (word<TAB>polarity per line)
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Output format for export (txt, csv, tsv, json)
    #[arg(long, value_enum, default_value = "txt")]
    export_format: ExportFormat,

    /// Directory for exported files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Entries per summary section
    #[arg(long, default_value_t = 20)]
    top: usize,
}

impl Cli {
    fn options(&self) -> AnalysisOptions {
        let entity_filter = if !self.entity_types.is_empty() {
            Some(EntityFilter::new(&self.entity_types))
        } else {
            self.preset.map(|p| p.filter())
        };
        AnalysisOptions {
            mode: self.mode,
            entity_filter,
            document_topic: self.document_topic,
            failure_policy: if self.skip_failed_files {
                FailurePolicy::SkipFile
            } else {
                FailurePolicy::Abort
            },
            export_format: self.export_format,
            out_dir: Some(self.out_dir.clone()),
            top: self.top,
        }
    }
}

fn load_lexicon(extra: Option<&Path>) -> SentimentLexicon {
    let mut lexicon = SentimentLexicon::default();
    if let Some(path) = extra {
        if let Err(e) = lexicon.load_tsv(path) {
            error!("Error: {}", e);
            process::exit(1);
        }
    }
    lexicon
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // Capabilities are loaded once and passed into the pipeline.
    let extractor = HeuristicEntityExtractor::new();
    let lexicon = load_lexicon(cli.lexicon.as_deref());
    let caps = Capabilities {
        entities: &extractor,
        sentiment: &lexicon,
    };

    match analyze_corpus(&cli.path, &cli.options(), &caps) {
        Ok(report) => {
            println!("{}", report.summary);
            for path in &report.exported {
                info!("Exported {}", path.display());
            }
            if !report.failed_files.is_empty() {
                print_failed_files(&report.failed_files);
            }
        }
        Err(e) => {
            error!("Error: {}", e);
            process::exit(1);
        }
    }
}
