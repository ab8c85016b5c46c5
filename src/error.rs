use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by corpus analysis.
///
/// Malformed annotation lines and text files without a matching `.ann`
/// file are recovered locally and never show up here.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The corpus root does not exist or is not a directory.
    #[error("Corpus directory not found: {}", path.display())]
    CorpusNotFound { path: PathBuf },

    /// A listed file could not be opened or read.
    #[error("Cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The entity or sentiment capability failed on an annotation span.
    #[error("Enrichment failed for {essay} (annotation {annotation}): {message}")]
    Enrichment {
        essay: String,
        annotation: String,
        message: String,
    },

    /// The additional sentiment lexicon could not be loaded.
    #[error("Invalid lexicon {}: {message}", path.display())]
    Lexicon { path: PathBuf, message: String },

    /// Writing an export file failed.
    #[error("Export to {} failed: {message}", path.display())]
    Export { path: PathBuf, message: String },
}

impl AnalysisError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::FileAccess {
            path: path.into(),
            source,
        }
    }
}
