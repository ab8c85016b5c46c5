//! Discovery of (document, annotation) file pairs in a corpus directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::AnalysisError;

pub const TEXT_EXTENSION: &str = "txt";
pub const ANNOTATION_EXTENSION: &str = "ann";

/// A document and its standoff annotation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusPair {
    pub text: PathBuf,
    pub annotation: PathBuf,
}

impl CorpusPair {
    /// File name of the document, used as the essay identifier in rows.
    pub fn essay(&self) -> String {
        self.text
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Ordered set of pairs found in one corpus directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    pairs: Vec<CorpusPair>,
}

impl Corpus {
    pub fn pairs(&self) -> &[CorpusPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Annotation path for a document: same base name, `.ann` extension.
pub fn annotation_path_for(text: &Path) -> PathBuf {
    text.with_extension(ANNOTATION_EXTENSION)
}

/// Lists the direct children of `root` and pairs every `.txt` file with
/// its `.ann` sibling. Documents without an annotation file are left out.
/// Pairs are ordered by file name.
pub fn discover(root: &Path) -> Result<Corpus, AnalysisError> {
    if !root.is_dir() {
        return Err(AnalysisError::CorpusNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut pairs = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            AnalysisError::file_access(path, source)
        })?;
        // follows symlinks, same as the annotation check below
        if !entry.path().is_file() {
            continue;
        }
        let is_text = entry
            .path()
            .extension()
            .map(|e| e == TEXT_EXTENSION)
            .unwrap_or(false);
        if !is_text {
            continue;
        }

        let text = entry.into_path();
        let annotation = annotation_path_for(&text);
        if annotation.is_file() {
            pairs.push(CorpusPair { text, annotation });
        } else {
            log::debug!("No annotation file for {}, skipping", text.display());
        }
    }

    log::info!("Found {} annotated documents in {}", pairs.len(), root.display());
    Ok(Corpus { pairs })
}
