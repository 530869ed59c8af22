//! Loading the whole corpus at once.

use anyhow::Result;

use crate::config::Config;
use crate::discover::{discover_documents, DocumentFile};
use crate::frontmatter::{load_document, Document};
use crate::report::{Finding, Outcome};

/// Every discovered file, parsed where possible.
#[derive(Debug, Default)]
pub struct Corpus {
    pub documents: Vec<(DocumentFile, Document)>,
    /// Files that could not be read or parsed, as error findings.
    pub unreadable: Outcome,
    /// Number of discovered files, parsed or not.
    pub discovered: usize,
    /// Relative path of every discovered file, parsed or not.
    pub paths: Vec<String>,
}

/// Discover and parse every document. Per-file failures are collected, not raised.
pub fn load_corpus(config: &Config) -> Result<Corpus> {
    let files = discover_documents(config)?;
    let mut corpus = Corpus {
        discovered: files.len(),
        paths: files.iter().map(|f| f.relative.clone()).collect(),
        ..Corpus::default()
    };

    for file in files {
        match load_document(&file) {
            Ok(doc) => corpus.documents.push((file, doc)),
            Err(err) => {
                tracing::warn!(file = %file.relative, error = %err, "could not parse document");
                corpus.unreadable = std::mem::take(&mut corpus.unreadable)
                    .with(Finding::from_core(&file.relative, &err));
            }
        }
    }

    Ok(corpus)
}
