//! Corpus statistics.
//!
//! A quick summary of what the corpus holds: per-source document counts,
//! the most recent capture, and the versions and languages present. Built
//! as a pure fold so a partial corpus can be summarized the same way.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use chrono::{DateTime, Utc};
use doclib_core::FrontmatterRecord;
use serde::Serialize;

use crate::config::Config;
use crate::corpus::load_corpus;
use crate::discover::source_directories;
use crate::report::{self, OutputFormat};

/// Per-source breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub document_count: usize,
    pub last_captured_at: Option<DateTime<Utc>>,
    pub versions: BTreeSet<String>,
    pub languages: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub sources: BTreeMap<String, SourceStats>,
}

impl CorpusStats {
    /// Start with empty entries for `sources`, so empty directories still show.
    pub fn with_sources<I: IntoIterator<Item = String>>(sources: I) -> Self {
        Self {
            sources: sources
                .into_iter()
                .map(|s| (s, SourceStats::default()))
                .collect(),
        }
    }

    /// Account for one document. `record` is `None` when it did not parse.
    pub fn fold(mut self, source: &str, record: Option<&FrontmatterRecord>) -> Self {
        let entry = self.sources.entry(source.to_string()).or_default();
        entry.document_count += 1;

        if let Some(record) = record {
            if let Some(captured) = record.captured_at_datetime() {
                entry.last_captured_at = entry.last_captured_at.max(Some(captured));
            }
            if let Some(v) = record.version.value().filter(|v| !v.is_empty()) {
                entry.versions.insert(v.clone());
            }
            if let Some(l) = record.language.value().filter(|l| !l.is_empty()) {
                entry.languages.insert(l.clone());
            }
        }
        self
    }

    pub fn total_documents(&self) -> usize {
        self.sources.values().map(|s| s.document_count).sum()
    }

    /// Sources by document count, largest first; ties by name.
    pub fn ranked(&self) -> Vec<(&str, &SourceStats)> {
        let mut rows: Vec<_> = self
            .sources
            .iter()
            .map(|(name, stats)| (name.as_str(), stats))
            .collect();
        rows.sort_by(|a, b| b.1.document_count.cmp(&a.1.document_count).then(a.0.cmp(b.0)));
        rows
    }
}

pub fn run_stats(config: &Config) -> Result<CorpusStats> {
    let corpus = load_corpus(config)?;
    let start = CorpusStats::with_sources(source_directories(config)?);

    let parsed = corpus
        .documents
        .iter()
        .map(|(file, doc)| (file.source_dir(), Some(&doc.record)));
    let unparsed = corpus
        .unreadable
        .errors
        .iter()
        .filter_map(|f| f.file.as_deref())
        .map(|file| (doclib_core::paths::source_segment(file).unwrap_or_default(), None));

    Ok(parsed
        .chain(unparsed)
        .fold(start, |stats, (source, record)| stats.fold(source, record)))
}

pub fn print_stats(stats: &CorpusStats, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return report::print_json(stats);
    }

    println!("Documentation Corpus Stats");
    println!("==========================");
    println!();
    println!("  Sources:     {}", stats.sources.len());
    println!("  Documents:   {}", stats.total_documents());

    if stats.sources.is_empty() {
        println!();
        return Ok(());
    }

    println!();
    println!("  By source:");
    println!(
        "  {:<24} {:>6}   {:<12} {:<16} {}",
        "SOURCE", "DOCS", "LAST CAPTURE", "VERSIONS", "LANGUAGES"
    );
    println!("  {}", "-".repeat(76));

    for (name, s) in stats.ranked() {
        let captured = s
            .last_captured_at
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "  {:<24} {:>6}   {:<12} {:<16} {}",
            name,
            s.document_count,
            captured,
            join_or_dash(&s.versions),
            join_or_dash(&s.languages)
        );
    }
    println!();

    Ok(())
}

fn join_or_dash(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        "-".to_string()
    } else {
        set.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}
