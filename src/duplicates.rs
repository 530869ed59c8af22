//! `doclib duplicates`: find documents that share a canonical URL.

use anyhow::Result;
use doclib_core::cluster::{cluster, ClusterInput, ClusterReport};
use serde::Serialize;

use crate::config::Config;
use crate::corpus::{load_corpus, Corpus};
use crate::report::{self, Finding, Outcome, OutputFormat};

#[derive(Debug, Clone, Serialize)]
pub struct DuplicatesSummary {
    pub checked: usize,
    pub report: ClusterReport,
    pub outcome: Outcome,
}

/// Cluster inputs for every parsed document, in discovery order.
pub fn cluster_inputs(corpus: &Corpus) -> Vec<ClusterInput> {
    corpus
        .documents
        .iter()
        .map(|(file, doc)| ClusterInput {
            id: file.relative.clone(),
            url: doc.record.url.clone(),
            version: doc.record.version.value().cloned(),
        })
        .collect()
}

/// Turn a cluster report into findings.
///
/// Exact duplicates are errors. Version sprawl is an error only when
/// `fail_on_multi_version` is set; invalid URLs are always warnings.
pub fn findings(report: &ClusterReport, fail_on_multi_version: bool) -> Outcome {
    let duplicates = report.exact_duplicates.iter().map(|group| {
        Finding::error(
            "duplicate",
            format!(
                "{} (version: {}) appears in {} files: {}",
                group.url,
                group.version,
                group.files.len(),
                group.files.join(", ")
            ),
        )
        .at_field("url")
    });

    let sprawl = report
        .multi_version
        .iter()
        .filter(|_| fail_on_multi_version)
        .map(|group| {
            Finding::error(
                "multi-version",
                format!(
                    "{} captured under {} versions: {}",
                    group.url,
                    group.versions.len(),
                    group.versions.join(", ")
                ),
            )
            .at_field("version")
        });

    let invalid = report.invalid_urls.iter().map(|w| {
        Finding::warning("invalid-url", w.error.clone())
            .in_file(&w.id)
            .at_field("url")
    });

    duplicates.chain(sprawl).chain(invalid).collect()
}

pub fn run_duplicates(config: &Config) -> Result<DuplicatesSummary> {
    let corpus = load_corpus(config)?;
    Ok(duplicates_in(&corpus, config.duplicates.fail_on_multi_version))
}

/// Cluster an already loaded corpus.
pub fn duplicates_in(corpus: &Corpus, fail_on_multi_version: bool) -> DuplicatesSummary {
    let report = cluster(&cluster_inputs(corpus));
    for w in &report.invalid_urls {
        tracing::warn!(file = %w.id, error = %w.error, "invalid URL left out of clustering");
    }
    let outcome = corpus
        .unreadable
        .clone()
        .into_warnings()
        .merge(findings(&report, fail_on_multi_version));

    DuplicatesSummary {
        checked: corpus.documents.len(),
        report,
        outcome,
    }
}

pub fn print_duplicates_summary(summary: &DuplicatesSummary, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return report::print_json(summary);
    }

    let r = &summary.report;
    println!("Checking {} documents for duplicate URLs...\n", summary.checked);

    if !r.exact_duplicates.is_empty() {
        eprintln!("Exact duplicates (same URL + version):\n");
        for group in &r.exact_duplicates {
            eprintln!("  URL: {}", group.url);
            eprintln!("  Version: {}", group.version);
            eprintln!("  Files:");
            for file in &group.files {
                eprintln!("    - {}", file);
            }
            eprintln!();
        }
    }

    if !r.multi_version.is_empty() {
        println!("URLs with multiple versions (informational):\n");
        for group in &r.multi_version {
            println!("  URL: {}", group.url);
            println!("  Versions: {}", group.versions.join(", "));
            println!("  Total files: {}", group.count);
            println!();
        }
    }

    report::print_warnings(&summary.outcome);

    println!("{}", report::rule());
    println!("Summary:");
    println!("  Unique URLs:          {}", r.unique_urls);
    println!("  Exact duplicates:     {}", r.exact_duplicates.len());
    println!("  Multi-version URLs:   {}", r.multi_version.len());

    if summary.outcome.failed() {
        eprintln!(
            "\nDuplicate check failed with {} blocking finding(s).",
            summary.outcome.errors.len()
        );
    } else {
        println!("\nNo blocking duplicates found.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn corpus_with(docs: &[(&str, &str)]) -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        for (rel, content) in docs {
            let path = tmp.path().join("sources").join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let mut cfg = Config::minimal();
        cfg.sources_dir = tmp.path().join("sources");
        (tmp, cfg)
    }

    #[test]
    fn exact_duplicates_fail() {
        let (_tmp, cfg) = corpus_with(&[
            ("react/a.md", "---\nurl: https://react.dev/learn/\n---\n"),
            ("react/b.md", "---\nurl: https://react.dev/learn?tab=1\n---\n"),
            ("react/c.md", "---\nurl: https://react.dev/reference\n---\n"),
        ]);
        let summary = run_duplicates(&cfg).unwrap();
        assert!(summary.outcome.failed());
        assert_eq!(summary.report.exact_duplicates.len(), 1);
        assert_eq!(
            summary.report.exact_duplicates[0].files,
            vec!["react/a.md", "react/b.md"]
        );
        assert_eq!(summary.report.unique_urls, 2);
    }

    #[test]
    fn multi_version_is_informational_by_default() {
        let (_tmp, mut cfg) = corpus_with(&[
            ("vue/v2/a.md", "---\nurl: https://vuejs.org/guide\nversion: '2'\n---\n"),
            ("vue/v3/a.md", "---\nurl: https://vuejs.org/guide\nversion: '3'\n---\n"),
        ]);
        let summary = run_duplicates(&cfg).unwrap();
        assert!(!summary.outcome.failed());
        assert_eq!(summary.report.multi_version.len(), 1);

        cfg.duplicates.fail_on_multi_version = true;
        let strict = run_duplicates(&cfg).unwrap();
        assert!(strict.outcome.failed());
        assert_eq!(strict.outcome.errors[0].kind, "multi-version");
    }

    #[test]
    fn invalid_urls_are_warnings() {
        let (_tmp, cfg) = corpus_with(&[("a/x.md", "---\nurl: not a url\n---\n")]);
        let summary = run_duplicates(&cfg).unwrap();
        assert!(!summary.outcome.failed());
        assert_eq!(summary.outcome.warnings[0].kind, "invalid-url");
        assert_eq!(summary.outcome.warnings[0].file.as_deref(), Some("a/x.md"));
    }
}
