//! `doclib stale`: list documents captured too long ago.
//!
//! Staleness is advisory and never fails the run. Documents with an
//! unparseable `capturedAt` are reported as warnings and left out.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use doclib_core::stale::{find_stale, StaleCandidate, StaleReport};
use serde::Serialize;

use crate::config::Config;
use crate::corpus::load_corpus;
use crate::report::{self, Finding, Outcome, OutputFormat};

/// Rows listed per source in the markdown report.
const REPORT_ROWS_PER_SOURCE: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct StaleSummary {
    pub report: StaleReport,
    pub outcome: Outcome,
}

/// Classify the corpus against `threshold_days` as of `now`.
pub fn run_stale(config: &Config, threshold_days: u32, now: DateTime<Utc>) -> Result<StaleSummary> {
    let corpus = load_corpus(config)?;
    let mut outcome = corpus.unreadable.into_warnings();
    let mut candidates = Vec::with_capacity(corpus.documents.len());

    for (file, doc) in &corpus.documents {
        let record = &doc.record;
        let captured_at = record.captured_at_datetime();
        if record.captured_at.is_some() && captured_at.is_none() {
            outcome = outcome.with(
                Finding::warning("unparseable-date", "capturedAt is not a valid date")
                    .in_file(&file.relative)
                    .at_field("capturedAt"),
            );
        }
        candidates.push(StaleCandidate {
            id: file.relative.clone(),
            source: file.source_dir().to_string(),
            title: record.title.clone(),
            url: record.url.clone(),
            captured_at,
        });
    }

    let report = find_stale(&candidates, now, threshold_days);
    tracing::debug!(
        checked = report.checked,
        stale = report.stale_count(),
        unclassified = report.unclassified,
        "classified corpus"
    );

    Ok(StaleSummary { report, outcome })
}

/// Markdown report grouped by source, oldest first.
pub fn render_markdown(report: &StaleReport, generated: DateTime<Utc>) -> String {
    let mut out = String::from("# Stale Documentation Report\n\n");
    out.push_str(&format!("Generated: {}\n", generated.format("%Y-%m-%d")));
    out.push_str(&format!("Threshold: {} days\n\n", report.threshold_days));

    if report.groups.is_empty() {
        out.push_str("No stale documents found.\n");
        return out;
    }

    out.push_str(&format!(
        "Found {} stale documents across {} sources.\n\n",
        report.stale_count(),
        report.groups.len()
    ));

    for group in &report.groups {
        out.push_str(&format!(
            "## {} ({} stale)\n\n",
            group.source,
            group.documents.len()
        ));
        out.push_str("| Document | Captured | Age (days) |\n");
        out.push_str("|----------|----------|------------|\n");
        for doc in group.documents.iter().take(REPORT_ROWS_PER_SOURCE) {
            let label = doc.title.as_deref().unwrap_or(&doc.id);
            let cell = match &doc.url {
                Some(url) => format!("[{}]({})", escape_cell(label), url),
                None => escape_cell(label),
            };
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                cell,
                doc.captured_at.format("%Y-%m-%d"),
                doc.age_days
            ));
        }
        if group.documents.len() > REPORT_ROWS_PER_SOURCE {
            out.push_str(&format!(
                "\n_...and {} more_\n",
                group.documents.len() - REPORT_ROWS_PER_SOURCE
            ));
        }
        out.push('\n');
    }

    out
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

pub fn write_report(path: &Path, report: &StaleReport, generated: DateTime<Utc>) -> Result<()> {
    std::fs::write(path, render_markdown(report, generated))
        .with_context(|| format!("Failed to write stale report: {}", path.display()))
}

pub fn print_stale_summary(summary: &StaleSummary, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return report::print_json(summary);
    }

    let r = &summary.report;
    println!(
        "Checking {} documents for staleness (threshold: {} days)...\n",
        r.checked, r.threshold_days
    );

    for group in &r.groups {
        println!("  {} ({} stale)", group.source, group.documents.len());
        for doc in &group.documents {
            println!(
                "    {:>5}d  {}  {}",
                doc.age_days,
                doc.captured_at.format("%Y-%m-%d"),
                doc.id
            );
        }
        println!();
    }

    report::print_warnings(&summary.outcome);

    println!("{}", report::rule());
    println!("Summary:");
    println!("  Documents checked: {}", r.checked);
    println!("  Stale documents:   {}", r.stale_count());
    println!("  No capture date:   {}", r.unclassified);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use doclib_core::stale::{SourceGroup, StaleDocument};
    use std::fs;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn classifies_corpus() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("sources");
        fs::create_dir_all(root.join("react")).unwrap();
        fs::write(
            root.join("react/old.md"),
            "---\ntitle: Old\ncapturedAt: 2024-01-01\n---\n",
        )
        .unwrap();
        fs::write(
            root.join("react/new.md"),
            "---\ncapturedAt: '2024-11-01T00:00:00.000Z'\n---\n",
        )
        .unwrap();
        fs::write(root.join("react/none.md"), "---\ntitle: x\n---\n").unwrap();
        fs::write(root.join("react/bad.md"), "---\ncapturedAt: someday\n---\n").unwrap();

        let mut cfg = Config::minimal();
        cfg.sources_dir = root;

        let summary = run_stale(&cfg, 180, now()).unwrap();
        assert_eq!(summary.report.checked, 4);
        assert_eq!(summary.report.stale_count(), 1);
        assert_eq!(summary.report.unclassified, 2);
        assert_eq!(summary.report.groups[0].documents[0].id, "react/old.md");
        assert_eq!(summary.outcome.warnings.len(), 1);
        assert!(!summary.outcome.failed());
    }

    fn doc(i: usize) -> StaleDocument {
        StaleDocument {
            id: format!("react/doc-{}.md", i),
            title: Some(format!("Doc | {}", i)),
            url: Some(format!("https://react.dev/{}", i)),
            captured_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            age_days: 700,
        }
    }

    #[test]
    fn markdown_truncates_long_groups() {
        let report = StaleReport {
            threshold_days: 180,
            checked: 25,
            unclassified: 0,
            groups: vec![SourceGroup {
                source: "react".to_string(),
                documents: (0..25).map(doc).collect(),
            }],
        };
        let md = render_markdown(&report, now());
        assert!(md.starts_with("# Stale Documentation Report"));
        assert!(md.contains("## react (25 stale)"));
        assert!(md.contains("[Doc \\| 0](https://react.dev/0)"));
        assert!(!md.contains("Doc \\| 20"));
        assert!(md.contains("_...and 5 more_"));
    }

    #[test]
    fn markdown_for_clean_corpus() {
        let report = StaleReport {
            threshold_days: 30,
            checked: 3,
            unclassified: 0,
            groups: Vec::new(),
        };
        let md = render_markdown(&report, now());
        assert_eq!(
            md,
            "# Stale Documentation Report\n\nGenerated: 2024-12-01\nThreshold: 30 days\n\nNo stale documents found.\n"
        );
    }
}
