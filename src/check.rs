//! `doclib check`: every blocking check in one run, for CI.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::corpus::load_corpus;
use crate::duplicates::duplicates_in;
use crate::paths::check_paths;
use crate::report::{self, Outcome, OutputFormat};
use crate::sources::sources_in;
use crate::validate::validate_corpus;

/// Outcome of one check inside `check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckSection {
    pub name: &'static str,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckSummary {
    pub sections: Vec<CheckSection>,
}

impl CheckSummary {
    pub fn outcome(&self) -> Outcome {
        self.sections
            .iter()
            .map(|s| s.outcome.clone())
            .fold(Outcome::default(), Outcome::merge)
    }
}

/// Run validate, paths, duplicates, and (when a registry exists) sources
/// over one load of the corpus.
pub fn run_check(config: &Config, now: DateTime<Utc>) -> Result<CheckSummary> {
    let rules = config.paths.rules()?;
    let corpus = load_corpus(config)?;
    tracing::debug!(files = corpus.discovered, "corpus loaded for check");

    let mut sections = vec![
        CheckSection {
            name: "validate",
            outcome: validate_corpus(&corpus, now, config.quality.min_content_length).outcome,
        },
        CheckSection {
            name: "paths",
            outcome: check_paths(&corpus.paths, &rules).outcome,
        },
        CheckSection {
            name: "duplicates",
            outcome: duplicates_in(&corpus, config.duplicates.fail_on_multi_version).outcome,
        },
    ];

    if config.registry.sources.is_empty() {
        tracing::info!("no registry configured, skipping sources check");
    } else {
        sections.push(CheckSection {
            name: "sources",
            outcome: sources_in(config, &corpus)?.outcome,
        });
    }

    Ok(CheckSummary { sections })
}

pub fn print_check_summary(summary: &CheckSummary, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return report::print_json(summary);
    }

    for section in &summary.sections {
        if section.outcome.errors.is_empty() && section.outcome.warnings.is_empty() {
            continue;
        }
        eprintln!("== {} ==\n", section.name);
        report::print_findings("Errors", &section.outcome);
    }

    println!("{}", report::rule());
    println!("{:<12} {:>7} {:>9}", "CHECK", "ERRORS", "WARNINGS");
    for section in &summary.sections {
        println!(
            "{:<12} {:>7} {:>9}",
            section.name,
            section.outcome.errors.len(),
            section.outcome.warnings.len()
        );
    }

    if summary.outcome().failed() {
        eprintln!("\nCheck failed.");
    } else {
        println!("\nAll checks passed.");
    }
    Ok(())
}
