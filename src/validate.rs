//! `doclib validate`: frontmatter schema checks.
//!
//! Every document is checked completely; one bad field never hides the next.

use anyhow::Result;
use chrono::{DateTime, Utc};
use doclib_core::{canonical, CoreError, Field, Tags, Timestamp};
use serde::Serialize;
use serde_yaml::Value;

use crate::config::Config;
use crate::corpus::{load_corpus, Corpus};
use crate::frontmatter::{Document, MODELED_KEYS};
use crate::report::{self, Finding, Outcome, OutputFormat};

#[derive(Debug, Clone, Serialize)]
pub struct ValidateSummary {
    pub checked: usize,
    pub valid: usize,
    pub outcome: Outcome,
}

/// Every schema finding for one document.
pub fn validate_document(doc: &Document, now: DateTime<Utc>, min_content_length: usize) -> Outcome {
    let file = doc.relative.as_str();
    if !doc.has_frontmatter || doc.raw.is_empty() {
        return Outcome::default().with(
            Finding::error("schema", "No frontmatter found").in_file(file),
        );
    }

    let mut errors: Vec<CoreError> = doc.type_errors.clone();
    let mistyped = |key: &str| doc.type_errors.iter().any(|e| e.field() == Some(key));

    for key in MODELED_KEYS {
        if key != "source" && doc.raw.get(key) == Some(&Value::Null) {
            errors.push(CoreError::schema(key, "must not be null"));
        }
    }

    if !mistyped("source") && doc.record.source.as_deref().map_or(true, str::is_empty) {
        errors.push(CoreError::schema(
            "source",
            "must have required property 'source'",
        ));
    }

    if let Some(url) = doc.record.url.as_deref() {
        if let Err(err) = canonical::parse(url) {
            errors.push(err);
        }
    }

    if let Some(ts) = &doc.record.captured_at {
        match ts.to_datetime() {
            Some(dt) if dt > now => errors.push(CoreError::FutureTimestamp {
                field: "capturedAt".to_string(),
            }),
            Some(_) => {}
            None => errors.push(not_a_date("capturedAt", ts)),
        }
    }

    if let Field::Value(ts) = &doc.record.last_modified {
        if ts.to_datetime().is_none() {
            errors.push(not_a_date("lastModified", ts));
        }
    }

    if let Field::Value(Tags::Text(_)) = &doc.record.tags {
        errors.push(CoreError::schema("tags", "must be a list of strings"));
    }

    let mut outcome: Outcome = errors
        .iter()
        .map(|err| Finding::from_core(file, err))
        .collect();

    let length = doc.body.trim().chars().count();
    if length < min_content_length {
        outcome = outcome.with(
            Finding::warning(
                "short-content",
                format!(
                    "Content is {} characters, below the minimum of {}",
                    length, min_content_length
                ),
            )
            .in_file(file),
        );
    }

    outcome
}

fn not_a_date(field: &str, ts: &Timestamp) -> CoreError {
    let shown = match ts {
        Timestamp::Text(s) => s.as_str(),
        Timestamp::Date(_) => "",
    };
    CoreError::schema(
        field,
        format!("must be a date or ISO-8601 string, got \"{}\"", shown),
    )
}

pub fn run_validate(config: &Config, now: DateTime<Utc>) -> Result<ValidateSummary> {
    let corpus = load_corpus(config)?;
    Ok(validate_corpus(&corpus, now, config.quality.min_content_length))
}

/// Validate an already loaded corpus.
pub fn validate_corpus(
    corpus: &Corpus,
    now: DateTime<Utc>,
    min_content_length: usize,
) -> ValidateSummary {
    let per_document: Vec<Outcome> = corpus
        .documents
        .iter()
        .map(|(_, doc)| validate_document(doc, now, min_content_length))
        .collect();

    let valid = per_document.iter().filter(|o| !o.failed()).count();
    let outcome = per_document
        .into_iter()
        .fold(corpus.unreadable.clone(), Outcome::merge);

    ValidateSummary {
        checked: corpus.discovered,
        valid,
        outcome,
    }
}

pub fn print_validate_summary(summary: &ValidateSummary, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return report::print_json(summary);
    }

    println!("Validating {} documents...\n", summary.checked);
    report::print_findings("Validation errors", &summary.outcome);

    println!("{}", report::rule());
    println!("Summary:");
    println!("  Total files: {}", summary.checked);
    println!("  Valid:       {}", summary.valid);
    println!("  Errors:      {}", summary.outcome.errors.len());
    println!("  Warnings:    {}", summary.outcome.warnings.len());

    if !summary.outcome.failed() {
        println!("\nAll documents valid.");
    }
    Ok(())
}
