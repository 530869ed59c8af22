//! Batch outcomes and output formatting.
//!
//! Commands never stop at the first bad document. Every per-document
//! problem becomes a [`Finding`]; findings are folded into an [`Outcome`]
//! and only the CLI decides the exit code from it.

use serde::Serialize;

use doclib_core::paths::Severity;
use doclib_core::CoreError;

/// How command results are printed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Readable report on stdout, errors on stderr.
    Human,
    /// A single JSON document on stdout.
    Json,
}

/// One problem found in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    /// Short machine-readable category, e.g. `duplicate` or `source-mismatch`.
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl Finding {
    pub fn error(kind: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind: kind.to_string(),
            file: None,
            field: None,
            message: message.into(),
        }
    }

    pub fn warning(kind: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, message)
        }
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn at_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Error finding for a typed core error.
    pub fn from_core(file: &str, err: &CoreError) -> Self {
        let kind = match err {
            CoreError::ParseFailure(_) => "parse-failure",
            CoreError::InvalidUrl { .. } => "invalid-url",
            CoreError::FutureTimestamp { .. } => "future-timestamp",
            CoreError::SchemaViolation { .. } => "schema",
        };
        let finding = Finding::error(kind, err.to_string()).in_file(file);
        match err.field() {
            Some(field) => finding.at_field(field),
            None => finding,
        }
    }
}

/// Errors and warnings accumulated over a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl Outcome {
    /// Combine two outcomes, keeping order.
    pub fn merge(mut self, other: Outcome) -> Outcome {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self
    }

    pub fn with(mut self, finding: Finding) -> Outcome {
        match finding.severity {
            Severity::Error => self.errors.push(finding),
            Severity::Warning => self.warnings.push(finding),
        }
        self
    }

    pub fn failed(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Same findings, none of them blocking.
    pub fn into_warnings(self) -> Outcome {
        let warnings = self
            .errors
            .into_iter()
            .map(|f| Finding {
                severity: Severity::Warning,
                ..f
            })
            .chain(self.warnings)
            .collect();
        Outcome {
            errors: Vec::new(),
            warnings,
        }
    }
}

impl FromIterator<Finding> for Outcome {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        iter.into_iter().fold(Outcome::default(), Outcome::with)
    }
}

/// Print findings the way every human report does.
pub fn print_findings(error_heading: &str, outcome: &Outcome) {
    if !outcome.errors.is_empty() {
        eprintln!("{}:\n", error_heading);
        for f in &outcome.errors {
            print_finding(f);
        }
    }
    print_warnings(outcome);
}

pub fn print_warnings(outcome: &Outcome) {
    if !outcome.warnings.is_empty() {
        eprintln!("Warnings:\n");
        for f in &outcome.warnings {
            print_finding(f);
        }
    }
}

fn print_finding(f: &Finding) {
    let location = f.file.as_deref().unwrap_or(&f.kind);
    let field = f
        .field
        .as_deref()
        .map(|field| format!("[{}] ", field))
        .unwrap_or_default();
    eprintln!("  {}\n    {}{}\n", location, field, f.message);
}

/// Separator line used above summaries.
pub fn rule() -> String {
    "-".repeat(50)
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_by_severity() {
        let outcome: Outcome = vec![
            Finding::error("duplicate", "dup"),
            Finding::warning("invalid-url", "bad"),
            Finding::error("duplicate", "dup2"),
        ]
        .into_iter()
        .collect();
        assert_eq!(outcome.errors.len(), 2);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.failed());
    }

    #[test]
    fn warnings_alone_do_not_fail() {
        let outcome = Outcome::default().with(Finding::warning("x", "y"));
        assert!(!outcome.failed());
    }

    #[test]
    fn demoting_errors() {
        let outcome = Outcome::default()
            .with(Finding::error("parse-failure", "bad"))
            .with(Finding::warning("x", "y"));
        let demoted = outcome.into_warnings();
        assert!(!demoted.failed());
        assert_eq!(demoted.warnings.len(), 2);
        assert_eq!(demoted.warnings[0].severity, Severity::Warning);
    }

    #[test]
    fn merge_keeps_order() {
        let a = Outcome::default().with(Finding::error("a", "1"));
        let b = Outcome::default().with(Finding::error("b", "2"));
        let merged = a.merge(b);
        let kinds: Vec<_> = merged.errors.iter().map(|f| f.kind.as_str()).collect();
        assert_eq!(kinds, vec!["a", "b"]);
    }

    #[test]
    fn core_errors_carry_field() {
        let err = CoreError::FutureTimestamp {
            field: "capturedAt".to_string(),
        };
        let f = Finding::from_core("react/a.md", &err);
        assert_eq!(f.kind, "future-timestamp");
        assert_eq!(f.field.as_deref(), Some("capturedAt"));
        assert_eq!(f.file.as_deref(), Some("react/a.md"));
    }

    #[test]
    fn json_shape() {
        let f = Finding::warning("missing-source-yaml", "no manifest");
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["severity"], "warning");
        assert!(json.get("file").is_none());
    }
}
