//! `doclib fix`: apply the normalization rules to every document.
//!
//! Unparseable documents and documents whose modeled fields have the wrong
//! YAML type are skipped with a warning; `validate` reports them properly.
//! Fixing never fails the run.

use anyhow::{Context, Result};
use doclib_core::normalize::{normalize, AppliedFix, NormalizeContext, Normalized};
use serde::Serialize;

use crate::config::Config;
use crate::corpus::load_corpus;
use crate::discover::DocumentFile;
use crate::frontmatter::{render_document, Document};
use crate::report::{self, Finding, Outcome, OutputFormat};

/// Fixes applied (or planned) for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileFixes {
    pub file: String,
    pub fixes: Vec<AppliedFix>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FixSummary {
    pub dry_run: bool,
    pub processed: usize,
    pub files: Vec<FileFixes>,
    pub outcome: Outcome,
}

impl FixSummary {
    pub fn total_fixes(&self) -> usize {
        self.files.iter().map(|f| f.fixes.len()).sum()
    }
}

/// Normalize one parsed document. `None` when it must be left alone.
pub fn plan_fix(doc: &Document) -> Option<Normalized> {
    if !doc.type_errors.is_empty() {
        return None;
    }
    let ctx = NormalizeContext {
        path: &doc.relative,
    };
    Some(normalize(&doc.record, &ctx))
}

/// Render the normalized frontmatter and write it back to the file.
pub fn write_fixed(file: &DocumentFile, doc: &Document, normalized: &Normalized) -> Result<()> {
    let rendered = render_document(doc, &normalized.record)?;
    std::fs::write(&file.path, rendered)
        .with_context(|| format!("Failed to write {}", file.path.display()))
}

/// Run the fixer over the corpus, writing files unless `dry_run`.
pub fn run_fix(config: &Config, dry_run: bool) -> Result<FixSummary> {
    let corpus = load_corpus(config)?;
    let mut outcome = corpus.unreadable.into_warnings();
    let mut files = Vec::new();

    for (file, doc) in &corpus.documents {
        let Some(normalized) = plan_fix(doc) else {
            tracing::warn!(file = %file.relative, "skipping document with mistyped fields");
            outcome = outcome.with(
                Finding::warning("skipped", "Fields have unexpected types; run validate")
                    .in_file(&file.relative),
            );
            continue;
        };
        if !normalized.changed() {
            continue;
        }

        if !dry_run {
            if let Err(err) = write_fixed(file, doc, &normalized) {
                tracing::warn!(file = %file.relative, error = %err, "fix not written");
                outcome = outcome.with(
                    Finding::warning("write-failure", format!("{:#}", err)).in_file(&file.relative),
                );
                continue;
            }
        }

        tracing::debug!(file = %file.relative, fixes = normalized.fixes.len(), "normalized");
        files.push(FileFixes {
            file: file.relative.clone(),
            fixes: normalized.fixes,
        });
    }

    Ok(FixSummary {
        dry_run,
        processed: corpus.discovered,
        files,
        outcome,
    })
}

pub fn print_fix_summary(summary: &FixSummary, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return report::print_json(summary);
    }

    println!("Scanning {} documents for fixable issues...\n", summary.processed);

    let verb = if summary.dry_run { "Would fix" } else { "Fixed" };
    for file in &summary.files {
        println!("  {}: {}", verb, file.file);
        for fix in &file.fixes {
            println!("    - {}", fix.description);
        }
    }

    report::print_findings("Errors", &summary.outcome);

    println!("\n{}", report::rule());
    println!("Summary:");
    println!("  Files processed: {}", summary.processed);
    println!("  Files fixed:     {}", summary.files.len());
    println!("  Total fixes:     {}", summary.total_fixes());
    if summary.dry_run && !summary.files.is_empty() {
        println!("\nRun without --dry-run to apply fixes.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::parse_document;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(tmp: &TempDir) -> Config {
        let mut cfg = Config::minimal();
        cfg.sources_dir = tmp.path().join("sources");
        cfg
    }

    fn write(tmp: &TempDir, rel: &str, content: &str) {
        let path = tmp.path().join("sources").join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn plan_skips_mistyped_documents() {
        let doc = parse_document("react/a.md", "---\ntags: {a: 1}\n---\nbody\n").unwrap();
        assert!(plan_fix(&doc).is_none());
    }

    #[test]
    fn plan_fills_source_from_path() {
        let doc = parse_document("react/hooks/a.md", "---\ntitle: A\n---\nbody\n").unwrap();
        let planned = plan_fix(&doc).unwrap();
        assert_eq!(planned.record.source.as_deref(), Some("react"));
    }

    #[test]
    fn fixes_files_in_place() {
        let tmp = TempDir::new().unwrap();
        write(
            &tmp,
            "react/hooks.md",
            "---\ntitle: '  Hooks '\nurl: https://react.dev/hooks/?x=1#top\ntags: [React Hooks]\nextra: 1\n---\nBody\n",
        );
        let cfg = config_for(&tmp);

        let summary = run_fix(&cfg, false).unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.files.len(), 1);
        assert!(!summary.outcome.failed());

        let content = fs::read_to_string(tmp.path().join("sources/react/hooks.md")).unwrap();
        let doc = parse_document("react/hooks.md", &content).unwrap();
        assert_eq!(doc.record.title.as_deref(), Some("Hooks"));
        assert_eq!(doc.record.url.as_deref(), Some("https://react.dev/hooks"));
        assert_eq!(doc.record.source.as_deref(), Some("react"));
        assert!(doc.has_key("extra"));
        assert_eq!(doc.body, "Body\n");

        // Second pass has nothing left to do.
        let again = run_fix(&cfg, false).unwrap();
        assert!(again.files.is_empty());
    }

    #[test]
    fn write_failure_is_reported_not_raised() {
        let tmp = TempDir::new().unwrap();
        let doc = parse_document("react/a.md", "---\ntitle: ' A '\n---\nbody\n").unwrap();
        let planned = plan_fix(&doc).unwrap();
        let file = DocumentFile {
            path: tmp.path().join("missing-dir/a.md"),
            relative: "react/a.md".to_string(),
        };
        let err = write_fixed(&file, &doc, &planned).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to write"));
    }

    #[test]
    fn dry_run_leaves_files_untouched() {
        let tmp = TempDir::new().unwrap();
        let original = "---\ntitle: ' x '\n---\nBody\n";
        write(&tmp, "vue/intro.md", original);
        let cfg = config_for(&tmp);

        let summary = run_fix(&cfg, true).unwrap();
        assert_eq!(summary.files.len(), 1);
        assert!(summary.total_fixes() >= 2);
        let content = fs::read_to_string(tmp.path().join("sources/vue/intro.md")).unwrap();
        assert_eq!(content, original);
    }

    #[test]
    fn broken_yaml_is_a_warning() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "vue/bad.md", "---\ntitle: [oops\n---\n");
        let summary = run_fix(&config_for(&tmp), false).unwrap();
        assert!(!summary.outcome.failed());
        assert_eq!(summary.outcome.warnings.len(), 1);
    }
}
