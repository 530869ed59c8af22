//! `doclib paths`: storage naming conventions.

use anyhow::Result;
use doclib_core::paths::{validate_path, PathRules, Severity};
use serde::Serialize;

use crate::config::Config;
use crate::discover::discover_documents;
use crate::report::{self, Finding, Outcome, OutputFormat};

#[derive(Debug, Clone, Serialize)]
pub struct PathsSummary {
    pub checked: usize,
    pub slug_pattern: String,
    pub max_depth: usize,
    pub outcome: Outcome,
}

/// Findings for every violation of one relative path.
pub fn path_findings<'a>(
    relative: &'a str,
    rules: &'a PathRules,
) -> impl Iterator<Item = Finding> + 'a {
    validate_path(relative, rules).into_iter().map(move |v| {
        let finding = match v.severity() {
            Severity::Error => Finding::error("path", v.to_string()),
            Severity::Warning => Finding::warning("path", v.to_string()),
        };
        finding.in_file(relative)
    })
}

pub fn run_paths(config: &Config) -> Result<PathsSummary> {
    let rules = config.paths.rules()?;
    let relatives: Vec<String> = discover_documents(config)?
        .into_iter()
        .map(|f| f.relative)
        .collect();
    Ok(check_paths(&relatives, &rules))
}

/// Check relative paths without touching the filesystem.
pub fn check_paths(relatives: &[String], rules: &PathRules) -> PathsSummary {
    let outcome = relatives
        .iter()
        .flat_map(|relative| path_findings(relative, rules))
        .collect();

    PathsSummary {
        checked: relatives.len(),
        slug_pattern: rules.slug_pattern().to_string(),
        max_depth: rules.max_depth(),
        outcome,
    }
}

pub fn print_paths_summary(summary: &PathsSummary, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return report::print_json(summary);
    }

    println!("Validating {} document paths...\n", summary.checked);
    report::print_findings("Path errors", &summary.outcome);

    println!("{}", report::rule());
    println!("Summary:");
    println!("  Total files: {}", summary.checked);
    println!("  Errors:      {}", summary.outcome.errors.len());
    println!("  Warnings:    {}", summary.outcome.warnings.len());

    if summary.outcome.failed() {
        println!("\nPath conventions:");
        println!("  - All lowercase");
        println!("  - Slugs match {}", summary.slug_pattern);
        println!("  - At most {} directory levels", summary.max_depth);
    } else {
        println!("\nAll paths valid.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reports_each_bad_path() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("sources");
        fs::create_dir_all(root.join("react/Hooks")).unwrap();
        fs::create_dir_all(root.join("react/old--api")).unwrap();
        fs::write(root.join("react/Hooks/use-state.md"), "x").unwrap();
        fs::write(root.join("react/old--api/page.md"), "x").unwrap();
        fs::write(root.join("react/good-page.md"), "x").unwrap();

        let mut cfg = Config::minimal();
        cfg.sources_dir = root;
        let summary = run_paths(&cfg).unwrap();

        assert_eq!(summary.checked, 3);
        assert!(summary.outcome.failed());
        assert!(summary
            .outcome
            .errors
            .iter()
            .any(|f| f.file.as_deref() == Some("react/Hooks/use-state.md")));
        assert!(!summary
            .outcome
            .errors
            .iter()
            .any(|f| f.file.as_deref() == Some("react/good-page.md")));
        // A hyphen run breaks the slug rule and also warns.
        assert!(summary
            .outcome
            .warnings
            .iter()
            .any(|f| f.file.as_deref() == Some("react/old--api/page.md")));
    }

    #[test]
    fn clean_corpus_passes() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("sources");
        fs::create_dir_all(root.join("vue/guide")).unwrap();
        fs::write(root.join("vue/guide/intro.md"), "x").unwrap();
        let mut cfg = Config::minimal();
        cfg.sources_dir = root;
        assert!(!run_paths(&cfg).unwrap().outcome.failed());
    }
}
