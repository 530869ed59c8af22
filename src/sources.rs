//! `doclib sources`: source directories against the registry.

use anyhow::{bail, Result};
use doclib_core::canonical;
use serde::Serialize;

use crate::config::{Config, RegistryConfig};
use crate::corpus::{load_corpus, Corpus};
use crate::discover::source_directories;
use crate::report::{self, Finding, Outcome, OutputFormat};

/// Manifest every source directory is expected to carry.
pub const SOURCE_MANIFEST: &str = ".source.yaml";

/// A source directory on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDir {
    pub name: String,
    pub has_manifest: bool,
}

/// What one document claims about its origin.
#[derive(Debug, Clone)]
pub struct DocumentOrigin<'a> {
    pub file: &'a str,
    pub directory: &'a str,
    pub source: Option<&'a str>,
    pub url: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourcesSummary {
    pub registered: usize,
    pub directories: Vec<SourceDir>,
    pub outcome: Outcome,
}

/// Compare directories and documents with the registry.
pub fn check_registry(
    registry: &RegistryConfig,
    dirs: &[SourceDir],
    documents: &[DocumentOrigin<'_>],
) -> Outcome {
    let mut outcome = Outcome::default();

    for dir in dirs {
        if !registry.sources.contains_key(&dir.name) {
            outcome = outcome.with(Finding::error(
                "unregistered-source",
                format!(
                    "Source directory \"{}\" is not registered in [registry.sources]",
                    dir.name
                ),
            ));
        }
        if !dir.has_manifest {
            outcome = outcome.with(Finding::warning(
                "missing-manifest",
                format!("Source \"{}\" has no {}", dir.name, SOURCE_MANIFEST),
            ));
        }
    }

    for name in registry.sources.keys() {
        if !dirs.iter().any(|d| &d.name == name) {
            outcome = outcome.with(Finding::warning(
                "missing-directory",
                format!("Registered source \"{}\" has no directory", name),
            ));
        }
    }

    for doc in documents {
        if let Some(source) = doc.source.filter(|s| !s.is_empty() && *s != doc.directory) {
            outcome = outcome.with(
                Finding::warning(
                    "source-mismatch",
                    format!(
                        "source \"{}\" does not match directory \"{}\"",
                        source, doc.directory
                    ),
                )
                .in_file(doc.file)
                .at_field("source"),
            );
        }

        let Some(host) = doc
            .url
            .and_then(|u| canonical::parse(u).ok())
            .and_then(|u| u.host_str().map(str::to_string))
        else {
            continue;
        };
        if let Some(mapped) = registry.domain_mapping.get(&host) {
            if mapped != doc.directory {
                outcome = outcome.with(
                    Finding::warning(
                        "domain-mismatch",
                        format!(
                            "URL host {} belongs to source \"{}\", found under \"{}\"",
                            host, mapped, doc.directory
                        ),
                    )
                    .in_file(doc.file)
                    .at_field("url"),
                );
            }
        }
    }

    outcome
}

pub fn run_sources(config: &Config) -> Result<SourcesSummary> {
    if config.registry.sources.is_empty() {
        bail!("No sources registered; add [registry.sources.<name>] entries to the config");
    }

    let corpus = load_corpus(config)?;
    sources_in(config, &corpus)
}

/// Check an already loaded corpus against the registry.
pub fn sources_in(config: &Config, corpus: &Corpus) -> Result<SourcesSummary> {
    let directories: Vec<SourceDir> = source_directories(config)?
        .into_iter()
        .map(|name| SourceDir {
            has_manifest: config.sources_dir.join(&name).join(SOURCE_MANIFEST).is_file(),
            name,
        })
        .collect();

    let origins: Vec<DocumentOrigin<'_>> = corpus
        .documents
        .iter()
        .map(|(file, doc)| DocumentOrigin {
            file: &file.relative,
            directory: file.source_dir(),
            source: doc.record.source.as_deref(),
            url: doc.record.url.as_deref(),
        })
        .collect();

    let outcome = check_registry(&config.registry, &directories, &origins);
    Ok(SourcesSummary {
        registered: config.registry.sources.len(),
        directories,
        outcome,
    })
}

pub fn print_sources_summary(
    summary: &SourcesSummary,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    if format == OutputFormat::Json {
        return report::print_json(summary);
    }

    println!("{:<24} {:<12} {:<10} NAME", "SOURCE", "REGISTERED", "MANIFEST");
    for dir in &summary.directories {
        let entry = config.registry.sources.get(&dir.name);
        println!(
            "{:<24} {:<12} {:<10} {}",
            dir.name,
            if entry.is_some() { "yes" } else { "NO" },
            if dir.has_manifest { "yes" } else { "missing" },
            entry.and_then(|e| e.name.as_deref()).unwrap_or("-")
        );
    }
    println!();

    report::print_findings("Registry errors", &summary.outcome);

    println!("{}", report::rule());
    println!("Summary:");
    println!("  Registered sources: {}", summary.registered);
    println!("  Source directories: {}", summary.directories.len());
    println!("  Errors:             {}", summary.outcome.errors.len());
    println!("  Warnings:           {}", summary.outcome.warnings.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceEntry;

    fn registry() -> RegistryConfig {
        let mut r = RegistryConfig::default();
        r.sources.insert("react".to_string(), SourceEntry::default());
        r.sources.insert("vue".to_string(), SourceEntry::default());
        r.domain_mapping
            .insert("react.dev".to_string(), "react".to_string());
        r
    }

    fn dir(name: &str, has_manifest: bool) -> SourceDir {
        SourceDir {
            name: name.to_string(),
            has_manifest,
        }
    }

    #[test]
    fn directory_checks() {
        let outcome = check_registry(
            &registry(),
            &[dir("react", true), dir("svelte", false)],
            &[],
        );
        let kinds: Vec<_> = outcome.errors.iter().map(|f| f.kind.as_str()).collect();
        assert_eq!(kinds, vec!["unregistered-source"]);
        let warnings: Vec<_> = outcome.warnings.iter().map(|f| f.kind.as_str()).collect();
        assert_eq!(warnings, vec!["missing-manifest", "missing-directory"]);
    }

    #[test]
    fn document_checks() {
        let docs = [
            DocumentOrigin {
                file: "vue/a.md",
                directory: "vue",
                source: Some("react"),
                url: Some("https://react.dev/learn"),
            },
            DocumentOrigin {
                file: "react/b.md",
                directory: "react",
                source: Some("react"),
                url: Some("not a url"),
            },
        ];
        let outcome = check_registry(&registry(), &[dir("react", true), dir("vue", true)], &docs);
        assert!(!outcome.failed());
        let kinds: Vec<_> = outcome.warnings.iter().map(|f| f.kind.as_str()).collect();
        assert_eq!(kinds, vec!["source-mismatch", "domain-mismatch"]);
        assert!(outcome.warnings.iter().all(|f| f.file.as_deref() == Some("vue/a.md")));
    }

    #[test]
    fn empty_registry_is_fatal() {
        let cfg = Config::minimal();
        let err = run_sources(&cfg).unwrap_err();
        assert!(err.to_string().contains("No sources registered"));
    }
}
