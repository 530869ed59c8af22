//! Document discovery under the sources root.

use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::config::Config;

/// A document file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    /// Absolute (or config-relative) path for reading and writing.
    pub path: PathBuf,
    /// Path under the sources root, always `/`-separated.
    pub relative: String,
}

impl DocumentFile {
    /// The source collection this file belongs to (first path segment).
    pub fn source_dir(&self) -> &str {
        doclib_core::paths::source_segment(&self.relative).unwrap_or_default()
    }
}

/// Walk `config.sources_dir` and return matching documents sorted by path.
///
/// A missing sources directory is not an error; it simply holds no documents.
pub fn discover_documents(config: &Config) -> Result<Vec<DocumentFile>> {
    let root = &config.sources_dir;
    if !root.exists() {
        tracing::warn!(root = %root.display(), "sources directory does not exist");
        return Ok(Vec::new());
    }

    let include_set = build_globset(&config.discovery.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(config.discovery.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = relative_slash_path(root, path);

        if exclude_set.is_match(&relative) {
            continue;
        }
        if !include_set.is_match(&relative) {
            continue;
        }

        files.push(DocumentFile {
            path: path.to_path_buf(),
            relative,
        });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    tracing::debug!(count = files.len(), root = %root.display(), "discovered documents");

    Ok(files)
}

/// Immediate subdirectories of the sources root, sorted by name.
pub fn source_directories(config: &Config) -> Result<Vec<String>> {
    let root = &config.sources_dir;
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
