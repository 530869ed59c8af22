//! TOML configuration.
//!
//! Every section is optional; a corpus with no config file at all is
//! checked with the defaults below.
//!
//! ```toml
//! sources_dir = "sources"
//!
//! [discovery]
//! include_globs = ["**/*.md"]
//! exclude_globs = ["**/README.md"]
//!
//! [quality]
//! stale_threshold_days = 180
//! min_content_length = 100
//!
//! [paths]
//! max_depth = 6
//! slug_pattern = "^[a-z0-9]+(?:-[a-z0-9]+)*$"
//! reserved = [".source.yaml", ".git", "node_modules", "README.md"]
//!
//! [duplicates]
//! fail_on_multi_version = false
//!
//! [registry.sources.react]
//! name = "React"
//! homepage = "https://react.dev"
//!
//! [registry.domain_mapping]
//! "react.dev" = "react"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use doclib_core::paths::{PathRules, DEFAULT_SLUG_PATTERN};
use serde::Deserialize;

/// Config location used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = ".doclib/config.toml";

/// Largest accepted staleness threshold, in days (100 years).
pub const MAX_STALE_THRESHOLD_DAYS: u32 = 36_500;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_sources_dir")]
    pub sources_dir: PathBuf,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub duplicates: DuplicatesConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

fn default_sources_dir() -> PathBuf {
    PathBuf::from("sources")
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscoveryConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default = "default_exclude_globs")]
    pub exclude_globs: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: default_exclude_globs(),
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string()]
}
fn default_exclude_globs() -> Vec<String> {
    vec!["**/README.md".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct QualityConfig {
    #[serde(default = "default_stale_threshold_days")]
    pub stale_threshold_days: u32,
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            stale_threshold_days: default_stale_threshold_days(),
            min_content_length: default_min_content_length(),
        }
    }
}

fn default_stale_threshold_days() -> u32 {
    180
}
fn default_min_content_length() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_slug_pattern")]
    pub slug_pattern: String,
    #[serde(default = "default_reserved")]
    pub reserved: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            slug_pattern: default_slug_pattern(),
            reserved: default_reserved(),
        }
    }
}

impl PathsConfig {
    pub fn rules(&self) -> Result<PathRules> {
        PathRules::new(&self.slug_pattern, self.max_depth, self.reserved.clone())
            .with_context(|| format!("Invalid paths.slug_pattern: {}", self.slug_pattern))
    }
}

fn default_max_depth() -> usize {
    6
}
fn default_slug_pattern() -> String {
    DEFAULT_SLUG_PATTERN.to_string()
}
fn default_reserved() -> Vec<String> {
    [".source.yaml", ".git", "node_modules", "README.md"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DuplicatesConfig {
    /// Treat one URL captured under several versions as a failure.
    #[serde(default)]
    pub fail_on_multi_version: bool,
}

/// Registered source collections and the URL hosts they own.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RegistryConfig {
    #[serde(default)]
    pub sources: BTreeMap<String, SourceEntry>,
    #[serde(default)]
    pub domain_mapping: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourceEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
}

impl Config {
    /// Defaults for a corpus without a config file.
    pub fn minimal() -> Self {
        Self {
            sources_dir: default_sources_dir(),
            discovery: DiscoveryConfig::default(),
            quality: QualityConfig::default(),
            paths: PathsConfig::default(),
            duplicates: DuplicatesConfig::default(),
            registry: RegistryConfig::default(),
        }
    }

    /// Anchor a relative `sources_dir` at `root`.
    fn resolve_relative_to(mut self, root: &Path) -> Self {
        if self.sources_dir.is_relative() {
            self.sources_dir = root.join(&self.sources_dir);
        }
        self
    }
}

/// Load the config at `path`, falling back to defaults when it is missing.
///
/// Relative `sources_dir` values are resolved against the workspace root:
/// the parent of a `.doclib/` directory holding the file, otherwise the
/// file's own directory. Without a file, the current directory is used.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(Config::minimal().resolve_relative_to(Path::new(".")));
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.paths.max_depth == 0 {
        bail!("paths.max_depth must be >= 1");
    }

    check_stale_threshold("quality.stale_threshold_days", config.quality.stale_threshold_days)?;

    config.paths.rules()?;

    for (host, source) in &config.registry.domain_mapping {
        if !config.registry.sources.is_empty() && !config.registry.sources.contains_key(source) {
            bail!(
                "registry.domain_mapping maps '{}' to unregistered source '{}'",
                host,
                source
            );
        }
    }

    Ok(config.resolve_relative_to(&workspace_root(path)))
}

/// Reject thresholds outside `1..=MAX_STALE_THRESHOLD_DAYS`.
pub fn check_stale_threshold(name: &str, days: u32) -> Result<u32> {
    if !(1..=MAX_STALE_THRESHOLD_DAYS).contains(&days) {
        bail!(
            "{} must be between 1 and {}, got {}",
            name,
            MAX_STALE_THRESHOLD_DAYS,
            days
        );
    }
    Ok(days)
}

fn workspace_root(config_path: &Path) -> PathBuf {
    let dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    if dir.file_name().is_some_and(|n| n == ".doclib") {
        dir.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf()
    } else {
        dir.to_path_buf()
    }
}
