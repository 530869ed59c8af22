//! Duplicate and multi-version clustering by canonical URL.
//!
//! Records are grouped by [`CanonicalKey`], then sub-grouped by version
//! (missing or empty version counts as `latest`). Two records with the same
//! key and version are exact duplicates. A key carrying several versions is
//! reported separately and is informational unless the caller says
//! otherwise.
//!
//! Groups and members keep first-seen order so reports are reproducible.

use indexmap::IndexMap;
use serde::Serialize;

use crate::canonical::{canonicalize, CanonicalKey};
use crate::models::LATEST_VERSION;

/// The slice of a document the clusterer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterInput {
    pub id: String,
    pub url: Option<String>,
    pub version: Option<String>,
}

/// Same canonical URL and same version, two or more documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub url: CanonicalKey,
    pub version: String,
    pub files: Vec<String>,
}

/// Same canonical URL spread over several versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiVersionGroup {
    pub url: CanonicalKey,
    pub versions: Vec<String>,
    pub count: usize,
}

/// A record left out of clustering because its URL does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidUrlWarning {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ClusterReport {
    pub exact_duplicates: Vec<DuplicateGroup>,
    pub multi_version: Vec<MultiVersionGroup>,
    pub invalid_urls: Vec<InvalidUrlWarning>,
    /// Number of distinct canonical keys seen.
    pub unique_urls: usize,
}

impl ClusterReport {
    /// Exact duplicates always fail; version sprawl only when asked to.
    pub fn is_failure(&self, fail_on_multi_version: bool) -> bool {
        !self.exact_duplicates.is_empty()
            || (fail_on_multi_version && !self.multi_version.is_empty())
    }
}

/// Group `inputs` by canonical URL and version.
pub fn cluster(inputs: &[ClusterInput]) -> ClusterReport {
    let mut by_key: IndexMap<CanonicalKey, IndexMap<String, Vec<String>>> = IndexMap::new();
    let mut member_counts: IndexMap<CanonicalKey, usize> = IndexMap::new();
    let mut invalid_urls = Vec::new();

    for input in inputs {
        let Some(raw) = input.url.as_deref().filter(|u| !u.is_empty()) else {
            continue;
        };
        let key = match canonicalize(raw) {
            Ok(key) => key,
            Err(err) => {
                invalid_urls.push(InvalidUrlWarning {
                    id: input.id.clone(),
                    error: err.to_string(),
                });
                continue;
            }
        };
        let version = input
            .version
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(LATEST_VERSION)
            .to_string();

        *member_counts.entry(key.clone()).or_insert(0) += 1;
        by_key
            .entry(key)
            .or_default()
            .entry(version)
            .or_default()
            .push(input.id.clone());
    }

    let mut exact_duplicates = Vec::new();
    let mut multi_version = Vec::new();

    for (key, versions) in &by_key {
        for (version, files) in versions {
            if files.len() > 1 {
                exact_duplicates.push(DuplicateGroup {
                    url: key.clone(),
                    version: version.clone(),
                    files: files.clone(),
                });
            }
        }
        if versions.len() > 1 {
            multi_version.push(MultiVersionGroup {
                url: key.clone(),
                versions: versions.keys().cloned().collect(),
                count: member_counts.get(key).copied().unwrap_or_default(),
            });
        }
    }

    ClusterReport {
        exact_duplicates,
        multi_version,
        invalid_urls,
        unique_urls: by_key.len(),
    }
}
