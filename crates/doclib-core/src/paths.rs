//! Storage path naming rules.
//!
//! A document lives at `<source>/<dir>/.../<slug>.md` relative to the
//! sources root. Each check below is independent, so one path can collect
//! several violations. Consecutive hyphens are the only warning-level
//! finding; everything else blocks.

use std::fmt;

use regex::Regex;
use serde::Serialize;

/// Default slug pattern: lowercase alphanumeric words joined by single hyphens.
pub const DEFAULT_SLUG_PATTERN: &str = "^[a-z0-9]+(?:-[a-z0-9]+)*$";

/// First segment of a `/`-separated storage path (the source collection).
pub fn source_segment(path: &str) -> Option<&str> {
    path.split('/').next().filter(|s| !s.is_empty())
}

/// Compiled path conventions.
#[derive(Debug, Clone)]
pub struct PathRules {
    slug: Regex,
    slug_pattern: String,
    max_depth: usize,
    reserved: Vec<String>,
}

impl PathRules {
    /// Compile `slug_pattern`. The pattern must match a whole segment, so it
    /// is anchored even when written without `^`/`$`.
    pub fn new(
        slug_pattern: &str,
        max_depth: usize,
        reserved: Vec<String>,
    ) -> Result<Self, regex::Error> {
        let slug = Regex::new(&format!("^(?:{})$", slug_pattern))?;
        Ok(Self {
            slug,
            slug_pattern: slug_pattern.to_string(),
            max_depth,
            reserved,
        })
    }

    pub fn slug_pattern(&self) -> &str {
        &self.slug_pattern
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn is_slug(&self, segment: &str) -> bool {
        self.slug.is_match(segment)
    }

    fn is_reserved(&self, segment: &str) -> bool {
        self.reserved.iter().any(|r| r == segment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One broken naming convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PathViolation {
    TooDeep { depth: usize, max: usize },
    InvalidFilenameSlug { slug: String, pattern: String },
    InvalidDirectoryName { name: String, pattern: String },
    ReservedName { name: String },
    Uppercase,
    InvalidCharacters,
    ConsecutiveHyphens,
}

impl PathViolation {
    pub fn severity(&self) -> Severity {
        match self {
            PathViolation::ConsecutiveHyphens => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for PathViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathViolation::TooDeep { depth, max } => {
                write!(f, "Path too deep ({} levels, max {})", depth, max)
            }
            PathViolation::InvalidFilenameSlug { slug, pattern } => write!(
                f,
                "Invalid filename slug \"{}\" - must match pattern {}",
                slug, pattern
            ),
            PathViolation::InvalidDirectoryName { name, pattern } => write!(
                f,
                "Invalid directory name \"{}\" - must match pattern {}",
                name, pattern
            ),
            PathViolation::ReservedName { name } => {
                write!(f, "Reserved name \"{}\" cannot be used", name)
            }
            PathViolation::Uppercase => write!(
                f,
                "Path contains uppercase letters - all paths must be lowercase"
            ),
            PathViolation::InvalidCharacters => write!(
                f,
                "Path contains invalid characters - only lowercase letters, numbers, hyphens allowed"
            ),
            PathViolation::ConsecutiveHyphens => write!(f, "Path contains consecutive hyphens"),
        }
    }
}

/// Check a `/`-separated path relative to the sources root.
pub fn validate_path(path: &str, rules: &PathRules) -> Vec<PathViolation> {
    let segments: Vec<&str> = path.split('/').collect();
    validate_segments(&segments, rules)
}

/// Check an already split path. The last segment is the filename.
pub fn validate_segments(segments: &[&str], rules: &PathRules) -> Vec<PathViolation> {
    let mut violations = Vec::new();
    let Some((filename, directories)) = segments.split_last() else {
        return violations;
    };

    if directories.len() > rules.max_depth {
        violations.push(PathViolation::TooDeep {
            depth: directories.len(),
            max: rules.max_depth,
        });
    }

    let slug = filename.strip_suffix(".md").unwrap_or(filename);
    if !rules.is_slug(slug) {
        violations.push(PathViolation::InvalidFilenameSlug {
            slug: slug.to_string(),
            pattern: rules.slug_pattern.clone(),
        });
    }

    // The source directory is named by the registry, not by slug rules.
    for dir in directories.iter().skip(1) {
        if !rules.is_slug(dir) {
            violations.push(PathViolation::InvalidDirectoryName {
                name: dir.to_string(),
                pattern: rules.slug_pattern.clone(),
            });
        }
    }

    for segment in directories.iter().chain(std::iter::once(filename)) {
        if rules.is_reserved(segment) {
            violations.push(PathViolation::ReservedName {
                name: segment.to_string(),
            });
        }
    }

    let full = segments.join("/");
    if full != full.to_lowercase() {
        violations.push(PathViolation::Uppercase);
    }
    if has_invalid_characters(&full, directories) {
        violations.push(PathViolation::InvalidCharacters);
    }
    if full.contains("--") {
        violations.push(PathViolation::ConsecutiveHyphens);
    }

    violations
}

fn has_invalid_characters(full: &str, directories: &[&str]) -> bool {
    let bad_char = full
        .chars()
        .any(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '/' | '.')));
    let dots = full.matches('.').count();
    bad_char || dots > 1 || directories.iter().any(|d| d.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> PathRules {
        PathRules::new(
            DEFAULT_SLUG_PATTERN,
            6,
            vec![
                ".source.yaml".to_string(),
                ".git".to_string(),
                "node_modules".to_string(),
                "README.md".to_string(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn conforming_path_is_clean() {
        assert!(validate_path("sources/my-source/getting-started.md", &rules()).is_empty());
        assert!(validate_path("react/hooks/use-state.md", &rules()).is_empty());
    }

    #[test]
    fn uppercase_path_collects_everything() {
        let v = validate_path("sources/My-Source/Doc.md", &rules());
        assert!(v.contains(&PathViolation::Uppercase));
        assert!(v.contains(&PathViolation::InvalidCharacters));
        assert!(v.iter().any(|x| matches!(
            x,
            PathViolation::InvalidFilenameSlug { slug, .. } if slug == "Doc"
        )));
        assert!(v.iter().any(|x| matches!(
            x,
            PathViolation::InvalidDirectoryName { name, .. } if name == "My-Source"
        )));
    }

    #[test]
    fn source_directory_is_exempt_from_slug_rule() {
        let v = validate_path("React_Docs/intro.md", &rules());
        assert!(!v
            .iter()
            .any(|x| matches!(x, PathViolation::InvalidDirectoryName { .. })));
        assert!(v.contains(&PathViolation::Uppercase));
    }

    #[test]
    fn depth_counts_directories_only() {
        let ok = "a/b/c/d/e/f/page.md";
        assert!(validate_path(ok, &rules()).is_empty());
        let deep = "a/b/c/d/e/f/g/page.md";
        assert_eq!(
            validate_path(deep, &rules()),
            vec![PathViolation::TooDeep { depth: 7, max: 6 }]
        );
    }

    #[test]
    fn reserved_segments_flagged() {
        let v = validate_path("react/node_modules/page.md", &rules());
        assert!(v.contains(&PathViolation::ReservedName {
            name: "node_modules".to_string()
        }));
    }

    #[test]
    fn consecutive_hyphens_are_warnings() {
        let v = validate_path("react/hooks--old/page.md", &rules());
        assert!(v.contains(&PathViolation::ConsecutiveHyphens));
        let warnings: Vec<_> = v
            .iter()
            .filter(|x| x.severity() == Severity::Warning)
            .collect();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn extra_dots_are_invalid() {
        let v = validate_path("react/v1.2/page.md", &rules());
        assert!(v.contains(&PathViolation::InvalidCharacters));
        let v = validate_path("react/page.draft.md", &rules());
        assert!(v.contains(&PathViolation::InvalidCharacters));
    }

    #[test]
    fn unanchored_pattern_still_matches_whole_segment() {
        let rules = PathRules::new("[a-z]+", 6, vec![]).unwrap();
        let v = validate_path("src/abc1.md", &rules);
        assert!(v
            .iter()
            .any(|x| matches!(x, PathViolation::InvalidFilenameSlug { .. })));
    }

    #[test]
    fn source_segment_is_first_component() {
        assert_eq!(source_segment("react/hooks/a.md"), Some("react"));
        assert_eq!(source_segment("a.md"), Some("a.md"));
        assert_eq!(source_segment(""), None);
    }

    #[test]
    fn messages_read_naturally() {
        let v = PathViolation::TooDeep { depth: 8, max: 6 };
        assert_eq!(v.to_string(), "Path too deep (8 levels, max 6)");
    }
}
