//! Ordered, idempotent frontmatter corrections.
//!
//! Normalization is a fixed array of named rules. Each rule is a predicate
//! plus a transform; the transform only runs when the predicate holds on the
//! record as left by the rules before it. One pass is enough: once a rule has
//! run its predicate is false, and no later rule can make it true again.
//!
//! # Rule order
//!
//! | # | Rule | Effect |
//! |---|------|--------|
//! | 1 | `captured-at-iso` | native `capturedAt` date → ISO string |
//! | 2 | `url-trailing-slash` | drop every trailing `/` from `url` |
//! | 3 | `url-query-fragment` | rewrite `url` to scheme + host + path |
//! | 4 | `breadcrumb-split` | `"a > b / c"` → `["a", "b", "c"]` |
//! | 5 | `source-from-path` | missing `source` → first path segment |
//! | 6 | `version-latest` | empty or `null` version → `"latest"` |
//! | 7 | `remove-empty-*` | drop empty `lastModified`, `tags`, `language`, `breadcrumb` |
//! | 8 | `title-trim` | trim surrounding whitespace |
//! | 9 | `tags-lowercase` | lowercase slug form for every tag |
//! | 10 | `last-modified-iso` | native `lastModified` date → ISO string |
//!
//! `url-trailing-slash` strips the whole run of slashes, unlike
//! [`canonical::canonicalize`] which strips one. Stripping one would leave
//! `a//` with work for a second pass.

use serde::Serialize;

use crate::canonical;
use crate::models::{
    to_iso_string, Breadcrumb, Field, FrontmatterRecord, Tags, Timestamp, LATEST_VERSION,
};
use crate::paths::source_segment;

/// Characters that separate breadcrumb segments in the string form.
pub const BREADCRUMB_DELIMITERS: [char; 4] = ['>', '→', '|', '/'];

/// Per-document input that is not part of the frontmatter itself.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    /// Storage path relative to the sources root, `/`-separated.
    pub path: &'a str,
}

/// A single correction applied to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedFix {
    pub rule: &'static str,
    pub description: String,
}

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub record: FrontmatterRecord,
    pub fixes: Vec<AppliedFix>,
}

impl Normalized {
    pub fn changed(&self) -> bool {
        !self.fixes.is_empty()
    }
}

type Predicate = fn(&FrontmatterRecord, &NormalizeContext<'_>) -> bool;
type Transform = fn(&mut FrontmatterRecord, &NormalizeContext<'_>) -> String;

/// A named predicate/transform pair.
pub struct Rule {
    pub name: &'static str,
    pub applies: Predicate,
    pub apply: Transform,
}

/// All rules, in application order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "captured-at-iso",
        applies: |r, _| matches!(r.captured_at, Some(Timestamp::Date(_))),
        apply: |r, _| {
            if let Some(Timestamp::Date(dt)) = &r.captured_at {
                r.captured_at = Some(Timestamp::Text(to_iso_string(dt)));
            }
            "Converted capturedAt to ISO string".to_string()
        },
    },
    Rule {
        name: "url-trailing-slash",
        applies: |r, _| r.url.as_deref().is_some_and(|u| u.ends_with('/')),
        apply: |r, _| {
            if let Some(url) = r.url.as_mut() {
                let trimmed = canonical::trim_trailing_slashes(url).len();
                url.truncate(trimmed);
            }
            "Removed trailing slash from URL".to_string()
        },
    },
    Rule {
        name: "url-query-fragment",
        applies: |r, _| stripped_url(r).is_some(),
        apply: |r, _| {
            if let Some(rewritten) = stripped_url(r) {
                r.url = Some(rewritten);
            }
            "Normalized URL (removed query/hash)".to_string()
        },
    },
    Rule {
        name: "breadcrumb-split",
        applies: |r, _| matches!(&r.breadcrumb, Some(Breadcrumb::Path(p)) if !p.is_empty()),
        apply: |r, _| {
            if let Some(Breadcrumb::Path(path)) = &r.breadcrumb {
                r.breadcrumb = Some(Breadcrumb::Segments(split_breadcrumb(path)));
            }
            "Converted breadcrumb to array".to_string()
        },
    },
    Rule {
        name: "source-from-path",
        applies: |r, ctx| {
            r.source.as_deref().map_or(true, str::is_empty) && source_segment(ctx.path).is_some()
        },
        apply: |r, ctx| {
            let source = source_segment(ctx.path).unwrap_or_default().to_string();
            let description = format!("Added source: {}", source);
            r.source = Some(source);
            description
        },
    },
    Rule {
        name: "version-latest",
        applies: |r, _| match &r.version {
            Field::Null => true,
            Field::Value(v) => v.is_empty(),
            Field::Absent => false,
        },
        apply: |r, _| {
            r.version = Field::Value(LATEST_VERSION.to_string());
            "Set version to \"latest\"".to_string()
        },
    },
    Rule {
        name: "remove-empty-last-modified",
        applies: |r, _| match &r.last_modified {
            Field::Null => true,
            Field::Value(ts) => ts.is_empty_text(),
            Field::Absent => false,
        },
        apply: |r, _| {
            r.last_modified = Field::Absent;
            "Removed empty lastModified".to_string()
        },
    },
    Rule {
        name: "remove-empty-tags",
        applies: |r, _| match &r.tags {
            Field::Null => true,
            Field::Value(Tags::Text(s)) => s.is_empty(),
            Field::Value(Tags::List(list)) => list.is_empty(),
            Field::Absent => false,
        },
        apply: |r, _| {
            let was_list = matches!(r.tags, Field::Value(Tags::List(_)));
            r.tags = Field::Absent;
            if was_list {
                "Removed empty tags array".to_string()
            } else {
                "Removed empty tags".to_string()
            }
        },
    },
    Rule {
        name: "remove-empty-language",
        applies: |r, _| match &r.language {
            Field::Null => true,
            Field::Value(s) => s.is_empty(),
            Field::Absent => false,
        },
        apply: |r, _| {
            r.language = Field::Absent;
            "Removed empty language".to_string()
        },
    },
    Rule {
        name: "remove-empty-breadcrumb",
        applies: |r, _| match &r.breadcrumb {
            Some(Breadcrumb::Path(p)) => p.is_empty(),
            Some(Breadcrumb::Segments(s)) => s.is_empty(),
            None => false,
        },
        apply: |r, _| {
            let was_list = matches!(r.breadcrumb, Some(Breadcrumb::Segments(_)));
            r.breadcrumb = None;
            if was_list {
                "Removed empty breadcrumb array".to_string()
            } else {
                "Removed empty breadcrumb".to_string()
            }
        },
    },
    Rule {
        name: "title-trim",
        applies: |r, _| r.title.as_deref().is_some_and(|t| t != t.trim()),
        apply: |r, _| {
            if let Some(title) = r.title.as_mut() {
                *title = title.trim().to_string();
            }
            "Trimmed whitespace from title".to_string()
        },
    },
    Rule {
        name: "tags-lowercase",
        applies: |r, _| match &r.tags {
            Field::Value(Tags::List(list)) => list.iter().any(|t| normalize_tag(t) != *t),
            _ => false,
        },
        apply: |r, _| {
            if let Some(Tags::List(list)) = r.tags.value_mut() {
                for tag in list.iter_mut() {
                    *tag = normalize_tag(tag);
                }
            }
            "Normalized tags to lowercase".to_string()
        },
    },
    Rule {
        name: "last-modified-iso",
        applies: |r, _| matches!(r.last_modified, Field::Value(Timestamp::Date(_))),
        apply: |r, _| {
            if let Field::Value(Timestamp::Date(dt)) = &r.last_modified {
                r.last_modified = Field::Value(Timestamp::Text(to_iso_string(dt)));
            }
            "Converted lastModified to ISO string".to_string()
        },
    },
];

/// Run every rule in order over a copy of `record`.
pub fn normalize(record: &FrontmatterRecord, ctx: &NormalizeContext<'_>) -> Normalized {
    let mut record = record.clone();
    let mut fixes = Vec::new();
    for rule in RULES {
        if (rule.applies)(&record, ctx) {
            let description = (rule.apply)(&mut record, ctx);
            fixes.push(AppliedFix {
                rule: rule.name,
                description,
            });
        }
    }
    Normalized { record, fixes }
}

/// Slug form of a tag: lowercase, runs outside `[a-z0-9-]` become one `-`.
pub fn normalize_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    for ch in tag.to_lowercase().chars() {
        let ch = if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            ch
        } else {
            '-'
        };
        if ch == '-' && out.ends_with('-') {
            continue;
        }
        out.push(ch);
    }
    out
}

/// Split a breadcrumb string on any delimiter, dropping blank segments.
pub fn split_breadcrumb(path: &str) -> Vec<String> {
    path.split(&BREADCRUMB_DELIMITERS[..])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// The rewritten URL when the stored one carries a query or fragment.
fn stripped_url(record: &FrontmatterRecord) -> Option<String> {
    let raw = record.url.as_deref()?;
    let parsed = canonical::parse(raw).ok()?;
    let has_query = parsed.query().is_some_and(|q| !q.is_empty());
    let has_fragment = parsed.fragment().is_some_and(|f| !f.is_empty());
    if !has_query && !has_fragment {
        return None;
    }
    let rewritten = canonical::without_query_and_fragment(&parsed);
    (rewritten != raw).then_some(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const CTX: NormalizeContext<'static> = NormalizeContext {
        path: "react/hooks/use-state.md",
    };

    fn descriptions(n: &Normalized) -> Vec<&str> {
        n.fixes.iter().map(|f| f.description.as_str()).collect()
    }

    fn clean_record() -> FrontmatterRecord {
        FrontmatterRecord {
            source: Some("react".to_string()),
            url: Some("https://react.dev/reference/react/useState".to_string()),
            title: Some("useState".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn clean_record_is_untouched() {
        let record = clean_record();
        let out = normalize(&record, &CTX);
        assert!(!out.changed());
        assert_eq!(out.record, record);
    }

    #[test]
    fn rule_names_are_unique() {
        let mut names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), RULES.len());
    }

    #[test]
    fn native_dates_become_iso_strings() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let record = FrontmatterRecord {
            captured_at: Some(Timestamp::Date(dt)),
            last_modified: Field::Value(Timestamp::Date(dt)),
            ..clean_record()
        };
        let out = normalize(&record, &CTX);
        assert_eq!(
            out.record.captured_at,
            Some(Timestamp::Text("2024-01-15T00:00:00.000Z".to_string()))
        );
        assert_eq!(
            out.record.last_modified,
            Field::Value(Timestamp::Text("2024-01-15T00:00:00.000Z".to_string()))
        );
        assert_eq!(
            descriptions(&out),
            vec![
                "Converted capturedAt to ISO string",
                "Converted lastModified to ISO string"
            ]
        );
    }

    #[test]
    fn url_slash_then_query() {
        let record = FrontmatterRecord {
            url: Some("https://x.com/a/?tab=1#install".to_string()),
            ..clean_record()
        };
        let out = normalize(&record, &CTX);
        assert_eq!(out.record.url.as_deref(), Some("https://x.com/a"));
        assert_eq!(descriptions(&out), vec!["Normalized URL (removed query/hash)"]);

        let record = FrontmatterRecord {
            url: Some("https://x.com/a/".to_string()),
            ..clean_record()
        };
        let out = normalize(&record, &CTX);
        assert_eq!(out.record.url.as_deref(), Some("https://x.com/a"));
        assert_eq!(descriptions(&out), vec!["Removed trailing slash from URL"]);
    }

    #[test]
    fn url_slash_run_is_stripped_in_one_pass() {
        let record = FrontmatterRecord {
            url: Some("https://x.com/a///".to_string()),
            ..clean_record()
        };
        let out = normalize(&record, &CTX);
        assert_eq!(out.record.url.as_deref(), Some("https://x.com/a"));
        assert!(normalize(&out.record, &CTX).fixes.is_empty());
        // The identity key only drops one slash.
        let key = canonical::canonicalize("https://x.com/a//").unwrap();
        assert_eq!(key.as_str(), "https://x.com/a/");
    }

    #[test]
    fn invalid_url_is_left_alone() {
        let record = FrontmatterRecord {
            url: Some("not a url?x=1".to_string()),
            ..clean_record()
        };
        let out = normalize(&record, &CTX);
        assert_eq!(out.record.url.as_deref(), Some("not a url?x=1"));
        assert!(!out.changed());
    }

    #[test]
    fn breadcrumb_string_is_split() {
        let record = FrontmatterRecord {
            breadcrumb: Some(Breadcrumb::Path(
                "Docs > Hooks → State | useState / API".to_string(),
            )),
            ..clean_record()
        };
        let out = normalize(&record, &CTX);
        assert_eq!(
            out.record.breadcrumb,
            Some(Breadcrumb::Segments(vec![
                "Docs".to_string(),
                "Hooks".to_string(),
                "State".to_string(),
                "useState".to_string(),
                "API".to_string(),
            ]))
        );
    }

    #[test]
    fn blank_breadcrumb_is_removed() {
        let record = FrontmatterRecord {
            breadcrumb: Some(Breadcrumb::Path(" > / ".to_string())),
            ..clean_record()
        };
        let out = normalize(&record, &CTX);
        assert_eq!(out.record.breadcrumb, None);
        assert_eq!(
            descriptions(&out),
            vec!["Converted breadcrumb to array", "Removed empty breadcrumb array"]
        );
    }

    #[test]
    fn source_derived_from_path() {
        let record = FrontmatterRecord {
            source: None,
            ..clean_record()
        };
        let out = normalize(&record, &CTX);
        assert_eq!(out.record.source.as_deref(), Some("react"));
        assert_eq!(descriptions(&out), vec!["Added source: react"]);

        let record = FrontmatterRecord {
            source: Some(String::new()),
            ..clean_record()
        };
        assert_eq!(normalize(&record, &CTX).record.source.as_deref(), Some("react"));
    }

    #[test]
    fn null_or_empty_version_becomes_latest() {
        for version in [Field::Null, Field::Value(String::new())] {
            let record = FrontmatterRecord {
                version,
                ..clean_record()
            };
            let out = normalize(&record, &CTX);
            assert_eq!(out.record.version, Field::Value("latest".to_string()));
        }

        let out = normalize(&clean_record(), &CTX);
        assert_eq!(out.record.version, Field::Absent);
    }

    #[test]
    fn empty_optionals_are_removed() {
        let record = FrontmatterRecord {
            last_modified: Field::Value(Timestamp::Text(String::new())),
            tags: Field::Value(Tags::List(vec![])),
            language: Field::Null,
            ..clean_record()
        };
        let out = normalize(&record, &CTX);
        assert!(out.record.last_modified.is_absent());
        assert!(out.record.tags.is_absent());
        assert!(out.record.language.is_absent());
        assert_eq!(
            descriptions(&out),
            vec![
                "Removed empty lastModified",
                "Removed empty tags array",
                "Removed empty language"
            ]
        );
    }

    #[test]
    fn title_is_trimmed() {
        let record = FrontmatterRecord {
            title: Some("  useState \n".to_string()),
            ..clean_record()
        };
        let out = normalize(&record, &CTX);
        assert_eq!(out.record.title.as_deref(), Some("useState"));
    }

    #[test]
    fn tags_collapse_to_slugs() {
        let record = FrontmatterRecord {
            tags: Field::Value(Tags::List(vec![
                "C++".to_string(),
                "Web  Dev".to_string(),
                "api".to_string(),
            ])),
            ..clean_record()
        };
        let out = normalize(&record, &CTX);
        assert_eq!(
            out.record.tags,
            Field::Value(Tags::List(vec![
                "c-".to_string(),
                "web-dev".to_string(),
                "api".to_string(),
            ]))
        );
        let again = normalize(&out.record, &CTX);
        assert!(!again.changed());
    }

    #[test]
    fn normalize_tag_cases() {
        assert_eq!(normalize_tag("Node.js"), "node-js");
        assert_eq!(normalize_tag("a--b"), "a-b");
        assert_eq!(normalize_tag("Ünïcode"), "-n-code");
        assert_eq!(normalize_tag(""), "");
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let dt = Utc.with_ymd_and_hms(2023, 6, 1, 8, 30, 0).unwrap();
        let record = FrontmatterRecord {
            source: None,
            url: Some("https://x.com/a//?q=1#frag".to_string()),
            version: Field::Null,
            title: Some(" Title ".to_string()),
            captured_at: Some(Timestamp::Date(dt)),
            last_modified: Field::Value(Timestamp::Date(dt)),
            breadcrumb: Some(Breadcrumb::Path("A/B".to_string())),
            tags: Field::Value(Tags::List(vec!["Rust Lang".to_string()])),
            language: Field::Value(String::new()),
        };
        let first = normalize(&record, &CTX);
        assert!(first.changed());
        let second = normalize(&first.record, &CTX);
        assert!(second.fixes.is_empty(), "unexpected: {:?}", second.fixes);
        assert_eq!(second.record, first.record);
    }
}
