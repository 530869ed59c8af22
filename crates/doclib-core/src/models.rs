//! The frontmatter record: one document's metadata in typed form.
//!
//! Every optional key is modeled explicitly. Keys whose raw value needs to
//! be told apart from absence (an explicit `null`, an empty string) use
//! [`Field`] so the normalization rules can check their preconditions
//! without inspecting a loose map.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Version every document implicitly has when none is recorded.
pub const LATEST_VERSION: &str = "latest";

/// Tri-state optional field: missing key, explicit `null`, or a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Absent,
        }
    }
}

/// A capture/modification time as found in frontmatter.
///
/// `Date` is a native date value (an unquoted YAML timestamp); `Text` is a
/// plain string which may or may not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    Date(DateTime<Utc>),
    Text(String),
}

impl Timestamp {
    /// Resolve to an instant. `None` for text that is not a recognizable date.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Date(dt) => Some(*dt),
            Timestamp::Text(s) => parse_timestamp(s),
        }
    }

    pub fn is_empty_text(&self) -> bool {
        matches!(self, Timestamp::Text(s) if s.is_empty())
    }
}

/// Canonical string form for a native date: `2024-03-01T12:00:00.000Z`.
pub fn to_iso_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse the timestamp spellings found in frontmatter.
///
/// Accepts RFC 3339 (with `T` or a space), naive date-times (read as UTC),
/// and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f %:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Navigation path of a document, either as captured or already split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Breadcrumb {
    Path(String),
    Segments(Vec<String>),
}

/// Tag list. A bare string is tolerated on input but never rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tags {
    List(Vec<String>),
    Text(String),
}

/// One document's frontmatter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrontmatterRecord {
    /// Owning collection. Filled from the storage path when missing.
    pub source: Option<String>,
    /// Identity anchor of the document.
    pub url: Option<String>,
    pub version: Field<String>,
    pub title: Option<String>,
    pub captured_at: Option<Timestamp>,
    pub last_modified: Field<Timestamp>,
    pub breadcrumb: Option<Breadcrumb>,
    pub tags: Field<Tags>,
    pub language: Field<String>,
}

impl FrontmatterRecord {
    /// Version used for identity: a missing or empty version means `latest`.
    pub fn effective_version(&self) -> &str {
        match self.version.value() {
            Some(v) if !v.is_empty() => v,
            _ => LATEST_VERSION,
        }
    }

    /// The capture instant, when recorded and parseable.
    pub fn captured_at_datetime(&self) -> Option<DateTime<Utc>> {
        self.captured_at.as_ref().and_then(Timestamp::to_datetime)
    }
}
