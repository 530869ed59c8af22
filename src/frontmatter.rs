//! YAML frontmatter: splitting, typed mapping, and re-serialization.
//!
//! A document is `---\n<yaml>\n---\n<body>`. The YAML mapping is read into
//! a [`FrontmatterRecord`]; the raw mapping is kept alongside so unknown keys
//! and key order survive a rewrite.
//!
//! YAML has no quoting information after parsing, so an unquoted timestamp
//! and a quoted one look the same. A timestamp-shaped value is treated as a
//! native date unless it is already in canonical ISO form
//! (`2024-03-01T12:00:00.000Z`), which is what a rewrite produces.

use std::sync::OnceLock;

use anyhow::{Context, Result};
use doclib_core::models::{parse_timestamp, to_iso_string};
use doclib_core::{Breadcrumb, CoreError, Field, FrontmatterRecord, Tags, Timestamp};
use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::discover::DocumentFile;

/// Keys mapped onto [`FrontmatterRecord`] fields, in the order new keys are appended.
pub const MODELED_KEYS: [&str; 9] = [
    "source",
    "url",
    "version",
    "title",
    "capturedAt",
    "lastModified",
    "breadcrumb",
    "tags",
    "language",
];

/// One parsed document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path under the sources root.
    pub relative: String,
    /// Whether the file opened with a frontmatter block.
    pub has_frontmatter: bool,
    /// The mapping as read, including keys the record does not model.
    pub raw: Mapping,
    /// Typed view of the modeled keys.
    pub record: FrontmatterRecord,
    /// Modeled keys whose YAML type could not be represented.
    pub type_errors: Vec<CoreError>,
    pub body: String,
}

impl Document {
    /// Key present in the raw mapping.
    pub fn has_key(&self, key: &str) -> bool {
        self.raw.contains_key(key)
    }
}

/// Read and parse a discovered file. I/O problems are per-document failures.
pub fn load_document(file: &DocumentFile) -> Result<Document, CoreError> {
    let content = std::fs::read_to_string(&file.path)
        .map_err(|e| CoreError::ParseFailure(format!("could not read file: {}", e)))?;
    parse_document(&file.relative, &content)
}

/// Split `content` into its frontmatter YAML and body.
///
/// Returns `None` for the YAML when the content has no frontmatter block.
pub fn split(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }
    // Opening fence without a closing one: not frontmatter.
    (None, content)
}

/// Parse a document's text into a [`Document`].
pub fn parse_document(relative: &str, content: &str) -> Result<Document, CoreError> {
    let (yaml, body) = split(content);
    let raw = match yaml {
        None => Mapping::new(),
        Some(text) => match serde_yaml::from_str::<Value>(text) {
            Ok(Value::Mapping(map)) => map,
            Ok(Value::Null) => Mapping::new(),
            Ok(_) => {
                return Err(CoreError::ParseFailure(
                    "frontmatter is not a mapping".to_string(),
                ))
            }
            Err(e) => return Err(CoreError::ParseFailure(e.to_string())),
        },
    };

    let mut type_errors = Vec::new();
    let record = record_from_mapping(&raw, &mut type_errors);

    Ok(Document {
        relative: relative.to_string(),
        has_frontmatter: yaml.is_some(),
        raw,
        record,
        type_errors,
        body: body.to_string(),
    })
}

/// Map the modeled keys of `raw` onto a record, collecting type mismatches.
pub fn record_from_mapping(raw: &Mapping, errors: &mut Vec<CoreError>) -> FrontmatterRecord {
    let mut record = FrontmatterRecord::default();

    let mut mismatch = |key: &str, expected: &str| {
        errors.push(CoreError::schema(key, format!("must be {}", expected)));
    };

    if let Some(v) = raw.get("source") {
        match scalar_string(v) {
            Some(s) => record.source = Some(s),
            None if v.is_null() => {}
            None => mismatch("source", "a string"),
        }
    }

    if let Some(v) = raw.get("url") {
        match v {
            Value::String(s) => record.url = Some(s.clone()),
            Value::Null => {}
            _ => mismatch("url", "a string"),
        }
    }

    if let Some(v) = raw.get("version") {
        match string_field(v) {
            Some(f) => record.version = f,
            None => mismatch("version", "a string"),
        }
    }

    if let Some(v) = raw.get("title") {
        match scalar_string(v) {
            Some(s) => record.title = Some(s),
            None if v.is_null() => {}
            None => mismatch("title", "a string"),
        }
    }

    if let Some(v) = raw.get("capturedAt") {
        match v {
            Value::String(s) => record.captured_at = Some(timestamp_from_str(s)),
            Value::Null => {}
            _ => mismatch("capturedAt", "a date or ISO-8601 string"),
        }
    }

    if let Some(v) = raw.get("lastModified") {
        match v {
            Value::String(s) => record.last_modified = Field::Value(timestamp_from_str(s)),
            Value::Null => record.last_modified = Field::Null,
            _ => mismatch("lastModified", "a date or ISO-8601 string"),
        }
    }

    if let Some(v) = raw.get("breadcrumb") {
        match v {
            Value::String(s) => record.breadcrumb = Some(Breadcrumb::Path(s.clone())),
            Value::Sequence(items) => match string_items(items) {
                Some(segments) => record.breadcrumb = Some(Breadcrumb::Segments(segments)),
                None => mismatch("breadcrumb", "a string or a list of strings"),
            },
            Value::Null => {}
            _ => mismatch("breadcrumb", "a string or a list of strings"),
        }
    }

    if let Some(v) = raw.get("tags") {
        match v {
            Value::Sequence(items) => match string_items(items) {
                Some(tags) => record.tags = Field::Value(Tags::List(tags)),
                None => mismatch("tags", "a list of strings"),
            },
            Value::String(s) => record.tags = Field::Value(Tags::Text(s.clone())),
            Value::Null => record.tags = Field::Null,
            _ => mismatch("tags", "a list of strings"),
        }
    }

    if let Some(v) = raw.get("language") {
        match string_field(v) {
            Some(f) => record.language = f,
            None => mismatch("language", "a string"),
        }
    }

    record
}

/// Serialize `record` back over `doc`, keeping unknown keys and key order.
///
/// Fields equal to what was read keep their original YAML value untouched.
pub fn render_document(doc: &Document, record: &FrontmatterRecord) -> Result<String> {
    let mut ignored = Vec::new();
    let original = record_from_mapping(&doc.raw, &mut ignored);

    let mut out = Mapping::new();
    for (key, value) in &doc.raw {
        match key.as_str().filter(|k| MODELED_KEYS.contains(k)) {
            Some(k) if field_changed(k, &original, record) => {
                if let Some(v) = field_value(k, record) {
                    out.insert(key.clone(), v);
                }
            }
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    for key in MODELED_KEYS {
        if doc.raw.contains_key(key) {
            continue;
        }
        if let Some(v) = field_value(key, record) {
            out.insert(Value::String(key.to_string()), v);
        }
    }

    let yaml = if out.is_empty() {
        String::new()
    } else {
        serde_yaml::to_string(&out)
            .with_context(|| format!("Failed to serialize frontmatter for {}", doc.relative))?
    };
    Ok(format!("---\n{}---\n{}", yaml, doc.body))
}

fn field_changed(key: &str, before: &FrontmatterRecord, after: &FrontmatterRecord) -> bool {
    match key {
        "source" => before.source != after.source,
        "url" => before.url != after.url,
        "version" => before.version != after.version,
        "title" => before.title != after.title,
        "capturedAt" => before.captured_at != after.captured_at,
        "lastModified" => before.last_modified != after.last_modified,
        "breadcrumb" => before.breadcrumb != after.breadcrumb,
        "tags" => before.tags != after.tags,
        "language" => before.language != after.language,
        _ => false,
    }
}

/// YAML value for a modeled key, `None` when the field is absent.
fn field_value(key: &str, record: &FrontmatterRecord) -> Option<Value> {
    let string = |s: &String| Value::String(s.clone());
    match key {
        "source" => record.source.as_ref().map(string),
        "url" => record.url.as_ref().map(string),
        "version" => field_to_value(&record.version, string),
        "title" => record.title.as_ref().map(string),
        "capturedAt" => record.captured_at.as_ref().map(timestamp_value),
        "lastModified" => field_to_value(&record.last_modified, timestamp_value),
        "breadcrumb" => record.breadcrumb.as_ref().map(|b| match b {
            Breadcrumb::Path(p) => Value::String(p.clone()),
            Breadcrumb::Segments(s) => string_sequence(s),
        }),
        "tags" => field_to_value(&record.tags, |t| match t {
            Tags::List(list) => string_sequence(list),
            Tags::Text(s) => Value::String(s.clone()),
        }),
        "language" => field_to_value(&record.language, string),
        _ => None,
    }
}

fn field_to_value<T>(field: &Field<T>, f: impl Fn(&T) -> Value) -> Option<Value> {
    match field {
        Field::Absent => None,
        Field::Null => Some(Value::Null),
        Field::Value(v) => Some(f(v)),
    }
}

fn timestamp_value(ts: &Timestamp) -> Value {
    match ts {
        Timestamp::Date(dt) => Value::String(to_iso_string(dt)),
        Timestamp::Text(s) => Value::String(s.clone()),
    }
}

fn string_sequence(items: &[String]) -> Value {
    Value::Sequence(items.iter().cloned().map(Value::String).collect())
}

/// Strings, numbers, and booleans read as text.
fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_field(v: &Value) -> Option<Field<String>> {
    if v.is_null() {
        return Some(Field::Null);
    }
    scalar_string(v).map(Field::Value)
}

fn string_items(items: &[Value]) -> Option<Vec<String>> {
    items
        .iter()
        .map(|v| match v {
            Value::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

fn timestamp_from_str(s: &str) -> Timestamp {
    if is_native_date(s) {
        if let Some(dt) = parse_timestamp(s) {
            return Timestamp::Date(dt);
        }
    }
    Timestamp::Text(s.to_string())
}

/// A YAML timestamp literal that is not yet in canonical ISO form.
fn is_native_date(s: &str) -> bool {
    static YAML_TIMESTAMP: OnceLock<Regex> = OnceLock::new();
    static CANONICAL_ISO: OnceLock<Regex> = OnceLock::new();

    let yaml_timestamp = YAML_TIMESTAMP.get_or_init(|| {
        Regex::new(
            r"^\d{4}-\d{1,2}-\d{1,2}(?:(?:[Tt]|[ \t]+)\d{1,2}:\d{2}:\d{2}(?:\.\d*)?(?:[ \t]*(?:Z|[-+]\d{1,2}(?::\d{2})?))?)?$",
        )
        .expect("static timestamp pattern")
    });
    let canonical = CANONICAL_ISO.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z$").expect("static ISO pattern")
    });

    yaml_timestamp.is_match(s) && !canonical.is_match(s)
}
