//! URL canonicalization.
//!
//! Two documents describe the same resource when their URLs reduce to the
//! same [`CanonicalKey`]: the URL is parsed (which lowercases the host and
//! drops default ports), query and fragment are cleared, and one trailing
//! `/` is removed.
//!
//! ```rust
//! use doclib_core::canonical::canonicalize;
//!
//! let a = canonicalize("https://x.com/a?b=1#c").unwrap();
//! let b = canonicalize("https://x.com/a/").unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "https://x.com/a");
//! ```

use std::fmt;

use serde::Serialize;
use url::Url;

use crate::error::CoreError;

/// Identity key for a URL. Only meaningful for equality and grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reduce `raw` to its canonical identity key.
pub fn canonicalize(raw: &str) -> Result<CanonicalKey, CoreError> {
    let mut url = parse(raw)?;
    url.set_query(None);
    url.set_fragment(None);
    let href = url.as_str();
    let key = href.strip_suffix('/').unwrap_or(href);
    Ok(CanonicalKey(key.to_string()))
}

/// Parse `raw` as an absolute URL.
pub fn parse(raw: &str) -> Result<Url, CoreError> {
    Url::parse(raw).map_err(|e| CoreError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// `scheme://host[:port]/path` with query, fragment, and credentials removed.
///
/// Used by the normalizer when rewriting a stored URL; unlike
/// [`canonicalize`] the result is written back to the document.
pub fn without_query_and_fragment(url: &Url) -> String {
    let rebuilt = match url.host_str() {
        Some(host) => match url.port() {
            Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
            None => format!("{}://{}{}", url.scheme(), host, url.path()),
        },
        None => {
            let mut bare = url.clone();
            bare.set_query(None);
            bare.set_fragment(None);
            bare.to_string()
        }
    };
    trim_trailing_slashes(&rebuilt).to_string()
}

/// Strip every trailing `/`.
pub fn trim_trailing_slashes(s: &str) -> &str {
    s.trim_end_matches('/')
}
