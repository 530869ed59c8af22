//! Staleness classification by capture age.
//!
//! A document is stale when it was captured strictly before
//! `now - threshold_days`. Documents without a capture time are never
//! classified: a missing timestamp says nothing about age.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Result of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Staleness {
    pub stale: bool,
    pub age_days: i64,
}

/// Classify one capture time. Assumes `captured_at` is not in the future.
///
/// A threshold reaching past the representable date range has no cutoff,
/// so nothing is stale.
pub fn classify(captured_at: DateTime<Utc>, now: DateTime<Utc>, threshold_days: u32) -> Staleness {
    let cutoff = Duration::try_days(i64::from(threshold_days))
        .and_then(|threshold| now.checked_sub_signed(threshold));
    let age_days = now
        .signed_duration_since(captured_at)
        .num_milliseconds()
        .div_euclid(MILLIS_PER_DAY);
    Staleness {
        stale: cutoff.is_some_and(|cutoff| captured_at < cutoff),
        age_days,
    }
}

/// A document offered for classification.
#[derive(Debug, Clone)]
pub struct StaleCandidate {
    pub id: String,
    pub source: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub captured_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleDocument {
    pub id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub captured_at: DateTime<Utc>,
    pub age_days: i64,
}

/// Stale documents of one source, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceGroup {
    pub source: String,
    pub documents: Vec<StaleDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleReport {
    pub threshold_days: u32,
    pub checked: usize,
    /// Candidates without a usable capture time.
    pub unclassified: usize,
    pub groups: Vec<SourceGroup>,
}

impl StaleReport {
    pub fn stale_count(&self) -> usize {
        self.groups.iter().map(|g| g.documents.len()).sum()
    }
}

/// Classify every candidate and group the stale ones by source.
///
/// Groups appear in the order of their oldest document; ties keep input
/// order.
pub fn find_stale(candidates: &[StaleCandidate], now: DateTime<Utc>, threshold_days: u32) -> StaleReport {
    let mut unclassified = 0;
    let mut stale: Vec<(&str, StaleDocument)> = Vec::new();

    for candidate in candidates {
        let Some(captured_at) = candidate.captured_at else {
            unclassified += 1;
            continue;
        };
        let verdict = classify(captured_at, now, threshold_days);
        if verdict.stale {
            stale.push((
                candidate.source.as_str(),
                StaleDocument {
                    id: candidate.id.clone(),
                    title: candidate.title.clone(),
                    url: candidate.url.clone(),
                    captured_at,
                    age_days: verdict.age_days,
                },
            ));
        }
    }

    stale.sort_by(|a, b| b.1.age_days.cmp(&a.1.age_days));

    let mut groups: Vec<SourceGroup> = Vec::new();
    for (source, doc) in stale {
        match groups.iter_mut().find(|g| g.source == source) {
            Some(group) => group.documents.push(doc),
            None => groups.push(SourceGroup {
                source: source.to_string(),
                documents: vec![doc],
            }),
        }
    }

    StaleReport {
        threshold_days,
        checked: candidates.len(),
        unclassified,
        groups,
    }
}
