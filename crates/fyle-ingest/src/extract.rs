//! Heuristic document field extraction.
//!
//! Derives a title, a key/value summary, up to two categories and an expiry
//! date from recognized document text using keyword matching, a hand-written
//! key/value scanner and a small date grammar. The pipeline is linear
//! (title → summary → categories → expiry) and total: every input string
//! yields a complete result, malformed text simply carries no signal.

pub mod categories;
pub mod dates;
pub mod summary;
pub mod title;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use fyle_core::{CategoryCatalog, ExtractorSettings};
use fyle_store::Category;

pub use categories::CategoryCandidate;
pub use dates::DetectedDate;

/// Combined extraction result for a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Always non-empty.
    pub title: String,
    pub summary: BTreeMap<String, String>,
    /// Persisted categories, best first. At most `max_categories`.
    pub categories: Vec<Category>,
    pub expiry_date: Option<DateTime<Utc>>,
    /// True exactly when an expiry date was found.
    pub reminder_enabled: bool,
    /// Every date that survived the staleness filter, ascending.
    pub detected_dates: Vec<DetectedDate>,
}

/// Run every heuristic over `text`.
///
/// `persisted` is the set of categories that exist in the store; catalog
/// categories without a persisted counterpart are never selected.
pub fn extract_all(
    text: &str,
    catalog: &CategoryCatalog,
    persisted: &[Category],
    now: DateTime<Utc>,
    settings: &ExtractorSettings,
) -> ExtractionResult {
    let text = normalize(text);

    let title = title::extract_title(&text, now, settings.max_title_chars);
    let summary = summary::mine_key_values(&text, settings.max_key_chars, settings.max_value_chars);
    let categories =
        categories::select_categories(&text, catalog, persisted, settings.max_categories);

    let mut detected_dates = dates::detect_dates(&text, now, settings);
    detected_dates.sort_by_key(|d| d.date);
    let expiry_date = dates::choose_expiry(&detected_dates, now);

    debug!(
        "Extracted title={:?} fields={} categories={} dates={} expiry={:?}",
        title,
        summary.len(),
        categories.len(),
        detected_dates.len(),
        expiry_date
    );

    ExtractionResult {
        title,
        summary,
        categories,
        reminder_enabled: expiry_date.is_some(),
        expiry_date,
        detected_dates,
    }
}

/// Unify line endings and drop control characters other than `\n` and `\t`.
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    unified
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}
