//! Date recognition and expiry selection.
//!
//! Recognized forms (case-insensitive):
//! - `March 5, 2026`, `Mar. 5th 2026`
//! - `5 March 2026`, `5th of March, 2026`
//! - `2026-03-05`, `2026/03/05`, `2026.03.05`
//! - `03/05/2026`, `03-05-26`, `25.12.2026` (month first unless the first
//!   number cannot be a month)
//! - `March 2026` (first of the month)
//!
//! Matches never overlap: the earliest match wins, then the longest.
//! A date-only match resolves to 12:00 UTC on that day.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use fyle_core::ExtractorSettings;

const MONTH: &str = r"(?P<month>jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b\.?";

/// Phrases that mark a nearby date as an expiry or deadline.
pub const EXPIRY_KEYWORDS: &[&str] = &[
    "expiry",
    "expiration",
    "valid until",
    "due date",
    "expires on",
    "end date",
    "valid thru",
    "valid through",
    "expires",
    "due",
    "validity",
    "term ends",
    "renew by",
    "expiration date",
    "good until",
    "use by",
    "valid till",
    "exp",
    "renewal",
];

#[derive(Clone, Copy)]
enum Form {
    MonthDayYear,
    DayMonthYear,
    YearMonthDay,
    Numeric,
    MonthYear,
}

static PATTERNS: Lazy<Vec<(Form, Regex)>> = Lazy::new(|| {
    let mut patterns = vec![
        (
            Form::MonthDayYear,
            format!(r"(?i)\b{MONTH}\s+(?P<day>\d{{1,2}})(?:st|nd|rd|th)?\b(?:,\s*|\s+)(?P<year>\d{{4}})\b"),
        ),
        (
            Form::DayMonthYear,
            format!(r"(?i)\b(?P<day>\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{MONTH}(?:,\s*|\s+)(?P<year>\d{{4}})\b"),
        ),
        (
            Form::MonthYear,
            format!(r"(?i)\b{MONTH}\s+(?P<year>\d{{4}})\b"),
        ),
    ];
    // The regex crate has no backreferences, so each separator gets its own pattern.
    for sep in ["-", "/", r"\."] {
        patterns.push((
            Form::YearMonthDay,
            format!(r"\b(?P<year>\d{{4}}){sep}(?P<month>\d{{1,2}}){sep}(?P<day>\d{{1,2}})\b"),
        ));
        patterns.push((
            Form::Numeric,
            format!(r"\b(?P<first>\d{{1,2}}){sep}(?P<second>\d{{1,2}}){sep}(?P<year>\d{{4}}|\d{{2}})\b"),
        ));
    }
    patterns
        .into_iter()
        .map(|(form, pattern)| (form, Regex::new(&pattern).unwrap()))
        .collect()
});

/// A date found in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedDate {
    pub date: DateTime<Utc>,
    /// Byte span of the match in the normalized text.
    pub start: usize,
    pub end: usize,
    pub matched: String,
    /// True when an expiry phrase occurs in the surrounding context.
    pub expiry_associated: bool,
}

/// A raw recognizer hit, before staleness filtering and context analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    pub date: DateTime<Utc>,
    pub start: usize,
    pub end: usize,
}

/// Find every date in `text`, in text order, without overlaps.
pub fn recognize_dates(text: &str) -> Vec<DateMatch> {
    let mut hits: Vec<DateMatch> = Vec::new();
    for (form, re) in PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if let Some(date) = resolve(*form, &caps) {
                hits.push(DateMatch {
                    date,
                    start: whole.start(),
                    end: whole.end(),
                });
            }
        }
    }

    hits.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    let mut selected: Vec<DateMatch> = Vec::with_capacity(hits.len());
    for hit in hits {
        if selected.last().map_or(true, |prev| hit.start >= prev.end) {
            selected.push(hit);
        }
    }
    selected
}

/// Recognize dates, drop stale ones, and flag those near an expiry phrase.
pub fn detect_dates(
    text: &str,
    now: DateTime<Utc>,
    settings: &ExtractorSettings,
) -> Vec<DetectedDate> {
    // A tolerance beyond chrono's range means nothing is stale.
    let cutoff = Duration::try_days(settings.past_tolerance_days.max(0))
        .and_then(|tolerance| now.checked_sub_signed(tolerance));
    recognize_dates(text)
        .into_iter()
        .filter(|m| {
            let fresh = cutoff.map_or(true, |c| m.date >= c);
            if !fresh {
                debug!("Ignoring stale date {} at byte {}", m.date, m.start);
            }
            fresh
        })
        .map(|m| {
            let window = context_window(
                text,
                m.start,
                m.end,
                settings.context_before,
                settings.context_after,
            );
            DetectedDate {
                date: m.date,
                matched: text[m.start..m.end].to_string(),
                start: m.start,
                end: m.end,
                expiry_associated: EXPIRY_KEYWORDS.iter().any(|kw| window.contains(kw)),
            }
        })
        .collect()
}

/// Pick the expiry date from detected dates.
///
/// Expiry-associated dates take priority; otherwise future dates; otherwise
/// everything. Within the chosen group the latest date wins.
pub fn choose_expiry(dates: &[DetectedDate], now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let associated = dates.iter().filter(|d| d.expiry_associated).map(|d| d.date).max();
    if associated.is_some() {
        return associated;
    }
    let future = dates.iter().map(|d| d.date).filter(|d| *d > now).max();
    future.or_else(|| dates.iter().map(|d| d.date).max())
}

/// Lower-cased text from `before` chars ahead of the span to `after` chars past it.
fn context_window(text: &str, start: usize, end: usize, before: usize, after: usize) -> String {
    let lead = if before == 0 {
        start
    } else {
        text[..start]
            .char_indices()
            .rev()
            .take(before)
            .last()
            .map_or(start, |(i, _)| i)
    };
    let trail = text[end..]
        .char_indices()
        .nth(after)
        .map_or(text.len(), |(i, _)| end + i);
    text[lead..trail].to_lowercase()
}

fn resolve(form: Form, caps: &Captures<'_>) -> Option<DateTime<Utc>> {
    let num = |name: &str| caps.name(name)?.as_str().parse::<u32>().ok();
    let (year, month, day) = match form {
        Form::MonthDayYear | Form::DayMonthYear => {
            (num("year")? as i32, month_number(caps.name("month")?.as_str())?, num("day")?)
        }
        Form::MonthYear => (num("year")? as i32, month_number(caps.name("month")?.as_str())?, 1),
        Form::YearMonthDay => (num("year")? as i32, num("month")?, num("day")?),
        Form::Numeric => {
            let (first, second) = (num("first")?, num("second")?);
            let (month, day) = if first > 12 { (second, first) } else { (first, second) };
            let raw_year = caps.name("year")?.as_str();
            let year = raw_year.parse::<i32>().ok()?;
            let year = if raw_year.len() == 2 { 2000 + year } else { year };
            (year, month, day)
        }
    };
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(12, 0, 0)
        .map(|dt| dt.and_utc())
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let month = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
