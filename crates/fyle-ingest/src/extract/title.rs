//! Title extraction: explicit label, then document type, then first line.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static TITLE_LABELS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)title:|document:").unwrap());

/// Checked in order against the first line.
const DOCUMENT_TYPES: &[&str] = &[
    "invoice",
    "contract",
    "warranty",
    "receipt",
    "agreement",
    "policy",
    "certificate",
];

/// Derive a title. The result is never empty.
pub fn extract_title(text: &str, now: DateTime<Utc>, max_chars: usize) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if let Some(labelled) = lines
        .iter()
        .find(|l| TITLE_LABELS.is_match(l))
        .map(|l| TITLE_LABELS.replace_all(l, "").trim().to_string())
        .filter(|t| !t.is_empty())
    {
        return labelled;
    }

    let Some(first) = lines.first() else {
        return fallback_title(now);
    };

    let first_lower = first.to_lowercase();
    if let Some(kind) = DOCUMENT_TYPES.iter().find(|k| first_lower.contains(*k)) {
        return capitalize(kind);
    }

    let truncated: String = first.chars().take(max_chars.max(1)).collect();
    let truncated = truncated.trim();
    if truncated.is_empty() {
        fallback_title(now)
    } else {
        truncated.to_string()
    }
}

/// `Document 5 Mar 2026`
pub fn fallback_title(now: DateTime<Utc>) -> String {
    format!("Document {}", now.format("%-d %b %Y"))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 5, 9, 30, 0).unwrap()
    }

    fn title(text: &str) -> String {
        extract_title(text, now(), 50)
    }

    #[test]
    fn test_label_anywhere() {
        assert_eq!(title("ACME Corp\nDocument: Lease Renewal\n"), "Lease Renewal");
        assert_eq!(title("TITLE: Tax Return"), "Tax Return");
    }

    #[test]
    fn test_every_label_occurrence_stripped() {
        assert_eq!(title("Title: Document: Boarding Pass"), "Boarding Pass");
    }

    #[test]
    fn test_empty_label_falls_through() {
        assert_eq!(title("Rental agreement for flat 4\nTitle:"), "Agreement");
    }

    #[test]
    fn test_document_type_keyword_order() {
        // "invoice" is checked before "receipt".
        assert_eq!(title("Receipt and invoice #442"), "Invoice");
        assert_eq!(title("Certificate of Completion"), "Certificate");
    }

    #[test]
    fn test_first_line_truncated() {
        let line = format!("{} tail", "a".repeat(60));
        let t = title(&line);
        assert_eq!(t.chars().count(), 50);

        let spaced = format!("{}{}", "b".repeat(49), "   more words");
        assert_eq!(title(&spaced), "b".repeat(49));
    }

    #[test]
    fn test_skips_blank_lines() {
        assert_eq!(title("\n   \n\tCity Library Card\n"), "City Library Card");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(title(""), "Document 5 Mar 2026");
        assert_eq!(title(" \n \n"), "Document 5 Mar 2026");
    }

    #[test]
    fn test_multibyte_truncation() {
        let line = "é".repeat(80);
        assert_eq!(title(&line).chars().count(), 50);
    }
}
