//! Keyword-based category scoring.
//!
//! A category scores one point per distinct keyword found as a substring of
//! the lower-cased text. Ties keep catalog declaration order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use fyle_core::{CategoryCatalog, FALLBACK_CATEGORY};
use fyle_store::Category;

/// A catalog category with at least one keyword hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCandidate {
    pub name: String,
    pub score: usize,
}

/// Score every catalog category against the text.
///
/// Returns qualifying candidates ranked by descending score; equal scores
/// keep declaration order.
pub fn score_categories(text: &str, catalog: &CategoryCatalog) -> Vec<CategoryCandidate> {
    let lower = text.to_lowercase();
    let mut candidates: Vec<CategoryCandidate> = catalog
        .iter()
        .filter_map(|spec| {
            let hits: BTreeSet<&str> = spec
                .keywords
                .iter()
                .map(String::as_str)
                .filter(|kw| !kw.is_empty() && lower.contains(*kw))
                .collect();
            (!hits.is_empty()).then(|| CategoryCandidate {
                name: spec.name.clone(),
                score: hits.len(),
            })
        })
        .collect();
    // Stable sort: ties stay in catalog order.
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

/// Pick at most `max` persisted categories for the text.
///
/// Candidates without a persisted category of the same name are dropped.
/// When nothing remains the persisted fallback category is returned alone,
/// if it exists.
pub fn select_categories(
    text: &str,
    catalog: &CategoryCatalog,
    persisted: &[Category],
    max: usize,
) -> Vec<Category> {
    let resolved: Vec<Category> = score_categories(text, catalog)
        .into_iter()
        .filter_map(|c| persisted.iter().find(|p| p.name == c.name).cloned())
        .take(max)
        .collect();

    if !resolved.is_empty() {
        return resolved;
    }

    persisted
        .iter()
        .find(|p| p.name == FALLBACK_CATEGORY)
        .cloned()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            icon: String::new(),
            color: String::new(),
            created_at: 0,
        }
    }

    fn names(categories: &[Category]) -> Vec<&str> {
        categories.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_distinct_keywords_counted_once() {
        let catalog = CategoryCatalog::from_keywords([("Travel", vec!["flight", "hotel"])]);
        let scored = score_categories("Flight 1, flight 2, FLIGHT 3", &catalog);
        assert_eq!(
            scored,
            vec![CategoryCandidate {
                name: "Travel".into(),
                score: 1
            }]
        );
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let catalog = CategoryCatalog::from_keywords([
            ("A", vec!["alpha"]),
            ("B", vec!["beta", "gamma"]),
            ("C", vec!["alpha"]),
        ]);
        let scored = score_categories("alpha beta", &catalog);
        let order: Vec<&str> = scored.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);

        let scored = score_categories("alpha beta gamma", &catalog);
        let order: Vec<&str> = scored.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_unpersisted_categories_dropped() {
        let catalog = CategoryCatalog::builtin();
        let persisted = vec![category(1, "Travel"), category(2, "Miscellaneous")];
        let selected = select_categories("Hospital bill. Flight booking.", &catalog, &persisted, 2);
        assert_eq!(names(&selected), vec!["Travel"]);
    }

    #[test]
    fn test_at_most_max() {
        let catalog = CategoryCatalog::builtin();
        let persisted: Vec<Category> = catalog
            .iter()
            .enumerate()
            .map(|(i, e)| category(i as i64, &e.name))
            .collect();
        let text = "rent lease tuition exam bank account hospital doctor flight hotel";
        assert_eq!(select_categories(text, &catalog, &persisted, 2).len(), 2);
        assert_eq!(select_categories(text, &catalog, &persisted, 1).len(), 1);
    }

    #[test]
    fn test_fallback() {
        let catalog = CategoryCatalog::builtin();
        let with_misc = vec![category(1, "Home"), category(9, "Miscellaneous")];
        let selected = select_categories("zzz", &catalog, &with_misc, 2);
        assert_eq!(names(&selected), vec!["Miscellaneous"]);
        assert_eq!(selected[0].id, 9);

        let without_misc = vec![category(1, "Home")];
        assert!(select_categories("zzz", &catalog, &without_misc, 2).is_empty());
    }
}
