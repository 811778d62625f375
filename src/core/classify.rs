//! Categorizer
//!
//! Chooses a category for newly observed clipboard text. Categories are
//! evaluated in map (display) order with the fallback skipped; within a
//! category, rules run in stored order and the first match wins.

use crate::core::categories::{CategoryMap, UNCATEGORIZED};

/// Classify content into a category name.
///
/// Always returns a name present in `categories`: the first category whose
/// rule matches, or [`UNCATEGORIZED`]. Callers must not pass empty content;
/// the poller never emits it.
pub fn classify(content: &str, categories: &CategoryMap) -> String {
    for category in categories.iter() {
        if category.name == UNCATEGORIZED {
            continue;
        }
        for rule in &category.rules {
            if rule.matches(content) {
                return category.name.clone();
            }
        }
    }
    UNCATEGORIZED.to_string()
}
