//! Category data model
//!
//! A category is a named bucket holding an ordered rule list and two ordered
//! history lists (pinned, unpinned). The [`CategoryMap`] preserves insertion
//! order: it is both the display order and the rule-evaluation order during
//! classification. Serde goes through the persisted JSON-object form, so
//! document order survives a load/save round trip.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::rules::Rule;
use crate::shared::errors::{CoreError, CoreResult};

/// The fallback category; always present, never rule-matched, never deletable
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A named bucket of rules and history
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    /// Ordered rule list; evaluation order during classification
    pub rules: Vec<Rule>,
    /// Unpinned history, most-recent-first (persisted as `history`)
    pub unpinned: Vec<String>,
    /// Pinned history, most-recent-pinned-first (persisted as `pinned_history`)
    pub pinned: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            unpinned: Vec::new(),
            pinned: Vec::new(),
        }
    }

    /// Whether the text is present in either history list
    pub fn contains_item(&self, text: &str) -> bool {
        self.pinned.iter().any(|t| t == text) || self.unpinned.iter().any(|t| t == text)
    }
}

/// The serialized per-category value: exactly the three persisted fields.
///
/// All fields default so a partially-populated entry loads like the
/// original config format (missing keys become empty lists).
#[derive(Debug, Default, Serialize, Deserialize)]
struct CategoryData {
    #[serde(default)]
    rules: Vec<Rule>,
    #[serde(default)]
    history: Vec<String>,
    #[serde(default)]
    pinned_history: Vec<String>,
}

/// Insertion-ordered mapping from category name to [`Category`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMap {
    categories: Vec<Category>,
}

impl CategoryMap {
    /// Create a map containing only the fallback category
    pub fn new() -> Self {
        let mut map = Self {
            categories: Vec::new(),
        };
        map.ensure_uncategorized();
        map
    }

    /// Create an empty map (used by deserialization before injection)
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Inject the fallback category if it is absent
    pub fn ensure_uncategorized(&mut self) {
        if !self.contains(UNCATEGORIZED) {
            self.categories.push(Category::new(UNCATEGORIZED));
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.name == name)
    }

    /// Categories in insertion (display) order
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Category names in insertion (display) order
    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Add a new empty category at the end of the display order
    pub fn add_category(&mut self, name: &str) -> CoreResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidInput(
                "category name cannot be empty".to_string(),
            ));
        }
        if self.contains(name) {
            return Err(CoreError::InvalidInput(format!(
                "category '{}' already exists",
                name
            )));
        }
        self.categories.push(Category::new(name));
        Ok(())
    }

    /// Delete a category and its history.
    ///
    /// The fallback category is protected; confirmation for this
    /// destructive operation is the caller's responsibility.
    pub fn delete_category(&mut self, name: &str) -> CoreResult<()> {
        if name == UNCATEGORIZED {
            return Err(CoreError::ProtectedCategory(name.to_string()));
        }
        let before = self.categories.len();
        self.categories.retain(|c| c.name != name);
        if self.categories.len() == before {
            return Err(CoreError::UnknownCategory(name.to_string()));
        }
        Ok(())
    }

    /// Append a rule to a category, rejecting duplicates by raw form
    pub fn add_rule(&mut self, category: &str, raw: &str) -> CoreResult<()> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CoreError::InvalidInput("rule cannot be empty".to_string()));
        }
        let cat = self
            .get_mut(category)
            .ok_or_else(|| CoreError::UnknownCategory(category.to_string()))?;
        let rule = Rule::parse(raw);
        if cat.rules.contains(&rule) {
            return Err(CoreError::InvalidInput(format!(
                "rule '{}' already exists in '{}'",
                raw, category
            )));
        }
        cat.rules.push(rule);
        Ok(())
    }

    /// Remove a rule by its raw form
    pub fn delete_rule(&mut self, category: &str, raw: &str) -> CoreResult<()> {
        let cat = self
            .get_mut(category)
            .ok_or_else(|| CoreError::UnknownCategory(category.to_string()))?;
        let before = cat.rules.len();
        cat.rules.retain(|r| r.raw() != raw);
        if cat.rules.len() == before {
            return Err(CoreError::ItemNotFound(category.to_string()));
        }
        Ok(())
    }
}

// The persisted form is a JSON object keyed by category name; only the
// three data fields are written, anything else in memory is dropped.
impl Serialize for CategoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for cat in &self.categories {
            map.serialize_entry(
                &cat.name,
                &CategoryData {
                    rules: cat.rules.clone(),
                    history: cat.unpinned.clone(),
                    pinned_history: cat.pinned.clone(),
                },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoryMapVisitor;

        impl<'de> Visitor<'de> for CategoryMapVisitor {
            type Value = CategoryMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to category data")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut result = CategoryMap::empty();
                while let Some(name) = access.next_key::<String>()? {
                    // A malformed entry resets that category rather than
                    // failing the whole document (original config behavior).
                    let value = access.next_value::<serde_json::Value>()?;
                    let data = match serde_json::from_value::<CategoryData>(value) {
                        Ok(data) => data,
                        Err(e) => {
                            eprintln!(
                                "[CategoryMap] Malformed entry for '{}', resetting: {}",
                                name, e
                            );
                            CategoryData::default()
                        }
                    };
                    // Later duplicate keys win, matching JSON object semantics
                    result.categories.retain(|c| c.name != name);
                    result.categories.push(Category {
                        name,
                        rules: data.rules,
                        unpinned: data.history,
                        pinned: data.pinned_history,
                    });
                }
                Ok(result)
            }
        }

        deserializer.deserialize_map(CategoryMapVisitor)
    }
}

/// Display-only truncation of a history item: newlines flattened, long
/// text cut to `max_len` with an ellipsis. Never stored state.
pub fn preview(text: &str, max_len: usize) -> String {
    let flat = text.replace('\n', " ").trim().to_string();
    if flat.chars().count() > max_len {
        let cut: String = flat.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}
