//! History store operations
//!
//! Per-category ordered item lists with dedup-by-move-to-top insertion,
//! pin/unpin transitions, capacity trimming, cross-category moves, search
//! and batch application. Every operation leaves the map consistent: an
//! item's text lives in at most one of {pinned, unpinned} per category,
//! and the unpinned list never exceeds [`HISTORY_LIMIT`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::categories::CategoryMap;
use crate::shared::errors::{CoreError, CoreResult};

/// Maximum number of unpinned items kept per category
pub const HISTORY_LIMIT: usize = 50;

/// Outcome of a pin request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinOutcome {
    Pinned,
    /// The item was already pinned; the request is a no-op, not an error
    AlreadyPinned,
}

/// Outcome of a cross-category move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Moved,
    /// The item was absent from the source lists; the destination insert
    /// still happened, the caller may surface a warning
    MissingFromSource,
}

/// Single-item operation applied to every member of a batch selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOp {
    /// Concatenate selected items (display order, blank-line separated)
    CopyConcat,
    Delete,
    Pin,
    Unpin,
}

/// Result of a batch application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Number of selected items the operation actually touched
    pub applied: usize,
    /// The joined text for [`BatchOp::CopyConcat`], `None` otherwise
    pub concatenated: Option<String>,
}

fn remove_text(list: &mut Vec<String>, text: &str) -> bool {
    let before = list.len();
    list.retain(|t| t != text);
    list.len() != before
}

impl CategoryMap {
    /// Insert new text at the head of a category's unpinned list.
    ///
    /// Any prior occurrence in either list is removed first, so re-copying
    /// an already-pinned item unpins it and resets its recency. The
    /// unpinned tail is trimmed to [`HISTORY_LIMIT`].
    pub fn add_item(&mut self, category: &str, text: &str) -> CoreResult<()> {
        let cat = self
            .get_mut(category)
            .ok_or_else(|| CoreError::UnknownCategory(category.to_string()))?;

        remove_text(&mut cat.pinned, text);
        remove_text(&mut cat.unpinned, text);
        cat.unpinned.insert(0, text.to_string());
        if cat.unpinned.len() > HISTORY_LIMIT {
            cat.unpinned.truncate(HISTORY_LIMIT);
        }
        Ok(())
    }

    /// Move an unpinned item to the head of the pinned list
    pub fn pin_item(&mut self, category: &str, text: &str) -> CoreResult<PinOutcome> {
        let cat = self
            .get_mut(category)
            .ok_or_else(|| CoreError::UnknownCategory(category.to_string()))?;

        if cat.pinned.iter().any(|t| t == text) {
            return Ok(PinOutcome::AlreadyPinned);
        }
        if !remove_text(&mut cat.unpinned, text) {
            return Err(CoreError::ItemNotFound(category.to_string()));
        }
        cat.pinned.insert(0, text.to_string());
        Ok(PinOutcome::Pinned)
    }

    /// Move a pinned item back to the head of the unpinned list
    pub fn unpin_item(&mut self, category: &str, text: &str) -> CoreResult<()> {
        let cat = self
            .get_mut(category)
            .ok_or_else(|| CoreError::UnknownCategory(category.to_string()))?;

        if !remove_text(&mut cat.pinned, text) {
            return Err(CoreError::ItemNotFound(category.to_string()));
        }
        // Drop any stale duplicate before reinserting at the head
        remove_text(&mut cat.unpinned, text);
        cat.unpinned.insert(0, text.to_string());
        Ok(())
    }

    /// Remove an item from whichever list contains it
    pub fn delete_item(&mut self, category: &str, text: &str) -> CoreResult<()> {
        let cat = self
            .get_mut(category)
            .ok_or_else(|| CoreError::UnknownCategory(category.to_string()))?;

        let in_pinned = remove_text(&mut cat.pinned, text);
        let in_unpinned = remove_text(&mut cat.unpinned, text);
        if !in_pinned && !in_unpinned {
            return Err(CoreError::ItemNotFound(category.to_string()));
        }
        Ok(())
    }

    /// Move an item to the head of another category's unpinned list.
    ///
    /// A move always unpins the item relative to its new category. The
    /// destination insert happens even when the item was missing from the
    /// source lists; that case is reported as a warning outcome.
    pub fn move_item(
        &mut self,
        source: &str,
        dest: &str,
        text: &str,
    ) -> CoreResult<MoveOutcome> {
        if !self.contains(source) {
            return Err(CoreError::UnknownCategory(source.to_string()));
        }
        if !self.contains(dest) {
            return Err(CoreError::UnknownCategory(dest.to_string()));
        }

        let src = self.get_mut(source).expect("source checked above");
        let in_pinned = remove_text(&mut src.pinned, text);
        let in_unpinned = remove_text(&mut src.unpinned, text);
        let found = in_pinned || in_unpinned;
        if !found {
            eprintln!(
                "[HistoryStore] Move: item not found in '{}', inserting into '{}' anyway",
                source, dest
            );
        }

        let dst = self.get_mut(dest).expect("dest checked above");
        remove_text(&mut dst.pinned, text);
        remove_text(&mut dst.unpinned, text);
        dst.unpinned.insert(0, text.to_string());
        if dst.unpinned.len() > HISTORY_LIMIT {
            dst.unpinned.truncate(HISTORY_LIMIT);
        }

        Ok(if found {
            MoveOutcome::Moved
        } else {
            MoveOutcome::MissingFromSource
        })
    }

    /// Lazily filter a category's items by case-insensitive substring.
    ///
    /// Pinned items come first in stored order, then unpinned items in
    /// stored order. An empty query yields everything in that ordering.
    pub fn search<'a>(
        &'a self,
        category: &str,
        query: &str,
    ) -> CoreResult<impl Iterator<Item = &'a str> + 'a> {
        let cat = self
            .get(category)
            .ok_or_else(|| CoreError::UnknownCategory(category.to_string()))?;
        let query = query.to_lowercase();
        Ok(cat
            .pinned
            .iter()
            .chain(cat.unpinned.iter())
            .filter(move |t| t.to_lowercase().contains(&query))
            .map(|t| t.as_str()))
    }

    /// Apply a single-item operation to every selected item.
    ///
    /// An unknown category fails the whole batch with nothing touched.
    /// Stale selection entries (text no longer present) are skipped rather
    /// than aborting. The selection set is cleared on success.
    pub fn batch_apply(
        &mut self,
        category: &str,
        selection: &mut HashSet<String>,
        op: BatchOp,
    ) -> CoreResult<BatchOutcome> {
        if !self.contains(category) {
            return Err(CoreError::UnknownCategory(category.to_string()));
        }

        // Pinned-then-unpinned display order, filtered to the selection
        let ordered: Vec<String> = {
            let cat = self.get(category).expect("category checked above");
            cat.pinned
                .iter()
                .chain(cat.unpinned.iter())
                .filter(|t| selection.contains(t.as_str()))
                .cloned()
                .collect()
        };

        let outcome = match op {
            BatchOp::CopyConcat => BatchOutcome {
                applied: ordered.len(),
                concatenated: Some(ordered.join("\n\n")),
            },
            BatchOp::Delete => {
                let mut applied = 0;
                for text in &ordered {
                    if self.delete_item(category, text).is_ok() {
                        applied += 1;
                    }
                }
                BatchOutcome {
                    applied,
                    concatenated: None,
                }
            }
            BatchOp::Pin => {
                let mut applied = 0;
                for text in &ordered {
                    if matches!(self.pin_item(category, text), Ok(PinOutcome::Pinned)) {
                        applied += 1;
                    }
                }
                BatchOutcome {
                    applied,
                    concatenated: None,
                }
            }
            BatchOp::Unpin => {
                let mut applied = 0;
                for text in &ordered {
                    if self.unpin_item(category, text).is_ok() {
                        applied += 1;
                    }
                }
                BatchOutcome {
                    applied,
                    concatenated: None,
                }
            }
        };

        selection.clear();
        Ok(outcome)
    }
}
