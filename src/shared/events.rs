use serde::{Deserialize, Serialize};

/// Notifications for an external presentation layer.
///
/// The core never renders anything; it hands these to whatever sink the
/// embedding application registered (a UI event bus, a logger, a test
/// collector).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "payload")]
pub enum AppEvent {
    /// New clipboard text was classified and inserted into a category
    #[serde(rename = "clipboard://captured")]
    ContentCaptured { category: String, text: String },

    /// A category's history or rules changed through a user operation
    #[serde(rename = "history://changed")]
    HistoryChanged { category: String },

    /// The set of categories changed (added or deleted)
    #[serde(rename = "categories://changed")]
    CategoriesChanged,

    /// Result of a config save attempt
    #[serde(rename = "config://saved")]
    ConfigSaved { ok: bool },
}

/// Callback the presentation layer registers to observe [`AppEvent`]s.
pub type EventSink = dyn Fn(AppEvent) + Send + Sync;
