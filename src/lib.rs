//! clipsort - clipboard category manager.
//!
//! Watches the system clipboard for new text, classifies it into
//! user-defined categories via ordered keyword/regex rules, and keeps a
//! bounded pinned/unpinned history per category. The UI layer is external:
//! it consumes [`shared::events::AppEvent`] notifications and drives the
//! operations exposed by [`app::App`].

pub mod app;
pub mod config;
pub mod core;
pub mod shared;

pub use crate::app::App;
pub use crate::config::ConfigGateway;
pub use crate::core::categories::{Category, CategoryMap, UNCATEGORIZED};
pub use crate::core::clipboard::monitor::ClipboardMonitor;
pub use crate::core::clipboard::{ClipboardReader, ClipboardWriter, SystemClipboard};
pub use crate::shared::errors::{CoreError, CoreResult};
