//! Clipboard access
//!
//! The monitor and the copy-back path talk to the OS clipboard through the
//! [`ClipboardReader`] / [`ClipboardWriter`] ports so tests can substitute
//! scripted fakes. [`SystemClipboard`] is the production implementation on
//! top of `cli-clipboard`.

pub mod monitor;

use crate::shared::errors::{CoreError, CoreResult};

/// Read side of the OS clipboard
pub trait ClipboardReader: Send + Sync {
    /// Current clipboard text.
    ///
    /// `Err(ClipboardUnavailable)` means the clipboard is empty or cannot
    /// be read right now; any other error is treated as transient by the
    /// monitor.
    fn read_text(&self) -> CoreResult<String>;
}

/// Write side of the OS clipboard
pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> CoreResult<()>;
}

/// System clipboard via `cli-clipboard`.
///
/// A fresh platform context is created per call, so the handle is freely
/// shareable across tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardReader for SystemClipboard {
    fn read_text(&self) -> CoreResult<String> {
        // cli-clipboard reports an empty clipboard as an error on some
        // platforms; both map to the "unavailable" case here.
        cli_clipboard::get_contents()
            .map_err(|e| CoreError::ClipboardUnavailable(e.to_string()))
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> CoreResult<()> {
        cli_clipboard::set_contents(text.to_string())
            .map_err(|e| CoreError::ClipboardUnavailable(e.to_string()))
    }
}
