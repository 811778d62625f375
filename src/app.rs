//! Application context
//!
//! Owns the category map behind a single mutex: poller-detected text and
//! user-initiated operations both mutate through here, never from two
//! tasks at once. The poller hands text over an mpsc channel; the event
//! loop classifies, inserts, saves best-effort and notifies the
//! registered event sink. A failed save is reported, never rolled back.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::ConfigGateway;
use crate::core::categories::CategoryMap;
use crate::core::classify::classify;
use crate::core::clipboard::ClipboardWriter;
use crate::core::history::{BatchOp, BatchOutcome, MoveOutcome, PinOutcome};
use crate::shared::errors::CoreResult;
use crate::shared::events::{AppEvent, EventSink};

/// Application context tying the poller, categorizer, history store and
/// persistence gateway together
pub struct App {
    categories: Arc<Mutex<CategoryMap>>,
    config: ConfigGateway,
    events: Arc<Mutex<Option<Arc<EventSink>>>>,
}

impl App {
    /// Create the context, loading state through the gateway
    pub fn new(config: ConfigGateway) -> Self {
        let categories = config.load();
        Self {
            categories: Arc::new(Mutex::new(categories)),
            config,
            events: Arc::new(Mutex::new(None)),
        }
    }

    /// Register the presentation layer's event sink
    pub fn set_event_sink(&self, sink: Arc<EventSink>) {
        *lock_recover(&self.events) = Some(sink);
    }

    fn emit(&self, event: AppEvent) {
        let sink = lock_recover(&self.events).clone();
        if let Some(sink) = sink {
            sink(event);
        }
    }

    fn lock_categories(&self) -> MutexGuard<'_, CategoryMap> {
        lock_recover(&self.categories)
    }

    /// Persist current state; failure is reported, memory retained
    pub fn save(&self) -> bool {
        let ok = {
            let categories = self.lock_categories();
            self.config.save(&categories)
        };
        self.emit(AppEvent::ConfigSaved { ok });
        ok
    }

    /// Spawn the task consuming poller events, one at a time in detection
    /// order
    pub fn spawn_event_loop(&self, mut rx: mpsc::Receiver<String>) -> JoinHandle<()> {
        let app = self.clone_arc();
        tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                app.handle_new_content(&text);
            }
            println!("[App] Event loop finished");
        })
    }

    /// Classify newly observed clipboard text and insert it.
    ///
    /// Invoked once per detected change; callers never pass empty text.
    pub fn handle_new_content(&self, text: &str) {
        let category = {
            let mut categories = self.lock_categories();
            let category = classify(text, &categories);
            if let Err(e) = categories.add_item(&category, text) {
                // Classify only returns names present in the map
                eprintln!("[App] Failed to record item in '{}': {}", category, e);
                return;
            }
            category
        };
        self.save();
        self.emit(AppEvent::ContentCaptured {
            category,
            text: text.to_string(),
        });
    }

    // --- user-initiated operations (presentation layer entry points) ---

    /// Snapshot of category names in display order
    pub fn category_names(&self) -> Vec<String> {
        self.lock_categories()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Snapshot of one category's lists: (pinned, unpinned)
    pub fn history_of(&self, category: &str) -> Option<(Vec<String>, Vec<String>)> {
        let categories = self.lock_categories();
        categories
            .get(category)
            .map(|c| (c.pinned.clone(), c.unpinned.clone()))
    }

    pub fn add_category(&self, name: &str) -> CoreResult<()> {
        self.lock_categories().add_category(name)?;
        self.save();
        self.emit(AppEvent::CategoriesChanged);
        Ok(())
    }

    /// Delete a category and its history. The caller is responsible for
    /// confirming this with the user first.
    pub fn delete_category(&self, name: &str) -> CoreResult<()> {
        self.lock_categories().delete_category(name)?;
        self.save();
        self.emit(AppEvent::CategoriesChanged);
        Ok(())
    }

    pub fn add_rule(&self, category: &str, raw: &str) -> CoreResult<()> {
        self.lock_categories().add_rule(category, raw)?;
        self.save();
        self.emit(AppEvent::HistoryChanged {
            category: category.to_string(),
        });
        Ok(())
    }

    pub fn delete_rule(&self, category: &str, raw: &str) -> CoreResult<()> {
        self.lock_categories().delete_rule(category, raw)?;
        self.save();
        self.emit(AppEvent::HistoryChanged {
            category: category.to_string(),
        });
        Ok(())
    }

    pub fn pin_item(&self, category: &str, text: &str) -> CoreResult<PinOutcome> {
        let outcome = self.lock_categories().pin_item(category, text)?;
        self.save();
        self.emit(AppEvent::HistoryChanged {
            category: category.to_string(),
        });
        Ok(outcome)
    }

    pub fn unpin_item(&self, category: &str, text: &str) -> CoreResult<()> {
        self.lock_categories().unpin_item(category, text)?;
        self.save();
        self.emit(AppEvent::HistoryChanged {
            category: category.to_string(),
        });
        Ok(())
    }

    pub fn delete_item(&self, category: &str, text: &str) -> CoreResult<()> {
        self.lock_categories().delete_item(category, text)?;
        self.save();
        self.emit(AppEvent::HistoryChanged {
            category: category.to_string(),
        });
        Ok(())
    }

    pub fn move_item(&self, source: &str, dest: &str, text: &str) -> CoreResult<MoveOutcome> {
        let outcome = self.lock_categories().move_item(source, dest, text)?;
        self.save();
        self.emit(AppEvent::HistoryChanged {
            category: source.to_string(),
        });
        self.emit(AppEvent::HistoryChanged {
            category: dest.to_string(),
        });
        Ok(outcome)
    }

    /// Collected search results (pinned subsequence first)
    pub fn search(&self, category: &str, query: &str) -> CoreResult<Vec<String>> {
        let categories = self.lock_categories();
        let results = categories
            .search(category, query)?
            .map(str::to_string)
            .collect();
        Ok(results)
    }

    /// Apply a batch operation over a selection set.
    ///
    /// For [`BatchOp::CopyConcat`] the joined text is written back to the
    /// clipboard through `writer`.
    pub fn batch_apply(
        &self,
        category: &str,
        selection: &mut HashSet<String>,
        op: BatchOp,
        writer: &dyn ClipboardWriter,
    ) -> CoreResult<BatchOutcome> {
        let outcome = self
            .lock_categories()
            .batch_apply(category, selection, op)?;

        if let Some(text) = &outcome.concatenated {
            writer.write_text(text)?;
        }
        if !matches!(op, BatchOp::CopyConcat) {
            self.save();
        }
        self.emit(AppEvent::HistoryChanged {
            category: category.to_string(),
        });
        Ok(outcome)
    }

    /// Copy a single history item back to the system clipboard
    pub fn copy_item(&self, text: &str, writer: &dyn ClipboardWriter) -> CoreResult<()> {
        writer.write_text(text)
    }

    /// Unconditional save at shutdown
    pub fn shutdown(&self) {
        if self.save() {
            println!("[App] Configuration saved on shutdown");
        }
    }

    /// Get a clone for sharing across tasks
    pub fn clone_arc(&self) -> Self {
        Self {
            categories: Arc::clone(&self.categories),
            config: self.config.clone(),
            events: Arc::clone(&self.events),
        }
    }
}

/// Lock a mutex, recovering from poisoning
fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            eprintln!("[App] Mutex poisoned, recovering...");
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::categories::UNCATEGORIZED;
    use crate::shared::errors::CoreResult;
    use std::sync::Mutex as StdMutex;
    use tempfile::TempDir;

    struct RecordingWriter {
        written: StdMutex<Vec<String>>,
    }

    impl RecordingWriter {
        fn new() -> Self {
            Self {
                written: StdMutex::new(Vec::new()),
            }
        }
    }

    impl ClipboardWriter for RecordingWriter {
        fn write_text(&self, text: &str) -> CoreResult<()> {
            self.written.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn app_in(dir: &TempDir) -> App {
        App::new(ConfigGateway::new(dir.path().join("categories.json")))
    }

    #[test]
    fn test_new_content_is_classified_and_recorded() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);

        app.handle_new_content("def main():");
        app.handle_new_content("https://example.com");
        app.handle_new_content("just some words");

        let (_, code) = app.history_of("Code").unwrap();
        assert_eq!(code, vec!["def main():"]);
        let (_, links) = app.history_of("Links").unwrap();
        assert_eq!(links, vec!["https://example.com"]);
        let (_, misc) = app.history_of(UNCATEGORIZED).unwrap();
        assert_eq!(misc, vec!["just some words"]);
    }

    #[test]
    fn test_mutations_persist_across_restart() {
        let dir = TempDir::new().unwrap();
        {
            let app = app_in(&dir);
            app.handle_new_content("def main():");
            app.pin_item("Code", "def main():").unwrap();
        }
        let app = app_in(&dir);
        let (pinned, unpinned) = app.history_of("Code").unwrap();
        assert_eq!(pinned, vec!["def main():"]);
        assert!(unpinned.is_empty());
    }

    #[test]
    fn test_events_reach_the_sink() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);

        let seen: Arc<StdMutex<Vec<AppEvent>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        app.set_event_sink(Arc::new(move |event| {
            sink_seen.lock().unwrap().push(event);
        }));

        app.handle_new_content("hello");

        let seen = seen.lock().unwrap();
        assert!(seen.contains(&AppEvent::ContentCaptured {
            category: UNCATEGORIZED.to_string(),
            text: "hello".to_string(),
        }));
        assert!(seen.contains(&AppEvent::ConfigSaved { ok: true }));
    }

    #[test]
    fn test_batch_copy_concat_writes_clipboard() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);
        app.handle_new_content("bbb");
        app.handle_new_content("aaa");

        let writer = RecordingWriter::new();
        let mut selection: HashSet<String> =
            ["aaa", "bbb"].iter().map(|s| s.to_string()).collect();
        let outcome = app
            .batch_apply(UNCATEGORIZED, &mut selection, BatchOp::CopyConcat, &writer)
            .unwrap();

        assert_eq!(outcome.concatenated.as_deref(), Some("aaa\n\nbbb"));
        assert_eq!(*writer.written.lock().unwrap(), vec!["aaa\n\nbbb"]);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_event_loop_processes_in_order() {
        let dir = TempDir::new().unwrap();
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let app = app_in(&dir);
            let (tx, rx) = mpsc::channel(16);
            let handle = app.spawn_event_loop(rx);

            tx.send("one".to_string()).await.unwrap();
            tx.send("two".to_string()).await.unwrap();
            drop(tx);
            handle.await.unwrap();

            let (_, items) = app.history_of(UNCATEGORIZED).unwrap();
            assert_eq!(items, vec!["two", "one"]);
        });
    }

    #[test]
    fn test_shutdown_saves() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);
        app.handle_new_content("something");
        app.shutdown();

        let restored = ConfigGateway::new(dir.path().join("categories.json")).load();
        assert_eq!(
            restored.get(UNCATEGORIZED).unwrap().unpinned,
            vec!["something"]
        );
    }
}
