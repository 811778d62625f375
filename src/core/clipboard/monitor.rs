//! Clipboard monitor that polls for changes
//!
//! A background task samples the clipboard on a fixed interval, compares it
//! to the last-known value and hands each newly observed text to the
//! application context over an mpsc channel. The loop survives every read
//! failure; it ends only on an explicit stop signal, observed within one
//! polling interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::core::clipboard::ClipboardReader;
use crate::shared::errors::CoreError;

/// Default polling interval
pub const POLL_INTERVAL_MS: u64 = 500;

/// Clipboard monitor that polls for changes
pub struct ClipboardMonitor {
    enabled: Arc<Mutex<bool>>,
    running: Arc<AtomicBool>,
    last_content: Arc<Mutex<String>>,
    reader: Arc<dyn ClipboardReader>,
    interval: Duration,
}

impl ClipboardMonitor {
    /// Create a new clipboard monitor with the default polling interval
    pub fn new(reader: Arc<dyn ClipboardReader>) -> Self {
        Self::with_interval(reader, Duration::from_millis(POLL_INTERVAL_MS))
    }

    /// Create a monitor with a custom polling interval
    pub fn with_interval(reader: Arc<dyn ClipboardReader>, interval: Duration) -> Self {
        Self {
            enabled: Arc::new(Mutex::new(true)),
            running: Arc::new(AtomicBool::new(false)),
            last_content: Arc::new(Mutex::new(String::new())),
            reader,
            interval,
        }
    }

    /// Start the background polling task.
    ///
    /// Each newly detected text is sent through `tx` exactly once, in
    /// detection order. The task ends when [`stop`](Self::stop) is called
    /// or the receiver is dropped.
    pub fn start(&self, tx: mpsc::Sender<String>) -> JoinHandle<()> {
        // Seed the baseline so whatever is already on the clipboard at
        // startup is not reported as new (original behavior).
        {
            let initial = self.reader.read_text().unwrap_or_default();
            let mut last = lock_recover(&self.last_content);
            *last = initial;
        }

        self.running.store(true, Ordering::SeqCst);

        let enabled = Arc::clone(&self.enabled);
        let running = Arc::clone(&self.running);
        let last_content = Arc::clone(&self.last_content);
        let reader = Arc::clone(&self.reader);
        let interval = self.interval;

        tokio::spawn(async move {
            println!("[ClipboardMonitor] Started monitoring");
            let mut consecutive_errors = 0u32;

            while running.load(Ordering::SeqCst) {
                let is_enabled = *lock_recover(&enabled);
                if is_enabled {
                    match reader.read_text() {
                        Ok(current) => {
                            consecutive_errors = 0;
                            if current.is_empty() {
                                // Same handling as an empty clipboard below
                                reset_baseline(&last_content);
                            } else {
                                let changed = {
                                    let mut last = lock_recover(&last_content);
                                    if *last != current {
                                        *last = current.clone();
                                        true
                                    } else {
                                        false
                                    }
                                };
                                if changed {
                                    println!("[ClipboardMonitor] Detected clipboard change");
                                    if tx.send(current).await.is_err() {
                                        // Receiver gone, nothing left to notify
                                        break;
                                    }
                                }
                            }
                        }
                        Err(CoreError::ClipboardUnavailable(_)) => {
                            // Empty or momentarily unreadable: reset the
                            // baseline so a later identical paste is still
                            // detected as new.
                            consecutive_errors = 0;
                            reset_baseline(&last_content);
                        }
                        Err(e) => {
                            consecutive_errors += 1;
                            // Only log errors occasionally to avoid spam
                            if consecutive_errors == 1 || consecutive_errors % 10 == 0 {
                                eprintln!(
                                    "[ClipboardMonitor] Failed to read clipboard (error #{}): {}",
                                    consecutive_errors, e
                                );
                            }
                            // Baseline untouched; transient failures never
                            // stop the loop.
                        }
                    }
                }

                tokio::time::sleep(interval).await;
            }

            println!("[ClipboardMonitor] Monitor loop finished");
        })
    }

    /// Signal the polling task to stop.
    ///
    /// Observed at the top of the next iteration, so a caller awaiting the
    /// join handle blocks at most one interval plus processing time.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        println!("[ClipboardMonitor] Stop signal sent");
    }

    /// Whether the polling task is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Resume sampling (the task keeps running while paused)
    pub fn enable(&self) {
        *lock_recover(&self.enabled) = true;
        println!("[ClipboardMonitor] Enabled");
    }

    /// Pause sampling without stopping the task
    pub fn disable(&self) {
        *lock_recover(&self.enabled) = false;
        println!("[ClipboardMonitor] Disabled");
    }

    /// Check if sampling is enabled
    pub fn is_enabled(&self) -> bool {
        *lock_recover(&self.enabled)
    }

    /// Toggle sampling on/off, returning the new state
    pub fn toggle(&self) -> bool {
        let mut enabled = lock_recover(&self.enabled);
        *enabled = !*enabled;
        println!("[ClipboardMonitor] Toggled to {}", *enabled);
        *enabled
    }

    /// Get a clone for sharing across tasks
    pub fn clone_arc(&self) -> Self {
        Self {
            enabled: Arc::clone(&self.enabled),
            running: Arc::clone(&self.running),
            last_content: Arc::clone(&self.last_content),
            reader: Arc::clone(&self.reader),
            interval: self.interval,
        }
    }
}

/// Lock a mutex, recovering from poisoning
fn lock_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            eprintln!("[ClipboardMonitor] Mutex poisoned, recovering...");
            poisoned.into_inner()
        }
    }
}

fn reset_baseline(last_content: &Mutex<String>) {
    let mut last = lock_recover(last_content);
    if !last.is_empty() {
        last.clear();
    }
}
