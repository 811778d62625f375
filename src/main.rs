use std::sync::Arc;

use tokio::sync::mpsc;

use clipsort::{App, ClipboardMonitor, ConfigGateway, SystemClipboard};

#[tokio::main]
async fn main() {
    println!("[Main] Starting clipsort...");

    let config = match ConfigGateway::from_project_dirs() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[Main] Failed to resolve config directory: {}", e);
            std::process::exit(1);
        }
    };
    println!("[Main] Config file: {}", config.path().display());

    let app = App::new(config);

    let (tx, rx) = mpsc::channel::<String>(64);
    let event_loop = app.spawn_event_loop(rx);

    let monitor = ClipboardMonitor::new(Arc::new(SystemClipboard::new()));
    let poller = monitor.start(tx);
    println!("[Main] Clipboard monitor running, press Ctrl+C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("[Main] Failed to listen for shutdown signal: {}", e);
    }
    println!("[Main] Shutting down...");

    // Stopping the poller drops the channel sender, which ends the event
    // loop once queued items are drained.
    monitor.stop();
    if let Err(e) = poller.await {
        eprintln!("[Main] Poller task panicked: {}", e);
    }
    if let Err(e) = event_loop.await {
        eprintln!("[Main] Event loop task panicked: {}", e);
    }

    app.shutdown();
}
