//! Shutdown state.
//!
//! `SHUTDOWN` records that Ctrl+C was received. Long-running commands
//! register a channel to be told about it; without one the process exits
//! right away.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for the running command
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_shutdown()`: exit immediately
/// - After `register_shutdown()`: notify the command, which winds down
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        match SHUTDOWN_TX.get() {
            Some(tx) => {
                crate::log!("serve"; "shutting down...");
                let _ = tx.send(());
            }
            None => std::process::exit(0),
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the channel notified on Ctrl+C. Returns the receiving end.
pub fn register_shutdown() -> crossbeam::channel::Receiver<()> {
    let (tx, rx) = crossbeam::channel::unbounded();
    let _ = SHUTDOWN_TX.set(tx);
    rx
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_shutdown_initially() {
        assert!(!is_shutdown());
    }
}
