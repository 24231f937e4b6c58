//! Signal handling for cooperative scan cancellation.
//!
//! A Ctrl+C press sets a shared `AtomicBool` that the walker and the
//! hashing workers poll. In-flight chunk reads finish, unqueued work is
//! discarded, and the scan surfaces an interrupted error instead of a
//! fabricated complete result.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Cooperative stop handler shared between the signal hook and the
/// scan pipeline.
///
/// Cloning shares the underlying flag; the handle is `Send` and `Sync`.
#[derive(Debug, Clone, Default)]
pub struct StopHandler {
    flag: Arc<AtomicBool>,
}

impl StopHandler {
    /// Create a handler with no stop requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a stop has been requested.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Manually request a stop.
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Reset the flag, mainly for reuse across tests.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Get a clone of the flag to hand to worker threads.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<StopHandler> = OnceLock::new();

/// Install a Ctrl+C handler that sets the stop flag on interrupt.
///
/// The process-wide handler is installed once; later calls (including
/// parallel tests driving the application entry point) get the same
/// handler back with its flag reset. If the hook cannot be installed
/// because some other code already registered one, an unhooked handler
/// is returned so manual `request_stop` still works.
pub fn install_handler() -> Result<StopHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = StopHandler::new();
    let flag = handler.flag();

    match ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);

        let _ = writeln!(std::io::stderr(), "\nInterrupted. Finishing in-flight work...");
        let _ = std::io::stderr().flush();

        log::info!("Stop signal received");
    }) {
        Ok(()) => {
            let _ = GLOBAL_HANDLER.set(handler.clone());
            Ok(handler)
        }
        Err(_) => {
            if let Some(existing) = GLOBAL_HANDLER.get() {
                existing.reset();
                Ok(existing.clone())
            } else {
                log::debug!("Ctrl+C handler already registered, using unhooked handler");
                let fallback = StopHandler::new();
                let _ = GLOBAL_HANDLER.set(fallback.clone());
                Ok(fallback)
            }
        }
    }
}
