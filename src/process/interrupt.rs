//! Ctrl+C tracking

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::error::{Result, RunnerError};

/// Set once the runner receives SIGINT. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the process-wide Ctrl+C handler. Call at most once per process.
    ///
    /// The handler only records the interrupt: the foreground child receives
    /// the same signal from the terminal and the runner reacts once it exits.
    /// A SIGINT sent to the runner's PID alone (`kill -INT <pid>`) does not
    /// reach the child, so the runner keeps waiting until the child exits on
    /// its own and then exits with 130.
    pub fn install(&self) -> Result<()> {
        let flag = self.clone();
        ctrlc::set_handler(move || {
            flag.raise();
        })
        .map_err(|e| {
            RunnerError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to set Ctrl+C handler: {}", e),
            ))
        })
    }

    pub fn raise(&self) {
        warn!("interrupt received");
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// `Err(Interrupted)` if an interrupt has been seen
    pub fn check(&self) -> Result<()> {
        if self.is_raised() {
            return Err(RunnerError::Interrupted);
        }
        Ok(())
    }
}
