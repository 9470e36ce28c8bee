use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::notify::NotificationRelay;

#[derive(Debug, Error, PartialEq)]
pub enum TaskError {
    #[error("{label} failed: {reason}")]
    Rejected { label: String, reason: String },

    #[error("{label} timed out after {after_ms}ms")]
    TimedOut { label: String, after_ms: u64 },

    #[error("{label} was cancelled")]
    Cancelled { label: String },
}

/// Shared flag checked before a finished task applies its result. Whoever
/// owns the waiting side flips it when it stops caring.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Default for Liveness {
    fn default() -> Self {
        Liveness(Arc::new(AtomicBool::new(true)))
    }
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kill(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs one call to an external collaborator with a deadline.
///
/// A result that arrives after `liveness` was killed is discarded and
/// reported as cancelled, whatever it was.
pub async fn run_outbound<T, E, F>(
    label: &str,
    timeout: Duration,
    liveness: &Liveness,
    work: F,
) -> Result<T, TaskError>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    let result = tokio::time::timeout(timeout, work).await;

    if !liveness.is_alive() {
        debug!("{label}: owner went away; discarding result");
        return Err(TaskError::Cancelled {
            label: label.to_string(),
        });
    }

    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!("{label} failed: {e}");
            Err(TaskError::Rejected {
                label: label.to_string(),
                reason: e.to_string(),
            })
        }
        Err(_) => {
            warn!("{label} timed out after {timeout:?}");
            Err(TaskError::TimedOut {
                label: label.to_string(),
                after_ms: timeout.as_millis() as u64,
            })
        }
    }
}

/// Publishes the outcome of a task. Cancelled tasks stay quiet.
pub fn report<T>(relay: &NotificationRelay, result: &Result<T, TaskError>, success: &str) {
    match result {
        Ok(_) => {
            relay.success(success);
        }
        Err(TaskError::Cancelled { .. }) => {}
        Err(e) => {
            relay.error(e.to_string());
        }
    }
}
