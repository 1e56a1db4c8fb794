//! Single-assignment completion signal shared by a session and its
//! supervisor

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// Terminal outcome of a pagination session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The session ended through its stop control
    Stopped,
    /// The session ended through cancellation or its deadline
    Cancelled,
}

/// Resolve-once completion signal
///
/// The first `resolve` call wins; every later call is discarded. Any number
/// of tasks may `wait` concurrently, before or after resolution.
pub struct CompletionSignal {
    resolved: AtomicBool,
    outcome_tx: watch::Sender<Option<SessionOutcome>>,
}

impl CompletionSignal {
    /// Create an unresolved signal
    pub fn new() -> Self {
        let (outcome_tx, _) = watch::channel(None);
        Self {
            resolved: AtomicBool::new(false),
            outcome_tx,
        }
    }

    /// Resolve the signal with an outcome
    ///
    /// Returns true if this call performed the resolution, false if the
    /// signal was already resolved.
    pub fn resolve(&self, outcome: SessionOutcome) -> bool {
        if self
            .resolved
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.outcome_tx.send_replace(Some(outcome));
            true
        } else {
            false
        }
    }

    /// Whether the signal has been resolved
    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }

    /// The resolved outcome, if any
    pub fn outcome(&self) -> Option<SessionOutcome> {
        *self.outcome_tx.borrow()
    }

    /// Wait until the signal resolves
    pub async fn wait(&self) -> SessionOutcome {
        let mut outcome_rx = self.outcome_tx.subscribe();
        loop {
            if let Some(outcome) = *outcome_rx.borrow_and_update() {
                return outcome;
            }
            if outcome_rx.changed().await.is_err() {
                // The sender lives inside this signal; losing it means the
                // signal was dropped mid-wait. Treat as cancellation.
                return SessionOutcome::Cancelled;
            }
        }
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}
