//! Pagination dispatcher: session registry, event routing, and lifecycle
//!
//! The dispatcher owns the map from message identities to live sessions,
//! drains the inbound interaction event stream, and runs the start/teardown
//! protocol that guarantees exactly-once deregistration and cleanup for
//! every session.

use futures_util::{Stream, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::PaginationConfig;
use crate::session::{Control, PaginationSession, SessionOutcome};
use crate::transport::{InteractionEvent, MessageId, MessageTransport};

/// Error types for dispatcher operations
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("A session is already registered for message {0}")]
    DuplicateSession(MessageId),
    #[error("Session task for message {0} ended unexpectedly")]
    SessionTaskFailed(MessageId),
}

/// Dispatcher counters for monitoring
#[derive(Debug, Default)]
pub struct DispatcherStats {
    sessions_started: AtomicU64,
    sessions_ended: AtomicU64,
    actions_routed: AtomicU64,
    auth_mismatches: AtomicU64,
    unmatched_actions: AtomicU64,
    transport_errors: AtomicU64,
}

impl DispatcherStats {
    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            sessions_ended: self.sessions_ended.load(Ordering::Relaxed),
            actions_routed: self.actions_routed.load(Ordering::Relaxed),
            auth_mismatches: self.auth_mismatches.load(Ordering::Relaxed),
            unmatched_actions: self.unmatched_actions.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the dispatcher counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub sessions_started: u64,
    pub sessions_ended: u64,
    pub actions_routed: u64,
    pub auth_mismatches: u64,
    pub unmatched_actions: u64,
    pub transport_errors: u64,
}

/// Routing state shared between the dispatcher handle and its tasks
struct DispatcherInner {
    /// Messaging transport used for renders and cleanup
    transport: Arc<dyn MessageTransport>,
    /// Engine configuration
    config: PaginationConfig,
    /// Live sessions by message identity
    registry: Mutex<HashMap<MessageId, Arc<PaginationSession>>>,
    /// Monitoring counters
    stats: DispatcherStats,
}

/// Routes inbound interactions to pagination sessions and supervises their
/// lifecycle
pub struct Dispatcher {
    /// Shared routing state
    inner: Arc<DispatcherInner>,
    /// Listener task draining the inbound event stream; taken by dispose
    listener: Mutex<Option<JoinHandle<()>>>,
    /// Shutdown signal sender for the listener
    shutdown_tx: mpsc::Sender<()>,
}

impl Dispatcher {
    /// Create a dispatcher and subscribe to the inbound event stream
    ///
    /// The stream is drained by a background listener until [`dispose`] is
    /// called, the dispatcher is dropped, or the stream itself ends.
    ///
    /// [`dispose`]: Dispatcher::dispose
    pub fn new<S>(transport: Arc<dyn MessageTransport>, config: PaginationConfig, events: S) -> Self
    where
        S: Stream<Item = InteractionEvent> + Send + Unpin + 'static,
    {
        info!("Creating pagination dispatcher");

        // Create shutdown channel for the listener
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let inner = Arc::new(DispatcherInner {
            transport,
            config,
            registry: Mutex::new(HashMap::new()),
            stats: DispatcherStats::default(),
        });

        // Subscribe to the inbound event stream
        let listener = tokio::spawn(Self::run_listener(inner.clone(), events, shutdown_rx));

        Self {
            inner,
            listener: Mutex::new(Some(listener)),
            shutdown_tx,
        }
    }

    /// Drain the event stream until shutdown or stream end
    async fn run_listener<S>(
        inner: Arc<DispatcherInner>,
        mut events: S,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) where
        S: Stream<Item = InteractionEvent> + Send + Unpin + 'static,
    {
        debug!("Interaction listener started");

        loop {
            tokio::select! {
                // Handle dispose signal
                _ = shutdown_rx.recv() => {
                    debug!("Interaction listener received shutdown signal");
                    break;
                }

                // Route inbound interactions
                event = events.next() => {
                    match event {
                        Some(event) => inner.clone().on_event(event).await,
                        None => {
                            info!("Interaction event stream closed");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Register a session and supervise it until it ends
    ///
    /// Suspends for the session's whole lifetime: until a stop action, the
    /// cancellation token, or the deadline resolves its completion, the
    /// session is deregistered, and its cleanup has been attempted. Cleanup
    /// failures are logged, never returned.
    pub async fn start(
        &self,
        session: Arc<PaginationSession>,
    ) -> Result<SessionOutcome, DispatchError> {
        let message = session.message();

        {
            let mut registry = self.inner.registry.lock().await;
            if registry.contains_key(&message) {
                return Err(DispatchError::DuplicateSession(message));
            }
            registry.insert(message, session.clone());
        }

        self.inner
            .stats
            .sessions_started
            .fetch_add(1, Ordering::Relaxed);
        info!(
            "Pagination session started for message {} ({} pages)",
            message,
            session.page_count()
        );

        // Supervise on a separate task so deregistration and cleanup run
        // even if this future is dropped.
        let supervisor = tokio::spawn(Self::supervise(self.inner.clone(), session));

        match supervisor.await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Session supervisor for message {} failed: {}", message, e);
                Err(DispatchError::SessionTaskFailed(message))
            }
        }
    }

    /// Await a session's completion, then deregister it and run cleanup
    async fn supervise(
        inner: Arc<DispatcherInner>,
        session: Arc<PaginationSession>,
    ) -> SessionOutcome {
        let message = session.message();
        let cancellation = session.cancellation_token();
        let deadline = session.timeout();

        let expiry = async {
            match deadline {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expiry);

        let outcome = tokio::select! {
            outcome = session.completion().wait() => outcome,

            _ = cancellation.cancelled() => {
                debug!("Cancellation triggered for session on message {}", message);
                session.completion().resolve(SessionOutcome::Cancelled);
                session.completion().wait().await
            }

            _ = &mut expiry => {
                info!("Session on message {} expired after {:?}", message, deadline);
                session.completion().resolve(SessionOutcome::Cancelled);
                session.completion().wait().await
            }
        };

        // Deregister before cleanup so no further events can reach the
        // session.
        inner.registry.lock().await.remove(&message);

        if let Err(e) = session.cleanup(inner.transport.as_ref()).await {
            error!("Cleanup failed for session on message {}: {}", message, e);
            inner.stats.transport_errors.fetch_add(1, Ordering::Relaxed);
        }

        inner.stats.sessions_ended.fetch_add(1, Ordering::Relaxed);
        info!(
            "Pagination session ended for message {} ({:?})",
            message, outcome
        );

        outcome
    }

    /// Stop routing events and clear the registry
    ///
    /// Releases the event stream subscription. In-flight sessions are not
    /// resolved here; their `start` calls return through their own
    /// cancellation or deadline.
    pub async fn dispose(&self) {
        info!("Disposing pagination dispatcher");

        // Stop the listener, releasing the event stream
        let _ = self.shutdown_tx.try_send(());
        if let Some(listener) = self.listener.lock().await.take() {
            if let Err(e) = listener.await {
                error!("Interaction listener terminated with error: {}", e);
            }
        }

        let mut registry = self.inner.registry.lock().await;
        let remaining = registry.len();
        registry.clear();
        if remaining > 0 {
            debug!("Cleared {} sessions from the registry", remaining);
        }
    }

    /// Whether a session is currently registered for a message
    pub async fn contains(&self, message: MessageId) -> bool {
        self.inner.registry.lock().await.contains_key(&message)
    }

    /// Number of registered sessions
    pub async fn session_count(&self) -> usize {
        self.inner.registry.lock().await.len()
    }

    /// Get dispatcher statistics
    pub fn get_stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            warn!("Dispatcher dropped without dispose; aborting interaction listener");
            listener.abort();
        }
    }
}

impl DispatcherInner {
    /// Route one inbound event to its session, if any
    async fn on_event(self: Arc<Self>, event: InteractionEvent) {
        let session = {
            let registry = self.registry.lock().await;
            registry.get(&event.message).cloned()
        };

        let session = match session {
            Some(session) => session,
            None => {
                // Interactions for unregistered messages are not ours
                debug!(
                    "Ignoring interaction for unregistered message {}",
                    event.message
                );
                return;
            }
        };

        if event.actor != session.owner() {
            debug!(
                "Ignoring interaction on message {} from non-owner {}",
                event.message, event.actor
            );
            self.stats.auth_mismatches.fetch_add(1, Ordering::Relaxed);
            return;
        }

        // Handle on a separate task so one session's transport latency does
        // not stall routing for the others.
        let inner = self.clone();
        tokio::spawn(async move {
            inner.handle_action(session, event).await;
        });
    }

    /// Apply one authorized action to its session
    async fn handle_action(&self, session: Arc<PaginationSession>, event: InteractionEvent) {
        // Acknowledge before any state changes when configured
        if self.config.ack_buttons {
            if let Err(e) = self.transport.acknowledge(&event).await {
                warn!(
                    "Failed to acknowledge interaction on message {}: {}",
                    event.message, e
                );
            }
        }

        // One action at a time per session, held across the render edit
        let _gate = session.dispatch_gate().lock().await;

        if session.is_ended() {
            debug!(
                "Dropping late interaction for ended session on message {}",
                event.message
            );
            return;
        }

        let control = match self.config.buttons.control_for(&event.action) {
            Some(control) => control,
            None => {
                warn!(
                    "Unmatched action identity '{}' on message {}",
                    event.action, event.message
                );
                self.stats.unmatched_actions.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        self.stats.actions_routed.fetch_add(1, Ordering::Relaxed);

        match control {
            Control::First => session.first(),
            Control::Previous => session.previous(),
            Control::Next => session.next(),
            Control::Last => session.last(),
            Control::Stop => {
                // Cleanup owns the final visual state; no edit here.
                session.stop();
                return;
            }
        }

        let edit = session.render_current();
        if let Err(e) = self.transport.edit_message(event.message, edit).await {
            error!(
                "Failed to render page {} on message {}: {}",
                session.index(),
                event.message,
                e
            );
            self.stats.transport_errors.fetch_add(1, Ordering::Relaxed);
        }
    }
}
