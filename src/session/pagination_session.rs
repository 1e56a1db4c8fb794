//! Per-message pagination state machine
//!
//! A `PaginationSession` owns the current page index for one remote message,
//! derives which controls are enabled, and carries the completion signal and
//! the one-time cleanup action. Navigation is synchronous; only cleanup
//! touches the transport.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{ButtonsConfig, PaginationConfig};
use crate::transport::{MessageEdit, MessageId, MessageTransport, TransportError, UserId};

use super::completion::{CompletionSignal, SessionOutcome};
use super::controls::{Control, ControlDescriptor, ControlStates};
use super::page::Page;
use super::{CleanupPolicy, NavigationPolicy, SessionError};

/// Pagination state machine for a single remote message
pub struct PaginationSession {
    message: MessageId,
    owner: UserId,
    pages: Vec<Page>,
    policy: NavigationPolicy,
    cleanup_policy: CleanupPolicy,
    buttons: ButtonsConfig,
    timeout: Option<Duration>,
    index: AtomicUsize,
    completion: CompletionSignal,
    cancellation: CancellationToken,
    cleanup_started: AtomicBool,
    /// Serializes action handling for this session; held across the
    /// transport edit of a navigation.
    dispatch_gate: Mutex<()>,
}

impl PaginationSession {
    /// Create a session for `message`, driven exclusively by `owner`
    ///
    /// Policies, control identities, and the deadline are taken from the
    /// configuration; the `with_*` builders override them per session.
    pub fn new(
        message: MessageId,
        owner: UserId,
        pages: Vec<Page>,
        config: &PaginationConfig,
    ) -> Result<Self, SessionError> {
        if pages.is_empty() {
            return Err(SessionError::EmptyPages);
        }

        Ok(Self {
            message,
            owner,
            pages,
            policy: config.wrap,
            cleanup_policy: config.cleanup,
            buttons: config.buttons.clone(),
            timeout: config.session_timeout(),
            index: AtomicUsize::new(0),
            completion: CompletionSignal::new(),
            cancellation: CancellationToken::new(),
            cleanup_started: AtomicBool::new(false),
            dispatch_gate: Mutex::new(()),
        })
    }

    /// Override the navigation policy for this session
    pub fn with_policy(mut self, policy: NavigationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the cleanup policy for this session
    pub fn with_cleanup(mut self, policy: CleanupPolicy) -> Self {
        self.cleanup_policy = policy;
        self
    }

    /// Override the session deadline; `None` disables it
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Drive this session from an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Message this session is attached to
    pub fn message(&self) -> MessageId {
        self.message
    }

    /// User authorized to drive this session
    pub fn owner(&self) -> UserId {
        self.owner
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Current page index
    pub fn index(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }

    /// The page at the current index
    pub fn page(&self) -> &Page {
        &self.pages[self.index()]
    }

    /// Navigation policy in effect
    pub fn policy(&self) -> NavigationPolicy {
        self.policy
    }

    /// Cleanup policy in effect
    pub fn cleanup_policy(&self) -> CleanupPolicy {
        self.cleanup_policy
    }

    /// Deadline in effect, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The session's completion signal
    pub fn completion(&self) -> &CompletionSignal {
        &self.completion
    }

    /// A handle to the session's cancellation token
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Trigger this session's cancellation token
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Whether the session has reached a terminal outcome
    pub fn is_ended(&self) -> bool {
        self.completion.is_resolved()
    }

    /// The terminal outcome, once resolved
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.completion.outcome()
    }

    pub(crate) fn dispatch_gate(&self) -> &Mutex<()> {
        &self.dispatch_gate
    }

    /// Jump to the first page
    pub fn first(&self) {
        if self.completion.is_resolved() {
            return;
        }
        let target = match self.policy {
            NavigationPolicy::Clamp => 0,
            // From the first page both skip controls land on the opposite
            // end; from anywhere else they land on their own end.
            NavigationPolicy::WrapAround => {
                if self.index() == 0 {
                    self.page_count() - 1
                } else {
                    0
                }
            }
        };
        self.index.store(target, Ordering::Release);
    }

    /// Jump to the last page
    pub fn last(&self) {
        if self.completion.is_resolved() {
            return;
        }
        let target = match self.policy {
            NavigationPolicy::Clamp => self.page_count() - 1,
            // Same expression as first(): both skip controls flip from the
            // first page.
            NavigationPolicy::WrapAround => {
                if self.index() == 0 {
                    self.page_count() - 1
                } else {
                    0
                }
            }
        };
        self.index.store(target, Ordering::Release);
    }

    /// Move one page forward
    pub fn next(&self) {
        if self.completion.is_resolved() {
            return;
        }
        let target = match self.policy {
            NavigationPolicy::Clamp => (self.index() + 1).min(self.page_count() - 1),
            NavigationPolicy::WrapAround => (self.index() + 1) % self.page_count(),
        };
        self.index.store(target, Ordering::Release);
    }

    /// Move one page back
    pub fn previous(&self) {
        if self.completion.is_resolved() {
            return;
        }
        let target = match self.policy {
            NavigationPolicy::Clamp => self.index().saturating_sub(1),
            NavigationPolicy::WrapAround => {
                let index = self.index();
                if index == 0 {
                    self.page_count() - 1
                } else {
                    index - 1
                }
            }
        };
        self.index.store(target, Ordering::Release);
    }

    /// Request an orderly stop
    ///
    /// Resolves the completion signal; repeated calls have no effect.
    pub fn stop(&self) {
        if self.completion.resolve(SessionOutcome::Stopped) {
            debug!("Stop requested for session on message {}", self.message);
        }
    }

    /// Control states derived from the current position
    pub fn control_states(&self) -> ControlStates {
        ControlStates::derive(self.index(), self.page_count(), self.policy)
    }

    /// Render-ready descriptors for the five controls, in display order
    pub fn controls(&self) -> Vec<ControlDescriptor> {
        self.descriptors(self.control_states())
    }

    /// Assemble the edit that shows the current page
    pub fn render_current(&self) -> MessageEdit {
        let page = self.page();
        MessageEdit {
            content: page.content.clone(),
            embeds: page.embed.clone().into_iter().collect(),
            controls: self.controls(),
        }
    }

    fn descriptors(&self, states: ControlStates) -> Vec<ControlDescriptor> {
        Control::ALL
            .iter()
            .map(|&control| ControlDescriptor {
                control,
                custom_id: self.buttons.id_for(control).to_string(),
                label: control.default_label().to_string(),
                enabled: states.enabled(control),
            })
            .collect()
    }

    /// Run the configured teardown action
    ///
    /// Executes at most once; later calls return immediately. The session is
    /// in a terminal state afterwards even when the transport action failed.
    pub async fn cleanup(&self, transport: &dyn MessageTransport) -> Result<(), TransportError> {
        if self.cleanup_started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        debug!(
            "Running {:?} cleanup for message {}",
            self.cleanup_policy, self.message
        );

        let result = match self.cleanup_policy {
            CleanupPolicy::DisableControls => self.disable_controls(transport).await,
            CleanupPolicy::DeleteMessage => transport.delete_message(self.message).await,
            CleanupPolicy::Ignore => Ok(()),
        };

        // Terminal either way; a concurrent cancellation may already have
        // resolved the signal.
        self.completion.resolve(SessionOutcome::Stopped);

        result
    }

    /// Disable the control row while keeping the message content intact
    async fn disable_controls(
        &self,
        transport: &dyn MessageTransport,
    ) -> Result<(), TransportError> {
        let current = transport.fetch_message(self.message).await?;
        let edit = MessageEdit {
            content: current.content,
            embeds: current.embeds,
            controls: self.descriptors(ControlStates::all_disabled()),
        };
        transport.edit_message(self.message, edit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RenderedMessage;
    use crate::transport::mock::MockTransport;

    fn pages(count: usize) -> Vec<Page> {
        (0..count)
            .map(|i| Page::new(format!("page {}", i)))
            .collect()
    }

    fn session(count: usize, policy: NavigationPolicy) -> PaginationSession {
        PaginationSession::new(
            MessageId(1),
            UserId(10),
            pages(count),
            &PaginationConfig::default(),
        )
        .unwrap()
        .with_policy(policy)
    }

    #[test]
    fn test_empty_pages_rejected() {
        let result = PaginationSession::new(
            MessageId(1),
            UserId(10),
            Vec::new(),
            &PaginationConfig::default(),
        );
        assert!(matches!(result, Err(SessionError::EmptyPages)));
    }

    #[test]
    fn test_clamp_keeps_index_in_bounds() {
        let session = session(3, NavigationPolicy::Clamp);

        session.previous();
        assert_eq!(session.index(), 0);

        session.next();
        session.next();
        assert_eq!(session.index(), 2);

        session.next();
        assert_eq!(session.index(), 2);
    }

    #[test]
    fn test_three_page_clamp_walk() {
        let session = session(3, NavigationPolicy::Clamp);
        assert_eq!(session.index(), 0);

        session.next();
        assert_eq!(session.index(), 1);
        assert_eq!(session.control_states(), ControlStates::all_enabled());

        session.next();
        assert_eq!(session.index(), 2);
        let states = session.control_states();
        assert!(!states.next);
        assert!(!states.last);
        assert!(states.first);
        assert!(states.previous);

        session.previous();
        assert_eq!(session.index(), 1);
        assert_eq!(session.control_states(), ControlStates::all_enabled());
    }

    #[test]
    fn test_clamp_skips_jump_to_the_ends() {
        let session = session(4, NavigationPolicy::Clamp);

        session.last();
        assert_eq!(session.index(), 3);

        session.first();
        assert_eq!(session.index(), 0);
    }

    #[test]
    fn test_wrap_next_and_previous_wrap_modulo_count() {
        let session = session(3, NavigationPolicy::WrapAround);

        session.previous();
        assert_eq!(session.index(), 2);

        session.next();
        assert_eq!(session.index(), 0);
    }

    #[test]
    fn test_wrap_skip_controls_flip_from_the_first_page() {
        let session = session(3, NavigationPolicy::WrapAround);

        // first() from page one lands on the last page
        session.first();
        assert_eq!(session.index(), 2);

        // and from anywhere else on the first page
        session.first();
        assert_eq!(session.index(), 0);

        // last() from page one lands on the last page
        session.last();
        assert_eq!(session.index(), 2);

        // and from anywhere else it flips to the first page
        session.last();
        assert_eq!(session.index(), 0);
    }

    #[test]
    fn test_single_page_navigation_is_inert() {
        for policy in [NavigationPolicy::Clamp, NavigationPolicy::WrapAround] {
            let session = session(1, policy);
            session.next();
            session.previous();
            session.first();
            session.last();
            assert_eq!(session.index(), 0);

            let states = session.control_states();
            assert!(!states.first && !states.previous && !states.next && !states.last);
            assert!(states.stop);
        }
    }

    #[test]
    fn test_navigation_after_completion_is_ignored() {
        let session = session(3, NavigationPolicy::Clamp);
        session.next();
        session.stop();

        session.next();
        session.first();
        session.last();
        assert_eq!(session.index(), 1);
    }

    #[test]
    fn test_stop_resolves_once() {
        let session = session(3, NavigationPolicy::Clamp);
        session.stop();
        session.stop();
        assert_eq!(session.outcome(), Some(SessionOutcome::Stopped));
    }

    #[test]
    fn test_render_current_reflects_the_page_and_controls() {
        let session = session(3, NavigationPolicy::Clamp);
        session.next();

        let edit = session.render_current();
        assert_eq!(edit.content, "page 1");
        assert_eq!(edit.controls.len(), 5);
        assert!(edit.controls.iter().all(|c| c.enabled));
        assert_eq!(edit.controls[0].custom_id, "page_first");
    }

    #[test]
    fn test_render_current_carries_the_embed() {
        let config = PaginationConfig::default();
        let page = Page::new("p").with_embed(serde_json::json!({"title": "t"}));
        let session =
            PaginationSession::new(MessageId(2), UserId(1), vec![page], &config).unwrap();

        let edit = session.render_current();
        assert_eq!(edit.embeds.len(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_disables_controls_and_preserves_content() {
        let transport = MockTransport::new();
        transport
            .seed_message(
                MessageId(1),
                RenderedMessage {
                    content: "final page".to_string(),
                    embeds: vec![serde_json::json!({"a": 1})],
                },
            )
            .await;

        let session = session(3, NavigationPolicy::Clamp);
        session.cleanup(&transport).await.unwrap();

        let edit = transport.last_edit().await.unwrap();
        assert_eq!(edit.content, "final page");
        assert_eq!(edit.embeds.len(), 1);
        assert_eq!(edit.controls.len(), 5);
        assert!(edit.controls.iter().all(|c| !c.enabled));
        assert_eq!(session.outcome(), Some(SessionOutcome::Stopped));
    }

    #[tokio::test]
    async fn test_cleanup_runs_at_most_once() {
        let transport = MockTransport::new();
        transport
            .seed_message(MessageId(1), RenderedMessage::default())
            .await;

        let session = session(2, NavigationPolicy::Clamp);
        session.cleanup(&transport).await.unwrap();
        session.cleanup(&transport).await.unwrap();

        assert_eq!(transport.edit_count().await, 1);
    }

    #[tokio::test]
    async fn test_delete_cleanup_issues_one_delete_and_no_edit() {
        let transport = MockTransport::new();
        transport
            .seed_message(MessageId(1), RenderedMessage::default())
            .await;

        let session = session(2, NavigationPolicy::Clamp).with_cleanup(CleanupPolicy::DeleteMessage);
        session.cleanup(&transport).await.unwrap();

        assert_eq!(transport.delete_count().await, 1);
        assert_eq!(transport.edit_count().await, 0);
    }

    #[tokio::test]
    async fn test_ignore_cleanup_touches_nothing() {
        let transport = MockTransport::new();

        let session = session(2, NavigationPolicy::Clamp).with_cleanup(CleanupPolicy::Ignore);
        session.cleanup(&transport).await.unwrap();

        assert_eq!(transport.call_count().await, 0);
        assert_eq!(session.outcome(), Some(SessionOutcome::Stopped));
    }

    #[tokio::test]
    async fn test_failed_cleanup_still_ends_the_session() {
        let transport = MockTransport::new();
        transport.set_fail_fetch(true);

        let session = session(2, NavigationPolicy::Clamp);
        let result = session.cleanup(&transport).await;

        assert!(result.is_err());
        assert!(session.is_ended());
    }
}
