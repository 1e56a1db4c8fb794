//! Mock transport implementation for exercising the engine
//! Used for testing in environments without a real messaging backend

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::MessageTransport;
use super::types::{InteractionEvent, MessageEdit, MessageId, RenderedMessage, TransportError};

/// One recorded transport call
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Fetch(MessageId),
    Edit(MessageId, MessageEdit),
    Delete(MessageId),
    Acknowledge(MessageId, String),
}

/// In-memory transport that records every call and supports failure injection
pub struct MockTransport {
    messages: Mutex<HashMap<MessageId, RenderedMessage>>,
    calls: Mutex<Vec<TransportCall>>,
    fail_fetch: AtomicBool,
    fail_edits: AtomicBool,
    fail_deletes: AtomicBool,
    fail_acks: AtomicBool,
}

impl MockTransport {
    /// Create a new MockTransport with no stored messages
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_fetch: AtomicBool::new(false),
            fail_edits: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            fail_acks: AtomicBool::new(false),
        }
    }

    /// Store a message so later fetches can see it
    pub async fn seed_message(&self, message: MessageId, rendered: RenderedMessage) {
        self.messages.lock().await.insert(message, rendered);
    }

    /// Make fetch_message fail until reset
    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Make edit_message fail until reset
    pub fn set_fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    /// Make delete_message fail until reset
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Make acknowledge fail until reset
    pub fn set_fail_acks(&self, fail: bool) {
        self.fail_acks.store(fail, Ordering::SeqCst);
    }

    /// All calls recorded so far, in order
    pub async fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().await.clone()
    }

    /// All recorded edits, in order
    pub async fn edits(&self) -> Vec<MessageEdit> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                TransportCall::Edit(_, edit) => Some(edit.clone()),
                _ => None,
            })
            .collect()
    }

    /// The most recent edit, if any
    pub async fn last_edit(&self) -> Option<MessageEdit> {
        self.edits().await.pop()
    }

    /// Number of recorded edits
    pub async fn edit_count(&self) -> usize {
        self.edits().await.len()
    }

    /// Number of recorded deletes
    pub async fn delete_count(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| matches!(call, TransportCall::Delete(_)))
            .count()
    }

    /// Number of recorded acknowledgements
    pub async fn ack_count(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| matches!(call, TransportCall::Acknowledge(_, _)))
            .count()
    }

    /// Total number of recorded calls
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Current stored state of a message, if it exists
    pub async fn stored_message(&self, message: MessageId) -> Option<RenderedMessage> {
        self.messages.lock().await.get(&message).cloned()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageTransport for MockTransport {
    async fn fetch_message(&self, message: MessageId) -> Result<RenderedMessage, TransportError> {
        self.calls.lock().await.push(TransportCall::Fetch(message));

        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(TransportError::Network("mock fetch failure".to_string()));
        }

        self.messages
            .lock()
            .await
            .get(&message)
            .cloned()
            .ok_or(TransportError::NotFound(message))
    }

    async fn edit_message(
        &self,
        message: MessageId,
        edit: MessageEdit,
    ) -> Result<(), TransportError> {
        self.calls
            .lock()
            .await
            .push(TransportCall::Edit(message, edit.clone()));

        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(TransportError::Network("mock edit failure".to_string()));
        }

        // Apply the edit so later fetches observe the new state
        self.messages.lock().await.insert(
            message,
            RenderedMessage {
                content: edit.content,
                embeds: edit.embeds,
            },
        );

        Ok(())
    }

    async fn delete_message(&self, message: MessageId) -> Result<(), TransportError> {
        self.calls.lock().await.push(TransportCall::Delete(message));

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(TransportError::Network("mock delete failure".to_string()));
        }

        match self.messages.lock().await.remove(&message) {
            Some(_) => Ok(()),
            None => Err(TransportError::NotFound(message)),
        }
    }

    async fn acknowledge(&self, event: &InteractionEvent) -> Result<(), TransportError> {
        self.calls
            .lock()
            .await
            .push(TransportCall::Acknowledge(event.message, event.action.clone()));

        if self.fail_acks.load(Ordering::SeqCst) {
            return Err(TransportError::Network("mock ack failure".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::UserId;

    #[tokio::test]
    async fn test_mock_records_calls_in_order() {
        let transport = MockTransport::new();
        let message = MessageId(1);
        transport
            .seed_message(message, RenderedMessage::default())
            .await;

        transport.fetch_message(message).await.unwrap();
        transport.delete_message(message).await.unwrap();

        let calls = transport.calls().await;
        assert_eq!(
            calls,
            vec![TransportCall::Fetch(message), TransportCall::Delete(message)]
        );
    }

    #[tokio::test]
    async fn test_mock_edit_updates_stored_message() {
        let transport = MockTransport::new();
        let message = MessageId(7);
        transport
            .seed_message(
                message,
                RenderedMessage {
                    content: "before".to_string(),
                    embeds: vec![],
                },
            )
            .await;

        let edit = MessageEdit {
            content: "after".to_string(),
            embeds: vec![],
            controls: vec![],
        };
        transport.edit_message(message, edit).await.unwrap();

        let fetched = transport.fetch_message(message).await.unwrap();
        assert_eq!(fetched.content, "after");
        assert_eq!(transport.edit_count().await, 1);
    }

    #[tokio::test]
    async fn test_mock_fetch_unknown_message() {
        let transport = MockTransport::new();
        let result = transport.fetch_message(MessageId(404)).await;
        assert!(matches!(result, Err(TransportError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mock_failure_injection() {
        let transport = MockTransport::new();
        let message = MessageId(9);
        transport
            .seed_message(message, RenderedMessage::default())
            .await;

        transport.set_fail_edits(true);
        let edit = MessageEdit {
            content: "x".to_string(),
            embeds: vec![],
            controls: vec![],
        };
        assert!(transport.edit_message(message, edit.clone()).await.is_err());

        transport.set_fail_edits(false);
        assert!(transport.edit_message(message, edit).await.is_ok());

        // Failed attempts are still recorded
        assert_eq!(transport.edit_count().await, 2);
    }

    #[tokio::test]
    async fn test_mock_acknowledge_records_action() {
        let transport = MockTransport::new();
        let event = InteractionEvent::new(MessageId(3), UserId(5), "page_next");

        transport.acknowledge(&event).await.unwrap();

        let calls = transport.calls().await;
        assert_eq!(
            calls,
            vec![TransportCall::Acknowledge(
                MessageId(3),
                "page_next".to_string()
            )]
        );
    }
}
