//! Messaging transport boundary
//!
//! The engine never talks to a messaging backend directly; everything it
//! needs is expressed as the [`MessageTransport`] capability and implemented
//! by the embedding application. [`mock::MockTransport`] provides an
//! in-memory implementation for tests and demos.

pub mod mock;
pub mod types;

pub use types::{InteractionEvent, MessageEdit, MessageId, RenderedMessage, TransportError, UserId};

use async_trait::async_trait;

/// Capability surface the pagination engine requires from the messaging layer
///
/// All operations may suspend on network I/O. Failures are surfaced to the
/// caller and never retried here.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Fetch the current rendered state of a message
    async fn fetch_message(&self, message: MessageId) -> Result<RenderedMessage, TransportError>;

    /// Push one edit to a message
    async fn edit_message(
        &self,
        message: MessageId,
        edit: MessageEdit,
    ) -> Result<(), TransportError>;

    /// Delete a message
    async fn delete_message(&self, message: MessageId) -> Result<(), TransportError>;

    /// Acknowledge an interaction without any visible change
    async fn acknowledge(&self, event: &InteractionEvent) -> Result<(), TransportError>;
}
