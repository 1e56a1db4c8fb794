//! Transport-facing data types: message and user identities, inbound
//! interaction events, and the values exchanged with the messaging backend

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::ControlDescriptor;

/// Identity of a remote message hosting a pagination session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a user on the messaging surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One inbound control interaction delivered by the event stream
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionEvent {
    /// Message the interaction was attached to
    pub message: MessageId,
    /// User who pressed the control
    pub actor: UserId,
    /// Raw action identity of the pressed control
    pub action: String,
}

impl InteractionEvent {
    /// Create a new interaction event
    pub fn new(message: MessageId, actor: UserId, action: impl Into<String>) -> Self {
        Self {
            message,
            actor,
            action: action.into(),
        }
    }
}

/// Current rendered state of a remote message, as reported by the transport
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderedMessage {
    pub content: String,
    pub embeds: Vec<serde_json::Value>,
}

/// One edit pushed to a remote message
///
/// Built fresh for every transition; never shared or mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageEdit {
    pub content: String,
    pub embeds: Vec<serde_json::Value>,
    pub controls: Vec<ControlDescriptor>,
}

/// Error types for messaging transport operations
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("API status error: {0} - {1}")]
    Api(u16, String),
    #[error("Message not found: {0}")]
    NotFound(MessageId),
    #[error("Transport channel closed")]
    ChannelClosed,
}
