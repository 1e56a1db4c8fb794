//! Pagination session module
//!
//! This module provides the per-message pagination state machine: pages,
//! controls with derived states, the resolve-once completion signal, and the
//! session itself with its navigation and cleanup policies.

pub mod completion;
pub mod controls;
pub mod page;
pub mod pagination_session;

pub use completion::{CompletionSignal, SessionOutcome};
pub use controls::{Control, ControlDescriptor, ControlStates};
pub use page::Page;
pub use pagination_session::PaginationSession;

use serde::{Deserialize, Serialize};

/// Boundary behavior when navigating past the first or last page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationPolicy {
    /// Stay on the boundary page
    Clamp,
    /// Continue on the opposite end
    #[default]
    WrapAround,
}

/// One-time teardown action applied when a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Keep the message, disable every control
    #[default]
    DisableControls,
    /// Delete the message entirely
    DeleteMessage,
    /// Leave the message untouched
    Ignore,
}

/// Error types for session construction
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("A pagination session requires at least one page")]
    EmptyPages,
}
