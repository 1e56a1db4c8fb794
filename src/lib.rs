//! Pageturn Pagination Engine Library
//!
//! An interactive button-driven pagination engine for chat messages: one
//! authorized user pages through pre-rendered content attached to a single
//! remote message, with serialized transitions and exactly-once cleanup.

pub mod config;
pub mod dispatcher;
pub mod session;
pub mod transport;

use anyhow::Result;

/// Initialize tracing subscriber for logging
pub fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pageturn={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}
