//! Configuration management module
//!
//! Handles loading, validation, and management of the pagination engine
//! configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::session::{CleanupPolicy, Control, NavigationPolicy};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Acknowledge control interactions before processing them
    pub ack_buttons: bool,

    /// Session deadline in seconds; 0 disables the deadline
    pub session_timeout_secs: u64,

    /// Action identities of the five controls
    pub buttons: ButtonsConfig,

    /// Teardown action applied when a session ends
    pub cleanup: CleanupPolicy,

    /// Boundary behavior for navigation past the ends
    pub wrap: NavigationPolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ButtonsConfig {
    /// Action identity of the skip-to-first control
    pub first: String,

    /// Action identity of the previous-page control
    pub previous: String,

    /// Action identity of the stop control
    pub stop: String,

    /// Action identity of the next-page control
    pub next: String,

    /// Action identity of the skip-to-last control
    pub last: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            ack_buttons: false,
            session_timeout_secs: 120,
            buttons: ButtonsConfig::default(),
            cleanup: CleanupPolicy::default(),
            wrap: NavigationPolicy::default(),
        }
    }
}

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self {
            first: "page_first".to_string(),
            previous: "page_previous".to_string(),
            stop: "page_stop".to_string(),
            next: "page_next".to_string(),
            last: "page_last".to_string(),
        }
    }
}

impl ButtonsConfig {
    /// Action identity configured for a control
    pub fn id_for(&self, control: Control) -> &str {
        match control {
            Control::First => &self.first,
            Control::Previous => &self.previous,
            Control::Stop => &self.stop,
            Control::Next => &self.next,
            Control::Last => &self.last,
        }
    }

    /// The control matching an action identity, if any
    pub fn control_for(&self, action: &str) -> Option<Control> {
        Control::ALL
            .iter()
            .copied()
            .find(|&control| self.id_for(control) == action)
    }
}

impl PaginationConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: PaginationConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        // PAGETURN_ACK_BUTTONS - acknowledge interactions before processing
        if let Ok(ack) = env::var("PAGETURN_ACK_BUTTONS") {
            self.ack_buttons = ack.parse().unwrap_or(self.ack_buttons);
        }

        // PAGETURN_SESSION_TIMEOUT_SECS - session deadline
        if let Ok(timeout) = env::var("PAGETURN_SESSION_TIMEOUT_SECS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.session_timeout_secs = value;
            }
        }

        // PAGETURN_WRAP - boundary behavior (clamp | wrap_around)
        if let Ok(wrap) = env::var("PAGETURN_WRAP") {
            match wrap.as_str() {
                "clamp" => self.wrap = NavigationPolicy::Clamp,
                "wrap_around" => self.wrap = NavigationPolicy::WrapAround,
                _ => {}
            }
        }

        // PAGETURN_CLEANUP - teardown action (disable_controls | delete_message | ignore)
        if let Ok(cleanup) = env::var("PAGETURN_CLEANUP") {
            match cleanup.as_str() {
                "disable_controls" => self.cleanup = CleanupPolicy::DisableControls,
                "delete_message" => self.cleanup = CleanupPolicy::DeleteMessage,
                "ignore" => self.cleanup = CleanupPolicy::Ignore,
                _ => {}
            }
        }

        // PAGETURN_BUTTON_FIRST - skip-to-first action identity
        if let Ok(id) = env::var("PAGETURN_BUTTON_FIRST") {
            self.buttons.first = id;
        }

        // PAGETURN_BUTTON_PREVIOUS - previous-page action identity
        if let Ok(id) = env::var("PAGETURN_BUTTON_PREVIOUS") {
            self.buttons.previous = id;
        }

        // PAGETURN_BUTTON_STOP - stop action identity
        if let Ok(id) = env::var("PAGETURN_BUTTON_STOP") {
            self.buttons.stop = id;
        }

        // PAGETURN_BUTTON_NEXT - next-page action identity
        if let Ok(id) = env::var("PAGETURN_BUTTON_NEXT") {
            self.buttons.next = id;
        }

        // PAGETURN_BUTTON_LAST - skip-to-last action identity
        if let Ok(id) = env::var("PAGETURN_BUTTON_LAST") {
            self.buttons.last = id;
        }
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load_from_file(path).unwrap_or_else(|err| {
            tracing::warn!("Failed to load config: {}, using defaults", err);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let ids = [
            &self.buttons.first,
            &self.buttons.previous,
            &self.buttons.stop,
            &self.buttons.next,
            &self.buttons.last,
        ];

        for id in ids {
            if id.trim().is_empty() {
                anyhow::bail!("Button action identities must not be empty");
            }
        }

        // Routing maps action identities back to controls, so they must not
        // collide.
        let unique: std::collections::HashSet<&str> = ids.iter().map(|id| id.as_str()).collect();
        if unique.len() != ids.len() {
            anyhow::bail!("Button action identities must be pairwise distinct");
        }

        Ok(())
    }

    /// The configured session deadline; `None` when disabled
    pub fn session_timeout(&self) -> Option<Duration> {
        if self.session_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.session_timeout_secs))
        }
    }
}
