//! Pagination controls and their derived enabled/disabled states

use serde::Serialize;

use super::NavigationPolicy;

/// The five controls attached to a paginated message, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    First,
    Previous,
    Stop,
    Next,
    Last,
}

impl Control {
    /// All controls in display order
    pub const ALL: [Control; 5] = [
        Control::First,
        Control::Previous,
        Control::Stop,
        Control::Next,
        Control::Last,
    ];

    /// Whether this control moves the page index
    pub fn is_navigation(&self) -> bool {
        !matches!(self, Control::Stop)
    }

    /// Default display label for this control
    pub fn default_label(&self) -> &'static str {
        match self {
            Control::First => "⏮",
            Control::Previous => "◀",
            Control::Stop => "⏹",
            Control::Next => "▶",
            Control::Last => "⏭",
        }
    }
}

/// Enabled state for each control
///
/// Always derived from the current index, the navigation policy, and the
/// page count; never stored, so it cannot go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlStates {
    pub first: bool,
    pub previous: bool,
    pub stop: bool,
    pub next: bool,
    pub last: bool,
}

impl ControlStates {
    /// Derive the control states for a given position
    pub fn derive(index: usize, page_count: usize, policy: NavigationPolicy) -> Self {
        // A single page leaves stop as the only meaningful control.
        if page_count <= 1 {
            return Self {
                first: false,
                previous: false,
                stop: true,
                next: false,
                last: false,
            };
        }

        match policy {
            NavigationPolicy::WrapAround => Self::all_enabled(),
            NavigationPolicy::Clamp => {
                let at_first = index == 0;
                let at_last = index == page_count - 1;
                Self {
                    first: !at_first,
                    previous: !at_first,
                    stop: true,
                    next: !at_last,
                    last: !at_last,
                }
            }
        }
    }

    /// Every control enabled
    pub fn all_enabled() -> Self {
        Self {
            first: true,
            previous: true,
            stop: true,
            next: true,
            last: true,
        }
    }

    /// Every control disabled, as rendered by cleanup
    pub fn all_disabled() -> Self {
        Self {
            first: false,
            previous: false,
            stop: false,
            next: false,
            last: false,
        }
    }

    /// Whether a specific control is enabled
    pub fn enabled(&self, control: Control) -> bool {
        match control {
            Control::First => self.first,
            Control::Previous => self.previous,
            Control::Stop => self.stop,
            Control::Next => self.next,
            Control::Last => self.last,
        }
    }
}

/// Render-ready description of one control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlDescriptor {
    pub control: Control,
    pub custom_id: String,
    pub label: String,
    pub enabled: bool,
}
