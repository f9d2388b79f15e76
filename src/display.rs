//! Human-readable labels for domain enums.
//!
//! Labels are presentation text only. Behaviour always keys off the enum
//! variant or its canonical storage string, never off a label.

use crate::identity::domain::Role;
use crate::planning::domain::{ProjectStatus, TaskPriority, TaskStatus};

/// Lookup of the display text for a domain value.
pub trait Label {
    /// Returns the text shown to people for this value.
    fn label(&self) -> &'static str;
}

impl Label for Role {
    fn label(&self) -> &'static str {
        match self {
            Self::Administrator => "Administrator",
            Self::Manager => "Manager",
            Self::Collaborator => "Collaborator",
        }
    }
}

impl Label for ProjectStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl Label for TaskStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl Label for TaskPriority {
    fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Formats a record caption such as `Website relaunch (In Progress)`.
#[must_use]
pub fn caption(name: &str, value: &impl Label) -> String {
    format!("{name} ({})", value.label())
}
