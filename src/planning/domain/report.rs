//! Read models for planning reports.

use super::{ProjectId, ProjectName, ProjectStatus};
use crate::identity::domain::{Role, UserId};
use serde::Serialize;

/// Task completion summary for one active project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    /// Summarised project.
    pub project_id: ProjectId,
    /// Project name.
    pub name: ProjectName,
    /// Project status.
    pub status: ProjectStatus,
    /// Responsible user.
    pub manager_id: UserId,
    /// Display name of the responsible user, if the account still exists.
    pub manager_name: Option<String>,
    /// Number of active tasks.
    pub total_tasks: u64,
    /// Number of active tasks in [`crate::planning::domain::TaskStatus::Completed`].
    pub completed_tasks: u64,
}

impl ProjectSummary {
    /// Returns the share of completed tasks as a whole percentage, rounded
    /// down. A project without tasks reports zero.
    #[must_use]
    pub fn completion_percent(&self) -> u64 {
        self.completed_tasks
            .saturating_mul(100)
            .checked_div(self.total_tasks)
            .unwrap_or(0)
    }
}

/// Active task counts for one active user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserWorkload {
    /// Counted user.
    pub user_id: UserId,
    /// User display name.
    pub name: String,
    /// Access role of the user.
    pub role: Role,
    /// Active tasks assigned to the user.
    pub total: u64,
    /// Active tasks still pending.
    pub pending: u64,
    /// Active tasks in progress.
    pub in_progress: u64,
    /// Active tasks completed.
    pub completed: u64,
}
