//! Task aggregate root.

use super::{Description, ProjectId, TaskId, TaskPriority, TaskStatus, TaskTitle};
use crate::identity::domain::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;

/// Validated editable fields of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetails {
    /// Task title.
    pub title: TaskTitle,
    /// Task description.
    pub description: Description,
    /// Parent project.
    pub project_id: ProjectId,
    /// User the task is assigned to.
    pub assignee_id: UserId,
    /// Priority.
    pub priority: TaskPriority,
    /// Date the task should be done by.
    pub expected_completion: Option<NaiveDate>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    details: TaskDetails,
    status: TaskStatus,
    completed_on: Option<NaiveDate>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted editable fields.
    pub details: TaskDetails,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted actual completion date.
    pub completed_on: Option<NaiveDate>,
    /// Persisted logical-deletion flag.
    pub active: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new active task in [`TaskStatus::Pending`].
    #[must_use]
    pub fn new(details: TaskDetails, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            details,
            status: TaskStatus::Pending,
            completed_on: None,
            active: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            details: data.details,
            status: data.status,
            completed_on: data.completed_on,
            active: data.active,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the editable fields.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.details.title
    }

    /// Returns the parent project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.details.project_id
    }

    /// Returns the assignee.
    #[must_use]
    pub const fn assignee_id(&self) -> UserId {
        self.details.assignee_id
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the date the status was last set to completed, if it still
    /// is.
    #[must_use]
    pub const fn completed_on(&self) -> Option<NaiveDate> {
        self.completed_on
    }

    /// Returns whether the task has not been deactivated.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sets the status and records or clears the completion date.
    ///
    /// [`TaskStatus::Completed`] always stamps today's date, even when the
    /// task was already completed; every other status clears it.
    pub fn change_status(&mut self, status: TaskStatus, clock: &impl Clock) {
        let now = clock.utc();
        self.status = status;
        self.completed_on = (status == TaskStatus::Completed).then(|| now.date_naive());
        self.updated_at = now;
    }

    /// Replaces every editable field and the status.
    ///
    /// A full edit leaves the completion date as it was.
    pub fn apply_update(&mut self, details: TaskDetails, status: TaskStatus, clock: &impl Clock) {
        self.details = details;
        self.status = status;
        self.touch(clock);
    }

    /// Marks the task as logically deleted. The status is left unchanged.
    pub fn deactivate(&mut self, clock: &impl Clock) {
        self.deactivate_at(clock.utc());
    }

    /// Marks the task as logically deleted at `timestamp`.
    pub const fn deactivate_at(&mut self, timestamp: DateTime<Utc>) {
        self.active = false;
        self.updated_at = timestamp;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
