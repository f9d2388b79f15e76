//! Project aggregate root.

use super::{Description, PlanningDomainError, ProjectId, ProjectName, ProjectStatus, Schedule};
use crate::identity::domain::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;

/// Validated editable fields of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetails {
    /// Project name.
    pub name: ProjectName,
    /// Project description.
    pub description: Description,
    /// Planned start and expected end.
    pub schedule: Schedule,
    /// User responsible for the project.
    pub manager_id: UserId,
}

/// Project aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    id: ProjectId,
    details: ProjectDetails,
    status: ProjectStatus,
    actual_end: Option<NaiveDate>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted editable fields.
    pub details: ProjectDetails,
    /// Persisted status.
    pub status: ProjectStatus,
    /// Persisted actual end date.
    pub actual_end: Option<NaiveDate>,
    /// Persisted logical-deletion flag.
    pub active: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new active project in [`ProjectStatus::Planned`].
    #[must_use]
    pub fn new(details: ProjectDetails, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ProjectId::new(),
            details,
            status: ProjectStatus::Planned,
            actual_end: None,
            active: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            details: data.details,
            status: data.status,
            actual_end: data.actual_end,
            active: data.active,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the editable fields.
    #[must_use]
    pub const fn details(&self) -> &ProjectDetails {
        &self.details
    }

    /// Returns the project name.
    #[must_use]
    pub const fn name(&self) -> &ProjectName {
        &self.details.name
    }

    /// Returns the responsible user.
    #[must_use]
    pub const fn manager_id(&self) -> UserId {
        self.details.manager_id
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Returns the date the project was completed, if it is completed.
    #[must_use]
    pub const fn actual_end(&self) -> Option<NaiveDate> {
        self.actual_end
    }

    /// Returns whether the project has not been deactivated.
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

    /// Replaces the editable fields and sets a non-cancelled status.
    ///
    /// Entering [`ProjectStatus::Completed`] records today's date as the
    /// actual end; any other status clears it.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningDomainError::CancellationRequiresCascade`] when
    /// `status` is [`ProjectStatus::Cancelled`], or
    /// [`PlanningDomainError::ProjectCancelled`] when the project is already
    /// cancelled.
    pub fn apply_update(
        &mut self,
        details: ProjectDetails,
        status: ProjectStatus,
        clock: &impl Clock,
    ) -> Result<(), PlanningDomainError> {
        if status == ProjectStatus::Cancelled {
            return Err(PlanningDomainError::CancellationRequiresCascade);
        }
        if self.status == ProjectStatus::Cancelled {
            return Err(PlanningDomainError::ProjectCancelled(self.id));
        }

        let now = clock.utc();
        self.actual_end = match (self.status, status) {
            (ProjectStatus::Completed, ProjectStatus::Completed) => self.actual_end,
            (_, ProjectStatus::Completed) => Some(now.date_naive()),
            _ => None,
        };
        self.details = details;
        self.status = status;
        self.updated_at = now;
        Ok(())
    }

    /// Returns an error when the project can no longer be cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningDomainError::AlreadyTerminal`] for completed and
    /// cancelled projects.
    pub const fn ensure_cancellable(&self) -> Result<(), PlanningDomainError> {
        if self.status.is_terminal() {
            return Err(PlanningDomainError::AlreadyTerminal {
                project_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    /// Moves the project to [`ProjectStatus::Cancelled`] at `cancelled_at`.
    ///
    /// Only the project row changes; the caller deactivates the tasks in the
    /// same unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningDomainError::AlreadyTerminal`] for completed and
    /// cancelled projects.
    pub fn cancel_at(&mut self, cancelled_at: DateTime<Utc>) -> Result<(), PlanningDomainError> {
        self.ensure_cancellable()?;
        self.status = ProjectStatus::Cancelled;
        self.updated_at = cancelled_at;
        Ok(())
    }
}
