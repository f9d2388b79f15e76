//! Repository ports for projects and tasks.

use crate::error::ErrorKind;
use crate::identity::domain::UserId;
use crate::planning::domain::{Project, ProjectId, ProjectStatus, Task, TaskId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for planning repository operations.
pub type PlanningRepositoryResult<T> = Result<T, PlanningRepositoryError>;

/// Result of a committed cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// The project as committed, in [`ProjectStatus::Cancelled`].
    pub project: Project,
    /// Tasks deactivated by the cascade.
    pub deactivated_tasks: Vec<TaskId>,
}

/// Project persistence contract.
///
/// Listings only return active projects, ordered by name.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningRepositoryError::DuplicateProject`] when the ID
    /// already exists.
    async fn store(&self, project: &Project) -> PlanningRepositoryResult<()>;

    /// Persists changes to an existing project.
    ///
    /// The write is conditional on the stored row: it only commits while the
    /// stored project is still active and not cancelled, so a stale copy
    /// can never undo a cancellation that committed after it was read.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningRepositoryError::ProjectNotFound`] when the project
    /// does not exist or is inactive, and
    /// [`PlanningRepositoryError::AlreadyTerminal`] when the stored project
    /// is cancelled.
    async fn update(&self, project: &Project) -> PlanningRepositoryResult<()>;

    /// Finds a project by identifier, active or not.
    async fn find_by_id(&self, id: ProjectId) -> PlanningRepositoryResult<Option<Project>>;

    /// Returns the active projects selected by `filter`.
    async fn list_active(&self, filter: &ProjectFilter) -> PlanningRepositoryResult<Vec<Project>>;

    /// Cancels a project and deactivates its unfinished tasks as one unit of
    /// work.
    ///
    /// The project is re-read under exclusive access before any write, so
    /// of two concurrent calls exactly one commits. Tasks whose status is
    /// not terminal get `active = false`; their status is not changed.
    /// Either every write commits or none does.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningRepositoryError::ProjectNotFound`],
    /// [`PlanningRepositoryError::AlreadyTerminal`] when the project is
    /// already completed or cancelled, or
    /// [`PlanningRepositoryError::Persistence`] when storage fails or the
    /// unit of work exceeds `timeout`.
    async fn cancel_with_cascade(
        &self,
        project_id: ProjectId,
        cancelled_at: DateTime<Utc>,
        timeout: Duration,
    ) -> PlanningRepositoryResult<CascadeOutcome>;
}

/// Selection of active projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Only projects managed by this user.
    pub manager_id: Option<UserId>,
}

impl ProjectFilter {
    /// Selects every active project.
    #[must_use]
    pub const fn all() -> Self {
        Self { manager_id: None }
    }

    /// Restricts the selection to one manager.
    #[must_use]
    pub const fn managed_by(mut self, manager_id: UserId) -> Self {
        self.manager_id = Some(manager_id);
        self
    }

    /// Returns whether an active `project` belongs to the selection.
    #[must_use]
    pub fn matches(&self, project: &Project) -> bool {
        project.is_active() && self.manager_id.is_none_or(|id| id == project.manager_id())
    }
}

/// Selection of active tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks of this project.
    pub project_id: Option<ProjectId>,
    /// Only tasks assigned to this user.
    pub assignee_id: Option<UserId>,
}

impl TaskFilter {
    /// Selects every active task.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            project_id: None,
            assignee_id: None,
        }
    }

    /// Restricts the selection to one project.
    #[must_use]
    pub const fn in_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Restricts the selection to one assignee.
    #[must_use]
    pub const fn assigned_to(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Returns whether an active `task` belongs to the selection.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        task.is_active()
            && self.project_id.is_none_or(|id| id == task.project_id())
            && self.assignee_id.is_none_or(|id| id == task.assignee_id())
    }
}

/// Task persistence contract.
///
/// Listings only return active tasks, ordered by title.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningRepositoryError::DuplicateTask`] when the ID already
    /// exists.
    async fn store(&self, task: &Task) -> PlanningRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// The write only commits while the stored task is still active. When
    /// the written task is active and unfinished, its project must also be
    /// active and not cancelled at commit time; the check and the write are
    /// one unit against a concurrent cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningRepositoryError::TaskNotFound`] when the task does
    /// not exist or is inactive,
    /// [`PlanningRepositoryError::ProjectNotFound`] when its project is gone
    /// or inactive, and [`PlanningRepositoryError::AlreadyTerminal`] when
    /// unfinished work would land in a cancelled project.
    async fn update(&self, task: &Task) -> PlanningRepositoryResult<()>;

    /// Finds a task by identifier, active or not.
    async fn find_by_id(&self, id: TaskId) -> PlanningRepositoryResult<Option<Task>>;

    /// Returns the active tasks selected by `filter`.
    async fn list(&self, filter: &TaskFilter) -> PlanningRepositoryResult<Vec<Task>>;
}

/// Errors returned by project and task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PlanningRepositoryError {
    /// A project with the same identifier already exists.
    #[error("duplicate project identifier: {0}")]
    DuplicateProject(ProjectId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The project was already completed or cancelled when the unit of work
    /// re-read it.
    #[error("project {project_id} is already {status}")]
    AlreadyTerminal {
        /// Project that was targeted.
        project_id: ProjectId,
        /// Status read inside the unit of work.
        status: ProjectStatus,
    },

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted planning data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure, including timeouts.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PlanningRepositoryError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ProjectNotFound(_) | Self::TaskNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyTerminal { .. } => ErrorKind::Validation,
            Self::DuplicateProject(_)
            | Self::DuplicateTask(_)
            | Self::InvalidPersistedData(_)
            | Self::Persistence(_) => ErrorKind::Storage,
        }
    }
}
