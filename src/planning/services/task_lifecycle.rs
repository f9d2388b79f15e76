//! Task creation, editing, status changes, and lookup.

use crate::authorization::{Action, AuthorizationPolicy, PermissionDenied};
use crate::error::ErrorKind;
use crate::identity::{
    domain::{Identity, User, UserId},
    ports::{UserRepository, UserRepositoryError},
    services::{ActorError, resolve_actor},
};
use crate::planning::{
    domain::{
        Description, PlanningDomainError, Project, ProjectId, ProjectStatus, Task, TaskDetails,
        TaskId, TaskPriority, TaskStatus, TaskTitle,
    },
    ports::{PlanningRepositoryError, ProjectRepository, TaskFilter, TaskRepository},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Parent project.
    pub project_id: ProjectId,
    /// User the task is assigned to.
    pub assignee_id: UserId,
    /// Priority.
    pub priority: TaskPriority,
    /// Date the task should be done by.
    pub expected_completion: Option<NaiveDate>,
}

impl CreateTaskRequest {
    /// Creates a task request with [`TaskPriority::Medium`] and no due date.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        project_id: ProjectId,
        assignee_id: UserId,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            project_id,
            assignee_id,
            priority: TaskPriority::default(),
            expected_completion: None,
        }
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_expected_completion(mut self, expected_completion: NaiveDate) -> Self {
        self.expected_completion = Some(expected_completion);
        self
    }

    fn into_details(self) -> Result<TaskDetails, PlanningDomainError> {
        Ok(TaskDetails {
            title: TaskTitle::new(self.title)?,
            description: Description::new(self.description)?,
            project_id: self.project_id,
            assignee_id: self.assignee_id,
            priority: self.priority,
            expected_completion: self.expected_completion,
        })
    }
}

/// Request payload for a full task edit.
///
/// The status is set as given; unlike
/// [`TaskLifecycleService::update_status`], the completion date is left as
/// it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    /// Editable fields.
    pub fields: CreateTaskRequest,
    /// Status to set.
    pub status: TaskStatus,
}

impl UpdateTaskRequest {
    /// Builds an update request pre-filled from the task's current fields.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        let details = task.details();
        Self {
            fields: CreateTaskRequest {
                title: details.title.as_str().to_owned(),
                description: details.description.as_str().to_owned(),
                project_id: details.project_id,
                assignee_id: details.assignee_id,
                priority: details.priority,
                expected_completion: details.expected_completion,
            },
            status: task.status(),
        }
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.fields.title = title.into();
        self
    }

    /// Replaces the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.fields.assignee_id = assignee_id;
        self
    }

    /// Moves the task to another project.
    #[must_use]
    pub const fn with_project(mut self, project_id: ProjectId) -> Self {
        self.fields.project_id = project_id;
        self
    }

    /// Replaces the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}

/// Errors returned by [`TaskLifecycleService`].
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// The actor may not perform the operation.
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),

    /// The acting user is gone or was deactivated.
    #[error(transparent)]
    Actor(#[from] ActorError),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] PlanningDomainError),

    /// No active task exists with the given identifier.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    /// No active project exists with the given identifier.
    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),

    /// The assignee is not an active user.
    #[error("assignee {0} not found")]
    AssigneeNotFound(UserId),

    /// Planning repository operation failed.
    #[error(transparent)]
    Repository(#[from] PlanningRepositoryError),

    /// User repository operation failed.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),
}

impl TaskLifecycleError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::Domain(_) => ErrorKind::Validation,
            Self::TaskNotFound(_) | Self::ProjectNotFound(_) | Self::AssigneeNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::Actor(err) => err.kind(),
            Self::Repository(err) => err.kind(),
            Self::Users(err) => err.kind(),
        }
    }
}

/// Result type for task lifecycle operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Unfinished tasks may not live in a cancelled project.
fn ensure_open_project(project: &Project, status: TaskStatus) -> TaskLifecycleResult<()> {
    if project.status() == ProjectStatus::Cancelled && !status.is_terminal() {
        return Err(PlanningDomainError::ProjectCancelled(project.id()).into());
    }
    Ok(())
}

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<T, P, U, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    projects: Arc<P>,
    users: Arc<U>,
    clock: Arc<C>,
    policy: AuthorizationPolicy,
}

impl<T, P, U, C> TaskLifecycleService<T, P, U, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a task lifecycle service.
    #[must_use]
    pub const fn new(tasks: Arc<T>, projects: Arc<P>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            projects,
            users,
            clock,
            policy: AuthorizationPolicy,
        }
    }

    async fn current_actor(&self, identity: &Identity) -> TaskLifecycleResult<Identity> {
        Ok(resolve_actor(&*self.users, identity).await?)
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .filter(Task::is_active)
            .ok_or(TaskLifecycleError::TaskNotFound(task_id))
    }

    async fn find_project_or_error(&self, project_id: ProjectId) -> TaskLifecycleResult<Project> {
        self.projects
            .find_by_id(project_id)
            .await?
            .filter(Project::is_active)
            .ok_or(TaskLifecycleError::ProjectNotFound(project_id))
    }

    async fn ensure_assignee_exists(&self, assignee_id: UserId) -> TaskLifecycleResult<()> {
        self.users
            .find_by_id(assignee_id)
            .await?
            .filter(User::is_active)
            .map(|_| ())
            .ok_or(TaskLifecycleError::AssigneeNotFound(assignee_id))
    }

    /// Creates a task in [`TaskStatus::Pending`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::ProjectNotFound`],
    /// [`TaskLifecycleError::PermissionDenied`] unless the actor is an
    /// administrator or the project's manager, domain errors for missing
    /// fields or a cancelled project,
    /// [`TaskLifecycleError::AssigneeNotFound`], and repository errors.
    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let actor = &self.current_actor(identity).await?;
        let project = self.find_project_or_error(request.project_id).await?;
        self.policy
            .ensure(actor, Action::CreateTask, Some(project.manager_id()))?;
        let details = request.into_details()?;
        ensure_open_project(&project, TaskStatus::Pending)?;
        self.ensure_assignee_exists(details.assignee_id).await?;

        let task = Task::new(details, &*self.clock);
        self.tasks.store(&task).await?;
        tracing::info!(
            actor = %actor.user_id(),
            task_id = %task.id(),
            project_id = %task.project_id(),
            "task created"
        );
        Ok(task)
    }

    /// Replaces every field of a task, including its status.
    ///
    /// The completion date is left untouched. Moving a task to another
    /// project requires edit rights on both projects.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskLifecycleError::ProjectNotFound`],
    /// [`TaskLifecycleError::PermissionDenied`] unless the actor is an
    /// administrator or the parent project's manager, domain errors,
    /// [`TaskLifecycleError::AssigneeNotFound`], and repository errors.
    pub async fn update(
        &self,
        identity: &Identity,
        task_id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let actor = &self.current_actor(identity).await?;
        let mut task = self.find_task_or_error(task_id).await?;
        let current_project = self.find_project_or_error(task.project_id()).await?;
        self.policy
            .ensure(actor, Action::EditTask, Some(current_project.manager_id()))?;
        let status = request.status;
        let details = request.fields.into_details()?;

        let target_project = if details.project_id == current_project.id() {
            current_project
        } else {
            let target = self.find_project_or_error(details.project_id).await?;
            self.policy
                .ensure(actor, Action::EditTask, Some(target.manager_id()))?;
            target
        };
        ensure_open_project(&target_project, status)?;
        if details.assignee_id != task.assignee_id() {
            self.ensure_assignee_exists(details.assignee_id).await?;
        }

        task.apply_update(details, status, &*self.clock);
        self.tasks.update(&task).await?;
        tracing::info!(actor = %actor.user_id(), task_id = %task_id, "task updated");
        Ok(task)
    }

    /// Sets a task's status, stamping or clearing its completion date.
    ///
    /// Allowed for the assignee, the parent project's manager, and
    /// administrators.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskLifecycleError::PermissionDenied`], a domain error when an
    /// unfinished status is set inside a cancelled project, and repository
    /// errors.
    pub async fn update_status(
        &self,
        identity: &Identity,
        task_id: TaskId,
        status: TaskStatus,
    ) -> TaskLifecycleResult<Task> {
        let actor = &self.current_actor(identity).await?;
        let mut task = self.find_task_or_error(task_id).await?;
        let project = self.find_project_or_error(task.project_id()).await?;
        self.policy.ensure_any(
            actor,
            &[
                (Action::UpdateTaskStatus, Some(task.assignee_id())),
                (Action::EditTask, Some(project.manager_id())),
            ],
        )?;
        ensure_open_project(&project, status)?;

        task.change_status(status, &*self.clock);
        self.tasks.update(&task).await?;
        tracing::info!(
            actor = %actor.user_id(),
            task_id = %task_id,
            status = %status,
            "task status changed"
        );
        Ok(task)
    }

    /// Deactivates a task. Its status is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskLifecycleError::PermissionDenied`] unless the actor is an
    /// administrator or the parent project's manager, and repository errors.
    pub async fn deactivate(
        &self,
        identity: &Identity,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let actor = &self.current_actor(identity).await?;
        let mut task = self.find_task_or_error(task_id).await?;
        let project = self.find_project_or_error(task.project_id()).await?;
        self.policy
            .ensure(actor, Action::EditTask, Some(project.manager_id()))?;

        task.deactivate(&*self.clock);
        self.tasks.update(&task).await?;
        tracing::info!(actor = %actor.user_id(), task_id = %task_id, "task deactivated");
        Ok(task)
    }

    /// Lists active tasks ordered by title.
    ///
    /// Collaborators only ever see tasks assigned to them, whatever the
    /// filter asks for.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn list(
        &self,
        identity: &Identity,
        filter: TaskFilter,
    ) -> TaskLifecycleResult<Vec<Task>> {
        let actor = &self.current_actor(identity).await?;
        let sees_all = self
            .policy
            .decide(actor, Action::ViewAllTasks, None)
            .is_allowed();
        let effective = if sees_all {
            filter
        } else {
            filter.assigned_to(actor.user_id())
        };
        let tasks = self.tasks.list(&effective).await?;
        tracing::debug!(count = tasks.len(), restricted = !sees_all, "listed tasks");
        Ok(tasks)
    }

    /// Returns one active task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskLifecycleError::PermissionDenied`] when a collaborator asks for
    /// a task assigned to someone else, and repository errors.
    pub async fn find(&self, identity: &Identity, task_id: TaskId) -> TaskLifecycleResult<Task> {
        let actor = &self.current_actor(identity).await?;
        let task = self.find_task_or_error(task_id).await?;
        self.policy
            .ensure(actor, Action::ViewTask, Some(task.assignee_id()))?;
        Ok(task)
    }
}
